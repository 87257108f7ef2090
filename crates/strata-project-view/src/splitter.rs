use regex::Regex;
use std::sync::OnceLock;

/// One "raw" section: a header name and the unparsed body that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    pub name: String,
    pub body: String,
}

impl RawSection {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        RawSection {
            name: name.into(),
            body: body.into(),
        }
    }
}

/// An ordered sequence of raw sections.
///
/// Sections with the same name may repeat; list sections are merged later in
/// file order, singleton sections resolve to the last occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSections {
    sections: Vec<RawSection>,
}

impl RawSections {
    pub fn new(sections: Vec<RawSection>) -> Self {
        RawSections { sections }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawSection> {
        self.sections.iter()
    }

    pub fn all_with_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a RawSection> {
        self.sections.iter().filter(move |s| s.name == name)
    }

    pub fn last_with_name(&self, name: &str) -> Option<&RawSection> {
        self.sections.iter().rev().find(|s| s.name == name)
    }
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[a-z_]+:?").expect("valid regex"))
}

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#[^\n]*").expect("valid regex"))
}

/// Split project-view text into raw sections.
///
/// `#` comments are removed first. A section header is a `[a-z_]+` run at a
/// line start, optionally followed by a colon; the body is everything between
/// the header's end and the next header's start (or EOF). Text before the
/// first header is ignored.
pub fn split_into_raw_sections(file_content: &str) -> RawSections {
    let without_comments = comment_regex().replace_all(file_content, "");

    let headers: Vec<_> = header_regex().find_iter(&without_comments).collect();
    let sections = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let body_start = header.end();
            let body_end = headers
                .get(i + 1)
                .map(|next| next.start())
                .unwrap_or(without_comments.len());
            RawSection::new(
                header.as_str().trim_end_matches(':').trim(),
                &without_comments[body_start..body_end],
            )
        })
        .collect();

    RawSections::new(sections)
}
