use crate::splitter::{RawSection, RawSections};
use crate::ProjectViewError;
use std::fmt;
use std::path::PathBuf;

fn sorted(values: &[String]) -> Vec<&str> {
    let mut sorted: Vec<&str> = values.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted
}

/// Multiset equality: order-insensitive, multiplicity-preserving.
fn multiset_eq(left: &[String], right: &[String]) -> bool {
    left.len() == right.len() && sorted(left) == sorted(right)
}

fn expect_name(section: &RawSection, expected: &str) -> Result<(), ProjectViewError> {
    if section.name != expected {
        return Err(ProjectViewError::WrongSectionName {
            expected: expected.to_string(),
            actual: section.name.clone(),
        });
    }
    Ok(())
}

fn split_excludable_entries(body: &str) -> (Vec<String>, Vec<String>) {
    let mut included = Vec::new();
    let mut excluded = Vec::new();
    for entry in body.split_whitespace() {
        match entry.strip_prefix('-') {
            Some(stripped) => excluded.push(stripped.to_string()),
            None => included.push(entry.to_string()),
        }
    }
    (included, excluded)
}

fn singleton_body(section: &RawSection) -> Option<&str> {
    let trimmed = section.body.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn write_list_entries(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    included: &[String],
    excluded: &[String],
) -> fmt::Result {
    writeln!(f, "{name}:")?;
    for entry in included {
        writeln!(f, "    {entry}")?;
    }
    for entry in excluded {
        writeln!(f, "    -{entry}")?;
    }
    Ok(())
}

/// The `targets` section: target patterns included in and excluded from the
/// resolution pass.
#[derive(Debug, Clone, Default)]
pub struct TargetsSection {
    pub included: Vec<String>,
    pub excluded: Vec<String>,
}

impl TargetsSection {
    pub const NAME: &'static str = "targets";

    pub fn new(included: Vec<String>, excluded: Vec<String>) -> Self {
        TargetsSection { included, excluded }
    }

    /// Parse one raw section. Fails if the raw section carries a different
    /// section name.
    pub fn parse_raw(section: &RawSection) -> Result<Option<Self>, ProjectViewError> {
        expect_name(section, Self::NAME)?;
        let (included, excluded) = split_excludable_entries(&section.body);
        Ok((!included.is_empty() || !excluded.is_empty())
            .then_some(TargetsSection { included, excluded }))
    }

    /// Concatenate all `targets` occurrences in file order. Entries are never
    /// deduplicated.
    pub(crate) fn from_raw_sections(raw: &RawSections) -> Option<Self> {
        let mut included = Vec::new();
        let mut excluded = Vec::new();
        for section in raw.all_with_name(Self::NAME) {
            let (mut inc, mut exc) = split_excludable_entries(&section.body);
            included.append(&mut inc);
            excluded.append(&mut exc);
        }
        (!included.is_empty() || !excluded.is_empty())
            .then_some(TargetsSection { included, excluded })
    }
}

impl PartialEq for TargetsSection {
    fn eq(&self, other: &Self) -> bool {
        multiset_eq(&self.included, &other.included) && multiset_eq(&self.excluded, &other.excluded)
    }
}

impl Eq for TargetsSection {}

impl fmt::Display for TargetsSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list_entries(f, Self::NAME, &self.included, &self.excluded)
    }
}

/// The `build_flags` section. Flags are not excludable: a leading `-` is
/// flag syntax, so every entry is included verbatim.
#[derive(Debug, Clone, Default)]
pub struct BuildFlagsSection {
    pub flags: Vec<String>,
}

impl BuildFlagsSection {
    pub const NAME: &'static str = "build_flags";

    pub fn new(flags: Vec<String>) -> Self {
        BuildFlagsSection { flags }
    }

    pub fn parse_raw(section: &RawSection) -> Result<Option<Self>, ProjectViewError> {
        expect_name(section, Self::NAME)?;
        let flags: Vec<String> = section.body.split_whitespace().map(str::to_string).collect();
        Ok((!flags.is_empty()).then_some(BuildFlagsSection { flags }))
    }

    pub(crate) fn from_raw_sections(raw: &RawSections) -> Option<Self> {
        let flags: Vec<String> = raw
            .all_with_name(Self::NAME)
            .flat_map(|section| section.body.split_whitespace())
            .map(str::to_string)
            .collect();
        (!flags.is_empty()).then_some(BuildFlagsSection { flags })
    }
}

impl PartialEq for BuildFlagsSection {
    fn eq(&self, other: &Self) -> bool {
        multiset_eq(&self.flags, &other.flags)
    }
}

impl Eq for BuildFlagsSection {}

impl fmt::Display for BuildFlagsSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", Self::NAME)?;
        for flag in &self.flags {
            writeln!(f, "    {flag}")?;
        }
        Ok(())
    }
}

macro_rules! path_singleton_section {
    ($(#[$doc:meta])* $name:ident, $section_name:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub value: PathBuf,
        }

        impl $name {
            pub const NAME: &'static str = $section_name;

            pub fn new(value: impl Into<PathBuf>) -> Self {
                $name { value: value.into() }
            }

            pub fn parse_raw(section: &RawSection) -> Result<Option<Self>, ProjectViewError> {
                expect_name(section, Self::NAME)?;
                Ok(singleton_body(section).map(|body| $name {
                    value: PathBuf::from(body),
                }))
            }

            pub(crate) fn from_raw_sections(
                raw: &RawSections,
            ) -> Result<Option<Self>, ProjectViewError> {
                match raw.last_with_name(Self::NAME) {
                    Some(section) => Self::parse_raw(section),
                    None => Ok(None),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                writeln!(f, "{}: {}", Self::NAME, self.value.display())
            }
        }
    };
}

path_singleton_section!(
    /// The `bazel_path` section: the bazel binary to invoke.
    BazelPathSection,
    "bazel_path"
);
path_singleton_section!(
    /// The `java_path` section: the java binary used to run the server.
    JavaPathSection,
    "java_path"
);

/// The `debugger_address` section: a `host:port` pair the server debugger
/// attaches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggerAddressSection {
    pub host: String,
    pub port: u16,
}

impl DebuggerAddressSection {
    pub const NAME: &'static str = "debugger_address";

    pub fn parse_raw(section: &RawSection) -> Result<Option<Self>, ProjectViewError> {
        expect_name(section, Self::NAME)?;
        let Some(body) = singleton_body(section) else {
            return Ok(None);
        };

        let malformed = |reason: &str| ProjectViewError::MalformedValue {
            section: Self::NAME.to_string(),
            value: body.to_string(),
            reason: reason.to_string(),
        };

        let (host, port) = body
            .rsplit_once(':')
            .ok_or_else(|| malformed("expected 'host:port'"))?;
        if host.is_empty() {
            return Err(malformed("expected 'host:port'"));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| malformed("port is not a number in 0..=65535"))?;

        Ok(Some(DebuggerAddressSection {
            host: host.to_string(),
            port,
        }))
    }

    pub(crate) fn from_raw_sections(raw: &RawSections) -> Result<Option<Self>, ProjectViewError> {
        match raw.last_with_name(Self::NAME) {
            Some(section) => Self::parse_raw(section),
            None => Ok(None),
        }
    }
}

impl fmt::Display for DebuggerAddressSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}:{}", Self::NAME, self.host, self.port)
    }
}

/// The `build_manual_targets` section: when true, targets tagged `manual`
/// are built as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildManualTargetsSection {
    pub value: bool,
}

impl BuildManualTargetsSection {
    pub const NAME: &'static str = "build_manual_targets";

    pub fn parse_raw(section: &RawSection) -> Result<Option<Self>, ProjectViewError> {
        expect_name(section, Self::NAME)?;
        singleton_body(section)
            .map(|body| match body {
                "true" => Ok(BuildManualTargetsSection { value: true }),
                "false" => Ok(BuildManualTargetsSection { value: false }),
                other => Err(ProjectViewError::MalformedValue {
                    section: Self::NAME.to_string(),
                    value: other.to_string(),
                    reason: "expected 'true' or 'false'".to_string(),
                }),
            })
            .transpose()
    }

    pub(crate) fn from_raw_sections(raw: &RawSections) -> Result<Option<Self>, ProjectViewError> {
        match raw.last_with_name(Self::NAME) {
            Some(section) => Self::parse_raw(section),
            None => Ok(None),
        }
    }
}

impl fmt::Display for BuildManualTargetsSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", Self::NAME, self.value)
    }
}

/// The `import_depth` section: how deep below the requested targets modules
/// are imported; `-1` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportDepthSection {
    pub value: i32,
}

impl ImportDepthSection {
    pub const NAME: &'static str = "import_depth";

    pub fn parse_raw(section: &RawSection) -> Result<Option<Self>, ProjectViewError> {
        expect_name(section, Self::NAME)?;
        singleton_body(section)
            .map(|body| {
                body.parse::<i32>()
                    .map(|value| ImportDepthSection { value })
                    .map_err(|_| ProjectViewError::MalformedValue {
                        section: Self::NAME.to_string(),
                        value: body.to_string(),
                        reason: "expected an integer".to_string(),
                    })
            })
            .transpose()
    }

    pub(crate) fn from_raw_sections(raw: &RawSections) -> Result<Option<Self>, ProjectViewError> {
        match raw.last_with_name(Self::NAME) {
            Some(section) => Self::parse_raw(section),
            None => Ok(None),
        }
    }
}

impl fmt::Display for ImportDepthSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", Self::NAME, self.value)
    }
}
