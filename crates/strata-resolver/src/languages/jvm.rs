use regex::Regex;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn package_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*package\s+([\w.]+)").expect("valid regex"))
}

/// Directory names that conventionally sit at the top of a JVM source tree.
const SOURCE_ROOT_MARKERS: &[&str] = &[
    "java", "kotlin", "scala", "src", "main", "test", "tests", "resources",
];

/// The source root a JVM file hangs under.
///
/// The root is derived from the file's `package` declaration: the package
/// segments are stripped off the end of the file's directory, so
/// `/work/src/com/example/A.java` with `package com.example` roots at
/// `/work/src`. Files without a declaration (or unreadable files) fall back
/// to a directory-layout guess.
///
/// Scala files may split one package over several nested declarations;
/// `multiple_lines` joins them in file order before stripping.
pub fn calculate_jvm_source_root(source: &Path, multiple_lines: bool) -> Option<PathBuf> {
    match find_package(source, multiple_lines) {
        Some(package) => {
            let mut root = source.parent()?.to_path_buf();
            for _ in package.split('.') {
                if !root.pop() {
                    return guess_source_root(source);
                }
            }
            Some(root)
        }
        None => guess_source_root(source),
    }
}

fn find_package(source: &Path, multiple_lines: bool) -> Option<String> {
    let file = std::fs::File::open(source).ok()?;
    let mut packages = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.ok()?;
        if let Some(captures) = package_regex().captures(&line) {
            packages.push(captures[1].to_string());
        }
    }

    if packages.is_empty() {
        None
    } else if multiple_lines {
        Some(packages.join("."))
    } else {
        Some(packages.swap_remove(0))
    }
}

/// Cut the path at the last conventionally named source-tree directory,
/// falling back to the file's own directory.
fn guess_source_root(source: &Path) -> Option<PathBuf> {
    let parent = source.parent()?;
    let components: Vec<&str> = parent
        .iter()
        .map(|component| component.to_str().unwrap_or(""))
        .collect();
    let Some(marker) = components
        .iter()
        .rposition(|component| SOURCE_ROOT_MARKERS.contains(component))
    else {
        return Some(parent.to_path_buf());
    };

    let mut root = PathBuf::new();
    for component in &components[..=marker] {
        root.push(component);
    }
    Some(root)
}
