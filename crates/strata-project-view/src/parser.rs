use crate::model::ProjectView;
use crate::sections::{
    BazelPathSection, BuildFlagsSection, BuildManualTargetsSection, DebuggerAddressSection,
    ImportDepthSection, JavaPathSection, TargetsSection,
};
use crate::splitter::{split_into_raw_sections, RawSections};
use crate::ProjectViewError;
use std::io;
use std::path::{Path, PathBuf};

const IMPORT_SECTION: &str = "import";

/// Provides the contents of project-view files. Import resolution goes
/// through this seam so tests can inject file contents.
pub trait FileProvider {
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Reads project-view files from the filesystem.
#[derive(Debug, Default, Clone)]
pub struct FsFileProvider;

impl FileProvider for FsFileProvider {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Parses project-view text into a merged [`ProjectView`].
///
/// `import` sections are resolved recursively relative to the importing
/// file's directory. The chain of in-flight imports is tracked; a file that
/// imports itself (directly or through other files) fails with a named cycle
/// error instead of recursing forever.
#[derive(Debug, Default)]
pub struct ProjectViewParser<P = FsFileProvider> {
    files: P,
}

impl ProjectViewParser<FsFileProvider> {
    pub fn new() -> Self {
        ProjectViewParser {
            files: FsFileProvider,
        }
    }
}

impl<P: FileProvider> ProjectViewParser<P> {
    pub fn with_file_provider(files: P) -> Self {
        ProjectViewParser { files }
    }

    /// Parse project-view text. Relative import paths are resolved as given
    /// (against the process working directory).
    pub fn parse(&self, content: &str) -> Result<ProjectView, ProjectViewError> {
        self.parse_content(content, None, &mut Vec::new())
    }

    /// Parse a project-view file. Relative import paths are resolved against
    /// the file's directory.
    pub fn parse_file(&self, path: &Path) -> Result<ProjectView, ProjectViewError> {
        let content = self.files.read(path).map_err(|source| ProjectViewError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_content(&content, Some(path), &mut vec![path.to_path_buf()])
    }

    /// Parse project-view text with a per-section fallback: any section the
    /// primary text omits is taken from the default text instead.
    pub fn parse_with_default(
        &self,
        content: &str,
        default_content: &str,
    ) -> Result<ProjectView, ProjectViewError> {
        let raw = split_into_raw_sections(content);
        let raw_default = split_into_raw_sections(default_content);

        let imports = if raw.all_with_name(IMPORT_SECTION).next().is_some() {
            self.parse_imports(&raw, None, &mut Vec::new())?
        } else {
            self.parse_imports(&raw_default, None, &mut Vec::new())?
        };

        ProjectView::builder()
            .imports(imports)
            .targets(
                TargetsSection::from_raw_sections(&raw)
                    .or_else(|| TargetsSection::from_raw_sections(&raw_default)),
            )
            .build_flags(
                BuildFlagsSection::from_raw_sections(&raw)
                    .or_else(|| BuildFlagsSection::from_raw_sections(&raw_default)),
            )
            .bazel_path(or_default(
                BazelPathSection::from_raw_sections(&raw)?,
                || BazelPathSection::from_raw_sections(&raw_default),
            )?)
            .java_path(or_default(JavaPathSection::from_raw_sections(&raw)?, || {
                JavaPathSection::from_raw_sections(&raw_default)
            })?)
            .debugger_address(or_default(
                DebuggerAddressSection::from_raw_sections(&raw)?,
                || DebuggerAddressSection::from_raw_sections(&raw_default),
            )?)
            .build_manual_targets(or_default(
                BuildManualTargetsSection::from_raw_sections(&raw)?,
                || BuildManualTargetsSection::from_raw_sections(&raw_default),
            )?)
            .import_depth(or_default(
                ImportDepthSection::from_raw_sections(&raw)?,
                || ImportDepthSection::from_raw_sections(&raw_default),
            )?)
            .build()
    }

    fn parse_content(
        &self,
        content: &str,
        file: Option<&Path>,
        in_flight: &mut Vec<PathBuf>,
    ) -> Result<ProjectView, ProjectViewError> {
        let raw = split_into_raw_sections(content);
        let imports = self.parse_imports(&raw, file, in_flight)?;

        ProjectView::builder()
            .imports(imports)
            .targets(TargetsSection::from_raw_sections(&raw))
            .build_flags(BuildFlagsSection::from_raw_sections(&raw))
            .bazel_path(BazelPathSection::from_raw_sections(&raw)?)
            .java_path(JavaPathSection::from_raw_sections(&raw)?)
            .debugger_address(DebuggerAddressSection::from_raw_sections(&raw)?)
            .build_manual_targets(BuildManualTargetsSection::from_raw_sections(&raw)?)
            .import_depth(ImportDepthSection::from_raw_sections(&raw)?)
            .build()
    }

    fn parse_imports(
        &self,
        raw: &RawSections,
        file: Option<&Path>,
        in_flight: &mut Vec<PathBuf>,
    ) -> Result<Vec<ProjectView>, ProjectViewError> {
        let base_dir = file.and_then(Path::parent);
        let mut imports = Vec::new();

        for section in raw.all_with_name(IMPORT_SECTION) {
            let imported_path = section.body.trim();
            if imported_path.is_empty() {
                continue;
            }

            let imported_path = match base_dir {
                Some(dir) => dir.join(imported_path),
                None => PathBuf::from(imported_path),
            };

            if in_flight.contains(&imported_path) {
                return Err(ProjectViewError::ImportCycle {
                    chain: in_flight
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(" -> "),
                    path: imported_path,
                });
            }

            tracing::debug!(path = %imported_path.display(), "parsing imported project view");
            let content =
                self.files
                    .read(&imported_path)
                    .map_err(|source| ProjectViewError::Io {
                        path: imported_path.clone(),
                        source,
                    })?;

            in_flight.push(imported_path.clone());
            let imported = self.parse_content(&content, Some(&imported_path), in_flight)?;
            in_flight.pop();

            imports.push(imported);
        }

        Ok(imports)
    }
}

fn or_default<T>(
    primary: Option<T>,
    fallback: impl FnOnce() -> Result<Option<T>, ProjectViewError>,
) -> Result<Option<T>, ProjectViewError> {
    match primary {
        Some(value) => Ok(Some(value)),
        None => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    struct MapFileProvider {
        files: HashMap<PathBuf, String>,
    }

    impl MapFileProvider {
        fn with(mut self, path: &str, content: &str) -> Self {
            self.files.insert(PathBuf::from(path), content.to_string());
            self
        }
    }

    impl FileProvider for MapFileProvider {
        fn read(&self, path: &Path) -> io::Result<String> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
        }
    }

    #[test]
    fn parses_a_full_view() {
        let parser = ProjectViewParser::new();
        let view = parser
            .parse(
                "targets:\n  //a:a\n  -//a:excluded\n\nbazel_path: /usr/bin/bazel\n\
                 java_path: /usr/bin/java\ndebugger_address: localhost:8000\n\
                 build_flags:\n  --define=ide=true\nimport_depth: 2\n",
            )
            .unwrap();

        let targets = view.targets.unwrap();
        assert_eq!(targets.included, vec!["//a:a"]);
        assert_eq!(targets.excluded, vec!["//a:excluded"]);
        assert_eq!(view.bazel_path.unwrap().value, PathBuf::from("/usr/bin/bazel"));
        assert_eq!(view.java_path.unwrap().value, PathBuf::from("/usr/bin/java"));
        assert_eq!(view.debugger_address.unwrap().port, 8000);
        assert_eq!(view.build_flags.unwrap().flags, vec!["--define=ide=true"]);
        assert_eq!(view.import_depth.unwrap().value, 2);
    }

    #[test]
    fn round_trips_through_generated_text() {
        let parser = ProjectViewParser::new();
        let view = parser
            .parse("targets:\n  //a:a\n  -//a:excluded\n")
            .unwrap();

        let reparsed = parser.parse(&view.to_text()).unwrap();
        assert_eq!(reparsed.targets, view.targets);
    }

    #[test]
    fn imports_are_folded_into_the_parent_view() {
        let files = MapFileProvider::default()
            .with("/work/base.projectview", "targets: //base:all\nbazel_path: /base/bazel\n")
            .with(
                "/work/ide.projectview",
                "import base.projectview\ntargets: //local:all\n",
            );
        let parser = ProjectViewParser::with_file_provider(files);

        let view = parser.parse_file(Path::new("/work/ide.projectview")).unwrap();
        assert_eq!(
            view.targets.unwrap().included,
            vec!["//base:all", "//local:all"]
        );
        assert_eq!(view.bazel_path.unwrap().value, PathBuf::from("/base/bazel"));
    }

    #[test]
    fn transitive_imports_resolve_relative_to_the_importing_file() {
        let files = MapFileProvider::default()
            .with("/work/configs/deep.projectview", "targets: //deep:all\n")
            .with(
                "/work/configs/mid.projectview",
                "import deep.projectview\ntargets: //mid:all\n",
            )
            .with(
                "/work/ide.projectview",
                "import configs/mid.projectview\n",
            );
        let parser = ProjectViewParser::with_file_provider(files);

        let view = parser.parse_file(Path::new("/work/ide.projectview")).unwrap();
        assert_eq!(
            view.targets.unwrap().included,
            vec!["//deep:all", "//mid:all"]
        );
    }

    #[test]
    fn self_import_fails_with_a_cycle_error() {
        let files = MapFileProvider::default().with(
            "/work/ide.projectview",
            "import ide.projectview\ntargets: //a:a\n",
        );
        let parser = ProjectViewParser::with_file_provider(files);

        let err = parser
            .parse_file(Path::new("/work/ide.projectview"))
            .unwrap_err();
        assert!(matches!(err, ProjectViewError::ImportCycle { .. }));
    }

    #[test]
    fn mutual_imports_fail_with_a_cycle_error() {
        let files = MapFileProvider::default()
            .with("/work/a.projectview", "import b.projectview\ntargets: //a:a\n")
            .with("/work/b.projectview", "import a.projectview\ntargets: //b:b\n");
        let parser = ProjectViewParser::with_file_provider(files);

        let err = parser.parse_file(Path::new("/work/a.projectview")).unwrap_err();
        assert!(matches!(err, ProjectViewError::ImportCycle { .. }));
    }

    #[test]
    fn missing_import_is_an_io_error_naming_the_file() {
        let files = MapFileProvider::default()
            .with("/work/ide.projectview", "import gone.projectview\ntargets: //a:a\n");
        let parser = ProjectViewParser::with_file_provider(files);

        let err = parser.parse_file(Path::new("/work/ide.projectview")).unwrap_err();
        match err {
            ProjectViewError::Io { path, .. } => {
                assert_eq!(path, PathBuf::from("/work/gone.projectview"));
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn default_fills_sections_the_primary_view_omits() {
        let parser = ProjectViewParser::new();
        let view = parser
            .parse_with_default(
                "targets: //local:all\n",
                "targets: //default:all\nbazel_path: /default/bazel\n",
            )
            .unwrap();

        // targets exists in the primary view, so the default's targets are
        // not consulted; bazel_path falls back to the default.
        assert_eq!(view.targets.unwrap().included, vec!["//local:all"]);
        assert_eq!(view.bazel_path.unwrap().value, PathBuf::from("/default/bazel"));
    }

    #[test]
    fn empty_primary_view_takes_everything_from_the_default() {
        let parser = ProjectViewParser::new();
        let view = parser
            .parse_with_default("", "targets: //default:all\nimport_depth: 1\n")
            .unwrap();

        assert_eq!(view.targets.unwrap().included, vec!["//default:all"]);
        assert_eq!(view.import_depth.unwrap().value, 1);
    }

    #[test]
    fn view_without_targets_fails_to_parse() {
        let parser = ProjectViewParser::new();
        let err = parser.parse("bazel_path: /usr/bin/bazel\n").unwrap_err();
        assert_eq!(err.to_string(), "'targets' section in project view is empty.");
    }
}
