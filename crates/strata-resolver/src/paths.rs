use std::path::PathBuf;
use strata_bazel::BazelInfo;
use strata_core::{FileLocation, Label, Uri};

/// Resolves the build tool's root-relative file locations to absolute paths
/// and URIs.
///
/// Source files live under the workspace root; generated files live under
/// the exec root, inside the output tree named by their
/// `root_execution_path_fragment`.
#[derive(Debug, Clone)]
pub struct BazelPathsResolver {
    info: BazelInfo,
}

impl BazelPathsResolver {
    pub fn new(info: BazelInfo) -> Self {
        BazelPathsResolver { info }
    }

    pub fn info(&self) -> &BazelInfo {
        &self.info
    }

    pub fn workspace_root_uri(&self) -> Uri {
        Uri::from_absolute_path(&self.info.workspace_root)
    }

    pub fn resolve(&self, file: &FileLocation) -> PathBuf {
        if file.is_source && !file.is_external {
            return self.info.workspace_root.join(&file.relative_path);
        }
        if file.root_execution_path_fragment.is_empty() {
            return self.info.execution_root.join(&file.relative_path);
        }
        self.info
            .execution_root
            .join(&file.root_execution_path_fragment)
            .join(&file.relative_path)
    }

    pub fn resolve_uri(&self, file: &FileLocation) -> Uri {
        Uri::from_absolute_path(&self.resolve(file))
    }

    /// The directory a label's package lives in, as a URI.
    pub fn label_to_directory_uri(&self, label: &Label) -> Uri {
        Uri::from_absolute_path(&self.info.workspace_root.join(label.package_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> BazelPathsResolver {
        BazelPathsResolver::new(BazelInfo {
            execution_root: PathBuf::from("/cache/execroot/main"),
            output_base: PathBuf::from("/cache/output_base"),
            workspace_root: PathBuf::from("/work/project"),
            release: None,
        })
    }

    #[test]
    fn source_files_resolve_under_the_workspace_root() {
        let path = resolver().resolve(&FileLocation {
            relative_path: "server/sync/A.java".to_string(),
            is_source: true,
            ..FileLocation::default()
        });
        assert_eq!(path, PathBuf::from("/work/project/server/sync/A.java"));
    }

    #[test]
    fn generated_files_resolve_under_their_output_tree() {
        let path = resolver().resolve(&FileLocation {
            relative_path: "server/sync/lib.jar".to_string(),
            root_execution_path_fragment: "bazel-out/k8-fastbuild/bin".to_string(),
            is_source: false,
            ..FileLocation::default()
        });
        assert_eq!(
            path,
            PathBuf::from("/cache/execroot/main/bazel-out/k8-fastbuild/bin/server/sync/lib.jar")
        );
    }

    #[test]
    fn labels_map_to_their_package_directory() {
        let uri = resolver().label_to_directory_uri(&Label::new("//server/sync:lib"));
        assert_eq!(uri.as_str(), "file:///work/project/server/sync");
    }
}
