use crate::dependency_tree::DependencyTree;
use crate::languages::LanguagePlugin;
use crate::paths::BazelPathsResolver;
use std::collections::BTreeSet;
use strata_core::{TargetInfo, Uri};

/// Thrift targets carry no module data; the IDE only needs the transitive
/// `.thrift` sources for cross-file navigation.
pub struct ThriftLanguagePlugin {
    paths: BazelPathsResolver,
}

impl ThriftLanguagePlugin {
    pub fn new(paths: BazelPathsResolver) -> Self {
        ThriftLanguagePlugin { paths }
    }
}

impl LanguagePlugin for ThriftLanguagePlugin {
    fn dependency_sources(&self, target: &TargetInfo, tree: &DependencyTree) -> BTreeSet<Uri> {
        tree.transitive_dependencies_excluding_roots(&target.id)
            .iter()
            .flat_map(|dependency| &dependency.sources)
            .filter(|source| source.relative_path.ends_with(".thrift"))
            .map(|source| self.paths.resolve_uri(source))
            .collect()
    }
}
