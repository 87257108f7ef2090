use crate::dependency_tree::DependencyTree;
use crate::languages::LanguagePlugin;
use crate::model::{BuildTargetData, LanguageData};
use crate::paths::BazelPathsResolver;
use serde::Serialize;
use std::collections::BTreeSet;
use strata_core::{TargetInfo, Uri};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CppModule {
    pub copts: Vec<String>,
    pub defines: Vec<String>,
    pub link_opts: Vec<String>,
    pub headers: Vec<Uri>,
}

/// Maps compiler options and headers; C++ needs no whole-graph prepare pass.
pub struct CppLanguagePlugin {
    paths: BazelPathsResolver,
}

impl CppLanguagePlugin {
    pub fn new(paths: BazelPathsResolver) -> Self {
        CppLanguagePlugin { paths }
    }
}

impl LanguagePlugin for CppLanguagePlugin {
    fn resolve_module(&self, target: &TargetInfo) -> Option<LanguageData> {
        let cpp = target.cpp_target_info.as_ref()?;
        Some(LanguageData::Cpp(CppModule {
            copts: cpp.copts.clone(),
            defines: cpp.defines.clone(),
            link_opts: cpp.link_opts.clone(),
            headers: cpp
                .headers
                .iter()
                .map(|header| self.paths.resolve_uri(header))
                .collect(),
        }))
    }

    fn dependency_sources(&self, target: &TargetInfo, tree: &DependencyTree) -> BTreeSet<Uri> {
        if target.cpp_target_info.is_none() {
            return BTreeSet::new();
        }
        tree.transitive_dependencies_excluding_roots(&target.id)
            .iter()
            .flat_map(|dependency| &dependency.sources)
            .map(|source| self.paths.resolve_uri(source))
            .collect()
    }

    fn apply_module_data(&self, data: &LanguageData, build_target: &mut BuildTargetData) {
        if let LanguageData::Cpp(module) = data {
            build_target.data_kind = Some("cpp".to_string());
            build_target.data = serde_json::to_value(module).ok();
        }
    }
}
