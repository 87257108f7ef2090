//! Per-language module resolution.
//!
//! Each plugin turns a raw target descriptor into typed module data for one
//! language family. Plugins share no state, only the [`LanguagePlugin`]
//! contract; dispatch picks one plugin per target from a fixed precedence
//! list over the target's inferred language set.

pub mod cpp;
pub mod java;
mod jvm;
pub mod scala;
pub mod thrift;

use crate::dependency_tree::DependencyTree;
use crate::model::{BuildTargetData, Language, LanguageData};
use crate::paths::BazelPathsResolver;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use strata_core::{TargetInfo, Uri};

pub use jvm::calculate_jvm_source_root;

/// The capability contract every language plugin implements.
///
/// `prepare_sync` runs over *all* targets of the pass before any
/// `resolve_module` call; plugins that rank whole-graph candidates (the JDK,
/// the Scala SDK) depend on that ordering.
pub trait LanguagePlugin {
    fn prepare_sync(&mut self, _targets: &[&TargetInfo]) {}

    fn resolve_module(&self, _target: &TargetInfo) -> Option<LanguageData> {
        None
    }

    fn dependency_sources(&self, _target: &TargetInfo, _tree: &DependencyTree) -> BTreeSet<Uri> {
        BTreeSet::new()
    }

    fn apply_module_data(&self, _data: &LanguageData, _build_target: &mut BuildTargetData) {}

    fn calculate_source_root(&self, _source: &Path) -> Option<PathBuf> {
        None
    }
}

/// Resolves no module data and contributes nothing; the fall-through for
/// targets whose languages no plugin claims.
#[derive(Debug, Default)]
struct NoopLanguagePlugin;

impl LanguagePlugin for NoopLanguagePlugin {}

/// All plugins of the pass, dispatched by language-set precedence:
/// Scala beats Java/Kotlin beats C++ beats Thrift beats the no-op default.
pub struct LanguagePlugins {
    scala: scala::ScalaLanguagePlugin,
    java: java::JavaLanguagePlugin,
    cpp: cpp::CppLanguagePlugin,
    thrift: thrift::ThriftLanguagePlugin,
    noop: NoopLanguagePlugin,
}

impl LanguagePlugins {
    pub fn new(paths: BazelPathsResolver) -> Self {
        LanguagePlugins {
            scala: scala::ScalaLanguagePlugin::new(paths.clone()),
            java: java::JavaLanguagePlugin::new(paths.clone()),
            cpp: cpp::CppLanguagePlugin::new(paths.clone()),
            thrift: thrift::ThriftLanguagePlugin::new(paths),
            noop: NoopLanguagePlugin,
        }
    }

    /// The mandatory whole-graph pre-pass; must complete before any
    /// `resolve_module` call on any plugin.
    pub fn prepare_sync(&mut self, targets: &[&TargetInfo]) {
        self.scala.prepare_sync(targets);
        self.java.prepare_sync(targets);
        self.cpp.prepare_sync(targets);
        self.thrift.prepare_sync(targets);
    }

    pub fn plugin_for(&self, languages: &BTreeSet<Language>) -> &dyn LanguagePlugin {
        if languages.contains(&Language::Scala) {
            &self.scala
        } else if languages.contains(&Language::Java) || languages.contains(&Language::Kotlin) {
            &self.java
        } else if languages.contains(&Language::Cpp) {
            &self.cpp
        } else if languages.contains(&Language::Thrift) {
            &self.thrift
        } else {
            &self.noop
        }
    }
}
