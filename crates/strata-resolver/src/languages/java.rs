use crate::dependency_tree::DependencyTree;
use crate::languages::{calculate_jvm_source_root, LanguagePlugin};
use crate::model::{BuildTargetData, LanguageData};
use crate::paths::BazelPathsResolver;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use strata_core::{FileLocation, JvmOutputs, TargetInfo, Uri};

/// The JDK a module compiles against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Jdk {
    pub version: String,
    pub java_home: Option<Uri>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaModule {
    pub jdk: Option<Jdk>,
    pub javac_opts: Vec<String>,
    pub jvm_flags: Vec<String>,
    pub main_output: Option<Uri>,
    pub all_outputs: Vec<Uri>,
    pub main_class: Option<String>,
    pub args: Vec<String>,
}

/// Picks one JDK for the whole project from the toolchain and runtime facts
/// scattered across the target graph.
///
/// Every target contributes at most one candidate. Ranking prefers the
/// latest-versioned complete candidates (version and home both known), and
/// runtime-provided homes over toolchain ones; ties break on the home path so
/// results are stable across passes.
#[derive(Debug, Default)]
pub struct JdkResolver;

#[derive(Debug, Clone, PartialEq, Eq)]
struct JdkCandidate {
    is_runtime: bool,
    java_home: Option<Uri>,
    version: Option<u32>,
}

impl JdkCandidate {
    fn is_complete(&self) -> bool {
        self.java_home.is_some() && self.version.is_some()
    }

    fn as_jdk(&self) -> Option<Jdk> {
        self.version.map(|version| Jdk {
            version: version.to_string(),
            java_home: self.java_home.clone(),
        })
    }
}

impl JdkResolver {
    pub fn resolve(&self, targets: &[&TargetInfo], paths: &BazelPathsResolver) -> Option<Jdk> {
        let mut candidates: Vec<JdkCandidate> = targets
            .iter()
            .filter_map(|target| self.candidate(target, paths))
            .collect();
        // Ordered by home path so ranking ties break the same way every pass.
        candidates.sort_by(|a, b| a.java_home.cmp(&b.java_home));
        candidates.dedup();

        let latest = candidates
            .iter()
            .filter_map(|candidate| candidate.version)
            .max()?;
        let latest_complete: Vec<&JdkCandidate> = candidates
            .iter()
            .filter(|candidate| candidate.is_complete() && candidate.version == Some(latest))
            .collect();
        let complete: Vec<&JdkCandidate> = candidates
            .iter()
            .filter(|candidate| candidate.is_complete())
            .collect();

        pick_runtime(&latest_complete)
            .or_else(|| latest_complete.first().copied())
            .or_else(|| pick_runtime(&complete))
            .or_else(|| complete.first().copied())
            .or_else(|| candidates.first())
            .and_then(JdkCandidate::as_jdk)
    }

    fn candidate(&self, target: &TargetInfo, paths: &BazelPathsResolver) -> Option<JdkCandidate> {
        let runtime_home = target
            .java_runtime_info
            .as_ref()
            .and_then(|info| info.java_home.as_ref());
        let toolchain = target.java_toolchain_info.as_ref();
        let java_home = runtime_home
            .or_else(|| toolchain.and_then(|info| info.java_home.as_ref()))
            .map(|home| paths.resolve_uri(home));
        let version = toolchain.and_then(|info| info.source_version.parse().ok());

        if java_home.is_none() && version.is_none() {
            return None;
        }
        Some(JdkCandidate {
            is_runtime: runtime_home.is_some(),
            java_home,
            version,
        })
    }
}

fn pick_runtime<'a>(candidates: &[&'a JdkCandidate]) -> Option<&'a JdkCandidate> {
    candidates
        .iter()
        .find(|candidate| candidate.is_runtime)
        .copied()
}

pub struct JavaLanguagePlugin {
    paths: BazelPathsResolver,
    jdk_resolver: JdkResolver,
    jdk: Option<Jdk>,
}

impl JavaLanguagePlugin {
    pub fn new(paths: BazelPathsResolver) -> Self {
        JavaLanguagePlugin {
            paths,
            jdk_resolver: JdkResolver,
            jdk: None,
        }
    }

    /// The module mapping shared with the Scala plugin, which wraps it.
    pub(crate) fn resolve_java_module(&self, target: &TargetInfo) -> Option<JavaModule> {
        let jvm = target.jvm_target_info.as_ref()?;

        let main_output = jvm
            .jars
            .first()
            .and_then(|outputs| outputs.binary_jars.first())
            .map(|jar| self.paths.resolve_uri(jar));
        let all_outputs = jvm
            .jars
            .iter()
            .flat_map(|outputs| outputs.interface_jars.iter().chain(&outputs.binary_jars))
            .map(|jar| self.paths.resolve_uri(jar))
            .collect();
        let main_class = Some(jvm.main_class.clone()).filter(|class| !class.is_empty());

        Some(JavaModule {
            jdk: self.jdk.clone(),
            javac_opts: jvm.javac_opts.clone(),
            jvm_flags: jvm.jvm_flags.clone(),
            main_output,
            all_outputs,
            main_class,
            args: jvm.args.clone(),
        })
    }

    /// Source jars of the target's transitive non-root closure.
    pub(crate) fn jvm_dependency_sources(
        &self,
        target: &TargetInfo,
        tree: &DependencyTree,
    ) -> BTreeSet<Uri> {
        if target.jvm_target_info.is_none() {
            return BTreeSet::new();
        }
        tree.transitive_dependencies_excluding_roots(&target.id)
            .iter()
            .flat_map(|dependency| source_jars(dependency))
            .map(|jar| self.paths.resolve_uri(jar))
            .collect()
    }
}

fn source_jars(target: &TargetInfo) -> impl Iterator<Item = &FileLocation> {
    target
        .jvm_target_info
        .iter()
        .flat_map(|jvm| jvm.jars.iter().chain(&jvm.generated_jars))
        .flat_map(|outputs: &JvmOutputs| &outputs.source_jars)
}

impl LanguagePlugin for JavaLanguagePlugin {
    fn prepare_sync(&mut self, targets: &[&TargetInfo]) {
        self.jdk = self.jdk_resolver.resolve(targets, &self.paths);
    }

    fn resolve_module(&self, target: &TargetInfo) -> Option<LanguageData> {
        self.resolve_java_module(target).map(LanguageData::Java)
    }

    fn dependency_sources(&self, target: &TargetInfo, tree: &DependencyTree) -> BTreeSet<Uri> {
        self.jvm_dependency_sources(target, tree)
    }

    fn apply_module_data(&self, data: &LanguageData, build_target: &mut BuildTargetData) {
        if let LanguageData::Java(module) = data {
            build_target.data_kind = Some("jvm".to_string());
            build_target.data = serde_json::to_value(module).ok();
        }
    }

    fn calculate_source_root(&self, source: &Path) -> Option<PathBuf> {
        calculate_jvm_source_root(source, false)
    }
}
