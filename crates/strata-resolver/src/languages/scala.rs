use crate::dependency_tree::DependencyTree;
use crate::languages::java::{JavaLanguagePlugin, JavaModule};
use crate::languages::{calculate_jvm_source_root, LanguagePlugin};
use crate::model::{BuildTargetData, LanguageData};
use crate::paths::BazelPathsResolver;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use strata_core::{TargetInfo, Uri};

fn compiler_jar_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"scala-(?:library|compiler|reflect)-([.\d]+)\.jar$").expect("valid regex")
    })
}

/// The Scala SDK shared by every Scala module of the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalaSdk {
    pub organization: String,
    pub version: String,
    pub binary_version: String,
    pub compiler_jars: Vec<Uri>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalaModule {
    pub sdk: Option<ScalaSdk>,
    pub scalac_opts: Vec<String>,
    pub java_module: Option<JavaModule>,
}

/// Wraps the Java mapping with scalac options and the project SDK.
pub struct ScalaLanguagePlugin {
    paths: BazelPathsResolver,
    java: JavaLanguagePlugin,
    sdk: Option<ScalaSdk>,
}

impl ScalaLanguagePlugin {
    pub fn new(paths: BazelPathsResolver) -> Self {
        ScalaLanguagePlugin {
            java: JavaLanguagePlugin::new(paths.clone()),
            paths,
            sdk: None,
        }
    }

    /// The newest SDK named by any target's compiler classpath.
    fn resolve_sdk(&self, targets: &[&TargetInfo]) -> Option<ScalaSdk> {
        let mut sdks: Vec<ScalaSdk> = targets
            .iter()
            .filter_map(|target| self.sdk_of(target))
            .collect();
        sdks.sort_by(|a, b| version_key(&a.version).cmp(&version_key(&b.version)));
        sdks.pop()
    }

    fn sdk_of(&self, target: &TargetInfo) -> Option<ScalaSdk> {
        let scala = target.scala_target_info.as_ref()?;
        let mut compiler_jars: Vec<Uri> = scala
            .compiler_classpath
            .iter()
            .map(|jar| self.paths.resolve_uri(jar))
            .collect();
        compiler_jars.sort();

        let version = compiler_jars
            .iter()
            .filter_map(|jar| {
                compiler_jar_regex()
                    .captures(jar.as_str())
                    .map(|captures| captures[1].to_string())
            })
            .max_by_key(|version| version_key(version))?;
        let binary_version = version
            .split('.')
            .take(2)
            .collect::<Vec<_>>()
            .join(".");

        Some(ScalaSdk {
            organization: "org.scala-lang".to_string(),
            version,
            binary_version,
            compiler_jars,
        })
    }
}

fn version_key(version: &str) -> Vec<u32> {
    version
        .split('.')
        .map(|segment| segment.parse().unwrap_or(0))
        .collect()
}

impl LanguagePlugin for ScalaLanguagePlugin {
    fn prepare_sync(&mut self, targets: &[&TargetInfo]) {
        self.sdk = self.resolve_sdk(targets);
        self.java.prepare_sync(targets);
    }

    fn resolve_module(&self, target: &TargetInfo) -> Option<LanguageData> {
        let scala = target.scala_target_info.as_ref()?;
        Some(LanguageData::Scala(ScalaModule {
            sdk: self.sdk.clone(),
            scalac_opts: scala.scalac_opts.clone(),
            java_module: self.java.resolve_java_module(target),
        }))
    }

    fn dependency_sources(&self, target: &TargetInfo, tree: &DependencyTree) -> BTreeSet<Uri> {
        self.java.jvm_dependency_sources(target, tree)
    }

    fn apply_module_data(&self, data: &LanguageData, build_target: &mut BuildTargetData) {
        if let LanguageData::Scala(module) = data {
            build_target.data_kind = Some("scala".to_string());
            build_target.data = serde_json::to_value(module).ok();
        }
    }

    fn calculate_source_root(&self, source: &Path) -> Option<PathBuf> {
        // Scala allows one package split over several declarations.
        calculate_jvm_source_root(source, true)
    }
}
