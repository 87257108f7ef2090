use crate::languages::{cpp::CppModule, java::JavaModule, scala::ScalaModule};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use strata_core::{Label, TargetInfo, Uri};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Kotlin,
    Scala,
    Cpp,
    Thrift,
}

impl Language {
    pub fn all() -> [Language; 5] {
        [
            Language::Java,
            Language::Kotlin,
            Language::Scala,
            Language::Cpp,
            Language::Thrift,
        ]
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Java => &[".java"],
            Language::Kotlin => &[".kt", ".kts"],
            Language::Scala => &[".scala"],
            Language::Cpp => &[".cpp", ".cc", ".cxx", ".hpp", ".h"],
            Language::Thrift => &[".thrift"],
        }
    }

    /// Rule kinds that imply the language even for sourceless targets.
    pub fn binary_kinds(&self) -> &'static [&'static str] {
        match self {
            Language::Java => &["java_binary", "java_test"],
            Language::Kotlin => &["kt_jvm_binary", "kt_jvm_test"],
            Language::Scala => &["scala_binary", "scala_test"],
            Language::Cpp => &["cc_binary", "cc_test"],
            Language::Thrift => &[],
        }
    }

    /// Infer a target's languages from its source-file extensions, falling
    /// back to binary-rule kinds for targets with no declared sources.
    pub fn infer(target: &TargetInfo) -> BTreeSet<Language> {
        if target.sources.is_empty() {
            return Language::all()
                .into_iter()
                .filter(|language| language.binary_kinds().contains(&target.kind.as_str()))
                .collect();
        }

        target
            .sources
            .iter()
            .flat_map(|source| {
                Language::all().into_iter().filter(|language| {
                    language
                        .extensions()
                        .iter()
                        .any(|extension| source.relative_path.ends_with(extension))
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tag {
    Application,
    Library,
    Test,
    NoIde,
    Manual,
}

impl Tag {
    /// Derive module tags from the rule kind and the target's own tag list.
    pub fn resolve(target: &TargetInfo) -> BTreeSet<Tag> {
        let mut tags = BTreeSet::new();
        if target.kind.ends_with("_binary") {
            tags.insert(Tag::Application);
        } else if target.kind.ends_with("_test") {
            tags.insert(Tag::Test);
        } else {
            tags.insert(Tag::Library);
        }
        if target.tags.iter().any(|tag| tag == "no-ide") {
            tags.insert(Tag::NoIde);
        }
        if target.tags.iter().any(|tag| tag == "manual") {
            tags.insert(Tag::Manual);
        }
        tags
    }
}

/// A module's source files plus the package roots they hang under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceSet {
    pub sources: BTreeSet<Uri>,
    pub source_roots: BTreeSet<Uri>,
}

/// Language-specific module data, owned by the plugin that resolved it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LanguageData {
    Java(JavaModule),
    Scala(ScalaModule),
    Cpp(CppModule),
}

/// Protocol-facing payload a plugin attaches to an IDE build target.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildTargetData {
    pub data_kind: Option<String>,
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub label: Label,
    pub direct_dependencies: Vec<Label>,
    pub languages: BTreeSet<Language>,
    pub tags: BTreeSet<Tag>,
    pub base_directory: Uri,
    pub source_set: SourceSet,
    pub resources: BTreeSet<Uri>,
    pub source_dependencies: BTreeSet<Uri>,
    pub language_data: Option<LanguageData>,
}

/// The resolved project model: built once per resolution pass, immutable
/// afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    workspace_root: Uri,
    modules: Vec<Module>,
    /// Derived lookup, not a second source of truth.
    source_to_target: HashMap<Uri, Label>,
    #[serde(skip)]
    module_index: HashMap<Label, usize>,
}

impl Project {
    pub fn new(
        workspace_root: Uri,
        modules: Vec<Module>,
        source_to_target: HashMap<Uri, Label>,
    ) -> Self {
        let module_index = modules
            .iter()
            .enumerate()
            .map(|(idx, module)| (module.label.clone(), idx))
            .collect();
        Project {
            workspace_root,
            modules,
            source_to_target,
            module_index,
        }
    }

    pub fn workspace_root(&self) -> &Uri {
        &self.workspace_root
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn find_module(&self, label: &Label) -> Option<&Module> {
        self.module_index
            .get(label)
            .map(|&idx| &self.modules[idx])
    }

    pub fn find_target_by_source(&self, source: &Uri) -> Option<&Label> {
        self.source_to_target.get(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::FileLocation;

    fn target_with_sources(kind: &str, sources: &[&str]) -> TargetInfo {
        TargetInfo {
            id: "//a:a".to_string(),
            kind: kind.to_string(),
            sources: sources
                .iter()
                .map(|path| FileLocation {
                    relative_path: path.to_string(),
                    is_source: true,
                    ..FileLocation::default()
                })
                .collect(),
            ..TargetInfo::default()
        }
    }

    #[test]
    fn languages_come_from_source_extensions() {
        let target = target_with_sources("java_library", &["a/A.java", "a/B.kt"]);
        let languages = Language::infer(&target);
        assert!(languages.contains(&Language::Java));
        assert!(languages.contains(&Language::Kotlin));
        assert!(!languages.contains(&Language::Scala));
    }

    #[test]
    fn sourceless_binaries_infer_from_the_rule_kind() {
        let target = target_with_sources("java_binary", &[]);
        assert_eq!(Language::infer(&target), BTreeSet::from([Language::Java]));
    }

    #[test]
    fn kinds_map_to_tags() {
        assert!(Tag::resolve(&target_with_sources("java_binary", &[])).contains(&Tag::Application));
        assert!(Tag::resolve(&target_with_sources("java_test", &[])).contains(&Tag::Test));
        assert!(Tag::resolve(&target_with_sources("java_library", &[])).contains(&Tag::Library));

        let mut manual = target_with_sources("java_library", &[]);
        manual.tags.push("manual".to_string());
        assert!(Tag::resolve(&manual).contains(&Tag::Manual));
    }
}
