use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The aspect's analyzed description of one target.
///
/// Produced once per resolution pass and immutable afterwards. Unknown fields
/// are ignored so older engines tolerate newer aspect outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetInfo {
    pub id: String,
    pub kind: String,
    pub tags: Vec<String>,
    pub dependencies: Vec<Dependency>,
    pub sources: Vec<FileLocation>,
    pub resources: Vec<FileLocation>,
    pub env: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jvm_target_info: Option<JvmTargetInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_toolchain_info: Option<JavaToolchainInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_runtime_info: Option<JavaRuntimeInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scala_target_info: Option<ScalaTargetInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpp_target_info: Option<CppTargetInfo>,
}

impl TargetInfo {
    pub fn dependency_ids(&self) -> impl Iterator<Item = &str> {
        self.dependencies.iter().map(|dep| dep.id.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dependency {
    pub id: String,
}

impl Dependency {
    pub fn new(id: impl Into<String>) -> Self {
        Dependency { id: id.into() }
    }
}

/// A file the build tool knows about, relative to one of its roots.
///
/// Source files live under the workspace root; generated files carry the
/// `root_execution_path_fragment` of the output tree they were written to.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileLocation {
    pub relative_path: String,
    pub root_execution_path_fragment: String,
    pub is_source: bool,
    pub is_external: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JvmOutputs {
    pub binary_jars: Vec<FileLocation>,
    pub interface_jars: Vec<FileLocation>,
    pub source_jars: Vec<FileLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JvmTargetInfo {
    pub jars: Vec<JvmOutputs>,
    pub generated_jars: Vec<JvmOutputs>,
    pub javac_opts: Vec<String>,
    pub jvm_flags: Vec<String>,
    pub main_class: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JavaToolchainInfo {
    pub source_version: String,
    pub target_version: String,
    pub java_home: Option<FileLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JavaRuntimeInfo {
    pub java_home: Option<FileLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScalaTargetInfo {
    pub scalac_opts: Vec<String>,
    pub compiler_classpath: Vec<FileLocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CppTargetInfo {
    pub copts: Vec<String>,
    pub defines: Vec<String>,
    pub link_opts: Vec<String>,
    pub headers: Vec<FileLocation>,
}
