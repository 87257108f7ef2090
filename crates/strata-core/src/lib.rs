//! Shared vocabulary for the Strata resolution engine.
//!
//! This crate holds the types every other Strata crate speaks:
//! - [`Label`]: a bazel target label (`//package/path:name`)
//! - [`Uri`]: a `file://` location, buildable from exec-root or workspace paths
//! - [`TargetInfo`]: the raw per-target descriptor produced by the aspect run

mod label;
mod target_info;
mod uri;

pub use crate::{
    label::Label,
    target_info::{
        CppTargetInfo, Dependency, FileLocation, JavaRuntimeInfo, JavaToolchainInfo, JvmOutputs,
        JvmTargetInfo, ScalaTargetInfo, TargetInfo,
    },
    uri::{Uri, UriError, EXEC_ROOT_SCHEME},
};
