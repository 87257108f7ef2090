use crate::ContextError;
use std::path::PathBuf;
use strata_core::Label;
use strata_project_view::ProjectView;

const CONTEXT_NAME: &str = "Workspace context";

/// Targets (included and excluded) the user wants to work on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetsSpec {
    pub included: Vec<Label>,
    pub excluded: Vec<Label>,
}

/// Flags added to every bazel invocation of the pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildFlagsSpec {
    pub flags: Vec<String>,
}

/// The bazel binary used by the runner.
///
/// When the view does not pin one, the plain program name is used and the
/// operating system resolves it at spawn time; the engine itself reads no
/// ambient search path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BazelBinarySpec {
    pub value: PathBuf,
}

impl Default for BazelBinarySpec {
    fn default() -> Self {
        BazelBinarySpec {
            value: PathBuf::from("bazel"),
        }
    }
}

/// Whether targets tagged `manual` are built as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildManualTargetsSpec {
    pub value: bool,
}

/// How deep below the requested targets modules are imported; `-1` means
/// unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportDepthSpec {
    pub value: i32,
}

impl Default for ImportDepthSpec {
    fn default() -> Self {
        ImportDepthSpec { value: -1 }
    }
}

/// Target selection and bazel invocation settings for one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceContext {
    pub targets: TargetsSpec,
    pub build_flags: BuildFlagsSpec,
    pub bazel_binary: BazelBinarySpec,
    pub build_manual_targets: BuildManualTargetsSpec,
    pub import_depth: ImportDepthSpec,
}

impl WorkspaceContext {
    pub fn builder() -> WorkspaceContextBuilder {
        WorkspaceContextBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct WorkspaceContextBuilder {
    targets: Option<TargetsSpec>,
    build_flags: Option<BuildFlagsSpec>,
    bazel_binary: Option<BazelBinarySpec>,
    build_manual_targets: Option<BuildManualTargetsSpec>,
    import_depth: Option<ImportDepthSpec>,
}

impl WorkspaceContextBuilder {
    pub fn targets(mut self, targets: TargetsSpec) -> Self {
        self.targets = Some(targets);
        self
    }

    pub fn build_flags(mut self, build_flags: BuildFlagsSpec) -> Self {
        self.build_flags = Some(build_flags);
        self
    }

    pub fn bazel_binary(mut self, bazel_binary: BazelBinarySpec) -> Self {
        self.bazel_binary = Some(bazel_binary);
        self
    }

    pub fn build_manual_targets(mut self, build_manual_targets: BuildManualTargetsSpec) -> Self {
        self.build_manual_targets = Some(build_manual_targets);
        self
    }

    pub fn import_depth(mut self, import_depth: ImportDepthSpec) -> Self {
        self.import_depth = Some(import_depth);
        self
    }

    pub fn build(self) -> Result<WorkspaceContext, ContextError> {
        let Some(targets) = self.targets else {
            return Err(ContextError::missing_field(CONTEXT_NAME, "targets"));
        };
        Ok(WorkspaceContext {
            targets,
            build_flags: self.build_flags.unwrap_or_default(),
            bazel_binary: self.bazel_binary.unwrap_or_default(),
            build_manual_targets: self.build_manual_targets.unwrap_or_default(),
            import_depth: self.import_depth.unwrap_or_default(),
        })
    }
}

/// Builds a [`WorkspaceContext`] from a project view, one mapper per field.
#[derive(Debug, Default)]
pub struct WorkspaceContextConstructor;

impl WorkspaceContextConstructor {
    pub fn construct(view: &ProjectView) -> Result<WorkspaceContext, ContextError> {
        tracing::debug!("constructing workspace context");

        WorkspaceContext::builder()
            .targets(map_targets(view)?)
            .build_flags(map_build_flags(view))
            .bazel_binary(map_bazel_binary(view))
            .build_manual_targets(map_build_manual_targets(view))
            .import_depth(map_import_depth(view))
            .build()
    }
}

/// The view-level emptiness check already ran at parse time; this re-validates
/// because targets may have been filtered between parsing and construction.
fn map_targets(view: &ProjectView) -> Result<TargetsSpec, ContextError> {
    let section = view
        .targets
        .as_ref()
        .ok_or_else(|| ContextError::mapping("targets", "'targets' section in project view is empty."))?;

    if section.included.is_empty() {
        return Err(ContextError::mapping(
            "targets",
            "'targets' section has no included targets.",
        ));
    }

    Ok(TargetsSpec {
        included: section.included.iter().map(Label::new).collect(),
        excluded: section.excluded.iter().map(Label::new).collect(),
    })
}

fn map_build_flags(view: &ProjectView) -> BuildFlagsSpec {
    view.build_flags
        .as_ref()
        .map(|section| BuildFlagsSpec {
            flags: section.flags.clone(),
        })
        .unwrap_or_default()
}

fn map_bazel_binary(view: &ProjectView) -> BazelBinarySpec {
    view.bazel_path
        .as_ref()
        .map(|section| BazelBinarySpec {
            value: section.value.clone(),
        })
        .unwrap_or_default()
}

fn map_build_manual_targets(view: &ProjectView) -> BuildManualTargetsSpec {
    view.build_manual_targets
        .as_ref()
        .map(|section| BuildManualTargetsSpec {
            value: section.value,
        })
        .unwrap_or_default()
}

fn map_import_depth(view: &ProjectView) -> ImportDepthSpec {
    view.import_depth
        .as_ref()
        .map(|section| ImportDepthSpec {
            value: section.value,
        })
        .unwrap_or_default()
}
