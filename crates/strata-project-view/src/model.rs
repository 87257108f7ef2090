use crate::sections::{
    BazelPathSection, BuildFlagsSection, BuildManualTargetsSection, DebuggerAddressSection,
    ImportDepthSection, JavaPathSection, TargetsSection,
};
use crate::ProjectViewError;
use std::fmt;

/// An immutable, fully merged project view.
///
/// Constructed through [`ProjectView::builder`], which folds imported views
/// into the local sections: list sections concatenate imported values before
/// local values; singleton sections take the closest explicit value, falling
/// back through imports in reverse declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectView {
    pub targets: Option<TargetsSection>,
    pub bazel_path: Option<BazelPathSection>,
    pub debugger_address: Option<DebuggerAddressSection>,
    pub java_path: Option<JavaPathSection>,
    pub build_flags: Option<BuildFlagsSection>,
    pub build_manual_targets: Option<BuildManualTargetsSection>,
    pub import_depth: Option<ImportDepthSection>,
}

impl ProjectView {
    pub fn builder() -> ProjectViewBuilder {
        ProjectViewBuilder::default()
    }

    /// Render the view back to project-view text. Re-parsing the output
    /// yields an equal view (multiset equality on list sections).
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let mut push = |section: &dyn fmt::Display| {
            out.push_str(&section.to_string());
            out.push('\n');
        };
        if let Some(targets) = &self.targets {
            push(targets);
        }
        if let Some(bazel_path) = &self.bazel_path {
            push(bazel_path);
        }
        if let Some(debugger_address) = &self.debugger_address {
            push(debugger_address);
        }
        if let Some(java_path) = &self.java_path {
            push(java_path);
        }
        if let Some(build_flags) = &self.build_flags {
            push(build_flags);
        }
        if let Some(build_manual_targets) = &self.build_manual_targets {
            push(build_manual_targets);
        }
        if let Some(import_depth) = &self.import_depth {
            push(import_depth);
        }
        out
    }
}

#[derive(Debug, Default)]
pub struct ProjectViewBuilder {
    imports: Vec<ProjectView>,
    targets: Option<TargetsSection>,
    bazel_path: Option<BazelPathSection>,
    debugger_address: Option<DebuggerAddressSection>,
    java_path: Option<JavaPathSection>,
    build_flags: Option<BuildFlagsSection>,
    build_manual_targets: Option<BuildManualTargetsSection>,
    import_depth: Option<ImportDepthSection>,
}

impl ProjectViewBuilder {
    pub fn imports(mut self, imports: Vec<ProjectView>) -> Self {
        self.imports = imports;
        self
    }

    pub fn targets(mut self, targets: Option<TargetsSection>) -> Self {
        self.targets = targets;
        self
    }

    pub fn bazel_path(mut self, bazel_path: Option<BazelPathSection>) -> Self {
        self.bazel_path = bazel_path;
        self
    }

    pub fn debugger_address(mut self, debugger_address: Option<DebuggerAddressSection>) -> Self {
        self.debugger_address = debugger_address;
        self
    }

    pub fn java_path(mut self, java_path: Option<JavaPathSection>) -> Self {
        self.java_path = java_path;
        self
    }

    pub fn build_flags(mut self, build_flags: Option<BuildFlagsSection>) -> Self {
        self.build_flags = build_flags;
        self
    }

    pub fn build_manual_targets(
        mut self,
        build_manual_targets: Option<BuildManualTargetsSection>,
    ) -> Self {
        self.build_manual_targets = build_manual_targets;
        self
    }

    pub fn import_depth(mut self, import_depth: Option<ImportDepthSection>) -> Self {
        self.import_depth = import_depth;
        self
    }

    /// Merge imports into the local sections and validate the result.
    ///
    /// The merged `targets` section must exist and have at least one included
    /// entry; every other section is optional.
    pub fn build(self) -> Result<ProjectView, ProjectViewError> {
        tracing::debug!(
            imports = self.imports.len(),
            has_local_targets = self.targets.is_some(),
            "building project view"
        );

        let targets = self.merge_targets();
        let build_flags = self.merge_build_flags();
        let view = ProjectView {
            bazel_path: Self::merge_singleton(self.bazel_path, &self.imports, |view| {
                view.bazel_path.clone()
            }),
            debugger_address: Self::merge_singleton(self.debugger_address, &self.imports, |view| {
                view.debugger_address.clone()
            }),
            java_path: Self::merge_singleton(self.java_path, &self.imports, |view| {
                view.java_path.clone()
            }),
            build_manual_targets: Self::merge_singleton(
                self.build_manual_targets,
                &self.imports,
                |view| view.build_manual_targets,
            ),
            import_depth: Self::merge_singleton(self.import_depth, &self.imports, |view| {
                view.import_depth
            }),
            targets,
            build_flags,
        };

        match &view.targets {
            None => Err(ProjectViewError::MissingTargets),
            Some(targets) if targets.included.is_empty() => {
                Err(ProjectViewError::NoIncludedTargets)
            }
            Some(_) => Ok(view),
        }
    }

    fn merge_targets(&self) -> Option<TargetsSection> {
        let mut included: Vec<String> = self
            .imports
            .iter()
            .filter_map(|view| view.targets.as_ref())
            .flat_map(|section| section.included.iter().cloned())
            .collect();
        let mut excluded: Vec<String> = self
            .imports
            .iter()
            .filter_map(|view| view.targets.as_ref())
            .flat_map(|section| section.excluded.iter().cloned())
            .collect();
        if let Some(local) = &self.targets {
            included.extend(local.included.iter().cloned());
            excluded.extend(local.excluded.iter().cloned());
        }
        (!included.is_empty() || !excluded.is_empty())
            .then_some(TargetsSection::new(included, excluded))
    }

    fn merge_build_flags(&self) -> Option<BuildFlagsSection> {
        let mut flags: Vec<String> = self
            .imports
            .iter()
            .filter_map(|view| view.build_flags.as_ref())
            .flat_map(|section| section.flags.iter().cloned())
            .collect();
        if let Some(local) = &self.build_flags {
            flags.extend(local.flags.iter().cloned());
        }
        (!flags.is_empty()).then_some(BuildFlagsSection::new(flags))
    }

    fn merge_singleton<T>(
        local: Option<T>,
        imports: &[ProjectView],
        get: impl Fn(&ProjectView) -> Option<T>,
    ) -> Option<T> {
        local.or_else(|| imports.iter().rev().find_map(get))
    }
}
