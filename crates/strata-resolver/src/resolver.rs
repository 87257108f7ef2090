use crate::mapper::ProjectMapper;
use crate::model::Project;
use crate::paths::BazelPathsResolver;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Instant;
use strata_bazel::{discover_targets, BazelRunner, CommandRunner, DiscoveryResult};
use strata_execution_context::{WorkspaceContext, WorkspaceContextConstructor};
use strata_project_view::ProjectView;

/// The bazel boundary of a resolution pass: produces the complete analyzed
/// target map plus the root-target set. A trait so tests can resolve projects
/// without a bazel installation.
pub trait TargetDiscovery {
    fn discover(&self, context: &WorkspaceContext) -> Result<DiscoveryResult>;
}

/// Production discovery: an aspect build followed by a scan of the descriptor
/// files the aspect wrote under the output base.
pub struct BazelTargetDiscovery<R: CommandRunner> {
    runner: BazelRunner<R>,
    aspect_output_root: PathBuf,
}

impl<R: CommandRunner> BazelTargetDiscovery<R> {
    pub fn new(runner: BazelRunner<R>, aspect_output_root: impl Into<PathBuf>) -> Self {
        BazelTargetDiscovery {
            runner,
            aspect_output_root: aspect_output_root.into(),
        }
    }
}

impl<R: CommandRunner> TargetDiscovery for BazelTargetDiscovery<R> {
    fn discover(&self, context: &WorkspaceContext) -> Result<DiscoveryResult> {
        discover_targets(&self.runner, context, &self.aspect_output_root)
    }
}

/// Queries bazel and constructs the [`Project`] instance.
///
/// One resolution pass, single-threaded and synchronous: context
/// construction, discovery, and mapping each consume the complete output of
/// the previous stage. There is no mid-pass abort point; a pass either
/// completes or fails.
pub struct ProjectResolver<D> {
    discovery: D,
    mapper: ProjectMapper,
}

impl<D: TargetDiscovery> ProjectResolver<D> {
    pub fn new(discovery: D, paths: BazelPathsResolver) -> Self {
        ProjectResolver {
            discovery,
            mapper: ProjectMapper::new(paths),
        }
    }

    pub fn mapper(&self) -> &ProjectMapper {
        &self.mapper
    }

    pub fn resolve(&mut self, view: &ProjectView) -> Result<Project> {
        let context = timed("constructing workspace context", || {
            WorkspaceContextConstructor::construct(view)
        })
        .context("reading project view into a workspace context failed")?;

        let discovered = timed("discovering targets", || self.discovery.discover(&context))?;

        let project = timed("mapping to the project model", || {
            self.mapper
                .create_project(discovered.targets, discovered.root_targets, &context)
        });
        Ok(project)
    }
}

fn timed<T>(stage: &'static str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    tracing::info!(stage, elapsed_ms = start.elapsed().as_millis() as u64, "stage finished");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::path::PathBuf;
    use strata_bazel::BazelInfo;
    use strata_core::{Dependency, FileLocation, Label, TargetInfo};
    use strata_project_view::ProjectViewParser;

    struct StubDiscovery {
        result: DiscoveryResult,
    }

    impl TargetDiscovery for StubDiscovery {
        fn discover(&self, _context: &WorkspaceContext) -> Result<DiscoveryResult> {
            Ok(self.result.clone())
        }
    }

    struct FailingDiscovery;

    impl TargetDiscovery for FailingDiscovery {
        fn discover(&self, _context: &WorkspaceContext) -> Result<DiscoveryResult> {
            anyhow::bail!("bazel exploded")
        }
    }

    fn paths() -> BazelPathsResolver {
        BazelPathsResolver::new(BazelInfo {
            execution_root: PathBuf::from("/exec"),
            output_base: PathBuf::from("/out"),
            workspace_root: PathBuf::from("/work"),
            release: None,
        })
    }

    fn java_target(id: &str, deps: &[&str], source: &str) -> TargetInfo {
        TargetInfo {
            id: id.to_string(),
            kind: "java_library".to_string(),
            dependencies: deps.iter().map(|dep| Dependency::new(*dep)).collect(),
            sources: vec![FileLocation {
                relative_path: source.to_string(),
                is_source: true,
                ..FileLocation::default()
            }],
            ..TargetInfo::default()
        }
    }

    #[test]
    fn resolves_a_project_from_view_text() {
        let view = ProjectViewParser::new()
            .parse("targets:\n  //a:a\n  //b:b\n")
            .unwrap();
        let discovery = StubDiscovery {
            result: DiscoveryResult {
                targets: HashMap::from([
                    ("//a:a".to_string(), java_target("//a:a", &["//b:b"], "a/A.java")),
                    ("//b:b".to_string(), java_target("//b:b", &[], "b/B.java")),
                ]),
                root_targets: HashSet::from(["//a:a".to_string(), "//b:b".to_string()]),
            },
        };

        let mut resolver = ProjectResolver::new(discovery, paths());
        let project = resolver.resolve(&view).unwrap();

        assert_eq!(project.workspace_root().as_str(), "file:///work");
        assert_eq!(project.modules().len(), 2);
        assert!(project.find_module(&Label::new("//a:a")).is_some());
    }

    #[test]
    fn context_failures_abort_before_discovery() {
        let view = ProjectViewParser::new()
            .parse("targets:\n  //a:a\n")
            .map(|mut view| {
                view.targets = None;
                view
            })
            .unwrap();

        let mut resolver = ProjectResolver::new(FailingDiscovery, paths());
        let err = resolver.resolve(&view).unwrap_err();
        // The context error surfaces, not the discovery stub's.
        assert!(err.to_string().contains("workspace context"));
        assert!(format!("{err:#}").contains("'targets'"));
    }

    #[test]
    fn discovery_failures_carry_through() {
        let view = ProjectViewParser::new().parse("targets: //a:a\n").unwrap();
        let mut resolver = ProjectResolver::new(FailingDiscovery, paths());
        let err = resolver.resolve(&view).unwrap_err();
        assert!(err.to_string().contains("bazel exploded"));
    }
}
