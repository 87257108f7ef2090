use crate::dependency_tree::DependencyTree;
use crate::languages::{LanguagePlugin, LanguagePlugins};
use crate::model::{BuildTargetData, Language, Module, Project, SourceSet, Tag};
use crate::paths::BazelPathsResolver;
use std::collections::{BTreeSet, HashMap, HashSet};
use strata_core::{Label, TargetInfo, Uri};
use strata_execution_context::WorkspaceContext;

/// Turns the raw target map of a resolution pass into the project model.
///
/// The mapper drives the two ordering invariants of a pass: every plugin's
/// `prepare_sync` runs over the complete target set before any module is
/// resolved, and the dependency tree is built over the complete graph before
/// any closure query runs.
pub struct ProjectMapper {
    plugins: LanguagePlugins,
    paths: BazelPathsResolver,
}

impl ProjectMapper {
    pub fn new(paths: BazelPathsResolver) -> Self {
        ProjectMapper {
            plugins: LanguagePlugins::new(paths.clone()),
            paths,
        }
    }

    pub fn create_project(
        &mut self,
        targets: HashMap<String, TargetInfo>,
        root_targets: HashSet<String>,
        context: &WorkspaceContext,
    ) -> Project {
        let all: Vec<&TargetInfo> = targets.values().collect();
        self.plugins.prepare_sync(&all);

        let roots: Vec<String> = root_targets.iter().cloned().collect();
        let tree = DependencyTree::new(root_targets, targets);

        let targets_to_import: Vec<&TargetInfo> = tree
            .targets_at_depth(
                context.import_depth.value,
                roots.iter().map(String::as_str),
            )
            .into_iter()
            .filter(|target| is_workspace_target(target))
            .collect();
        tracing::debug!(
            candidates = targets_to_import.len(),
            "selected targets to import"
        );

        let modules: Vec<Module> = targets_to_import
            .iter()
            .map(|target| self.create_module(target, &tree))
            .filter(|module| !module.tags.contains(&Tag::NoIde))
            .collect();
        let source_to_target = reverse_source_mapping(&modules);
        tracing::info!(modules = modules.len(), "mapped project model");

        Project::new(self.paths.workspace_root_uri(), modules, source_to_target)
    }

    /// The protocol payload for a resolved module, written by the plugin that
    /// owns the module's language data.
    pub fn build_target_data(&self, module: &Module) -> BuildTargetData {
        let mut data = BuildTargetData::default();
        if let Some(language_data) = &module.language_data {
            self.plugins
                .plugin_for(&module.languages)
                .apply_module_data(language_data, &mut data);
        }
        data
    }

    fn create_module(&self, target: &TargetInfo, tree: &DependencyTree) -> Module {
        let label = Label::new(&target.id);
        let languages = Language::infer(target);
        let plugin = self.plugins.plugin_for(&languages);

        Module {
            direct_dependencies: target.dependency_ids().map(Label::new).collect(),
            tags: Tag::resolve(target),
            base_directory: self.paths.label_to_directory_uri(&label),
            source_set: self.resolve_source_set(target, plugin),
            resources: target
                .resources
                .iter()
                .map(|resource| self.paths.resolve_uri(resource))
                .collect(),
            language_data: plugin.resolve_module(target),
            source_dependencies: plugin.dependency_sources(target, tree),
            label,
            languages,
        }
    }

    fn resolve_source_set(&self, target: &TargetInfo, plugin: &dyn LanguagePlugin) -> SourceSet {
        let mut sources = BTreeSet::new();
        let mut source_roots = BTreeSet::new();
        for file in &target.sources {
            let path = self.paths.resolve(file);
            if let Some(root) = plugin.calculate_source_root(&path) {
                source_roots.insert(Uri::from_absolute_path(&root));
            }
            sources.insert(Uri::from_absolute_path(&path));
        }
        SourceSet {
            sources,
            source_roots,
        }
    }
}

/// Main-workspace targets the IDE can do something with: at least one source
/// in a known language, or a sourceless target whose rule kind implies one.
fn is_workspace_target(target: &TargetInfo) -> bool {
    Label::new(&target.id).is_main_workspace() && !Language::infer(target).is_empty()
}

/// Derived lookup from every source and resource file to its owning module.
fn reverse_source_mapping(modules: &[Module]) -> HashMap<Uri, Label> {
    modules
        .iter()
        .flat_map(|module| {
            module
                .source_set
                .sources
                .iter()
                .chain(&module.resources)
                .map(|uri| (uri.clone(), module.label.clone()))
        })
        .collect()
}
