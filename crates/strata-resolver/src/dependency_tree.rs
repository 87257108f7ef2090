use std::cell::{Cell, OnceCell};
use std::collections::{BTreeSet, HashMap, HashSet};
use strata_core::TargetInfo;

/// Per-target transitive dependency closures over the analyzed target graph,
/// computed lazily and memoized.
///
/// The tree owns every [`TargetInfo`] of the pass. Targets are arranged in an
/// arena sorted by id; each slot carries a compute-once cell holding the
/// target's transitive closure as a set of arena indices. A closure is
/// evaluated on first access and then shared by every ancestor that reaches
/// the target, so a diamond-shaped graph evaluates the shared dependency
/// once, not once per path.
///
/// The single-writer-per-key contract holds because a resolution pass is
/// single-threaded; concurrent passes must each own their own tree.
#[derive(Debug)]
pub struct DependencyTree {
    infos: Vec<TargetInfo>,
    index_by_id: HashMap<String, usize>,
    direct_deps: Vec<Vec<usize>>,
    transitive: Vec<OnceCell<BTreeSet<usize>>>,
    root_indices: HashSet<usize>,
    computed_closures: Cell<usize>,
}

impl DependencyTree {
    pub fn new(root_targets: HashSet<String>, targets: HashMap<String, TargetInfo>) -> Self {
        // Arena order is id order, which makes every returned set
        // deterministic for a fixed target graph.
        let mut infos: Vec<TargetInfo> = targets.into_values().collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));

        let index_by_id: HashMap<String, usize> = infos
            .iter()
            .enumerate()
            .map(|(idx, info)| (info.id.clone(), idx))
            .collect();

        // Dependencies pointing outside the resolved set are dropped here:
        // forward references contribute nothing to a closure.
        let direct_deps = infos
            .iter()
            .map(|info| {
                info.dependency_ids()
                    .filter_map(|id| index_by_id.get(id).copied())
                    .collect()
            })
            .collect();

        let transitive = infos.iter().map(|_| OnceCell::new()).collect();
        let root_indices = root_targets
            .iter()
            .filter_map(|id| index_by_id.get(id).copied())
            .collect();

        DependencyTree {
            infos,
            index_by_id,
            direct_deps,
            transitive,
            root_indices,
            computed_closures: Cell::new(0),
        }
    }

    pub fn target_info(&self, target_id: &str) -> Option<&TargetInfo> {
        self.index_by_id
            .get(target_id)
            .map(|&idx| &self.infos[idx])
    }

    /// The target's full transitive dependency closure, excluding targets
    /// that are roots of the current resolution.
    ///
    /// Roots are self-targets the IDE is actively editing; they must not be
    /// reported as "dependencies" of their siblings. Exclusion applies to the
    /// result set only: traversal continues *through* a root, so a root's own
    /// non-root dependencies are still reached. An unknown target id yields
    /// an empty result, not an error.
    pub fn transitive_dependencies_excluding_roots(&self, target_id: &str) -> Vec<&TargetInfo> {
        let Some(&idx) = self.index_by_id.get(target_id) else {
            return Vec::new();
        };

        let mut reachable: BTreeSet<usize> = BTreeSet::new();
        for &dep_idx in &self.direct_deps[idx] {
            reachable.insert(dep_idx);
            reachable.extend(self.transitive_of(dep_idx));
        }

        reachable
            .into_iter()
            .filter(|idx| !self.root_indices.contains(idx))
            .map(|idx| &self.infos[idx])
            .collect()
    }

    /// Targets reachable from `roots` within `depth` dependency hops;
    /// a negative depth means the full transitive closure.
    pub fn targets_at_depth<'a>(
        &self,
        depth: i32,
        roots: impl IntoIterator<Item = &'a str>,
    ) -> Vec<&TargetInfo> {
        let root_indices: Vec<usize> = roots
            .into_iter()
            .filter_map(|id| self.index_by_id.get(id).copied())
            .collect();

        let mut selected: BTreeSet<usize> = root_indices.iter().copied().collect();
        if depth < 0 {
            for &idx in &root_indices {
                selected.extend(self.transitive_of(idx));
            }
        } else {
            let mut frontier = root_indices;
            for _ in 0..depth {
                let next: Vec<usize> = frontier
                    .iter()
                    .flat_map(|&idx| self.direct_deps[idx].iter().copied())
                    .filter(|idx| !selected.contains(idx))
                    .collect();
                if next.is_empty() {
                    break;
                }
                selected.extend(next.iter().copied());
                frontier = next;
            }
        }

        selected.into_iter().map(|idx| &self.infos[idx]).collect()
    }

    /// `transitive(t) = direct(t) ∪ ⋃ transitive(d)` for each direct
    /// dependency `d`, evaluated at most once per target.
    fn transitive_of(&self, idx: usize) -> &BTreeSet<usize> {
        self.transitive[idx].get_or_init(|| {
            self.computed_closures.set(self.computed_closures.get() + 1);
            let mut closure: BTreeSet<usize> = self.direct_deps[idx].iter().copied().collect();
            for &dep in &self.direct_deps[idx] {
                closure.extend(self.transitive_of(dep).iter().copied());
            }
            closure
        })
    }

    #[cfg(test)]
    fn computed_closures(&self) -> usize {
        self.computed_closures.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Dependency;

    fn target(id: &str, deps: &[&str]) -> (String, TargetInfo) {
        (
            id.to_string(),
            TargetInfo {
                id: id.to_string(),
                kind: "java_library".to_string(),
                dependencies: deps.iter().map(|dep| Dependency::new(*dep)).collect(),
                ..TargetInfo::default()
            },
        )
    }

    fn diamond(roots: &[&str]) -> DependencyTree {
        // A -> B, A -> C, B -> D, C -> D
        let targets = HashMap::from([
            target("//a", &["//b", "//c"]),
            target("//b", &["//d"]),
            target("//c", &["//d"]),
            target("//d", &[]),
        ]);
        DependencyTree::new(roots.iter().map(|s| s.to_string()).collect(), targets)
    }

    fn ids<'a>(targets: &[&'a TargetInfo]) -> Vec<&'a str> {
        targets.iter().map(|info| info.id.as_str()).collect()
    }

    #[test]
    fn diamond_closure_contains_the_shared_dependency_once() {
        let tree = diamond(&[]);
        let closure = tree.transitive_dependencies_excluding_roots("//a");
        assert_eq!(ids(&closure), vec!["//b", "//c", "//d"]);
    }

    #[test]
    fn shared_closures_are_computed_once_across_ancestors() {
        let tree = diamond(&[]);
        tree.transitive_dependencies_excluding_roots("//a");
        // One memoized cell per reachable target: B, C, D.
        assert_eq!(tree.computed_closures(), 3);

        // Every later query reuses the same cells.
        tree.transitive_dependencies_excluding_roots("//b");
        tree.transitive_dependencies_excluding_roots("//c");
        assert_eq!(tree.computed_closures(), 3);
    }

    #[test]
    fn root_targets_never_appear_in_results() {
        let tree = diamond(&["//d"]);
        assert_eq!(
            ids(&tree.transitive_dependencies_excluding_roots("//a")),
            vec!["//b", "//c"],
            "the root is dropped even when reached transitively"
        );
    }

    #[test]
    fn root_exclusion_still_reaches_through_the_root() {
        // B -> D -> E, with D a root: E stays reachable from B through D.
        let targets = HashMap::from([
            target("//b", &["//d"]),
            target("//d", &["//e"]),
            target("//e", &[]),
        ]);
        let tree = DependencyTree::new(HashSet::from(["//d".to_string()]), targets);

        assert_eq!(
            ids(&tree.transitive_dependencies_excluding_roots("//b")),
            vec!["//e"],
            "the root itself is dropped, its non-root dependencies are kept"
        );
        assert_eq!(
            ids(&tree.transitive_dependencies_excluding_roots("//d")),
            vec!["//e"],
            "the root's own query is unaffected"
        );
    }

    #[test]
    fn unknown_target_id_yields_an_empty_set() {
        let tree = diamond(&[]);
        assert!(tree
            .transitive_dependencies_excluding_roots("//nonexistent")
            .is_empty());
    }

    #[test]
    fn dependencies_outside_the_resolved_set_are_ignored() {
        let targets = HashMap::from([target("//a", &["//external:gone"])]);
        let tree = DependencyTree::new(HashSet::new(), targets);
        assert!(tree.transitive_dependencies_excluding_roots("//a").is_empty());
    }

    #[test]
    fn targets_at_depth_walks_breadth_limited() {
        let tree = diamond(&[]);
        assert_eq!(ids(&tree.targets_at_depth(0, ["//a"])), vec!["//a"]);
        assert_eq!(
            ids(&tree.targets_at_depth(1, ["//a"])),
            vec!["//a", "//b", "//c"]
        );
        assert_eq!(
            ids(&tree.targets_at_depth(2, ["//a"])),
            vec!["//a", "//b", "//c", "//d"]
        );
        assert_eq!(
            ids(&tree.targets_at_depth(-1, ["//a"])),
            vec!["//a", "//b", "//c", "//d"]
        );
    }
}
