use std::path::Path;
use strata_action_graph::ActionGraph;

/// A v2 graph with a diamond depset DAG:
///
/// ```text
///   ds1 ── ds3 (shared)
///   ds2 ── ds3
/// ```
///
/// The action's inputs reference ds1 and ds2; ds3 must be expanded once and
/// its artifact must appear once in the result.
fn diamond_v2() -> ActionGraph {
    let json = r#"{
        "artifacts": [
            {"id": 1, "pathFragmentId": 12},
            {"id": 2, "pathFragmentId": 13},
            {"id": 3, "pathFragmentId": 14},
            {"id": 4, "pathFragmentId": 15}
        ],
        "actions": [
            {"targetId": 1, "inputDepSetIds": [1, 2], "outputIds": [4]}
        ],
        "targets": [
            {"id": 1, "label": "//server/sync:lib"}
        ],
        "depSetOfFiles": [
            {"id": 1, "directArtifactIds": [1], "transitiveDepSetIds": [3]},
            {"id": 2, "directArtifactIds": [2], "transitiveDepSetIds": [3]},
            {"id": 3, "directArtifactIds": [3]}
        ],
        "pathFragments": [
            {"id": 10, "label": "bazel-out"},
            {"id": 11, "label": "bin", "parentId": 10},
            {"id": 12, "label": "first.jar", "parentId": 11},
            {"id": 13, "label": "second.jar", "parentId": 11},
            {"id": 14, "label": "shared.jar", "parentId": 11},
            {"id": 15, "label": "libout.jar", "parentId": 11}
        ]
    }"#;
    ActionGraph::parse_v2(json.as_bytes()).unwrap()
}

fn simple_v1() -> ActionGraph {
    let json = r#"{
        "artifacts": [
            {"id": "a1", "execPath": "bazel-out/bin/lib.jar"},
            {"id": "a2", "execPath": "server/sync/A.java"},
            {"id": "a3", "execPath": "bazel-out/bin/lib-src.jar"}
        ],
        "actions": [
            {"targetId": "t1", "inputDepSetIds": ["d1"], "outputIds": ["a1", "a3"]}
        ],
        "targets": [
            {"id": "t1", "label": "//server/sync:lib"}
        ],
        "depSetOfFiles": [
            {"id": "d1", "directArtifactIds": ["a2"]}
        ]
    }"#;
    ActionGraph::parse_v1(json.as_bytes()).unwrap()
}

#[test]
fn v1_inputs_carry_the_exec_root_scheme() {
    let graph = simple_v1();
    assert_eq!(
        graph.inputs("//server/sync:lib", &[]),
        vec!["exec-root://server/sync/A.java".to_string()]
    );
}

#[test]
fn v1_outputs_filter_on_suffixes() {
    let graph = simple_v1();
    assert_eq!(
        graph.outputs("//server/sync:lib", &["-src.jar"]),
        vec!["bazel-out/bin/lib-src.jar".to_string()]
    );
    assert_eq!(
        graph.outputs("//server/sync:lib", &[".jar"]).len(),
        2,
        "both jars match the .jar suffix"
    );
    assert!(graph.outputs("//server/sync:lib", &[".so"]).is_empty());
}

#[test]
fn v2_reconstructs_paths_from_fragment_chains() {
    let graph = diamond_v2();
    assert_eq!(
        graph.outputs("//server/sync:lib", &[".jar"]),
        vec!["bazel-out/bin/libout.jar".to_string()]
    );
}

#[test]
fn shared_sub_depsets_expand_once_and_expansion_terminates() {
    let graph = diamond_v2();
    let inputs = graph.inputs("//server/sync:lib", &[]);
    assert_eq!(
        inputs,
        vec![
            "exec-root://bazel-out/bin/first.jar".to_string(),
            "exec-root://bazel-out/bin/second.jar".to_string(),
            "exec-root://bazel-out/bin/shared.jar".to_string(),
        ],
        "the shared artifact appears exactly once"
    );
}

#[test]
fn inputs_resolve_to_uris_against_the_exec_root() {
    let graph = simple_v1();
    let uris = graph.inputs_as_uris("//server/sync:lib", Path::new("/cache/execroot/main"));
    assert_eq!(uris.len(), 1);
    assert_eq!(
        uris[0].as_str(),
        "file:///cache/execroot/main/server/sync/A.java"
    );
}

#[test]
fn unknown_label_yields_empty_results_not_an_error() {
    let graph = diamond_v2();
    assert!(graph.inputs("//nonexistent:nope", &[]).is_empty());
    assert!(graph.outputs("//nonexistent:nope", &[]).is_empty());
}

#[test]
fn label_with_no_actions_yields_empty_results() {
    let json = r#"{
        "targets": [{"id": 1, "label": "//docs:metadata_only"}]
    }"#;
    let graph = ActionGraph::parse_v2(json.as_bytes()).unwrap();
    assert!(graph.inputs("//docs:metadata_only", &[]).is_empty());
    assert!(graph.outputs("//docs:metadata_only", &[]).is_empty());
}

#[test]
fn malformed_bytes_fail_the_single_parse_call() {
    let err = ActionGraph::parse_v2(b"{ not json").unwrap_err();
    assert!(err.to_string().contains("v2 action graph"));
}

#[test]
fn depset_cycle_in_malformed_graphs_still_terminates() {
    // Depsets are a DAG by contract; corrupt wire data must still terminate.
    let json = r#"{
        "artifacts": [{"id": 1, "pathFragmentId": 10}],
        "actions": [{"targetId": 1, "inputDepSetIds": [1]}],
        "targets": [{"id": 1, "label": "//a:a"}],
        "depSetOfFiles": [
            {"id": 1, "directArtifactIds": [1], "transitiveDepSetIds": [2]},
            {"id": 2, "transitiveDepSetIds": [1]}
        ],
        "pathFragments": [{"id": 10, "label": "a.txt"}]
    }"#;
    let graph = ActionGraph::parse_v2(json.as_bytes()).unwrap();
    assert_eq!(graph.inputs("//a:a", &[]), vec!["exec-root://a.txt".to_string()]);
}
