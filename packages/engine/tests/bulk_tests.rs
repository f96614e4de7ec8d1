//! Bulk fan-out behavior: sizing, cycling, isolation, duplicate offsets.

use easel_engine::{Engine, Request, Response};
use easel_scene::{Document, Node, NodeKind, SceneTree};
use serde_json::{json, Value};

fn request(value: Value) -> Request {
    serde_json::from_value(value).expect("request should deserialize")
}

fn bulk(response: Response) -> easel_engine::BulkSummary {
    match response {
        Response::Bulk(summary) => summary,
        Response::Single { .. } => panic!("expected bulk response"),
    }
}

fn rect(name: &str) -> Node {
    Node::new(NodeKind::Rectangle { corner_radius: 0.0 }, name)
}

#[tokio::test]
async fn test_create_sizes_fan_out_from_longest_property_array() {
    let engine = Engine::new();
    let mut doc = Document::new();

    let response = engine
        .execute(
            &mut doc,
            &request(json!({
                "operation": "create_rectangle",
                "name": ["R1", "R2"],
                "width": 100
            })),
        )
        .await
        .unwrap();

    let summary = bulk(response);
    assert!(summary.success);
    assert_eq!(summary.results.len(), 2);

    for (i, expected) in ["R1", "R2"].iter().enumerate() {
        let data = summary.results[i].data.as_ref().unwrap();
        assert_eq!(data["name"], *expected);
        assert_eq!(data["width"], 100.0);
        // No siblings existed for the first item; the second is
        // auto-placed beside it. Neither may overlap.
        assert!(data.get("warning").is_none());
    }

    let page = doc.active_page_id();
    assert_eq!(doc.page(&page).unwrap().children.len(), 2);
}

#[tokio::test]
async fn test_update_cycles_short_arrays() {
    let engine = Engine::new();
    let mut doc = Document::new();
    let page = doc.active_page_id();
    let ids: Vec<String> = (0..3)
        .map(|i| doc.append_child(&page, rect(&format!("R{i}"))).unwrap())
        .collect();

    let response = engine
        .execute(
            &mut doc,
            &request(json!({
                "operation": "update",
                "nodeId": ids,
                "fillColor": "#FF0000",
                "width": [100, 200],
                "detail": "detailed"
            })),
        )
        .await
        .unwrap();

    let summary = bulk(response);
    assert!(summary.success);
    assert_eq!(summary.results.len(), 3);

    let widths: Vec<&Value> = summary
        .results
        .iter()
        .map(|r| &r.data.as_ref().unwrap()["width"])
        .collect();
    assert_eq!(widths, [100.0, 200.0, 100.0]);

    for result in &summary.results {
        let data = result.data.as_ref().unwrap();
        assert_eq!(data["fills"][0]["color"], "#FF0000");
    }
}

#[tokio::test]
async fn test_one_bad_item_never_aborts_the_rest() {
    let engine = Engine::new();
    let mut doc = Document::new();
    let page = doc.active_page_id();
    let a = doc.append_child(&page, rect("A")).unwrap();
    let c = doc.append_child(&page, rect("C")).unwrap();

    let response = engine
        .execute(
            &mut doc,
            &request(json!({
                "operation": "update",
                "nodeId": [a, "missing", c],
                "width": 50
            })),
        )
        .await
        .unwrap();

    let summary = bulk(response);
    assert!(!summary.success);
    assert_eq!(summary.results.len(), 3);
    assert!(summary.results[0].success);
    assert!(summary.results[2].success);

    let failure = &summary.results[1];
    assert!(!failure.success);
    assert_eq!(failure.index, 1);
    assert_eq!(failure.node_id.as_deref(), Some("missing"));
    assert_eq!(failure.error.as_deref(), Some("Node not found: missing"));

    // The two good items were applied.
    assert_eq!(doc.find_by_id(&summary.results[0].data.as_ref().unwrap()["id"].as_str().unwrap()).unwrap().width, 50.0);
}

#[tokio::test]
async fn test_duplicate_count_with_cumulative_offsets() {
    let engine = Engine::new();
    let mut doc = Document::new();
    let page = doc.active_page_id();
    let mut source = rect("Source");
    source.x = 10.0;
    source.y = 5.0;
    let id = doc.append_child(&page, source).unwrap();

    let response = engine
        .execute(
            &mut doc,
            &request(json!({
                "operation": "duplicate",
                "nodeId": id,
                "count": 3,
                "offsetX": [0, 120, 240],
                "offsetY": 0
            })),
        )
        .await
        .unwrap();

    let summary = bulk(response);
    assert!(summary.success);
    assert_eq!(summary.results.len(), 3);

    let positions: Vec<(f64, f64)> = summary
        .results
        .iter()
        .map(|r| {
            let data = r.data.as_ref().unwrap();
            (data["x"].as_f64().unwrap(), data["y"].as_f64().unwrap())
        })
        .collect();
    assert_eq!(positions, [(10.0, 5.0), (130.0, 5.0), (250.0, 5.0)]);

    // Source plus three copies.
    assert_eq!(doc.page(&page).unwrap().children.len(), 4);
}

#[tokio::test]
async fn test_duplicate_scalar_offset_progresses_per_copy() {
    let engine = Engine::new();
    let mut doc = Document::new();
    let page = doc.active_page_id();
    let id = doc.append_child(&page, rect("Source")).unwrap();

    let response = engine
        .execute(
            &mut doc,
            &request(json!({
                "operation": "duplicate",
                "nodeId": id,
                "count": 3,
                "offsetX": 120
            })),
        )
        .await
        .unwrap();

    let summary = bulk(response);
    let xs: Vec<f64> = summary
        .results
        .iter()
        .map(|r| r.data.as_ref().unwrap()["x"].as_f64().unwrap())
        .collect();
    assert_eq!(xs, [120.0, 240.0, 360.0]);
}

#[tokio::test]
async fn test_count_is_duplicate_only() {
    let engine = Engine::new();
    let mut doc = Document::new();
    let page = doc.active_page_id();
    let id = doc.append_child(&page, rect("A")).unwrap();

    let err = engine
        .execute(
            &mut doc,
            &request(json!({ "operation": "update", "nodeId": id, "count": 2 })),
        )
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("'count'"));
    assert!(message.contains("duplicate"));
}

#[tokio::test]
async fn test_json_string_array_fans_out() {
    let engine = Engine::new();
    let mut doc = Document::new();
    let page = doc.active_page_id();
    let a = doc.append_child(&page, rect("A")).unwrap();
    let b = doc.append_child(&page, rect("B")).unwrap();

    let response = engine
        .execute(
            &mut doc,
            &request(json!({
                "operation": "update",
                "nodeId": format!("[\"{a}\", \"{b}\"]"),
                "width": 77
            })),
        )
        .await
        .unwrap();

    let summary = bulk(response);
    assert!(summary.success);
    assert_eq!(summary.results.len(), 2);
    assert_eq!(doc.find_by_id(&a).unwrap().width, 77.0);
    assert_eq!(doc.find_by_id(&b).unwrap().width, 77.0);
}

#[tokio::test]
async fn test_malformed_json_string_is_a_plain_scalar() {
    let engine = Engine::new();
    let mut doc = Document::new();

    let response = engine
        .execute(
            &mut doc,
            &request(json!({
                "operation": "create_rectangle",
                "name": "[unterminated"
            })),
        )
        .await
        .unwrap();

    let summary = bulk(response);
    assert!(summary.success);
    assert_eq!(summary.results.len(), 1);
    assert_eq!(summary.results[0].data.as_ref().unwrap()["name"], "[unterminated");
}

#[tokio::test]
async fn test_delete_is_terminal_within_a_batch() {
    let engine = Engine::new();
    let mut doc = Document::new();
    let page = doc.active_page_id();
    let id = doc.append_child(&page, rect("A")).unwrap();

    let response = engine
        .execute(
            &mut doc,
            &request(json!({ "operation": "delete", "nodeId": [id.clone(), id.clone()] })),
        )
        .await
        .unwrap();

    let summary = bulk(response);
    assert!(!summary.success);
    assert!(summary.results[0].success);
    assert!(!summary.results[1].success);
    assert_eq!(
        summary.results[1].error.as_deref(),
        Some(format!("Node not found: {id}").as_str())
    );
    assert!(doc.find_by_id(&id).is_none());
}

#[tokio::test]
async fn test_bulk_response_serialization_shape() {
    let engine = Engine::new();
    let mut doc = Document::new();

    let response = engine
        .execute(
            &mut doc,
            &request(json!({ "operation": "delete", "nodeId": "ghost" })),
        )
        .await
        .unwrap();

    let value = response.to_value();
    assert_eq!(value["success"], false);
    assert_eq!(value["results"][0]["index"], 0);
    assert_eq!(value["results"][0]["success"], false);
    assert_eq!(value["results"][0]["nodeId"], "ghost");
    assert!(value["results"][0]["error"].as_str().unwrap().contains("ghost"));
}
