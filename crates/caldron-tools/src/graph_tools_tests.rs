use super::*;
use caldron_stores::MemorySnapshotStore;

fn sessions() -> Arc<SessionStores> {
    Arc::new(SessionStores::with_default_names(Arc::new(
        MemorySnapshotStore::new(),
    )))
}

fn ctx() -> ToolContext {
    ToolContext::new("graph-session")
}

fn body(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "ingredients": [{"name": "egg", "quantity": 2, "unit": "pcs"}],
        "steps": ["Beat", "Cook"]
    })
}

fn id_of(result: &ToolResult) -> Uuid {
    serde_json::from_value(result.structured_output.as_ref().unwrap()["id"].clone()).unwrap()
}

#[tokio::test]
async fn test_create_then_add_version() {
    let sessions = sessions();
    let root = CreateResultGraphTool::new(sessions.clone())
        .execute(body("Omelette"), ctx())
        .await
        .unwrap();
    let root_id = id_of(&root);

    let again = CreateResultGraphTool::new(sessions.clone())
        .execute(body("Omelette 2"), ctx())
        .await
        .unwrap_err();
    assert!(matches!(again, ToolError::ExecutionFailed(_)));

    let v2 = AddVersionTool::new(sessions.clone())
        .execute(body("Omelette with herbs"), ctx())
        .await
        .unwrap();
    let v2_id = id_of(&v2);
    assert_ne!(root_id, v2_id);

    let size = GraphSizeTool::new(sessions.clone())
        .execute(serde_json::json!({}), ctx())
        .await
        .unwrap();
    assert_eq!(size.structured_output, Some(serde_json::json!(2)));

    let described = DescribeGraphTool::new(sessions.clone())
        .execute(serde_json::json!({}), ctx())
        .await
        .unwrap();
    assert!(described.content.contains(&format!("edge {} -> {}", root_id, v2_id)));
    assert!(described.content.contains("Omelette with herbs (current)"));
}

#[tokio::test]
async fn test_add_version_on_empty_graph() {
    let err = AddVersionTool::new(sessions())
        .execute(body("x"), ctx())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("empty"));
}

#[tokio::test]
async fn test_get_document_requires_existing_graph() {
    let err = GetDocumentTool::new(sessions())
        .execute(serde_json::json!({}), ctx())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_get_document_by_id_and_default() {
    let sessions = sessions();
    let root = CreateResultGraphTool::new(sessions.clone())
        .execute(body("Root"), ctx())
        .await
        .unwrap();
    AddVersionTool::new(sessions.clone())
        .execute(body("Child"), ctx())
        .await
        .unwrap();

    let tool = GetDocumentTool::new(sessions.clone());
    let current = tool.execute(serde_json::json!({}), ctx()).await.unwrap();
    assert!(current.content.starts_with("Child"));
    let by_id = tool
        .execute(serde_json::json!({"id": id_of(&root)}), ctx())
        .await
        .unwrap();
    assert!(by_id.content.starts_with("Root"));
    let missing = tool
        .execute(serde_json::json!({"id": Uuid::new_v4()}), ctx())
        .await
        .unwrap();
    assert_eq!(missing.structured_output, Some(serde_json::Value::Null));
}

#[tokio::test]
async fn test_set_current_document() {
    let sessions = sessions();
    let root = CreateResultGraphTool::new(sessions.clone())
        .execute(body("Root"), ctx())
        .await
        .unwrap();
    AddVersionTool::new(sessions.clone())
        .execute(body("Child"), ctx())
        .await
        .unwrap();

    let set = SetCurrentDocumentTool::new(sessions.clone());
    set.execute(serde_json::json!({"id": id_of(&root)}), ctx())
        .await
        .unwrap();
    let current = GetCurrentDocumentTool::new(sessions.clone())
        .execute(serde_json::json!({}), ctx())
        .await
        .unwrap();
    assert!(current.content.starts_with("Root"));

    let err = set
        .execute(serde_json::json!({"id": Uuid::new_v4()}), ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::ExecutionFailed(_)));
}

#[tokio::test]
async fn test_get_current_on_empty_graph() {
    let result = GetCurrentDocumentTool::new(sessions())
        .execute(serde_json::json!({}), ctx())
        .await
        .unwrap();
    assert_eq!(result.content, "Result graph is empty.");
}

#[tokio::test]
async fn test_validate_document() {
    let sessions = sessions();
    let tool = ValidateDocumentTool::new(sessions.clone());
    let empty = tool.execute(serde_json::json!({}), ctx()).await.unwrap();
    assert_eq!(empty.content, "No document to validate.");

    CreateResultGraphTool::new(sessions.clone())
        .execute(body("Eggs"), ctx())
        .await
        .unwrap();
    let rendered = tool.execute(serde_json::json!({}), ctx()).await.unwrap();
    assert!(rendered.content.contains("1. Beat"));
    assert!(rendered.content.contains("structurally valid"));
}
