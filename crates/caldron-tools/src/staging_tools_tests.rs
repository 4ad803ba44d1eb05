use super::*;
use caldron_stores::MemorySnapshotStore;

fn sessions() -> Arc<SessionStores> {
    Arc::new(SessionStores::with_default_names(Arc::new(
        MemorySnapshotStore::new(),
    )))
}

fn ctx() -> ToolContext {
    ToolContext::new("test-session")
}

fn draft_params(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "ingredients": [{"name": "oats", "quantity": 1, "unit": "cup"}],
        "steps": ["Soak overnight"]
    })
}

async fn build(sessions: &Arc<SessionStores>, name: &str) -> Uuid {
    let result = BuildDocumentTool::new(sessions.clone())
        .execute(draft_params(name), ctx())
        .await
        .unwrap();
    serde_json::from_value(result.structured_output.unwrap()["id"].clone()).unwrap()
}

#[tokio::test]
async fn test_add_and_pop_reference_fifo() {
    let sessions = sessions();
    let add = AddReferenceTool::new(sessions.clone());
    add.execute(serde_json::json!({"reference": "https://a"}), ctx())
        .await
        .unwrap();
    add.execute(serde_json::json!({"url": "https://b"}), ctx())
        .await
        .unwrap();

    let pop = PopReferenceTool::new(sessions.clone());
    let first = pop.execute(serde_json::json!({}), ctx()).await.unwrap();
    assert_eq!(first.content, "https://a");
    let second = pop.execute(serde_json::json!({}), ctx()).await.unwrap();
    assert_eq!(second.content, "https://b");
    let empty = pop.execute(serde_json::json!({}), ctx()).await.unwrap();
    assert!(empty.success);
    assert_eq!(empty.structured_output.unwrap()["reference"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_add_reference_rejects_empty() {
    let err = AddReferenceTool::new(sessions())
        .execute(serde_json::json!({"reference": "  "}), ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidParameters(_)));
}

#[tokio::test]
async fn test_build_document_validates() {
    let err = BuildDocumentTool::new(sessions())
        .execute(
            serde_json::json!({"name": "x", "ingredients": [], "steps": ["a"]}),
            ctx(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::ValidationFailed(_)));
}

#[tokio::test]
async fn test_get_staged_by_id_and_pop() {
    let sessions = sessions();
    let first = build(&sessions, "first").await;
    let second = build(&sessions, "second").await;
    let tool = GetStagedDocumentTool::new(sessions.clone());

    let by_id = tool
        .execute(serde_json::json!({"id": second}), ctx())
        .await
        .unwrap();
    assert!(by_id.content.contains("second"));

    // By-id lookup leaves the draft staged; pop takes the oldest.
    let popped = tool.execute(serde_json::json!({}), ctx()).await.unwrap();
    assert!(popped.content.contains(&first.to_string()));
    let remaining = sessions
        .for_session("test-session")
        .read(|s: &StagingArea| s.documents_len())
        .await
        .unwrap();
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn test_examine_and_clear() {
    let sessions = sessions();
    build(&sessions, "porridge").await;
    AddReferenceTool::new(sessions.clone())
        .execute(serde_json::json!({"reference": "https://r"}), ctx())
        .await
        .unwrap();

    let listing = ExamineStagingTool::new(sessions.clone())
        .execute(serde_json::json!({}), ctx())
        .await
        .unwrap();
    assert!(listing.content.starts_with("1 document(s), 1 reference(s)"));
    assert!(listing.content.contains("porridge"));

    ClearStagingTool::new(sessions.clone())
        .execute(serde_json::json!({}), ctx())
        .await
        .unwrap();
    let empty = sessions
        .for_session("test-session")
        .read(|s: &StagingArea| s.is_empty())
        .await
        .unwrap();
    assert!(empty);
}

#[tokio::test]
async fn test_move_document_to_graph() {
    let sessions = sessions();
    let id = build(&sessions, "porridge").await;

    let result = MoveDocumentToGraphTool::new(sessions.clone())
        .execute(serde_json::json!({"id": id}), ctx())
        .await
        .unwrap();
    assert!(result.success);

    let stores = sessions.for_session("test-session");
    let current = stores
        .read(|g: &ResultGraph| g.current_id())
        .await
        .unwrap();
    assert_eq!(current, Some(id));
    let staged = stores
        .read(|s: &StagingArea| s.get_document(id).is_some())
        .await
        .unwrap();
    assert!(!staged);
}

#[tokio::test]
async fn test_move_unknown_document() {
    let err = MoveDocumentToGraphTool::new(sessions())
        .execute(serde_json::json!({"id": Uuid::new_v4()}), ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::ExecutionFailed(_)));
}

#[tokio::test]
async fn test_failed_move_keeps_staging_order() {
    let sessions = sessions();
    let first = build(&sessions, "first").await;
    let middle = build(&sessions, "middle").await;
    let last = build(&sessions, "last").await;

    // The graph already holds a document with the middle draft's id.
    let stores = sessions.for_session("test-session");
    let clash = stores
        .read(|s: &StagingArea| s.get_document(middle).cloned())
        .await
        .unwrap()
        .unwrap();
    stores
        .mutate(move |g: &mut ResultGraph| g.create_with(clash))
        .await
        .unwrap()
        .unwrap();

    let err = MoveDocumentToGraphTool::new(sessions.clone())
        .execute(serde_json::json!({"id": middle}), ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::ExecutionFailed(_)));

    let order = stores
        .read(|s: &StagingArea| s.documents().map(|d| d.id()).collect::<Vec<_>>())
        .await
        .unwrap();
    assert_eq!(order, vec![first, middle, last]);
}

#[tokio::test]
async fn test_move_invalid_id() {
    let err = MoveDocumentToGraphTool::new(sessions())
        .execute(serde_json::json!({"id": "not-a-uuid"}), ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidParameters(_)));
}
