use agentchat_api::{ApiClient, UploadFile};
use agentchat_kb::{read_upload_file, DuplicateFlag, KbError, KbManager};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_lists(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/kb/list/Aspect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "knowledgeBases": [
                { "id": "kb-1", "name": "Finance", "vectorStoreId": "vs-1", "fileCount": 1, "totalSize": 100 },
                { "id": "kb-2", "name": "Legal", "vectorStoreId": "vs-2", "fileCount": 0, "totalSize": 0 }
            ]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/kb/kb-1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{
                "openaiFileId": "file-1",
                "fileName": "q3.pdf",
                "fileSize": 100,
                "tags": ["finance"],
                "createdAt": "2024-03-01T00:00:00.000Z"
            }]
        })))
        .mount(server)
        .await;
}

async fn selected_manager(server: &MockServer) -> KbManager {
    let mut manager = KbManager::new(ApiClient::new(server.uri()), "Aspect");
    manager.load().await.unwrap();
    manager.select("kb-1").await.unwrap();
    manager
}

#[tokio::test]
async fn test_load_and_select() {
    let server = MockServer::start().await;
    mock_lists(&server).await;

    let manager = selected_manager(&server).await;
    assert_eq!(manager.knowledge_bases().len(), 2);
    assert_eq!(manager.selected().unwrap().vector_store_id, "vs-1");
    assert_eq!(manager.selected_files()[0].file_name, "q3.pdf");
}

#[tokio::test]
async fn test_select_unknown_kb() {
    let server = MockServer::start().await;
    mock_lists(&server).await;

    let mut manager = KbManager::new(ApiClient::new(server.uri()), "Aspect");
    manager.load().await.unwrap();
    assert!(matches!(
        manager.select("kb-404").await,
        Err(KbError::UnknownKnowledgeBase(_))
    ));
}

#[tokio::test]
async fn test_create_requires_name_and_refetches() {
    let server = MockServer::start().await;
    mock_lists(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/kb/create"))
        .and(body_json(json!({ "agentName": "Aspect", "name": "Ops", "description": "" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut manager = KbManager::new(ApiClient::new(server.uri()), "Aspect");
    assert!(matches!(manager.create("   ", "x").await, Err(KbError::EmptyName)));

    manager.create("  Ops ", "").await.unwrap();
    assert_eq!(manager.knowledge_bases().len(), 2);
}

#[tokio::test]
async fn test_duplicate_check_against_selected_files() {
    let server = MockServer::start().await;
    mock_lists(&server).await;
    let manager = selected_manager(&server).await;

    let files = vec![
        UploadFile::new("q3.pdf", vec![0; 10]),
        UploadFile::new("q4.pdf", vec![0; 100]),
    ];
    let report = manager.check_duplicates(&files);
    assert_eq!(report.same_name, vec!["q3.pdf".to_string()]);
    assert_eq!(report.same_size, vec!["q4.pdf (100 Bytes)".to_string()]);
    assert_eq!(
        agentchat_kb::detect_duplicate("q4.pdf", 100, manager.selected_files()),
        Some(DuplicateFlag::SameSize)
    );
}

#[tokio::test]
async fn test_upload_is_sequential_and_stops_on_failure() {
    let server = MockServer::start().await;
    mock_lists(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/kb/kb-1/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/kb/kb-1/upload"))
        .respond_with(ResponseTemplate::new(413).set_body_json(json!({ "error": "File too large" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut manager = selected_manager(&server).await;
    let files = vec![
        UploadFile::new("a.txt", b"a".to_vec()),
        UploadFile::new("b.txt", b"b".to_vec()),
        UploadFile::new("c.txt", b"c".to_vec()),
    ];

    let err = manager.upload(&files, "ops, 2024").await.unwrap_err();
    match err {
        KbError::Upload { file, source } => {
            assert_eq!(file, "b.txt");
            assert_eq!(source.to_string(), "server returned 413: File too large");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_requires_selection_and_files() {
    let server = MockServer::start().await;
    mock_lists(&server).await;

    let mut manager = KbManager::new(ApiClient::new(server.uri()), "Aspect");
    manager.load().await.unwrap();
    assert!(matches!(
        manager.upload(&[UploadFile::new("a", vec![1])], "").await,
        Err(KbError::NoSelection)
    ));

    manager.select("kb-1").await.unwrap();
    assert!(matches!(manager.upload(&[], "").await, Err(KbError::NoFiles)));
}

#[tokio::test]
async fn test_delete_file_refetches() {
    let server = MockServer::start().await;
    mock_lists(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/kb/kb-1/files/file-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut manager = selected_manager(&server).await;
    manager.delete_file("file-1").await.unwrap();
    assert_eq!(manager.selected().unwrap().id, "kb-1");
    assert!(manager.selected().unwrap().files.is_some());
}

#[tokio::test]
async fn test_read_upload_file_uses_file_name() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("minutes.txt");
    std::fs::write(&path, "agenda").unwrap();

    let file = read_upload_file(&path).await.unwrap();
    assert_eq!(file.name, "minutes.txt");
    assert_eq!(file.size(), 6);

    assert!(matches!(
        read_upload_file(&dir.path().join("missing.txt")).await,
        Err(KbError::Io { .. })
    ));
}
