use crate::helpers::spawn_app;

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app().await;

    let response = app.get_page("/health_check").await;

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn health_check_does_not_reach_external_services() {
    let app = spawn_app().await;

    app.get_page("/health_check").await;

    let openai_requests = app.openai_server.received_requests().await.unwrap();
    let pinecone_requests = app.pinecone_server.received_requests().await.unwrap();
    assert!(openai_requests.is_empty());
    assert!(pinecone_requests.is_empty());
}
