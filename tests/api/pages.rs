use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

use crate::helpers::spawn_app;

fn is_html(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("text/html"))
        .unwrap_or(false)
}

#[tokio::test]
async fn home_page_links_to_the_add_and_search_pages() {
    let app = spawn_app().await;

    let response = app.get_page("/").await;

    assert_eq!(200, response.status().as_u16());
    assert!(is_html(&response));
    let page = response.text().await.unwrap();
    assert!(page.contains(r#"href="/add""#));
    assert!(page.contains(r#"href="/search""#));
}

#[tokio::test]
async fn add_page_renders_the_form() {
    let app = spawn_app().await;

    let response = app.get_page("/add").await;

    assert_eq!(200, response.status().as_u16());
    let page = response.text().await.unwrap();
    for field in ["title", "content", "author", "tags", "categories", "date"] {
        assert!(
            page.contains(&format!(r#"name="{}""#, field)),
            "The form has no {} field",
            field
        );
    }
}

#[tokio::test]
async fn add_form_submission_stores_the_content() {
    // Arrange
    let app = spawn_app().await;
    app.mock_embeddings(vec![0.1, 0.2, 0.3]).await;
    app.mock_existing_index().await;
    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "upsertedCount": 1 })))
        .expect(1)
        .mount(&app.pinecone_server)
        .await;

    // Act
    let response = app
        .post_add_form(&[
            ("title", "Holiday newsletter"),
            ("content", "Gift ideas for everyone"),
            ("author", ""),
            ("tags", "email, , holidays "),
            ("categories", "newsletter"),
            ("date", "2024-12-01"),
        ])
        .await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let page = response.text().await.unwrap();
    assert!(page.contains("Content saved with id"));
    // The form is emptied
    assert!(!page.contains("Gift ideas for everyone"));

    let upserts = app.pinecone_bodies("/vectors/upsert").await;
    let metadata = &upserts[0]["vectors"][0]["metadata"];
    assert_eq!(metadata["title"], "Holiday newsletter");
    assert_eq!(metadata["tags"], json!(["email", "holidays"]));
    assert_eq!(metadata["categories"], json!(["newsletter"]));
    assert!(metadata.get("author").is_none());
}

#[tokio::test]
async fn add_form_submission_without_a_title_keeps_the_typed_values() {
    let app = spawn_app().await;

    let response = app
        .post_add_form(&[
            ("title", " "),
            ("content", "Draft without a title"),
            ("date", "2024-12-01"),
        ])
        .await;

    assert_eq!(400, response.status().as_u16());
    let page = response.text().await.unwrap();
    assert!(page.contains("Title is required"));
    assert!(page.contains("Draft without a title"));
    assert!(app.pinecone_bodies("/vectors/upsert").await.is_empty());
}

#[tokio::test]
async fn add_form_submission_shows_downstream_failures() {
    let app = spawn_app().await;
    app.mock_existing_index().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&app.openai_server)
        .await;

    let response = app
        .post_add_form(&[
            ("title", "Holiday newsletter"),
            ("content", "Gift ideas for everyone"),
            ("date", "2024-12-01"),
        ])
        .await;

    assert_eq!(500, response.status().as_u16());
    let page = response.text().await.unwrap();
    assert!(page.contains(r#"role="alert""#));
    assert!(page.contains("Gift ideas for everyone"));
}

#[tokio::test]
async fn search_page_without_a_query_does_not_search() {
    let app = spawn_app().await;

    let response = app.get_page("/search").await;

    assert_eq!(200, response.status().as_u16());
    let page = response.text().await.unwrap();
    assert!(page.contains("No results yet..."));
    assert!(page.contains("const delay = 300;"));
    let openai_requests = app.openai_server.received_requests().await.unwrap();
    assert!(openai_requests.is_empty());
}

#[tokio::test]
async fn search_page_renders_the_matches_as_cards() {
    let app = spawn_app().await;
    app.mock_embeddings(vec![0.3, 0.2, 0.1]).await;
    app.mock_existing_index().await;
    app.mock_query_matches(json!([
        {
            "id": "1", "score": 0.9,
            "metadata": { "title": "Brand voice", "content": "Be consistent", "author": "Sam" }
        },
        { "id": "2", "score": 0.7, "metadata": { "content": "" } }
    ]))
    .await;

    let response = app.get_page("/search?q=brand%20voice").await;

    assert_eq!(200, response.status().as_u16());
    let page = response.text().await.unwrap();
    assert!(page.contains("<h2>Brand voice</h2>"));
    assert!(page.contains("Author: Sam"));
    assert!(page.contains("<h2>Untitled</h2>"));
    assert!(page.contains("No content available."));
    assert!(page.contains("brand voice</textarea>"));
}

#[tokio::test]
async fn search_results_fragment_uses_the_configured_top_k() {
    let app = spawn_app().await;
    app.mock_embeddings(vec![0.3, 0.2, 0.1]).await;
    app.mock_existing_index().await;
    app.mock_query_matches(json!([])).await;

    let response = app.get_page("/search/results?q=pricing").await;

    assert_eq!(200, response.status().as_u16());
    assert!(is_html(&response));
    let fragment = response.text().await.unwrap();
    assert_eq!(fragment, "<p>No results yet...</p>");

    let queries = app.pinecone_bodies("/query").await;
    assert_eq!(queries[0]["topK"], 5);
}
