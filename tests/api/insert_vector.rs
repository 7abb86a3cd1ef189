use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::{
    matchers::{header, method, path},
    Mock, ResponseTemplate,
};

use crate::helpers::{spawn_app, TEST_DIMENSION, TEST_INDEX_NAME};

fn valid_body() -> Value {
    json!({
        "title": "Spring campaign",
        "vector": "Discover our spring collection, 20% off this week",
        "metadata": {
            "author": "Ada",
            "tags": ["seasonal", "sales"],
            "categories": ["retail"],
            "content": "Discover our spring collection, 20% off this week",
            "date": "2024-03-20"
        }
    })
}

#[tokio::test]
async fn insert_vector_returns_a_200_and_the_new_id_for_valid_input_data() {
    // Arrange
    let app = spawn_app().await;
    app.mock_embeddings(vec![0.1, 0.2, 0.3]).await;
    app.mock_existing_index().await;
    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .and(header("Api-Key", "test-pinecone-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "upsertedCount": 1 })))
        .expect(1)
        .mount(&app.pinecone_server)
        .await;

    // Act
    let response = app.post_insert_vector(&valid_body()).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Vector upserted successfully");
    let id = body["id"].as_str().expect("No id in the response");
    assert!(Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn insert_vector_stores_the_embedding_and_the_metadata() {
    let app = spawn_app().await;
    app.mock_embeddings(vec![0.1, 0.2, 0.3]).await;
    app.mock_existing_index().await;
    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "upsertedCount": 1 })))
        .mount(&app.pinecone_server)
        .await;

    let response = app.post_insert_vector(&valid_body()).await;
    let body: Value = response.json().await.unwrap();

    let upserts = app.pinecone_bodies("/vectors/upsert").await;
    assert_eq!(upserts.len(), 1);
    let record = &upserts[0]["vectors"][0];
    assert_eq!(record["id"], body["id"]);
    assert_eq!(record["values"].as_array().unwrap().len(), TEST_DIMENSION);
    assert_eq!(record["metadata"]["title"], "Spring campaign");
    assert_eq!(record["metadata"]["author"], "Ada");
    assert_eq!(record["metadata"]["tags"], json!(["seasonal", "sales"]));
    assert_eq!(record["metadata"]["date"], "2024-03-20");
}

#[tokio::test]
async fn insert_vector_returns_a_400_when_data_is_missing() {
    // Arrange
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.openai_server)
        .await;

    let test_cases = vec![
        (json!({ "title": "No text", "metadata": { "content": "x" } }), "missing the text"),
        (json!({ "title": "No metadata", "vector": "Some text" }), "missing the metadata"),
        (json!({ "vector": "   ", "metadata": { "content": "x" } }), "blank text"),
        (json!({}), "missing everything"),
    ];

    for (invalid_body, error_message) in test_cases {
        // Act
        let response = app.post_insert_vector(&invalid_body).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            error_message
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Content and metadata are required");
    }
}

#[tokio::test]
async fn insert_vector_returns_a_400_for_an_invalid_date() {
    let app = spawn_app().await;

    let mut body = valid_body();
    body["metadata"]["date"] = json!("20/03/2024");

    let response = app.post_insert_vector(&body).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn insert_vector_accepts_a_browser_serialised_date() {
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

    let mut body = valid_body();
    body["metadata"]["date"] = json!("2024-03-15T00:00:00.000Z");

    // Act
    let response = app.post_insert_vector(&body).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let upserts = app.pinecone_bodies("/vectors/upsert").await;
    assert_eq!(
        upserts[0]["vectors"][0]["metadata"]["date"],
        "2024-03-15T00:00:00.000Z"
    );
}

#[tokio::test]
async fn insert_vector_returns_a_400_json_error_for_a_malformed_body() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(&format!("{}/api/pinecone/insert_vector", &app.address))
        .header("Content-Type", "application/json")
        .body("{ not json")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn insert_vector_returns_a_500_when_the_embeddings_api_fails() {
    let app = spawn_app().await;
    app.mock_existing_index().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit reached"))
        .mount(&app.openai_server)
        .await;

    let response = app.post_insert_vector(&valid_body()).await;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert!(app.pinecone_bodies("/vectors/upsert").await.is_empty());
}

#[tokio::test]
async fn insert_vector_returns_a_500_when_the_embedding_does_not_fit_the_index() {
    let app = spawn_app().await;
    app.mock_existing_index().await;
    app.mock_embeddings(vec![0.1, 0.2]).await;

    let response = app.post_insert_vector(&valid_body()).await;

    assert_eq!(500, response.status().as_u16());
    assert!(app.pinecone_bodies("/vectors/upsert").await.is_empty());
}

#[tokio::test]
async fn insert_vector_creates_the_index_when_it_does_not_exist() {
    // Arrange
    let app = spawn_app().await;
    app.mock_embeddings(vec![0.1, 0.2, 0.3]).await;
    Mock::given(method("GET"))
        .and(path(format!("/indexes/{}", TEST_INDEX_NAME)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&app.pinecone_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": TEST_INDEX_NAME,
            "host": app.pinecone_server.uri()
        })))
        .expect(1)
        .mount(&app.pinecone_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "upsertedCount": 1 })))
        .expect(1)
        .mount(&app.pinecone_server)
        .await;

    // Act
    let response = app.post_insert_vector(&valid_body()).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let creations = app.pinecone_bodies("/indexes").await;
    assert_eq!(creations[0]["name"], TEST_INDEX_NAME);
    assert_eq!(creations[0]["dimension"], TEST_DIMENSION);
    assert_eq!(creations[0]["metric"], "cosine");
    assert_eq!(creations[0]["spec"]["serverless"]["cloud"], "aws");
}
