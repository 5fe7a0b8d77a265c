use agentplug_core::config::EmbeddingConfig;
use agentplug_core::error::EmbedError;
use agentplug_embed::{AzureOpenAiEmbedder, Embedder, FakeEmbedder};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(endpoint: String) -> EmbeddingConfig {
    EmbeddingConfig {
        endpoint,
        deployment: "text-embedding".to_string(),
        api_key: "k".to_string(),
        dimension: 3,
        ..EmbeddingConfig::default()
    }
}

#[tokio::test]
async fn fake_embedder_shapes_and_determinism() {
    let embedder = FakeEmbedder::new(1024);
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).await.expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 1024, "embedding dim is 1024");

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[tokio::test]
async fn azure_embedder_posts_input_and_orders_by_index() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/deployments/text-embedding/embeddings"))
        .and(query_param("api-version", "2024-06-01"))
        .and(header("api-key", "k"))
        .and(body_json(json!({"input": ["a", "b"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"index": 1, "embedding": [0.0, 1.0, 0.0]},
                {"index": 0, "embedding": [1.0, 0.0, 0.0]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = AzureOpenAiEmbedder::new(&config(server.uri())).expect("embedder");
    let out = embedder.embed_batch(&["a".to_string(), "b".to_string()]).await.expect("embed");
    assert_eq!(out, vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);
}

#[tokio::test]
async fn empty_query_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({"input": [""]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"index": 0, "embedding": [0.5]}]})))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = AzureOpenAiEmbedder::new(&config(server.uri())).unwrap();
    assert_eq!(embedder.embed("").await.unwrap(), vec![0.5]);
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let embedder = AzureOpenAiEmbedder::new(&config(server.uri())).unwrap();
    let err = embedder.embed("x").await.unwrap_err();
    assert_eq!(err, EmbedError::Status { status: 429, body: "slow down".to_string() });
}

#[tokio::test]
async fn malformed_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"data\": \"nope\"}"))
        .mount(&server)
        .await;

    let embedder = AzureOpenAiEmbedder::new(&config(server.uri())).unwrap();
    assert!(matches!(embedder.embed("x").await, Err(EmbedError::Malformed(_))));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Nothing listens on the discard port.
    let embedder = AzureOpenAiEmbedder::new(&config("http://127.0.0.1:9".to_string())).unwrap();
    assert!(matches!(embedder.embed("x").await, Err(EmbedError::Transport(_))));
}

#[test]
fn missing_endpoint_is_rejected() {
    assert!(AzureOpenAiEmbedder::new(&config(String::new())).is_err());
}
