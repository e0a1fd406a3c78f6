//! End-to-end router behavior against mocked collaborators.

use std::sync::Arc;

use datalens_charts::ChartRenderer;
use datalens_core::{AskRequest, Mode, Reply, Source, SourceChoice};
use datalens_engine::Warehouse;
use datalens_llm::ChatClient;
use datalens_service::{ChatService, ServiceError};
use datalens_store::{
    MemoryResponseCache, MemorySessionStore, PatternLearner, ResponseCache, SessionStore,
};
use datalens_vector::{EmbeddingClient, SemanticIndex, VectorStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

fn seeded_warehouse() -> Warehouse {
    let w = Warehouse::open_in_memory().unwrap();
    w.insert_order(1, "Acme LLC", Some(100.0), "USD", "2024-08-16 10:00:00", "PAID").unwrap();
    w.insert_order(2, "Globex", Some(250.5), "USD", "2024-08-16 11:00:00", "PAID").unwrap();
    w.insert_order(3, "Initech", Some(75.0), "USD", "2024-08-15 09:00:00", "PENDING").unwrap();
    w
}

struct Fixture {
    service: ChatService,
    sessions: Arc<MemorySessionStore>,
    cache: Arc<MemoryResponseCache>,
    patterns: Arc<PatternLearner>,
}

fn build(llm_url: &str, vector_url: &str, warehouse: Warehouse) -> Fixture {
    let sessions = Arc::new(MemorySessionStore::new());
    let cache = Arc::new(MemoryResponseCache::default());
    let patterns = Arc::new(PatternLearner::new());
    let sessions_dyn: Arc<dyn SessionStore> = Arc::clone(&sessions);
    let cache_dyn: Arc<dyn ResponseCache> = Arc::clone(&cache);
    let service = ChatService::new(
        sessions_dyn,
        cache_dyn,
        Arc::clone(&patterns),
        Arc::new(ChatClient::new(llm_url, "test-model").unwrap()),
        Arc::new(SemanticIndex::new(
            EmbeddingClient::new(vector_url, "bge").unwrap(),
            VectorStore::new(vector_url).unwrap(),
        )),
        warehouse,
        ChartRenderer::new(std::env::temp_dir().join("datalens-router-tests")),
    );
    Fixture { service, sessions, cache, patterns }
}

/// A base URL that refuses connections immediately.
const DEAD: &str = "http://127.0.0.1:1";

#[tokio::test]
async fn greeting_short_circuits_everything() {
    let fx = build(DEAD, DEAD, seeded_warehouse());

    let resp = fx.service.ask(&AskRequest::message("thank you!")).await.unwrap();
    assert_eq!(
        resp.reply,
        Reply::text("You're welcome! Feel free to ask any questions about your data.")
    );

    // no cache entry, no history, no learned pattern
    assert_eq!(fx.cache.stats().await.entries, 0);
    assert_eq!(fx.patterns.stats().await.financial_phrasings, 0);
    assert!(fx.service.history("default").await.is_empty());
}

#[tokio::test]
async fn rule_compiled_count_runs_with_keyword_intent_fallback() {
    // model down: intent falls back to the aggregation heuristic
    let fx = build(DEAD, DEAD, seeded_warehouse());

    let resp = fx.service.ask(&AskRequest::message("how many orders")).await.unwrap();
    assert_eq!(resp.reply, Reply::text("Result: 3"));
    let sql = resp.sql.unwrap();
    assert!(sql.contains("COUNT(*)"));
    assert!(sql.contains("financial_orders"));

    let history = fx.service.history("default").await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].text, "how many orders");
    assert_eq!(history[1].sql.as_deref(), Some(sql.as_str()));
}

#[tokio::test]
async fn identical_question_hits_the_cache() {
    let fx = build(DEAD, DEAD, seeded_warehouse());
    let req = AskRequest::message("how many orders");

    let first = fx.service.ask(&req).await.unwrap();
    let second = fx.service.ask(&req).await.unwrap();

    // byte-identical payload from the cache
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );

    // one entry, one hit, and the pattern log grew exactly once
    let cache = fx.cache.stats().await;
    assert_eq!(cache.entries, 1);
    assert_eq!(cache.total_hits, 2);
    let patterns = fx.patterns.stats().await;
    assert_eq!(patterns.financial_phrasings, 1);
    assert_eq!(patterns.accepted_queries, 1);

    // the cache hit did not touch history again
    assert_eq!(fx.sessions.history("default").await.len(), 2);
}

#[tokio::test]
async fn unsafe_generated_sql_is_fatal_and_never_executes() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("SQL")))
        .up_to_n_times(1)
        .mount(&llm)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("DROP TABLE financial_orders;")),
        )
        .mount(&llm)
        .await;

    let fx = build(&llm.uri(), DEAD, seeded_warehouse());
    let err = fx.service.ask(&AskRequest::message("purge order records")).await.unwrap_err();
    assert!(matches!(err, ServiceError::UnsafeSql(_)));

    // nothing was cached or appended to history
    let history = fx.service.history("default").await;
    assert!(history.is_empty());
    assert_eq!(fx.cache.stats().await.entries, 0);
}

#[tokio::test]
async fn failed_execution_falls_back_to_retrieval() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("SQL")))
        .up_to_n_times(1)
        .mount(&llm)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "SELECT no_such_column FROM financial_orders",
        )))
        .mount(&llm)
        .await;

    // vector side is down too, so the fallback degrades to the canned text
    let fx = build(&llm.uri(), DEAD, seeded_warehouse());
    let resp = fx.service.ask(&AskRequest::message("summarize order anomalies")).await.unwrap();
    match resp.reply {
        Reply::Text { text } => assert!(text.contains("having trouble")),
        other => panic!("expected degraded text reply, got {other:?}"),
    }
}

#[tokio::test]
async fn retrieval_path_answers_from_chunks() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("RAG")))
        .up_to_n_times(1)
        .mount(&llm)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "Orders are sales transactions recorded in the warehouse.",
        )))
        .mount(&llm)
        .await;

    let vector = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"data": [{"embedding": [0.1, 0.2, 0.3]}]}),
        ))
        .mount(&vector)
        .await;
    Mock::given(method("POST"))
        .and(path("/collections/financial_chunks/points/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": [{"score": 0.9, "payload": {"type": "schema",
                "schema": "financial_orders(...)", "description": "orders",
                "text": "financial orders hold sales transactions"}}]
        })))
        .mount(&vector)
        .await;

    let fx = build(&llm.uri(), &vector.uri(), seeded_warehouse());
    let resp = fx
        .service
        .ask(&AskRequest::message("what does the orders dataset describe"))
        .await
        .unwrap();
    assert_eq!(
        resp.reply,
        Reply::text("Orders are sales transactions recorded in the warehouse.")
    );
    assert_eq!(resp.sql, None);

    // retrieval answers are cached and learned as phrasings, not SQL
    assert_eq!(fx.cache.stats().await.entries, 1);
    let patterns = fx.patterns.stats().await;
    assert_eq!(patterns.financial_phrasings, 1);
    assert_eq!(patterns.accepted_queries, 0);
}

#[tokio::test]
async fn empty_result_set_becomes_a_text_explanation() {
    let llm = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("SQL")))
        .mount(&llm)
        .await;

    let empty = Warehouse::open_in_memory().unwrap();
    let fx = build(&llm.uri(), DEAD, empty);

    let mut req = AskRequest::message("orders by status");
    req.mode = Mode::Table;
    let resp = fx.service.ask(&req).await.unwrap();
    assert_eq!(resp.reply, Reply::text("No data found for your query."));
    assert!(resp.sql.unwrap().contains("GROUP BY status"));
}

#[tokio::test]
async fn pinned_source_skips_detection() {
    let fx = build(DEAD, DEAD, seeded_warehouse());
    let mut req = AskRequest::message("how many devices are online");
    req.source = SourceChoice::Devices;

    let resp = fx.service.ask(&req).await.unwrap();
    // devices rule list: online/offline phrasing compiles to a status breakdown
    let sql = resp.sql.unwrap();
    assert!(sql.contains("device_metrics"));

    let suggestions = fx.service.suggest("how many devices", Source::Devices, 5).await;
    assert_eq!(suggestions.len(), 1);
}
