use std::sync::Arc;

use chrono::Utc;
use datalens_charts::ChartRenderer;
use datalens_classify::{detect_mode, detect_source, greeting_reply, is_greeting, needs_sql};
use datalens_core::{AskRequest, AskResponse, Intent, Mode, Reply, Source, Table, Turn};
use datalens_engine::Warehouse;
use datalens_llm::{answer_messages, intent_messages, parse_intent, sql_messages, ChatClient};
use datalens_sqlgen::{compile, enforce_limit, extract_sql, normalize, SqlGenError};
use datalens_store::{
    cache_key, CacheEntry, CacheStats, PatternLearner, PatternStats, ResponseCache, SessionStats,
    SessionStore,
};
use datalens_vector::SemanticIndex;
use serde::Serialize;

use crate::context::context_for_key;
use crate::error::ServiceError;
use crate::format::{format_sql_response, format_sql_result};

/// Best-effort text when every downstream collaborator is unavailable.
const DEGRADED_TEXT: &str =
    "I apologize, but I'm having trouble processing your request right now. Please try again.";

/// Combined statistics for the stats endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GatewayStats {
    pub cache: CacheStats,
    pub patterns: PatternStats,
    pub sessions: SessionStats,
}

/// The gateway router.
///
/// Owns the in-process stores for its lifetime and drives each request
/// through: greeting check → source/mode detection → cache check → intent
/// resolution → SQL or retrieval → format → cache store + learn → history
/// append. No state is revisited within a request, and no store lock is
/// held across a downstream call.
pub struct ChatService {
    sessions: Arc<dyn SessionStore>,
    cache: Arc<dyn ResponseCache>,
    patterns: Arc<PatternLearner>,
    llm: Arc<ChatClient>,
    index: Arc<SemanticIndex>,
    warehouse: Warehouse,
    charts: ChartRenderer,
}

impl ChatService {
    #[must_use]
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        cache: Arc<dyn ResponseCache>,
        patterns: Arc<PatternLearner>,
        llm: Arc<ChatClient>,
        index: Arc<SemanticIndex>,
        warehouse: Warehouse,
        charts: ChartRenderer,
    ) -> Self {
        Self { sessions, cache, patterns, llm, index, warehouse, charts }
    }

    /// Answer one question.
    ///
    /// # Errors
    /// Fails only when externally generated SQL is rejected by the safety
    /// gate; every other downstream failure degrades to a simpler path.
    pub async fn ask(&self, req: &AskRequest) -> Result<AskResponse, ServiceError> {
        if is_greeting(&req.message) {
            return Ok(AskResponse::text_only(greeting_reply(&req.message)));
        }

        let source = req.source.fixed().unwrap_or_else(|| {
            let detected = detect_source(&req.message);
            tracing::debug!(source = %detected, "auto-detected source");
            detected
        });

        let history = self.sessions.history(&req.session_id).await;
        let prompt_context = datalens_store::render_context(
            &history,
            datalens_core::constants::CONTEXT_WINDOW_TURNS,
        );
        let key = cache_key(
            &req.message,
            source,
            req.mode,
            &context_for_key(&history, &req.message),
        );

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let schema_context = self.index.schema_context(&req.message, source).await;
        let mode = if req.mode == Mode::Auto { detect_mode(&req.message) } else { req.mode };
        let intent = self.resolve_intent(&req.message, &schema_context, &prompt_context).await;

        let response = match intent {
            Intent::Sql => {
                self.sql_path(req, source, mode, &schema_context, &prompt_context).await?
            },
            Intent::Retrieval => {
                self.retrieval_path(req, source, &schema_context, &prompt_context).await
            },
        };

        // write-back happens only once a response exists; an abandoned
        // request leaves no partial cache or history mutation behind
        if response.is_cacheable() {
            let entry = CacheEntry::new(
                &req.message,
                source,
                req.mode,
                response.sql.clone(),
                response.clone(),
            );
            self.cache.put(&key, entry).await;
            self.patterns.learn(&req.message, source, response.sql.as_deref()).await;
        }

        self.sessions.append(&req.session_id, Turn::user(&req.message)).await;
        self.sessions
            .append(
                &req.session_id,
                Turn::assistant(response.reply.history_text())
                    .with_sql(response.sql.clone())
                    .with_chart_ref(response.reply.chart_ref().cloned()),
            )
            .await;

        Ok(response)
    }

    /// SQL-vs-retrieval via the model, with the lexical heuristic as the
    /// fallback when the call fails.
    async fn resolve_intent(
        &self,
        message: &str,
        schema_context: &str,
        conversation_context: &str,
    ) -> Intent {
        let messages = intent_messages(message, schema_context, conversation_context);
        match self.llm.chat(&messages).await {
            Ok(reply) => parse_intent(&reply),
            Err(e) => {
                tracing::warn!("intent classification unavailable, using keyword fallback: {e}");
                if needs_sql(message) { Intent::Sql } else { Intent::Retrieval }
            },
        }
    }

    async fn sql_path(
        &self,
        req: &AskRequest,
        source: Source,
        mode: Mode,
        schema_context: &str,
        prompt_context: &str,
    ) -> Result<AskResponse, ServiceError> {
        let now = Utc::now();
        let sql = match compile(&req.message, source, now) {
            Some(sql) => sql,
            None => match self.generate_sql(&req.message, source, schema_context).await? {
                Some(sql) => sql,
                None => {
                    return Ok(self
                        .retrieval_path(req, source, schema_context, prompt_context)
                        .await);
                },
            },
        };

        match self.warehouse.query(&sql).await {
            Ok(table) if table.is_empty() => Ok(AskResponse::new(
                Reply::text("No data found for your query."),
                Some(sql),
            )),
            Ok(table) => {
                Ok(format_sql_response(table, mode, &req.message, sql, &self.charts))
            },
            Err(e) => {
                tracing::warn!(sql = %sql, "SQL execution failed, falling back to retrieval: {e}");
                Ok(self.retrieval_path(req, source, schema_context, prompt_context).await)
            },
        }
    }

    /// Model-generated SQL, passed through the safety normalizer.
    ///
    /// `Ok(None)` means no usable SQL came back (model unavailable, nothing
    /// extractable, or a shape the normalizer discards); the caller falls
    /// back to retrieval. A mutating statement is the one fatal outcome.
    async fn generate_sql(
        &self,
        message: &str,
        source: Source,
        schema_context: &str,
    ) -> Result<Option<String>, ServiceError> {
        let messages = sql_messages(message, source.table(), schema_context);
        let raw = match self.llm.chat(&messages).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("SQL generation unavailable: {e}");
                return Ok(None);
            },
        };

        let candidate = extract_sql(&raw).unwrap_or(raw);
        match normalize(&candidate, source, message, Utc::now()) {
            Ok(sql) => Ok(Some(enforce_limit(&sql, message))),
            Err(e @ SqlGenError::UnsafeStatement(_)) => Err(ServiceError::UnsafeSql(e)),
            Err(e) => {
                tracing::warn!("discarding generated SQL: {e}");
                Ok(None)
            },
        }
    }

    /// Semantic retrieval with a grounded answer; degrades to a canned
    /// explanation when either collaborator is down.
    async fn retrieval_path(
        &self,
        req: &AskRequest,
        source: Source,
        schema_context: &str,
        prompt_context: &str,
    ) -> AskResponse {
        let chunks = match self.index.semantic_search(source, &req.message, req.top_k).await {
            Ok(hits) => hits
                .iter()
                .map(|h| {
                    h.payload
                        .get("text")
                        .and_then(serde_json::Value::as_str)
                        .map_or_else(|| h.payload.to_string(), str::to_owned)
                })
                .collect::<Vec<_>>(),
            Err(e) => {
                tracing::warn!("semantic search unavailable: {e}");
                return AskResponse::text_only(DEGRADED_TEXT);
            },
        };

        let messages = answer_messages(&req.message, &chunks, schema_context, prompt_context);
        match self.llm.chat(&messages).await {
            Ok(text) => AskResponse::text_only(text),
            Err(e) => {
                tracing::warn!("grounded answer generation failed: {e}");
                AskResponse::text_only(DEGRADED_TEXT)
            },
        }
    }

    // ── session and stats delegates ────────────────────────────────────

    pub async fn history(&self, session_id: &str) -> Vec<Turn> {
        self.sessions.history(session_id).await
    }

    pub async fn clear_session(&self, session_id: &str) -> bool {
        self.sessions.clear(session_id).await
    }

    pub async fn suggest(&self, message: &str, source: Source, limit: usize) -> Vec<String> {
        self.patterns.similar(message, source, limit).await
    }

    pub async fn stats(&self) -> GatewayStats {
        GatewayStats {
            cache: self.cache.stats().await,
            patterns: self.patterns.stats().await,
            sessions: self.sessions.stats().await,
        }
    }

    /// Format a result table into readable text. Exposed for the one-shot
    /// CLI command.
    #[must_use]
    pub fn render_result_text(table: &Table) -> String {
        format_sql_result(table)
    }
}
