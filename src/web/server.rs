use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use uuid::Uuid;

use crate::catalog::store::RecipeCorpus;
use crate::catalog::taxonomy::RestrictionTaxonomy;
use crate::cli::ServeArgs;
use crate::matching::engine::{MatchError, MatchingConfig, MatchingEngine};
use crate::matching::session::SessionState;
use crate::utils::validation::validate_query_text;

/// Security configuration constants to prevent `DoS` attacks
pub const MAX_SESSIONS: usize = 10_000;
pub const MAX_BODY_SIZE: usize = 64 * 1024; // 64KB

/// Idle time after which a session is discarded
pub const SESSION_TTL: Duration = Duration::from_secs(30 * 60);

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug)]
struct SessionEntry {
    state: SessionState,
    last_seen_ms: i64,
}

/// Conversation states keyed by session id.
///
/// Each session is read and written independently; engine work runs on a
/// copy so one slow request never holds the lock for other sessions.
/// Sessions idle for longer than the TTL are treated as ended. When the store
/// is full, creating a session evicts the least recently used one.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    max_sessions: usize,
    ttl_ms: i64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(MAX_SESSIONS, SESSION_TTL)
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_limits(max_sessions: usize, ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, SessionEntry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &SessionEntry, now_ms: i64) -> bool {
        now_ms.saturating_sub(entry.last_seen_ms) >= self.ttl_ms
    }

    /// Start a new empty session
    pub fn create(&self) -> Uuid {
        self.create_at(now_ms())
    }

    fn create_at(&self, now_ms: i64) -> Uuid {
        let mut sessions = self.lock();

        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now_ms));
        if sessions.len() < before {
            tracing::debug!("Expired {} idle sessions", before - sessions.len());
        }

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen_ms)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    tracing::debug!("Session store full, evicting {id}");
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        let id = Uuid::new_v4();
        sessions.insert(
            id,
            SessionEntry {
                state: SessionState::new(),
                last_seen_ms: now_ms,
            },
        );
        id
    }

    /// Snapshot of a live session's state; refreshes its idle timer
    pub fn get(&self, id: &Uuid) -> Option<SessionState> {
        self.get_at(id, now_ms())
    }

    fn get_at(&self, id: &Uuid, now_ms: i64) -> Option<SessionState> {
        let mut sessions = self.lock();
        let entry = sessions.get_mut(id)?;
        if self.is_expired(entry, now_ms) {
            sessions.remove(id);
            return None;
        }
        entry.last_seen_ms = now_ms;
        Some(entry.state.clone())
    }

    /// Replace a session's state; returns false if the session was deleted meanwhile
    pub fn update(&self, id: &Uuid, state: SessionState) -> bool {
        match self.lock().get_mut(id) {
            Some(entry) => {
                entry.state = state;
                entry.last_seen_ms = now_ms();
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Shared application state
pub struct AppState {
    pub corpus: RecipeCorpus,
    pub taxonomy: RestrictionTaxonomy,
    pub config: MatchingConfig,
    pub sessions: SessionStore,
}

impl AppState {
    fn engine(&self) -> MatchingEngine<'_> {
        MatchingEngine::with_config(&self.corpus, &self.taxonomy, self.config.clone())
    }
}

/// Enhanced error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    // Log detailed error server-side for debugging (not exposed to client)
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None, // Never expose internal details to prevent information disclosure
    }
}

/// Error returned from API handlers
struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, error_type: &str, message: &str) -> Self {
        Self {
            status,
            body: create_safe_error_response(error_type, message, None),
        }
    }

    fn session_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "session_not_found", "Session not found")
    }
}

impl From<MatchError> for ApiError {
    fn from(error: MatchError) -> Self {
        let status = match error {
            MatchError::NotFound(_) | MatchError::NoSuggestionsMatched => StatusCode::NOT_FOUND,
            MatchError::RestrictionConflict { .. } => StatusCode::CONFLICT,
            MatchError::AllIngredientsExcluded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            MatchError::InvalidSelection { .. } | MatchError::EmptyInput => StatusCode::BAD_REQUEST,
        };
        Self::new(status, error.kind(), &error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Deserialize)]
struct FindRequest {
    name: String,
    #[serde(default)]
    restriction: String,
}

#[derive(Deserialize)]
struct SuggestRequest {
    ingredients: String,
    #[serde(default)]
    restriction: String,
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    // Build tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the rate limiter cannot be configured.
pub fn create_router(corpus: RecipeCorpus, config: MatchingConfig) -> anyhow::Result<Router> {
    let state = Arc::new(AppState {
        corpus,
        taxonomy: RestrictionTaxonomy::builtin(),
        config,
        sessions: SessionStore::new(),
    });

    // Configure IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10) // 10 requests per second per IP
        .burst_size(50) // Allow bursts of 50 requests
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?;

    // Build router with comprehensive security layers
    let app = Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/corpus", get(corpus_handler))
        .route("/api/sessions", post(create_session_handler))
        .route("/api/sessions/{id}", delete(delete_session_handler))
        .route("/api/sessions/{id}/find", post(find_handler))
        .route("/api/sessions/{id}/suggest", post(suggest_handler))
        .route("/api/sessions/{id}/recipe", get(recipe_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                // Security headers for browser protection
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("no-referrer"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("cache-control"),
                    HeaderValue::from_static("no-store"),
                ))
                // IP-based rate limiting to prevent abuse
                .layer(GovernorLayer {
                    config: Arc::new(governor_conf),
                })
                // Request timeout to prevent slow client attacks
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(30),
                ))
                // Limit concurrent requests to prevent DOS
                .layer(ConcurrencyLimitLayer::new(100))
                .layer(DefaultBodyLimit::max(MAX_BODY_SIZE)),
        );

    Ok(app)
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let corpus = args.source.load_corpus()?;
    let config = args.source.load_config()?;
    let recipe_count = corpus.len();
    let app = create_router(corpus, config)?;

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting recipe-finder web server at http://{addr}");
    tracing::info!("Serving {recipe_count} recipes on {addr}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::session_not_found())
}

fn validated<'a>(field: &'static str, text: &'a str) -> Result<&'a str, ApiError> {
    validate_query_text(field, text)
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, "invalid_input", &e.to_string()))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "recipes": state.corpus.len(),
        "sessions": state.sessions.len(),
    }))
}

/// Return list of recipe names in the corpus
async fn corpus_handler(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let names: Vec<&str> = state.corpus.recipes.iter().map(|r| r.name.as_str()).collect();

    Json(serde_json::json!({
        "count": names.len(),
        "recipes": names,
    }))
}

async fn create_session_handler(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let id = state.sessions.create();
    tracing::debug!("Created session {id}");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "session_id": id })),
    )
        .into_response())
}

async fn delete_session_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_session_id(&id)?;
    if state.sessions.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::session_not_found())
    }
}

async fn find_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<FindRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_session_id(&id)?;
    let name = validated("name", &request.name)?;
    let restriction = validated("restriction", &request.restriction)?;

    let mut session = state.sessions.get(&id).ok_or_else(ApiError::session_not_found)?;
    let engine = state.engine();
    let outcome = engine.resolve_by_name(&mut session, name, restriction);
    if !state.sessions.update(&id, session) {
        return Err(ApiError::session_not_found());
    }

    let result = outcome?;
    let recipe = &state.corpus.recipes[result.index];
    Ok(Json(serde_json::json!({
        "name": recipe.name,
        "score": result.score,
        "confidence": result.confidence(),
        "ingredients": recipe.ingredients,
    })))
}

async fn suggest_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<SuggestRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_session_id(&id)?;
    let ingredients = validated("ingredients", &request.ingredients)?;
    let restriction = validated("restriction", &request.restriction)?;

    let mut session = state.sessions.get(&id).ok_or_else(ApiError::session_not_found)?;
    let engine = state.engine();
    let outcome = engine.suggest(&mut session, ingredients, restriction);
    if !state.sessions.update(&id, session) {
        return Err(ApiError::session_not_found());
    }

    let round = outcome?;
    let suggestions: Vec<serde_json::Value> = round
        .suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            serde_json::json!({
                "rank": i + 1,
                "name": state.corpus.recipes[s.index].name,
                "score": s.score,
                "missing_count": s.missing_count,
                "missing_ingredients": s.missing_ingredients,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "excluded": round.ingredients.excluded,
        "suggestions": suggestions,
    })))
}

/// The recipe most recently resolved in this session
async fn recipe_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_session_id(&id)?;
    let session = state.sessions.get(&id).ok_or_else(ApiError::session_not_found)?;

    let recipe = session
        .last_match()
        .and_then(|m| state.corpus.get(m.index))
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::NOT_FOUND,
                "no_recipe_selected",
                "No recipe has been selected in this session",
            )
        })?;

    Ok(Json(serde_json::json!({
        "name": recipe.name,
        "ingredients": recipe.ingredients,
        "steps": recipe.steps,
    })))
}
