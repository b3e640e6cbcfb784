use crate::{
    config::Config,
    outreach::{CallRequest, EmailRequest, OutreachError, OutreachResponse, OutreachService},
    profiles::{Profile, ProfileStore},
    semantic::ProfileSearchService,
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::signal;

/// Everything the HTTP layer needs. The search service is already Ready by the
/// time this is constructed — initialization is a startup barrier, not a
/// request-time concern.
pub struct Backend {
    pub config: Config,
    pub profiles: Arc<ProfileStore>,
    pub search: Arc<ProfileSearchService>,
    pub outreach: Arc<OutreachService>,
}

#[derive(Clone)]
struct SharedState {
    backend: Arc<Backend>,
}

async fn start_app(backend: Backend) {
    let listen_addr = backend.config.listen_addr.clone();
    let shared_state = Arc::new(SharedState {
        backend: Arc::new(backend),
    });

    async fn shutdown_signal() {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    }

    let app = Router::new()
        .route("/", get(root))
        .route("/api/influencers", get(list_influencers))
        .route("/api/influencers/search", get(search_influencers))
        .route("/api/outreach/email", post(send_email))
        .route("/api/outreach/call", post(send_call))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(shared_state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await.unwrap();
    log::info!("listening on {listen_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

pub fn start_daemon(backend: Backend) {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async { start_app(backend).await });
}

#[derive(Debug)]
struct HttpError(OutreachError);

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        match self.0 {
            OutreachError::InvalidRequest(_) => (
                axum::http::StatusCode::BAD_REQUEST,
                json!({"error": self.0.to_string()}).to_string(),
            ),
            OutreachError::ProvidersExhausted(_) => {
                log::error!("{self:?}");
                (
                    axum::http::StatusCode::BAD_GATEWAY,
                    json!({"error": self.0.to_string()}).to_string(),
                )
            }
        }
        .into_response()
    }
}

impl From<OutreachError> for HttpError {
    fn from(err: OutreachError) -> Self {
        Self(err)
    }
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Welcome to the BrandSync API."
    }))
}

async fn list_influencers(State(state): State<Arc<SharedState>>) -> Json<Vec<Profile>> {
    Json(state.backend.profiles.all().to_vec())
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    /// Natural language search query
    q: String,
}

#[derive(Debug, Serialize)]
struct SearchResponseItem {
    #[serde(flatten)]
    profile: Profile,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity_score: Option<f32>,
}

async fn search_influencers(
    State(state): State<Arc<SharedState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<SearchResponseItem>> {
    log::debug!("search query: {:?}", params.q);

    let backend = state.backend.clone();
    let include_scores = backend.config.search.include_scores;

    // The embedding call is CPU-bound; keep it off the async scheduler.
    let hits = tokio::task::block_in_place(move || backend.search.search(&params.q));

    Json(
        hits.into_iter()
            .map(|hit| SearchResponseItem {
                profile: hit.profile,
                similarity_score: include_scores.then_some(hit.score),
            })
            .collect(),
    )
}

async fn send_email(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<EmailRequest>,
) -> Result<Json<OutreachResponse>, HttpError> {
    log::debug!("email request for {}", payload.influencer_name);

    let backend = state.backend.clone();
    tokio::task::block_in_place(move || {
        backend
            .outreach
            .send_email(&payload)
            .map(Json)
            .map_err(Into::into)
    })
}

async fn send_call(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<CallRequest>,
) -> Result<Json<OutreachResponse>, HttpError> {
    log::debug!("call request for {}", payload.influencer_name);

    let backend = state.backend.clone();
    tokio::task::block_in_place(move || {
        backend
            .outreach
            .send_call(&payload)
            .map(Json)
            .map_err(Into::into)
    })
}
