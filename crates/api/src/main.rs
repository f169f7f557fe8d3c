use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use graph::{CompoundRecord, GraphStore, Neo4jStore, PathwayRecord, ReactionRecord};
use query::{AnswerClient, RagPipeline, RagResponse};

mod config;
use config::Settings;

#[derive(Clone)]
struct AppState {
    store: Neo4jStore,
    pipeline: Arc<RagPipeline<Neo4jStore>>,
}

#[derive(Deserialize)]
struct RagRequest {
    question: String,
}

#[derive(Serialize)]
struct HealthResponse {
    neo4j: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env();
    let store = Neo4jStore::connect(
        &settings.neo4j_uri,
        &settings.neo4j_user,
        &settings.neo4j_password,
    )
    .await?;

    let answer_client = AnswerClient::new(
        settings.llm_api_base.clone(),
        settings.llm_api_key.clone(),
        settings.llm_model.clone(),
        settings.llm_temperature,
        settings.llm_max_tokens,
        settings.llm_timeout,
    );
    let pipeline = RagPipeline::new(store.clone(), answer_client, settings.context_limits);

    let state = AppState {
        store,
        pipeline: Arc::new(pipeline),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/rag/query", post(rag_query))
        .route("/compounds/:id", get(get_compound))
        .route("/reactions/:id", get(get_reaction))
        .route("/pathways/:id", get(get_pathway))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("Server listening on http://{}", settings.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let neo4j = match state.store.ping().await {
        Ok(()) => "ok".to_string(),
        Err(err) => format!("error: {err:#}"),
    };
    Json(HealthResponse { neo4j })
}

async fn rag_query(
    State(state): State<AppState>,
    Json(request): Json<RagRequest>,
) -> Result<Json<RagResponse>, StatusCode> {
    if request.question.trim().is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    match state.pipeline.run(&request.question).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "RAG pipeline failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn get_compound(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CompoundRecord>, StatusCode> {
    to_response(state.store.fetch_compound(&id).await, "compound fetch failed")
}

async fn get_reaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReactionRecord>, StatusCode> {
    to_response(state.store.fetch_reaction(&id).await, "reaction fetch failed")
}

async fn get_pathway(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PathwayRecord>, StatusCode> {
    to_response(state.store.fetch_pathway(&id).await, "pathway fetch failed")
}

fn to_response<T>(
    result: anyhow::Result<Option<T>>,
    log_message: &'static str,
) -> Result<Json<T>, StatusCode> {
    match result {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "{}", log_message);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
