use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::application::answer_service::AnswerService;
use crate::domain::speech::SpeechSynthesizer;

#[derive(Clone)]
pub struct AppState {
    pub answer: Arc<AnswerService>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub text: String,
    pub audio_base64: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub trace: String,
}

/// Builds the application router. Cross-origin requests are accepted only
/// from `allowed_origin`; requests with a missing or mistyped `query` field
/// are rejected by the `Json` extractor before the handler runs.
pub fn router(state: AppState, allowed_origin: &str) -> Result<Router> {
    let origin: HeaderValue = allowed_origin
        .parse()
        .with_context(|| format!("invalid allowed origin '{allowed_origin}'"))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state))
}

async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, Json<ErrorBody>)> {
    match handle_ask(&state, &request.query).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => {
            log::error!("ask request failed: {err:#}");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: err.to_string(),
                    trace: format!("{err:?}"),
                }),
            ))
        }
    }
}

async fn handle_ask(state: &AppState, query: &str) -> Result<AskResponse> {
    let text = state.answer.answer(query).await?;
    let audio = state.speech.synthesize(&text).await?;
    Ok(AskResponse {
        text,
        audio_base64: BASE64.encode(audio),
    })
}
