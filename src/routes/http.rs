//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; logs include parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use serde_json::json;
use tracing::{info, instrument};

use crate::logic::{self, Advance, QuizError};
use crate::protocol::*;
use crate::state::AppState;

impl IntoResponse for QuizError {
  fn into_response(self) -> axum::response::Response {
    let status = match &self {
      QuizError::Config(_) => StatusCode::BAD_REQUEST,
      QuizError::UnknownSession(_) => StatusCode::NOT_FOUND,
      QuizError::QuizFinished | QuizError::QuizInProgress | QuizError::AlreadySubmitted => {
        StatusCode::CONFLICT
      }
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, body))]
pub async fn http_start_quiz(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartIn>,
) -> Result<impl IntoResponse, QuizError> {
  let question = logic::start_quiz(&state, body).await?;
  info!(target: "quiz", id = %question.session_id, total = question.total, "HTTP quiz started");
  Ok(Json(question))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_question(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, QuizError> {
  let question = logic::current_question(&state, &id).await?;
  Ok(Json(question))
}

#[instrument(level = "info", skip(state, body), fields(%id, answer_len = body.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> Result<impl IntoResponse, QuizError> {
  let out = logic::submit_answer(&state, &id, &body.answer).await?;
  info!(target: "quiz", %id, correct = out.correct, "HTTP answer evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_post_next(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, QuizError> {
  let body = match logic::next_question(&state, &id).await? {
    Advance::Question(q) => json!({ "finished": false, "question": q }),
    Advance::Finished(r) => json!({ "finished": true, "results": r }),
  };
  Ok(Json(body))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_results(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, QuizError> {
  let results = logic::results(&state, &id).await?;
  info!(target: "quiz", %id, score = results.score, total = results.total, "HTTP results served");
  Ok(Json(results))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_high_score(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let score = logic::high_score(&state).await;
  Json(json!({ "highScore": score }))
}
