//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::{self, Advance};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "mathquiz_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "mathquiz_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "mathquiz_backend", raw = %trunc_for_log(&txt, 256), "WS received");
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "mathquiz_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "mathquiz_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(msg, state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::StartQuiz(start) => match logic::start_quiz(state, start).await {
      Ok(question) => {
        tracing::info!(target: "quiz", id = %question.session_id, total = question.total, "WS quiz started");
        ServerWsMessage::Question { question }
      }
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::GetQuestion { session_id } => {
      match logic::current_question(state, &session_id).await {
        Ok(question) => ServerWsMessage::Question { question },
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::SubmitAnswer { session_id, answer } => {
      match logic::submit_answer(state, &session_id, &answer).await {
        Ok(out) => {
          tracing::info!(target: "quiz", id = %session_id, correct = out.correct, "WS answer evaluated");
          ServerWsMessage::AnswerResult(out)
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::NextQuestion { session_id } => {
      match logic::next_question(state, &session_id).await {
        Ok(Advance::Question(question)) => ServerWsMessage::Question { question },
        Ok(Advance::Finished(results)) => ServerWsMessage::Results(results),
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::GetResults { session_id } => {
      match logic::results(state, &session_id).await {
        Ok(results) => ServerWsMessage::Results(results),
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::GetHighScore => ServerWsMessage::HighScore {
      score: logic::high_score(state).await,
    },
  }
}
