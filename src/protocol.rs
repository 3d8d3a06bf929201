//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Difficulty};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartQuiz(StartIn),
    GetQuestion {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    SubmitAnswer {
        #[serde(rename = "sessionId")]
        session_id: String,
        answer: String,
    },
    NextQuestion {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    GetResults {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    GetHighScore,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Question {
        question: QuestionOut,
    },
    AnswerResult(AnswerOut),
    Results(ResultsOut),
    HighScore {
        score: u32,
    },
    Error {
        message: String,
    },
}

//
// Request/response DTOs shared by WS and HTTP
//

/// Quiz settings as submitted by the client. Difficulty and category stay
/// strings here so unrecognized values surface as configuration errors
/// instead of opaque deserialization failures; omitted fields fall back to
/// the server's configured defaults.
#[derive(Debug, Default, Deserialize)]
pub struct StartIn {
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "numQuestions")]
    pub num_questions: Option<usize>,
    #[serde(default, rename = "secondsPerQuestion")]
    pub seconds_per_question: Option<u64>,
    #[serde(default, rename = "multipleChoice")]
    pub multiple_choice: Option<bool>,
}

/// One question as presented to the client. The canonical answer is
/// deliberately absent.
#[derive(Debug, Serialize)]
pub struct QuestionOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    /// 1-based question number.
    pub number: usize,
    pub total: usize,
    pub difficulty: Difficulty,
    pub category: Category,
    pub prompt: String,
    #[serde(rename = "remainingSeconds")]
    pub remaining_seconds: u64,
    /// Present in multiple-choice mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    /// Input-format hint, present for calculus questions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnswerOut {
    pub correct: bool,
    /// Canonical answer text, revealed when the submission is wrong.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub expected: String,
    #[serde(rename = "timedOut")]
    pub timed_out: bool,
    /// Correct answers so far in this session.
    pub score: u32,
}

#[derive(Debug, Serialize)]
pub struct ResultsOut {
    pub score: u32,
    pub total: usize,
    pub percent: u32,
    #[serde(rename = "highScore")]
    pub high_score: u32,
    #[serde(rename = "newHighScore")]
    pub new_high_score: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    pub answer: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_quiz_ws_message_deserializes() {
        let msg: ClientWsMessage = serde_json::from_str(
            r#"{"type":"start_quiz","difficulty":"medium","category":"calculus","numQuestions":3}"#,
        )
        .unwrap();
        match msg {
            ClientWsMessage::StartQuiz(s) => {
                assert_eq!(s.difficulty.as_deref(), Some("medium"));
                assert_eq!(s.num_questions, Some(3));
                assert!(s.seconds_per_question.is_none());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn question_omits_empty_optionals() {
        let q = QuestionOut {
            session_id: "s1".into(),
            number: 1,
            total: 5,
            difficulty: Difficulty::Easy,
            category: Category::Arithmetic,
            prompt: "3 + 4".into(),
            remaining_seconds: 20,
            choices: None,
            hint: None,
        };
        let json = serde_json::to_string(&q).unwrap();
        assert!(!json.contains("choices"));
        assert!(!json.contains("hint"));
        assert!(json.contains("\"sessionId\":\"s1\""));
    }
}
