//! Core quiz behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Starting a quiz (settings validation + generating all questions)
//!   - Presenting the current question with its remaining time
//!   - Scoring a submitted answer (late submissions count as wrong)
//!   - Advancing to the next question or the results screen
//!   - Computing results and updating the persistent high score

use tracing::{info, instrument, warn};

use crate::domain::{Category, ConfigError};
use crate::generator;
use crate::protocol::{AnswerOut, QuestionOut, ResultsOut, StartIn};
use crate::state::{AppState, QuizSession, QuizSettings};

const CALCULUS_HINT: &str = "Use x**n format for powers, e.g. 3*x**2";

/// Everything that can go wrong on the quiz control path. Answer checking
/// itself never fails; these are session/settings errors.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
  #[error(transparent)]
  Config(#[from] ConfigError),
  #[error("unknown session id '{0}'")]
  UnknownSession(String),
  #[error("quiz is already finished; fetch the results instead")]
  QuizFinished,
  #[error("quiz is still in progress")]
  QuizInProgress,
  #[error("this question was already answered")]
  AlreadySubmitted,
}

/// Outcome of advancing past a question.
#[derive(Debug)]
pub enum Advance {
  Question(QuestionOut),
  Finished(ResultsOut),
}

/// Validate client settings (falling back to configured defaults), build
/// the session, and hand back the first question.
#[instrument(level = "info", skip(state, start))]
pub async fn start_quiz(state: &AppState, start: StartIn) -> Result<QuestionOut, QuizError> {
  let cfg = &state.config;
  let difficulty = match &start.difficulty {
    Some(s) => s.parse()?,
    None => cfg.default_difficulty,
  };
  let category = match &start.category {
    Some(s) => s.parse()?,
    None => cfg.default_category,
  };
  let settings = QuizSettings {
    difficulty,
    category,
    num_questions: start.num_questions.unwrap_or(cfg.default_questions),
    seconds_per_question: start
      .seconds_per_question
      .unwrap_or(cfg.default_seconds_per_question),
    multiple_choice: start.multiple_choice.unwrap_or(cfg.default_multiple_choice),
  };
  let session = state.start_session(settings).await?;
  Ok(question_view(&session))
}

/// The current question for a session, with its live countdown.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn current_question(state: &AppState, session_id: &str) -> Result<QuestionOut, QuizError> {
  let session = state
    .get_session(session_id)
    .await
    .ok_or_else(|| QuizError::UnknownSession(session_id.to_string()))?;
  if session.is_finished() {
    return Err(QuizError::QuizFinished);
  }
  Ok(question_view(&session))
}

/// Score one submitted answer. A submission after the per-question clock
/// has run out is counted wrong; a second submission for the same question
/// is rejected.
#[instrument(level = "info", skip(state, answer), fields(%session_id, answer_len = answer.len()))]
pub async fn submit_answer(
  state: &AppState,
  session_id: &str,
  answer: &str,
) -> Result<AnswerOut, QuizError> {
  let outcome = state
    .update_session(session_id, |session| score_submission(session, answer))
    .await
    .ok_or_else(|| QuizError::UnknownSession(session_id.to_string()))??;
  info!(
    target: "quiz",
    id = %session_id,
    correct = outcome.correct,
    timed_out = outcome.timed_out,
    score = outcome.score,
    "Answer evaluated"
  );
  Ok(outcome)
}

fn score_submission(session: &mut QuizSession, answer: &str) -> Result<AnswerOut, QuizError> {
  let problem = match session.current_problem() {
    Some(p) => p.clone(),
    None => return Err(QuizError::QuizFinished),
  };
  if session.submitted {
    return Err(QuizError::AlreadySubmitted);
  }
  let timed_out = session.remaining_seconds() == 0;
  let correct = !timed_out && generator::check_answer(&problem, answer);
  session.submitted = true;
  if correct {
    session.correct += 1;
  }
  Ok(AnswerOut {
    correct,
    expected: if correct { String::new() } else { problem.answer.to_string() },
    timed_out,
    score: session.correct,
  })
}

/// Advance to the next question; when the quiz is exhausted, produce the
/// results instead.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn next_question(state: &AppState, session_id: &str) -> Result<Advance, QuizError> {
  let finished = state
    .update_session(session_id, |session| {
      session.advance();
      session.is_finished()
    })
    .await
    .ok_or_else(|| QuizError::UnknownSession(session_id.to_string()))?;
  if finished {
    return Ok(Advance::Finished(results(state, session_id).await?));
  }
  let question = current_question(state, session_id).await?;
  Ok(Advance::Question(question))
}

/// Final results for a finished quiz. The high score file is updated the
/// first time the results are computed; repeat calls reuse the recorded
/// outcome so the new-record flag stays stable.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn results(state: &AppState, session_id: &str) -> Result<ResultsOut, QuizError> {
  let session = state
    .get_session(session_id)
    .await
    .ok_or_else(|| QuizError::UnknownSession(session_id.to_string()))?;
  if !session.is_finished() {
    return Err(QuizError::QuizInProgress);
  }

  let score = session.correct;
  let total = session.problems.len();
  let (previous, beaten) = match session.high_score_outcome {
    Some(recorded) => recorded,
    None => {
      let outcome = state.high_scores.record_if_beaten(score);
      state
        .update_session(session_id, |s| s.high_score_outcome = Some(outcome))
        .await;
      if outcome.1 {
        info!(target: "quiz", id = %session_id, score, previous = outcome.0, "New high score");
      }
      outcome
    }
  };

  let percent = if total == 0 {
    0
  } else {
    ((score as f64 / total as f64) * 100.0).round() as u32
  };
  Ok(ResultsOut {
    score,
    total,
    percent,
    high_score: if beaten { previous.max(score) } else { previous },
    new_high_score: beaten,
  })
}

/// Current persistent high score.
#[instrument(level = "debug", skip(state))]
pub async fn high_score(state: &AppState) -> u32 {
  state.high_scores.read()
}

fn question_view(session: &QuizSession) -> QuestionOut {
  // callers check is_finished first; an exhausted session here is a bug
  let problem = match session.current_problem() {
    Some(p) => p,
    None => {
      warn!(target: "quiz", id = %session.id, "question_view on finished session");
      return QuestionOut {
        session_id: session.id.clone(),
        number: session.problems.len(),
        total: session.problems.len(),
        difficulty: session.settings.difficulty,
        category: session.settings.category,
        prompt: String::new(),
        remaining_seconds: 0,
        choices: None,
        hint: None,
      };
    }
  };
  QuestionOut {
    session_id: session.id.clone(),
    number: session.current + 1,
    total: session.problems.len(),
    difficulty: session.settings.difficulty,
    category: session.settings.category,
    prompt: problem.display_text.clone(),
    remaining_seconds: session.remaining_seconds(),
    choices: session.current_choices().cloned(),
    hint: match problem.category {
      Category::Calculus => Some(CALCULUS_HINT.to_string()),
      Category::Arithmetic => None,
    },
  }
}
