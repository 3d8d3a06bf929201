//! Application state: quiz sessions, configuration, and the high score store.
//!
//! This module owns:
//!   - the in-memory session map (id -> QuizSession)
//!   - the loaded quiz configuration (TOML or defaults)
//!   - the high score file store
//!
//! The generation/checking core stays stateless; everything that lives
//! across requests sits here behind a tokio RwLock.

use std::{collections::HashMap, sync::Arc, time::Instant};
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::{load_config_from_env, QuizConfig};
use crate::domain::{Category, ConfigError, Difficulty, Problem};
use crate::generator::{self, RandomSource, ThreadRngSource};
use crate::highscore::HighScoreStore;

/// Settings for one quiz run, fixed at start.
#[derive(Clone, Copy, Debug)]
pub struct QuizSettings {
    pub difficulty: Difficulty,
    pub category: Category,
    pub num_questions: usize,
    pub seconds_per_question: u64,
    pub multiple_choice: bool,
}

/// One in-progress quiz: all problems generated up front, a cursor, a
/// correct tally, and the current question's timer state.
#[derive(Clone, Debug)]
pub struct QuizSession {
    pub id: String,
    pub settings: QuizSettings,
    pub problems: Vec<Problem>,
    pub choice_lists: Vec<Option<Vec<String>>>,
    pub current: usize,
    pub correct: u32,
    pub question_start: Instant,
    pub submitted: bool,
    /// (previous record, beaten) once results have been computed; keeps
    /// the high score write idempotent across repeated results fetches.
    pub high_score_outcome: Option<(u32, bool)>,
}

impl QuizSession {
    pub fn current_problem(&self) -> Option<&Problem> {
        self.problems.get(self.current)
    }

    pub fn current_choices(&self) -> Option<&Vec<String>> {
        self.choice_lists.get(self.current).and_then(|c| c.as_ref())
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.problems.len()
    }

    /// Whole seconds left on the current question's clock.
    pub fn remaining_seconds(&self) -> u64 {
        self.settings
            .seconds_per_question
            .saturating_sub(self.question_start.elapsed().as_secs())
    }

    /// Move to the next question and restart the clock.
    pub fn advance(&mut self) {
        self.current += 1;
        self.question_start = Instant::now();
        self.submitted = false;
    }
}

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, QuizSession>>>,
    pub config: QuizConfig,
    pub high_scores: HighScoreStore,
}

impl AppState {
    /// Build state from env: load TOML config (or defaults) and open the
    /// high score store.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_config_from_env().unwrap_or_default();
        let high_scores = HighScoreStore::new(config.high_score_path.clone());
        info!(
            target: "mathquiz_backend",
            high_score_path = %config.high_score_path,
            high_score = high_scores.read(),
            "Application state initialized"
        );
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
            high_scores,
        }
    }

    /// Validate settings, generate every problem up front, and register
    /// the new session.
    #[instrument(level = "info", skip(self), fields(difficulty = %settings.difficulty, category = %settings.category))]
    pub async fn start_session(&self, settings: QuizSettings) -> Result<QuizSession, ConfigError> {
        self.config
            .validate_settings(settings.num_questions, settings.seconds_per_question)?;

        let mut rng = ThreadRngSource;
        let session = build_session(settings, &mut rng);
        info!(
            target: "quiz",
            id = %session.id,
            questions = session.problems.len(),
            "Quiz session started"
        );
        let mut sessions = self.sessions.write().await;
        // single local user: finished quizzes are only kept around so the
        // results screen can be re-fetched, so evict them on restart
        sessions.retain(|_, s| !s.is_finished());
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    /// Read-only snapshot of a session by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_session(&self, id: &str) -> Option<QuizSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Run a mutation under the write lock; `None` for unknown ids.
    pub async fn update_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut QuizSession) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(id).map(f)
    }
}

/// Assemble a session from settings and a random source. Split out of
/// `AppState` so tests can script the draws.
pub fn build_session(settings: QuizSettings, rng: &mut dyn RandomSource) -> QuizSession {
    let problems: Vec<Problem> = (0..settings.num_questions)
        .map(|_| generator::generate(settings.difficulty, settings.category, rng))
        .collect();
    let choice_lists: Vec<Option<Vec<String>>> = problems
        .iter()
        .map(|p| {
            if settings.multiple_choice {
                Some(generator::choices(p, rng))
            } else {
                None
            }
        })
        .collect();
    QuizSession {
        id: Uuid::new_v4().to_string(),
        settings,
        problems,
        choice_lists,
        current: 0,
        correct: 0,
        question_start: Instant::now(),
        submitted: false,
        high_score_outcome: None,
    }
}
