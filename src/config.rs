//! Quiz configuration loaded from TOML.
//!
//! `QUIZ_CONFIG_PATH` points at an optional TOML file overriding the
//! defaults below. A missing or unparsable file is logged and ignored;
//! the server always starts.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Category, ConfigError, Difficulty};

pub const MAX_QUESTIONS: usize = 20;
pub const MIN_SECONDS_PER_QUESTION: u64 = 5;
pub const MAX_SECONDS_PER_QUESTION: u64 = 60;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
  pub default_difficulty: Difficulty,
  pub default_category: Category,
  pub default_questions: usize,
  pub default_seconds_per_question: u64,
  pub default_multiple_choice: bool,
  pub high_score_path: String,
}

impl Default for QuizConfig {
  fn default() -> Self {
    Self {
      default_difficulty: Difficulty::Easy,
      default_category: Category::Arithmetic,
      default_questions: 5,
      default_seconds_per_question: 20,
      default_multiple_choice: true,
      high_score_path: "highscore.txt".into(),
    }
  }
}

impl QuizConfig {
  /// Validate client-supplied quiz settings against the fixed limits.
  pub fn validate_settings(
    &self,
    num_questions: usize,
    seconds_per_question: u64,
  ) -> Result<(), ConfigError> {
    if num_questions == 0 || num_questions > MAX_QUESTIONS {
      return Err(ConfigError::QuestionCountOutOfRange(num_questions, MAX_QUESTIONS));
    }
    if !(MIN_SECONDS_PER_QUESTION..=MAX_SECONDS_PER_QUESTION).contains(&seconds_per_question) {
      return Err(ConfigError::SecondsOutOfRange(
        seconds_per_question,
        MIN_SECONDS_PER_QUESTION,
        MAX_SECONDS_PER_QUESTION,
      ));
    }
    Ok(())
  }
}

/// Attempt to load `QuizConfig` from QUIZ_CONFIG_PATH. On any parsing/IO
/// error, returns None and the caller falls back to defaults.
pub fn load_config_from_env() -> Option<QuizConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<QuizConfig>(&s) {
      Ok(cfg) => {
        info!(target: "mathquiz_backend", %path, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "mathquiz_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "mathquiz_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_partial_toml_over_defaults() {
    let cfg: QuizConfig = toml::from_str(
      r#"
        default_difficulty = "hard"
        default_questions = 10
        high_score_path = "/tmp/hs.txt"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.default_difficulty, Difficulty::Hard);
    assert_eq!(cfg.default_questions, 10);
    assert_eq!(cfg.high_score_path, "/tmp/hs.txt");
    // untouched fields keep their defaults
    assert_eq!(cfg.default_seconds_per_question, 20);
    assert!(cfg.default_multiple_choice);
  }

  #[test]
  fn rejects_out_of_range_settings() {
    let cfg = QuizConfig::default();
    assert!(cfg.validate_settings(5, 20).is_ok());
    assert!(cfg.validate_settings(0, 20).is_err());
    assert!(cfg.validate_settings(21, 20).is_err());
    assert!(cfg.validate_settings(5, 4).is_err());
    assert!(cfg.validate_settings(5, 61).is_err());
  }
}
