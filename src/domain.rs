//! Domain models: difficulty tiers, problem categories, and the problem itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::algebra::Polynomial;

/// Magnitude tier for random operand draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  /// Inclusive upper bound for operand draws at this tier.
  pub fn operand_bound(self) -> i64 {
    match self {
      Difficulty::Easy => 10,
      Difficulty::Medium => 50,
      Difficulty::Hard => 100,
    }
  }
}

impl fmt::Display for Difficulty {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    };
    f.write_str(s)
  }
}

impl FromStr for Difficulty {
  type Err = ConfigError;

  // Unrecognized tiers are rejected outright instead of falling back to hard.
  fn from_str(s: &str) -> Result<Self, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
      "easy" => Ok(Difficulty::Easy),
      "medium" => Ok(Difficulty::Medium),
      "hard" => Ok(Difficulty::Hard),
      other => Err(ConfigError::UnknownDifficulty(other.to_string())),
    }
  }
}

/// Which problem family to draw from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Arithmetic,
  Calculus,
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Category::Arithmetic => "arithmetic",
      Category::Calculus => "calculus",
    };
    f.write_str(s)
  }
}

impl FromStr for Category {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
      "arithmetic" => Ok(Category::Arithmetic),
      "calculus" => Ok(Category::Calculus),
      other => Err(ConfigError::UnknownCategory(other.to_string())),
    }
  }
}

/// The single authoritative correct answer for a problem.
#[derive(Clone, Debug, PartialEq)]
pub enum Answer {
  Numeric(i64),
  Symbolic(Polynomial),
}

impl fmt::Display for Answer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Answer::Numeric(n) => write!(f, "{}", n),
      Answer::Symbolic(p) => write!(f, "{}", p),
    }
  }
}

/// One generated quiz problem. Immutable once generated; the session layer
/// owns it for the lifetime of one question.
#[derive(Clone, Debug)]
pub struct Problem {
  pub category: Category,
  pub difficulty: Difficulty,
  pub display_text: String,
  pub answer: Answer,
}

/// Invalid quiz configuration supplied by a client or a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("unknown difficulty '{0}' (expected easy, medium or hard)")]
  UnknownDifficulty(String),
  #[error("unknown category '{0}' (expected arithmetic or calculus)")]
  UnknownCategory(String),
  #[error("question count {0} out of range (1..={1})")]
  QuestionCountOutOfRange(usize, usize),
  #[error("seconds per question {0} out of range ({1}..={2})")]
  SecondsOutOfRange(u64, u64, u64),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn difficulty_bounds() {
    assert_eq!(Difficulty::Easy.operand_bound(), 10);
    assert_eq!(Difficulty::Medium.operand_bound(), 50);
    assert_eq!(Difficulty::Hard.operand_bound(), 100);
  }

  #[test]
  fn parses_known_tiers_and_rejects_others() {
    assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
    assert_eq!(" Medium ".parse::<Difficulty>().unwrap(), Difficulty::Medium);
    assert!(matches!(
      "brutal".parse::<Difficulty>(),
      Err(ConfigError::UnknownDifficulty(_))
    ));
  }

  #[test]
  fn parses_categories() {
    assert_eq!("calculus".parse::<Category>().unwrap(), Category::Calculus);
    assert!(matches!(
      "geometry".parse::<Category>(),
      Err(ConfigError::UnknownCategory(_))
    ));
  }
}
