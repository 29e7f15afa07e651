//! NFL game outcome prediction using gradient boosted trees.
//!
//! Builds a fixed-schema feature table from historical schedules and trains
//! three estimators: home score, away score, and home win probability.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;
pub mod training;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The 32 NFL team abbreviations.
pub const TEAM_CODES: [&str; 32] = [
    "ARI", "ATL", "BAL", "BUF", "CAR", "CHI", "CIN", "CLE", "DAL", "DEN", "DET", "GB", "HOU",
    "IND", "JAX", "KC", "LAC", "LAR", "LV", "MIA", "MIN", "NE", "NO", "NYG", "NYJ", "PHI", "PIT",
    "SEA", "SF", "TB", "TEN", "WAS",
];

/// Check whether a code is one of the 32 known team abbreviations.
pub fn is_valid_team(code: &str) -> bool {
    TEAM_CODES.contains(&code)
}

/// Phase of the season a game belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameType {
    Preseason,
    Regular,
    Postseason,
}

impl GameType {
    pub fn code(&self) -> &'static str {
        match self {
            GameType::Preseason => "PRE",
            GameType::Regular => "REG",
            GameType::Postseason => "POST",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "PRE" => Some(GameType::Preseason),
            "REG" => Some(GameType::Regular),
            "POST" => Some(GameType::Postseason),
            _ => None,
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single scheduled or completed game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: String,
    pub season: u16,
    pub week: u8,
    pub game_type: GameType,
    pub home_team: String,
    pub away_team: String,
    /// None until the game has been played
    pub home_score: Option<f32>,
    pub away_score: Option<f32>,
    /// Betting line: points the home side is favored by
    pub spread_line: Option<f32>,
    /// Betting line: expected combined points
    pub total_line: Option<f32>,
}

impl GameRecord {
    /// Whether a final score is available
    pub fn is_played(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }

    /// Whether the given team played in this game, either role
    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    /// Points scored by the given team, if it played and the game is final
    pub fn points_for(&self, team: &str) -> Option<f32> {
        if self.home_team == team {
            self.home_score
        } else if self.away_team == team {
            self.away_score
        } else {
            None
        }
    }

    /// Points conceded by the given team, if it played and the game is final
    pub fn points_against(&self, team: &str) -> Option<f32> {
        if self.home_team == team {
            self.away_score
        } else if self.away_team == team {
            self.home_score
        } else {
            None
        }
    }

    /// True if the home side won, None before the game is played
    pub fn home_win(&self) -> Option<bool> {
        match (self.home_score, self.away_score) {
            (Some(h), Some(a)) => Some(h > a),
            _ => None,
        }
    }
}

/// Coarse bucketing of win-probability distance from a coin flip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Med,
    Low,
}

impl Confidence {
    /// Pure function of the home win probability.
    ///
    /// Evaluated in f64 so boundary inputs resolve the same way the source
    /// system resolved them (|0.2 - 0.5| compares greater than 0.3).
    pub fn from_probability(p_home_win: f64) -> Self {
        let distance = (p_home_win - 0.5).abs();
        if distance > 0.3 {
            Confidence::High
        } else if distance > 0.1 {
            Confidence::Med
        } else {
            Confidence::Low
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "High"),
            Confidence::Med => write!(f, "Med"),
            Confidence::Low => write!(f, "Low"),
        }
    }
}

/// One row of prediction output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRow {
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub exp_home_pts: i32,
    pub exp_away_pts: i32,
    pub p_home_win: f64,
    pub confidence: Confidence,
    /// Set when no scheduled matchup was found and the row is default-filled
    pub synthetic: bool,
}

impl PredictionRow {
    /// Default-filled row for a matchup with no scheduled game.
    pub fn synthetic(home_team: &str, away_team: &str) -> Self {
        PredictionRow {
            game_id: "N/A".to_string(),
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            exp_home_pts: 24,
            exp_away_pts: 23,
            p_home_win: 0.5,
            confidence: Confidence::Low,
            synthetic: true,
        }
    }

    /// The side favored to win
    pub fn predicted_winner(&self) -> &str {
        if self.p_home_win >= 0.5 {
            &self.home_team
        } else {
            &self.away_team
        }
    }
}

/// Most recent season with a complete set of results.
pub fn last_completed_season() -> u16 {
    use chrono::Datelike;
    (chrono::Utc::now().year() - 1) as u16
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum GridironError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schedule provider error: {0}")]
    Provider(String),

    #[error("No trained model found - run `gridiron train` first")]
    NoModel,

    #[error("Insufficient training data: {0}")]
    InsufficientData(String),

    #[error("Unknown team code: {0}")]
    UnknownTeam(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Model error: {0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, GridironError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    pub training: TrainingConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub scoreboard_url: String,
    pub teams_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// First season included in the historical range
    pub start_year: u16,
    pub boosting_rounds: usize,
    pub learning_rate: f32,
    pub max_depth: u32,
    /// Fraction of rows held out of the fit
    pub test_fraction: f32,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
    pub model_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: ProviderConfig {
                scoreboard_url:
                    "https://site.api.espn.com/apis/site/v2/sports/football/nfl/scoreboard"
                        .to_string(),
                teams_url: "https://site.api.espn.com/apis/site/v2/sports/football/nfl/teams"
                    .to_string(),
                timeout_secs: 30,
                max_retries: 3,
            },
            training: TrainingConfig {
                start_year: 2010,
                boosting_rounds: 200,
                learning_rate: 0.05,
                max_depth: 4,
                test_fraction: 0.2,
                seed: 42,
            },
            data: DataConfig {
                database_path: "data/gridiron.db".to_string(),
                model_path: "model/score_model.json".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GridironError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| GridironError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| GridironError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
