//! Feature construction for training and prediction.
//!
//! Training rows look back at recent same-season form; prediction rows use
//! placeholder averages. Prediction-time features are therefore
//! systematically less informed than training-time features. That asymmetry
//! is inherited behavior, kept on purpose; do not add lookback here without
//! retraining against the same inputs.

use crate::features::schema::{
    FeatureVector, DEFAULT_AWAY_SCORE, DEFAULT_HOME_SCORE, DEFAULT_SPREAD, DEFAULT_TOTAL,
    FALLBACK_AWAY_DEF, FALLBACK_AWAY_PTS, FALLBACK_HOME_DEF, FALLBACK_HOME_PTS,
};
use crate::GameRecord;

/// How many prior games feed a rolling average
pub const LOOKBACK_WINDOW: usize = 5;

/// Regression and classification targets, one entry per feature row
#[derive(Debug, Clone, Default)]
pub struct Labels {
    pub home_score: Vec<f32>,
    pub away_score: Vec<f32>,
    pub home_win: Vec<bool>,
}

impl Labels {
    pub fn len(&self) -> usize {
        self.home_win.len()
    }

    pub fn is_empty(&self) -> bool {
        self.home_win.is_empty()
    }
}

/// Mean points for/against over a team's most recent completed games in the
/// same season, prior to the given week. None if the team has none.
fn rolling_form(games: &[GameRecord], team: &str, season: u16, week: u8) -> Option<(f32, f32)> {
    let mut prior: Vec<&GameRecord> = games
        .iter()
        .filter(|g| g.season == season && g.week < week && g.involves(team) && g.is_played())
        .collect();
    // "Most recent" is by week number within the season
    prior.sort_by_key(|g| g.week);

    let start = prior.len().saturating_sub(LOOKBACK_WINDOW);
    let recent = &prior[start..];
    if recent.is_empty() {
        return None;
    }

    let n = recent.len() as f32;
    let pts: f32 = recent.iter().filter_map(|g| g.points_for(team)).sum();
    let allowed: f32 = recent.iter().filter_map(|g| g.points_against(team)).sum();
    Some((pts / n, allowed / n))
}

/// Build one feature row and one label triple per historical game.
///
/// The lookback scans the same `games` slice the rows are built from, so a
/// game's features only ever see weeks strictly before it.
pub fn build_training(games: &[GameRecord]) -> (Vec<FeatureVector>, Labels) {
    let mut features = Vec::with_capacity(games.len());
    let mut labels = Labels::default();

    for game in games {
        let home_form = rolling_form(games, &game.home_team, game.season, game.week);
        let away_form = rolling_form(games, &game.away_team, game.season, game.week);

        let (home_pts_avg, home_def_avg) =
            home_form.unwrap_or((FALLBACK_HOME_PTS, FALLBACK_HOME_DEF));
        let (away_pts_avg, away_def_avg) =
            away_form.unwrap_or((FALLBACK_AWAY_PTS, FALLBACK_AWAY_DEF));

        features.push(FeatureVector {
            spread_line: game.spread_line.unwrap_or(DEFAULT_SPREAD),
            total_line: game.total_line.unwrap_or(DEFAULT_TOTAL),
            home_pts_avg,
            away_pts_avg,
            home_def_avg,
            away_def_avg,
            week: game.week as f32,
            season: game.season as f32,
        });

        let home_score = game.home_score.unwrap_or(DEFAULT_HOME_SCORE);
        let away_score = game.away_score.unwrap_or(DEFAULT_AWAY_SCORE);
        labels.home_score.push(home_score);
        labels.away_score.push(away_score);
        labels.home_win.push(home_score > away_score);
    }

    (features, labels)
}

/// Build one feature row per upcoming game, placeholder form values.
pub fn build_upcoming(games: &[GameRecord]) -> Vec<FeatureVector> {
    games
        .iter()
        .map(|game| FeatureVector {
            spread_line: game.spread_line.unwrap_or(DEFAULT_SPREAD),
            total_line: game.total_line.unwrap_or(DEFAULT_TOTAL),
            home_pts_avg: FALLBACK_HOME_PTS,
            away_pts_avg: FALLBACK_AWAY_PTS,
            home_def_avg: FALLBACK_HOME_DEF,
            away_def_avg: FALLBACK_AWAY_DEF,
            week: game.week as f32,
            season: game.season as f32,
        })
        .collect()
}
