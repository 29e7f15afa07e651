//! Week and matchup prediction from a loaded bundle

use crate::data::ScheduleSource;
use crate::features::build_upcoming;
use crate::model::ModelBundle;
use crate::{is_valid_team, Confidence, Config, GameType, PredictionRow, Result};

/// Serves predictions for scheduled games
pub struct Predictor<'a> {
    bundle: ModelBundle,
    source: &'a dyn ScheduleSource,
}

impl<'a> std::fmt::Debug for Predictor<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("bundle", &self.bundle)
            .finish_non_exhaustive()
    }
}

impl<'a> Predictor<'a> {
    pub fn new(bundle: ModelBundle, source: &'a dyn ScheduleSource) -> Self {
        Predictor { bundle, source }
    }

    /// Load the persisted bundle; fails with the missing-artifact error
    /// before any schedule is fetched.
    pub fn load(config: &Config, source: &'a dyn ScheduleSource) -> Result<Self> {
        let bundle = ModelBundle::load(&config.data.model_path)?;
        Ok(Predictor { bundle, source })
    }

    /// Predict every regular-season game of a week. A week with no
    /// scheduled games yields an empty table, not an error.
    pub fn predict_week(&self, season: u16, week: u8) -> Result<Vec<PredictionRow>> {
        let games: Vec<_> = self
            .source
            .fetch_week(season, week)?
            .into_iter()
            .filter(|g| g.game_type == GameType::Regular)
            .collect();

        if games.is_empty() {
            return Ok(Vec::new());
        }

        let features = build_upcoming(&games);
        let preds = self.bundle.predict(&features);

        let rows = games
            .iter()
            .enumerate()
            .map(|(i, game)| {
                let p_home_win = preds.p_home_win[i];
                PredictionRow {
                    game_id: game.game_id.clone(),
                    home_team: game.home_team.clone(),
                    away_team: game.away_team.clone(),
                    exp_home_pts: preds.exp_home[i].round() as i32,
                    exp_away_pts: preds.exp_away[i].round() as i32,
                    p_home_win,
                    confidence: Confidence::from_probability(p_home_win),
                    synthetic: false,
                }
            })
            .collect();

        Ok(rows)
    }

    /// Predict a single matchup out of the week's table.
    ///
    /// Always answers: an unmatched pair comes back as a default-filled row
    /// marked synthetic rather than an error.
    pub fn predict_matchup(
        &self,
        home: &str,
        away: &str,
        season: u16,
        week: u8,
    ) -> Result<PredictionRow> {
        for code in [home, away] {
            if !is_valid_team(code) {
                log::warn!("\"{}\" is not a known team code", code);
            }
        }

        let rows = self.predict_week(season, week)?;
        if let Some(row) = rows
            .into_iter()
            .find(|r| r.home_team == home && r.away_team == away)
        {
            return Ok(row);
        }

        log::warn!(
            "No {} vs {} scheduled in {} week {}; returning synthetic default row",
            home,
            away,
            season,
            week
        );
        Ok(PredictionRow::synthetic(home, away))
    }
}

/// Format a week of predictions as an aligned table
pub fn format_week_table(rows: &[PredictionRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<12} {:>5} {:>5} {:>6} {:>6} {:>8} {:>6}\n",
        "Game", "Home", "Away", "H Pts", "A Pts", "P(Home)", "Conf"
    ));
    out.push_str(&format!("{}\n", "-".repeat(54)));
    for row in rows {
        out.push_str(&format!(
            "{:<12} {:>5} {:>5} {:>6} {:>6} {:>7.1}% {:>6}\n",
            row.game_id,
            row.home_team,
            row.away_team,
            row.exp_home_pts,
            row.exp_away_pts,
            row.p_home_win * 100.0,
            row.confidence
        ));
    }
    out
}

/// Format a single matchup prediction for display
pub fn format_matchup(row: &PredictionRow) -> String {
    let winner = row.predicted_winner();
    let win_prob = if row.p_home_win >= 0.5 {
        row.p_home_win
    } else {
        1.0 - row.p_home_win
    };
    let note = if row.synthetic {
        "\n│  Note: no scheduled matchup found, default row"
    } else {
        ""
    };

    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {} vs {}
├─────────────────────────────────────────────────┤
│  Win probability:  {} {:.1}%
│  Predicted score:  {} {} - {} {}
│  Confidence:       {}{}
└─────────────────────────────────────────────────┘
"#,
        row.home_team,
        row.away_team,
        winner,
        win_prob * 100.0,
        row.home_team,
        row.exp_home_pts,
        row.away_team,
        row.exp_away_pts,
        row.confidence,
        note
    )
}
