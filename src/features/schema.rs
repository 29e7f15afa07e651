//! The feature schema shared by the training and prediction builders.
//!
//! Both build paths construct [`FeatureVector`], so the field set and field
//! order the models see cannot drift between fitting and inference.

/// Column names, in the order `to_vec` emits them.
pub const FEATURE_COLUMNS: [&str; 8] = [
    "spread_line",
    "total_line",
    "home_pts_avg",
    "away_pts_avg",
    "home_def_avg",
    "away_def_avg",
    "week",
    "season",
];

/// Spread line used when the betting market has none
pub const DEFAULT_SPREAD: f32 = 0.0;
/// Total line used when the betting market has none
pub const DEFAULT_TOTAL: f32 = 45.0;

/// Rolling-average fallbacks for teams with no prior games in the season.
/// Known approximation: early-season rows get league-typical constants
/// instead of real form, which injects a small bias.
pub const FALLBACK_HOME_PTS: f32 = 24.0;
pub const FALLBACK_AWAY_PTS: f32 = 23.0;
pub const FALLBACK_HOME_DEF: f32 = 23.0;
pub const FALLBACK_AWAY_DEF: f32 = 24.0;

/// Label defaults for games without a final score
pub const DEFAULT_HOME_SCORE: f32 = 24.0;
pub const DEFAULT_AWAY_SCORE: f32 = 23.0;

/// One model-ready feature row
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub spread_line: f32,
    pub total_line: f32,
    /// Mean points scored by the home team, last <=5 same-season games
    pub home_pts_avg: f32,
    /// Mean points scored by the away team
    pub away_pts_avg: f32,
    /// Mean points allowed by the home team
    pub home_def_avg: f32,
    /// Mean points allowed by the away team
    pub away_def_avg: f32,
    pub week: f32,
    pub season: f32,
}

impl FeatureVector {
    /// Width of the feature row
    pub const DIM: usize = 8;

    /// Flatten in [`FEATURE_COLUMNS`] order.
    pub fn to_vec(&self) -> Vec<f32> {
        vec![
            self.spread_line,
            self.total_line,
            self.home_pts_avg,
            self.away_pts_avg,
            self.home_def_avg,
            self.away_def_avg,
            self.week,
            self.season,
        ]
    }
}
