//! Training pipeline: historical games to persisted model bundle

use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::Database;
use crate::features::{build_training, FeatureVector, Labels};
use crate::model::{BoostParams, ModelBundle};
use crate::training::metrics::EvalMetrics;
use crate::{last_completed_season, Config, GridironError, Result};

/// Summary of a completed training run
#[derive(Debug)]
pub struct TrainOutcome {
    pub total_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub holdout: EvalMetrics,
    pub model_path: String,
}

/// Seeded shuffle split into (train, test) index sets.
pub fn split_indices(n: usize, test_fraction: f32, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = (n as f32 * test_fraction) as usize;
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    (train, test)
}

fn subset(features: &[FeatureVector], labels: &Labels, indices: &[usize]) -> (Vec<FeatureVector>, Labels) {
    let mut sub_features = Vec::with_capacity(indices.len());
    let mut sub_labels = Labels::default();
    for &i in indices {
        sub_features.push(features[i].clone());
        sub_labels.home_score.push(labels.home_score[i]);
        sub_labels.away_score.push(labels.away_score[i]);
        sub_labels.home_win.push(labels.home_win[i]);
    }
    (sub_features, sub_labels)
}

/// Train the three estimators and write the bundle artifact.
///
/// The holdout partition is scored for the summary line only; the persisted
/// models are fit on the training partition.
pub fn train_and_save(config: &Config, db: &Database) -> Result<TrainOutcome> {
    let start = config.training.start_year;
    let end = last_completed_season();

    let games = db.get_regular_season_games(start, end)?;
    if games.is_empty() {
        return Err(GridironError::InsufficientData(format!(
            "no historical games for {}-{} - run `gridiron data sync` first",
            start, end
        )));
    }
    log::info!("Loaded {} historical games ({}-{})", games.len(), start, end);

    // Descriptive team rows ride along in the store but feed nothing yet
    let profiles = db.team_profile_count()?;
    log::info!("{} team profiles available (unused by the feature schema)", profiles);

    let (features, labels) = build_training(&games);

    let (train_idx, test_idx) = split_indices(
        features.len(),
        config.training.test_fraction,
        config.training.seed,
    );
    log::info!(
        "Split {} rows: train={}, test={}",
        features.len(),
        train_idx.len(),
        test_idx.len()
    );

    let (train_features, train_labels) = subset(&features, &labels, &train_idx);
    let (test_features, test_labels) = subset(&features, &labels, &test_idx);

    let params = BoostParams::from(&config.training);
    let bundle = ModelBundle::fit(&train_features, &train_labels, &params)?;

    let holdout = EvalMetrics::from_predictions(&bundle.predict(&test_features), &test_labels);
    log::info!("Holdout: {}", holdout);

    bundle.save(&config.data.model_path)?;
    log::info!("Saved model bundle to {}", config.data.model_path);

    Ok(TrainOutcome {
        total_rows: features.len(),
        train_rows: train_features.len(),
        test_rows: test_features.len(),
        holdout,
        model_path: config.data.model_path.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameRecord, GameType};

    fn seeded_games() -> Vec<GameRecord> {
        // Two-team round robin over the 2020 season; KC trends high scoring
        let teams = ["KC", "BUF", "LV", "DEN"];
        let mut games = Vec::new();
        for week in 1..=12u8 {
            for pair in teams.chunks(2) {
                let (home, away) = if week % 2 == 0 {
                    (pair[0], pair[1])
                } else {
                    (pair[1], pair[0])
                };
                let home_score = if home == "KC" || home == "BUF" { 28.0 } else { 17.0 };
                games.push(GameRecord {
                    game_id: format!("2020_{:02}_{}_{}", week, away, home),
                    season: 2020,
                    week,
                    game_type: GameType::Regular,
                    home_team: home.to_string(),
                    away_team: away.to_string(),
                    home_score: Some(home_score + (week % 3) as f32),
                    away_score: Some(20.0),
                    spread_line: Some(if home == "KC" { -5.5 } else { 2.5 }),
                    total_line: Some(48.0),
                });
            }
        }
        games
    }

    fn test_config(model_path: &str) -> Config {
        let mut config = Config::default();
        config.training.start_year = 2020;
        config.training.boosting_rounds = 20;
        config.data.model_path = model_path.to_string();
        config
    }

    #[test]
    fn test_split_is_deterministic() {
        let (train_a, test_a) = split_indices(100, 0.2, 42);
        let (train_b, test_b) = split_indices(100, 0.2, 42);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
        assert_eq!(test_a.len(), 20);
        assert_eq!(train_a.len(), 80);

        let (train_c, _) = split_indices(100, 0.2, 7);
        assert_ne!(train_a, train_c);
    }

    #[test]
    fn test_empty_store_is_insufficient_data() {
        let db = Database::in_memory().unwrap();
        let config = test_config("model/never_written.json");
        let err = train_and_save(&config, &db).unwrap_err();
        assert!(matches!(err, GridironError::InsufficientData(_)));
    }

    #[test]
    fn test_train_produces_working_bundle() {
        let db = Database::in_memory().unwrap();
        db.upsert_games(&seeded_games()).unwrap();

        let path = std::env::temp_dir().join("gridiron_trainer_test.json");
        let config = test_config(path.to_str().unwrap());

        let outcome = train_and_save(&config, &db).unwrap();
        assert_eq!(outcome.total_rows, 24);
        assert_eq!(outcome.train_rows + outcome.test_rows, 24);

        // The artifact is loadable and predicts a well-formed week cleanly
        let bundle = ModelBundle::load(&path).unwrap();
        let week_games = db.get_week_games(2020, 3).unwrap();
        let features = crate::features::build_upcoming(&week_games);
        let preds = bundle.predict(&features);
        assert_eq!(preds.p_home_win.len(), week_games.len());
        std::fs::remove_file(&path).ok();
    }
}
