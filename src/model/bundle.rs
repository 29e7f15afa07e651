//! The persisted model bundle: three gradient-boosted estimators.
//!
//! Home and away scores are squared-error regressions; the win estimator is
//! a binary log-likelihood classifier whose predictions are P(home wins).
//! All three share one artifact file, keyed "home", "away", "win".

use gbdt::config::Config as GbdtConfig;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::features::{FeatureVector, Labels};
use crate::{GridironError, Result, TrainingConfig};

/// Hyperparameters applied symmetrically to all three estimators
#[derive(Debug, Clone, Copy)]
pub struct BoostParams {
    pub rounds: usize,
    pub learning_rate: f32,
    pub max_depth: u32,
}

impl From<&TrainingConfig> for BoostParams {
    fn from(config: &TrainingConfig) -> Self {
        BoostParams {
            rounds: config.boosting_rounds,
            learning_rate: config.learning_rate,
            max_depth: config.max_depth,
        }
    }
}

fn boost_config(params: &BoostParams, loss: &str) -> GbdtConfig {
    let mut cfg = GbdtConfig::new();
    cfg.set_feature_size(FeatureVector::DIM);
    cfg.set_max_depth(params.max_depth);
    cfg.set_iterations(params.rounds);
    cfg.set_shrinkage(params.learning_rate);
    cfg.set_loss(loss);
    cfg.set_data_sample_ratio(1.0);
    cfg.set_feature_sample_ratio(1.0);
    cfg.set_debug(false);
    cfg
}

fn to_training_data(features: &[FeatureVector], targets: &[f32]) -> DataVec {
    features
        .iter()
        .zip(targets)
        .map(|(fv, &label)| Data::new_training_data(fv.to_vec(), 1.0, label, None))
        .collect()
}

fn to_test_data(features: &[FeatureVector]) -> DataVec {
    features
        .iter()
        .map(|fv| Data::new_test_data(fv.to_vec(), None))
        .collect()
}

/// Predictions for a batch of feature rows
#[derive(Debug, Clone)]
pub struct BundlePrediction {
    pub exp_home: Vec<f32>,
    pub exp_away: Vec<f32>,
    /// P(home wins), one per row
    pub p_home_win: Vec<f64>,
}

/// Three fitted estimators, created by training and loaded read-only
#[derive(Serialize, Deserialize)]
pub struct ModelBundle {
    home: GBDT,
    away: GBDT,
    win: GBDT,
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle").finish_non_exhaustive()
    }
}

impl ModelBundle {
    /// Artifact keys, in serialization order
    pub const ROLES: [&'static str; 3] = ["home", "away", "win"];

    /// Fit all three estimators on the same feature table.
    pub fn fit(features: &[FeatureVector], labels: &Labels, params: &BoostParams) -> Result<Self> {
        if features.is_empty() {
            return Err(GridironError::InsufficientData(
                "no feature rows to fit on".to_string(),
            ));
        }
        if features.len() != labels.len() {
            return Err(GridironError::Model(format!(
                "feature/label length mismatch: {} vs {}",
                features.len(),
                labels.len()
            )));
        }

        let mut home_model = GBDT::new(&boost_config(params, "SquaredError"));
        let mut home_data = to_training_data(features, &labels.home_score);
        home_model.fit(&mut home_data);

        let mut away_model = GBDT::new(&boost_config(params, "SquaredError"));
        let mut away_data = to_training_data(features, &labels.away_score);
        away_model.fit(&mut away_data);

        // Log-likelihood loss wants labels in {1, -1}
        let win_targets: Vec<f32> = labels
            .home_win
            .iter()
            .map(|&won| if won { 1.0 } else { -1.0 })
            .collect();
        let mut win_model = GBDT::new(&boost_config(params, "LogLikelyhood"));
        let mut win_data = to_training_data(features, &win_targets);
        win_model.fit(&mut win_data);

        Ok(ModelBundle {
            home: home_model,
            away: away_model,
            win: win_model,
        })
    }

    /// Run all three estimators over a feature table.
    pub fn predict(&self, features: &[FeatureVector]) -> BundlePrediction {
        if features.is_empty() {
            return BundlePrediction {
                exp_home: Vec::new(),
                exp_away: Vec::new(),
                p_home_win: Vec::new(),
            };
        }

        let data = to_test_data(features);
        let exp_home = self.home.predict(&data);
        let exp_away = self.away.predict(&data);
        let p_home_win = self
            .win
            .predict(&data)
            .into_iter()
            .map(|p| (p as f64).clamp(0.0, 1.0))
            .collect();

        BundlePrediction {
            exp_home,
            exp_away,
            p_home_win,
        }
    }

    /// Write the bundle as a single JSON artifact, replacing any previous one.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)
            .map_err(|e| GridironError::Model(format!("failed to serialize bundle: {}", e)))?;
        Ok(())
    }

    /// Load a previously trained bundle. Missing artifact is fatal.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GridironError::NoModel);
        }
        let file = std::fs::File::open(path)?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| GridironError::Model(format!("failed to read bundle: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small synthetic table where home form separates winners from losers
    fn synthetic_table(n: usize) -> (Vec<FeatureVector>, Labels) {
        let mut features = Vec::new();
        let mut labels = Labels::default();
        for i in 0..n {
            let strong_home = i % 2 == 0;
            let (home_pts, home_score) = if strong_home { (30.0, 31.0) } else { (17.0, 17.0) };
            features.push(FeatureVector {
                spread_line: if strong_home { -6.0 } else { 4.0 },
                total_line: 45.0,
                home_pts_avg: home_pts,
                away_pts_avg: 23.0,
                home_def_avg: 20.0,
                away_def_avg: 24.0,
                week: (i % 18 + 1) as f32,
                season: 2022.0,
            });
            labels.home_score.push(home_score);
            labels.away_score.push(21.0);
            labels.home_win.push(strong_home);
        }
        (features, labels)
    }

    fn params() -> BoostParams {
        // Few rounds keep the test quick; behavior is the same
        BoostParams {
            rounds: 20,
            learning_rate: 0.1,
            max_depth: 3,
        }
    }

    #[test]
    fn test_missing_artifact_is_fatal() {
        let err = ModelBundle::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, GridironError::NoModel));
    }

    #[test]
    fn test_fit_empty_is_insufficient_data() {
        let err = ModelBundle::fit(&[], &Labels::default(), &params()).unwrap_err();
        assert!(matches!(err, GridironError::InsufficientData(_)));
    }

    #[test]
    fn test_fit_and_predict_shapes() {
        let (features, labels) = synthetic_table(40);
        let bundle = ModelBundle::fit(&features, &labels, &params()).unwrap();

        let preds = bundle.predict(&features[..6]);
        assert_eq!(preds.exp_home.len(), 6);
        assert_eq!(preds.exp_away.len(), 6);
        assert_eq!(preds.p_home_win.len(), 6);
        for p in &preds.p_home_win {
            assert!((0.0..=1.0).contains(p));
        }
    }

    #[test]
    fn test_predict_empty_table() {
        let (features, labels) = synthetic_table(40);
        let bundle = ModelBundle::fit(&features, &labels, &params()).unwrap();
        let preds = bundle.predict(&[]);
        assert!(preds.p_home_win.is_empty());
    }

    #[test]
    fn test_artifact_has_three_roles() {
        let (features, labels) = synthetic_table(40);
        let bundle = ModelBundle::fit(&features, &labels, &params()).unwrap();

        let value = serde_json::to_value(&bundle).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);
        for role in ModelBundle::ROLES {
            assert!(object.contains_key(role), "missing role {}", role);
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let (features, labels) = synthetic_table(40);
        let bundle = ModelBundle::fit(&features, &labels, &params()).unwrap();

        let path = std::env::temp_dir().join("gridiron_bundle_test.json");
        bundle.save(&path).unwrap();
        let reloaded = ModelBundle::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let before = bundle.predict(&features[..4]);
        let after = reloaded.predict(&features[..4]);
        assert_eq!(before.exp_home, after.exp_home);
        assert_eq!(before.p_home_win, after.p_home_win);
    }
}
