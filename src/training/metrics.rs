//! Holdout evaluation metrics

use crate::features::Labels;
use crate::model::BundlePrediction;
use std::fmt;

/// Metrics over a held-out partition
#[derive(Debug, Clone, Default)]
pub struct EvalMetrics {
    /// Sum of absolute home score errors
    home_abs_err_sum: f64,
    /// Sum of absolute away score errors
    away_abs_err_sum: f64,
    /// Correct win-side calls
    correct_wins: usize,
    /// Rows evaluated
    pub rows: usize,
}

impl EvalMetrics {
    /// Score a batch of predictions against its labels.
    pub fn from_predictions(preds: &BundlePrediction, labels: &Labels) -> Self {
        let mut metrics = EvalMetrics::default();

        for i in 0..preds.p_home_win.len().min(labels.len()) {
            metrics.home_abs_err_sum +=
                (preds.exp_home[i] as f64 - labels.home_score[i] as f64).abs();
            metrics.away_abs_err_sum +=
                (preds.exp_away[i] as f64 - labels.away_score[i] as f64).abs();
            if (preds.p_home_win[i] >= 0.5) == labels.home_win[i] {
                metrics.correct_wins += 1;
            }
            metrics.rows += 1;
        }

        metrics
    }

    pub fn home_score_mae(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.home_abs_err_sum / self.rows as f64
        }
    }

    pub fn away_score_mae(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.away_abs_err_sum / self.rows as f64
        }
    }

    /// Win-side prediction accuracy
    pub fn accuracy(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.correct_wins as f64 / self.rows as f64
        }
    }
}

impl fmt::Display for EvalMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Acc: {:.1}% | Home MAE: {:.2} | Away MAE: {:.2} ({} rows)",
            self.accuracy() * 100.0,
            self.home_score_mae(),
            self.away_score_mae(),
            self.rows
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_arithmetic() {
        let preds = BundlePrediction {
            exp_home: vec![24.0, 20.0],
            exp_away: vec![20.0, 27.0],
            p_home_win: vec![0.7, 0.3],
        };
        let labels = Labels {
            home_score: vec![27.0, 21.0],
            away_score: vec![20.0, 24.0],
            home_win: vec![true, true],
        };

        let metrics = EvalMetrics::from_predictions(&preds, &labels);
        assert_eq!(metrics.rows, 2);
        assert_eq!(metrics.home_score_mae(), 2.0);
        assert_eq!(metrics.away_score_mae(), 1.5);
        // First call right, second wrong
        assert_eq!(metrics.accuracy(), 0.5);
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = EvalMetrics::default();
        assert_eq!(metrics.accuracy(), 0.0);
        assert_eq!(metrics.home_score_mae(), 0.0);
    }
}
