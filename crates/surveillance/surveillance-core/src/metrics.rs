//! In-sample fit metrics for trained category models

use surveillance_spi::TrainingDiagnostics;

/// Paired residuals `actual - predicted`
///
/// `None` when the slices differ in length or are empty.
fn residuals<'a>(
    actual: &'a [f64],
    predicted: &'a [f64],
) -> Option<impl Iterator<Item = f64> + 'a> {
    (actual.len() == predicted.len() && !actual.is_empty())
        .then(|| actual.iter().zip(predicted).map(|(a, p)| a - p))
}

/// Average weekly case-count miss; `NaN` for mismatched or empty inputs
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    residuals(actual, predicted).map_or(f64::NAN, |r| {
        r.map(f64::abs).sum::<f64>() / actual.len() as f64
    })
}

/// Coefficient of determination
///
/// 1.0 is a perfect fit, 0.0 matches predicting the mean. A constant
/// `actual` scores 1.0.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    let Some(residuals) = residuals(actual, predicted) else {
        return f64::NAN;
    };
    let ss_res: f64 = residuals.map(|r| r * r).sum();

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    if ss_tot < 1e-10 {
        return 1.0;
    }

    1.0 - ss_res / ss_tot
}

/// Diagnostics for a model scored on its own training rows
pub fn diagnostics(actual: &[f64], predicted: &[f64]) -> TrainingDiagnostics {
    TrainingDiagnostics {
        rows: actual.len(),
        mae: mae(actual, predicted),
        r_squared: r_squared(actual, predicted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mae() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        let predicted = [1.5, 2.0, 2.0, 4.5];
        assert!((mae(&actual, &predicted) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_mismatched_lengths_are_nan() {
        assert!(mae(&[1.0], &[]).is_nan());
        assert!(r_squared(&[], &[]).is_nan());
    }

    #[test]
    fn test_r_squared_perfect_and_mean() {
        let actual = [2.0, 4.0, 6.0];
        assert_eq!(r_squared(&actual, &actual), 1.0);
        assert!(r_squared(&actual, &[4.0, 4.0, 4.0]).abs() < 1e-12);
    }

    #[test]
    fn test_constant_actual_scores_one() {
        assert_eq!(r_squared(&[3.0, 3.0], &[2.0, 4.0]), 1.0);
        assert_eq!(mae(&[3.0, 3.0], &[2.0, 4.0]), 1.0);
    }

    #[test]
    fn test_diagnostics() {
        let d = diagnostics(&[1.0, 3.0], &[1.0, 3.0]);
        assert_eq!(d.rows, 2);
        assert_eq!(d.mae, 0.0);
        assert_eq!(d.r_squared, 1.0);
    }
}
