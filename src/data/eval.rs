use crate::data::{Annotation, multi_hot};
use crate::error::DataError;

const BETA_SQUARED: f64 = 4.0;

/// F-beta score with beta = 2 for a pair of binary indicator vectors,
/// weighting recall four times as heavily as precision.
///
/// `score = 5 * TP / (5 * TP + 4 * FN + FP)`, defined as 0 when the
/// denominator vanishes.
pub fn fbeta2(predicted: &[u8], ground_truth: &[u8]) -> f64 {
    let mut hits = 0u64;
    let mut false_alarms = 0u64;
    let mut misses = 0u64;

    for (&p, &g) in predicted.iter().zip(ground_truth) {
        match (p != 0, g != 0) {
            (true, true) => hits += 1,
            (true, false) => false_alarms += 1,
            (false, true) => misses += 1,
            (false, false) => {}
        }
    }

    let numerator = (1.0 + BETA_SQUARED) * hits as f64;
    let denominator = numerator + BETA_SQUARED * misses as f64 + false_alarms as f64;
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Mean per-record F-beta (beta = 2) between predictions and ground truth.
///
/// Records are paired by position, so the two sequences must have equal
/// length. An empty pairing scores 0.
pub fn evaluate(
    predicted: &[Annotation],
    ground_truth: &[Annotation],
    label_space: usize,
) -> Result<f64, DataError> {
    if predicted.len() != ground_truth.len() {
        return Err(DataError::LengthMismatch {
            predicted: predicted.len(),
            ground_truth: ground_truth.len(),
        });
    }
    if predicted.is_empty() {
        return Ok(0.0);
    }

    let mut total = 0.0;
    for (p, g) in predicted.iter().zip(ground_truth) {
        let p_row = multi_hot::encode(&p.label_ids, label_space)?;
        let g_row = multi_hot::encode(&g.label_ids, label_space)?;
        total += fbeta2(&p_row, &g_row);
    }
    Ok(total / predicted.len() as f64)
}
