//! Assignment of the candidates to the quadrants of the dominance /
//! fragmentation plane.
//!
//! The fragmentation axis is the natural logarithm of the NEM, which is
//! heavily skewed on real data. Both axes are cut around their mean, at a
//! distance of `k` standard deviations. With the default `k` of `5e-7` the
//! cut is almost exactly at the mean. Comparisons are strict: a candidate
//! on a threshold, or between the low and high thresholds, stays
//! unclassified.

use log::{debug, info};

use crate::config::*;

/// Mean and sample standard deviation (n - 1 denominator).
///
/// The standard deviation is NaN with fewer than two values, and both are
/// NaN for an empty input.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    let std = if values.len() < 2 {
        f64::NAN
    } else {
        (sq / (n - 1.0)).sqrt()
    };
    (mean, std)
}

pub fn compute_thresholds(merged: &[MergedRecord], multiplier: f64) -> Thresholds {
    let dominance: Vec<f64> = merged.iter().map(|m| m.dominance_index).collect();
    let nem_log: Vec<f64> = merged.iter().map(|m| m.nem.ln()).collect();
    let (dominance_mean, dominance_std) = mean_std(&dominance);
    let (nem_log_mean, nem_log_std) = mean_std(&nem_log);
    Thresholds {
        dominance_mean,
        dominance_std,
        nem_log_mean,
        nem_log_std,
        high_dominance: dominance_mean + (multiplier * dominance_std),
        low_dominance: dominance_mean - (multiplier * dominance_std),
        high_fragmentation: nem_log_mean + (multiplier * nem_log_std),
        low_fragmentation: nem_log_mean - (multiplier * nem_log_std),
    }
}

pub fn voting_type(dominance_index: f64, nem: f64, t: &Thresholds) -> VotingType {
    let fragmentation = nem.ln();
    let high_dom = dominance_index > t.high_dominance;
    let low_dom = dominance_index < t.low_dominance;
    let high_frag = fragmentation > t.high_fragmentation;
    let low_frag = fragmentation < t.low_fragmentation;
    match (high_dom, low_dom, high_frag, low_frag) {
        (true, _, true, _) => VotingType::DispersaDominante,
        (true, _, _, true) => VotingType::ConcentradaDominante,
        (_, true, true, _) => VotingType::DispersaCompartilhada,
        (_, true, _, true) => VotingType::ConcentradaCompartilhada,
        _ => VotingType::Unclassified,
    }
}

/// Classifies every merged record. The input is left untouched.
pub fn classify(merged: &[MergedRecord], multiplier: f64) -> (Vec<ClassifiedRecord>, Thresholds) {
    let thresholds = compute_thresholds(merged, multiplier);
    info!("classify: {} candidates, thresholds: {:?}", merged.len(), thresholds);

    let classified: Vec<ClassifiedRecord> = merged
        .iter()
        .map(|m| {
            let vt = voting_type(m.dominance_index, m.nem, &thresholds);
            debug!("classify: {}: {}", m.candidate, vt);
            ClassifiedRecord {
                candidate: m.candidate.clone(),
                electoral_unit: m.electoral_unit.clone(),
                party: m.party.clone(),
                dominance_index: m.dominance_index,
                g_index: m.g_index,
                nem: m.nem,
                voting_type: vt,
            }
        })
        .collect();
    (classified, thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged(candidate: &str, dominance_index: f64, nem: f64) -> MergedRecord {
        MergedRecord {
            candidate: candidate.to_string(),
            electoral_unit: "SP".to_string(),
            party: "P1".to_string(),
            dominance_index,
            g_index: 0.0,
            nem,
        }
    }

    fn sample() -> Vec<MergedRecord> {
        vec![
            merged("A", 0.30, 40.0),
            merged("B", 0.30, 1.5),
            merged("C", 0.01, 40.0),
            merged("D", 0.01, 1.5),
        ]
    }

    #[test]
    fn four_quadrants() {
        let (classified, _) = classify(&sample(), AnalysisRules::DEFAULT_CLASSIFIER_MULTIPLIER);
        let types: Vec<VotingType> = classified.iter().map(|c| c.voting_type).collect();
        assert_eq!(
            types,
            vec![
                VotingType::DispersaDominante,
                VotingType::ConcentradaDominante,
                VotingType::DispersaCompartilhada,
                VotingType::ConcentradaCompartilhada,
            ]
        );
    }

    #[test]
    fn mean_value_is_unclassified() {
        let mut records = sample();
        // Exactly at the mean of both axes: 0.155 and ln(nem) mean.
        let nem_log_mean = (40.0_f64.ln() + 1.5_f64.ln()) / 2.0;
        records.push(merged("E", 0.155, nem_log_mean.exp()));
        records.push(merged("F", 0.155, nem_log_mean.exp()));
        let (classified, t) = classify(&records, AnalysisRules::DEFAULT_CLASSIFIER_MULTIPLIER);
        assert!(t.high_dominance > t.low_dominance);
        assert_eq!(classified[4].voting_type, VotingType::Unclassified);
        assert_eq!(classified[5].voting_type, VotingType::Unclassified);
    }

    #[test]
    fn single_candidate_is_unclassified() {
        let (classified, t) = classify(
            &[merged("A", 0.3, 2.0)],
            AnalysisRules::DEFAULT_CLASSIFIER_MULTIPLIER,
        );
        assert!(t.dominance_std.is_nan());
        assert_eq!(classified[0].voting_type, VotingType::Unclassified);
    }

    #[test]
    fn empty_table() {
        let (classified, t) = classify(&[], AnalysisRules::DEFAULT_CLASSIFIER_MULTIPLIER);
        assert!(classified.is_empty());
        assert!(t.dominance_mean.is_nan());
    }

    #[test]
    fn classification_is_idempotent() {
        let records = sample();
        let (first, _) = classify(&records, AnalysisRules::DEFAULT_CLASSIFIER_MULTIPLIER);
        let (second, _) = classify(&records, AnalysisRules::DEFAULT_CLASSIFIER_MULTIPLIER);
        assert_eq!(first, second);
    }

    #[test]
    fn sample_standard_deviation() {
        let (mean, std) = mean_std(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(mean, 2.5);
        assert!((std - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    }
}
