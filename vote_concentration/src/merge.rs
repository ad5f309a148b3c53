use log::debug;

use std::collections::HashMap;

use crate::config::*;

/// The joined table, and the candidates that could not be joined.
#[derive(PartialEq, Debug, Clone)]
pub struct MergeOutcome {
    pub merged: Vec<MergedRecord>,
    /// Candidates with a dominance aggregate but no concentration record.
    pub unmatched_dominance: Vec<String>,
    /// Candidates with a concentration record but no dominance aggregate.
    pub unmatched_concentration: Vec<String>,
}

/// Inner join of the dominance aggregates and the concentration records on the candidate.
///
/// The merged rows follow the order of the aggregates.
pub fn merge_indices(
    aggregates: &[CandidateAggregate],
    concentration: &[ConcentrationRecord],
) -> MergeOutcome {
    let by_candidate: HashMap<&str, &ConcentrationRecord> = concentration
        .iter()
        .map(|c| (c.candidate.as_str(), c))
        .collect();

    let mut merged: Vec<MergedRecord> = Vec::new();
    let mut unmatched_dominance: Vec<String> = Vec::new();
    for agg in aggregates.iter() {
        match by_candidate.get(agg.candidate.as_str()) {
            Some(c) => merged.push(MergedRecord {
                candidate: agg.candidate.clone(),
                electoral_unit: c.electoral_unit.clone(),
                party: c.party.clone(),
                dominance_index: agg.dominance_index,
                g_index: c.g_index,
                nem: c.nem,
            }),
            None => unmatched_dominance.push(agg.candidate.clone()),
        }
    }

    let unmatched_concentration: Vec<String> = concentration
        .iter()
        .filter(|c| !aggregates.iter().any(|a| a.candidate == c.candidate))
        .map(|c| c.candidate.clone())
        .collect();

    debug!(
        "merge_indices: merged {} candidates, unmatched: {} dominance, {} concentration",
        merged.len(),
        unmatched_dominance.len(),
        unmatched_concentration.len()
    );
    MergeOutcome {
        merged,
        unmatched_dominance,
        unmatched_concentration,
    }
}
