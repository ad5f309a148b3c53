use log::debug;

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::calculator::round6;
use crate::config::*;

/// The dominance rows of a table and the distinct locations it covers.
#[derive(PartialEq, Debug, Clone)]
pub struct DominanceTable {
    pub rows: Vec<DominanceRecord>,
    /// Distinct locations, in order of first appearance.
    pub locations: Vec<String>,
}

/// Computes the dominance index of every row.
///
/// The dominance index of a candidate in a location is the percentage of the
/// location obtained by the candidate, weighted by the fraction of the
/// candidate total that comes from this location. A location or a candidate
/// without any count gives a share of zero.
pub fn compute_dominance(rows: &[VoteRecord]) -> DominanceTable {
    let mut location_totals: HashMap<&str, u64> = HashMap::new();
    let mut candidate_totals: HashMap<&str, u64> = HashMap::new();
    let mut unit_locations: HashMap<&str, HashSet<&str>> = HashMap::new();
    let mut locations: Vec<String> = Vec::new();
    for r in rows.iter() {
        if !location_totals.contains_key(r.location.as_str()) {
            locations.push(r.location.clone());
        }
        *location_totals.entry(r.location.as_str()).or_insert(0) += r.count;
        *candidate_totals.entry(r.candidate.as_str()).or_insert(0) += r.count;
        unit_locations
            .entry(r.electoral_unit.as_str())
            .or_insert_with(HashSet::new)
            .insert(r.location.as_str());
    }
    debug!(
        "compute_dominance: {} rows, {} locations, {} candidates",
        rows.len(),
        locations.len(),
        candidate_totals.len()
    );

    let dominance_rows = rows
        .iter()
        .map(|r| {
            let location_total = location_totals[r.location.as_str()];
            let candidate_total = candidate_totals[r.candidate.as_str()];
            let share_of_location = if location_total > 0 {
                (r.count as f64 / location_total as f64) * 100.0
            } else {
                0.0
            };
            let share_of_candidate_total = if candidate_total > 0 {
                r.count as f64 / candidate_total as f64
            } else {
                0.0
            };
            DominanceRecord {
                record: r.clone(),
                location_total,
                share_of_location,
                share_of_candidate_total,
                locations_in_unit: unit_locations[r.electoral_unit.as_str()].len(),
                dominance_index: round6((share_of_location * share_of_candidate_total) / 100.0),
            }
        })
        .collect();

    DominanceTable {
        rows: dominance_rows,
        locations,
    }
}

/// Sums the dominance index of every candidate over all the locations.
///
/// The result is sorted by candidate name.
pub fn aggregate_dominance(rows: &[DominanceRecord]) -> Vec<CandidateAggregate> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for r in rows.iter() {
        *sums.entry(r.record.candidate.as_str()).or_insert(0.0) += r.dominance_index;
    }
    sums.iter()
        .map(|(candidate, sum)| CandidateAggregate {
            candidate: candidate.to_string(),
            dominance_index: round6(sum / 100.0),
        })
        .collect()
}
