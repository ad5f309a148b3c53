use std::collections::HashMap;

use crate::config::VoteRecord;

/// Floor applied to the RAE index so that the NEM stays finite.
pub const RAE_FLOOR: f64 = 1e-9;

/// The normalized weight of one location for a candidate.
#[derive(PartialEq, Debug, Clone)]
pub struct Contribution {
    pub location: String,
    /// Share of the candidate total obtained in this location.
    pub candidate_share: f64,
    /// Share of this location in the summed totals of the locations of the candidate.
    pub location_share: f64,
}

/// Rounds to 6 decimal places, ties to even.
pub fn round6(x: f64) -> f64 {
    (x * 1e6).round_ties_even() / 1e6
}

/// The total count per location over all the given rows.
pub fn location_totals(rows: &[&VoteRecord]) -> HashMap<String, u64> {
    let mut totals: HashMap<String, u64> = HashMap::new();
    for r in rows.iter() {
        *totals.entry(r.location.clone()).or_insert(0) += r.count;
    }
    totals
}

/// Normalizes the counts of one candidate and the totals of the locations
/// where the candidate is present.
///
/// `candidate_rows` must all belong to the same candidate. `totals` is
/// usually built with [location_totals] over the table the candidate rows
/// come from. If the candidate has no count at all, the candidate shares are
/// NaN and the caller must decide what to do with them. If the locations of
/// the candidate have no count at all, the location shares are 0.
pub fn calculate_contributions(
    candidate_rows: &[&VoteRecord],
    totals: &HashMap<String, u64>,
) -> Vec<Contribution> {
    let candidate_total: u64 = candidate_rows.iter().map(|r| r.count).sum();
    let row_totals: Vec<u64> = candidate_rows
        .iter()
        .map(|r| totals.get(&r.location).cloned().unwrap_or(0))
        .collect();
    let locations_total: u64 = row_totals.iter().sum();

    candidate_rows
        .iter()
        .zip(row_totals.iter())
        .map(|(r, lt)| Contribution {
            location: r.location.clone(),
            candidate_share: r.count as f64 / candidate_total as f64,
            location_share: if locations_total > 0 {
                *lt as f64 / locations_total as f64
            } else {
                0.0
            },
        })
        .collect()
}

/// Sum of the squared differences between the candidate shares and the location shares.
pub fn calculate_g_index(contributions: &[Contribution]) -> f64 {
    contributions
        .iter()
        .map(|c| (c.candidate_share - c.location_share).powi(2))
        .sum()
}

/// Herfindahl-like sum of the squared candidate shares, never lower than [RAE_FLOOR].
pub fn calculate_rae_index(contributions: &[Contribution]) -> f64 {
    let rae: f64 = contributions
        .iter()
        .map(|c| c.candidate_share.powi(2))
        .sum();
    if rae.is_nan() || rae <= 0.0 {
        RAE_FLOOR
    } else {
        rae
    }
}

/// The effective number of locations: inverse of the RAE index.
pub fn calculate_nem(rae_index: f64) -> f64 {
    1.0 / rae_index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElectedStatus;

    fn row(location: &str, count: u64) -> VoteRecord {
        VoteRecord {
            location: location.to_string(),
            candidate: "X".to_string(),
            party: "P".to_string(),
            electoral_unit: "SP".to_string(),
            count,
            elected_status: ElectedStatus::Elected,
        }
    }

    #[test]
    fn single_candidate_in_three_locations() {
        let rows = vec![row("A", 10), row("B", 0), row("C", 0)];
        let refs: Vec<&VoteRecord> = rows.iter().collect();
        let mut totals = HashMap::new();
        totals.insert("A".to_string(), 20);
        totals.insert("B".to_string(), 5);
        totals.insert("C".to_string(), 5);

        let contribs = calculate_contributions(&refs, &totals);
        let shares: Vec<f64> = contribs.iter().map(|c| c.candidate_share).collect();
        assert_eq!(shares, vec![1.0, 0.0, 0.0]);
        let loc_shares: Vec<f64> = contribs.iter().map(|c| c.location_share).collect();
        assert_eq!(loc_shares, vec![20.0 / 30.0, 5.0 / 30.0, 5.0 / 30.0]);

        let rae = calculate_rae_index(&contribs);
        assert_eq!(rae, 1.0);
        assert_eq!(calculate_nem(rae), 1.0);

        let expected_g = (1.0 - 20.0 / 30.0_f64).powi(2) + 2.0 * (5.0 / 30.0_f64).powi(2);
        assert!((calculate_g_index(&contribs) - expected_g).abs() < 1e-12);
    }

    #[test]
    fn one_location_is_not_concentrated_against_itself() {
        let rows = vec![row("A", 7)];
        let refs: Vec<&VoteRecord> = rows.iter().collect();
        let totals = location_totals(&refs);
        let contribs = calculate_contributions(&refs, &totals);
        assert_eq!(calculate_g_index(&contribs), 0.0);
        assert_eq!(calculate_nem(calculate_rae_index(&contribs)), 1.0);
    }

    #[test]
    fn zero_counts_clamp_the_rae_index() {
        let rows = vec![row("A", 0), row("B", 0)];
        let refs: Vec<&VoteRecord> = rows.iter().collect();
        let totals = location_totals(&refs);
        let contribs = calculate_contributions(&refs, &totals);
        assert!(contribs.iter().all(|c| c.candidate_share.is_nan()));
        let rae = calculate_rae_index(&contribs);
        assert_eq!(rae, RAE_FLOOR);
        let nem = calculate_nem(rae);
        assert!(nem.is_finite());
        assert!(nem > 0.0);
    }

    #[test]
    fn empty_locations_have_no_share() {
        let rows = vec![row("B", 0), row("C", 0)];
        let refs: Vec<&VoteRecord> = rows.iter().collect();
        let mut totals = HashMap::new();
        totals.insert("A".to_string(), 10);
        totals.insert("B".to_string(), 0);
        totals.insert("C".to_string(), 0);
        let contribs = calculate_contributions(&refs, &totals);
        assert!(contribs.iter().all(|c| c.location_share == 0.0));
    }

    #[test]
    fn rounding_to_six_decimals() {
        assert_eq!(round6(0.123_456_789), 0.123457);
        assert_eq!(round6(2.0), 2.0);
        assert_eq!(round6(0.000_000_4), 0.0);
    }
}
