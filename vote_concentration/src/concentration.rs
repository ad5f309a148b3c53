use log::{debug, warn};

use std::collections::BTreeMap;

use crate::calculator::*;
use crate::config::*;

/// The concentration records and the issues recovered while building them.
#[derive(PartialEq, Debug, Clone)]
pub struct ConcentrationTable {
    pub records: Vec<ConcentrationRecord>,
    /// Candidates whose counts are all zero.
    pub degenerate_candidates: Vec<String>,
    /// Candidates found with several parties or electoral units.
    pub inconsistent_candidates: Vec<String>,
}

/// Computes the G-index, the RAE-index and the NEM of every candidate.
///
/// The location totals used as a baseline are computed over `rows`, which
/// is the filtered table (elected candidates only for the official votes).
/// Candidates are processed independently and returned sorted by name.
pub fn compute_concentration(
    rows: &[&VoteRecord],
    policy: InconsistentCandidatePolicy,
) -> Result<ConcentrationTable, AnalysisErrors> {
    let totals = location_totals(rows);

    let mut by_candidate: BTreeMap<&str, Vec<&VoteRecord>> = BTreeMap::new();
    for r in rows.iter() {
        by_candidate
            .entry(r.candidate.as_str())
            .or_insert_with(Vec::new)
            .push(r);
    }
    debug!(
        "compute_concentration: {} rows, {} candidates, {} locations",
        rows.len(),
        by_candidate.len(),
        totals.len()
    );

    let mut res = ConcentrationTable {
        records: Vec::new(),
        degenerate_candidates: Vec::new(),
        inconsistent_candidates: Vec::new(),
    };
    for (candidate, candidate_rows) in by_candidate.iter() {
        // Invariant: the group is never empty.
        let first = candidate_rows[0];
        if let Some(field) = inconsistent_field(candidate_rows) {
            match policy {
                InconsistentCandidatePolicy::Reject => {
                    return Err(AnalysisErrors::InconsistentCandidate {
                        candidate: candidate.to_string(),
                        field: field.to_string(),
                    });
                }
                InconsistentCandidatePolicy::FirstSeen => {
                    warn!(
                        "compute_concentration: candidate {:?} has several values for {}, keeping {:?} / {:?}",
                        candidate, field, first.party, first.electoral_unit
                    );
                    res.inconsistent_candidates.push(candidate.to_string());
                }
            }
        }

        let mut contributions = calculate_contributions(candidate_rows, &totals);
        let candidate_total: u64 = candidate_rows.iter().map(|r| r.count).sum();
        if candidate_total == 0 {
            warn!(
                "compute_concentration: candidate {:?} has no count in any of its {} locations",
                candidate,
                candidate_rows.len()
            );
            for c in contributions.iter_mut() {
                c.candidate_share = 0.0;
            }
            res.degenerate_candidates.push(candidate.to_string());
        }

        let g_index = calculate_g_index(&contributions);
        let rae_index = calculate_rae_index(&contributions);
        let nem = calculate_nem(rae_index);
        debug!(
            "compute_concentration: {}: g_index: {:?} rae_index: {:?} nem: {:?}",
            candidate, g_index, rae_index, nem
        );
        res.records.push(ConcentrationRecord {
            candidate: candidate.to_string(),
            electoral_unit: first.electoral_unit.clone(),
            party: first.party.clone(),
            g_index,
            rae_index,
            nem,
        });
    }
    Ok(res)
}

fn inconsistent_field(candidate_rows: &[&VoteRecord]) -> Option<&'static str> {
    let first = candidate_rows.first()?;
    if candidate_rows.iter().any(|r| r.party != first.party) {
        Some("party")
    } else if candidate_rows
        .iter()
        .any(|r| r.electoral_unit != first.electoral_unit)
    {
        Some("electoral unit")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(location: &str, candidate: &str, party: &str, count: u64) -> VoteRecord {
        VoteRecord {
            location: location.to_string(),
            candidate: candidate.to_string(),
            party: party.to_string(),
            electoral_unit: "SP".to_string(),
            count,
            elected_status: ElectedStatus::Elected,
        }
    }

    #[test]
    fn records_sorted_by_candidate() {
        let rows = vec![
            row("Campinas", "Bruno", "P2", 10),
            row("Campinas", "Ana", "P1", 30),
            row("Santos", "Ana", "P1", 10),
        ];
        let refs: Vec<&VoteRecord> = rows.iter().collect();
        let table = compute_concentration(&refs, InconsistentCandidatePolicy::Reject).unwrap();
        let names: Vec<&str> = table.records.iter().map(|r| r.candidate.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bruno"]);

        let ana = &table.records[0];
        assert_eq!(ana.party, "P1");
        // Shares 0.75 / 0.25
        assert!((ana.rae_index - 0.625).abs() < 1e-12);
        assert!((ana.nem - 1.6).abs() < 1e-12);
        // Location shares: 40 / 50 and 10 / 50
        let expected_g = (0.75_f64 - 0.8).powi(2) + (0.25_f64 - 0.2).powi(2);
        assert!((ana.g_index - expected_g).abs() < 1e-12);

        let bruno = &table.records[1];
        assert_eq!(bruno.g_index, 0.0);
        assert_eq!(bruno.nem, 1.0);
    }

    #[test]
    fn zero_votes_candidate_is_degenerate() {
        let rows = vec![
            row("Campinas", "Ana", "P1", 30),
            row("Campinas", "Carla", "P3", 0),
            row("Santos", "Carla", "P3", 0),
        ];
        let refs: Vec<&VoteRecord> = rows.iter().collect();
        let table = compute_concentration(&refs, InconsistentCandidatePolicy::Reject).unwrap();
        assert_eq!(table.degenerate_candidates, vec!["Carla".to_string()]);
        let carla = &table.records[1];
        assert_eq!(carla.rae_index, RAE_FLOOR);
        assert!(carla.nem.is_finite() && carla.nem > 0.0);
        assert!(!carla.g_index.is_nan());
    }

    #[test]
    fn zero_votes_in_empty_locations() {
        let rows = vec![
            row("A", "Ana", "P1", 10),
            row("B", "Zeca", "P2", 0),
            row("C", "Zeca", "P2", 0),
        ];
        let refs: Vec<&VoteRecord> = rows.iter().collect();
        let table = compute_concentration(&refs, InconsistentCandidatePolicy::Reject).unwrap();
        assert_eq!(table.degenerate_candidates, vec!["Zeca".to_string()]);
        let zeca = &table.records[1];
        assert_eq!(zeca.candidate, "Zeca");
        assert_eq!(zeca.g_index, 0.0);
        assert_eq!(zeca.rae_index, RAE_FLOOR);
        assert!(zeca.nem.is_finite());
    }

    #[test]
    fn several_parties_rejected() {
        let rows = vec![
            row("Campinas", "Ana", "P1", 30),
            row("Santos", "Ana", "P2", 10),
        ];
        let refs: Vec<&VoteRecord> = rows.iter().collect();
        let res = compute_concentration(&refs, InconsistentCandidatePolicy::Reject);
        assert_eq!(
            res,
            Err(AnalysisErrors::InconsistentCandidate {
                candidate: "Ana".to_string(),
                field: "party".to_string()
            })
        );
    }

    #[test]
    fn several_parties_first_seen() {
        let rows = vec![
            row("Campinas", "Ana", "P1", 30),
            row("Santos", "Ana", "P2", 10),
        ];
        let refs: Vec<&VoteRecord> = rows.iter().collect();
        let table = compute_concentration(&refs, InconsistentCandidatePolicy::FirstSeen).unwrap();
        assert_eq!(table.records[0].party, "P1");
        assert_eq!(table.inconsistent_candidates, vec!["Ana".to_string()]);
    }
}
