use log::info;

use std::collections::HashMap;

use crate::config::*;

/// The indices of a candidate computed from the official votes, compared to
/// the ones computed from the mentions.
#[derive(PartialEq, Debug, Clone)]
pub struct SourceComparison {
    pub candidate: String,
    pub electoral_unit: String,
    pub party: String,
    pub dominance_index_diff: f64,
    pub g_index_diff: f64,
    pub nem_diff: f64,
    pub voting_type_tse: VotingType,
    pub voting_type_twitter: VotingType,
    pub same_voting_type: bool,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ComparisonSummary {
    pub same: usize,
    pub different: usize,
}

/// Joins the two classified tables on the candidate.
///
/// Only the candidates present in both tables are compared. The differences
/// are official minus mentions, and the party and electoral unit are the
/// official ones. The rows are sorted by candidate.
pub fn compare_sources(
    tse: &[ClassifiedRecord],
    twitter: &[ClassifiedRecord],
) -> (Vec<SourceComparison>, ComparisonSummary) {
    let by_candidate: HashMap<&str, &ClassifiedRecord> =
        twitter.iter().map(|c| (c.candidate.as_str(), c)).collect();

    let mut rows: Vec<SourceComparison> = tse
        .iter()
        .filter_map(|t| {
            by_candidate.get(t.candidate.as_str()).map(|m| SourceComparison {
                candidate: t.candidate.clone(),
                electoral_unit: t.electoral_unit.clone(),
                party: t.party.clone(),
                dominance_index_diff: t.dominance_index - m.dominance_index,
                g_index_diff: t.g_index - m.g_index,
                nem_diff: t.nem - m.nem,
                voting_type_tse: t.voting_type,
                voting_type_twitter: m.voting_type,
                same_voting_type: t.voting_type == m.voting_type,
            })
        })
        .collect();
    rows.sort_by(|a, b| a.candidate.cmp(&b.candidate));

    let same = rows.iter().filter(|r| r.same_voting_type).count();
    let summary = ComparisonSummary {
        same,
        different: rows.len() - same,
    };
    info!(
        "compare_sources: {} candidates in both sources, same voting type: {}, different: {}",
        rows.len(),
        summary.same,
        summary.different
    );
    (rows, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classified(candidate: &str, dominance_index: f64, nem: f64, vt: VotingType) -> ClassifiedRecord {
        ClassifiedRecord {
            candidate: candidate.to_string(),
            electoral_unit: "SP".to_string(),
            party: "P1".to_string(),
            dominance_index,
            g_index: 0.5,
            nem,
            voting_type: vt,
        }
    }

    #[test]
    fn differences_and_agreement() {
        let tse = vec![
            classified("Bruno", 0.2, 10.0, VotingType::DispersaDominante),
            classified("Ana", 0.5, 4.0, VotingType::ConcentradaDominante),
            classified("Carla", 0.1, 2.0, VotingType::Unclassified),
        ];
        let twitter = vec![
            classified("Ana", 0.25, 1.0, VotingType::ConcentradaDominante),
            classified("Bruno", 0.1, 3.0, VotingType::ConcentradaCompartilhada),
        ];
        let (rows, summary) = compare_sources(&tse, &twitter);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].candidate, "Ana");
        assert_eq!(rows[0].dominance_index_diff, 0.25);
        assert_eq!(rows[0].nem_diff, 3.0);
        assert_eq!(rows[0].g_index_diff, 0.0);
        assert!(rows[0].same_voting_type);
        assert!(!rows[1].same_voting_type);
        assert_eq!(summary, ComparisonSummary { same: 1, different: 1 });
    }
}
