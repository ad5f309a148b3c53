/*!
Concentration metrics of the votes (or of the mentions) obtained by candidates
across municipalities.

For each candidate, the library computes:
- the **dominance index**: how much the candidate dominates the locations
  where its votes come from,
- the **G-index**: how far the geographic distribution of the candidate is
  from the distribution of all the votes,
- the **NEM**: the effective number of locations of the candidate, inverse
  of the Herfindahl-like RAE index.

The candidates are then classified into four voting types by comparing their
dominance and the logarithm of their NEM to the means of the dataset.

The simplest entry point is the [builder::Builder]. See the [manual] for the
definitions of the indices.
*/

mod config;
use log::{debug, info, warn};

use std::collections::HashSet;

pub use crate::config::*;

pub mod builder;
pub mod calculator;
pub mod classifier;
pub mod compare;
pub mod concentration;
pub mod dominance;
pub mod manual;
pub mod mentions;
pub mod merge;
pub mod summary;

/// Keeps the rows that participate in the concentration analysis.
///
/// For the official votes, only the elected candidates are kept. Mentions
/// have no notion of election: all the rows are kept.
pub fn filter_elected(rows: &[VoteRecord], data_source: DataSource) -> Vec<&VoteRecord> {
    match data_source {
        DataSource::Tse => rows
            .iter()
            .filter(|r| r.elected_status == ElectedStatus::Elected)
            .collect(),
        DataSource::Twitter => rows.iter().collect(),
    }
}

/// Runs the full analysis over the rows of one data source.
///
/// Arguments:
/// * `rows` the counts of the candidates in each location
/// * `rules` the data source and the classifier settings
///
/// An empty table is not an error: the result simply contains no candidate.
pub fn run_analysis(
    rows: &[VoteRecord],
    rules: &AnalysisRules,
) -> Result<AnalysisResult, AnalysisErrors> {
    info!(
        "run_analysis: processing {} rows from source {}, rules: {:?}",
        rows.len(),
        rules.data_source,
        rules
    );
    if rows.is_empty() {
        warn!(
            "run_analysis: no rows for source {}, the classified table will be empty",
            rules.data_source
        );
    }

    let dominance_table = dominance::compute_dominance(rows);
    let filtered = filter_elected(rows, rules.data_source);
    info!(
        "run_analysis: {} rows kept for the concentration analysis",
        filtered.len()
    );
    let aggregates = dominance::aggregate_dominance(&dominance_table.rows);
    let concentration =
        concentration::compute_concentration(&filtered, rules.inconsistent_candidate_policy)?;
    let outcome = merge::merge_indices(&aggregates, &concentration.records);

    // The candidates removed by the elected filter are expected to be missing.
    let kept: HashSet<&str> = filtered.iter().map(|r| r.candidate.as_str()).collect();
    let mut incomplete_join: Vec<String> = outcome
        .unmatched_dominance
        .iter()
        .filter(|c| kept.contains(c.as_str()))
        .cloned()
        .collect();
    incomplete_join.extend(outcome.unmatched_concentration.iter().cloned());
    if !incomplete_join.is_empty() {
        warn!(
            "run_analysis: {} candidates dropped by the merge: {:?}",
            incomplete_join.len(),
            incomplete_join
        );
    }
    debug!(
        "run_analysis: {} candidates filtered out before the merge",
        outcome.unmatched_dominance.len() + outcome.unmatched_concentration.len()
            - incomplete_join.len()
    );

    let (classified, thresholds) =
        classifier::classify(&outcome.merged, rules.classifier_multiplier);
    if !classified.is_empty()
        && classified
            .iter()
            .all(|c| c.voting_type == VotingType::Unclassified)
    {
        warn!(
            "run_analysis: none of the {} candidates could be classified",
            classified.len()
        );
    }

    let warnings = AnalysisWarnings {
        incomplete_join,
        degenerate_candidates: concentration.degenerate_candidates,
        inconsistent_candidates: concentration.inconsistent_candidates,
    };
    info!(
        "run_analysis: {} candidates classified for source {}, {} warnings",
        classified.len(),
        rules.data_source,
        warnings.count()
    );
    Ok(AnalysisResult {
        data_source: rules.data_source,
        dominance: dominance_table.rows,
        locations: dominance_table.locations,
        aggregates,
        concentration: concentration.records,
        classified,
        thresholds,
        warnings,
    })
}
