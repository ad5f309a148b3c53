// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The origin of the counts in a table.
///
/// Both sources share the same row shape but not the same semantics: `Tse`
/// counts are nominal valid votes, `Twitter` counts are mentions of a
/// municipality in the posts of a candidate.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum DataSource {
    Tse,
    Twitter,
}

impl DataSource {
    pub fn parse(s: &str) -> Result<DataSource, AnalysisErrors> {
        match s {
            "tse" => Ok(DataSource::Tse),
            "twitter" => Ok(DataSource::Twitter),
            x => Err(AnalysisErrors::InvalidConfiguration(format!(
                "invalid data source {:?}, should be 'tse' or 'twitter'",
                x
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataSource::Tse => "tse",
            DataSource::Twitter => "twitter",
        }
    }

    /// The name of the count column in the files produced for this source.
    pub fn count_column(&self) -> &'static str {
        match self {
            DataSource::Tse => "qt_votos_nom_validos",
            DataSource::Twitter => "qt_city_mentions",
        }
    }
}

impl Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ElectedStatus {
    Elected,
    NotElected,
}

/// One row of input: the count obtained by a candidate in a location.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRecord {
    pub location: String,
    pub candidate: String,
    pub party: String,
    pub electoral_unit: String,
    pub count: u64,
    pub elected_status: ElectedStatus,
}

// ******** Output data structures *********

/// A vote record with its dominance index in the location.
#[derive(PartialEq, Debug, Clone)]
pub struct DominanceRecord {
    pub record: VoteRecord,
    /// Total count of all the candidates in this location.
    pub location_total: u64,
    /// Percentage of the location total obtained by the candidate.
    pub share_of_location: f64,
    /// Fraction of the candidate total obtained in this location.
    pub share_of_candidate_total: f64,
    /// Number of distinct locations in the electoral unit of the record.
    pub locations_in_unit: usize,
    pub dominance_index: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct CandidateAggregate {
    pub candidate: String,
    pub dominance_index: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ConcentrationRecord {
    pub candidate: String,
    pub electoral_unit: String,
    pub party: String,
    pub g_index: f64,
    pub rae_index: f64,
    pub nem: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct MergedRecord {
    pub candidate: String,
    pub electoral_unit: String,
    pub party: String,
    pub dominance_index: f64,
    pub g_index: f64,
    pub nem: f64,
}

/// The four quadrants of the dominance / fragmentation plane.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum VotingType {
    /// High dominance, votes spread over many locations.
    DispersaDominante,
    /// High dominance, votes gathered in few locations.
    ConcentradaDominante,
    /// Low dominance, votes spread over many locations.
    DispersaCompartilhada,
    /// Low dominance, votes gathered in few locations.
    ConcentradaCompartilhada,
    /// On a threshold or between the low and high thresholds.
    Unclassified,
}

impl VotingType {
    pub const ALL: [VotingType; 5] = [
        VotingType::DispersaDominante,
        VotingType::ConcentradaDominante,
        VotingType::DispersaCompartilhada,
        VotingType::ConcentradaCompartilhada,
        VotingType::Unclassified,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VotingType::DispersaDominante => "Dispersa Dominante",
            VotingType::ConcentradaDominante => "Concentrada Dominante",
            VotingType::DispersaCompartilhada => "Dispersa Compartilhada",
            VotingType::ConcentradaCompartilhada => "Concentrada Compartilhada",
            VotingType::Unclassified => "Unclassified",
        }
    }

    pub fn from_label(s: &str) -> Option<VotingType> {
        VotingType::ALL.iter().find(|vt| vt.label() == s).cloned()
    }
}

impl Display for VotingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct ClassifiedRecord {
    pub candidate: String,
    pub electoral_unit: String,
    pub party: String,
    pub dominance_index: f64,
    pub g_index: f64,
    pub nem: f64,
    pub voting_type: VotingType,
}

/// The cut points used by the classifier.
///
/// The values are NaN when the standard deviations are undefined (fewer than
/// two candidates). In that case no candidate is classified.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Thresholds {
    pub dominance_mean: f64,
    pub dominance_std: f64,
    pub nem_log_mean: f64,
    pub nem_log_std: f64,
    pub high_dominance: f64,
    pub low_dominance: f64,
    pub high_fragmentation: f64,
    pub low_fragmentation: f64,
}

/// Data quality issues that were recovered during a run.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct AnalysisWarnings {
    /// Candidates dropped by the merge for a reason other than the elected filter.
    pub incomplete_join: Vec<String>,
    /// Candidates whose counts are all zero in the filtered table.
    pub degenerate_candidates: Vec<String>,
    /// Candidates seen with more than one party or electoral unit.
    pub inconsistent_candidates: Vec<String>,
}

impl AnalysisWarnings {
    pub fn count(&self) -> usize {
        self.incomplete_join.len()
            + self.degenerate_candidates.len()
            + self.inconsistent_candidates.len()
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct AnalysisResult {
    pub data_source: DataSource,
    pub dominance: Vec<DominanceRecord>,
    /// Distinct locations of the input, in order of first appearance.
    pub locations: Vec<String>,
    pub aggregates: Vec<CandidateAggregate>,
    pub concentration: Vec<ConcentrationRecord>,
    pub classified: Vec<ClassifiedRecord>,
    pub thresholds: Thresholds,
    pub warnings: AnalysisWarnings,
}

/// Errors that prevent the analysis from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AnalysisErrors {
    InvalidConfiguration(String),
    InconsistentCandidate { candidate: String, field: String },
    InvalidRecord { row: usize, message: String },
}

impl Error for AnalysisErrors {}

impl Display for AnalysisErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisErrors::InvalidConfiguration(msg) => {
                write!(f, "invalid configuration: {}", msg)
            }
            AnalysisErrors::InconsistentCandidate { candidate, field } => write!(
                f,
                "candidate {:?} has more than one value for {}",
                candidate, field
            ),
            AnalysisErrors::InvalidRecord { row, message } => {
                write!(f, "invalid record at row {}: {}", row, message)
            }
        }
    }
}

// ********* Configuration **********

/// What to do with a candidate appearing under several parties or electoral units.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InconsistentCandidatePolicy {
    /// Fail the analysis.
    Reject,
    /// Keep the values of the first row of the candidate and record a warning.
    FirstSeen,
}

#[derive(PartialEq, Debug, Clone)]
pub struct AnalysisRules {
    pub data_source: DataSource,
    /// Multiplier of the standard deviations around the means. Values this small
    /// split the candidates almost exactly at the means.
    pub classifier_multiplier: f64,
    pub inconsistent_candidate_policy: InconsistentCandidatePolicy,
}

impl AnalysisRules {
    pub const DEFAULT_CLASSIFIER_MULTIPLIER: f64 = 5e-7;

    pub fn for_source(data_source: DataSource) -> AnalysisRules {
        AnalysisRules {
            data_source,
            classifier_multiplier: AnalysisRules::DEFAULT_CLASSIFIER_MULTIPLIER,
            inconsistent_candidate_policy: InconsistentCandidatePolicy::FirstSeen,
        }
    }
}
