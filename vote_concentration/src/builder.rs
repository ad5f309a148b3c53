pub use crate::config::*;

/// A builder for adding vote rows.
///
/// ```
/// pub use vote_concentration::builder::Builder;
/// pub use vote_concentration::{DataSource, ElectedStatus, VotingType};
/// # use vote_concentration::AnalysisErrors;
///
/// let mut builder = Builder::new(DataSource::Tse)?;
///
/// builder.add_row("Campinas", "Anna", "P1", "SP", 120, ElectedStatus::Elected)?;
/// builder.add_row("Santos", "Anna", "P1", "SP", 30, ElectedStatus::Elected)?;
/// builder.add_row("Campinas", "Bob", "P2", "SP", 10, ElectedStatus::NotElected)?;
///
/// let result = builder.run()?;
/// // Bob was not elected: only Anna is classified.
/// assert_eq!(result.classified.len(), 1);
/// assert_eq!(result.classified[0].voting_type, VotingType::Unclassified);
///
/// # Ok::<(), AnalysisErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: AnalysisRules,
    pub(crate) _rows: Vec<VoteRecord>,
}

impl Builder {
    pub fn new(data_source: DataSource) -> Result<Builder, AnalysisErrors> {
        Builder::with_rules(&AnalysisRules::for_source(data_source))
    }

    pub fn with_rules(rules: &AnalysisRules) -> Result<Builder, AnalysisErrors> {
        if !rules.classifier_multiplier.is_finite() || rules.classifier_multiplier < 0.0 {
            return Err(AnalysisErrors::InvalidConfiguration(format!(
                "classifier multiplier must be a finite non-negative number, got {}",
                rules.classifier_multiplier
            )));
        }
        Ok(Builder {
            _rules: rules.clone(),
            _rows: Vec::new(),
        })
    }

    /// Adds the count of a candidate in a location.
    ///
    /// The location and the candidate must not be blank.
    pub fn add_row(
        &mut self,
        location: &str,
        candidate: &str,
        party: &str,
        electoral_unit: &str,
        count: u64,
        elected_status: ElectedStatus,
    ) -> Result<(), AnalysisErrors> {
        self.add_record(VoteRecord {
            location: location.to_string(),
            candidate: candidate.to_string(),
            party: party.to_string(),
            electoral_unit: electoral_unit.to_string(),
            count,
            elected_status,
        })
    }

    pub fn add_record(&mut self, record: VoteRecord) -> Result<(), AnalysisErrors> {
        let row = self._rows.len() + 1;
        if record.location.trim().is_empty() {
            return Err(AnalysisErrors::InvalidRecord {
                row,
                message: "empty location".to_string(),
            });
        }
        if record.candidate.trim().is_empty() {
            return Err(AnalysisErrors::InvalidRecord {
                row,
                message: "empty candidate".to_string(),
            });
        }
        self._rows.push(record);
        Ok(())
    }

    pub fn rows(&self) -> &[VoteRecord] {
        &self._rows
    }

    pub fn run(&self) -> Result<AnalysisResult, AnalysisErrors> {
        crate::run_analysis(&self._rows, &self._rules)
    }
}
