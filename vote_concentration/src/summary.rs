use crate::classifier::mean_std;
use crate::config::*;

#[derive(PartialEq, Debug, Clone)]
pub struct TypeFrequency {
    pub voting_type: VotingType,
    pub count: usize,
    /// Fraction of all the candidates. Zero for an empty table.
    pub relative_frequency: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct Description {
    pub column: &'static str,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

/// Number of candidates of each voting type, including the empty ones.
pub fn voting_type_frequencies(classified: &[ClassifiedRecord]) -> Vec<TypeFrequency> {
    let total = classified.len();
    VotingType::ALL
        .iter()
        .map(|vt| {
            let count = classified.iter().filter(|c| c.voting_type == *vt).count();
            TypeFrequency {
                voting_type: *vt,
                count,
                relative_frequency: if total > 0 {
                    count as f64 / total as f64
                } else {
                    0.0
                },
            }
        })
        .collect()
}

/// Descriptive statistics of the dominance index, the G-index and the NEM.
pub fn describe(classified: &[ClassifiedRecord]) -> Vec<Description> {
    let columns: [(&'static str, fn(&ClassifiedRecord) -> f64); 3] = [
        ("dominance_index", |c: &ClassifiedRecord| c.dominance_index),
        ("g_index", |c: &ClassifiedRecord| c.g_index),
        ("nem", |c: &ClassifiedRecord| c.nem),
    ];
    columns
        .iter()
        .map(|(name, get)| {
            let values: Vec<f64> = classified.iter().map(|c| get(c)).collect();
            describe_column(*name, &values)
        })
        .collect()
}

fn describe_column(column: &'static str, values: &[f64]) -> Description {
    let (mean, std) = mean_std(values);
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let median = if n == 0 {
        f64::NAN
    } else if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };
    Description {
        column,
        mean,
        std,
        min: sorted.first().cloned().unwrap_or(f64::NAN),
        max: sorted.last().cloned().unwrap_or(f64::NAN),
        median,
    }
}
