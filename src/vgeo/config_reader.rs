use crate::vgeo::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "generateExcel")]
    pub generate_excel: Option<bool>,
    /// voting_type, party or electoral_unit: one sheet per value.
    #[serde(rename = "excelGroupBy")]
    pub excel_group_by: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnNames {
    pub location: Option<String>,
    pub candidate: Option<String>,
    pub party: Option<String>,
    #[serde(rename = "electoralUnit")]
    pub electoral_unit: Option<String>,
    pub count: Option<String>,
    pub status: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    #[serde(rename = "dataSource")]
    pub data_source: String,
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    pub separator: Option<String>,
    pub encoding: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    pub columns: Option<ColumnNames>,
    #[serde(rename = "electedLabel")]
    pub elected_label: Option<String>,
    #[serde(rename = "expectedOutput")]
    pub expected_output: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct MentionSettings {
    #[serde(rename = "postsFilePath")]
    pub posts_file_path: String,
    #[serde(rename = "contentColumn")]
    pub content_column: Option<String>,
    #[serde(rename = "candidateColumn")]
    pub candidate_column: Option<String>,
    pub separator: Option<String>,
    #[serde(rename = "outputFilePath")]
    pub output_file_path: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRules {
    #[serde(rename = "classifierMultiplier")]
    pub classifier_multiplier: Option<f64>,
    #[serde(rename = "inconsistentCandidatePolicy")]
    pub inconsistent_candidate_policy: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct VgeoConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    pub sources: Vec<FileSource>,
    pub mentions: Option<MentionSettings>,
    pub rules: Option<ClassifierRules>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Encoding {
    Latin1,
    Utf8,
}

/// The layout of an input table, once the defaults of the data source are
/// applied.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TableLayout {
    pub separator: u8,
    pub encoding: Encoding,
    pub location: String,
    pub candidate: String,
    pub party: String,
    pub electoral_unit: String,
    pub count: String,
    pub status: String,
    pub elected_label: String,
    pub excel_worksheet_name: Option<String>,
}

pub const DEFAULT_MENTIONS_FILE: &str = "city_mentions_twitter_data.csv";

impl FileSource {
    pub fn provider(&self) -> &str {
        self.provider.as_deref().unwrap_or("csv")
    }

    pub fn layout(&self, data_source: DataSource) -> VgeoResult<TableLayout> {
        let separator = match &self.separator {
            Some(s) => read_separator(s)?,
            None => match data_source {
                DataSource::Tse => b';',
                DataSource::Twitter => b',',
            },
        };
        let encoding = match self.encoding.as_deref() {
            Some(e) => read_encoding(e)?,
            None => match data_source {
                DataSource::Tse => Encoding::Latin1,
                DataSource::Twitter => Encoding::Utf8,
            },
        };
        let cols = self.columns.clone().unwrap_or_default();
        Ok(TableLayout {
            separator,
            encoding,
            location: cols.location.unwrap_or_else(|| "nm_municipio".to_string()),
            candidate: cols
                .candidate
                .unwrap_or_else(|| "nm_urna_candidato".to_string()),
            party: cols.party.unwrap_or_else(|| "sg_partido".to_string()),
            electoral_unit: cols.electoral_unit.unwrap_or_else(|| "sg_ue".to_string()),
            count: cols
                .count
                .unwrap_or_else(|| data_source.count_column().to_string()),
            status: cols
                .status
                .unwrap_or_else(|| "ds_sit_totalizacao".to_string()),
            elected_label: self
                .elected_label
                .clone()
                .unwrap_or_else(|| "Eleito".to_string()),
            excel_worksheet_name: self.excel_worksheet_name.clone(),
        })
    }
}

pub const EXCEL_GROUP_COLUMNS: [&str; 3] = ["voting_type", "party", "electoral_unit"];

impl OutputSettings {
    pub fn generate_excel(&self) -> bool {
        self.generate_excel.unwrap_or(false)
    }

    pub fn validate(&self) -> VgeoResult<()> {
        match self.excel_group_by.as_deref() {
            Some(col) if !EXCEL_GROUP_COLUMNS.contains(&col) => whatever!(
                "Cannot use excelGroupBy {:?}: use one of {:?}",
                col,
                EXCEL_GROUP_COLUMNS
            ),
            Some(_) if !self.generate_excel() => {
                warn!("excelGroupBy is ignored unless generateExcel is true");
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl MentionSettings {
    pub fn content_column(&self) -> &str {
        self.content_column.as_deref().unwrap_or("content")
    }

    pub fn candidate_column(&self) -> &str {
        self.candidate_column
            .as_deref()
            .unwrap_or("nm_urna_candidato")
    }

    pub fn output_file_path(&self) -> &str {
        self.output_file_path
            .as_deref()
            .unwrap_or(DEFAULT_MENTIONS_FILE)
    }

    pub fn separator(&self) -> VgeoResult<u8> {
        match &self.separator {
            Some(s) => read_separator(s),
            None => Ok(b','),
        }
    }
}

pub fn read_separator(s: &str) -> VgeoResult<u8> {
    match s.as_bytes() {
        [b] => Ok(*b),
        _ if s == "\\t" => Ok(b'\t'),
        _ => InvalidSeparatorSnafu {
            separator: s.to_string(),
        }
        .fail(),
    }
}

fn read_encoding(s: &str) -> VgeoResult<Encoding> {
    match s.to_lowercase().replace('_', "-").as_str() {
        "latin-1" | "latin1" | "iso-8859-1" => Ok(Encoding::Latin1),
        "utf-8" | "utf8" => Ok(Encoding::Utf8),
        x => whatever!("Unsupported encoding {:?}: use latin-1 or utf-8", x),
    }
}

/// Turns the rules of the configuration into the rules of the analysis.
pub fn validate_rules(
    rules: &Option<ClassifierRules>,
    data_source: DataSource,
) -> VgeoResult<AnalysisRules> {
    let mut res = AnalysisRules::for_source(data_source);
    if let Some(r) = rules {
        if let Some(k) = r.classifier_multiplier {
            if !k.is_finite() || k < 0.0 {
                whatever!(
                    "classifierMultiplier must be a non-negative number, got {}",
                    k
                );
            }
            res.classifier_multiplier = k;
        }
        res.inconsistent_candidate_policy = match r.inconsistent_candidate_policy.as_deref() {
            None | Some("firstSeen") => InconsistentCandidatePolicy::FirstSeen,
            Some("reject") => InconsistentCandidatePolicy::Reject,
            Some(x) => {
                whatever!(
                    "Cannot use inconsistentCandidatePolicy {:?}: use firstSeen or reject",
                    x
                )
            }
        };
    }
    Ok(res)
}

pub fn read_config(path: &str) -> VgeoResult<VgeoConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: content: {:?}", contents);
    let config: VgeoConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu { path })?;
    Ok(config)
}
