// Writing and reading back the tables produced by an analysis.

use std::collections::{BTreeMap, HashSet};

use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize, Serializer};

use vote_concentration::compare::SourceComparison;
use vote_concentration::summary::{Description, TypeFrequency};

use crate::vgeo::*;

/// Writes a float with 6 decimals.
fn fixed6<S: Serializer>(x: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!("{:.6}", x))
}

/// A row of the classified table, as written to disk.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedRow {
    pub candidate: String,
    pub electoral_unit: String,
    pub party: String,
    #[serde(serialize_with = "fixed6")]
    pub dominance_index: f64,
    #[serde(serialize_with = "fixed6")]
    pub g_index: f64,
    #[serde(serialize_with = "fixed6")]
    pub nem: f64,
    pub voting_type: String,
}

impl ClassifiedRow {
    fn from_record(r: &ClassifiedRecord) -> ClassifiedRow {
        ClassifiedRow {
            candidate: r.candidate.clone(),
            electoral_unit: r.electoral_unit.clone(),
            party: r.party.clone(),
            dominance_index: r.dominance_index,
            g_index: r.g_index,
            nem: r.nem,
            voting_type: r.voting_type.label().to_string(),
        }
    }
}

#[derive(Serialize)]
struct FrequencyRow<'a> {
    voting_type: &'a str,
    count: usize,
    #[serde(serialize_with = "fixed6")]
    relative_frequency: f64,
}

#[derive(Serialize)]
struct StatisticsRow<'a> {
    column: &'a str,
    #[serde(serialize_with = "fixed6")]
    mean: f64,
    #[serde(serialize_with = "fixed6")]
    std: f64,
    #[serde(serialize_with = "fixed6")]
    min: f64,
    #[serde(serialize_with = "fixed6")]
    max: f64,
    #[serde(serialize_with = "fixed6")]
    median: f64,
}

#[derive(Serialize)]
struct ComparisonRow<'a> {
    candidate: &'a str,
    electoral_unit: &'a str,
    party: &'a str,
    #[serde(serialize_with = "fixed6")]
    dominance_index_diff: f64,
    #[serde(serialize_with = "fixed6")]
    g_index_diff: f64,
    #[serde(serialize_with = "fixed6")]
    nem_diff: f64,
    voting_type_tse: &'a str,
    voting_type_twitter: &'a str,
    same_voting_type: bool,
}

/// The layout read back by the `twitter` source.
#[derive(Serialize)]
struct MentionRow<'a> {
    nm_municipio: &'a str,
    nm_urna_candidato: &'a str,
    sg_partido: &'a str,
    sg_ue: &'a str,
    qt_city_mentions: u64,
}

const CLASSIFIED_HEADER: [&str; 7] = [
    "candidate",
    "electoral_unit",
    "party",
    "dominance_index",
    "g_index",
    "nem",
    "voting_type",
];

/// Serializes the rows under an explicit header, so that an empty table
/// still has one.
fn rows_to_csv<T, I>(header: &[&str], rows: I) -> VgeoResult<String>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);
    wtr.write_record(header).context(CsvWriteSnafu {})?;
    for row in rows {
        wtr.serialize(row).context(CsvWriteSnafu {})?;
    }
    let bytes = match wtr.into_inner() {
        Ok(b) => b,
        Err(e) => whatever!("Failed to flush the CSV output: {}", e.error()),
    };
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => whatever!("The CSV output is not valid UTF-8: {}", e),
    }
}

/// The classified table, with the floats printed with 6 decimals.
pub fn classified_to_csv(records: &[ClassifiedRecord]) -> VgeoResult<String> {
    rows_to_csv(&CLASSIFIED_HEADER, records.iter().map(ClassifiedRow::from_record))
}

pub fn frequencies_to_csv(freqs: &[TypeFrequency]) -> VgeoResult<String> {
    rows_to_csv(
        &["voting_type", "count", "relative_frequency"],
        freqs.iter().map(|f| FrequencyRow {
            voting_type: f.voting_type.label(),
            count: f.count,
            relative_frequency: f.relative_frequency,
        }),
    )
}

pub fn statistics_to_csv(stats: &[Description]) -> VgeoResult<String> {
    rows_to_csv(
        &["column", "mean", "std", "min", "max", "median"],
        stats.iter().map(|d| StatisticsRow {
            column: d.column,
            mean: d.mean,
            std: d.std,
            min: d.min,
            max: d.max,
            median: d.median,
        }),
    )
}

pub fn comparison_to_csv(rows: &[SourceComparison]) -> VgeoResult<String> {
    rows_to_csv(
        &[
            "candidate",
            "electoral_unit",
            "party",
            "dominance_index_diff",
            "g_index_diff",
            "nem_diff",
            "voting_type_tse",
            "voting_type_twitter",
            "same_voting_type",
        ],
        rows.iter().map(|r| ComparisonRow {
            candidate: &r.candidate,
            electoral_unit: &r.electoral_unit,
            party: &r.party,
            dominance_index_diff: r.dominance_index_diff,
            g_index_diff: r.g_index_diff,
            nem_diff: r.nem_diff,
            voting_type_tse: r.voting_type_tse.label(),
            voting_type_twitter: r.voting_type_twitter.label(),
            same_voting_type: r.same_voting_type,
        }),
    )
}

/// The mention counts, in the layout read by the `twitter` source.
pub fn mentions_to_csv(records: &[VoteRecord]) -> VgeoResult<String> {
    rows_to_csv(
        &[
            "nm_municipio",
            "nm_urna_candidato",
            "sg_partido",
            "sg_ue",
            DataSource::Twitter.count_column(),
        ],
        records.iter().map(|r| MentionRow {
            nm_municipio: &r.location,
            nm_urna_candidato: &r.candidate,
            sg_partido: &r.party,
            sg_ue: &r.electoral_unit,
            qt_city_mentions: r.count,
        }),
    )
}

/// Excel forbids some characters in sheet names and limits them to 31
/// characters.
fn sheet_name(key: &str, used: &HashSet<String>) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            x => x,
        })
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();
    let base: String = if cleaned.is_empty() {
        "empty".to_string()
    } else {
        cleaned.chars().take(31).collect()
    };
    if !used.contains(&base) {
        return base;
    }
    let short: String = base.chars().take(27).collect();
    (2..)
        .map(|i| format!("{}_{}", short, i))
        .find(|n| !used.contains(n))
        .unwrap_or(base)
}

fn group_key(r: &ClassifiedRecord, group_by: &str) -> VgeoResult<String> {
    match group_by {
        "voting_type" => Ok(r.voting_type.label().to_string()),
        "party" => Ok(r.party.clone()),
        "electoral_unit" => Ok(r.electoral_unit.clone()),
        x => whatever!(
            "Cannot group the sheets by {:?}: use voting_type, party or electoral_unit",
            x
        ),
    }
}

/// The classified table as an Excel workbook. With `group_by`, each value of
/// the column gets its own sheet, in sorted order.
pub fn classified_to_xlsx(
    records: &[ClassifiedRecord],
    group_by: Option<&str>,
) -> VgeoResult<Vec<u8>> {
    let mut groups: BTreeMap<String, Vec<&ClassifiedRecord>> = BTreeMap::new();
    match group_by {
        Some(col) => {
            for r in records.iter() {
                groups.entry(group_key(r, col)?).or_default().push(r);
            }
        }
        None => {
            groups.insert("voting_types".to_string(), records.iter().collect());
        }
    }
    if groups.is_empty() {
        groups.insert("voting_types".to_string(), Vec::new());
    }

    let mut workbook = Workbook::new();
    let mut used: HashSet<String> = HashSet::new();
    for (key, rows) in groups.iter() {
        let name = sheet_name(key, &used);
        used.insert(name.clone());
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name).context(WritingExcelSnafu {})?;
        for (col, h) in CLASSIFIED_HEADER.iter().enumerate() {
            worksheet
                .write_string(0, col as u16, *h)
                .context(WritingExcelSnafu {})?;
        }
        for (idx, r) in rows.iter().enumerate() {
            let row = idx as u32 + 1;
            worksheet
                .write_string(row, 0, &r.candidate)
                .context(WritingExcelSnafu {})?;
            worksheet
                .write_string(row, 1, &r.electoral_unit)
                .context(WritingExcelSnafu {})?;
            worksheet
                .write_string(row, 2, &r.party)
                .context(WritingExcelSnafu {})?;
            worksheet
                .write_number(row, 3, r.dominance_index)
                .context(WritingExcelSnafu {})?;
            worksheet
                .write_number(row, 4, r.g_index)
                .context(WritingExcelSnafu {})?;
            worksheet
                .write_number(row, 5, r.nem)
                .context(WritingExcelSnafu {})?;
            worksheet
                .write_string(row, 6, r.voting_type.label())
                .context(WritingExcelSnafu {})?;
        }
        debug!("classified_to_xlsx: sheet {:?}: {} rows", name, rows.len());
    }
    workbook.save_to_buffer().context(WritingExcelSnafu {})
}

/// Reads back a classified table written by [classified_to_csv].
pub fn read_classified(path: &str) -> VgeoResult<Vec<ClassifiedRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut res: Vec<ClassifiedRecord> = Vec::new();
    for (idx, row_r) in rdr.deserialize::<ClassifiedRow>().enumerate() {
        let lineno = idx as u64 + 2;
        let row = row_r.context(CsvLineParseSnafu { path, lineno })?;
        let voting_type = match VotingType::from_label(&row.voting_type) {
            Some(vt) => vt,
            None => whatever!(
                "{}:{}: unknown voting type {:?}",
                path,
                lineno,
                row.voting_type
            ),
        };
        res.push(ClassifiedRecord {
            candidate: row.candidate,
            electoral_unit: row.electoral_unit,
            party: row.party,
            dominance_index: row.dominance_index,
            g_index: row.g_index,
            nem: row.nem,
            voting_type,
        });
    }
    Ok(res)
}

pub fn write_file(path: &Path, content: &[u8]) -> VgeoResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context(WritingOutputSnafu {
            path: parent.display().to_string(),
        })?;
    }
    fs::write(path, content).context(WritingOutputSnafu {
        path: path.display().to_string(),
    })
}

pub fn write_text(path: &Path, content: &str) -> VgeoResult<()> {
    write_file(path, content.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, DataType, Reader, Xlsx};

    fn classified(candidate: &str, vt: VotingType) -> ClassifiedRecord {
        ClassifiedRecord {
            candidate: candidate.to_string(),
            electoral_unit: "SP".to_string(),
            party: "P1".to_string(),
            dominance_index: 0.123_456_789,
            g_index: 1.0 / 3.0,
            nem: 2.5,
            voting_type: vt,
        }
    }

    #[test]
    fn classified_layout() {
        let s = classified_to_csv(&[classified("ANA, A", VotingType::DispersaDominante)]).unwrap();
        assert_eq!(
            s,
            "candidate,electoral_unit,party,dominance_index,g_index,nem,voting_type\n\
             \"ANA, A\",SP,P1,0.123457,0.333333,2.500000,Dispersa Dominante\n"
        );
    }

    #[test]
    fn classified_reload() {
        let records = vec![
            classified("Ana", VotingType::ConcentradaCompartilhada),
            classified("Bruno", VotingType::Unclassified),
        ];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voting_types.csv");
        write_text(&path, &classified_to_csv(&records).unwrap()).unwrap();
        let back = read_classified(path.to_str().unwrap()).unwrap();
        assert_eq!(back.len(), 2);
        for (a, b) in records.iter().zip(back.iter()) {
            assert_eq!(a.candidate, b.candidate);
            assert_eq!(a.voting_type, b.voting_type);
            assert!((a.dominance_index - b.dominance_index).abs() <= 1e-6);
            assert!((a.g_index - b.g_index).abs() <= 1e-6);
            assert!((a.nem - b.nem).abs() <= 1e-6);
        }
    }

    #[test]
    fn empty_table_keeps_the_header() {
        let s = classified_to_csv(&[]).unwrap();
        assert_eq!(s.lines().count(), 1);
        let s = comparison_to_csv(&[]).unwrap();
        assert!(s.starts_with("candidate,electoral_unit,party,dominance_index_diff"));
    }

    #[test]
    fn mention_layout() {
        let records = vec![VoteRecord {
            location: "São Paulo".to_string(),
            candidate: "ANA".to_string(),
            party: "P1".to_string(),
            electoral_unit: "SP".to_string(),
            count: 3,
            elected_status: ElectedStatus::Elected,
        }];
        assert_eq!(
            mentions_to_csv(&records).unwrap(),
            "nm_municipio,nm_urna_candidato,sg_partido,sg_ue,qt_city_mentions\n\
             São Paulo,ANA,P1,SP,3\n"
        );
    }

    #[test]
    fn sheet_names() {
        let mut used = HashSet::new();
        assert_eq!(sheet_name("PT/PSB [SP]", &used), "PT_PSB _SP_");
        assert_eq!(sheet_name("", &used), "empty");
        let long = "A".repeat(40);
        let first = sheet_name(&long, &used);
        assert_eq!(first.chars().count(), 31);
        used.insert(first);
        let second = sheet_name(&long, &used);
        assert_eq!(second, format!("{}_2", "A".repeat(27)));
    }

    #[test]
    fn workbook_grouped_by_voting_type() {
        let records = vec![
            classified("Ana", VotingType::DispersaDominante),
            classified("Bruno", VotingType::ConcentradaCompartilhada),
            classified("Carla", VotingType::DispersaDominante),
        ];
        let bytes = classified_to_xlsx(&records, Some("voting_type")).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voting_types.xlsx");
        write_file(&path, &bytes).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(
            workbook.sheet_names().to_vec(),
            vec![
                "Concentrada Compartilhada".to_string(),
                "Dispersa Dominante".to_string()
            ]
        );
        let range = workbook
            .worksheet_range("Dispersa Dominante")
            .unwrap()
            .unwrap();
        assert_eq!(range.height(), 3);
        assert_eq!(
            range.get_value((2, 0)),
            Some(&DataType::String("Carla".to_string()))
        );
        assert_eq!(range.get_value((1, 5)), Some(&DataType::Float(2.5)));
    }

    #[test]
    fn workbook_rejects_unknown_column() {
        let records = vec![classified("Ana", VotingType::DispersaDominante)];
        assert!(classified_to_xlsx(&records, Some("nem")).is_err());
        assert!(classified_to_xlsx(&[], None).is_ok());
    }
}
