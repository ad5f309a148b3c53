use log::{debug, error, info, warn};

use snafu::{prelude::*, ErrorCompat, Snafu};
use vote_concentration::compare::{compare_sources, ComparisonSummary};
use vote_concentration::mentions::{count_mentions, enrich_mentions};
use vote_concentration::summary::{describe, voting_type_frequencies};
use vote_concentration::*;

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::args::Args;
use crate::vgeo::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod io_export;

#[derive(Debug, Snafu)]
pub enum VgeoError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet or no header row in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("{path}: row {lineno}, column {column}: cannot read cell {content}"))]
    ExcelWrongCellType {
        path: String,
        lineno: u64,
        column: usize,
        content: String,
    },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("{path}: failed to parse line {lineno}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: u64,
    },
    #[snafu(display("Failed to write a CSV table"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("{path}: line {lineno} is too short"))]
    LineTooShort { path: String, lineno: u64 },
    #[snafu(display("{path}: line {lineno} is not valid UTF-8"))]
    InvalidUtf8 {
        source: std::str::Utf8Error,
        path: String,
        lineno: u64,
    },
    #[snafu(display("{path}: missing column {column}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("{path}: line {lineno}: invalid count {content:?}"))]
    InvalidCount {
        path: String,
        lineno: u64,
        content: String,
    },
    #[snafu(display("Invalid separator {separator:?}: a single character is expected"))]
    InvalidSeparator { separator: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the configuration {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error opening the reference {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Failed to build the Excel workbook"))]
    WritingExcel { source: rust_xlsxwriter::XlsxError },
    #[snafu(display("Analysis of the source {data_source} failed"))]
    Analysis {
        source: AnalysisErrors,
        data_source: String,
    },
    #[snafu(display("The classified table differs from the reference {path}"))]
    ReferenceMismatch { path: String },
    #[snafu(display("The configuration file has no parent directory"))]
    MissingParentDir {},
    #[snafu(display("No input: pass --config or --input"))]
    MissingInput {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type VgeoResult<T> = Result<T, VgeoError>;

#[derive(PartialEq, Debug, Clone)]
pub enum SourceOutcome {
    Completed { candidates: usize, warnings: usize },
    Aborted { reason: String },
}

/// What happened to each source of a configuration.
#[derive(PartialEq, Debug, Clone)]
pub struct RunReport {
    pub output_directory: PathBuf,
    pub outcomes: Vec<(String, SourceOutcome)>,
    pub comparison: Option<ComparisonSummary>,
    /// Failures of the steps that follow the sources: mention counting and
    /// the comparison.
    pub errors: Vec<String>,
}

impl RunReport {
    pub fn all_completed(&self) -> bool {
        self.errors.is_empty()
            && self
                .outcomes
                .iter()
                .all(|(_, o)| matches!(o, SourceOutcome::Completed { .. }))
    }
}

/// The files written for one source, rendered before anything touches the
/// disk.
struct SourceOutputs {
    classified: String,
    files: Vec<(&'static str, Vec<u8>)>,
}

fn read_vote_table(
    path: &str,
    provider: &str,
    layout: &TableLayout,
    data_source: DataSource,
) -> VgeoResult<Vec<VoteRecord>> {
    info!(
        "Attempting to read {} table {:?} (provider {})",
        data_source, path, provider
    );
    match provider {
        "csv" => io_csv::read_csv_votes(path, layout, data_source),
        "xlsx" => io_excel::read_excel_votes(path, layout, data_source),
        x => whatever!("Provider not implemented {:?}: use csv or xlsx", x),
    }
}

fn resolve_input(
    root: &Path,
    cfs: &FileSource,
    data_source: DataSource,
    mentions_path: Option<&Path>,
) -> VgeoResult<String> {
    let p: PathBuf = match (&cfs.file_path, data_source, mentions_path) {
        (Some(fp), _, _) => root.join(fp),
        (None, DataSource::Twitter, Some(mp)) => mp.to_path_buf(),
        (None, DataSource::Twitter, None) => {
            whatever!("The twitter source has no filePath and no mention counts were produced")
        }
        (None, DataSource::Tse, _) => whatever!("The tse source has no filePath"),
    };
    Ok(p.display().to_string())
}

fn analyze_source(
    root: &Path,
    cfs: &FileSource,
    rules: &Option<ClassifierRules>,
    mentions_path: Option<&Path>,
) -> VgeoResult<(Vec<VoteRecord>, AnalysisResult)> {
    let data_source = DataSource::parse(&cfs.data_source).context(AnalysisSnafu {
        data_source: cfs.data_source.as_str(),
    })?;
    let layout = cfs.layout(data_source)?;
    let analysis_rules = validate_rules(rules, data_source)?;
    let path = resolve_input(root, cfs, data_source, mentions_path)?;
    let rows = read_vote_table(&path, cfs.provider(), &layout, data_source)?;
    let result = vote_concentration::run_analysis(&rows, &analysis_rules).context(AnalysisSnafu {
        data_source: data_source.name(),
    })?;
    Ok((rows, result))
}

fn render_outputs(
    result: &AnalysisResult,
    settings: Option<&OutputSettings>,
) -> VgeoResult<SourceOutputs> {
    let classified = io_export::classified_to_csv(&result.classified)?;
    let frequencies =
        io_export::frequencies_to_csv(&voting_type_frequencies(&result.classified))?;
    let statistics = io_export::statistics_to_csv(&describe(&result.classified))?;
    let mut files: Vec<(&'static str, Vec<u8>)> = vec![
        ("voting_types.csv", classified.clone().into_bytes()),
        ("voting_type_frequencies.csv", frequencies.into_bytes()),
        ("statistics.csv", statistics.into_bytes()),
    ];
    if let Some(s) = settings.filter(|s| s.generate_excel()) {
        let group_by = s.excel_group_by.as_deref();
        files.push((
            "voting_types.xlsx",
            io_export::classified_to_xlsx(&result.classified, group_by)?,
        ));
    }
    Ok(SourceOutputs { classified, files })
}

fn check_reference(produced: &str, reference_path: &str) -> VgeoResult<()> {
    let reference = fs::read_to_string(reference_path).context(OpeningReferenceSnafu {
        path: reference_path,
    })?;
    let reference = reference.replace("\r\n", "\n");
    debug!("check_reference: reference: {:?}", reference);
    if reference != produced {
        warn!("Found differences with the reference {}", reference_path);
        print_diff(reference.as_str(), produced, "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("The classified table matches the reference {}", reference_path);
    Ok(())
}

/// Writes all the files of a source, or none: the files already written are
/// removed if a later one fails.
fn write_outputs(dir: &Path, outputs: &SourceOutputs) -> VgeoResult<()> {
    let mut written: Vec<PathBuf> = Vec::new();
    for (name, content) in outputs.files.iter() {
        let path = dir.join(name);
        if let Err(e) = io_export::write_file(&path, content) {
            for p in written.iter() {
                debug!("write_outputs: removing {}", p.display());
                if let Err(re) = fs::remove_file(p) {
                    warn!("Could not remove {}: {}", p.display(), re);
                }
            }
            return Err(e);
        }
        written.push(path);
    }
    info!("Wrote the tables of the source to {}", dir.display());
    Ok(())
}

/// Runs one source from reading to writing. Nothing is written if any step
/// fails.
fn run_source(
    root: &Path,
    out_dir: &Path,
    cfs: &FileSource,
    rules: &Option<ClassifierRules>,
    settings: Option<&OutputSettings>,
    mentions_path: Option<&Path>,
) -> VgeoResult<(Vec<VoteRecord>, AnalysisResult)> {
    let (rows, result) = analyze_source(root, cfs, rules, mentions_path)?;
    let outputs = render_outputs(&result, settings)?;
    if let Some(reference) = &cfs.expected_output {
        let p = root.join(reference).display().to_string();
        check_reference(&outputs.classified, &p)?;
    }
    write_outputs(&out_dir.join(result.data_source.name()), &outputs)?;
    Ok((rows, result))
}

/// Counts the mentions of the official locations in the posts and writes the
/// table read by the `twitter` source.
fn count_city_mentions(
    root: &Path,
    out_dir: &Path,
    settings: &MentionSettings,
    official: &AnalysisResult,
    official_rows: &[VoteRecord],
) -> VgeoResult<PathBuf> {
    let posts_path = root.join(&settings.posts_file_path).display().to_string();
    let posts = io_csv::read_csv_posts(
        &posts_path,
        settings.separator()?,
        settings.candidate_column(),
        settings.content_column(),
    )?;
    let counts = count_mentions(&posts, &official.locations);
    let records = enrich_mentions(&counts, official_rows);
    let output = out_dir.join(settings.output_file_path());
    io_export::write_text(&output, &io_export::mentions_to_csv(&records)?)?;
    info!(
        "Wrote {} mention counts to {}",
        records.len(),
        output.display()
    );
    Ok(output)
}

/// Runs all the sources of a configuration file.
///
/// The official source runs first. A source that fails is reported in the
/// outcome and does not prevent the other sources from running. An error is
/// only returned when the configuration itself cannot be used.
pub fn run_config(config_path: &str, out_override: Option<String>) -> VgeoResult<RunReport> {
    let config = read_config(config_path)?;
    info!("config: {:?}", config);
    if config.sources.is_empty() {
        whatever!("No source in the configuration {}", config_path);
    }
    if let Some(o) = &config.output_settings {
        o.validate()?;
    }

    let root_p = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu {})?;
    let out_dir: PathBuf = match out_override {
        Some(o) => PathBuf::from(o),
        None => root_p.join(
            config
                .output_settings
                .as_ref()
                .and_then(|o| o.output_directory.clone())
                .unwrap_or_else(|| "output".to_string()),
        ),
    };
    info!("Output directory: {}", out_dir.display());

    let mut sources: Vec<&FileSource> = config.sources.iter().collect();
    sources.sort_by_key(|s| s.data_source != DataSource::Tse.name());

    let mut outcomes: Vec<(String, SourceOutcome)> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut mentions_path: Option<PathBuf> = None;
    let mut official: Option<Vec<ClassifiedRecord>> = None;
    let mut mentioned: Option<Vec<ClassifiedRecord>> = None;
    for cfs in sources {
        let res = run_source(
            root_p,
            &out_dir,
            cfs,
            &config.rules,
            config.output_settings.as_ref(),
            mentions_path.as_deref(),
        );
        let outcome = match res {
            Ok((rows, result)) => {
                let outcome = SourceOutcome::Completed {
                    candidates: result.classified.len(),
                    warnings: result.warnings.count(),
                };
                if result.data_source == DataSource::Tse {
                    if result.locations.is_empty() {
                        warn!("No location in the official table, skipping the mentions");
                    } else if let Some(settings) = &config.mentions {
                        match count_city_mentions(root_p, &out_dir, settings, &result, &rows) {
                            Ok(p) => mentions_path = Some(p),
                            Err(e) => {
                                error!("Counting the mentions failed: {}", e);
                                errors.push(format!("mentions: {}", e));
                            }
                        }
                    }
                }
                match result.data_source {
                    DataSource::Tse => official = Some(result.classified),
                    DataSource::Twitter => mentioned = Some(result.classified),
                }
                outcome
            }
            Err(e) => {
                error!("Source {} aborted: {}", cfs.data_source, e);
                if let Some(bt) = ErrorCompat::backtrace(&e) {
                    debug!("trace: {}", bt);
                }
                SourceOutcome::Aborted {
                    reason: e.to_string(),
                }
            }
        };
        outcomes.push((cfs.data_source.clone(), outcome));
    }

    let comparison = match (&official, &mentioned) {
        (Some(tse), Some(twitter)) => {
            let (rows, summary) = compare_sources(tse, twitter);
            let path = out_dir.join("comparison.csv");
            let written = io_export::comparison_to_csv(&rows)
                .and_then(|content| io_export::write_text(&path, &content));
            if let Err(e) = written {
                error!("Writing the comparison failed: {}", e);
                errors.push(format!("comparison: {}", e));
            }
            Some(summary)
        }
        _ => {
            info!("Skipping the comparison: both sources are needed");
            None
        }
    };

    Ok(RunReport {
        output_directory: out_dir,
        outcomes,
        comparison,
        errors,
    })
}

/// Runs a single table passed on the command line.
pub fn run_single(args: &Args) -> VgeoResult<()> {
    let input = args.input.clone().context(MissingInputSnafu {})?;
    let cfs = FileSource {
        data_source: args
            .data_source
            .clone()
            .unwrap_or_else(|| DataSource::Tse.name().to_string()),
        provider: args.input_type.clone(),
        file_path: Some(input),
        separator: args.separator.clone(),
        encoding: None,
        excel_worksheet_name: args.excel_worksheet_name.clone(),
        columns: None,
        elected_label: None,
        expected_output: args.reference.clone(),
    };
    let (_, result) = analyze_source(Path::new(""), &cfs, &None, None)?;
    let outputs = render_outputs(&result, None)?;
    if let Some(reference) = &cfs.expected_output {
        check_reference(&outputs.classified, reference)?;
    }
    match args.out.as_deref() {
        None | Some("stdout") => print!("{}", outputs.classified),
        Some(dir) => write_outputs(Path::new(dir), &outputs)?,
    }
    Ok(())
}

#[cfg(test)]
fn run_config_test(test_name: &str, config_lpath: &str) -> (RunReport, tempfile::TempDir) {
    let test_dir = option_env!("VGEO_TEST_DIR").unwrap_or(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/testdata"
    ));
    info!("Running test {}", test_name);
    let out = tempfile::tempdir().unwrap();
    let res = run_config(
        &format!("{}/{}/{}", test_dir, test_name, config_lpath),
        Some(out.path().display().to_string()),
    );
    match res {
        Ok(report) => {
            for (source, outcome) in report.outcomes.iter() {
                if let SourceOutcome::Aborted { reason } = outcome {
                    eprintln!("Source {} aborted: {}", source, reason);
                }
            }
            for e in report.errors.iter() {
                eprintln!("Step failed: {}", e);
            }
            assert!(report.all_completed());
            (report, out)
        }
        Err(e) => {
            eprintln!("An error occured {}", e);
            panic!("test {} failed: {:?}", test_name, e);
        }
    }
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) -> (RunReport, tempfile::TempDir) {
    run_config_test(test_name, format!("{}_config.json", test_name).as_str())
}
