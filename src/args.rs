use clap::Parser;

/// Concentration indices of the votes and of the social media mentions of
/// candidates across municipalities.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the sources to analyze. All the other
    /// options except --out and --verbose are ignored when it is provided.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference classified table in CSV format. If provided, vgeo checks that
    /// the produced table matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (directory, 'stdout' or empty) Where to write the tables. Overrides the output directory
    /// of the --config file. Without --config, the classified table is printed to the standard
    /// output by default.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The table of counts to analyze, when no --config is given.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default tse) The meaning of the counts: tse (votes) or twitter (mentions).
    #[clap(long, value_parser)]
    pub data_source: Option<String>,

    /// (one character) The separator of the CSV input. Defaults to ';' for tse and ',' for
    /// twitter.
    #[clap(long, value_parser)]
    pub separator: Option<String>,

    /// (default: the first one) When using an Excel file, indicates the name of the worksheet
    /// to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
