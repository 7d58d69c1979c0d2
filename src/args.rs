use clap::Parser;

/// This is a scoring program for competency surveys.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the survey input and the scoring options.
    /// Options given on the command line take precedence over the file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The survey export (CSV or Excel).
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. Guessed from the file extension when not provided.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (default: the first worksheet) When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (overall, sub-competency or relevance; default overall) The analysis to run.
    /// `by-area` is accepted as another name for sub-competency.
    #[clap(short, long, value_parser)]
    pub mode: Option<String>,

    /// (competency name, optional) Restricts the analysis to one competency of the catalog.
    #[clap(long, value_parser)]
    pub competency: Option<String>,

    /// (bracket or curated; default bracket) How the survey headers name the competencies.
    #[clap(long, value_parser)]
    pub convention: Option<String>,

    /// (by-count or by-row) How the rank weights are averaged. The default is by-count for
    /// the overall rankings and by-row for the sub-competencies.
    #[clap(long, value_parser)]
    pub counting: Option<String>,

    /// (none, descending or ascending; default none) The order of the scores.
    #[clap(long, value_parser)]
    pub sort: Option<String>,

    /// (bar or pie; default bar) The chart drawn for single-series results.
    #[clap(long, value_parser)]
    pub chart: Option<String>,

    /// (text or json; default text) How the chart is printed on the standard output. The json
    /// format describes the chart for an external dashboard.
    #[clap(long, value_parser)]
    pub chart_format: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the analysis will be written in JSON
    /// format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the expected summary in JSON format. If provided,
    /// compscore will check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, prints the known competencies and exits.
    #[clap(long, takes_value = false)]
    pub list_competencies: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
