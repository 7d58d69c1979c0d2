use log::{debug, info, warn};

pub use competency_scoring::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Reader, Xlsx};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::survey::config_reader::*;
use crate::survey::io_common::simplify_file_name;
use crate::survey::render::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
pub mod render;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet or no header row in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Could not parse line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Invalid survey table in {path}"))]
    InvalidTable {
        source: ScoringErrors,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Could not process JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Unknown value {value:?} for option {option}"))]
    UnknownOption { option: String, value: String },
    #[snafu(display("Analysis failed"))]
    Analysis { source: ScoringErrors },
    #[snafu(display("Difference detected between computed summary and reference summary {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

/// The message shown to the user: the error followed by its causes.
pub fn error_message(e: &SurveyError) -> String {
    let mut msg = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(s) = source {
        msg.push_str(": ");
        msg.push_str(&s.to_string());
        source = s.source();
    }
    msg
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Csv,
    Excel,
}

/// Everything needed for one analysis pass, resolved from the command line
/// and the configuration file.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyOptions {
    pub input_path: String,
    pub input_type: InputType,
    pub worksheet: Option<String>,
    pub catalog: Catalog,
    pub plan: CoercionPlan,
    pub request: AnalysisRequest,
    pub chart_style: ChartStyle,
    pub chart_format: ChartFormat,
    pub out: Option<String>,
    pub reference: Option<String>,
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .collect::<String>()
        .to_lowercase()
}

fn parse_choice<T: Copy>(option: &str, value: &str, choices: &[(&str, T)]) -> SurveyResult<T> {
    let v = normalize(value);
    choices
        .iter()
        .find(|(name, _)| *name == v)
        .map(|(_, t)| *t)
        .context(UnknownOptionSnafu { option, value })
}

fn parse_input_type(s: &str) -> SurveyResult<InputType> {
    parse_choice(
        "input-type",
        s,
        &[
            ("csv", InputType::Csv),
            ("xlsx", InputType::Excel),
            ("excel", InputType::Excel),
        ],
    )
}

fn parse_mode(s: &str) -> SurveyResult<AnalysisMode> {
    parse_choice(
        "mode",
        s,
        &[
            ("overall", AnalysisMode::Overall),
            ("subcompetency", AnalysisMode::SubCompetency),
            ("byarea", AnalysisMode::SubCompetency),
            ("relevance", AnalysisMode::Relevance),
        ],
    )
}

fn parse_convention(s: &str) -> SurveyResult<HeaderConvention> {
    parse_choice(
        "convention",
        s,
        &[
            ("bracket", HeaderConvention::Bracket),
            ("curated", HeaderConvention::Curated),
        ],
    )
}

fn parse_counting(s: &str) -> SurveyResult<RankCounting> {
    parse_choice(
        "counting",
        s,
        &[
            ("bycount", RankCounting::ByCount),
            ("byrow", RankCounting::ByRow),
        ],
    )
}

fn parse_order(s: &str) -> SurveyResult<ScoreOrder> {
    parse_choice(
        "sort",
        s,
        &[
            ("none", ScoreOrder::Insertion),
            ("descending", ScoreOrder::Descending),
            ("ascending", ScoreOrder::Ascending),
        ],
    )
}

fn parse_chart_style(s: &str) -> SurveyResult<ChartStyle> {
    parse_choice("chart", s, &[("bar", ChartStyle::Bar), ("pie", ChartStyle::Pie)])
}

fn parse_chart_format(s: &str) -> SurveyResult<ChartFormat> {
    parse_choice(
        "chart-format",
        s,
        &[("text", ChartFormat::Text), ("json", ChartFormat::Json)],
    )
}

fn mode_name(m: AnalysisMode) -> &'static str {
    match m {
        AnalysisMode::Overall => "overall",
        AnalysisMode::SubCompetency => "subCompetency",
        AnalysisMode::Relevance => "relevance",
    }
}

fn convention_name(c: HeaderConvention) -> &'static str {
    match c {
        HeaderConvention::Bracket => "bracket",
        HeaderConvention::Curated => "curated",
    }
}

fn counting_name(c: RankCounting) -> &'static str {
    match c {
        RankCounting::ByCount => "byCount",
        RankCounting::ByRow => "byRow",
    }
}

fn order_name(o: ScoreOrder) -> &'static str {
    match o {
        ScoreOrder::Insertion => "none",
        ScoreOrder::Descending => "descending",
        ScoreOrder::Ascending => "ascending",
    }
}

/// Reads the configuration file, if any, with the directory that relative
/// paths are resolved against.
fn load_config(args: &Args) -> SurveyResult<(SurveyConfig, Option<PathBuf>)> {
    match &args.config {
        Some(path) => {
            info!("Reading configuration {:?}", path);
            let config = read_config(path)?;
            let root = Path::new(path).parent().map(|p| p.to_path_buf());
            Ok((config, root))
        }
        None => Ok((SurveyConfig::default(), None)),
    }
}

impl SurveyOptions {
    pub fn from_args(args: &Args) -> SurveyResult<SurveyOptions> {
        let (config, root) = load_config(args)?;
        let source = config.input.clone();

        let input_path = match (&args.input, &source, &root) {
            (Some(p), _, _) => p.clone(),
            (None, Some(s), Some(root_p)) => root_p.join(&s.file_path).display().to_string(),
            (None, Some(s), None) => s.file_path.clone(),
            (None, None, _) => {
                whatever!("No input file: use --input or a configuration file with an input section")
            }
        };

        let input_type = match args
            .input_type
            .clone()
            .or_else(|| source.as_ref().and_then(|s| s.provider.clone()))
        {
            Some(t) => parse_input_type(&t)?,
            None => io_common::guess_input_type(&input_path),
        };

        let worksheet = args
            .excel_worksheet_name
            .clone()
            .or_else(|| source.as_ref().and_then(|s| s.excel_worksheet_name.clone()));

        let convention = match args.convention.clone().or_else(|| config.convention.clone()) {
            Some(c) => parse_convention(&c)?,
            None => HeaderConvention::Bracket,
        };

        let counting = match args.counting.clone().or_else(|| config.counting.clone()) {
            Some(c) => Some(parse_counting(&c)?),
            None => None,
        };

        let mode = match &args.mode {
            Some(m) => parse_mode(m)?,
            None => AnalysisMode::Overall,
        };

        let order = match &args.sort {
            Some(s) => parse_order(s)?,
            None => ScoreOrder::Insertion,
        };

        let request = AnalysisRequest {
            mode,
            competency: args.competency.clone(),
            convention,
            counting,
            order,
        };

        let chart_style = match &args.chart {
            Some(c) => parse_chart_style(c)?,
            None => ChartStyle::Bar,
        };
        let chart_format = match &args.chart_format {
            Some(c) => parse_chart_format(c)?,
            None => ChartFormat::Text,
        };

        Ok(SurveyOptions {
            input_path,
            input_type,
            worksheet,
            catalog: config.catalog(),
            plan: config.coercion_plan(),
            request,
            chart_style,
            chart_format,
            out: args.out.clone(),
            reference: args.reference.clone(),
        })
    }
}

/// Reads the survey file and coerces it.
pub fn load_table(opts: &SurveyOptions) -> SurveyResult<SurveyTable> {
    info!(
        "Attempting to read survey file {:?} ({:?})",
        opts.input_path, opts.input_type
    );
    let raw = match opts.input_type {
        InputType::Csv => io_csv::read_csv_table(&opts.input_path),
        InputType::Excel => io_excel::read_excel_table(&opts.input_path, opts.worksheet.as_deref()),
    }?;
    let table = coerce_table(&raw, &opts.catalog, opts.request.convention, &opts.plan);
    debug!("load_table: coerced {} columns", table.columns().len());
    Ok(table)
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

fn results_to_json(analysis: &Analysis) -> Vec<JSValue> {
    match analysis {
        Analysis::Scores(scores) => scores
            .entries
            .iter()
            .map(|(label, score)| json!({"label": label, "score": round4(*score)}))
            .collect(),
        Analysis::Relevance(rb) => rb
            .labels
            .iter()
            .zip(rb.core.iter().zip(rb.differentiator.iter()))
            .map(|(label, (core, diff))| {
                json!({
                    "label": label,
                    "core": round4(*core),
                    "differentiator": round4(*diff),
                })
            })
            .collect(),
    }
}

fn build_summary_js(opts: &SurveyOptions, table: &SurveyTable, analysis: &Analysis) -> JSValue {
    let (counting, order) = match opts.request.mode {
        AnalysisMode::Relevance => (JSValue::Null, JSValue::Null),
        _ => (
            json!(counting_name(opts.request.counting())),
            json!(order_name(opts.request.order)),
        ),
    };
    json!({
        "config": {
            "input": simplify_file_name(&opts.input_path),
            "mode": mode_name(opts.request.mode),
            "competency": opts.request.competency,
            "convention": convention_name(opts.request.convention),
            "counting": counting,
            "order": order,
            "responses": table.num_rows(),
        },
        "results": results_to_json(analysis),
    })
}

/// The outcome of one analysis pass.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyReport {
    pub analysis: Analysis,
    pub summary: JSValue,
}

pub fn analyze(opts: &SurveyOptions) -> SurveyResult<SurveyReport> {
    let table = load_table(opts)?;
    let analysis = aggregate(&table, &opts.catalog, &opts.request).context(AnalysisSnafu {})?;
    info!("analysis: {:?}", analysis);
    let summary = build_summary_js(opts, &table, &analysis);
    Ok(SurveyReport { analysis, summary })
}

fn draw<R: ChartRenderer>(renderer: &mut R, chart: Option<&Chart>, what: &str) -> SurveyResult<()> {
    match chart {
        Some(c) => renderer.render(c),
        None => renderer.nothing_to_show(what),
    }
}

fn check_reference(reference_path: &str, pretty_js_stats: &str) -> SurveyResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    Ok(())
}

pub fn run_survey(opts: &SurveyOptions) -> SurveyResult<()> {
    let report = analyze(opts)?;

    let what = opts
        .request
        .competency
        .clone()
        .unwrap_or_else(|| "this survey".to_string());
    let chart = chart_for(&report.analysis, &opts.request, opts.chart_style);
    match opts.chart_format {
        ChartFormat::Text => {
            let stdout = std::io::stdout();
            let mut renderer = TextRenderer::new(stdout.lock());
            draw(&mut renderer, chart.as_ref(), &what)?;
        }
        ChartFormat::Json => {
            let mut renderer = JsonRenderer::default();
            draw(&mut renderer, chart.as_ref(), &what)?;
            for c in renderer.charts.iter() {
                let s = serde_json::to_string_pretty(c).context(ParsingJsonSnafu {})?;
                println!("{}", s);
            }
        }
    }

    let pretty_js_stats =
        serde_json::to_string_pretty(&report.summary).context(ParsingJsonSnafu {})?;
    match opts.out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(p) if !p.is_empty() => {
            info!("Writing summary to {:?}", p);
            fs::write(p, &pretty_js_stats).context(WritingOutputSnafu { path: p })?;
        }
        _ => {}
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &opts.reference {
        check_reference(reference_path, &pretty_js_stats)?;
    }
    Ok(())
}

pub fn run(args: &Args) -> SurveyResult<()> {
    let opts = SurveyOptions::from_args(args)?;
    debug!("options: {:?}", opts);
    run_survey(&opts)
}

/// Prints the competencies known to the analysis and their overall column.
pub fn list_competencies(args: &Args) -> SurveyResult<()> {
    let (config, _) = load_config(args)?;
    let stdout = std::io::stdout();
    write_catalog(&config.catalog(), &mut stdout.lock())
}

fn write_catalog<W: Write>(catalog: &Catalog, out: &mut W) -> SurveyResult<()> {
    for c in catalog.competencies.iter() {
        writeln!(out, "{} ({:?})", c.name, c.overall_column)
            .context(WritingOutputSnafu { path: "stdout" })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_path(name: &str) -> String {
        let p: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "data", name]
            .iter()
            .collect();
        p.as_path().display().to_string()
    }

    fn fixture_args(config_name: &str, mode: &str, competency: Option<&str>) -> Args {
        Args {
            config: Some(test_path(config_name)),
            input: None,
            input_type: None,
            excel_worksheet_name: None,
            mode: Some(mode.to_string()),
            competency: competency.map(|s| s.to_string()),
            convention: None,
            counting: None,
            sort: None,
            chart: None,
            chart_format: None,
            out: None,
            reference: None,
            list_competencies: false,
            verbose: false,
        }
    }

    fn scores_of(args: &Args) -> LabeledScores {
        let opts = SurveyOptions::from_args(args).unwrap();
        match analyze(&opts).unwrap().analysis {
            Analysis::Scores(s) => s,
            x => panic!("expected scores, got {:?}", x),
        }
    }

    fn relevance_of(args: &Args) -> RelevanceBreakdown {
        let opts = SurveyOptions::from_args(args).unwrap();
        match analyze(&opts).unwrap().analysis {
            Analysis::Relevance(r) => r,
            x => panic!("expected relevance, got {:?}", x),
        }
    }

    #[test]
    fn options_resolve_against_the_config_directory() {
        let args = fixture_args("bracket_survey_config.json", "by-area", None);
        let opts = SurveyOptions::from_args(&args).unwrap();
        assert_eq!(opts.input_path, test_path("bracket_survey.csv"));
        assert_eq!(opts.input_type, InputType::Csv);
        assert_eq!(opts.request.mode, AnalysisMode::SubCompetency);
        assert_eq!(opts.request.counting(), RankCounting::ByRow);
    }

    #[test]
    fn bracket_overall_matches_reference() {
        let mut args = fixture_args("bracket_survey_config.json", "overall", None);
        args.reference = Some(test_path("bracket_survey_overall_expected_summary.json"));
        let opts = SurveyOptions::from_args(&args).unwrap();
        run_survey(&opts).unwrap();
    }

    #[test]
    fn bracket_overall_scores() {
        let args = fixture_args("bracket_survey_config.json", "overall", None);
        let scores = scores_of(&args);
        assert_eq!(
            scores.labels(),
            vec!["Design and Analysis", "Performance Analysis", "Teamwork"]
        );
        assert_eq!(scores.get("Performance Analysis"), Some(2.0));
        assert_eq!(scores.get("Design and Analysis"), Some(11.0 / 6.0));
    }

    #[test]
    fn bracket_overall_descending() {
        let mut args = fixture_args("bracket_survey_config.json", "overall", None);
        args.sort = Some("descending".to_string());
        assert_eq!(
            scores_of(&args).labels(),
            vec!["Performance Analysis", "Design and Analysis", "Teamwork"]
        );
        args.sort = Some("ascending".to_string());
        assert_eq!(
            scores_of(&args).labels(),
            vec!["Teamwork", "Design and Analysis", "Performance Analysis"]
        );
    }

    #[test]
    fn bracket_sub_competencies() {
        let args = fixture_args(
            "bracket_survey_config.json",
            "sub-competency",
            Some("Design and Analysis"),
        );
        let scores = scores_of(&args);
        assert_eq!(scores.labels(), vec!["Design Concept", "Structural Analysis"]);
        assert_eq!(scores.get("Design Concept"), Some(2.0));
        assert_eq!(scores.get("Structural Analysis"), Some(8.0 / 5.0));
    }

    #[test]
    fn bracket_sub_competencies_by_count() {
        let mut args = fixture_args(
            "bracket_survey_config.json",
            "sub-competency",
            Some("Design and Analysis"),
        );
        args.counting = Some("by-count".to_string());
        let scores = scores_of(&args);
        // 2, 2, 1, 3 once the 5 is ignored
        assert_eq!(scores.get("Structural Analysis"), Some(2.0));
    }

    #[test]
    fn bracket_relevance() {
        let args = fixture_args(
            "bracket_survey_config.json",
            "relevance",
            Some("Design and Analysis"),
        );
        let rb = relevance_of(&args);
        assert_eq!(rb.labels, vec!["Design Concept", "Structural Analysis"]);
        assert_eq!(rb.core, vec![60.0, 20.0]);
        assert_eq!(rb.differentiator, vec![40.0, 80.0]);
    }

    #[test]
    fn competency_without_columns_shows_nothing() {
        let args = fixture_args("bracket_survey_config.json", "relevance", Some("Teamwork"));
        let opts = SurveyOptions::from_args(&args).unwrap();
        let report = analyze(&opts).unwrap();
        assert!(report.analysis.is_empty());
        assert_eq!(report.summary["results"], json!([]));
        run_survey(&opts).unwrap();
    }

    #[test]
    fn curated_headers() {
        let args = fixture_args(
            "curated_survey_config.json",
            "sub-competency",
            Some("Design and Analysis"),
        );
        let scores = scores_of(&args);
        assert_eq!(
            scores.labels(),
            vec!["Structural calculations", "Façade detailing"]
        );
        assert_eq!(scores.get("Structural calculations"), Some(2.0));
        assert_eq!(scores.get("Façade detailing"), Some(7.0 / 3.0));

        let args = fixture_args(
            "curated_survey_config.json",
            "sub-competency",
            Some("Performance Analysis"),
        );
        assert_eq!(scores_of(&args).labels(), vec!["Thermal modelling"]);

        let args = fixture_args(
            "curated_survey_config.json",
            "relevance",
            Some("Design and Analysis"),
        );
        let rb = relevance_of(&args);
        assert_eq!(rb.labels, vec!["Structural calculations"]);
        assert_eq!(rb.core, vec![200.0 / 3.0]);
    }

    #[test]
    fn reference_mismatch_is_an_error() {
        let mut args = fixture_args("bracket_survey_config.json", "overall", None);
        args.sort = Some("descending".to_string());
        args.reference = Some(test_path("bracket_survey_overall_expected_summary.json"));
        let opts = SurveyOptions::from_args(&args).unwrap();
        let res = run_survey(&opts);
        assert!(matches!(res, Err(SurveyError::ReferenceMismatch { .. })));
    }

    #[test]
    fn bad_options_are_reported() {
        let args = fixture_args("bracket_survey_config.json", "histogram", None);
        let err = SurveyOptions::from_args(&args).unwrap_err();
        assert!(matches!(err, SurveyError::UnknownOption { .. }));
        assert_eq!(
            error_message(&err),
            "Unknown value \"histogram\" for option mode"
        );
    }

    #[test]
    fn unknown_competency_is_reported() {
        let args = fixture_args("bracket_survey_config.json", "relevance", Some("Juggling"));
        let opts = SurveyOptions::from_args(&args).unwrap();
        let err = analyze(&opts).unwrap_err();
        assert_eq!(
            error_message(&err),
            "Analysis failed: unknown competency \"Juggling\""
        );
    }

    #[test]
    fn catalog_listing() {
        let mut args = fixture_args("bracket_survey_config.json", "overall", None);
        args.list_competencies = true;
        let (config, _) = load_config(&args).unwrap();
        let mut out: Vec<u8> = Vec::new();
        write_catalog(&config.catalog(), &mut out).unwrap();
        let listing = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(
            lines[0],
            "Design and Analysis (\"Design and Analysis - Overall Ranking\")"
        );
        assert_eq!(lines[11], "Teamwork (\"Teamwork - Overall Ranking\")");
        list_competencies(&args).unwrap();
    }

    #[test]
    fn catalog_listing_follows_the_config() {
        let catalog = Catalog {
            competencies: vec![Competency::new("Glass Art", &["glass"])],
        };
        let mut out: Vec<u8> = Vec::new();
        write_catalog(&catalog, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Glass Art (\"Glass Art - Overall Ranking\")\n"
        );
    }

    #[test]
    fn excel_input_end_to_end() {
        let mut args = fixture_args("bracket_survey_config.json", "overall", None);
        args.config = None;
        args.input = Some(test_path("bracket_survey.xlsx"));
        let opts = SurveyOptions::from_args(&args).unwrap();
        assert_eq!(opts.input_type, InputType::Excel);
        let scores = scores_of(&args);
        assert_eq!(scores.labels(), vec!["Design and Analysis", "Teamwork"]);
        assert_eq!(scores.get("Design and Analysis"), Some(11.0 / 6.0));
        assert_eq!(scores.get("Teamwork"), Some(10.0 / 6.0));

        args.mode = Some("sub-competency".to_string());
        args.competency = Some("Design and Analysis".to_string());
        args.excel_worksheet_name = Some("Responses".to_string());
        // weights 3, 1, 1, 3, 2 over five answers
        assert_eq!(scores_of(&args).get("Design Concept"), Some(2.0));
    }

    #[test]
    fn missing_input_is_reported() {
        let mut args = fixture_args("bracket_survey_config.json", "overall", None);
        args.config = None;
        let err = SurveyOptions::from_args(&args).unwrap_err();
        assert!(matches!(err, SurveyError::Whatever { .. }));
    }
}
