// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The content of one cell of a survey export.
///
/// Readers produce the narrowest type they can infer: empty cells are
/// `Missing`, integral numbers are `Int`, other numbers `Float` and
/// everything else is kept verbatim as `Text`.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// The numeric reading of the cell, if it has one.
    ///
    /// Text is numeric when it parses as a float after trimming. Missing
    /// cells and free text have no numeric reading and are ignored by all
    /// the scoring policies.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) if f.is_nan() => None,
            CellValue::Float(f) => Some(*f),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| !f.is_nan()),
            CellValue::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Column {
    pub name: String,
    pub cells: Vec<CellValue>,
}

/// A survey export: one column per question, one row per response.
///
/// Invariants: column names are unique and every column holds exactly
/// `num_rows` cells. Use the [`crate::builder::TableBuilder`] to construct one.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct SurveyTable {
    pub(crate) columns: Vec<Column>,
    pub(crate) num_rows: usize,
}

impl SurveyTable {
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

// ********* Competency catalog **********

/// The kind of column a competency may own.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ColumnKind {
    /// The single "<competency> - Overall Ranking" column.
    Overall,
    SubCompetency,
    Relevance,
}

/// How the survey headers encode which competency a column belongs to.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum HeaderConvention {
    /// Headers embed the competency name and a bracketed item label, e.g.
    /// `Design and Analysis [Design Concept]` and
    /// `Relevance - Design and Analysis [Design Concept]`.
    Bracket,
    /// Headers carry a category marker (`Sub-competencies Assessment`,
    /// `Relevance Codes`) and a topic phrase; the phrase is matched against
    /// the curated fragments of each competency.
    Curated,
}

pub const OVERALL_SUFFIX: &str = " - Overall Ranking";
pub const SUB_COMPETENCY_MARKER: &str = "Sub-competencies Assessment";
pub const RELEVANCE_CODES_MARKER: &str = "Relevance Codes";
pub const RELEVANCE_PREFIX: &str = "Relevance";

/// A top-level competency and the rules to find its columns.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Competency {
    pub name: String,
    pub overall_column: String,
    /// Topic phrases used by the curated convention when the headers do not
    /// spell out the competency name.
    pub fragments: Vec<String>,
}

impl Competency {
    pub fn new(name: &str, fragments: &[&str]) -> Competency {
        Competency {
            name: name.to_string(),
            overall_column: format!("{}{}", name, OVERALL_SUFFIX),
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The ordered list of competencies that the analysis knows about.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Catalog {
    pub competencies: Vec<Competency>,
}

impl Catalog {
    /// The thirteen competencies of the facade-engineering survey, in the
    /// order they are presented.
    pub fn facade_engineering() -> Catalog {
        let competencies = vec![
            Competency::new(
                "Design and Analysis",
                &["design concept", "design development", "structural", "detailing"],
            ),
            Competency::new(
                "Performance Analysis",
                &["thermal", "acoustic", "energy", "daylight", "condensation"],
            ),
            Competency::new(
                "Technical Expertise",
                &["material", "glazing", "fabrication", "installation", "testing"],
            ),
            Competency::new(
                "Regulatory Compliance",
                &["building code", "regulation", "fire safety", "standards", "certification"],
            ),
            Competency::new(
                "Collaborate and Communication",
                &["communicat", "coordination", "stakeholder", "presentation"],
            ),
            Competency::new(
                "Self-efficacy",
                &["confidence", "problem solving", "initiative", "self-directed"],
            ),
            Competency::new(
                "Adaptability",
                &["adapt", "new technolog", "flexib"],
            ),
            Competency::new(
                "Sustainability Awareness",
                &["sustainab", "carbon", "circular", "life cycle", "environmental"],
            ),
            Competency::new(
                "Ethics and Integrity",
                &["ethic", "integrity", "professional conduct", "accountab"],
            ),
            Competency::new(
                "Project Management",
                &["schedul", "budget", "risk management", "procurement", "planning"],
            ),
            Competency::new(
                "Transformational Leadership",
                &["leadership", "mentor", "vision", "motivat"],
            ),
            Competency::new(
                "Teamwork",
                &["team", "cooperat"],
            ),
            Competency::new(
                "Intercultural Knowledge",
                &["cultur", "international", "language", "diversity"],
            ),
        ];
        Catalog { competencies }
    }

    pub fn find(&self, name: &str) -> Option<&Competency> {
        self.competencies.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.competencies.iter().map(|c| c.name.as_str()).collect()
    }
}

impl Default for Catalog {
    fn default() -> Catalog {
        Catalog::facade_engineering()
    }
}

// ********* Scoring configuration **********

/// How rank-reversal weights are averaged.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RankCounting {
    /// Counts the occurrences of 1, 2 and 3 and ignores every other value.
    ByCount,
    /// Weights every numeric cell (out-of-domain values weigh 0) and divides
    /// by the number of numeric cells.
    ByRow,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ScoringPolicy {
    RankReversal(RankCounting),
    RelevanceSplit,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Score {
    /// Rank-reversal average on the 0-3 scale.
    Weighted(f64),
    /// Percentages of core (1) and differentiator (0) answers.
    Split { core: f64, differentiator: f64 },
}

// ******** Requests *********

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum AnalysisMode {
    Overall,
    SubCompetency,
    Relevance,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ScoreOrder {
    /// The order of the competency set, then the order of the columns.
    Insertion,
    Descending,
    Ascending,
}

/// The selection made by the user for one analysis pass.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AnalysisRequest {
    pub mode: AnalysisMode,
    /// Restricts the analysis to one competency of the catalog. All the
    /// competencies are used when not provided.
    pub competency: Option<String>,
    pub convention: HeaderConvention,
    /// Overrides the default counting of the mode (by count for the overall
    /// rankings, by row for the sub-competencies).
    pub counting: Option<RankCounting>,
    pub order: ScoreOrder,
}

impl AnalysisRequest {
    pub fn new(mode: AnalysisMode) -> AnalysisRequest {
        AnalysisRequest {
            mode,
            competency: None,
            convention: HeaderConvention::Bracket,
            counting: None,
            order: ScoreOrder::Insertion,
        }
    }

    pub fn counting(&self) -> RankCounting {
        match (self.counting, self.mode) {
            (Some(c), _) => c,
            (None, AnalysisMode::SubCompetency) => RankCounting::ByRow,
            (None, _) => RankCounting::ByCount,
        }
    }
}

/// Errors that prevent an analysis from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ScoringErrors {
    UnknownCompetency(String),
    /// A row has more cells than there are columns (1-based row number).
    RaggedRow { row: usize, width: usize },
}

impl Error for ScoringErrors {}

impl Display for ScoringErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringErrors::UnknownCompetency(name) => {
                write!(f, "unknown competency {:?}", name)
            }
            ScoringErrors::RaggedRow { row, width } => {
                write!(f, "row {} has {} cells, more than the header", row, width)
            }
        }
    }
}
