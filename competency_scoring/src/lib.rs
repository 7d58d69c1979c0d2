/*!
Weighted scoring of facade-engineering competency surveys.

The library takes a survey export already loaded as a [`SurveyTable`],
finds the columns of each competency from the header conventions, and
computes rank-reversal scores (on a 0-3 scale, higher is better) or
relevance percentages. It does no I/O; see the `compscore` binary for the
readers and the renderers.

```
use competency_scoring::builder::TableBuilder;
use competency_scoring::*;

let headers = vec!["Teamwork - Overall Ranking".to_string()];
let mut builder = TableBuilder::new(&headers);
for rank in ["Rank 1", "Rank 1", "Rank 3"] {
    builder.add_row_simple(&[rank])?;
}
let table = coerce_table(
    &builder.build(),
    &Catalog::default(),
    HeaderConvention::Bracket,
    &CoercionPlan::default(),
);

let analysis = aggregate(&table, &Catalog::default(), &AnalysisRequest::new(AnalysisMode::Overall))?;
if let Analysis::Scores(scores) = analysis {
    assert_eq!(scores.get("Teamwork"), Some(7.0 / 3.0));
}
# Ok::<(), ScoringErrors>(())
```
*/

pub mod builder;
pub mod coercion;
mod config;
pub mod manual;
pub mod resolver;
pub mod scorer;

use log::{debug, info, warn};
use std::cmp::Ordering;

pub use crate::coercion::{coerce_table, Coercion, CoercionPlan, LabelMapping};
pub use crate::config::*;
pub use crate::resolver::{display_label, resolve};

// ******** Output data structures *********

/// An ordered mapping from display label to score.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct LabeledScores {
    pub entries: Vec<(String, f64)>,
}

impl LabeledScores {
    /// Inserts a score. An existing label keeps its position and takes the
    /// new value.
    pub fn insert(&mut self, label: String, score: f64) {
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = score,
            None => self.entries.push((label, score)),
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, s)| *s)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|(l, _)| l.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, s)| *s).collect()
    }

    /// A copy of the scores in the requested order. Sorting is stable.
    pub fn ordered(&self, order: ScoreOrder) -> LabeledScores {
        let mut entries = self.entries.clone();
        match order {
            ScoreOrder::Insertion => {}
            ScoreOrder::Descending => entries.sort_by(|a, b| cmp_scores(b.1, a.1)),
            ScoreOrder::Ascending => entries.sort_by(|a, b| cmp_scores(a.1, b.1)),
        }
        LabeledScores { entries }
    }
}

fn cmp_scores(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Core and differentiator percentages, as two series over the same labels.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RelevanceBreakdown {
    pub labels: Vec<String>,
    pub core: Vec<f64>,
    pub differentiator: Vec<f64>,
}

impl RelevanceBreakdown {
    pub fn insert(&mut self, label: String, core: f64, differentiator: f64) {
        match self.labels.iter().position(|l| *l == label) {
            Some(idx) => {
                self.core[idx] = core;
                self.differentiator[idx] = differentiator;
            }
            None => {
                self.labels.push(label);
                self.core.push(core);
                self.differentiator.push(differentiator);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum Analysis {
    Scores(LabeledScores),
    Relevance(RelevanceBreakdown),
}

impl Analysis {
    /// True when no column matched: there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        match self {
            Analysis::Scores(s) => s.is_empty(),
            Analysis::Relevance(r) => r.is_empty(),
        }
    }
}

// ******** Aggregation *********

/// Display labels already given to columns in one aggregation pass.
///
/// The same column matched again keeps its label. A different column whose
/// display label is taken is prefixed with its competency name, so that
/// `Teamwork [Communication]` does not overwrite
/// `Design and Analysis [Communication]`.
#[derive(Default)]
struct ColumnLabels {
    given: Vec<(String, String)>,
}

impl ColumnLabels {
    fn label(&mut self, competency: &Competency, col_name: &str) -> String {
        if let Some((label, _)) = self.given.iter().find(|(_, c)| c == col_name) {
            return label.clone();
        }
        let plain = display_label(col_name);
        let label = if self.given.iter().any(|(l, _)| *l == plain) {
            format!("{}: {}", competency.name, plain)
        } else {
            plain
        };
        debug!("ColumnLabels: {:?} -> {:?}", col_name, label);
        self.given.push((label.clone(), col_name.to_string()));
        label
    }
}

/// Scores the rank columns of every competency of the set.
///
/// With `ColumnKind::Overall` there is one entry per competency that has an
/// overall column. With `ColumnKind::SubCompetency` there is one entry per
/// matched column. The order is the order of the competencies, then the
/// order of the columns in the table. Distinct columns never share a label.
pub fn aggregate_scores(
    table: &SurveyTable,
    competencies: &[Competency],
    kind: ColumnKind,
    convention: HeaderConvention,
    counting: RankCounting,
) -> LabeledScores {
    let headers = table.headers();
    let policy = ScoringPolicy::RankReversal(counting);
    let mut labels = ColumnLabels::default();
    let mut res = LabeledScores::default();
    for comp in competencies {
        let cols = resolve(&headers, comp, kind, convention);
        if cols.is_empty() {
            warn!(
                "aggregate_scores: no {:?} column found for {:?}",
                kind, comp.name
            );
        }
        for col_name in cols {
            if let Some(col) = table.column(&col_name) {
                if let Score::Weighted(s) = policy.score(&col.cells) {
                    debug!("aggregate_scores: {:?} -> {}", col_name, s);
                    res.insert(labels.label(comp, &col_name), s);
                }
            }
        }
    }
    res
}

/// Splits the relevance columns of every competency of the set into core
/// and differentiator percentages.
pub fn aggregate_relevance(
    table: &SurveyTable,
    competencies: &[Competency],
    convention: HeaderConvention,
) -> RelevanceBreakdown {
    let headers = table.headers();
    let mut labels = ColumnLabels::default();
    let mut res = RelevanceBreakdown::default();
    for comp in competencies {
        let cols = resolve(&headers, comp, ColumnKind::Relevance, convention);
        if cols.is_empty() {
            warn!("aggregate_relevance: no relevance column found for {:?}", comp.name);
        }
        for col_name in cols {
            if let Some(col) = table.column(&col_name) {
                if let Score::Split {
                    core,
                    differentiator,
                } = ScoringPolicy::RelevanceSplit.score(&col.cells)
                {
                    res.insert(labels.label(comp, &col_name), core, differentiator);
                }
            }
        }
    }
    res
}

/// Runs one analysis pass for the given selection.
///
/// The table is only read: running the same request twice gives the same
/// result.
pub fn aggregate(
    table: &SurveyTable,
    catalog: &Catalog,
    request: &AnalysisRequest,
) -> Result<Analysis, ScoringErrors> {
    info!(
        "aggregate: {} rows, {} columns, request: {:?}",
        table.num_rows(),
        table.columns().len(),
        request
    );
    let selected: Vec<Competency> = match &request.competency {
        Some(name) => vec![catalog
            .find(name)
            .cloned()
            .ok_or_else(|| ScoringErrors::UnknownCompetency(name.clone()))?],
        None => catalog.competencies.clone(),
    };

    let res = match request.mode {
        AnalysisMode::Overall => Analysis::Scores(
            aggregate_scores(
                table,
                &selected,
                ColumnKind::Overall,
                request.convention,
                request.counting(),
            )
            .ordered(request.order),
        ),
        AnalysisMode::SubCompetency => Analysis::Scores(
            aggregate_scores(
                table,
                &selected,
                ColumnKind::SubCompetency,
                request.convention,
                request.counting(),
            )
            .ordered(request.order),
        ),
        AnalysisMode::Relevance => {
            Analysis::Relevance(aggregate_relevance(table, &selected, request.convention))
        }
    };
    Ok(res)
}
