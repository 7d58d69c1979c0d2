//! Normalization of free-form answers into numeric codes.
//!
//! Two paths exist. Digit extraction keeps the first run of decimal digits
//! of a text cell ("Rank 3" becomes 3) and leaves every other cell alone.
//! A label mapping replaces known labels verbatim and drops everything else.
//! Neither path fails.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::*;
use crate::resolver::categorize;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit pattern"));

/// Extracts the first decimal digit sequence of a text cell.
pub fn extract_integer(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::Text(s) => match DIGITS.find(s).map(|m| m.as_str().parse::<i64>()) {
            Some(Ok(i)) => CellValue::Int(i),
            _ => cell.clone(),
        },
        _ => cell.clone(),
    }
}

/// An explicit table from answer labels to numeric codes.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct LabelMapping {
    entries: Vec<(String, i64)>,
}

impl LabelMapping {
    pub fn new(entries: &[(&str, i64)]) -> LabelMapping {
        LabelMapping {
            entries: entries.iter().map(|(l, c)| (l.to_string(), *c)).collect(),
        }
    }

    pub fn from_pairs(entries: Vec<(String, i64)>) -> LabelMapping {
        LabelMapping { entries }
    }

    /// "Rank 1" to "Rank 5".
    pub fn rank_labels() -> LabelMapping {
        LabelMapping::new(&[
            ("Rank 1", 1),
            ("Rank 2", 2),
            ("Rank 3", 3),
            ("Rank 4", 4),
            ("Rank 5", 5),
        ])
    }

    /// Differentiator is 0, core activity is 1.
    pub fn relevance_labels() -> LabelMapping {
        LabelMapping::new(&[("D (Differentiator)", 0), ("C (Core Activity)", 1)])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn apply(&self, cell: &CellValue) -> CellValue {
        match cell {
            CellValue::Text(s) => self
                .entries
                .iter()
                .find(|(label, _)| label == s)
                .map(|(_, code)| CellValue::Int(*code))
                .unwrap_or(CellValue::Missing),
            _ => CellValue::Missing,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Coercion {
    ExtractDigits,
    Labels(LabelMapping),
}

impl Coercion {
    pub fn apply(&self, cell: &CellValue) -> CellValue {
        match self {
            Coercion::ExtractDigits => extract_integer(cell),
            Coercion::Labels(m) => m.apply(cell),
        }
    }
}

/// Which coercion applies to which category of columns.
///
/// The rank coercion covers the overall and sub-competency columns, the
/// relevance coercion covers the relevance columns. Columns that belong to
/// no competency are copied as they are.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CoercionPlan {
    pub rank: Coercion,
    pub relevance: Coercion,
}

impl Default for CoercionPlan {
    fn default() -> CoercionPlan {
        CoercionPlan {
            rank: Coercion::ExtractDigits,
            relevance: Coercion::ExtractDigits,
        }
    }
}

impl CoercionPlan {
    /// Uses the given label mappings instead of digit extraction, when they
    /// are not empty.
    pub fn with_labels(rank: Option<LabelMapping>, relevance: Option<LabelMapping>) -> CoercionPlan {
        let pick = |m: Option<LabelMapping>| match m {
            Some(m) if !m.is_empty() => Coercion::Labels(m),
            _ => Coercion::ExtractDigits,
        };
        CoercionPlan {
            rank: pick(rank),
            relevance: pick(relevance),
        }
    }
}

/// Returns a coerced copy of the table. The input is not modified.
pub fn coerce_table(
    table: &SurveyTable,
    catalog: &Catalog,
    convention: HeaderConvention,
    plan: &CoercionPlan,
) -> SurveyTable {
    let columns = table
        .columns
        .iter()
        .map(|col| {
            let coercion = match categorize(&col.name, catalog, convention) {
                Some(ColumnKind::Relevance) => &plan.relevance,
                Some(_) => &plan.rank,
                None => return col.clone(),
            };
            debug!("coerce_table: {:?} with {:?}", col.name, coercion);
            Column {
                name: col.name.clone(),
                cells: col.cells.iter().map(|c| coercion.apply(c)).collect(),
            }
        })
        .collect();
    SurveyTable {
        columns,
        num_rows: table.num_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TableBuilder;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn extracts_first_digit_run() {
        assert_eq!(extract_integer(&text("Rank 3")), CellValue::Int(3));
        assert_eq!(extract_integer(&text("12 of 40")), CellValue::Int(12));
        assert_eq!(extract_integer(&text("n/a")), text("n/a"));
        assert_eq!(extract_integer(&CellValue::Float(2.0)), CellValue::Float(2.0));
        assert_eq!(extract_integer(&CellValue::Missing), CellValue::Missing);
    }

    #[test]
    fn oversized_digit_runs_are_left_alone() {
        let cell = text("99999999999999999999999");
        assert_eq!(extract_integer(&cell), cell);
    }

    #[test]
    fn label_mapping_drops_unmapped_values() {
        let m = LabelMapping::relevance_labels();
        assert_eq!(m.apply(&text("C (Core Activity)")), CellValue::Int(1));
        assert_eq!(m.apply(&text("D (Differentiator)")), CellValue::Int(0));
        assert_eq!(m.apply(&text("core")), CellValue::Missing);
        assert_eq!(m.apply(&CellValue::Int(1)), CellValue::Missing);
    }

    #[test]
    fn coerce_table_follows_the_plan_per_category() {
        let headers: Vec<String> = vec![
            "Respondent".into(),
            "Teamwork - Overall Ranking".into(),
            "Relevance - Teamwork [Sharing]".into(),
        ];
        let mut b = TableBuilder::new(&headers);
        b.add_row(&[text("Rank 9"), text("Rank 2"), text("C (Core Activity)")])
            .unwrap();
        let table = b.build();
        let plan = CoercionPlan::with_labels(None, Some(LabelMapping::relevance_labels()));
        let coerced = coerce_table(
            &table,
            &Catalog::facade_engineering(),
            HeaderConvention::Bracket,
            &plan,
        );

        assert_eq!(coerced.columns()[0].cells, vec![text("Rank 9")]);
        assert_eq!(coerced.columns()[1].cells, vec![CellValue::Int(2)]);
        assert_eq!(coerced.columns()[2].cells, vec![CellValue::Int(1)]);
        // The source table is untouched.
        assert_eq!(table.columns()[1].cells, vec![text("Rank 2")]);
    }

    #[test]
    fn rank_labels_feed_the_scores() {
        let headers: Vec<String> = vec!["Teamwork - Overall Ranking".into()];
        let mut b = TableBuilder::new(&headers);
        for cell in [
            text("Rank 2"),
            text("Rank 9"),
            CellValue::Int(1),
            text("Rank 1"),
            CellValue::Missing,
        ] {
            b.add_row(&[cell]).unwrap();
        }
        let table = b.build();
        let catalog = Catalog::facade_engineering();
        let plan = CoercionPlan::with_labels(Some(LabelMapping::rank_labels()), None);
        let coerced = coerce_table(&table, &catalog, HeaderConvention::Bracket, &plan);
        assert_eq!(
            coerced.columns()[0].cells,
            vec![
                CellValue::Int(2),
                CellValue::Missing,
                CellValue::Missing,
                CellValue::Int(1),
                CellValue::Missing,
            ]
        );

        // c1 = 1, c2 = 1
        let analysis = crate::aggregate(
            &coerced,
            &catalog,
            &AnalysisRequest::new(AnalysisMode::Overall),
        )
        .unwrap();
        let expected = crate::LabeledScores {
            entries: vec![("Teamwork".to_string(), 2.5)],
        };
        assert_eq!(analysis, crate::Analysis::Scores(expected));
    }

    #[test]
    fn empty_mappings_fall_back_to_digits() {
        let plan = CoercionPlan::with_labels(Some(LabelMapping::default()), None);
        assert_eq!(plan, CoercionPlan::default());
    }
}
