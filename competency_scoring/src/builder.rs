pub use crate::config::*;

use log::debug;
use std::collections::HashSet;

/// A builder for assembling a survey table row by row.
///
/// Duplicate headers are made unique by suffixing `.1`, `.2`, ... to the
/// later occurrences. Rows shorter than the header are padded with missing
/// cells.
///
/// ```
/// use competency_scoring::builder::TableBuilder;
/// use competency_scoring::CellValue;
/// # use competency_scoring::ScoringErrors;
///
/// let mut builder = TableBuilder::new(&["Teamwork - Overall Ranking".to_string()]);
/// builder.add_row(&[CellValue::Int(1)])?;
/// builder.add_row(&[])?;
///
/// let table = builder.build();
/// assert_eq!(table.num_rows(), 2);
///
/// # Ok::<(), ScoringErrors>(())
/// ```
pub struct TableBuilder {
    pub(crate) _headers: Vec<String>,
    pub(crate) _cells: Vec<Vec<CellValue>>,
    pub(crate) _num_rows: usize,
}

impl TableBuilder {
    pub fn new(headers: &[String]) -> TableBuilder {
        let unique = unique_headers(headers);
        let width = unique.len();
        TableBuilder {
            _headers: unique,
            _cells: vec![Vec::new(); width],
            _num_rows: 0,
        }
    }

    /// Adds one response.
    pub fn add_row(&mut self, cells: &[CellValue]) -> Result<(), ScoringErrors> {
        if cells.len() > self._headers.len() {
            return Err(ScoringErrors::RaggedRow {
                row: self._num_rows + 1,
                width: cells.len(),
            });
        }
        for (idx, col) in self._cells.iter_mut().enumerate() {
            col.push(cells.get(idx).cloned().unwrap_or(CellValue::Missing));
        }
        self._num_rows += 1;
        Ok(())
    }

    /// Adds a response made only of text cells, inferring the numbers.
    pub fn add_row_simple(&mut self, cells: &[&str]) -> Result<(), ScoringErrors> {
        let parsed: Vec<CellValue> = cells.iter().map(|s| infer_cell(s)).collect();
        self.add_row(&parsed)
    }

    pub fn build(self) -> SurveyTable {
        let columns = self
            ._headers
            .into_iter()
            .zip(self._cells)
            .map(|(name, cells)| Column { name, cells })
            .collect();
        SurveyTable {
            columns,
            num_rows: self._num_rows,
        }
    }
}

/// Markers that spreadsheet tools write for an empty answer.
const MISSING_MARKERS: [&str; 6] = ["NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Infers the cell type from its textual form.
pub fn infer_cell(raw: &str) -> CellValue {
    let s = raw.trim();
    if s.is_empty() || MISSING_MARKERS.contains(&s) {
        return CellValue::Missing;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Int(i);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => CellValue::Float(f),
        _ => CellValue::Text(raw.to_string()),
    }
}

fn unique_headers(headers: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut res: Vec<String> = Vec::new();
    for h in headers {
        let mut name = h.clone();
        let mut dup = 0;
        while seen.contains(&name) {
            dup += 1;
            name = format!("{}.{}", h, dup);
        }
        if dup > 0 {
            debug!("unique_headers: renamed duplicate {:?} to {:?}", h, name);
        }
        seen.insert(name.clone());
        res.push(name);
    }
    res
}
