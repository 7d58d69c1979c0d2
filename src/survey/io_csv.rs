// Primitives for reading CSV files.

use std::io::Read;

use competency_scoring::builder::TableBuilder;

use crate::survey::{io_common::unnamed_header, *};

pub fn read_csv_table(path: &str) -> SurveyResult<SurveyTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    read_records(rdr, path)
}

/// Reads a CSV document from memory or any other reader. `name` is only
/// used in the error messages.
#[cfg(test)]
pub fn read_csv_from<R: Read>(input: R, name: &str) -> SurveyResult<SurveyTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    read_records(rdr, name)
}

fn read_records<R: Read>(mut rdr: csv::Reader<R>, path: &str) -> SurveyResult<SurveyTable> {
    let headers: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { path, lineno: 1usize })?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            // Spreadsheet exports often start with a byte order mark.
            let h = h.trim_start_matches('\u{feff}');
            if h.is_empty() {
                unnamed_header(idx)
            } else {
                h.to_string()
            }
        })
        .collect();
    debug!("read_csv_table: {:?}: header: {:?}", path, headers);

    let mut builder = TableBuilder::new(&headers);
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is on the first line.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let cells: Vec<&str> = line.iter().collect();
        builder
            .add_row_simple(&cells)
            .context(InvalidTableSnafu { path })?;
    }
    let table = builder.build();
    info!(
        "read_csv_table: {:?}: {} responses, {} columns",
        path,
        table.num_rows(),
        table.columns().len()
    );
    Ok(table)
}
