use calamine::DataType;

use competency_scoring::builder::{infer_cell, TableBuilder};

use crate::survey::{io_common::unnamed_header, *};

/// Reads a survey from an Excel workbook.
///
/// The first row of the worksheet is the header. Without a worksheet name,
/// the first worksheet of the workbook is used.
pub fn read_excel_table(path: &str, worksheet_name: Option<&str>) -> SurveyResult<SurveyTable> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header_row = iter.next().context(EmptyExcelSnafu { path })?;
    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, dt)| read_header(idx, dt))
        .collect();
    debug!("read_excel_table: header: {:?}", headers);

    let mut builder = TableBuilder::new(&headers);
    for (idx, row) in iter.enumerate() {
        let cells: Vec<CellValue> = row.iter().map(read_cell).collect();
        debug!("read_excel_table: idx: {:?} row: {:?}", idx, &cells);
        builder.add_row(&cells).context(InvalidTableSnafu { path })?;
    }
    let table = builder.build();
    info!(
        "read_excel_table: {:?}: {} responses, {} columns",
        path,
        table.num_rows(),
        table.columns().len()
    );
    Ok(table)
}

fn read_header(idx: usize, cell: &DataType) -> String {
    match cell {
        DataType::String(s) if !s.trim().is_empty() => s.clone(),
        DataType::String(_) | DataType::Empty => unnamed_header(idx),
        other => other.to_string(),
    }
}

fn read_cell(cell: &DataType) -> CellValue {
    match cell {
        DataType::Int(i) => CellValue::Int(*i),
        DataType::Float(f) => CellValue::Float(*f),
        DataType::String(s) => infer_cell(s),
        DataType::Bool(b) => CellValue::Int(*b as i64),
        // Serial date numbers are kept as numbers; no competency column holds dates.
        DataType::DateTime(f) => CellValue::Float(*f),
        DataType::Error(_) | DataType::Empty => CellValue::Missing,
        #[allow(unreachable_patterns)]
        _ => CellValue::Missing,
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> SurveyResult<calamine::Range<DataType>> {
    debug!(
        "read_excel_table: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let wrange = workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_typed() {
        assert_eq!(read_cell(&DataType::Int(2)), CellValue::Int(2));
        assert_eq!(read_cell(&DataType::Float(1.0)), CellValue::Float(1.0));
        assert_eq!(
            read_cell(&DataType::String("Rank 1".to_string())),
            CellValue::Text("Rank 1".to_string())
        );
        assert_eq!(read_cell(&DataType::String("3".to_string())), CellValue::Int(3));
        assert_eq!(read_cell(&DataType::Empty), CellValue::Missing);
        assert_eq!(read_cell(&DataType::Bool(true)), CellValue::Int(1));
    }

    #[test]
    fn blank_headers_are_named_by_position() {
        assert_eq!(read_header(3, &DataType::Empty), "Unnamed: 3");
        assert_eq!(
            read_header(0, &DataType::String("Teamwork - Overall Ranking".to_string())),
            "Teamwork - Overall Ranking"
        );
        assert_eq!(read_header(1, &DataType::Int(7)), "7");
    }

    fn fixture() -> String {
        let p: std::path::PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "data", "bracket_survey.xlsx"]
            .iter()
            .collect();
        p.as_path().display().to_string()
    }

    #[test]
    fn reads_the_first_worksheet() {
        let table = read_excel_table(&fixture(), None).unwrap();
        assert_eq!(
            table.headers(),
            vec![
                "Timestamp",
                "Design and Analysis - Overall Ranking",
                "Teamwork - Overall Ranking",
                "Design and Analysis [Design Concept]"
            ]
        );
        assert_eq!(table.num_rows(), 6);
        assert_eq!(
            table.column("Teamwork - Overall Ranking").unwrap().cells[0],
            CellValue::Text("Rank 3".to_string())
        );
        let concept: Vec<Option<f64>> = table
            .column("Design and Analysis [Design Concept]")
            .unwrap()
            .cells
            .iter()
            .map(|c| c.as_number())
            .collect();
        assert_eq!(
            concept,
            vec![Some(1.0), Some(3.0), Some(3.0), None, Some(1.0), Some(2.0)]
        );
    }

    #[test]
    fn reads_a_named_worksheet() {
        let table = read_excel_table(&fixture(), Some("Notes")).unwrap();
        assert_eq!(table.headers(), vec!["Note"]);
        assert_eq!(table.num_rows(), 1);

        let res = read_excel_table(&fixture(), Some("Form2"));
        assert!(matches!(res, Err(SurveyError::MissingWorksheet { .. })));
    }

    #[test]
    fn missing_workbook_is_reported() {
        let res = read_excel_table("/nonexistent/survey.xlsx", None);
        assert!(matches!(res, Err(SurveyError::OpeningExcel { .. })));
    }
}
