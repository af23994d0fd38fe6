// Reading a source table from an Excel workbook. The clinical dataset in
// particular circulates as a spreadsheet export.

use log::debug;

use calamine::{open_workbook, Reader, Xlsx};

use dashboard_pipeline::{Datum, Table};

use crate::dash::io_common::parse_cell;
use crate::dash::*;

pub fn read_excel_table(path: &str, worksheet: Option<&str>) -> DashResult<Table> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    }
    .context(EmptyExcelSnafu { path })?
    .context(OpeningExcelSnafu { path })?;

    let mut rows = wrange.rows();
    let header = rows.next().context(EmptyExcelSnafu { path })?;
    debug!("header: {:?}", header);
    let columns: Vec<String> = header.iter().map(cell_to_header).collect();
    let mut table = Table::new(columns);
    for row in rows {
        table.push_row(row.iter().map(cell_to_datum).collect());
    }
    Ok(table)
}

fn cell_to_header(cell: &calamine::DataType) -> String {
    match cell {
        calamine::DataType::String(s) => s.clone(),
        calamine::DataType::Float(x) => format!("{}", x),
        calamine::DataType::Int(x) => format!("{}", x),
        _ => "".to_string(),
    }
}

fn cell_to_datum(cell: &calamine::DataType) -> Datum {
    match cell {
        calamine::DataType::String(s) => parse_cell(s),
        calamine::DataType::Float(x) => Datum::Number(*x),
        calamine::DataType::Int(x) => Datum::Number(*x as f64),
        calamine::DataType::Bool(b) => Datum::Number(if *b { 1.0 } else { 0.0 }),
        calamine::DataType::DateTime(x) => Datum::Number(*x),
        _ => Datum::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::DataType;

    #[test]
    fn converts_headers() {
        assert_eq!(cell_to_header(&DataType::String("Age".to_string())), "Age");
        assert_eq!(cell_to_header(&DataType::Float(2020.0)), "2020");
        assert_eq!(cell_to_header(&DataType::Int(3)), "3");
        assert_eq!(cell_to_header(&DataType::Empty), "");
    }

    #[test]
    fn converts_cells() {
        assert_eq!(cell_to_datum(&DataType::Float(84.5)), Datum::Number(84.5));
        assert_eq!(cell_to_datum(&DataType::Int(1)), Datum::Number(1.0));
        assert_eq!(cell_to_datum(&DataType::Bool(true)), Datum::Number(1.0));
        assert_eq!(cell_to_datum(&DataType::Bool(false)), Datum::Number(0.0));
        assert_eq!(
            cell_to_datum(&DataType::String("45".to_string())),
            Datum::Number(45.0)
        );
        assert_eq!(
            cell_to_datum(&DataType::String("Africa".to_string())),
            Datum::Text("Africa".to_string())
        );
        assert_eq!(cell_to_datum(&DataType::Empty), Datum::Missing);
    }

    #[test]
    fn reads_the_clinical_fixture_workbook() {
        let table = read_excel_table(
            "test_data/clinical_excel/clinical.xlsx",
            Some("clinical"),
        )
        .unwrap();
        assert_eq!(
            table.columns,
            vec!["age", "biopsy", "Dx:HPV", "Dx:Cancer"]
        );
        assert_eq!(table.rows.len(), 6);
        assert_eq!(table.rows[0][0], Datum::Number(15.0));
        // The first biopsy cell is stored as a boolean in the workbook.
        assert_eq!(table.rows[0][1], Datum::Number(1.0));
    }

    #[test]
    fn reports_a_missing_worksheet() {
        let res = read_excel_table(
            "test_data/clinical_excel/clinical.xlsx",
            Some("no_such_sheet"),
        );
        assert!(matches!(res, Err(DashError::EmptyExcel { .. })));
    }
}
