// Primitives for reading CSV files.

use log::debug;

use dashboard_pipeline::Table;

use crate::dash::io_common::parse_cell;
use crate::dash::*;

pub fn read_csv_table(path: &str) -> DashResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;
    let columns: Vec<String> = rdr
        .headers()
        .context(OpeningCsvSnafu { path })?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut table = Table::new(columns);
    for line_r in rdr.records() {
        let line = line_r.context(CsvRowSnafu { path })?;
        table.push_row(line.iter().map(parse_cell).collect());
    }
    debug!("read_csv_table: {} rows from {:?}", table.rows.len(), path);
    Ok(table)
}
