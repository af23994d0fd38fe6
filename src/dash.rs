use log::{info, warn};

use dashboard_pipeline::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod charts;
pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;

use crate::dash::config_reader::*;
use crate::dash::io_common::SourceFormat;

#[derive(Debug, Snafu)]
pub enum DashError {
    #[snafu(display("Error opening csv file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading a row in csv file {path}"))]
    CsvRow { source: csv::Error, path: String },
    #[snafu(display("Error opening excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No readable worksheet in excel file {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Error opening json file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the dashboard to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Failed to build the {dataset} table: {source}"))]
    BuildingTable {
        source: PipelineError,
        dataset: &'static str,
    },
    #[snafu(display(""))]
    MissingParentDir {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;

fn load_source(root_path: &Path, source: &DataSource) -> DashResult<Table> {
    let p: PathBuf = [root_path.to_path_buf(), PathBuf::from(&source.file_path)]
        .iter()
        .collect();
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read data file {:?}", p2);
    match source.source_format()? {
        SourceFormat::Csv => io_csv::read_csv_table(&p2),
        SourceFormat::Excel => {
            io_excel::read_excel_table(&p2, source.excel_worksheet_name.as_deref())
        }
    }
}

/// Loads the four raw sources named by the configuration, runs the pipeline
/// and assembles the dashboard document. Schema errors on any source abort
/// the run; an empty HPV-positive subpopulation only marks the status chart
/// as unavailable.
pub fn run_dashboard(
    config_path: String,
    check_reference_path: Option<String>,
    out_path: Option<String>,
) -> DashResult<()> {
    let config_p = Path::new(config_path.as_str());
    let config_str = fs::read_to_string(config_path.clone()).context(OpeningJsonSnafu {
        path: config_path.clone(),
    })?;
    let config: DashboardConfig =
        serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
    info!("config: {:?}", config);

    let layout = config.settings.layout()?;

    let root_p = config_p.parent().context(MissingParentDirSnafu {})?;
    let sources = RawSources {
        asr: load_source(root_p, &config.data_sources.asr)?,
        immunization: load_source(root_p, &config.data_sources.immunization)?,
        continents: load_source(root_p, &config.data_sources.continents)?,
        clinical: load_source(root_p, &config.data_sources.clinical)?,
    };

    let tables = DashboardTables {
        map: map_table(&sources.asr).context(BuildingTableSnafu { dataset: "asr" })?,
        trend: trend_table(&sources.immunization)
            .context(BuildingTableSnafu { dataset: "immunization" })?,
        distribution: distribution_table(&sources.continents)
            .context(BuildingTableSnafu { dataset: "continents" })?,
        clinical: clinical_summary(&sources.clinical)
            .context(BuildingTableSnafu { dataset: "clinical" })?,
    };

    // Assemble the final json
    let result_js = charts::build_dashboard_js(&config.settings, &tables, layout);
    let pretty_js = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    match out_path {
        Some(path) => {
            info!("Writing the dashboard document to {:?}", path);
            fs::write(&path, &pretty_js).context(WritingOutputSnafu { path: path.clone() })?;
        }
        None => println!("{}", pretty_js),
    }

    // The reference document, if provided for comparison
    if let Some(reference_p) = check_reference_path {
        let reference_js: JSValue = read_reference(reference_p)?;
        let pretty_reference =
            serde_json::to_string_pretty(&reference_js).context(ParsingJsonSnafu {})?;
        if pretty_reference != pretty_js {
            warn!("Found differences with the reference document");
            print_diff(pretty_reference.as_str(), pretty_js.as_ref(), "\n");
            whatever!("Difference detected between assembled dashboard and reference document")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run_dashboard, DashError};

    fn run_dashboard_test(test_name: &str) {
        let test_dir = option_env!("DASH_TEST_DIR").unwrap_or("test_data");
        let res = run_dashboard(
            format!("{}/{}/dashboard_config.json", test_dir, test_name),
            Some(format!("{}/{}/expected_dashboard.json", test_dir, test_name)),
            None,
        );
        if let Err(e) = &res {
            eprintln!("An error occured {}", e);
        }
        assert!(res.is_ok());
    }

    #[test]
    fn smoke() {
        run_dashboard_test("smoke");
    }

    #[test]
    fn no_hpv_positive() {
        run_dashboard_test("no_hpv_positive");
    }

    // The clinical source is an xlsx workbook here; the format is inferred
    // from the file extension and the worksheet is selected by name.
    #[test]
    fn clinical_excel() {
        run_dashboard_test("clinical_excel");
    }

    #[test]
    fn missing_column_aborts_the_run() {
        let res = run_dashboard(
            "test_data/missing_column/dashboard_config.json".to_string(),
            None,
            None,
        );
        match res {
            Err(DashError::BuildingTable { dataset, source }) => {
                assert_eq!(dataset, "asr");
                assert!(source.to_string().contains("ASR"));
            }
            other => panic!("expected a schema error, got {:?}", other),
        }
    }
}
