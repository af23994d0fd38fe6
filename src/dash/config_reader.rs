use crate::dash::*;

use serde::{Deserialize, Serialize};

use crate::dash::charts::Layout;
use crate::dash::io_common::{detect_format, SourceFormat};

/// The headline numbers shown above the charts (global incidence and
/// mortality rank among cancers, with absolute counts).
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SummarySettings {
    #[serde(rename = "incidenceRank")]
    pub incidence_rank: u32,
    #[serde(rename = "incidenceCases")]
    pub incidence_cases: u64,
    #[serde(rename = "mortalityRank")]
    pub mortality_rank: u32,
    #[serde(rename = "mortalityDeaths")]
    pub mortality_deaths: u64,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSettings {
    pub title: String,
    /// "tabs", "columns" or "grid". The charts and their data are identical
    /// across the variants, only the section assignment changes.
    #[serde(rename = "layout")]
    _layout: Option<String>,
    pub summary: Option<SummarySettings>,
}

impl DashboardSettings {
    pub fn layout(&self) -> DashResult<Layout> {
        match self._layout.as_deref() {
            None | Some("tabs") => Ok(Layout::Tabs),
            Some("columns") => Ok(Layout::Columns),
            Some("grid") => Ok(Layout::Grid),
            Some(x) => whatever!("Unknown layout variant {:?}", x),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    #[serde(rename = "filePath")]
    pub file_path: String,
    /// "csv" or "xlsx". Inferred from the file extension when absent.
    #[serde(rename = "format")]
    _format: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl DataSource {
    pub fn source_format(&self) -> DashResult<SourceFormat> {
        match self._format.as_deref() {
            Some("csv") => Ok(SourceFormat::Csv),
            Some("xlsx") | Some("excel") => Ok(SourceFormat::Excel),
            Some(x) => whatever!("Unknown source format {:?}", x),
            None => match detect_format(&self.file_path) {
                Some(f) => Ok(f),
                None => whatever!("Cannot infer the format of {:?}", self.file_path),
            },
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DataSources {
    pub asr: DataSource,
    pub immunization: DataSource,
    pub continents: DataSource,
    pub clinical: DataSource,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(rename = "dashboardSettings")]
    pub settings: DashboardSettings,
    #[serde(rename = "dataSources")]
    pub data_sources: DataSources,
}

pub fn read_reference(path: String) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
