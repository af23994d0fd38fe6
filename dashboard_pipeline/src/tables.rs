// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// A single cell in a raw or derived table.
///
/// Non-numeric content in a numeric column is not an error at this level:
/// it stays `Text` (or `Missing` if blank) and gets dropped by the
/// aggregation operations.
#[derive(PartialEq, Debug, Clone)]
pub enum Datum {
    Text(String),
    Number(f64),
    /// A blank cell, or a value that could not be read from the source.
    Missing,
}

impl Datum {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Datum::Number(x) => Some(*x),
            _ => None,
        }
    }

    /// The canonical string used when this datum is part of a grouping key.
    /// Integral numbers drop the trailing `.0` so that `2020` and `2020.0`
    /// land in the same group.
    pub fn group_key(&self) -> Option<String> {
        match self {
            Datum::Text(s) => Some(s.clone()),
            Datum::Number(x) if x.fract() == 0.0 && x.abs() < 1e15 => {
                Some(format!("{}", *x as i64))
            }
            Datum::Number(x) => Some(format!("{}", x)),
            Datum::Missing => None,
        }
    }
}

/// A flat table: an ordered list of column names and rows of cells.
///
/// Every row has exactly as many cells as there are columns.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Datum>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Table {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn push_row(&mut self, row: Vec<Datum>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Header normalization mode, chosen per call site.
/// The clinical source is consumed under both modes: the biopsy chart reads
/// lowercased headers, the HPV status chart reads the original case.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum HeaderCase {
    /// Trim surrounding whitespace only.
    Exact,
    /// Trim and lowercase.
    Lower,
}

/// One of the five fixed patient age brackets.
///
/// Binning is half-open on the left: a value equal to a boundary falls into
/// the bracket starting at that boundary (age 20 is `20-29`). Ages below 10
/// or of 60 and above have no bracket.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum AgeGroup {
    Age10To19 = 0,
    Age20To29 = 1,
    Age30To39 = 2,
    Age40To49 = 3,
    Age50To59 = 4,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Age10To19,
        AgeGroup::Age20To29,
        AgeGroup::Age30To39,
        AgeGroup::Age40To49,
        AgeGroup::Age50To59,
    ];

    /// ```
    /// use dashboard_pipeline::AgeGroup;
    ///
    /// assert_eq!(AgeGroup::from_age(20.0), Some(AgeGroup::Age20To29));
    /// assert_eq!(AgeGroup::from_age(59.0), Some(AgeGroup::Age50To59));
    /// assert_eq!(AgeGroup::from_age(60.0), None);
    /// ```
    pub fn from_age(age: f64) -> Option<AgeGroup> {
        if !age.is_finite() {
            return None;
        }
        match age {
            a if (10.0..20.0).contains(&a) => Some(AgeGroup::Age10To19),
            a if (20.0..30.0).contains(&a) => Some(AgeGroup::Age20To29),
            a if (30.0..40.0).contains(&a) => Some(AgeGroup::Age30To39),
            a if (40.0..50.0).contains(&a) => Some(AgeGroup::Age40To49),
            a if (50.0..60.0).contains(&a) => Some(AgeGroup::Age50To59),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Age10To19 => "10-19",
            AgeGroup::Age20To29 => "20-29",
            AgeGroup::Age30To39 => "30-39",
            AgeGroup::Age40To49 => "40-49",
            AgeGroup::Age50To59 => "50-59",
        }
    }
}

// ******** Column and label names *********

// ASR source (GCO export).
pub const POPULATION: &str = "Population";
pub const ASR_WORLD: &str = "ASR (World) per 100 000";

// Immunization source (WHO export).
pub const PARENT_LOCATION_CODE: &str = "ParentLocationCode";
pub const PERIOD: &str = "Period";
pub const FACT_VALUE_NUMERIC: &str = "FactValueNumeric";

// Continent distribution source (headers consumed lowercased).
pub const CONTINENT_LABEL: &str = "label";
pub const CONTINENT_TOTAL: &str = "total";

// Clinical source. `age`/`biopsy` are read from the lowercased view,
// the diagnosis flags from the original-case view.
pub const AGE: &str = "age";
pub const BIOPSY: &str = "biopsy";
pub const DX_HPV: &str = "Dx:HPV";
pub const DX_CANCER: &str = "Dx:Cancer";

// Derived tables.
pub const AGE_GROUP_COLUMN: &str = "age group";
pub const STATUS: &str = "Status";
pub const PERCENTAGE: &str = "Percentage";
pub const HPV_CANCER: &str = "HPV & Cancer";
pub const HPV_NO_CANCER: &str = "HPV & No Cancer";

// ******** Output data structures *********

/// The four raw sources, already loaded into memory by the caller.
#[derive(PartialEq, Debug, Clone)]
pub struct RawSources {
    pub asr: Table,
    pub immunization: Table,
    pub continents: Table,
    pub clinical: Table,
}

/// The two small tables derived from the patient-level clinical source.
#[derive(PartialEq, Debug, Clone)]
pub struct ClinicalSummary {
    /// One row per non-empty age group: (group label, mean biopsy flag).
    pub biopsy_by_age: Table,
    /// The HPV & Cancer / HPV & No Cancer percentage split. `None` when the
    /// clinical source has no HPV-positive patients; the presentation layer
    /// renders that as an "insufficient data" notice instead of a chart.
    pub hpv_status: Option<Table>,
}

/// Everything the rendering layer needs, computed fresh on every run.
#[derive(PartialEq, Debug, Clone)]
pub struct DashboardTables {
    pub map: Table,
    pub trend: Table,
    pub distribution: Table,
    pub clinical: ClinicalSummary,
}

/// Errors that prevent a table from being built.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum PipelineError {
    /// A required column is absent after header normalization.
    MissingColumn { column: String },
    /// A percentage split was requested over a filtered subpopulation with
    /// no usable rows. Surfaced explicitly rather than dividing by zero.
    EmptySubpopulation { filter: String },
}

impl Error for PipelineError {}

impl Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::MissingColumn { column } => {
                write!(f, "missing required column after normalization: {}", column)
            }
            PipelineError::EmptySubpopulation { filter } => {
                write!(f, "no rows with {} == 1 in the filtered subpopulation", filter)
            }
        }
    }
}
