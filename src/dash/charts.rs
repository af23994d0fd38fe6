// Chart requests: the declarative hand-off to the rendering layer.
//
// The six historical dashboard variants only differed in where each chart
// sat on the page. One pipeline feeds all of them; the layout variant only
// changes the section assigned to each request.

use dashboard_pipeline::{DashboardTables, Datum, Table};

use serde_json::{json, Map as JSMap, Value as JSValue};

use crate::dash::config_reader::DashboardSettings;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Layout {
    Tabs,
    Columns,
    Grid,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Tabs => "tabs",
            Layout::Columns => "columns",
            Layout::Grid => "grid",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ChartKind {
    Choropleth,
    Line,
    Pie,
    HorizontalBar,
    Bar,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Choropleth => "choropleth",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::HorizontalBar => "hbar",
            ChartKind::Bar => "bar",
        }
    }
}

/// Either a table ready to render, or an explicit notice. The renderer must
/// show the notice instead of an empty chart.
#[derive(PartialEq, Debug, Clone)]
pub enum ChartData {
    Ready(Table),
    Unavailable(String),
}

#[derive(PartialEq, Debug, Clone)]
pub struct DisplayOptions {
    pub height: u32,
    pub show_legend: bool,
    pub value_range: Option<(f64, f64)>,
    pub color_scale: Option<&'static str>,
    pub tick_format: Option<&'static str>,
    pub hole: Option<f64>,
}

impl DisplayOptions {
    fn plain() -> DisplayOptions {
        DisplayOptions {
            height: CHART_HEIGHT,
            show_legend: true,
            value_range: None,
            color_scale: None,
            tick_format: None,
            hole: None,
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct ChartRequest {
    pub id: &'static str,
    pub kind: ChartKind,
    pub title: &'static str,
    pub section: &'static str,
    pub options: DisplayOptions,
    pub data: ChartData,
}

const CHART_HEIGHT: u32 = 200;

// Section of each chart, in request order: map, trend, distribution,
// biopsy rate, HPV status.
fn section_names(layout: Layout) -> [&'static str; 5] {
    match layout {
        Layout::Tabs => ["global", "global", "risk", "risk", "risk"],
        Layout::Columns => ["left", "right", "left", "right", "left"],
        Layout::Grid => ["r1c1", "r1c2", "r2c1", "r2c2", "r3c1"],
    }
}

// An empty table means the renderer would draw a misleading blank chart.
// Hand it an explicit notice instead.
fn chart_data(table: &Table) -> ChartData {
    if table.is_empty() {
        ChartData::Unavailable("insufficient data: the source table is empty".to_string())
    } else {
        ChartData::Ready(table.clone())
    }
}

pub fn assemble_charts(tables: &DashboardTables, layout: Layout) -> Vec<ChartRequest> {
    let sections = section_names(layout);
    let hpv_data = match &tables.clinical.hpv_status {
        Some(t) => chart_data(t),
        None => ChartData::Unavailable(
            "insufficient data: no HPV-positive patients in the clinical dataset".to_string(),
        ),
    };
    vec![
        ChartRequest {
            id: "asr_map",
            kind: ChartKind::Choropleth,
            title: "ASR per 100k",
            section: sections[0],
            options: DisplayOptions {
                color_scale: Some("YlOrRd"),
                ..DisplayOptions::plain()
            },
            data: chart_data(&tables.map),
        },
        ChartRequest {
            id: "coverage_trend",
            kind: ChartKind::Line,
            title: "HPV Vaccine Coverage",
            section: sections[1],
            options: DisplayOptions {
                value_range: Some((0.0, 100.0)),
                ..DisplayOptions::plain()
            },
            data: chart_data(&tables.trend),
        },
        ChartRequest {
            id: "continent_distribution",
            kind: ChartKind::Pie,
            title: "Cases by Continent",
            section: sections[2],
            options: DisplayOptions {
                show_legend: false,
                hole: Some(0.4),
                ..DisplayOptions::plain()
            },
            data: chart_data(&tables.distribution),
        },
        ChartRequest {
            id: "biopsy_by_age",
            kind: ChartKind::HorizontalBar,
            title: "Biopsy-positive Rate by Age Group",
            section: sections[3],
            options: DisplayOptions {
                value_range: Some((0.0, 1.0)),
                tick_format: Some(".0%"),
                ..DisplayOptions::plain()
            },
            data: chart_data(&tables.clinical.biopsy_by_age),
        },
        ChartRequest {
            id: "hpv_status",
            kind: ChartKind::Bar,
            title: "Cancer Diagnosis among HPV-positive Patients",
            section: sections[4],
            options: DisplayOptions {
                show_legend: false,
                tick_format: Some(".1f"),
                ..DisplayOptions::plain()
            },
            data: hpv_data,
        },
    ]
}

fn datum_to_json(d: &Datum) -> JSValue {
    match d {
        Datum::Text(s) => json!(s),
        Datum::Number(x) => json!(x),
        Datum::Missing => JSValue::Null,
    }
}

/// One JSON object per row, keyed by column name.
pub fn table_to_json(table: &Table) -> JSValue {
    let mut rows: Vec<JSValue> = Vec::new();
    for row in table.rows.iter() {
        let mut obj: JSMap<String, JSValue> = JSMap::new();
        for (c, d) in table.columns.iter().zip(row.iter()) {
            obj.insert(c.clone(), datum_to_json(d));
        }
        rows.push(JSValue::Object(obj));
    }
    JSValue::Array(rows)
}

fn options_to_json(o: &DisplayOptions) -> JSValue {
    let mut obj: JSMap<String, JSValue> = JSMap::new();
    obj.insert("height".to_string(), json!(o.height));
    obj.insert("showLegend".to_string(), json!(o.show_legend));
    if let Some((lo, hi)) = o.value_range {
        obj.insert("valueRange".to_string(), json!([lo, hi]));
    }
    if let Some(cs) = o.color_scale {
        obj.insert("colorScale".to_string(), json!(cs));
    }
    if let Some(tf) = o.tick_format {
        obj.insert("tickFormat".to_string(), json!(tf));
    }
    if let Some(h) = o.hole {
        obj.insert("hole".to_string(), json!(h));
    }
    JSValue::Object(obj)
}

fn chart_to_json(c: &ChartRequest) -> JSValue {
    let mut obj: JSMap<String, JSValue> = JSMap::new();
    obj.insert("id".to_string(), json!(c.id));
    obj.insert("kind".to_string(), json!(c.kind.as_str()));
    obj.insert("title".to_string(), json!(c.title));
    obj.insert("section".to_string(), json!(c.section));
    obj.insert("options".to_string(), options_to_json(&c.options));
    match &c.data {
        ChartData::Ready(t) => {
            obj.insert("state".to_string(), json!("ready"));
            obj.insert("data".to_string(), table_to_json(t));
        }
        ChartData::Unavailable(notice) => {
            obj.insert("state".to_string(), json!("unavailable"));
            obj.insert("notice".to_string(), json!(notice));
        }
    }
    JSValue::Object(obj)
}

pub fn build_dashboard_js(
    settings: &DashboardSettings,
    tables: &DashboardTables,
    layout: Layout,
) -> JSValue {
    let charts = assemble_charts(tables, layout);
    let charts_js: Vec<JSValue> = charts.iter().map(chart_to_json).collect();
    let mut doc: JSMap<String, JSValue> = JSMap::new();
    doc.insert("title".to_string(), json!(settings.title));
    doc.insert("layout".to_string(), json!(layout.as_str()));
    if let Some(s) = &settings.summary {
        doc.insert(
            "summary".to_string(),
            json!({
                "incidence": { "rank": s.incidence_rank, "cases": s.incidence_cases },
                "mortality": { "rank": s.mortality_rank, "deaths": s.mortality_deaths },
            }),
        );
    }
    doc.insert("charts".to_string(), JSValue::Array(charts_js));
    JSValue::Object(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_pipeline::{ClinicalSummary, DashboardTables};

    fn empty_tables(hpv_status: Option<Table>) -> DashboardTables {
        DashboardTables {
            map: Table::new(vec!["Population".to_string()]),
            trend: Table::new(vec!["ParentLocationCode".to_string()]),
            distribution: Table::new(vec!["label".to_string()]),
            clinical: ClinicalSummary {
                biopsy_by_age: Table::new(vec!["age group".to_string()]),
                hpv_status,
            },
        }
    }

    #[test]
    fn layouts_only_change_sections() {
        let tables = empty_tables(None);
        let tabs = assemble_charts(&tables, Layout::Tabs);
        let grid = assemble_charts(&tables, Layout::Grid);
        assert_eq!(tabs.len(), 5);
        assert_eq!(tabs[0].section, "global");
        assert_eq!(grid[0].section, "r1c1");
        for (a, b) in tabs.iter().zip(grid.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.data, b.data);
            assert_eq!(a.options, b.options);
        }
    }

    #[test]
    fn missing_hpv_split_becomes_an_unavailable_chart() {
        let tables = empty_tables(None);
        let charts = assemble_charts(&tables, Layout::Tabs);
        let status = charts.iter().find(|c| c.id == "hpv_status").unwrap();
        match &status.data {
            ChartData::Unavailable(notice) => assert!(notice.contains("insufficient data")),
            other => panic!("expected an unavailable chart, got {:?}", other),
        }
        let js = chart_to_json(status);
        assert_eq!(js["state"], "unavailable");
        assert!(js.get("data").is_none());
    }

    #[test]
    fn tables_serialize_as_records() {
        let mut t = Table::new(vec!["label".to_string(), "total".to_string()]);
        t.push_row(vec![
            Datum::Text("Africa".to_string()),
            Datum::Number(125000.0),
        ]);
        let js = table_to_json(&t);
        assert_eq!(js[0]["label"], "Africa");
        assert_eq!(js[0]["total"], 125000.0);
    }
}
