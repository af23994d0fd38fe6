mod tables;
use log::{debug, info, warn};

use std::collections::BTreeMap;

pub use crate::tables::*;

// **** Schema normalizer ****

/// Trims surrounding whitespace from every column header, lowercasing them
/// as well under `HeaderCase::Lower`. Data values are never touched.
pub fn normalize_headers(table: &mut Table, case: HeaderCase) {
    for c in table.columns.iter_mut() {
        let trimmed = c.trim();
        *c = match case {
            HeaderCase::Exact => trimmed.to_string(),
            HeaderCase::Lower => trimmed.to_lowercase(),
        };
    }
}

/// Checks that every required column is present, reporting the first one
/// missing. No row-level validation happens here: malformed values surface
/// as missing cells and are dropped by the aggregation operations.
pub fn check_columns(table: &Table, required: &[&str]) -> Result<(), PipelineError> {
    for r in required {
        if table.column_index(r).is_none() {
            return Err(PipelineError::MissingColumn {
                column: r.to_string(),
            });
        }
    }
    Ok(())
}

pub fn normalize_schema(
    table: &mut Table,
    required: &[&str],
    case: HeaderCase,
) -> Result<(), PipelineError> {
    normalize_headers(table, case);
    check_columns(table, required)
}

// **** Aggregator ****

struct GroupAcc {
    key_data: Vec<Datum>,
    sum: f64,
    count: u64,
}

/// Arithmetic mean of `value` per unique combination of `keys`.
///
/// Rows with a missing key or a non-numeric value are dropped. Output rows
/// are ordered by key tuple, which makes runs byte-reproducible; the
/// renderer does not depend on that order.
pub fn grouped_mean(table: &Table, keys: &[&str], value: &str) -> Result<Table, PipelineError> {
    let key_idx: Vec<usize> = keys
        .iter()
        .map(|k| {
            table
                .column_index(k)
                .ok_or_else(|| PipelineError::MissingColumn {
                    column: k.to_string(),
                })
        })
        .collect::<Result<_, _>>()?;
    let value_idx = table
        .column_index(value)
        .ok_or_else(|| PipelineError::MissingColumn {
            column: value.to_string(),
        })?;

    let mut groups: BTreeMap<Vec<String>, GroupAcc> = BTreeMap::new();
    let mut dropped: usize = 0;
    'rows: for row in table.rows.iter() {
        let mut key_strings: Vec<String> = Vec::with_capacity(key_idx.len());
        for &i in key_idx.iter() {
            match row[i].group_key() {
                Some(s) => key_strings.push(s),
                None => {
                    dropped += 1;
                    continue 'rows;
                }
            }
        }
        let v = match row[value_idx].as_number() {
            Some(v) => v,
            None => {
                dropped += 1;
                continue 'rows;
            }
        };
        let acc = groups.entry(key_strings).or_insert_with(|| GroupAcc {
            key_data: key_idx.iter().map(|&i| row[i].clone()).collect(),
            sum: 0.0,
            count: 0,
        });
        acc.sum += v;
        acc.count += 1;
    }
    if dropped > 0 {
        debug!(
            "grouped_mean: dropped {} rows with a missing key or value",
            dropped
        );
    }

    let mut columns: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    columns.push(value.to_string());
    let mut out = Table::new(columns);
    for acc in groups.into_values() {
        let mut row = acc.key_data;
        row.push(Datum::Number(acc.sum / acc.count as f64));
        out.push_row(row);
    }
    Ok(out)
}

/// Percentage of rows with `flag == 1` and with `flag == 0`, over the
/// subpopulation where `filter == 1`. Rows with a missing flag are excluded
/// from both the numerator and the denominator.
///
/// An empty subpopulation is an explicit error: the caller decides whether
/// that aborts the run or becomes an "insufficient data" notice.
pub fn percentage_split(
    table: &Table,
    filter: &str,
    flag: &str,
) -> Result<(f64, f64), PipelineError> {
    let filter_idx = table
        .column_index(filter)
        .ok_or_else(|| PipelineError::MissingColumn {
            column: filter.to_string(),
        })?;
    let flag_idx = table
        .column_index(flag)
        .ok_or_else(|| PipelineError::MissingColumn {
            column: flag.to_string(),
        })?;

    let mut positive: u64 = 0;
    let mut negative: u64 = 0;
    for row in table.rows.iter() {
        if row[filter_idx].as_number() != Some(1.0) {
            continue;
        }
        match row[flag_idx].as_number() {
            Some(v) if v == 1.0 => positive += 1,
            Some(_) => negative += 1,
            None => {}
        }
    }
    let total = positive + negative;
    if total == 0 {
        return Err(PipelineError::EmptySubpopulation {
            filter: filter.to_string(),
        });
    }
    debug!(
        "percentage_split: {} == 1 over {} rows, {} positive",
        filter, total, positive
    );
    Ok((
        positive as f64 / total as f64 * 100.0,
        negative as f64 / total as f64 * 100.0,
    ))
}

// **** Age binner + binned mean ****

/// Mean of a 0/1 flag per fixed age bracket.
///
/// Rows whose age falls outside all brackets, or with a missing age or
/// flag, are excluded. Brackets with no members are dropped from the
/// output rather than rendered as zero.
pub fn binned_flag_mean(table: &Table, age: &str, flag: &str) -> Result<Table, PipelineError> {
    let age_idx = table
        .column_index(age)
        .ok_or_else(|| PipelineError::MissingColumn {
            column: age.to_string(),
        })?;
    let flag_idx = table
        .column_index(flag)
        .ok_or_else(|| PipelineError::MissingColumn {
            column: flag.to_string(),
        })?;

    let mut sums = [0.0f64; 5];
    let mut counts = [0u64; 5];
    for row in table.rows.iter() {
        let group = match row[age_idx].as_number().and_then(AgeGroup::from_age) {
            Some(g) => g,
            None => continue,
        };
        let v = match row[flag_idx].as_number() {
            Some(v) => v,
            None => continue,
        };
        sums[group as usize] += v;
        counts[group as usize] += 1;
    }

    let mut out = Table::new(vec![AGE_GROUP_COLUMN.to_string(), flag.to_string()]);
    for g in AgeGroup::ALL {
        let i = g as usize;
        if counts[i] > 0 {
            out.push_row(vec![
                Datum::Text(g.label().to_string()),
                Datum::Number(sums[i] / counts[i] as f64),
            ]);
        }
    }
    Ok(out)
}

// **** Table builder ****

/// The choropleth input: one row per country with its age-standardized
/// incidence rate. All source columns pass through; the renderer only reads
/// `Population` and `ASR (World) per 100 000`.
pub fn map_table(raw: &Table) -> Result<Table, PipelineError> {
    let mut table = raw.clone();
    normalize_schema(&mut table, &[POPULATION, ASR_WORLD], HeaderCase::Exact)?;
    info!("map_table: {} countries", table.rows.len());
    Ok(table)
}

/// One row per (WHO region, year): mean HPV vaccination coverage.
pub fn trend_table(raw: &Table) -> Result<Table, PipelineError> {
    let mut table = raw.clone();
    normalize_schema(
        &mut table,
        &[PARENT_LOCATION_CODE, PERIOD, FACT_VALUE_NUMERIC],
        HeaderCase::Exact,
    )?;
    let out = grouped_mean(
        &table,
        &[PARENT_LOCATION_CODE, PERIOD],
        FACT_VALUE_NUMERIC,
    )?;
    info!("trend_table: {} (region, year) rows", out.rows.len());
    Ok(out)
}

/// Case totals per continent, headers lowercased, rows passed through.
pub fn distribution_table(raw: &Table) -> Result<Table, PipelineError> {
    let mut table = raw.clone();
    normalize_schema(
        &mut table,
        &[CONTINENT_LABEL, CONTINENT_TOTAL],
        HeaderCase::Lower,
    )?;
    Ok(table)
}

/// The HPV & Cancer / HPV & No Cancer split over HPV-positive patients.
/// Expects a table whose headers already carry the original case.
pub fn hpv_status_table(clinical: &Table) -> Result<Table, PipelineError> {
    let (with_cancer, without_cancer) = percentage_split(clinical, DX_HPV, DX_CANCER)?;
    let mut out = Table::new(vec![STATUS.to_string(), PERCENTAGE.to_string()]);
    out.push_row(vec![
        Datum::Text(HPV_CANCER.to_string()),
        Datum::Number(with_cancer),
    ]);
    out.push_row(vec![
        Datum::Text(HPV_NO_CANCER.to_string()),
        Datum::Number(without_cancer),
    ]);
    Ok(out)
}

/// Both clinical charts from the patient-level source.
///
/// The source is normalized twice on purpose: the biopsy rate reads the
/// lowercased headers, the diagnosis flags keep their original case.
pub fn clinical_summary(raw: &Table) -> Result<ClinicalSummary, PipelineError> {
    let mut lowered = raw.clone();
    normalize_schema(&mut lowered, &[AGE, BIOPSY], HeaderCase::Lower)?;
    let biopsy_by_age = binned_flag_mean(&lowered, AGE, BIOPSY)?;

    let mut exact = raw.clone();
    normalize_schema(&mut exact, &[DX_HPV, DX_CANCER], HeaderCase::Exact)?;
    let hpv_status = match hpv_status_table(&exact) {
        Ok(t) => Some(t),
        Err(PipelineError::EmptySubpopulation { filter }) => {
            warn!(
                "clinical_summary: no rows with {} == 1, the status chart will be unavailable",
                filter
            );
            None
        }
        Err(e) => return Err(e),
    };
    Ok(ClinicalSummary {
        biopsy_by_age,
        hpv_status,
    })
}

/// Runs the whole pipeline: four raw sources in, four chart-ready tables
/// out. Stateless and idempotent; every call reprocesses the sources from
/// scratch.
pub fn build_dashboard_tables(sources: &RawSources) -> Result<DashboardTables, PipelineError> {
    info!(
        "build_dashboard_tables: asr {} rows, immunization {} rows, continents {} rows, clinical {} rows",
        sources.asr.rows.len(),
        sources.immunization.rows.len(),
        sources.continents.rows.len(),
        sources.clinical.rows.len()
    );
    Ok(DashboardTables {
        map: map_table(&sources.asr)?,
        trend: trend_table(&sources.immunization)?,
        distribution: distribution_table(&sources.continents)?,
        clinical: clinical_summary(&sources.clinical)?,
    })
}
