//! Record normalization - CSV rows to typed disaster records
//!
//! The dataset is lenient: cost and year may be arbitrary text, and dates may
//! be malformed. Field coercion therefore degrades to absent (`None`) instead
//! of failing the load; absent fields are excluded from scale domains and
//! handled gracefully at render time. Only structural problems (missing
//! columns, unreadable CSV) abort the load.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

/// A CSV row exactly as read, before coercion. Extra columns are ignored.
#[derive(Debug, Deserialize)]
pub struct RawRecord {
    pub name: String,
    pub display_name: String,
    pub category: String,
    pub year: String,
    /// Mid-point date of the disaster, `YYYY-MM-DD`
    pub mid: String,
    pub cost: String,
}

/// A normalized disaster record.
///
/// Immutable after normalization except for `is_costliest`, which is derived
/// and recomputed on every render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DisasterRecord {
    /// Join key within a year
    pub name: String,
    /// Human-readable label text
    pub display_name: String,
    /// Must match one coloring-scheme entry
    pub category: String,
    /// Damage cost in dollars; absent when the source value is unusable
    pub cost: Option<f64>,
    /// Join key across years; absent when the source value is unusable
    pub year: Option<i32>,
    /// Calendar date; only month/day matter for positioning
    pub date: Option<NaiveDate>,
    /// Derived flag: costliest disaster(s) of its year in the rendered set
    pub is_costliest: bool,
}

impl From<RawRecord> for DisasterRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            cost: coerce_cost(&raw.cost),
            year: coerce_year(&raw.year),
            date: parse_mid_date(&raw.mid),
            name: raw.name,
            display_name: raw.display_name,
            category: raw.category,
            is_costliest: false,
        }
    }
}

/// Parse and normalize every row of a CSV document (header row required).
pub fn parse_records(text: &str) -> Result<Vec<DisasterRecord>> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<RawRecord>().enumerate() {
        let raw = row.with_context(|| format!("malformed CSV row {}", i + 2))?;
        records.push(DisasterRecord::from(raw));
    }
    tracing::debug!("normalized {} records", records.len());
    Ok(records)
}

/// Coerce a cost field. Unparseable, non-finite, or negative values are
/// absent; costs are defined as non-negative dollar amounts.
fn coerce_cost(value: &str) -> Option<f64> {
    let cost = value.trim().parse::<f64>().ok().filter(|c| c.is_finite())?;
    if cost < 0.0 {
        tracing::warn!("negative cost {:?} treated as absent", value);
        return None;
    }
    Some(cost)
}

/// Coerce a year field; unparseable values are absent.
fn coerce_year(value: &str) -> Option<i32> {
    value.trim().parse::<i32>().ok()
}

/// Parse the `mid` column. The year component is required for parsing but is
/// erased later when the date is positioned on the month axis.
fn parse_mid_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
