//! Coordinate and visual scales derived from the dataset
//!
//! Four mappings drive the timeline: time-of-year to x, year to y, cost to
//! glyph radius, and category to fill color. All four are computed once over
//! the entire dataset and stay fixed for the session, so a filtered re-render
//! keeps identical axis positions. Records with an absent field are excluded
//! from that field's domain but still contribute their other fields.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use thiserror::Error;

use crate::config::{ColorEntry, TimelineConfig};
use crate::records::DisasterRecord;

/// Glyph radius bounds in pixels, smallest to largest cost.
pub const RADIUS_RANGE: (f64, f64) = (4.0, 120.0);

/// Fill used for categories that slip past scheme validation.
pub const FALLBACK_COLOR: &str = "#888";

#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("no usable {field} values in dataset")]
    EmptyDomain { field: &'static str },
    #[error("degenerate {field} domain: every value is {value}")]
    DegenerateDomain { field: &'static str, value: String },
    #[error("category {category:?} missing from the coloring scheme")]
    UncoveredCategory { category: String },
}

/// Move a date to year 0, keeping month and day.
///
/// Year 0 is a leap year, so Feb 29 survives the move and month/day ordering
/// is preserved for every input year.
pub fn erase_year(date: NaiveDate) -> NaiveDate {
    date.with_year(0).unwrap_or(date)
}

fn month_floor(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn month_ceil(date: NaiveDate) -> NaiveDate {
    let floor = month_floor(date);
    if floor == date {
        date
    } else {
        floor.checked_add_months(Months::new(1)).unwrap_or(floor)
    }
}

/// Calendar-time scale over one year's worth of months.
///
/// The domain is the year-erased date extent of the dataset, widened to whole
/// month boundaries. Lookups through [`CalendarScale::x`] erase the year
/// first, so two dates differing only in year land on the same pixel.
#[derive(Debug, Clone)]
pub struct CalendarScale {
    start: NaiveDate,
    end: NaiveDate,
    width: f64,
    span_days: f64,
}

impl CalendarScale {
    pub fn from_dates<I>(dates: I, width: f64) -> Result<Self, ScaleError>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut extent: Option<(NaiveDate, NaiveDate)> = None;
        for date in dates {
            let erased = erase_year(date);
            extent = Some(match extent {
                None => (erased, erased),
                Some((lo, hi)) => (lo.min(erased), hi.max(erased)),
            });
        }
        let (lo, hi) = extent.ok_or(ScaleError::EmptyDomain { field: "date" })?;

        let start = month_floor(lo);
        let end = month_ceil(hi);
        if start >= end {
            return Err(ScaleError::DegenerateDomain {
                field: "date",
                value: start.to_string(),
            });
        }
        Ok(Self {
            start,
            end,
            width,
            span_days: (end - start).num_days() as f64,
        })
    }

    /// Pixel position of a date already expressed in domain space.
    ///
    /// Used for axis ticks, which live on the niced domain directly. The
    /// domain end can sit in year 1 (a December extent ceils to the next
    /// January), so ticks must not be re-erased to year 0.
    pub fn position(&self, date: NaiveDate) -> f64 {
        let days = (date - self.start).num_days() as f64;
        days / self.span_days * self.width
    }

    /// Pixel position of an arbitrary calendar date, year erased first.
    pub fn x(&self, date: NaiveDate) -> f64 {
        self.position(erase_year(date))
    }

    /// Niced domain bounds, month starts in year-erased space.
    pub fn domain(&self) -> (NaiveDate, NaiveDate) {
        (self.start, self.end)
    }
}

/// Plain linear mapping; the year axis uses an inverted range so larger
/// years sit nearer the top of the plot.
#[derive(Debug, Clone)]
pub struct LinearScale {
    d0: f64,
    d_span: f64,
    r0: f64,
    r_span: f64,
}

impl LinearScale {
    pub fn new(
        field: &'static str,
        domain: (f64, f64),
        range: (f64, f64),
    ) -> Result<Self, ScaleError> {
        let (d0, d1) = domain;
        if !d0.is_finite() || !d1.is_finite() || d0 == d1 {
            return Err(ScaleError::DegenerateDomain {
                field,
                value: d0.to_string(),
            });
        }
        Ok(Self {
            d0,
            d_span: d1 - d0,
            r0: range.0,
            r_span: range.1 - range.0,
        })
    }

    pub fn apply(&self, value: f64) -> f64 {
        self.r0 + (value - self.d0) / self.d_span * self.r_span
    }
}

/// Square-root mapping from cost to radius.
///
/// Interpolation happens in sqrt space, so glyph area rather than radius
/// grows proportionally with cost. Out-of-domain values extrapolate instead
/// of clamping.
#[derive(Debug, Clone)]
pub struct SqrtScale {
    s0: f64,
    s_span: f64,
    r0: f64,
    r_span: f64,
}

impl SqrtScale {
    pub fn new(
        field: &'static str,
        domain: (f64, f64),
        range: (f64, f64),
    ) -> Result<Self, ScaleError> {
        let (d0, d1) = domain;
        if !d0.is_finite() || !d1.is_finite() || d0 == d1 {
            return Err(ScaleError::DegenerateDomain {
                field,
                value: d0.to_string(),
            });
        }
        let s0 = d0.sqrt();
        Ok(Self {
            s0,
            s_span: d1.sqrt() - s0,
            r0: range.0,
            r_span: range.1 - range.0,
        })
    }

    pub fn apply(&self, value: f64) -> f64 {
        self.r0 + (value.sqrt() - self.s0) / self.s_span * self.r_span
    }
}

/// Discrete category-to-hex lookup from the coloring scheme.
#[derive(Debug, Clone)]
pub struct ColorScale {
    table: BTreeMap<String, String>,
}

impl ColorScale {
    /// Build the lookup table and verify it covers every category in
    /// `categories`. An uncovered category is a configuration error, not a
    /// render-time surprise.
    pub fn new<'a, I>(scheme: &[ColorEntry], categories: I) -> Result<Self, ScaleError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let table: BTreeMap<String, String> = scheme
            .iter()
            .map(|entry| (entry.category.clone(), entry.hex_code.clone()))
            .collect();
        for category in categories {
            if !table.contains_key(category) {
                return Err(ScaleError::UncoveredCategory {
                    category: category.to_string(),
                });
            }
        }
        Ok(Self { table })
    }

    pub fn color(&self, category: &str) -> &str {
        self.table
            .get(category)
            .map_or(FALLBACK_COLOR, String::as_str)
    }
}

/// The four session-fixed scales plus the year bounds the axis enumerates.
#[derive(Debug, Clone)]
pub struct ScaleSet {
    pub calendar: CalendarScale,
    pub year: LinearScale,
    pub radius: SqrtScale,
    pub color: ColorScale,
    pub year_bounds: (i32, i32),
}

impl ScaleSet {
    pub fn from_records(
        records: &[DisasterRecord],
        config: &TimelineConfig,
    ) -> Result<Self, ScaleError> {
        let calendar =
            CalendarScale::from_dates(records.iter().filter_map(|r| r.date), config.plot_width())?;

        let years = records.iter().filter_map(|r| r.year);
        let year_bounds = match years.fold(None, |acc, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        }) {
            Some(bounds) => bounds,
            None => return Err(ScaleError::EmptyDomain { field: "year" }),
        };
        let year = LinearScale::new(
            "year",
            (year_bounds.0 as f64, year_bounds.1 as f64),
            (config.plot_height(), 0.0),
        )?;

        let costs = records.iter().filter_map(|r| r.cost);
        let cost_bounds = match costs.fold(None, |acc: Option<(f64, f64)>, c| match acc {
            None => Some((c, c)),
            Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
        }) {
            Some(bounds) => bounds,
            None => return Err(ScaleError::EmptyDomain { field: "cost" }),
        };
        let radius = SqrtScale::new("cost", cost_bounds, RADIUS_RANGE)?;

        let color = ColorScale::new(
            &config.coloring_scheme,
            records.iter().map(|r| r.category.as_str()),
        )?;

        tracing::debug!(
            years = ?year_bounds,
            costs = ?cost_bounds,
            months = ?calendar.domain(),
            "scale domains computed"
        );
        Ok(Self {
            calendar,
            year,
            radius,
            color,
            year_bounds,
        })
    }
}
