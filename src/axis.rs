//! Month and year axis rendering
//!
//! The month axis sits above the plot and ticks every month boundary of the
//! calendar domain. The year axis enumerates every integer year in the data
//! range, one full-width gridline each; the tick set is explicit, never
//! thinned by a step heuristic, so a forty-year span gets forty-one lines.

use chrono::{Months, NaiveDate};

use crate::scales::{CalendarScale, LinearScale};
use crate::scene::{NodeId, Scene};
use crate::svg::fmt_number;

/// Vertical lift of the month axis above the plot top, in pixels.
const MONTH_AXIS_OFFSET_Y: f64 = -20.0;

/// Month-boundary tick dates over the calendar domain, both ends included.
pub fn month_ticks(calendar: &CalendarScale) -> Vec<NaiveDate> {
    let (start, end) = calendar.domain();
    let mut ticks = Vec::new();
    let mut tick = start;
    while tick <= end {
        ticks.push(tick);
        tick = match tick.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    ticks
}

/// Abbreviated month name for a tick date.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b").to_string()
}

/// Every integer year in the inclusive range.
pub fn year_ticks(bounds: (i32, i32)) -> Vec<i32> {
    (bounds.0..=bounds.1).collect()
}

/// Render the month axis into `parent` and return its group.
pub fn render_month_axis(scene: &mut Scene, parent: NodeId, calendar: &CalendarScale) -> NodeId {
    let axis = scene.create(parent, "g");
    scene.set_attr(axis, "class", "x-axis");
    scene.set_attr(
        axis,
        "transform",
        format!("translate(0,{})", fmt_number(MONTH_AXIS_OFFSET_Y)),
    );
    scene.set_attr(axis, "fill", "none");
    scene.set_attr(axis, "font-family", "sans-serif");
    scene.set_attr(axis, "font-size", "10");
    scene.set_attr(axis, "text-anchor", "middle");

    let (_, end) = calendar.domain();
    let domain = scene.create(axis, "path");
    scene.set_attr(domain, "class", "domain");
    scene.set_attr(domain, "stroke", "currentColor");
    scene.set_attr(domain, "d", format!("M0,0H{}", fmt_number(calendar.position(end))));

    for tick in month_ticks(calendar) {
        let g = scene.create(axis, "g");
        scene.set_attr(g, "class", "tick");
        scene.set_attr(
            g,
            "transform",
            format!("translate({},0)", fmt_number(calendar.position(tick))),
        );
        let line = scene.create(g, "line");
        scene.set_attr(line, "stroke", "currentColor");
        scene.set_attr(line, "y2", "-6");
        let text = scene.create(g, "text");
        scene.set_attr(text, "fill", "currentColor");
        scene.set_attr(text, "y", "-9");
        scene.set_text(text, month_label(tick));
    }
    axis
}

/// Render the year axis into `parent` and return its group. Tick lines span
/// `width` pixels rightward, forming the plot's horizontal gridlines.
pub fn render_year_axis(
    scene: &mut Scene,
    parent: NodeId,
    year: &LinearScale,
    bounds: (i32, i32),
    width: f64,
) -> NodeId {
    let axis = scene.create(parent, "g");
    scene.set_attr(axis, "class", "y-axis");
    scene.set_attr(axis, "fill", "none");
    scene.set_attr(axis, "font-family", "sans-serif");
    scene.set_attr(axis, "font-size", "10");
    scene.set_attr(axis, "text-anchor", "end");

    let height = year.apply(bounds.0 as f64);
    let domain = scene.create(axis, "path");
    scene.set_attr(domain, "class", "domain");
    scene.set_attr(domain, "stroke", "currentColor");
    scene.set_attr(domain, "d", format!("M0,0V{}", fmt_number(height)));

    for tick in year_ticks(bounds) {
        let g = scene.create(axis, "g");
        scene.set_attr(g, "class", "tick");
        scene.set_attr(
            g,
            "transform",
            format!("translate(0,{})", fmt_number(year.apply(tick as f64))),
        );
        let line = scene.create(g, "line");
        scene.set_attr(line, "stroke", "currentColor");
        scene.set_attr(line, "x2", fmt_number(width));
        let text = scene.create(g, "text");
        scene.set_attr(text, "fill", "currentColor");
        scene.set_attr(text, "x", "-3");
        scene.set_attr(text, "dy", "0.32em");
        scene.set_text(text, tick.to_string());
    }
    axis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_ticks_over_a_full_year() {
        let calendar =
            CalendarScale::from_dates([date(0, 1, 5), date(0, 12, 20)], 735.0).unwrap();
        let ticks = month_ticks(&calendar);
        assert_eq!(ticks.len(), 13);
        assert_eq!(month_label(ticks[0]), "Jan");
        assert_eq!(month_label(ticks[11]), "Dec");
        assert_eq!(month_label(ticks[12]), "Jan");
        assert_eq!(calendar.position(ticks[0]), 0.0);
        assert_eq!(calendar.position(ticks[12]), 735.0);
    }

    #[test]
    fn test_month_ticks_over_a_partial_year() {
        let calendar =
            CalendarScale::from_dates([date(0, 3, 15), date(0, 8, 29)], 735.0).unwrap();
        let labels: Vec<String> = month_ticks(&calendar).iter().copied().map(month_label).collect();
        assert_eq!(labels, vec!["Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep"]);
    }

    #[test]
    fn test_year_ticks_enumerate_without_thinning() {
        let ticks = year_ticks((1980, 2021));
        assert_eq!(ticks.len(), 42);
        assert_eq!(ticks[0], 1980);
        assert_eq!(*ticks.last().unwrap(), 2021);
    }

    #[test]
    fn test_year_axis_draws_one_gridline_per_year() {
        let year = LinearScale::new("year", (1980.0, 2021.0), (760.0, 0.0)).unwrap();
        let mut scene = Scene::new("svg");
        let root = scene.root();
        let axis = render_year_axis(&mut scene, root, &year, (1980, 2021), 735.0);

        let ticks: Vec<NodeId> = scene
            .children(axis)
            .iter()
            .copied()
            .filter(|id| scene.get(*id).map(|e| e.tag()) == Some("g"))
            .collect();
        assert_eq!(ticks.len(), 42);

        let first = scene.get(ticks[0]).unwrap();
        assert_eq!(first.attr("transform"), Some("translate(0,760)"));
        let line = scene.get(scene.children(ticks[0])[0]).unwrap();
        assert_eq!(line.attr("x2"), Some("735"));
        let text = scene.get(scene.children(ticks[0])[1]).unwrap();
        assert_eq!(text.text(), Some("1980"));
    }

    #[test]
    fn test_month_axis_sits_above_the_plot() {
        let calendar =
            CalendarScale::from_dates([date(0, 1, 5), date(0, 12, 20)], 735.0).unwrap();
        let mut scene = Scene::new("svg");
        let root = scene.root();
        let axis = render_month_axis(&mut scene, root, &calendar);

        let g = scene.get(axis).unwrap();
        assert_eq!(g.attr("transform"), Some("translate(0,-20)"));
        assert_eq!(g.attr("class"), Some("x-axis"));
    }
}
