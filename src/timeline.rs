//! The timeline chart: scaffolding, scales and the keyed hierarchical join
//!
//! A [`Timeline`] owns the scene tree and a two-level key map mirroring it:
//! year to group, then disaster name to mark. Each render pass reconciles
//! those maps against the incoming record set. Keys present on both sides
//! update in place, keys only in the records create elements, keys only in
//! the maps destroy them. Correctness depends on the (year, name) keys alone,
//! never on input order.
//!
//! Scales are computed once at construction over the full dataset and stay
//! fixed, so rendering a filtered subset later keeps every axis position
//! stable.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::annotate::mark_costliest;
use crate::axis;
use crate::config::TimelineConfig;
use crate::glyph::half_disc_path;
use crate::records::DisasterRecord;
use crate::scales::{ScaleError, ScaleSet};
use crate::scene::{NodeId, Scene};
use crate::svg::{self, fmt_number};

#[derive(Debug, Error)]
pub enum TimelineError {
    #[error("dataset is empty")]
    EmptyDataset,
    #[error(transparent)]
    Scale(#[from] ScaleError),
}

/// Visual state of one disaster mark. The label handle doubles as the
/// costliest flag's visual presence: `Some` exactly while the record holds
/// the flag.
#[derive(Debug)]
struct MarkSlot {
    group: NodeId,
    label: Option<NodeId>,
}

/// Visual state of one year group and the marks keyed inside it.
#[derive(Debug)]
struct YearSlot {
    group: NodeId,
    marks: BTreeMap<String, MarkSlot>,
}

#[derive(Debug)]
pub struct Timeline {
    scales: ScaleSet,
    scene: Scene,
    chart: NodeId,
    years: BTreeMap<i32, YearSlot>,
}

impl Timeline {
    /// Build scales from the full record set and append the static chart
    /// scaffolding: margin group, both axes, the clipping mask and the
    /// (initially empty) chart layer the join renders into.
    pub fn new(
        config: &TimelineConfig,
        records: &[DisasterRecord],
    ) -> Result<Self, TimelineError> {
        if records.is_empty() {
            return Err(TimelineError::EmptyDataset);
        }
        let scales = ScaleSet::from_records(records, config)?;

        let mut scene = Scene::new("svg");
        let root = scene.root();
        scene.set_attr(root, "xmlns", "http://www.w3.org/2000/svg");
        scene.set_attr(root, "width", fmt_number(config.container_width));
        scene.set_attr(root, "height", fmt_number(config.container_height));

        let chart_area = scene.create(root, "g");
        scene.set_attr(
            chart_area,
            "transform",
            format!(
                "translate({},{})",
                fmt_number(config.margin.left),
                fmt_number(config.margin.top)
            ),
        );

        // Axes are static for the session, rendered once here.
        axis::render_year_axis(
            &mut scene,
            chart_area,
            &scales.year,
            scales.year_bounds,
            config.plot_width(),
        );
        axis::render_month_axis(&mut scene, chart_area, &scales.calendar);

        // Clipping mask so glyphs at the first and last month do not spill
        // past the plot edges.
        let defs = scene.create(chart_area, "defs");
        let clip = scene.create(defs, "clipPath");
        scene.set_attr(clip, "id", "chart-mask");
        let mask = scene.create(clip, "rect");
        scene.set_attr(mask, "width", fmt_number(config.plot_width()));
        scene.set_attr(mask, "y", fmt_number(-config.margin.top));
        scene.set_attr(mask, "height", fmt_number(config.container_height));

        let chart = scene.create(chart_area, "g");
        scene.set_attr(chart, "clip-path", "url(#chart-mask)");

        tracing::info!(
            years = ?scales.year_bounds,
            records = records.len(),
            "timeline initialized"
        );
        Ok(Self {
            scales,
            scene,
            chart,
            years: BTreeMap::new(),
        })
    }

    /// Run one render pass over `records`: recompute costliest flags, then
    /// reconcile both join levels. Safe to call repeatedly; an unchanged
    /// record set leaves the scene untouched.
    pub fn render(&mut self, records: &mut [DisasterRecord]) {
        mark_costliest(records);

        // Group the pass's records by year, keeping the last record per
        // (year, name) key. Records without a year fall out entirely;
        // records without a date keep their year group alive but get no
        // mark.
        let mut current: BTreeMap<i32, BTreeMap<String, &DisasterRecord>> = BTreeMap::new();
        for record in records.iter() {
            let year = match record.year {
                Some(year) => year,
                None => {
                    tracing::debug!(name = %record.name, "record without year skipped");
                    continue;
                }
            };
            let group = current.entry(year).or_default();
            if record.date.is_none() {
                tracing::debug!(name = %record.name, year, "record without date gets no mark");
                continue;
            }
            if group.insert(record.name.clone(), record).is_some() {
                tracing::warn!(name = %record.name, year, "duplicate key, last record wins");
            }
        }

        // Level 1 exit: years that vanished take their whole subtree along.
        let stale: Vec<i32> = self
            .years
            .keys()
            .filter(|year| !current.contains_key(year))
            .copied()
            .collect();
        for year in stale {
            if let Some(slot) = self.years.remove(&year) {
                self.scene.remove(slot.group);
                tracing::debug!(year, "year group removed");
            }
        }

        // Level 1 enter: position is set once at creation and never moved on
        // later passes.
        for &year in current.keys() {
            if !self.years.contains_key(&year) {
                let group = self.scene.create(self.chart, "g");
                self.scene.set_attr(group, "class", "year");
                let y = self.scales.year.apply(year as f64);
                self.scene.set_attr(group, "transform", format!("translate(0,{})", fmt_number(y)));
                self.years.insert(
                    year,
                    YearSlot {
                        group,
                        marks: BTreeMap::new(),
                    },
                );
            }
        }

        // Level 2 and 3, per surviving year group.
        for (year, group_records) in &current {
            let slot = match self.years.get_mut(year) {
                Some(slot) => slot,
                None => continue,
            };
            reconcile_marks(&mut self.scene, &self.scales, slot, group_records);
        }

        tracing::debug!(
            years = self.years.len(),
            live = self.scene.live_count(),
            "render pass complete"
        );
    }

    /// Serialize the current scene as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        svg::render(&self.scene)
    }
}

/// Reconcile one year's marks against its current records, then settle each
/// mark's annotation label from the costliest flag.
fn reconcile_marks(
    scene: &mut Scene,
    scales: &ScaleSet,
    slot: &mut YearSlot,
    current: &BTreeMap<String, &DisasterRecord>,
) {
    let stale: Vec<String> = slot
        .marks
        .keys()
        .filter(|name| !current.contains_key(*name))
        .cloned()
        .collect();
    for name in stale {
        if let Some(mark) = slot.marks.remove(&name) {
            scene.remove(mark.group);
        }
    }

    for (name, record) in current {
        let date = match record.date {
            Some(date) => date,
            None => continue,
        };
        if !slot.marks.contains_key(name) {
            // Enter: x position and glyph are fixed at creation. A record
            // without a cost still gets a positioned mark, just no glyph.
            let group = scene.create(slot.group, "g");
            scene.set_attr(group, "class", "disaster");
            let x = scales.calendar.x(date);
            scene.set_attr(group, "transform", format!("translate({},0)", fmt_number(x)));
            if let Some(cost) = record.cost {
                let path = scene.create(group, "path");
                scene.set_attr(path, "class", "mark");
                scene.set_attr(path, "fill", scales.color.color(&record.category));
                scene.set_attr(path, "d", half_disc_path(scales.radius.apply(cost)));
            }
            slot.marks.insert(name.clone(), MarkSlot { group, label: None });
        }

        // The label is a presence toggle re-evaluated every pass, created
        // when the record becomes costliest and destroyed when it stops.
        let mark = match slot.marks.get_mut(name) {
            Some(mark) => mark,
            None => continue,
        };
        match (record.is_costliest, mark.label) {
            (true, None) => {
                let label = scene.create(mark.group, "text");
                scene.set_attr(label, "class", "annotation");
                scene.set_attr(label, "dominant-baseline", "hanging");
                scene.set_attr(label, "text-anchor", "middle");
                scene.set_attr(label, "fill", "black");
                scene.set_attr(label, "font-size", "11");
                scene.set_attr(label, "y", "2");
                scene.set_text(label, record.display_name.clone());
                mark.label = Some(label);
            }
            (false, Some(label)) => {
                scene.remove(label);
                mark.label = None;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::parse_records;

    const SAMPLE: &str = "\
name,display_name,category,year,mid,cost
katrina,Hurricane Katrina,tropical-cyclone,2005,2005-08-29,125000000000
dennis,Hurricane Dennis,tropical-cyclone,2005,2005-07-10,2500000000
andrew,Hurricane Andrew,tropical-cyclone,1992,1992-08-29,27000000000
blizzard,Superstorm Blizzard,winter-storm-freeze,1993,1993-03-13,5500000000
";

    fn build(csv: &str) -> (Timeline, Vec<DisasterRecord>) {
        let records = parse_records(csv).unwrap();
        let timeline = Timeline::new(&TimelineConfig::default(), &records).unwrap();
        (timeline, records)
    }

    fn year_group(timeline: &Timeline, year: i32) -> NodeId {
        timeline.years[&year].group
    }

    fn mark_group(timeline: &Timeline, year: i32, name: &str) -> NodeId {
        timeline.years[&year].marks[name].group
    }

    fn mark_children_tags(timeline: &Timeline, year: i32, name: &str) -> Vec<&'static str> {
        let group = mark_group(timeline, year, name);
        timeline
            .scene
            .children(group)
            .iter()
            .filter_map(|id| timeline.scene.get(*id).map(|e| e.tag()))
            .collect()
    }

    #[test]
    fn test_scaffolding_structure() {
        let (timeline, _) = build(SAMPLE);
        let scene = &timeline.scene;

        let root = scene.get(scene.root()).unwrap();
        assert_eq!(root.attr("width"), Some("800"));
        assert_eq!(root.attr("height"), Some("900"));

        let chart_area = scene.children(scene.root())[0];
        assert_eq!(
            scene.get(chart_area).unwrap().attr("transform"),
            Some("translate(45,120)")
        );

        let tags: Vec<&str> = scene
            .children(chart_area)
            .iter()
            .map(|id| {
                let e = scene.get(*id).unwrap();
                e.attr("class").unwrap_or(e.tag())
            })
            .collect();
        assert_eq!(tags, vec!["y-axis", "x-axis", "defs", "g"]);

        assert_eq!(
            scene.get(timeline.chart).unwrap().attr("clip-path"),
            Some("url(#chart-mask)")
        );
    }

    #[test]
    fn test_round_trip_katrina() {
        let (mut timeline, mut records) = build(SAMPLE);
        timeline.render(&mut records);

        // Katrina alone carries the 2005 flag.
        let costliest_2005: Vec<&str> = records
            .iter()
            .filter(|r| r.year == Some(2005) && r.is_costliest)
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(costliest_2005, vec!["katrina"]);

        // Its glyph radius comes straight from the cost scale.
        let tags = mark_children_tags(&timeline, 2005, "katrina");
        assert_eq!(tags, vec!["path", "text"]);
        let katrina = mark_group(&timeline, 2005, "katrina");
        let path = timeline.scene.children(katrina)[0];
        let expected = half_disc_path(timeline.scales.radius.apply(125_000_000_000.0));
        assert_eq!(timeline.scene.get(path).unwrap().attr("d"), Some(expected.as_str()));

        // Aug 29 lands on the same x in 2005 and 1992.
        let andrew = mark_group(&timeline, 1992, "andrew");
        assert_eq!(
            timeline.scene.get(katrina).unwrap().attr("transform"),
            timeline.scene.get(andrew).unwrap().attr("transform"),
        );

        // The label hangs centered under the glyph.
        let label = timeline.scene.children(katrina)[1];
        let label = timeline.scene.get(label).unwrap();
        assert_eq!(label.text(), Some("Hurricane Katrina"));
        assert_eq!(label.attr("text-anchor"), Some("middle"));
        assert_eq!(label.attr("dominant-baseline"), Some("hanging"));
    }

    #[test]
    fn test_rerender_is_idempotent() {
        let (mut timeline, mut records) = build(SAMPLE);
        timeline.render(&mut records);

        let created = timeline.scene.created_total();
        let removed = timeline.scene.removed_total();
        let first = timeline.to_svg();

        timeline.render(&mut records);
        assert_eq!(timeline.scene.created_total(), created);
        assert_eq!(timeline.scene.removed_total(), removed);
        assert_eq!(timeline.to_svg(), first);
    }

    #[test]
    fn test_render_ignores_input_order() {
        let (mut a, mut records) = build(SAMPLE);
        a.render(&mut records);

        let (mut b, mut reversed) = build(SAMPLE);
        reversed.reverse();
        b.render(&mut reversed);

        assert_eq!(a.to_svg(), b.to_svg());
    }

    #[test]
    fn test_removing_a_year_removes_its_whole_subtree() {
        let (mut timeline, mut records) = build(SAMPLE);
        timeline.render(&mut records);
        let live_before = timeline.scene.live_count();
        // Year group, two marks, one glyph path each, one label.
        assert!(timeline.years.contains_key(&2005));

        let mut filtered: Vec<DisasterRecord> = records
            .iter()
            .filter(|r| r.year != Some(2005))
            .cloned()
            .collect();
        timeline.render(&mut filtered);

        assert!(!timeline.years.contains_key(&2005));
        // g.year + g.disaster x2 + path x2 + text = 6 elements gone.
        assert_eq!(timeline.scene.live_count(), live_before - 6);
        // Untouched years keep their groups.
        assert!(timeline.years.contains_key(&1992));
        // No dangling children under the chart layer.
        for id in timeline.scene.children(timeline.chart) {
            assert!(timeline.scene.get(*id).is_some());
        }
    }

    #[test]
    fn test_label_follows_the_costliest_flag() {
        let (mut timeline, mut records) = build(SAMPLE);
        timeline.render(&mut records);
        assert_eq!(mark_children_tags(&timeline, 2005, "dennis"), vec!["path"]);
        let dennis_before = mark_group(&timeline, 2005, "dennis");

        // Without Katrina, Dennis becomes 2005's costliest: same mark, new
        // label.
        let mut without_katrina: Vec<DisasterRecord> = records
            .iter()
            .filter(|r| r.name != "katrina")
            .cloned()
            .collect();
        timeline.render(&mut without_katrina);
        assert_eq!(mark_group(&timeline, 2005, "dennis"), dennis_before);
        assert_eq!(
            mark_children_tags(&timeline, 2005, "dennis"),
            vec!["path", "text"]
        );

        // Katrina returns; Dennis keeps his mark but loses the label.
        timeline.render(&mut records);
        assert_eq!(mark_group(&timeline, 2005, "dennis"), dennis_before);
        assert_eq!(mark_children_tags(&timeline, 2005, "dennis"), vec!["path"]);
        assert_eq!(
            mark_children_tags(&timeline, 2005, "katrina"),
            vec!["path", "text"]
        );
    }

    #[test]
    fn test_update_never_moves_or_rebuilds_a_mark() {
        let (mut timeline, mut records) = build(SAMPLE);
        timeline.render(&mut records);
        let katrina = mark_group(&timeline, 2005, "katrina");
        let transform = timeline
            .scene
            .get(katrina)
            .unwrap()
            .attr("transform")
            .unwrap()
            .to_string();
        let path = timeline.scene.children(katrina)[0];

        timeline.render(&mut records);
        assert_eq!(mark_group(&timeline, 2005, "katrina"), katrina);
        assert_eq!(
            timeline.scene.get(katrina).unwrap().attr("transform"),
            Some(transform.as_str())
        );
        assert_eq!(timeline.scene.children(katrina)[0], path);
    }

    #[test]
    fn test_duplicate_key_last_record_wins() {
        let csv = "\
name,display_name,category,year,mid,cost
storm,First Storm,severe-storm,2001,2001-05-01,1000000000
storm,Second Storm,severe-storm,2001,2001-06-01,2000000000
other,Other Event,flooding,2002,2002-02-02,3000000000
";
        let (mut timeline, mut records) = build(csv);
        timeline.render(&mut records);

        let slot = &timeline.years[&2001];
        assert_eq!(slot.marks.len(), 1);
        let storm = mark_group(&timeline, 2001, "storm");
        let path = timeline.scene.children(storm)[0];
        let expected = half_disc_path(timeline.scales.radius.apply(2_000_000_000.0));
        assert_eq!(timeline.scene.get(path).unwrap().attr("d"), Some(expected.as_str()));
        // Positioned at the June date of the surviving record.
        let x = timeline.scales.calendar.x(chrono::NaiveDate::from_ymd_opt(2001, 6, 1).unwrap());
        assert_eq!(
            timeline.scene.get(storm).unwrap().attr("transform"),
            Some(format!("translate({},0)", fmt_number(x)).as_str())
        );
    }

    #[test]
    fn test_dateless_record_keeps_year_group_without_mark() {
        let csv = "\
name,display_name,category,year,mid,cost
ghost,Ghost Event,flooding,2003,,4000000000
other,Other Event,flooding,2004,2004-02-02,3000000000
";
        let (mut timeline, mut records) = build(csv);
        timeline.render(&mut records);

        assert!(timeline.years.contains_key(&2003));
        assert!(timeline.years[&2003].marks.is_empty());
        assert_eq!(timeline.scene.children(year_group(&timeline, 2003)), &[]);
    }

    #[test]
    fn test_costless_record_gets_mark_without_glyph() {
        let csv = "\
name,display_name,category,year,mid,cost
unpriced,Unpriced Event,flooding,2003,2003-04-05,
other,Other Event,flooding,2004,2004-02-02,3000000000
third,Third Event,severe-storm,2004,2004-07-07,500000000
";
        let (mut timeline, mut records) = build(csv);
        timeline.render(&mut records);

        // Positioned mark, no path, and never a label.
        assert!(mark_children_tags(&timeline, 2003, "unpriced").is_empty());
        let mark = mark_group(&timeline, 2003, "unpriced");
        assert!(timeline.scene.get(mark).unwrap().attr("transform").is_some());
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let err = Timeline::new(&TimelineConfig::default(), &[]).unwrap_err();
        assert!(matches!(err, TimelineError::EmptyDataset));
    }

    #[test]
    fn test_uncovered_category_is_rejected() {
        let csv = "\
name,display_name,category,year,mid,cost
rock,Falling Rock,asteroid,2003,2003-04-05,1000
other,Other Event,flooding,2004,2004-02-02,3000000000
";
        let records = parse_records(csv).unwrap();
        let err = Timeline::new(&TimelineConfig::default(), &records).unwrap_err();
        assert!(matches!(
            err,
            TimelineError::Scale(ScaleError::UncoveredCategory { .. })
        ));
    }
}
