//! Channel performance aggregation over a combined dataset.
//!
//! [`aggregate`] resolves the canonical fields, sums and averages the numeric
//! ones, finds the posting hour and weekday with the highest mean views, and
//! lists weak points against the configured thresholds. Unresolved fields and
//! empty data contribute zero rather than failing.

use std::{collections::BTreeMap, fmt};

use chrono::{Datelike, Timelike, Weekday};
use log::debug;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Serialize, Serializer};

use crate::{
    config::{AnalyzerConfig, Thresholds},
    data::{parse_metric, parse_timestamp},
    dataset::Dataset,
    resolver::{Field, FieldMap},
};

pub const NOT_ENOUGH_DATA: &str = "Not enough data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeakPoint {
    LowCtr,
    LowWatchTime,
    LowEngagement,
    NoCriticalWeaknesses,
}

impl WeakPoint {
    pub fn message(self) -> &'static str {
        match self {
            WeakPoint::LowCtr => "Low CTR – Improve thumbnails & titles",
            WeakPoint::LowWatchTime => "Low watch time – Hook viewers in first 5 seconds",
            WeakPoint::LowEngagement => "Low engagement – Ask viewers to like & comment",
            WeakPoint::NoCriticalWeaknesses => "No critical weaknesses detected",
        }
    }

    pub fn is_weakness(self) -> bool {
        self != WeakPoint::NoCriticalWeaknesses
    }
}

impl fmt::Display for WeakPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for WeakPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub rows: usize,
    #[serde(serialize_with = "serialize_total")]
    pub total_views: f64,
    pub avg_views: i64,
    #[serde(serialize_with = "serialize_total")]
    pub total_likes: f64,
    #[serde(serialize_with = "serialize_total")]
    pub total_comments: f64,
    pub avg_ctr: f64,
    pub avg_watch: i64,
    pub engagement_rate: f64,
    pub best_hour: Option<u32>,
    pub best_time: String,
    pub best_day: String,
    pub weak_points: Vec<WeakPoint>,
    pub fields: FieldMap,
}

/// Aggregates with the canonical synonyms and thresholds.
pub fn aggregate(dataset: &Dataset) -> Report {
    aggregate_with(dataset, &AnalyzerConfig::default())
}

pub fn aggregate_with(dataset: &Dataset, config: &AnalyzerConfig) -> Report {
    let fields = FieldMap::resolve(dataset.columns(), &config.synonyms);
    for (field, column) in fields.iter() {
        debug!("Field '{field}' resolved to {column:?}");
    }

    let views = column_summary(dataset, fields.column(Field::Views));
    let likes = column_summary(dataset, fields.column(Field::Likes));
    let comments = column_summary(dataset, fields.column(Field::Comments));
    let ctr = column_summary(dataset, fields.column(Field::Ctr));
    let watch = column_summary(dataset, fields.column(Field::WatchTime));

    let total_views = views.sum;
    let total_likes = likes.sum;
    let total_comments = comments.sum;
    let avg_views = views.mean().map_or(0, truncate);
    let avg_ctr = ctr.mean().map_or(0.0, round2);
    let avg_watch = watch.mean().map_or(0, truncate);
    let engagement_rate = engagement_rate(total_views, total_likes, total_comments);

    let slot = match (fields.column(Field::PublishTime), fields.column(Field::Views)) {
        (Some(publish_column), Some(views_column)) => {
            best_posting_slot(dataset, publish_column, views_column)
        }
        _ => None,
    };
    let (best_hour, best_time, best_day) = match slot {
        Some(slot) => (
            Some(slot.hour),
            hour_label(slot.hour),
            day_name(slot.day).to_string(),
        ),
        None => (None, NOT_ENOUGH_DATA.to_string(), NOT_ENOUGH_DATA.to_string()),
    };

    let weak_points = weak_points(avg_ctr, avg_watch, engagement_rate, &config.thresholds);

    Report {
        rows: dataset.row_count(),
        total_views,
        avg_views,
        total_likes,
        total_comments,
        avg_ctr,
        avg_watch,
        engagement_rate,
        best_hour,
        best_time,
        best_day,
        weak_points,
        fields,
    }
}

/// `(likes + comments) / views` as a percentage; zero when there are no views.
pub fn engagement_rate(total_views: f64, total_likes: f64, total_comments: f64) -> f64 {
    if total_views > 0.0 {
        round2((total_likes + total_comments) / total_views * 100.0)
    } else {
        0.0
    }
}

pub fn weak_points(
    avg_ctr: f64,
    avg_watch: i64,
    engagement_rate: f64,
    thresholds: &Thresholds,
) -> Vec<WeakPoint> {
    let mut points = Vec::new();
    if avg_ctr < thresholds.ctr {
        points.push(WeakPoint::LowCtr);
    }
    if (avg_watch as f64) < thresholds.watch_time {
        points.push(WeakPoint::LowWatchTime);
    }
    if engagement_rate < thresholds.engagement {
        points.push(WeakPoint::LowEngagement);
    }
    if points.is_empty() {
        points.push(WeakPoint::NoCriticalWeaknesses);
    }
    points
}

/// Formats an hour of day on a 12-hour clock, e.g. `0` as `12:00 AM`.
pub fn hour_label(hour: u32) -> String {
    let display = match hour % 12 {
        0 => 12,
        other => other,
    };
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    format!("{display}:00 {meridiem}")
}

pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PostingSlot {
    hour: u32,
    day: Weekday,
}

#[derive(Debug, Clone, Copy, Default)]
struct Summary {
    sum: f64,
    count: usize,
}

impl Summary {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

fn column_summary(dataset: &Dataset, column: Option<&str>) -> Summary {
    let mut summary = Summary::default();
    if let Some(column) = column {
        dataset
            .column_values(column)
            .filter_map(|cell| cell.and_then(parse_metric))
            .for_each(|value| summary.add(value));
    }
    summary
}

/// Picks the hour and weekday with the highest mean views.
///
/// Groups are visited in ascending key order and only a strictly greater mean
/// replaces the current best, so ties go to the lowest hour and to the
/// alphabetically first day name.
fn best_posting_slot(dataset: &Dataset, publish: &str, views: &str) -> Option<PostingSlot> {
    let mut by_hour: BTreeMap<u32, Summary> = BTreeMap::new();
    let mut by_day: BTreeMap<&'static str, (Weekday, Summary)> = BTreeMap::new();

    let pairs = dataset
        .column_values(publish)
        .zip(dataset.column_values(views))
        .filter_map(|(stamp, count)| {
            let stamp = stamp.and_then(parse_timestamp)?;
            let count = count.and_then(parse_metric)?;
            Some((stamp, count))
        });
    for (stamp, count) in pairs {
        by_hour.entry(stamp.hour()).or_default().add(count);
        let weekday = stamp.weekday();
        by_day
            .entry(day_name(weekday))
            .or_insert_with(|| (weekday, Summary::default()))
            .1
            .add(count);
    }

    let hour = first_max(by_hour.iter().map(|(hour, summary)| (*hour, summary)))?;
    let day = first_max(by_day.values().map(|(day, summary)| (*day, summary)))?;
    debug!(
        "Best posting slot from {} hour group(s) and {} day group(s)",
        by_hour.len(),
        by_day.len()
    );
    Some(PostingSlot { hour, day })
}

fn first_max<'a, K>(groups: impl Iterator<Item = (K, &'a Summary)>) -> Option<K> {
    let mut best: Option<(K, f64)> = None;
    for (key, summary) in groups {
        let Some(mean) = summary.mean() else {
            continue;
        };
        if best.as_ref().is_none_or(|(_, top)| mean > *top) {
            best = Some((key, mean));
        }
    }
    best.map(|(key, _)| key)
}

fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

/// Rounds to two decimals, ties to even on the exact binary value.
fn round2(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .and_then(|exact| exact.round_dp(2).to_f64())
        .unwrap_or(value)
}

// Whole-valued sums are written as integers.
fn serialize_total<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(columns: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::from_rows(
            columns.iter().copied(),
            rows.iter().map(|row| row.iter().copied()),
        )
    }

    #[test]
    fn views_and_likes_produce_totals_and_engagement() {
        let data = dataset(&["Views", "Likes"], &[&["10", "1"], &["20", "2"], &["30", "3"]]);
        let report = aggregate(&data);
        assert_eq!(report.total_views, 60.0);
        assert_eq!(report.avg_views, 20);
        assert_eq!(report.total_likes, 6.0);
        assert_eq!(report.total_comments, 0.0);
        assert_eq!(report.engagement_rate, 10.0);
    }

    #[test]
    fn empty_dataset_is_all_zero_with_every_weakness() {
        let report = aggregate(&Dataset::default());
        assert_eq!(report.rows, 0);
        assert_eq!(report.total_views, 0.0);
        assert_eq!(report.avg_views, 0);
        assert_eq!(report.avg_ctr, 0.0);
        assert_eq!(report.avg_watch, 0);
        assert_eq!(report.engagement_rate, 0.0);
        assert_eq!(report.best_time, NOT_ENOUGH_DATA);
        assert_eq!(report.best_day, NOT_ENOUGH_DATA);
        assert_eq!(
            report.weak_points,
            vec![
                WeakPoint::LowCtr,
                WeakPoint::LowWatchTime,
                WeakPoint::LowEngagement
            ]
        );
    }

    #[test]
    fn engagement_never_divides_by_zero() {
        assert_eq!(engagement_rate(0.0, 50.0, 10.0), 0.0);
        let data = dataset(&["Views", "Likes", "Comments"], &[&["0", "9", "4"]]);
        assert_eq!(aggregate(&data).engagement_rate, 0.0);
    }

    #[test]
    fn averages_truncate_and_ctr_rounds() {
        let data = dataset(
            &["Views", "Impressions CTR (%)", "Average view duration"],
            &[&["10", "4.333", "31"], &["11", "5.111", "0:32"]],
        );
        let report = aggregate(&data);
        assert_eq!(report.avg_views, 10);
        assert_eq!(report.avg_ctr, 4.72);
        assert_eq!(report.avg_watch, 31);
    }

    #[test]
    fn unparseable_cells_are_skipped_in_means() {
        let data = dataset(&["Views"], &[&["10"], &["n/a"], &[""], &["20"]]);
        let report = aggregate(&data);
        assert_eq!(report.total_views, 30.0);
        assert_eq!(report.avg_views, 15);
    }

    #[test]
    fn two_decimal_rounding_sends_ties_to_even() {
        let data = dataset(&["Views", "Likes"], &[&["800", "1"]]);
        assert_eq!(aggregate(&data).engagement_rate, 0.12);

        let data = dataset(&["CTR"], &[&["0.1"], &["0.15"]]);
        assert_eq!(aggregate(&data).avg_ctr, 0.12);

        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(2.0), 2.0);
    }

    #[test]
    fn hour_labels_use_twelve_hour_clock() {
        assert_eq!(hour_label(0), "12:00 AM");
        assert_eq!(hour_label(9), "9:00 AM");
        assert_eq!(hour_label(12), "12:00 PM");
        assert_eq!(hour_label(14), "2:00 PM");
        assert_eq!(hour_label(23), "11:00 PM");
    }

    #[test]
    fn best_slot_follows_highest_mean_views() {
        let data = dataset(
            &["Video publish time", "Views"],
            &[
                // Monday 09:00, Tuesday 14:00, Friday 14:00
                &["2024-01-01 09:00:00", "100"],
                &["2024-01-02 14:00:00", "400"],
                &["2024-01-05 14:30:00", "200"],
                &["not a date", "99999"],
            ],
        );
        let report = aggregate(&data);
        assert_eq!(report.best_hour, Some(14));
        assert_eq!(report.best_time, "2:00 PM");
        assert_eq!(report.best_day, "Tuesday");
    }

    #[test]
    fn best_slot_ignores_rows_without_numeric_views() {
        let data = dataset(
            &["Video publish time", "Views"],
            &[
                // Monday 03:00 has no usable view count.
                &["2024-01-01 03:00", "n/a"],
                &["2024-01-01 10:00", "100"],
                &["2024-01-02 11:00", "80"],
            ],
        );
        let report = aggregate(&data);
        assert_eq!(report.best_hour, Some(10));
        assert_eq!(report.best_time, "10:00 AM");
        // Counting the empty row as zero would drop Monday's mean to 50.
        assert_eq!(report.best_day, "Monday");
    }

    #[test]
    fn totals_serialize_as_integers_when_whole() {
        let data = dataset(&["Views", "Likes", "Comments"], &[&["1500", "12", "2.5"]]);
        let value = serde_json::to_value(aggregate(&data)).expect("serialize report");
        assert_eq!(value["total_views"], 1500);
        assert_eq!(value["total_likes"], 12);
        assert_eq!(value["total_comments"], 2.5);
    }

    #[test]
    fn best_slot_ties_prefer_lowest_hour_and_first_day_name() {
        let data = dataset(
            &["Publish date", "Views"],
            &[
                // Wednesday 18:00 and Friday 08:00 share the same views.
                &["2024-01-03 18:00", "50"],
                &["2024-01-05 08:00", "50"],
            ],
        );
        let report = aggregate(&data);
        assert_eq!(report.best_time, "8:00 AM");
        assert_eq!(report.best_day, "Friday");
    }

    #[test]
    fn best_slot_needs_both_publish_and_views() {
        let data = dataset(&["Publish time", "Likes"], &[&["2024-01-01 10:00", "3"]]);
        let report = aggregate(&data);
        assert_eq!(report.best_hour, None);
        assert_eq!(report.best_time, NOT_ENOUGH_DATA);
        assert_eq!(report.best_day, NOT_ENOUGH_DATA);
    }

    #[test]
    fn best_slot_without_parseable_timestamps_is_not_enough_data() {
        let data = dataset(&["Publish time", "Views"], &[&["soon", "3"], &["", "4"]]);
        let report = aggregate(&data);
        assert_eq!(report.best_time, NOT_ENOUGH_DATA);
        assert_eq!(report.best_day, NOT_ENOUGH_DATA);
    }

    #[test]
    fn strong_channel_reports_no_critical_weaknesses() {
        let data = dataset(
            &["Views", "Likes", "Comments", "CTR", "Watch time (s)"],
            &[&["1000", "40", "10", "7.5", "45"]],
        );
        let report = aggregate(&data);
        assert_eq!(report.engagement_rate, 5.0);
        assert_eq!(report.weak_points, vec![WeakPoint::NoCriticalWeaknesses]);
    }

    #[test]
    fn weak_points_keep_fixed_order() {
        let thresholds = Thresholds::default();
        assert_eq!(
            weak_points(1.0, 100, 0.5, &thresholds),
            vec![WeakPoint::LowCtr, WeakPoint::LowEngagement]
        );
        assert_eq!(
            weak_points(9.0, 10, 9.0, &thresholds),
            vec![WeakPoint::LowWatchTime]
        );
    }

    #[test]
    fn custom_thresholds_change_diagnostics() {
        let mut config = AnalyzerConfig::default();
        config.thresholds = Thresholds {
            ctr: 0.0,
            watch_time: 0.0,
            engagement: 0.0,
        };
        let report = aggregate_with(&Dataset::default(), &config);
        assert_eq!(report.weak_points, vec![WeakPoint::NoCriticalWeaknesses]);
    }
}
