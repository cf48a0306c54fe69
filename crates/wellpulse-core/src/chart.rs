//! Read-only views of a [`MetricHistory`] for display.

use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::metrics::{MetricHistory, MetricSample};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One x-position of the metrics area chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// `HH:MM:SS`
    pub time: String,
    pub stress: f64,
    pub focus: f64,
    pub tiredness: f64,
}

/// Points in local time, oldest first.
pub fn chart_points(history: &MetricHistory) -> Vec<ChartPoint> {
    chart_points_in(history, &Local)
}

pub fn chart_points_in<Tz: TimeZone>(history: &MetricHistory, tz: &Tz) -> Vec<ChartPoint>
where
    Tz::Offset: std::fmt::Display,
{
    history
        .iter()
        .map(|s| ChartPoint {
            time: s.timestamp.with_timezone(tz).format("%H:%M:%S").to_string(),
            stress: s.stress_level,
            focus: s.focus_level,
            tiredness: s.tiredness_level,
        })
        .collect()
}

/// Bars for the newest `width` values on a fixed 0..=100 scale.
pub fn sparkline(values: &[f64], width: usize) -> String {
    let skip = values.len().saturating_sub(width);
    values[skip..]
        .iter()
        .map(|v| {
            let norm = (v / 100.0).clamp(0.0, 1.0);
            let idx = (norm * (BARS.len() - 1) as f64).round() as usize;
            BARS[idx.min(BARS.len() - 1)]
        })
        .collect()
}

/// One labelled row per series, with the latest value on the right.
pub fn render_sparklines(history: &MetricHistory, width: usize) -> Vec<String> {
    let series: [(&str, fn(&MetricSample) -> f64); 3] = [
        ("stress", |s| s.stress_level),
        ("focus", |s| s.focus_level),
        ("tiredness", |s| s.tiredness_level),
    ];
    series
        .into_iter()
        .map(|(label, pick)| {
            let values: Vec<f64> = history.iter().map(pick).collect();
            let latest = values
                .last()
                .map_or_else(|| "--".to_string(), |v| format!("{v:>3.0}"));
            format!("{label:<10}{:<width$} {latest}", sparkline(&values, width))
        })
        .collect()
}
