//! Chart-ready data for the correlation dashboard.
//!
//! Produces plain serializable line series in the shape expected by
//! lightweight-charts style front ends. Nothing here renders anything.

use serde::Serialize;

use crate::correlation::AssetCorrelationMap;
use crate::series::PriceSeries;

/// Line color of the reference asset in the price overlay.
pub const REFERENCE_COLOR: &str = "orange";

/// Line color of every other asset in the price overlay.
pub const ASSET_COLOR: &str = "lightgray";

/// One point on a line series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Horizontal coordinate: a `YYYY-MM-DD` date or a window size.
    pub time: String,
    /// Vertical coordinate.
    pub value: f64,
}

/// A titled line series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    /// Legend title.
    pub title: String,
    /// Line color; the front end picks one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Line width in pixels.
    pub line_width: u32,
    /// Points in drawing order. Never contains NaN values.
    pub points: Vec<ChartPoint>,
}

/// Min-max scale `values` into `[0, 1]`.
///
/// Missing (NaN) values stay NaN and are ignored when finding the range.
/// A constant series divides zero by zero and comes back as all NaN.
pub fn normalize_series(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if min > max {
        return vec![f64::NAN; values.len()];
    }

    let range = max - min;
    values.iter().map(|v| (v - min) / range).collect()
}

fn dated_points(series: &PriceSeries<'_>) -> Vec<ChartPoint> {
    let normalized = normalize_series(series.values());
    series
        .index()
        .iter()
        .zip(normalized)
        .filter(|(_, value)| !value.is_nan())
        .map(|(ts, value)| ChartPoint {
            time: ts.date_naive().to_string(),
            value,
        })
        .collect()
}

/// Normalized price overlay: the reference first, then every other asset.
///
/// Entries in `assets` named `reference_symbol` are skipped so the
/// reference is drawn once.
pub fn price_overlay(
    reference: &PriceSeries<'_>,
    assets: &[(String, PriceSeries<'_>)],
    reference_symbol: &str,
) -> Vec<ChartSeries> {
    let mut series = Vec::with_capacity(assets.len() + 1);
    series.push(ChartSeries {
        title: reference_symbol.to_string(),
        color: Some(REFERENCE_COLOR.to_string()),
        line_width: 2,
        points: dated_points(reference),
    });

    series.extend(
        assets
            .iter()
            .filter(|(symbol, _)| symbol != reference_symbol)
            .map(|(symbol, prices)| ChartSeries {
                title: symbol.clone(),
                color: Some(ASSET_COLOR.to_string()),
                line_width: 1,
                points: dated_points(prices),
            }),
    );

    series
}

/// One line per asset over window sizes. Undefined correlations become gaps.
pub fn correlation_chart(correlations: &AssetCorrelationMap) -> Vec<ChartSeries> {
    correlations
        .iter()
        .map(|(asset, by_window)| ChartSeries {
            title: asset.to_string(),
            color: None,
            line_width: 2,
            points: by_window
                .iter()
                .filter(|(_, value)| !value.is_nan())
                .map(|(window, value)| ChartPoint {
                    time: window.to_string(),
                    value,
                })
                .collect(),
        })
        .collect()
}
