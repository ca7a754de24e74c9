//! Metric whitelist and display colors
//!
//! Only columns named in the palette are eligible for the time-series plot.
//! Each recognized metric is bound to a fixed display color.

use serde::{Deserialize, Serialize};

/// Color used for numeric columns outside the whitelist (row-index fallback plot)
pub const FALLBACK_COLOR: &str = "#cccccc";

/// One whitelisted metric column and its display color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricColor {
    pub name: String,
    pub color: String,
}

/// Ordered metric whitelist with fixed colors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricPalette {
    entries: Vec<MetricColor>,
}

impl MetricPalette {
    /// Build a palette from `(name, color)` pairs, keeping the given order
    pub fn new<I, N, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, color)| MetricColor {
                    name: name.into(),
                    color: color.into(),
                })
                .collect(),
        }
    }

    /// Kinovea export columns recognized by the dashboard
    pub fn kinovea() -> Self {
        Self::new([
            ("TE", "#1f77b4"),
            ("FK", "#ff7f0e"),
            ("TS", "#2ca02c"),
            ("FH", "#d62728"),
            ("Angle 1 - o", "#9467bd"),
            ("Angle 1 - a", "#8c564b"),
            ("Angle 1 - b", "#e377c2"),
        ])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Color bound to `name`, if whitelisted
    pub fn color_for(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.color.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MetricPalette {
    fn default() -> Self {
        Self::kinovea()
    }
}
