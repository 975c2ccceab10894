// Chart requests - which chart of which metric a view asks the backend for
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dashboard route codes and the backend metric names they stand for.
const METRIC_CODES: &[(&str, &str)] = &[
    ("wacr", "wacr"),
    ("tct", "total compression time"),
    ("tcm", "total compression memory"),
    ("pcm", "peak compression memory"),
    ("pcc", "compression cpu usage"),
    ("pdm", "peak decompression memory"),
    ("pdc", "decompression cpu usage"),
    ("tdt", "total decompression time"),
    ("tdm", "total decompression memory"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Barchart,
    Plot,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Barchart => "barchart",
            ChartKind::Plot => "plot",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "barchart" => Ok(ChartKind::Barchart),
            "plot" => Ok(ChartKind::Plot),
            other => Err(format!("unknown chart kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub option: String,
}

impl ChartRequest {
    pub fn new(kind: ChartKind, option: impl Into<String>) -> Self {
        Self {
            kind,
            option: option.into(),
        }
    }

    /// Metric name sent to the backend for this request's option.
    pub fn metric_name(&self) -> String {
        resolve_metric(&self.option)
    }
}

/// Normalize a route option ("Total_compression_time", "tct") to a backend metric name.
/// Unknown options pass through normalized.
pub fn resolve_metric(option: &str) -> String {
    let normalized = option.trim().replace('_', " ").to_lowercase();
    METRIC_CODES
        .iter()
        .find(|(code, _)| *code == normalized)
        .map(|(_, name)| name.to_string())
        .unwrap_or(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_metric_codes() {
        assert_eq!(resolve_metric("tct"), "total compression time");
        assert_eq!(resolve_metric("PDM"), "peak decompression memory");
        assert_eq!(resolve_metric("wacr"), "wacr");
    }

    #[test]
    fn test_resolve_metric_passthrough() {
        assert_eq!(resolve_metric("Compressed_size"), "compressed size");
        assert_eq!(resolve_metric("original size"), "original size");
    }

    #[test]
    fn test_chart_kind_parse() {
        assert_eq!("barchart".parse::<ChartKind>().unwrap(), ChartKind::Barchart);
        assert_eq!(ChartKind::Plot.to_string(), "plot");
        assert!("pie".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_request_metric_name() {
        let request = ChartRequest::new(ChartKind::Barchart, "tdt");
        assert_eq!(request.metric_name(), "total decompression time");
    }
}
