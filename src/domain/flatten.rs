// Record flattener - chart payloads to ordered (group, category, value) records
use super::encoded_vector::{decode_f64_le, decode_with_dtype, DecodeError, Dtype};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One (group, category, value) tuple consumed by chart and table renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub legendgroup: String,
    pub x: String,
    pub y: f64,
}

impl FlatRecord {
    pub fn new(legendgroup: impl Into<String>, x: impl Into<String>, y: f64) -> Self {
        Self {
            legendgroup: legendgroup.into(),
            x: x.into(),
            y,
        }
    }
}

/// How the flattener treats series it cannot fully read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlattenPolicy {
    /// Skip unreadable series and zero-fill missing values.
    #[default]
    Lenient,
    /// Fail on anything lenient mode would skip or zero-fill.
    Strict,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenReport {
    pub series_seen: usize,
    pub series_skipped: usize,
    pub values_zero_filled: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum FlattenError {
    #[error("series {series}: {source}")]
    Decode {
        series: usize,
        #[source]
        source: DecodeError,
    },
    #[error("series {series} skipped: {reason}")]
    SkippedSeries { series: usize, reason: &'static str },
    #[error("series {series}: no numeric value at index {index}")]
    MissingValue { series: usize, index: usize },
}

/// Records produced by one payload series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRecords {
    pub index: usize,
    pub records: Vec<FlatRecord>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flattened {
    pub series: Vec<SeriesRecords>,
    pub report: FlattenReport,
}

impl Flattened {
    pub fn records(&self) -> impl Iterator<Item = &FlatRecord> {
        self.series.iter().flat_map(|s| s.records.iter())
    }

    pub fn into_records(self) -> Vec<FlatRecord> {
        self.series.into_iter().flat_map(|s| s.records).collect()
    }

    pub fn record_count(&self) -> usize {
        self.series.iter().map(|s| s.records.len()).sum()
    }
}

/// Flatten a chart payload `{ data: [ { legendgroup, x, y }, ... ] }`.
///
/// A payload that is not an object with a `data` array is not an error under
/// either policy: it flattens to nothing.
pub fn flatten_with_policy(
    payload: &Value,
    policy: FlattenPolicy,
) -> Result<Flattened, FlattenError> {
    let mut flattened = Flattened::default();

    let Some(series_list) = payload.get("data").and_then(Value::as_array) else {
        tracing::debug!("chart payload has no data array, nothing to flatten");
        return Ok(flattened);
    };

    for (index, series) in series_list.iter().enumerate() {
        flattened.report.series_seen += 1;
        match flatten_series(index, series, policy, &mut flattened.report)? {
            Some(records) => flattened.series.push(SeriesRecords { index, records }),
            None => flattened.report.series_skipped += 1,
        }
    }

    tracing::debug!(
        "flattened {} series into {} records ({} skipped, {} zero-filled)",
        flattened.report.series_seen,
        flattened.record_count(),
        flattened.report.series_skipped,
        flattened.report.values_zero_filled
    );

    Ok(flattened)
}

/// Flatten one series. `Ok(None)` means the series was skipped under the lenient policy.
fn flatten_series(
    index: usize,
    series: &Value,
    policy: FlattenPolicy,
    report: &mut FlattenReport,
) -> Result<Option<Vec<FlatRecord>>, FlattenError> {
    let skip = |reason: &'static str| -> Result<Option<Vec<FlatRecord>>, FlattenError> {
        match policy {
            FlattenPolicy::Lenient => {
                tracing::warn!("skipping series {}: {}", index, reason);
                Ok(None)
            }
            FlattenPolicy::Strict => Err(FlattenError::SkippedSeries {
                series: index,
                reason,
            }),
        }
    };

    let values = match read_values(series.get("y")) {
        Ok(Some(values)) => values,
        Ok(None) => return skip("no numeric y values"),
        Err(source) => match policy {
            FlattenPolicy::Lenient => {
                tracing::warn!("skipping series {}: {}", index, source);
                return Ok(None);
            }
            FlattenPolicy::Strict => {
                return Err(FlattenError::Decode {
                    series: index,
                    source,
                });
            }
        },
    };

    let categories = match read_categories(series.get("x")) {
        Ok(Some(categories)) => categories,
        Ok(None) => return skip("no x categories"),
        Err(source) => match policy {
            FlattenPolicy::Lenient => {
                tracing::warn!("skipping series {}: {}", index, source);
                return Ok(None);
            }
            FlattenPolicy::Strict => {
                return Err(FlattenError::Decode {
                    series: index,
                    source,
                });
            }
        },
    };

    let legendgroup = series
        .get("legendgroup")
        .and_then(Value::as_str)
        .or_else(|| series.get("name").and_then(Value::as_str))
        .unwrap_or_default();

    let mut records = Vec::with_capacity(categories.len());
    for (i, x) in categories.into_iter().enumerate() {
        let y = match values.get(i).copied().flatten().filter(|v| v.is_finite()) {
            Some(y) => y,
            None if policy == FlattenPolicy::Strict => {
                return Err(FlattenError::MissingValue {
                    series: index,
                    index: i,
                });
            }
            None => {
                report.values_zero_filled += 1;
                0.0
            }
        };
        records.push(FlatRecord::new(legendgroup, x, y));
    }

    Ok(Some(records))
}

/// Numeric values of `y`: a plain array (non-numeric elements become `None`)
/// or an encoded vector. `Ok(None)` when `y` is neither, or is a non-empty
/// array with no numeric element at all.
fn read_values(y: Option<&Value>) -> Result<Option<Vec<Option<f64>>>, DecodeError> {
    match y {
        Some(Value::Array(items)) => {
            let values: Vec<Option<f64>> = items.iter().map(Value::as_f64).collect();
            if !values.is_empty() && values.iter().all(Option::is_none) {
                return Ok(None);
            }
            Ok(Some(values))
        }
        Some(value) if value.is_object() => Ok(decode_encoded(value)?
            .map(|decoded| decoded.into_iter().map(Some).collect())),
        _ => Ok(None),
    }
}

/// Category labels of `x`. Numeric categories, plain or encoded, are rendered as text.
fn read_categories(x: Option<&Value>) -> Result<Option<Vec<String>>, DecodeError> {
    match x {
        Some(Value::Array(items)) => Ok(Some(items.iter().map(category_label).collect())),
        Some(value) if value.is_object() => Ok(decode_encoded(value)?
            .map(|decoded| decoded.into_iter().map(|v| v.to_string()).collect())),
        _ => Ok(None),
    }
}

/// Decode `{ bdata, dtype? }`. `Ok(None)` when the object carries no `bdata` string.
fn decode_encoded(value: &Value) -> Result<Option<Vec<f64>>, DecodeError> {
    let Some(bdata) = value.get("bdata").and_then(Value::as_str) else {
        return Ok(None);
    };
    let decoded = match value.get("dtype").and_then(Value::as_str) {
        Some(code) => decode_with_dtype(bdata, Dtype::parse(code)?)?,
        None => decode_f64_le(bdata)?,
    };
    Ok(Some(decoded))
}

fn category_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        // Same rendering as decoded categories, so 1.0 and 1 share a label
        Value::Number(n) => n.as_f64().map_or_else(|| n.to_string(), |v| v.to_string()),
        other => other.to_string(),
    }
}
