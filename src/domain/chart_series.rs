// Chart series - flat records pivoted onto a shared category axis
use super::flatten::FlatRecord;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

pub const PX_PER_CATEGORY: u32 = 50;
pub const MIN_CHART_WIDTH_PX: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub name: String,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub categories: Vec<String>,
    pub series: Vec<SeriesData>,
}

impl ChartSeries {
    pub fn legend_groups(&self) -> Vec<String> {
        self.series.iter().map(|s| s.name.clone()).collect()
    }

    /// Width a bar chart needs so every category keeps its slot.
    pub fn min_width_px(&self, px_per_category: u32, min: u32) -> u32 {
        let categories = u32::try_from(self.categories.len()).unwrap_or(u32::MAX);
        categories.saturating_mul(px_per_category).max(min)
    }
}

/// Pivot records into one series per legend group.
///
/// Categories and groups keep first-appearance order. When several records
/// share a (group, category) the first wins; absent pairs are zero.
pub fn pivot_series<'a>(records: impl IntoIterator<Item = &'a FlatRecord>) -> ChartSeries {
    let records: Vec<&FlatRecord> = records.into_iter().collect();

    let categories = unique_in_order(records.iter().map(|r| r.x.as_str()));
    let groups = unique_in_order(records.iter().map(|r| r.legendgroup.as_str()));

    let mut values: HashMap<(&str, &str), f64> = HashMap::new();
    for record in &records {
        values
            .entry((record.legendgroup.as_str(), record.x.as_str()))
            .or_insert(record.y);
    }

    let series = groups
        .into_iter()
        .map(|group| {
            let data = categories
                .iter()
                .map(|category| {
                    values
                        .get(&(group.as_str(), category.as_str()))
                        .copied()
                        .unwrap_or(0.0)
                })
                .collect();
            SeriesData { name: group, data }
        })
        .collect();

    ChartSeries { categories, series }
}

fn unique_in_order<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .filter(|item| seen.insert(*item))
        .map(str::to_string)
        .collect()
}
