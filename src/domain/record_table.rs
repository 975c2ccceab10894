// Record table - search and sort over flat records
use super::flatten::FlatRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Legendgroup,
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: Column,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort: Option<SortSpec>,
}

/// Rows matching `query.search` in any column, ordered by `query.sort`.
pub fn query_table(records: &[FlatRecord], query: &TableQuery) -> Vec<FlatRecord> {
    let needle = query.search.to_lowercase();

    let mut rows: Vec<FlatRecord> = records
        .iter()
        .filter(|record| needle.is_empty() || matches_search(record, &needle))
        .cloned()
        .collect();

    if let Some(sort) = query.sort {
        rows.sort_by(|a, b| {
            let ordering = compare(a, b, sort.column);
            match sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }

    rows
}

fn matches_search(record: &FlatRecord, needle: &str) -> bool {
    record.legendgroup.to_lowercase().contains(needle)
        || record.x.to_lowercase().contains(needle)
        || record.y.to_string().contains(needle)
}

fn compare(a: &FlatRecord, b: &FlatRecord, column: Column) -> Ordering {
    match column {
        Column::Legendgroup => a.legendgroup.cmp(&b.legendgroup),
        Column::X => a.x.cmp(&b.x),
        Column::Y => a.y.total_cmp(&b.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<FlatRecord> {
        vec![
            FlatRecord::new("wacr", "Homo_sapiens", 4.2),
            FlatRecord::new("wacr", "E_coli", 3.9),
            FlatRecord::new("total compression time", "Homo_sapiens", 120.0),
            FlatRecord::new("total compression time", "E_coli", 12.5),
        ]
    }

    #[test]
    fn test_empty_query_returns_all_in_order() {
        let rows = query_table(&sample(), &TableQuery::default());
        assert_eq!(rows, sample());
    }

    #[test]
    fn test_search_is_case_insensitive_across_columns() {
        let query = TableQuery {
            search: "e_COLI".to_string(),
            sort: None,
        };
        let rows = query_table(&sample(), &query);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.x == "E_coli"));

        let by_value = TableQuery {
            search: "12.5".to_string(),
            sort: None,
        };
        assert_eq!(query_table(&sample(), &by_value).len(), 1);
    }

    #[test]
    fn test_sort_numeric_descending() {
        let query = TableQuery {
            search: String::new(),
            sort: Some(SortSpec {
                column: Column::Y,
                order: SortOrder::Desc,
            }),
        };
        let values: Vec<f64> = query_table(&sample(), &query).iter().map(|r| r.y).collect();
        assert_eq!(values, vec![120.0, 12.5, 4.2, 3.9]);
    }

    #[test]
    fn test_sort_text_is_stable() {
        let query = TableQuery {
            search: String::new(),
            sort: Some(SortSpec {
                column: Column::X,
                order: SortOrder::Asc,
            }),
        };
        let rows = query_table(&sample(), &query);
        assert_eq!(rows[0], FlatRecord::new("wacr", "E_coli", 3.9));
        assert_eq!(rows[1], FlatRecord::new("total compression time", "E_coli", 12.5));
    }

    #[test]
    fn test_query_deserializes_from_json() {
        let query: TableQuery =
            serde_json::from_str(r#"{"search":"x","sort":{"column":"y","order":"asc"}}"#).unwrap();
        assert_eq!(query.sort.unwrap().column, Column::Y);
    }
}
