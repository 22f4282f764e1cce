// src/app/table/export.rs
// Export Dispatcher: builds the exporter GET with the current filters and sort, keeps the
// export trigger disabled while a download runs, and names the downloaded file.

use super::filters::{filters_json, Filter};
use super::grid::Sorter;
use super::location::PageLocation;
use super::request::RequestId;
use log::debug;

pub const EXPORTER_PARAM: &str = "exporter";
pub const FILTERS_PARAM: &str = "filters";

/// Sets `key` like `URLSearchParams.set`: first occurrence replaced, later ones dropped.
fn set_pair(query: &mut Vec<(String, String)>, key: &str, value: &str) {
    match query.iter().position(|(k, _)| k == key) {
        Some(first) => {
            query[first].1 = value.to_string();
            let mut index = 0;
            query.retain(|(k, _)| {
                let keep = k != key || index == first;
                index += 1;
                keep
            });
        }
        None => query.push((key.to_string(), value.to_string())),
    }
}

/// Query string of an export request: the page's own parameters plus exporter, filters
/// and sort.
pub fn build_export_query(
    location: &PageLocation,
    exporter: &str,
    filters: &[Filter],
    sorters: &[Sorter],
) -> Vec<(String, String)> {
    let mut query = location.query_pairs();
    set_pair(&mut query, EXPORTER_PARAM, exporter);
    set_pair(&mut query, FILTERS_PARAM, &filters_json(filters));
    // Every sorter writes index 0, so only the last one reaches the server.
    for sorter in sorters {
        set_pair(&mut query, "sort[0][field]", &sorter.field);
        set_pair(&mut query, "sort[0][dir]", sorter.dir.as_str());
    }
    query
}

pub fn export_file_name(table_id: Option<&str>, exporter: &str) -> String {
    format!("{}.{}", table_id.unwrap_or("table"), exporter)
}

#[derive(Debug, Default)]
pub struct ExportDispatcher {
    in_flight: Option<(RequestId, String)>,
}

impl ExportDispatcher {
    /// While true the export trigger is disabled.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn begin(&mut self, id: RequestId, exporter: &str) {
        debug!("Export '{}' started as request {:?}", exporter, id);
        self.in_flight = Some((id, exporter.to_string()));
    }

    pub fn owns(&self, id: RequestId) -> bool {
        matches!(&self.in_flight, Some((current, _)) if *current == id)
    }

    /// Re-enables the trigger; returns the exporter that finished.
    pub fn finish(&mut self, id: RequestId) -> Option<String> {
        if self.owns(id) {
            self.in_flight.take().map(|(_, exporter)| exporter)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::table::grid::SortDir;

    fn value<'a>(query: &'a [(String, String)], key: &str) -> Vec<&'a str> {
        query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn export_query_carries_filters_and_sort() {
        let loc = PageLocation::parse("http://example.org/users?page=2").unwrap();
        let filters = vec![Filter::new("name", "eq", "bob")];
        let sorters = vec![Sorter {
            field: "age".into(),
            dir: SortDir::Desc,
        }];
        let query = build_export_query(&loc, "csv", &filters, &sorters);

        assert_eq!(value(&query, "exporter"), vec!["csv"]);
        assert_eq!(value(&query, "page"), vec!["2"]);
        assert_eq!(value(&query, "sort[0][field]"), vec!["age"]);
        assert_eq!(value(&query, "sort[0][dir]"), vec!["desc"]);
        let parsed: Vec<Filter> = serde_json::from_str(value(&query, "filters")[0]).unwrap();
        assert_eq!(parsed, filters);
    }

    #[test]
    fn only_the_last_sorter_survives() {
        let loc = PageLocation::parse("http://example.org/users").unwrap();
        let sorters = vec![
            Sorter {
                field: "age".into(),
                dir: SortDir::Desc,
            },
            Sorter {
                field: "name".into(),
                dir: SortDir::Asc,
            },
        ];
        let query = build_export_query(&loc, "json", &[], &sorters);
        assert_eq!(value(&query, "sort[0][field]"), vec!["name"]);
        assert_eq!(value(&query, "sort[0][dir]"), vec!["asc"]);
        assert_eq!(value(&query, "filters"), vec!["[]"]);
    }

    #[test]
    fn existing_exporter_parameter_is_replaced() {
        let loc = PageLocation::parse("http://example.org/users?exporter=xlsx&exporter=tsv").unwrap();
        let query = build_export_query(&loc, "csv", &[], &[]);
        assert_eq!(value(&query, "exporter"), vec!["csv"]);
    }

    #[test]
    fn file_name_defaults_to_table() {
        assert_eq!(export_file_name(Some("users"), "csv"), "users.csv");
        assert_eq!(export_file_name(None, "ndjson"), "table.ndjson");
    }

    #[test]
    fn trigger_is_busy_until_its_request_finishes() {
        let mut export = ExportDispatcher::default();
        export.begin(RequestId(7), "csv");
        assert!(export.is_busy());
        assert_eq!(export.finish(RequestId(8)), None);
        assert!(export.is_busy());
        assert_eq!(export.finish(RequestId(7)).as_deref(), Some("csv"));
        assert!(!export.is_busy());
    }
}
