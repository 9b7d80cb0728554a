//! Tabular inputs of a chart.
//!
//! Every table arrives either as an array of flat records or as a columnar
//! record of equally long arrays. Numbers may be strings; ids may be numbers.
//! Nothing here fails on irregular rows: unreadable tables and rows degrade to
//! "absent" with a warning.

use crate::util::{loose_f64, loose_i32, loose_opt_f64, loose_opt_string, loose_string};

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("dataset is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn nan() -> f64 {
    f64::NAN
}

/// One point of the study-wide reference trend.
#[derive(Debug, Clone, Deserialize)]
pub struct StudyPoint {
    #[serde(default = "nan", alias = "visit_med75", alias = "visit", deserialize_with = "loose_f64")]
    pub x: f64,
    #[serde(default = "nan", alias = "mean_ae_study_med75", alias = "mean_ae", deserialize_with = "loose_f64")]
    pub y: f64,
}

/// One point of a site trajectory, flagged or not.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRow {
    #[serde(default, alias = "entityID", alias = "GroupID", alias = "site_number", deserialize_with = "loose_string")]
    pub entity_id: String,
    #[serde(default = "nan", alias = "visit_med75", alias = "visit", deserialize_with = "loose_f64")]
    pub x: f64,
    #[serde(default = "nan", alias = "mean_ae_site_med75", alias = "mean_ae", deserialize_with = "loose_f64")]
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityLabel {
    #[serde(default, alias = "entityID", alias = "GroupID", alias = "site_number", deserialize_with = "loose_string")]
    pub entity_id: String,
    #[serde(default, alias = "Flag", deserialize_with = "loose_i32")]
    pub flag_status: i32,
    #[serde(default, deserialize_with = "loose_opt_string")]
    pub color: Option<String>,
    #[serde(default, alias = "n_pat", deserialize_with = "loose_opt_f64")]
    pub sub_entity_count: Option<f64>,
    #[serde(default, alias = "Score", deserialize_with = "loose_opt_f64")]
    pub score: Option<f64>,
    #[serde(default, alias = "Delta", deserialize_with = "loose_opt_f64")]
    pub delta: Option<f64>,
}

impl EntityLabel {
    pub fn is_flagged(&self) -> bool {
        self.flag_status != 0
    }
}

/// A single visit of one patient, nested under its site.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubEntityVisit {
    #[serde(default, alias = "subEntityID", alias = "patnum", alias = "SubjectID", deserialize_with = "loose_string")]
    pub sub_entity_id: String,
    #[serde(default, alias = "entityID", alias = "GroupID", alias = "site_number", deserialize_with = "loose_string")]
    pub entity_id: String,
    #[serde(default = "nan", alias = "visit", deserialize_with = "loose_f64")]
    pub x: f64,
    #[serde(default = "nan", alias = "n_ae", deserialize_with = "loose_f64")]
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMetadataRow {
    #[serde(default, alias = "entityID", alias = "GroupID", deserialize_with = "loose_string")]
    pub entity_id: String,
    #[serde(default, alias = "GroupLevel", deserialize_with = "loose_string")]
    pub level: String,
    #[serde(default, alias = "Param", deserialize_with = "loose_string")]
    pub attribute_name: String,
    #[serde(default, alias = "Value", deserialize_with = "loose_string")]
    pub attribute_value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dataset {
    #[serde(alias = "df_mean_study", deserialize_with = "table")]
    pub study: Vec<StudyPoint>,
    #[serde(alias = "df_mean_site_flagged", deserialize_with = "table")]
    pub flagged: Vec<EntityRow>,
    #[serde(alias = "df_mean_site_unflagged", deserialize_with = "table")]
    pub unflagged: Vec<EntityRow>,
    #[serde(alias = "df_label_sites", deserialize_with = "table")]
    pub labels: Vec<EntityLabel>,
    #[serde(alias = "df_visit", deserialize_with = "table")]
    pub visits: Vec<SubEntityVisit>,
    #[serde(alias = "dfGroups", deserialize_with = "table")]
    pub groups: Vec<GroupMetadataRow>,
}

impl Dataset {
    pub fn from_json_str(raw: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn is_empty(&self) -> bool {
        self.study.is_empty()
            && self.flagged.is_empty()
            && self.unflagged.is_empty()
            && self.labels.is_empty()
    }

    /// Label rows keyed by entity id; a repeated id keeps its last row.
    pub fn label_index(&self) -> FxHashMap<String, EntityLabel> {
        self.labels
            .iter()
            .map(|label| (label.entity_id.clone(), label.clone()))
            .collect()
    }

    /// Patient visits grouped by site, then by patient, both in input order.
    pub fn visits_by_entity(&self) -> FxHashMap<String, Vec<(String, Vec<(f64, f64)>)>> {
        let mut grouped: FxHashMap<String, Vec<(String, Vec<(f64, f64)>)>> =
            FxHashMap::default();

        for visit in &self.visits {
            let patients = grouped.entry(visit.entity_id.clone()).or_default();
            match patients.iter_mut().find(|(id, _)| *id == visit.sub_entity_id) {
                Some((_, points)) => points.push((visit.x, visit.y)),
                None => patients.push((visit.sub_entity_id.clone(), vec![(visit.x, visit.y)])),
            }
        }

        grouped
    }
}

/// Rows of one entity collection, grouped by entity id in first-seen order.
pub fn group_rows(rows: &[EntityRow]) -> Vec<(String, Vec<(f64, f64)>)> {
    let mut order: Vec<(String, Vec<(f64, f64)>)> = Vec::new();
    let mut position: FxHashMap<&str, usize> = FxHashMap::default();

    for row in rows {
        match position.get(row.entity_id.as_str()) {
            Some(&idx) => order[idx].1.push((row.x, row.y)),
            None => {
                position.insert(row.entity_id.as_str(), order.len());
                order.push((row.entity_id.clone(), vec![(row.x, row.y)]));
            }
        }
    }

    order
}

fn table<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(rows_from_value).unwrap_or_default())
}

/// Accepts `[{..}, {..}]` or `{ "col": [..], .. }`; skips rows that do not fit `T`.
pub fn rows_from_value<T: DeserializeOwned>(value: Value) -> Vec<T> {
    let records = match value {
        Value::Array(records) => records,
        Value::Object(columns) => transpose(columns),
        Value::Null => return Vec::new(),
        other => {
            log::warn!("ignoring table of unexpected shape: {other}");
            return Vec::new();
        }
    };

    let total = records.len();
    let rows: Vec<T> = records
        .into_iter()
        .filter_map(|record| serde_json::from_value(record).ok())
        .collect();

    if rows.len() < total {
        log::warn!("skipped {} of {total} unreadable rows", total - rows.len());
    }
    rows
}

fn transpose(columns: Map<String, Value>) -> Vec<Value> {
    let len = columns
        .values()
        .map(|col| col.as_array().map_or(1, Vec::len))
        .max()
        .unwrap_or(0);

    (0..len)
        .map(|i| {
            let record: Map<String, Value> = columns
                .iter()
                .map(|(name, col)| {
                    let cell = match col {
                        Value::Array(cells) => cells.get(i).cloned().unwrap_or(Value::Null),
                        scalar => scalar.clone(),
                    };
                    (name.clone(), cell)
                })
                .collect();
            Value::Object(record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn columnar_and_record_tables_match() {
        let records = json!({
            "flagged": [
                { "entityId": "120", "x": 1, "y": "0.5" },
                { "entityId": "120", "x": 2, "y": 1.5 }
            ]
        });
        let columnar = json!({
            "flagged": { "entityId": ["120", "120"], "x": [1, 2], "y": ["0.5", 1.5] }
        });

        let a: Dataset = serde_json::from_value(records).unwrap();
        let b: Dataset = serde_json::from_value(columnar).unwrap();

        assert_eq!(a.flagged.len(), 2);
        assert_eq!(b.flagged.len(), 2);
        assert_eq!(a.flagged[1].y, b.flagged[1].y);
        assert_eq!(b.flagged[0].y, 0.5);
    }

    #[test]
    fn aliases_and_numeric_ids() {
        let data: Dataset = serde_json::from_value(json!({
            "df_label_sites": [{ "site_number": 10, "Flag": "0", "n_pat": "4" }]
        }))
        .unwrap();

        let label = &data.labels[0];
        assert_eq!(label.entity_id, "10");
        assert!(!label.is_flagged());
        assert_eq!(label.sub_entity_count, Some(4.0));
        assert_eq!(label.color, None);
    }

    #[test]
    fn upper_case_id_fields_are_read() {
        let data: Dataset = serde_json::from_value(json!({
            "flagged": [{ "entityID": "120", "x": 1, "y": 2 }],
            "unflagged": [{ "entityID": 10, "x": 1, "y": 0.5 }],
            "labels": [{ "entityID": "120", "flagStatus": 1 }],
            "visits": [{ "subEntityID": "P1", "entityID": "120", "x": 1, "y": 1 }],
            "groups": [{ "entityID": "120", "level": "Site", "attributeName": "Country", "attributeValue": "USA" }]
        }))
        .unwrap();

        assert_eq!(data.flagged[0].entity_id, "120");
        assert_eq!(data.unflagged[0].entity_id, "10");
        assert_eq!(data.labels[0].entity_id, "120");
        assert!(data.labels[0].is_flagged());
        assert_eq!(data.visits[0].sub_entity_id, "P1");
        assert_eq!(data.visits[0].entity_id, "120");
        assert_eq!(data.groups[0].entity_id, "120");

        let visits = data.visits_by_entity();
        assert_eq!(visits["120"][0].0, "P1");
    }

    #[test]
    fn malformed_tables_degrade_to_empty() {
        let data: Dataset = serde_json::from_value(json!({
            "study": "not a table",
            "visits": [1, 2, 3],
            "groups": null
        }))
        .unwrap();

        assert!(data.study.is_empty());
        assert!(data.visits.is_empty());
        assert!(data.groups.is_empty());
        assert!(data.is_empty());
    }

    #[test]
    fn rows_group_in_first_seen_order() {
        let rows: Vec<EntityRow> = rows_from_value(json!([
            { "entityId": "b", "x": 1, "y": 1 },
            { "entityId": "a", "x": 1, "y": 2 },
            { "entityId": "b", "x": 2, "y": 3 }
        ]));

        let grouped = group_rows(&rows);
        assert_eq!(grouped[0].0, "b");
        assert_eq!(grouped[0].1, vec![(1.0, 1.0), (2.0, 3.0)]);
        assert_eq!(grouped[1].0, "a");
    }
}
