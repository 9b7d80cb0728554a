use crate::selection::RawSelection;
use crate::util::loose_selection;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("configuration patch must be a JSON object, got {0}")]
    NotAnObject(String),
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Names of the metric a chart displays; the source of the axis labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricMeta {
    pub metric: String,
    pub numerator: String,
    pub denominator: String,
}

impl Default for MetricMeta {
    fn default() -> Self {
        Self {
            metric: "Adverse Event Rate".to_string(),
            numerator: "Adverse Events".to_string(),
            denominator: "Visits".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Group level of the metadata rows used for tooltips and countries.
    pub group_level: String,
    pub country_field: String,
    pub investigator_field: String,
    pub enrollment_field: String,
    pub metric: MetricMeta,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub show_detail_panels: bool,
    pub panel_columns: usize,
    pub panel_height: f32,
    pub overview_height: f32,
    pub show_entity_select: bool,
    pub show_country_select: bool,
    #[serde(rename = "selectedGroupIDs", deserialize_with = "loose_selection")]
    pub selected_group_ids: Option<RawSelection>,
    /// Opaque to the chart, kept for the host.
    pub thresholds: Option<Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            group_level: "Site".to_string(),
            country_field: "Country".to_string(),
            investigator_field: "InvestigatorLastName".to_string(),
            enrollment_field: "ParticipantCount".to_string(),
            metric: MetricMeta::default(),
            x_label: None,
            y_label: None,
            show_detail_panels: true,
            panel_columns: 2,
            panel_height: 180.0,
            overview_height: 420.0,
            show_entity_select: true,
            show_country_select: true,
            selected_group_ids: None,
            thresholds: None,
        }
    }
}

impl Config {
    pub fn x_axis_label(&self) -> String {
        self.x_label
            .clone()
            .unwrap_or_else(|| self.metric.denominator.clone())
    }

    pub fn y_axis_label(&self) -> String {
        self.y_label
            .clone()
            .unwrap_or_else(|| format!("Cumulative {}", self.metric.numerator))
    }

    /// Shallow merge: every top-level key of `patch` replaces ours.
    ///
    /// Keys are applied one at a time; a key whose value does not fit is
    /// logged and skipped without discarding the others.
    pub fn merged(&self, patch: &Value) -> Result<Config, ConfigError> {
        let Value::Object(patch) = patch else {
            return Err(ConfigError::NotAnObject(patch.to_string()));
        };

        let mut merged = self.clone();
        for (key, value) in patch {
            let mut base = serde_json::to_value(&merged)?;
            if let Value::Object(fields) = &mut base {
                fields.insert(key.clone(), value.clone());
            }

            match serde_json::from_value(base) {
                Ok(next) => merged = next,
                Err(err) => log::warn!("ignoring configuration key {key:?}: {err}"),
            }
        }

        Ok(merged)
    }
}

/// Reads a JSON configuration file and merges it over the defaults.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let patch: Value = serde_json::from_str(&raw)?;
    Config::default().merged(&patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels_come_from_metric_metadata() {
        let config = Config::default();
        assert_eq!(config.x_axis_label(), "Visits");
        assert_eq!(config.y_axis_label(), "Cumulative Adverse Events");

        let custom = config.merged(&json!({ "xLabel": "Visit Number" })).unwrap();
        assert_eq!(custom.x_axis_label(), "Visit Number");
    }

    #[test]
    fn merge_is_shallow_and_incoming_wins() {
        let base = Config::default()
            .merged(&json!({ "metric": { "numerator": "Deviations" } }))
            .unwrap();
        assert_eq!(base.metric.numerator, "Deviations");
        // nested objects are replaced, not merged
        assert_eq!(base.metric.denominator, MetricMeta::default().denominator);

        let patched = base
            .merged(&json!({ "panelColumns": 3, "selectedGroupIDs": ["120", "10"] }))
            .unwrap();
        assert_eq!(patched.panel_columns, 3);
        assert_eq!(patched.metric.numerator, "Deviations");
        assert_eq!(
            patched.selected_group_ids,
            Some(RawSelection::Many(vec!["120".into(), "10".into()]))
        );
    }

    #[test]
    fn one_bad_key_keeps_the_rest() {
        let patched = Config::default()
            .merged(&json!({ "panelColumns": "three", "panelHeight": 240, "xLabel": "Visit" }))
            .unwrap();

        assert_eq!(patched.panel_columns, 2);
        assert_eq!(patched.panel_height, 240.0);
        assert_eq!(patched.x_axis_label(), "Visit");
    }

    #[test]
    fn selection_shapes_never_fail_a_patch() {
        let numeric = Config::default()
            .merged(&json!({ "selectedGroupIDs": [120, 10], "panelColumns": 3 }))
            .unwrap();
        assert_eq!(
            numeric.selected_group_ids,
            Some(RawSelection::Many(vec!["120".into(), "10".into()]))
        );
        assert_eq!(numeric.panel_columns, 3);

        let invalid = numeric
            .merged(&json!({ "selectedGroupIDs": { "site": 120 } }))
            .unwrap();
        assert_eq!(invalid.selected_group_ids, Some(RawSelection::default()));
    }

    #[test]
    fn non_object_patch_is_rejected() {
        assert!(matches!(
            Config::default().merged(&json!([1, 2])),
            Err(ConfigError::NotAnObject(_))
        ));
    }
}
