use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::paths::{assessment_config_path, assessment_config_path_in, ensure_parent_dir};

/// One row of the label table: a qualitative outcome and the fraction of a
/// question's maximum mark it is worth.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LabelFraction {
    pub label: String,
    pub fraction: f64,
}

impl LabelFraction {
    pub fn new(label: impl Into<String>, fraction: f64) -> Self {
        Self {
            label: label.into(),
            fraction,
        }
    }
}

/// Assessment policy as stored per exam. Order of `labels` is the display order.
///
/// The shipped default only carries the two anchors nobody disputes. Partial
/// credit labels must be configured per deployment.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AssessmentConfig {
    #[serde(default = "default_labels")]
    pub labels: Vec<LabelFraction>,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            labels: default_labels(),
        }
    }
}

impl AssessmentConfig {
    pub fn get_assessment_config_with_base(base: &Path, exam_id: i64) -> Result<Self, String> {
        Self::read_from(&assessment_config_path_in(base, exam_id))
    }

    /// Load the table for `exam_id` from the configured storage root.
    pub fn get_assessment_config(exam_id: i64) -> Result<Self, String> {
        Self::read_from(&assessment_config_path(exam_id))
    }

    /// Like [`get_assessment_config`](Self::get_assessment_config), but a
    /// missing file yields the default table. A present but malformed file is
    /// still an error.
    pub fn load_or_default(exam_id: i64) -> Result<Self, String> {
        let path = assessment_config_path(exam_id);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::read_from(&path)
    }

    fn read_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|_| format!("Failed to read assessment config at {path:?}"))?;
        serde_json::from_str(&contents).map_err(|e| format!("Invalid assessment config JSON: {e}"))
    }

    pub fn save_with_base(&self, base: &Path, exam_id: i64) -> Result<(), String> {
        Self::write_to(self, &assessment_config_path_in(base, exam_id))
    }

    pub fn save(&self, exam_id: i64) -> Result<(), String> {
        Self::write_to(self, &assessment_config_path(exam_id))
    }

    fn write_to(&self, path: &Path) -> Result<(), String> {
        ensure_parent_dir(path).map_err(|e| format!("Failed to create config directory: {e:?}"))?;

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config to JSON: {e}"))?;

        fs::write(path, json).map_err(|e| format!("Failed to write config file to disk: {e:?}"))
    }
}

fn default_labels() -> Vec<LabelFraction> {
    vec![
        LabelFraction::new("not_attempted", 0.0),
        LabelFraction::new("attempted_fully", 1.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::setup_test_storage_root;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn missing_labels_key_uses_default_table() {
        let cfg: AssessmentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, AssessmentConfig::default());
        assert_eq!(cfg.labels[0].label, "not_attempted");
        assert_eq!(cfg.labels[1].fraction, 1.0);
    }

    #[test]
    fn save_then_load_keeps_label_order() {
        let tmp = TempDir::new().unwrap();
        let cfg = AssessmentConfig {
            labels: vec![
                LabelFraction::new("not_attempted", 0.0),
                LabelFraction::new("attempted_poorly", 0.3),
                LabelFraction::new("attempted_fully", 1.0),
            ],
        };
        cfg.save_with_base(tmp.path(), 9).unwrap();

        let loaded = AssessmentConfig::get_assessment_config_with_base(tmp.path(), 9).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_is_an_error_for_strict_load() {
        let tmp = TempDir::new().unwrap();
        let err = AssessmentConfig::get_assessment_config_with_base(tmp.path(), 1).unwrap_err();
        assert!(err.contains("Failed to read assessment config"));
    }

    #[test]
    fn malformed_file_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = assessment_config_path_in(tmp.path(), 2);
        ensure_parent_dir(&path).unwrap();
        fs::write(&path, "{ not json").unwrap();
        let err = AssessmentConfig::get_assessment_config_with_base(tmp.path(), 2).unwrap_err();
        assert!(err.starts_with("Invalid assessment config JSON"));
    }

    #[test]
    #[serial]
    fn load_or_default_falls_back_only_when_file_is_missing() {
        let _tmp = setup_test_storage_root();
        assert_eq!(AssessmentConfig::load_or_default(5).unwrap(), AssessmentConfig::default());

        let path = assessment_config_path(5);
        ensure_parent_dir(&path).unwrap();
        fs::write(&path, "[1, 2").unwrap();
        let err = AssessmentConfig::load_or_default(5).unwrap_err();
        assert!(err.starts_with("Invalid assessment config JSON"));
    }

    #[test]
    #[serial]
    fn load_or_default_reads_saved_table() {
        let _tmp = setup_test_storage_root();
        let cfg = AssessmentConfig {
            labels: vec![
                LabelFraction::new("not_attempted", 0.0),
                LabelFraction::new("attempted_adequately", 0.5),
                LabelFraction::new("attempted_fully", 1.0),
            ],
        };
        cfg.save(6).unwrap();
        assert_eq!(AssessmentConfig::load_or_default(6).unwrap(), cfg);
    }
}
