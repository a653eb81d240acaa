//! JSON-file result store.
//!
//! One pretty-printed file per record:
//! `{root}/exam_{exam_id}/results/student_{student_id}.json`.
//!
//! Saves write a sibling temp file and rename it over the target, so a reader sees
//! either the previous record or the new one in full.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, error};
use util::paths;

use crate::error::StoreError;
use crate::traits::store::{ResultStore, SaveConfirmation};
use crate::types::{ExamId, ExamResult, StudentId};

/// Maximum accepted size of a stored record.
const MAX_RECORD_SIZE: u64 = 2 * 1024 * 1024; // 2MB

#[derive(Debug, Clone)]
pub struct FileResultStore {
    root: PathBuf,
}

impl FileResultStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the configured `STORAGE_ROOT`.
    pub fn from_config() -> Self {
        Self::new(paths::storage_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, exam_id: ExamId, student_id: StudentId) -> PathBuf {
        paths::result_path_in(&self.root, exam_id, student_id)
    }
}

#[async_trait]
impl ResultStore for FileResultStore {
    async fn load(
        &self,
        exam_id: ExamId,
        student_id: StudentId,
    ) -> Result<Option<ExamResult>, StoreError> {
        let path = self.record_path(exam_id, student_id);

        let metadata = match fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                error!("Result record unreadable: {} - {}", path.display(), e);
                return Err(e.into());
            }
        };
        if metadata.len() > MAX_RECORD_SIZE {
            error!(
                "Result record too large: {} ({} bytes, max {} bytes)",
                path.display(),
                metadata.len(),
                MAX_RECORD_SIZE
            );
            return Err(StoreError::Io("Result record too large".into()));
        }

        let contents = fs::read_to_string(&path).await?;
        let result: ExamResult = serde_json::from_str(&contents).map_err(|e| {
            error!("Invalid result record {}: {}", path.display(), e);
            StoreError::from(e)
        })?;

        if result.exam_id() != exam_id || result.student_id() != student_id {
            return Err(StoreError::Serialization(format!(
                "{} holds exam {} / student {}",
                path.display(),
                result.exam_id(),
                result.student_id()
            )));
        }
        Ok(Some(result))
    }

    async fn save(
        &self,
        exam_id: ExamId,
        student_id: StudentId,
        result: &ExamResult,
    ) -> Result<SaveConfirmation, StoreError> {
        if result.exam_id() != exam_id || result.student_id() != student_id {
            return Err(StoreError::Rejected(format!(
                "record for exam {} / student {} saved under exam {exam_id} / student {student_id}",
                result.exam_id(),
                result.student_id()
            )));
        }

        let path = self.record_path(exam_id, student_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(result)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            error!("Failed to replace result record {}: {}", path.display(), e);
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(exam_id, student_id, path = %path.display(), "result record written");
        Ok(SaveConfirmation::now(exam_id, student_id))
    }
}
