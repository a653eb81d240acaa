use crate::config;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Ensure the parent directory of a *file path* exists (no-op if none).
pub fn ensure_parent_dir<P: AsRef<Path>>(file_path: P) -> io::Result<()> {
    if let Some(parent) = file_path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Global storage root (absolute), from `config::storage_root()`.
/// If relative in env, resolve against current_dir().
pub fn storage_root() -> PathBuf {
    let p = PathBuf::from(config::storage_root());
    if p.is_absolute() {
        p
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(p)
    }
}

// ─── Directory helpers for exams ──────────────────────────────
//
// Every helper has a `*_in` form taking an explicit root so stores can be
// pointed at any directory without touching global config.

// {root}/exam_{exam_id}
pub fn exam_dir_in(root: &Path, exam_id: i64) -> PathBuf {
    root.join(format!("exam_{exam_id}"))
}

pub fn exam_dir(exam_id: i64) -> PathBuf {
    exam_dir_in(&storage_root(), exam_id)
}

// Config
pub fn config_dir_in(root: &Path, exam_id: i64) -> PathBuf {
    exam_dir_in(root, exam_id).join("config")
}

pub fn assessment_config_path_in(root: &Path, exam_id: i64) -> PathBuf {
    config_dir_in(root, exam_id).join("assessment.json")
}

pub fn assessment_config_path(exam_id: i64) -> PathBuf {
    assessment_config_path_in(&storage_root(), exam_id)
}

// Results: one file per student
pub fn results_dir_in(root: &Path, exam_id: i64) -> PathBuf {
    exam_dir_in(root, exam_id).join("results")
}

pub fn result_path_in(root: &Path, exam_id: i64, student_id: i64) -> PathBuf {
    results_dir_in(root, exam_id).join(format!("student_{student_id}.json"))
}

pub fn result_path(exam_id: i64, student_id: i64) -> PathBuf {
    result_path_in(&storage_root(), exam_id, student_id)
}
