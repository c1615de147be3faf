//! Draft-slot persistence.
//!
//! The unsubmitted batch survives navigation as three fixed-name RON slots
//! in the state directory: description metadata, resume metadata and the
//! resolved existing-job match. Only metadata is stored; file handles cannot
//! be serialized, so a restored draft always needs the files re-selected.
//! Fixed slot names give shared-slot semantics between concurrent instances.

use std::fs;
use std::path::PathBuf;

use engine_logging::{engine_error, engine_warn};
use screener_core::{DraftBatch, ExistingJobMatch, FileMeta, JobId, JobRef, StoredJdFile};
use screener_engine::{remove_slot, AtomicFileWriter};
use serde::{Deserialize, Serialize};

const JD_SLOT: &str = "draft_jd_files.ron";
const RESUME_SLOT: &str = "draft_resumes.ron";
const EXISTING_JOB_SLOT: &str = "draft_existing_job.ron";

/// Single mutable slot for the in-progress batch. Injected so the reducer
/// shell can be exercised against a fake in tests.
pub trait DraftStore: Send + Sync {
    fn save(&self, draft: &DraftBatch);
    fn load(&self) -> Option<DraftBatch>;
    fn clear(&self);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedFileMeta {
    name: String,
    size: u64,
    kind: String,
    modified_ms: i64,
}

impl From<&FileMeta> for PersistedFileMeta {
    fn from(meta: &FileMeta) -> Self {
        Self {
            name: meta.name.clone(),
            size: meta.size,
            kind: meta.kind.clone(),
            modified_ms: meta.modified_ms,
        }
    }
}

impl From<PersistedFileMeta> for FileMeta {
    fn from(meta: PersistedFileMeta) -> Self {
        Self {
            name: meta.name,
            size: meta.size,
            kind: meta.kind,
            modified_ms: meta.modified_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedJobRef {
    id: String,
    resume_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedMatch {
    job: Option<PersistedJobRef>,
    filename: String,
    file_type: String,
    created_at: String,
    content: String,
}

impl From<&ExistingJobMatch> for PersistedMatch {
    fn from(found: &ExistingJobMatch) -> Self {
        Self {
            job: found.job.as_ref().map(|job| PersistedJobRef {
                id: job.id.as_str().to_string(),
                resume_count: job.resume_count,
            }),
            filename: found.jd_file.filename.clone(),
            file_type: found.jd_file.file_type.clone(),
            created_at: found.jd_file.created_at.clone(),
            content: found.jd_file.content.clone(),
        }
    }
}

impl From<PersistedMatch> for ExistingJobMatch {
    fn from(found: PersistedMatch) -> Self {
        Self {
            job: found.job.map(|job| JobRef {
                id: JobId::new(job.id),
                resume_count: job.resume_count,
            }),
            jd_file: StoredJdFile {
                filename: found.filename,
                file_type: found.file_type,
                created_at: found.created_at,
                content: found.content,
            },
        }
    }
}

/// RON-file implementation used by the shell.
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn write_slot<T: Serialize>(&self, slot: &str, value: &T) {
        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(value, pretty) {
            Ok(text) => text,
            Err(err) => {
                engine_error!("Failed to serialize draft slot {}: {}", slot, err);
                return;
            }
        };
        let writer = AtomicFileWriter::new(self.dir.clone());
        if let Err(err) = writer.write(slot, &content) {
            engine_error!("Failed to write draft slot {} in {:?}: {}", slot, self.dir, err);
        }
    }

    fn read_slot<T: for<'de> Deserialize<'de>>(&self, slot: &str) -> Option<T> {
        let path = self.dir.join(slot);
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                engine_warn!("Failed to read draft slot {:?}: {}", path, err);
                return None;
            }
        };
        match ron::from_str(&content) {
            Ok(value) => Some(value),
            Err(err) => {
                // A corrupt slot is treated as absent; the worst case is a
                // lost draft, never a resurrected stale one.
                engine_warn!("Failed to parse draft slot {:?}: {}", path, err);
                None
            }
        }
    }

    fn drop_slot(&self, slot: &str) {
        if let Err(err) = remove_slot(&self.dir, slot) {
            engine_error!("Failed to remove draft slot {} in {:?}: {}", slot, self.dir, err);
        }
    }
}

impl DraftStore for FileDraftStore {
    fn save(&self, draft: &DraftBatch) {
        if draft.jd_files.is_empty() {
            self.drop_slot(JD_SLOT);
        } else {
            let metas: Vec<PersistedFileMeta> =
                draft.jd_files.iter().map(PersistedFileMeta::from).collect();
            self.write_slot(JD_SLOT, &metas);
        }

        if draft.resumes.is_empty() {
            self.drop_slot(RESUME_SLOT);
        } else {
            let metas: Vec<PersistedFileMeta> =
                draft.resumes.iter().map(PersistedFileMeta::from).collect();
            self.write_slot(RESUME_SLOT, &metas);
        }

        match &draft.existing_job {
            Some(found) => self.write_slot(EXISTING_JOB_SLOT, &PersistedMatch::from(found)),
            None => self.drop_slot(EXISTING_JOB_SLOT),
        }
    }

    fn load(&self) -> Option<DraftBatch> {
        let jd_files = self
            .read_slot::<Vec<PersistedFileMeta>>(JD_SLOT)
            .unwrap_or_default();
        let resumes = self
            .read_slot::<Vec<PersistedFileMeta>>(RESUME_SLOT)
            .unwrap_or_default();
        let existing_job = self.read_slot::<PersistedMatch>(EXISTING_JOB_SLOT);

        if jd_files.is_empty() && resumes.is_empty() && existing_job.is_none() {
            return None;
        }
        Some(DraftBatch {
            jd_files: jd_files.into_iter().map(FileMeta::from).collect(),
            resumes: resumes.into_iter().map(FileMeta::from).collect(),
            existing_job: existing_job.map(ExistingJobMatch::from),
        })
    }

    fn clear(&self) {
        self.drop_slot(JD_SLOT);
        self.drop_slot(RESUME_SLOT);
        self.drop_slot(EXISTING_JOB_SLOT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn meta(name: &str) -> FileMeta {
        FileMeta {
            name: name.to_string(),
            size: 256,
            kind: "pdf".to_string(),
            modified_ms: 1_700_000_000_000,
        }
    }

    fn draft() -> DraftBatch {
        DraftBatch {
            jd_files: vec![meta("role.pdf")],
            resumes: vec![meta("a.pdf"), meta("b.pdf")],
            existing_job: Some(ExistingJobMatch {
                job: Some(JobRef {
                    id: JobId::new("7"),
                    resume_count: 3,
                }),
                jd_file: StoredJdFile {
                    filename: "role.pdf".to_string(),
                    file_type: "pdf".to_string(),
                    created_at: "2026-07-01T12:00:00Z".to_string(),
                    content: "Senior engineer wanted".to_string(),
                },
            }),
        }
    }

    #[test]
    fn saved_draft_loads_back() {
        let temp = TempDir::new().unwrap();
        let store = FileDraftStore::new(temp.path().to_path_buf());

        store.save(&draft());
        let loaded = store.load().expect("draft");

        assert_eq!(loaded, draft());
    }

    #[test]
    fn empty_store_loads_nothing() {
        let temp = TempDir::new().unwrap();
        let store = FileDraftStore::new(temp.path().join("never_created"));
        assert!(store.load().is_none());
    }

    #[test]
    fn clear_removes_every_slot() {
        let temp = TempDir::new().unwrap();
        let store = FileDraftStore::new(temp.path().to_path_buf());
        store.save(&draft());

        store.clear();

        assert!(store.load().is_none());
        assert!(!temp.path().join(JD_SLOT).exists());
        assert!(!temp.path().join(RESUME_SLOT).exists());
        assert!(!temp.path().join(EXISTING_JOB_SLOT).exists());
    }

    #[test]
    fn saving_an_emptier_draft_drops_stale_slots() {
        let temp = TempDir::new().unwrap();
        let store = FileDraftStore::new(temp.path().to_path_buf());
        store.save(&draft());

        store.save(&DraftBatch {
            jd_files: Vec::new(),
            resumes: vec![meta("a.pdf")],
            existing_job: None,
        });

        let loaded = store.load().expect("draft");
        assert!(loaded.jd_files.is_empty());
        assert!(loaded.existing_job.is_none());
        assert_eq!(loaded.resumes.len(), 1);
    }

    #[test]
    fn a_corrupt_slot_is_treated_as_absent() {
        let temp = TempDir::new().unwrap();
        let store = FileDraftStore::new(temp.path().to_path_buf());
        fs::write(temp.path().join(RESUME_SLOT), "not ron at all").unwrap();

        assert!(store.load().is_none());
    }
}
