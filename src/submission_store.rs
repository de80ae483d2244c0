use crate::domain::Registration;
use anyhow::Context;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A registration as it is persisted, stamped with the id and time it was accepted.
///
/// The registration fields are flattened next to `id` and `timestamp`: every element of the
/// submissions file is a flat JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSubmission {
    #[serde(flatten)]
    pub registration: Registration,
    pub id: u64,
    pub timestamp: String,
}

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("Failed to create the data directory {}.", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to open the submissions file {}.", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to lock the submissions file {}.", .path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read the submissions file {}.", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialise the submissions.")]
    Serialization(#[source] serde_json::Error),
    #[error("Failed to write the submissions file {}.", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::utils::error_chain_fmt(self, f)
    }
}

/// Append-only storage of accepted registrations in a single JSON array file.
///
/// # Locking
/// Every `append` opens its own handle on the file and takes an exclusive advisory lock on it
/// before reading. The lock is held until the whole array has been rewritten and flushed, so two
/// writers (threads of this process or other processes going through `SubmissionStore`) can never
/// interleave their read-modify-write cycles. This is what keeps ids unique and gap-free.
///
/// Anything writing to the file without taking the lock breaks that guarantee.
#[derive(Debug, Clone)]
pub struct SubmissionStore {
    path: PathBuf,
}

impl SubmissionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stores `registration` and returns the id it was given.
    ///
    /// The registration is not validated again: callers are expected to have run it through
    /// `validate_submission` first. Blocks while another writer holds the lock.
    #[tracing::instrument(
        name = "Appending a registration to the submissions file",
        skip(self, registration),
        fields(path = %self.path.display(), submission_id = tracing::field::Empty)
    )]
    pub fn append(&self, registration: Registration) -> Result<u64, StoreError> {
        self.ensure_parent_directory()?;
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(|source| StoreError::Open {
                path: self.path.clone(),
                source,
            })?;
        let mut locked = LockedFile::acquire(file, &self.path)?;

        let mut content = String::new();
        locked
            .file
            .read_to_string(&mut content)
            .map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;
        // Elements are kept as raw JSON values: records written by other versions of the form
        // still count towards the next id and are written back untouched.
        let mut submissions = parse_or_empty(&content, &self.path);

        let id = submissions.len() as u64 + 1;
        let submission = StoredSubmission {
            registration,
            id,
            timestamp: now_timestamp(),
        };
        submissions.push(serde_json::to_value(&submission).map_err(StoreError::Serialization)?);
        let serialized =
            serde_json::to_string_pretty(&submissions).map_err(StoreError::Serialization)?;

        locked
            .rewrite(serialized.as_bytes())
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;

        tracing::Span::current().record("submission_id", &id);
        tracing::info!("Registration stored");
        Ok(id)
    }

    /// Reads every stored submission without taking the lock.
    ///
    /// This is a best-effort snapshot: a writer may be halfway through rewriting the file, in which
    /// case the content can be stale or unparseable. A missing or unparseable file yields an empty
    /// `Vec`.
    ///
    /// Each element of the array is decoded on its own. We are returning a `Vec` of `Result`s: an
    /// element that is not a stored submission (a record written by another version of the form)
    /// surfaces as an `Err` in its own slot, while its neighbours are still returned.
    #[tracing::instrument(
        name = "Loading stored submissions",
        skip(self),
        fields(path = %self.path.display())
    )]
    pub fn load(&self) -> Result<Vec<Result<StoredSubmission, anyhow::Error>>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let submissions = parse_or_empty(&content, &self.path)
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                serde_json::from_value(element).with_context(|| {
                    format!("Element {index} of the submissions file is not a stored submission")
                })
            })
            .collect();
        Ok(submissions)
    }

    fn ensure_parent_directory(&self) -> Result<(), StoreError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
                .map_err(|source| StoreError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source,
                }),
            _ => Ok(()),
        }
    }
}

/// An open file holding an exclusive advisory lock. The lock is released when the guard is
/// dropped, whichever way `append` returns.
struct LockedFile {
    file: File,
}

impl LockedFile {
    fn acquire(file: File, path: &Path) -> Result<Self, StoreError> {
        file.lock_exclusive().map_err(|source| StoreError::Lock {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { file })
    }

    /// Replaces the whole content of the file with `bytes` and flushes it to disk.
    fn rewrite(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(bytes)?;
        self.file.sync_all()
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(error.message = %e, "Failed to release the submissions file lock");
        }
    }
}

fn parse_or_empty(content: &str, path: &Path) -> Vec<serde_json::Value> {
    if content.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str(content) {
        Ok(submissions) => submissions,
        Err(e) => {
            tracing::warn!(
                error.message = %e,
                path = %path.display(),
                "The submissions file is not a valid JSON array, treating it as empty"
            );
            Vec::new()
        }
    }
}

/// Local time in ISO-8601 form with microsecond precision and no offset.
fn now_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
