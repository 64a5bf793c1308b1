//! Directory-backed gallery persistence.
//!
//! One subdirectory per identity under the store root:
//!
//! ```text
//! <root>/<identity-id>/
//!     info.json              {"name": "...", "age": 0, "gender": "..."}
//!     1.png, 2.png, ...      captured images, 1-indexed
//! ```
//!
//! The layout is the database. Loading tolerates partially corrupt state:
//! any single bad record or image degrades to a skipped entry, never a
//! failed load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::detector::FaceDetector;
use crate::gallery::{Gallery, Identity};
use crate::FaceIdError;

/// Attributes collected for a person being enrolled, exactly as the UI
/// hands them over. Opaque to the core beyond presence checks.
#[derive(Debug, Clone, Default)]
pub struct PersonAttrs {
    pub name: String,
    pub surname: String,
    pub age: String,
    pub gender: String,
}

impl PersonAttrs {
    /// Storage identifier: `"{name}_{surname}"`, also the directory name.
    pub fn id(&self) -> String {
        format!("{}_{}", self.name, self.surname)
    }
}

/// Result of a successful [`GalleryStore::save`]. The full [`Identity`]
/// (with embeddings) materializes on the next load.
#[derive(Debug, Clone)]
pub struct SavedIdentity {
    pub id: String,
    pub dir: PathBuf,
    pub images: usize,
}

/// The metadata record persisted as `info.json`.
///
/// Defaults mirror load tolerance: a record may omit any field and still
/// produce an identity (empty name falls back to the directory name).
#[derive(Debug, Serialize, Deserialize)]
struct IdentityInfo {
    #[serde(default)]
    name: String,
    #[serde(default)]
    age: u32,
    #[serde(default = "default_gender")]
    gender: String,
}

fn default_gender() -> String {
    "Unknown".to_string()
}

fn is_image_file(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("png" | "jpg" | "jpeg")
    )
}

/// Persists and loads identity records under a single root directory.
pub struct GalleryStore {
    root: PathBuf,
}

impl GalleryStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scans the store and builds a fresh [`Gallery`] snapshot.
    ///
    /// The root is created if absent. Identity directories are visited in
    /// name order, which fixes the gallery's tie-break order. Per-entry
    /// problems (missing or malformed `info.json`, unreadable images, images
    /// without a detectable face, embeddings that do not match the detector's
    /// dimension, identities left with zero embeddings) are logged and
    /// skipped; only failure to read the root itself is an error.
    pub fn load(&self, detector: &dyn FaceDetector) -> Result<Gallery, FaceIdError> {
        fs::create_dir_all(&self.root).map_err(|e| FaceIdError::Storage(e.to_string()))?;

        let mut dirs: Vec<PathBuf> = fs::read_dir(&self.root)
            .map_err(|e| FaceIdError::Storage(e.to_string()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();

        let mut identities = Vec::new();
        for dir in dirs {
            if let Some(person) = self.load_identity(&dir, detector) {
                identities.push(person);
            }
        }

        debug!(identities = identities.len(), root = %self.root.display(), "gallery loaded");
        Ok(Gallery::new(identities))
    }

    fn load_identity(&self, dir: &Path, detector: &dyn FaceDetector) -> Option<Identity> {
        let dir_name = dir.file_name()?.to_string_lossy().into_owned();

        let info_path = dir.join("info.json");
        let raw = match fs::read(&info_path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(dir = %dir.display(), %err, "missing or unreadable info.json, skipping identity");
                return None;
            }
        };
        let info: IdentityInfo = match serde_json::from_slice(&raw) {
            Ok(info) => info,
            Err(err) => {
                warn!(dir = %dir.display(), %err, "malformed info.json, skipping identity");
                return None;
            }
        };

        let mut images: Vec<PathBuf> = fs::read_dir(dir)
            .ok()?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && is_image_file(p))
            .collect();
        images.sort();

        let mut embeddings = Vec::new();
        for path in images {
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    debug!(image = %path.display(), %err, "unreadable image, skipping");
                    continue;
                }
            };
            match detector.detect(&bytes) {
                // First detected face, as the capture flow frames one person.
                Ok(faces) => match faces.into_iter().next() {
                    Some(face) if face.embedding.len() == detector.dimension() => {
                        embeddings.push(face.embedding)
                    }
                    Some(face) => warn!(
                        image = %path.display(),
                        got = face.embedding.len(),
                        expected = detector.dimension(),
                        "embedding dimension mismatch, skipping"
                    ),
                    None => debug!(image = %path.display(), "no face detected, skipping"),
                },
                Err(err) => {
                    warn!(image = %path.display(), %err, "detector failed on image, skipping");
                }
            }
        }

        if embeddings.is_empty() {
            warn!(dir = %dir.display(), "no usable embeddings, skipping identity");
            return None;
        }

        let name = if info.name.is_empty() {
            dir_name.clone()
        } else {
            info.name
        };
        Some(Identity {
            id: dir_name,
            name,
            age: info.age,
            gender: info.gender,
            embeddings,
        })
    }

    /// Persists a new identity: metadata plus every captured image.
    ///
    /// Idempotent on id collision: `info.json` is overwritten (last write
    /// wins) while images accumulate, the sequence continuing from the
    /// highest number already present. Writes are best effort, in order,
    /// with no rollback; the first I/O failure propagates and may leave the
    /// directory partially written.
    pub fn save(
        &self,
        attrs: &PersonAttrs,
        images: &[Vec<u8>],
    ) -> Result<SavedIdentity, FaceIdError> {
        let id = attrs.id();
        let dir = self.root.join(&id);
        fs::create_dir_all(&dir).map_err(|e| FaceIdError::Storage(e.to_string()))?;

        let info = IdentityInfo {
            name: id.clone(),
            age: attrs.age.trim().parse().unwrap_or(0),
            gender: attrs.gender.clone(),
        };
        let json = serde_json::to_string_pretty(&info)
            .map_err(|e| FaceIdError::Storage(e.to_string()))?;
        fs::write(dir.join("info.json"), json).map_err(|e| FaceIdError::Storage(e.to_string()))?;

        let start = next_sequence(&dir);
        for (i, image) in images.iter().enumerate() {
            let path = dir.join(format!("{}.png", start + i));
            fs::write(&path, image).map_err(|e| FaceIdError::Storage(e.to_string()))?;
        }

        debug!(%id, images = images.len(), start, "identity saved");
        Ok(SavedIdentity {
            id,
            dir,
            images: images.len(),
        })
    }
}

/// First free image sequence number in an identity directory (1-indexed).
fn next_sequence(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 1;
    };
    let max = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|e| {
            e.path()
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<usize>().ok())
        })
        .max()
        .unwrap_or(0);
    max + 1
}
