//! Open-set face identification over a directory-backed gallery.
//!
//! # Architecture
//!
//! The pipeline identifies people in four stages:
//!
//! 1. [`FaceDetector::detect`]: encoded image -> faces with embedding vectors
//!    (external model, e.g. a 512-d insightface embedder)
//! 2. [`GalleryStore::load`]: storage directory -> immutable [`Gallery`]
//!    snapshot of enrolled identities
//! 3. [`best_match`]: probe embedding + snapshot -> known identity or
//!    [`MatchLabel::Unknown`], with the best cosine similarity either way
//! 4. [`Recognizer::recognize`]: per-frame orchestration and the
//!    `has_unknown` enrollment trigger
//!
//! # Enrollment
//!
//! New identities enter through an [`EnrollmentSession`]: the UI captures
//! [`MAX_SAMPLES`] images and fills in the person's attributes, the session
//! finalizes through [`GalleryStore::save`], and the recognizer swaps in a
//! freshly loaded snapshot. Recognition is paused for the whole session so
//! the camera is never shared between the two flows.
//!
//! # Storage
//!
//! One subdirectory per identity under the store root, holding an
//! `info.json` metadata record and the captured images as `1.png..N.png`.
//! Loading tolerates partially corrupt storage: bad records, unreadable
//! images, and faceless photos are skipped entry by entry, never failing
//! the load.

mod detector;
mod enroll;
mod error;
mod gallery;
mod matcher;
mod recognizer;
mod store;

#[cfg(test)]
mod test_support;

pub use detector::{BoundingBox, DetectedFace, FaceDetector};
pub use enroll::{EnrollmentSession, SessionState, MAX_SAMPLES};
pub use error::FaceIdError;
pub use gallery::{Gallery, Identity};
pub use matcher::{best_match, cosine_similarity, Match, MatchLabel, DEFAULT_THRESHOLD};
pub use recognizer::{FaceMatch, FrameReport, Recognizer, RecognizerConfig};
pub use store::{GalleryStore, PersonAttrs, SavedIdentity};
