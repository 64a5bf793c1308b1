use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::detector::{BoundingBox, FaceDetector};
use crate::enroll::EnrollmentSession;
use crate::gallery::Gallery;
use crate::matcher::{best_match, MatchLabel, DEFAULT_THRESHOLD};
use crate::store::{GalleryStore, SavedIdentity};
use crate::FaceIdError;

/// Controls recognition behavior.
pub struct RecognizerConfig {
    /// Minimum similarity to report a known identity.
    /// Default: [`DEFAULT_THRESHOLD`].
    pub threshold: f32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl RecognizerConfig {
    fn with_defaults(mut self) -> Self {
        if self.threshold == 0.0 {
            self.threshold = DEFAULT_THRESHOLD;
        }
        self
    }
}

/// One recognized face in a frame.
#[derive(Debug, Clone)]
pub struct FaceMatch {
    pub bbox: BoundingBox,
    pub label: MatchLabel,
    pub score: f32,
}

/// Everything the caller needs to annotate one frame.
///
/// `has_unknown` is the enrollment trigger: true when at least one detected
/// face matched nothing in the gallery.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub matches: Vec<FaceMatch>,
    pub has_unknown: bool,
}

/// Per-frame recognition pipeline over an immutable gallery snapshot.
///
/// The recognizer holds one `Arc<Gallery>` at a time. Each [`recognize`]
/// call clones the current snapshot out of the lock and matches against it
/// lock-free, so a concurrent [`reload`] never exposes a partially built
/// gallery: in-flight matches finish on the old value, the next frame sees
/// the new one.
///
/// While an enrollment session is open the recognizer is paused: frames are
/// rejected with [`FaceIdError::EnrollmentActive`] so the caller stops
/// consuming the camera, whose ownership transfers to the capture UI for the
/// duration of the session.
///
/// [`recognize`]: Recognizer::recognize
/// [`reload`]: Recognizer::reload
pub struct Recognizer {
    detector: Box<dyn FaceDetector>,
    store: GalleryStore,
    threshold: RwLock<f32>,
    gallery: RwLock<Arc<Gallery>>,
    enrolling: AtomicBool,
}

impl Recognizer {
    /// Creates a recognizer and performs the initial gallery load.
    pub fn new(detector: Box<dyn FaceDetector>, store: GalleryStore) -> Result<Self, FaceIdError> {
        Self::with_config(detector, store, RecognizerConfig::default())
    }

    pub fn with_config(
        detector: Box<dyn FaceDetector>,
        store: GalleryStore,
        cfg: RecognizerConfig,
    ) -> Result<Self, FaceIdError> {
        let cfg = cfg.with_defaults();
        let gallery = store.load(detector.as_ref())?;
        Ok(Self {
            detector,
            store,
            threshold: RwLock::new(cfg.threshold),
            gallery: RwLock::new(Arc::new(gallery)),
            enrolling: AtomicBool::new(false),
        })
    }

    /// Current gallery snapshot. The returned value stays valid no matter
    /// how many reloads happen after.
    pub fn gallery(&self) -> Arc<Gallery> {
        self.gallery.read().unwrap().clone()
    }

    /// Adjusts matching strictness at runtime.
    pub fn set_threshold(&self, threshold: f32) {
        *self.threshold.write().unwrap() = threshold;
    }

    pub fn is_enrolling(&self) -> bool {
        self.enrolling.load(Ordering::SeqCst)
    }

    /// Detects and identifies every face in one frame.
    ///
    /// Rejected while an enrollment session is open. Detector failures on
    /// the live frame propagate; there is nothing to skip to.
    pub fn recognize(&self, frame: &[u8]) -> Result<FrameReport, FaceIdError> {
        if self.is_enrolling() {
            return Err(FaceIdError::EnrollmentActive);
        }

        let gallery = self.gallery();
        let threshold = *self.threshold.read().unwrap();

        let faces = self.detector.detect(frame)?;
        let mut report = FrameReport::default();
        for face in faces {
            let m = best_match(&face.embedding, &gallery, threshold);
            if m.label.is_unknown() {
                report.has_unknown = true;
            }
            report.matches.push(FaceMatch {
                bbox: face.bbox,
                label: m.label,
                score: m.score,
            });
        }
        Ok(report)
    }

    /// Re-reads the store and swaps the snapshot in one reference update.
    /// Returns the number of identities in the new gallery.
    pub fn reload(&self) -> Result<usize, FaceIdError> {
        let fresh = self.store.load(self.detector.as_ref())?;
        let count = fresh.len();
        *self.gallery.write().unwrap() = Arc::new(fresh);
        debug!(identities = count, "gallery snapshot swapped");
        Ok(count)
    }

    /// Opens an enrollment session and pauses recognition.
    ///
    /// Only one session may be open at a time. The caller owns the camera
    /// hand-off; if it cannot reacquire the device it should surface that as
    /// [`FaceIdError::Device`] and abort via [`Recognizer::cancel_enrollment`].
    pub fn begin_enrollment(&self) -> Result<EnrollmentSession, FaceIdError> {
        if self
            .enrolling
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(FaceIdError::EnrollmentActive);
        }
        Ok(EnrollmentSession::new())
    }

    /// Persists a ready session, reloads the gallery, and resumes
    /// recognition.
    ///
    /// On a save failure the session keeps its draft and recognition stays
    /// paused, so the caller can retry or cancel.
    pub fn finalize_enrollment(
        &self,
        session: &mut EnrollmentSession,
    ) -> Result<SavedIdentity, FaceIdError> {
        let saved = session.finalize(&self.store)?;
        self.enrolling.store(false, Ordering::SeqCst);
        self.reload()?;
        Ok(saved)
    }

    /// Discards a session and resumes recognition.
    pub fn cancel_enrollment(&self, session: &mut EnrollmentSession) {
        session.cancel();
        self.enrolling.store(false, Ordering::SeqCst);
    }
}
