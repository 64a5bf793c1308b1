use crate::store::{GalleryStore, PersonAttrs, SavedIdentity};
use crate::FaceIdError;

/// Number of sample images an enrollment must capture before it can be
/// finalized.
pub const MAX_SAMPLES: usize = 9;

/// Observable session state. `Ready` is a guard, not an event: it holds
/// exactly while the sample count is complete AND every attribute field is
/// non-empty, so it can appear and disappear as attributes are edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Collecting,
    Ready,
    Finalized,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Open,
    Finalized,
    Cancelled,
}

/// Accumulates captured sample images and attributes for one new identity.
///
/// The draft is transient: nothing touches storage until [`finalize`]
/// succeeds, and [`cancel`] discards everything. A failed finalize keeps the
/// captured data so the caller can retry or cancel.
///
/// [`finalize`]: EnrollmentSession::finalize
/// [`cancel`]: EnrollmentSession::cancel
#[derive(Debug)]
pub struct EnrollmentSession {
    attrs: PersonAttrs,
    images: Vec<Vec<u8>>,
    phase: Phase,
}

impl EnrollmentSession {
    pub fn new() -> Self {
        Self::with_attrs(PersonAttrs::default())
    }

    pub fn with_attrs(attrs: PersonAttrs) -> Self {
        Self {
            attrs,
            images: Vec::new(),
            phase: Phase::Open,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.phase {
            Phase::Finalized => SessionState::Finalized,
            Phase::Cancelled => SessionState::Cancelled,
            Phase::Open if self.is_ready() => SessionState::Ready,
            Phase::Open => SessionState::Collecting,
        }
    }

    pub fn attrs(&self) -> &PersonAttrs {
        &self.attrs
    }

    pub fn samples(&self) -> usize {
        self.images.len()
    }

    /// Replaces the draft attributes (the UI calls this on every edit).
    pub fn set_attributes(&mut self, attrs: PersonAttrs) -> Result<(), FaceIdError> {
        if self.phase != Phase::Open {
            return Err(FaceIdError::SessionClosed);
        }
        self.attrs = attrs;
        Ok(())
    }

    /// Appends one captured image and returns the new sample count.
    /// Rejected once [`MAX_SAMPLES`] images are held; the caller must not
    /// count a rejected capture.
    pub fn capture(&mut self, image: Vec<u8>) -> Result<usize, FaceIdError> {
        if self.phase != Phase::Open {
            return Err(FaceIdError::SessionClosed);
        }
        if self.images.len() >= MAX_SAMPLES {
            return Err(FaceIdError::CaptureLimit { max: MAX_SAMPLES });
        }
        self.images.push(image);
        Ok(self.images.len())
    }

    pub fn is_ready(&self) -> bool {
        self.missing_requirement().is_none()
    }

    fn missing_requirement(&self) -> Option<String> {
        if self.images.len() < MAX_SAMPLES {
            return Some(format!(
                "{} of {MAX_SAMPLES} samples captured",
                self.images.len()
            ));
        }
        for (field, value) in [
            ("name", &self.attrs.name),
            ("surname", &self.attrs.surname),
            ("age", &self.attrs.age),
            ("gender", &self.attrs.gender),
        ] {
            if value.trim().is_empty() {
                return Some(format!("attribute '{field}' is empty"));
            }
        }
        None
    }

    /// Persists the draft through the store. Only valid from `Ready`.
    ///
    /// On success the session becomes `Finalized` and accepts nothing
    /// further. On a save failure the error propagates and the session keeps
    /// its captured data, still `Ready` for another attempt.
    pub fn finalize(&mut self, store: &GalleryStore) -> Result<SavedIdentity, FaceIdError> {
        if self.phase != Phase::Open {
            return Err(FaceIdError::SessionClosed);
        }
        if let Some(missing) = self.missing_requirement() {
            return Err(FaceIdError::NotReady(missing));
        }

        let saved = store.save(&self.attrs, &self.images)?;
        self.phase = Phase::Finalized;
        Ok(saved)
    }

    /// Discards the draft. A no-op on an already finalized or cancelled
    /// session.
    pub fn cancel(&mut self) {
        if self.phase == Phase::Open {
            self.phase = Phase::Cancelled;
            self.images.clear();
        }
    }
}

impl Default for EnrollmentSession {
    fn default() -> Self {
        Self::new()
    }
}
