use std::fmt;

use crate::FaceIdError;

/// Pixel-space face location reported by the external detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// One face found in an image: where it is and its embedding.
#[derive(Clone)]
pub struct DetectedFace {
    pub bbox: BoundingBox,
    pub embedding: Vec<f32>,
}

impl fmt::Debug for DetectedFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectedFace")
            .field("bbox", &self.bbox)
            .field("embedding_len", &self.embedding.len())
            .finish()
    }
}

/// Detects faces in an encoded image and extracts an embedding per face.
///
/// The input is an encoded raster image (whatever format the capture layer
/// produces; the on-disk gallery stores PNG). The output embedding is a dense
/// f32 vector whose dimensionality is returned by
/// [`FaceDetector::dimension`] (e.g., 512 for insightface-style models).
///
/// The core calls `detect` once per image and treats the detector as
/// stateless. Implementations must be safe for concurrent use.
pub trait FaceDetector: Send + Sync {
    /// Returns every face found in the image, in the detector's order.
    /// An image with no faces yields an empty vec, not an error.
    fn detect(&self, image: &[u8]) -> Result<Vec<DetectedFace>, FaceIdError>;

    /// Returns the dimensionality of the embedding vectors.
    fn dimension(&self) -> usize;
}
