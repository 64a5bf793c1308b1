//! Test doubles shared by unit tests.
//!
//! Images are UTF-8 text: one comma-separated embedding per line, one line
//! per face. Anything else contains no face. A poison marker makes the
//! detector fail, to exercise skip paths.

use crate::detector::{BoundingBox, DetectedFace, FaceDetector};
use crate::FaceIdError;

const POISON: &[u8] = b"POISON";

/// Encodes a fake image containing one face with the given embedding.
pub fn face_image(embedding: &[f32]) -> Vec<u8> {
    embedding
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
        .into_bytes()
}

pub struct TextDetector {
    dim: usize,
}

impl TextDetector {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    /// An image the detector errors on.
    pub fn poison_image() -> Vec<u8> {
        POISON.to_vec()
    }
}

impl FaceDetector for TextDetector {
    fn detect(&self, image: &[u8]) -> Result<Vec<DetectedFace>, FaceIdError> {
        if image == POISON {
            return Err(FaceIdError::Detector("poisoned image".into()));
        }
        let Ok(text) = std::str::from_utf8(image) else {
            return Ok(Vec::new());
        };

        let mut faces = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let parsed: Result<Vec<f32>, _> =
                line.split(',').map(|tok| tok.trim().parse()).collect();
            if let Ok(embedding) = parsed {
                if !embedding.is_empty() {
                    let off = i as f32 * 10.0;
                    faces.push(DetectedFace {
                        bbox: BoundingBox {
                            x1: off,
                            y1: off,
                            x2: off + 10.0,
                            y2: off + 10.0,
                        },
                        embedding,
                    });
                }
            }
        }
        Ok(faces)
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}
