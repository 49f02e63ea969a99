//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. The jobs build them
//! from configuration and hand them to [`operations`](super::operations).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 75). Clamped on construction.
//! - [`ThumbnailParams`]: Bounding box a thumbnail must fit in, plus its JPEG quality.

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(75)
    }
}

/// Parameters for a fit-within thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailParams {
    pub max_width: u32,
    pub max_height: u32,
    pub quality: Quality,
}

impl ThumbnailParams {
    pub fn bounds(&self) -> (u32, u32) {
        (self.max_width, self.max_height)
    }
}

impl Default for ThumbnailParams {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 600,
            quality: Quality::default(),
        }
    }
}
