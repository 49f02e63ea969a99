//! Image processing: pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` |
//! | **EXIF** | `kamadak-exif` container reader + JSON normalisation |
//! | **Thumbnail** | fit-within math + `Lanczos3` resize |
//! | **Encode** | `image` JPEG encoder |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Metadata**: EXIF reading and normalisation
//! - **Operations**: Decode, resize and encode on in-memory buffers
//!
//! Everything works on byte buffers; the jobs own all object store I/O.

mod calculations;
pub mod metadata;
pub mod operations;
mod params;

use thiserror::Error;

pub use calculations::fit_within;
pub use metadata::{ExifAbsence, ExifMap, read_exif};
pub use operations::{EncodedJpeg, decode, encode_jpeg, thumbnail};
pub use params::{Quality, ThumbnailParams};

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}
