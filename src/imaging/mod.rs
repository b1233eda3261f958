//! Image inspection and resize math for Open Graph images.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::with_guessed_format` + `into_dimensions` |
//! | **Resize size** | pure aspect-ratio math |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Probe**: [`ImageProbe`] trait + [`FileProbe`]

mod calculations;
pub mod probe;

pub use calculations::{fit_dimensions, variation_file_name};
pub use probe::{FileProbe, ImageProbe, NoProbe, ProbeError, ProbedImage};
