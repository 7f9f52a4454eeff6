//! Image probing and re-encoding — pure Rust, zero external dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Re-encode** | `image` decoders + JPEG/PNG/WebP encoders |
//! | **Downscale** | Lanczos3 resampling |
//!
//! The module is split into:
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Sizing policy combining dimensions + backend

pub mod backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use operations::{EncodeOptions, encode_for_production, scaled_height};
pub use params::{EncodeParams, Quality, ResizeParams};
pub use rust_backend::RustBackend;
