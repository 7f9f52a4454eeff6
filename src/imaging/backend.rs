//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the pipeline
//! needs: identify (pixel dimensions), transcode (same-size re-encode) and
//! resize (downscale-and-encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust, zero
//! external dependencies. Everything is statically linked into the binary.

use super::params::{EncodeParams, ResizeParams};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Every backend must implement all three operations so the rest of the
/// codebase is backend-agnostic.
pub trait ImageBackend: Sync {
    /// Get image dimensions without decoding the full image where possible.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Re-encode an image at its original size.
    fn transcode(&self, params: &EncodeParams) -> Result<(), BackendError>;

    /// Downscale an image to the given dimensions and encode.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations without executing them.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub identify_results: Mutex<Vec<Dimensions>>,
        pub fail_outputs: Mutex<Vec<String>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Transcode {
            source: String,
            output: String,
            quality: u32,
        },
        Resize {
            source: String,
            output: String,
            width: u32,
            height: u32,
            quality: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(dims: Vec<Dimensions>) -> Self {
            Self {
                identify_results: Mutex::new(dims),
                fail_outputs: Mutex::new(Vec::new()),
                operations: Mutex::new(Vec::new()),
            }
        }

        /// Make any encode whose output path contains `fragment` fail.
        pub fn fail_output(self, fragment: &str) -> Self {
            self.fail_outputs.lock().unwrap().push(fragment.to_string());
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn check_failure(&self, output: &str) -> Result<(), BackendError> {
            let fragments = self.fail_outputs.lock().unwrap();
            if fragments.iter().any(|f| output.contains(f.as_str())) {
                return Err(BackendError::ProcessingFailed(format!(
                    "mock failure for {output}"
                )));
            }
            Ok(())
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            self.identify_results
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| BackendError::ProcessingFailed("No mock dimensions".to_string()))
        }

        fn transcode(&self, params: &EncodeParams) -> Result<(), BackendError> {
            let output = params.output.to_string_lossy().to_string();
            self.check_failure(&output)?;
            self.operations.lock().unwrap().push(RecordedOp::Transcode {
                source: params.source.to_string_lossy().to_string(),
                output,
                quality: params.quality.value(),
            });
            Ok(())
        }

        fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
            let output = params.output.to_string_lossy().to_string();
            self.check_failure(&output)?;
            self.operations.lock().unwrap().push(RecordedOp::Resize {
                source: params.source.to_string_lossy().to_string(),
                output,
                width: params.width,
                height: params.height,
                quality: params.quality.value(),
            });
            Ok(())
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 800,
            height: 600,
        }]);

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_records_resize() {
        let backend = MockBackend::new();

        backend
            .resize(&ResizeParams {
                source: "/source.jpg".into(),
                output: "/output.jpg".into(),
                width: 1200,
                height: 900,
                quality: super::super::params::Quality::new(85),
            })
            .unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Resize {
                width: 1200,
                height: 900,
                quality: 85,
                ..
            }
        ));
    }

    #[test]
    fn mock_failure_by_output_fragment() {
        let backend = MockBackend::new().fail_output("broken");

        let result = backend.transcode(&EncodeParams {
            source: "/source.jpg".into(),
            output: "/out/broken.jpg".into(),
            quality: super::super::params::Quality::new(85),
        });
        assert!(result.is_err());
        assert!(backend.get_operations().is_empty());
    }
}
