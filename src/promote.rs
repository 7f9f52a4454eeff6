//! Promotion: re-encode eligible images into the production directory.
//!
//! Every staged image is offered to the promoter; only records in the
//! [`Eligible`](crate::types::PromotionState::Eligible) state are acted
//! on. The destination filename is normalized from the image's identity
//! (`01234.jpg`, `01234_2.jpg`) regardless of what the staged file was
//! called.
//!
//! Failures are strictly per-image: a source that vanished between scan
//! and promotion, or an encode error, is logged and leaves that record
//! unpromoted while the rest of the batch proceeds. Images are
//! independent, so the batch runs on the rayon pool; the only shared
//! outcome is the success count, aggregated from the parallel iterator
//! rather than mutated in place.

use crate::imaging::{Dimensions, EncodeOptions, ImageBackend, encode_for_production};
use crate::scan::StagingScan;
use crate::types::{ImageRecord, PromotionState};
use indicatif::ProgressBar;
use log::{error, info};
use rayon::prelude::*;
use std::path::Path;

/// Re-encode every eligible staged image into `production_root`.
///
/// Returns the number of images promoted.
pub fn promote_all(
    scan: &mut StagingScan,
    production_root: &Path,
    backend: &(impl ImageBackend + Sync),
    options: &EncodeOptions,
    target_extension: &str,
) -> usize {
    let records: Vec<&mut ImageRecord> = scan.images_mut().collect();
    let eligible = records
        .iter()
        .filter(|r| r.state() == PromotionState::Eligible)
        .count();
    info!(
        "Converting and promoting {} eligible of {} staged images",
        eligible,
        records.len()
    );

    let progress = ProgressBar::new(records.len() as u64);
    let promoted = records
        .into_par_iter()
        .map(|image| {
            let done = promote_one(image, production_root, backend, options, target_extension);
            progress.inc(1);
            done
        })
        .filter(|&done| done)
        .count();
    progress.finish_and_clear();

    info!("{} images converted and moved to production", promoted);
    promoted
}

fn promote_one(
    image: &mut ImageRecord,
    production_root: &Path,
    backend: &impl ImageBackend,
    options: &EncodeOptions,
    target_extension: &str,
) -> bool {
    if image.state() != PromotionState::Eligible {
        return false;
    }

    let source = image.source_path();
    if !source.exists() {
        error!("Source image disappeared: {}", source.display());
        return false;
    }

    let destination = production_root.join(format!(
        "{}.{}",
        image.identity.production_stem(),
        target_extension
    ));

    let dims = Dimensions {
        width: image.width,
        height: image.height,
    };
    match encode_for_production(backend, &source, &destination, dims, options) {
        Ok(()) => {
            image.mark_promoted();
            true
        }
        Err(e) => {
            error!(
                "Cannot promote {} to {}: {}",
                source.display(),
                destination.display(),
                e
            );
            false
        }
    }
}
