//! Promotion decision: cross-reference staging against production.
//!
//! For every folder the decider collects the production images sharing the
//! folder's item code (reported as "existing files"), then walks the
//! folder's images:
//!
//! 1. an image whose own code differs from the folder's code is
//!    **misplaced** — it is reported but never promoted;
//! 2. images that lost the freshness race are skipped;
//! 3. the remaining candidates are looked up in the production index by
//!    identity: no counterpart means eligible by default; a counterpart
//!    means eligible only when the staged copy is strictly newer.
//!
//! Production lookups go through [`ProductionIndex`], keyed on
//! [`ImageIdentity`] — one hash lookup per staged image instead of a scan
//! over the whole production set.
//!
//! The decision is a pure function of identities and timestamps: running
//! it twice over unchanged records assigns identical states.

use crate::scan::StagingScan;
use crate::types::{ImageIdentity, ImageRecord, PromotionState};
use log::warn;
use std::collections::HashMap;

/// The production directory's contents, indexed for direct lookup.
#[derive(Debug)]
pub struct ProductionIndex {
    images: Vec<ImageRecord>,
    by_identity: HashMap<ImageIdentity, usize>,
    by_code: HashMap<u32, Vec<usize>>,
}

impl ProductionIndex {
    /// Index a scanned production set. Production is assumed deduplicated;
    /// should two files share an identity anyway, the first (in scan
    /// order) wins and the double is reported.
    pub fn build(images: Vec<ImageRecord>) -> Self {
        let mut by_identity = HashMap::new();
        let mut by_code: HashMap<u32, Vec<usize>> = HashMap::new();

        for (i, image) in images.iter().enumerate() {
            by_code.entry(image.identity.code).or_default().push(i);
            if let Some(&previous) = by_identity.get(&image.identity) {
                let prior: &ImageRecord = &images[previous];
                warn!(
                    "Production holds two files for {}: {} and {} (keeping {})",
                    image.identity, prior.filename, image.filename, prior.filename
                );
                continue;
            }
            by_identity.insert(image.identity, i);
        }

        Self {
            images,
            by_identity,
            by_code,
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// The production counterpart of a logical image, if any.
    pub fn lookup(&self, identity: &ImageIdentity) -> Option<&ImageRecord> {
        self.by_identity.get(identity).map(|&i| &self.images[i])
    }

    /// All production images carrying the given item code, in scan order.
    pub fn with_code(&self, code: u32) -> impl Iterator<Item = &ImageRecord> {
        self.by_code
            .get(&code)
            .into_iter()
            .flat_map(|indices| indices.iter().map(|&i| &self.images[i]))
    }
}

/// Decide promotion for every staged image and record each folder's
/// production matches.
pub fn decide_promotion(scan: &mut StagingScan, production: &ProductionIndex) {
    for folder in &mut scan.folders {
        folder.production_matches = match folder.code {
            Some(code) => production
                .with_code(code)
                .map(|image| image.filename.clone())
                .collect(),
            None => Vec::new(),
        };

        for image in &mut folder.images {
            match image.state() {
                // losers of the freshness race stay out of consideration
                PromotionState::Stale => continue,
                // promotion is never revoked by a re-run
                PromotionState::Promoted => continue,
                _ => {}
            }

            if folder.code != Some(image.identity.code) {
                image.mark_misplaced();
                continue;
            }

            match production.lookup(&image.identity) {
                None => {
                    image.in_production = false;
                    image.mark_eligible();
                }
                Some(counterpart) => {
                    image.in_production = true;
                    if image.created_at > counterpart.created_at {
                        image.mark_eligible();
                    } else {
                        image.mark_rejected();
                    }
                }
            }
        }
    }
}
