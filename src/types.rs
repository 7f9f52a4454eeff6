//! Shared record types carried through the pipeline stages.
//!
//! Records are built once by the scanners and then advanced in place:
//! the resolver and decider move each image through its promotion states,
//! the promoter marks successful writes. Nothing is destroyed during a
//! run — every record survives for the report.
//!
//! The single [`PromotionState`] enumeration replaces a set of independent
//! booleans (newest / on-production / latest / moved / wrong-directory)
//! so that inconsistent combinations are unrepresentable: state advances
//! only through [`ImageRecord`] methods, which check the transition.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// The logical identity of a catalog image: item code plus optional
/// variant number. Filename, extension and timestamps play no part —
/// two images are the same logical image iff their identities are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ImageIdentity {
    pub code: u32,
    pub variant: Option<u32>,
}

impl ImageIdentity {
    pub fn primary(code: u32) -> Self {
        Self {
            code,
            variant: None,
        }
    }

    pub fn variant(code: u32, variant: u32) -> Self {
        Self {
            code,
            variant: Some(variant),
        }
    }

    /// The normalized production filename stem: `01234` or `01234_2`.
    pub fn production_stem(&self) -> String {
        match self.variant {
            Some(v) => format!("{:05}_{}", self.code, v),
            None => format!("{:05}", self.code),
        }
    }
}

impl fmt::Display for ImageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.production_stem())
    }
}

/// Where an image stands in the promotion pipeline.
///
/// Legal transitions: `Unresolved` → any of the four evaluated states,
/// `Eligible` → `Promoted`, and every state to itself (re-evaluation over
/// unchanged input is idempotent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PromotionState {
    /// Not yet examined.
    Unresolved,
    /// Lost the freshness race against a newer staged copy of the same
    /// identity.
    Stale,
    /// Found in a folder whose item code does not match its own.
    Misplaced,
    /// Newest in staging, but the production copy is at least as recent.
    Rejected,
    /// Cleared for promotion: no production counterpart, or the staged
    /// copy is strictly newer.
    Eligible,
    /// Re-encoded and written into production.
    Promoted,
}

impl PromotionState {
    fn can_advance_to(self, next: PromotionState) -> bool {
        use PromotionState::*;
        match (self, next) {
            (a, b) if a == b => true,
            (Unresolved, Stale | Misplaced | Rejected | Eligible) => true,
            (Eligible, Promoted) => true,
            _ => false,
        }
    }
}

/// One image file, staged or in production, plus everything the pipeline
/// learns about it.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// Filename as found on disk.
    pub filename: String,
    pub identity: ImageIdentity,
    /// Extension as parsed (lowercased).
    pub extension: String,
    /// Creation timestamp (modification time where the filesystem reports
    /// no birth time).
    pub created_at: SystemTime,
    pub size_bytes: u64,
    pub width: u32,
    pub height: u32,
    /// Directory the file lives in.
    pub folder_path: PathBuf,
    state: PromotionState,
    /// Whether production holds an image with the same identity. Filled by
    /// the decider; kept as plain data for reporting.
    pub in_production: bool,
}

impl ImageRecord {
    pub fn new(
        filename: String,
        identity: ImageIdentity,
        extension: String,
        created_at: SystemTime,
        size_bytes: u64,
        width: u32,
        height: u32,
        folder_path: PathBuf,
    ) -> Self {
        Self {
            filename,
            identity,
            extension,
            created_at,
            size_bytes,
            width,
            height,
            folder_path,
            state: PromotionState::Unresolved,
            in_production: false,
        }
    }

    pub fn state(&self) -> PromotionState {
        self.state
    }

    /// Full path of the file on disk.
    pub fn source_path(&self) -> PathBuf {
        self.folder_path.join(&self.filename)
    }

    pub fn mark_stale(&mut self) {
        self.advance(PromotionState::Stale);
    }

    pub fn mark_misplaced(&mut self) {
        self.advance(PromotionState::Misplaced);
    }

    pub fn mark_rejected(&mut self) {
        self.advance(PromotionState::Rejected);
    }

    pub fn mark_eligible(&mut self) {
        self.advance(PromotionState::Eligible);
    }

    pub fn mark_promoted(&mut self) {
        self.advance(PromotionState::Promoted);
    }

    fn advance(&mut self, next: PromotionState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal promotion transition {:?} -> {:?} for {}",
            self.state,
            next,
            self.filename
        );
        self.state = next;
    }
}

/// One qualifying staging folder and the images found directly inside it.
#[derive(Debug)]
pub struct FolderRecord {
    /// Directory name as found on disk.
    pub name: String,
    /// Item code parsed from the folder name; absent when the name yields
    /// none (the folder is still scanned, its images degrade to misplaced).
    pub code: Option<u32>,
    /// Absolute path of the folder.
    pub path: PathBuf,
    pub images: Vec<ImageRecord>,
    /// Shared id linking folders that carry the same item code. `None`
    /// when this folder's code is unique in the staging tree.
    pub duplicate_group: Option<usize>,
    /// Filenames of production images with this folder's code, in scan
    /// order. Filled by the decider, consumed by the report.
    pub production_matches: Vec<String>,
}

impl FolderRecord {
    pub fn new(name: String, code: Option<u32>, path: &Path) -> Self {
        Self {
            name,
            code,
            path: path.to_path_buf(),
            images: Vec::new(),
            duplicate_group: None,
            production_matches: Vec::new(),
        }
    }
}
