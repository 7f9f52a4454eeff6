//! # photolift
//!
//! Reconciles a staging tree of product photographs against a flat
//! production directory and promotes the winning subset. Staging folders
//! are named by a 5-digit item code; images inside follow the
//! `<code>[-_<variant>].<ext>` convention. The run is a one-shot batch:
//! scan both sides, decide which staged images supersede production,
//! re-encode the winners into place, and write an audit report.
//!
//! # Architecture: Five-Phase Pipeline
//!
//! ```text
//! 1. Scan     staging/ + production/  →  records      (filesystem → structured data)
//! 2. Resolve  staged records          →  one newest copy per logical image
//! 3. Decide   records + prod index    →  promotion states
//! 4. Promote  eligible records        →  re-encoded files in production/
//! 5. Report   everything             →  report.csv / .html / .json
//! ```
//!
//! Each phase completes before the next begins, so the records are only
//! ever mutated by the single active phase. There is no shared mutable
//! state beyond the records themselves; the promote phase fans out per
//! image on the rayon pool and aggregates its success count.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | 5-digit code filename convention parser used by both scanners |
//! | [`types`] | `ImageIdentity`, `PromotionState`, the record types |
//! | [`scan`] | Walks staging (folder tree) and production (flat) into records |
//! | [`resolve`] | Picks the newest staged copy per logical image |
//! | [`decide`] | Cross-references staging against the production index |
//! | [`promote`] | Re-encodes eligible images into production |
//! | [`report`] | Builds and exports the per-folder audit report |
//! | [`config`] | `photolift.toml` loading, validation, stock config |
//! | [`imaging`] | Pure-Rust image operations behind the `ImageBackend` trait |
//! | [`logging`] | Timestamped file + console log setup |
//!
//! # Design Decisions
//!
//! ## One State Enum, Not Five Booleans
//!
//! An image's pipeline position is a single [`types::PromotionState`]
//! with checked transitions. Combinations like "promoted but stale"
//! cannot be expressed, and re-running a phase over unchanged input is
//! an observable no-op.
//!
//! ## Identity-Keyed Production Index
//!
//! The decider looks production counterparts up in a hash index keyed on
//! [`types::ImageIdentity`] — one lookup per staged image. The original
//! workflow this tool replaced compared every staged image against every
//! production file.
//!
//! ## Errors Stay Local
//!
//! A malformed filename, a vanished file, a corrupt image or a failed
//! encode affects exactly one record: it is logged, the record keeps (or
//! never reaches) its state, and the run continues. Only an inaccessible
//! root directory or an unwritable CSV report aborts the run.
//!
//! ## Pure-Rust Imaging
//!
//! Probing and re-encoding use the `image` crate — no ImageMagick, no
//! system dependencies. The binary is fully self-contained, which is what
//! lets the same build run on the office NAS and a laptop.

pub mod config;
pub mod decide;
pub mod imaging;
pub mod logging;
pub mod naming;
pub mod promote;
pub mod report;
pub mod resolve;
pub mod scan;
pub mod types;
