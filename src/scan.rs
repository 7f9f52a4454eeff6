//! Filesystem scanning: staging tree and production directory.
//!
//! Stage 1 of the reconciliation pipeline. Two scanners share the same
//! per-file rules (filename parsing, filesystem metadata, pixel probe) but
//! differ in shape:
//!
//! - **Staging** is a tree of per-item folders named by a 5-digit code
//!   (`12345`, `12345 red chair`). Each qualifying folder becomes a
//!   [`FolderRecord`] owning the images found directly inside it.
//! - **Production** is flat: one directory of normalized files, no
//!   grouping, no freshness resolution (it is assumed deduplicated).
//!
//! ## Degraded input, not crashes
//!
//! Real staging trees are messy. The scanners warn and continue on:
//! - filenames that do not conform to the naming convention;
//! - an item folder nested inside another item folder (the nested one is
//!   skipped — coded folders inside coded folders are a modeling error);
//! - subdirectories inside the production root (contents ignored);
//! - files that vanish or fail to decode between listing and probe.
//!
//! Only an inaccessible root is fatal.
//!
//! ## Duplicate folders
//!
//! Two staging folders can carry the same item code (`12345`,
//! `12345-copy`). After the walk, every such group is assigned a shared
//! duplicate-group id so the report can name each folder's doubles without
//! the folders holding references to one another.

use crate::imaging::ImageBackend;
use crate::naming;
use crate::types::{FolderRecord, ImageIdentity, ImageRecord};
use log::{error, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot access directory: {0}")]
    RootNotAccessible(PathBuf),
}

/// Everything found under the staging root.
#[derive(Debug)]
pub struct StagingScan {
    pub folders: Vec<FolderRecord>,
}

impl StagingScan {
    /// Names of the other folders sharing `folders[index]`'s item code.
    pub fn duplicate_names_of(&self, index: usize) -> Vec<&str> {
        let Some(group) = self.folders[index].duplicate_group else {
            return Vec::new();
        };
        self.folders
            .iter()
            .enumerate()
            .filter(|&(i, f)| i != index && f.duplicate_group == Some(group))
            .map(|(_, f)| f.name.as_str())
            .collect()
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageRecord> {
        self.folders.iter().flat_map(|f| f.images.iter())
    }

    pub fn images_mut(&mut self) -> impl Iterator<Item = &mut ImageRecord> {
        self.folders.iter_mut().flat_map(|f| f.images.iter_mut())
    }

    pub fn image_count(&self) -> usize {
        self.folders.iter().map(|f| f.images.len()).sum()
    }
}

/// Walk the staging root and build one [`FolderRecord`] per qualifying
/// item folder.
pub fn scan_staging(
    root: &Path,
    backend: &impl ImageBackend,
) -> Result<StagingScan, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotAccessible(root.to_path_buf()));
    }

    let mut folders = Vec::new();
    let mut accepted: Vec<PathBuf> = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if !naming::is_item_folder_name(&name) {
            continue;
        }
        let path = entry.path();
        if accepted.iter().any(|p| path.starts_with(p)) {
            warn!(
                "Item folder nested inside another item folder, skipping: {}",
                path.display()
            );
            continue;
        }
        accepted.push(path.to_path_buf());
        folders.push(scan_item_folder(&name, path, backend));
    }

    link_duplicate_folders(&mut folders);
    Ok(StagingScan { folders })
}

/// Build the record for one qualifying folder from its direct children.
/// A folder that cannot be listed yields an empty record, not an error.
fn scan_item_folder(name: &str, path: &Path, backend: &impl ImageBackend) -> FolderRecord {
    let code = naming::parse_folder_code(name);
    if code.is_none() {
        warn!(
            "No item code extractable from folder name {:?} ({})",
            name,
            path.display()
        );
    }

    let mut folder = FolderRecord::new(name.to_string(), code, path);
    for filename in list_filenames(path) {
        if let Some(image) = build_image(path, &filename, backend) {
            folder.images.push(image);
        }
    }
    folder
}

/// Scan the flat production root into a plain collection of records.
///
/// Subdirectories are reported and their contents ignored — production is
/// flat by contract.
pub fn scan_production(
    root: &Path,
    backend: &impl ImageBackend,
) -> Result<Vec<ImageRecord>, ScanError> {
    let entries =
        fs::read_dir(root).map_err(|_| ScanError::RootNotAccessible(root.to_path_buf()))?;

    let mut filenames = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable production entry: {}", e);
                continue;
            }
        };
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => {
                warn!(
                    "Subdirectory inside production root, contents ignored: {}",
                    entry.path().display()
                );
            }
            Ok(_) => filenames.push(entry.file_name().to_string_lossy().to_string()),
            Err(e) => warn!("Skipping unreadable production entry: {}", e),
        }
    }
    filenames.sort();

    Ok(filenames
        .iter()
        .filter_map(|filename| build_image(root, filename, backend))
        .collect())
}

/// Sorted filenames of the direct file children of `path`. Listing
/// failures are logged and yield what was readable.
fn list_filenames(path: &Path) -> Vec<String> {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Cannot list folder {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let mut filenames = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) if entry.file_type().is_ok_and(|t| t.is_file()) => {
                filenames.push(entry.file_name().to_string_lossy().to_string());
            }
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry in {}: {}", path.display(), e),
        }
    }
    filenames.sort();
    filenames
}

/// Parse one filename and attach its filesystem + pixel metadata.
///
/// Returns `None` (with the reason logged) for non-conforming names and
/// for files that cannot be read or decoded — both are per-file skips,
/// never scan failures.
fn build_image(
    folder_path: &Path,
    filename: &str,
    backend: &impl ImageBackend,
) -> Option<ImageRecord> {
    let parsed = match naming::parse_image_name(filename) {
        Some(parsed) => parsed,
        None => {
            warn!(
                "Filename does not conform to naming convention, skipping: {} ({})",
                filename,
                folder_path.display()
            );
            return None;
        }
    };

    let path = folder_path.join(filename);
    let metadata = match fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(e) => {
            error!("Cannot stat {}: {}", path.display(), e);
            return None;
        }
    };
    let created_at = match metadata.created().or_else(|_| metadata.modified()) {
        Ok(t) => t,
        Err(e) => {
            error!("No usable timestamp for {}: {}", path.display(), e);
            return None;
        }
    };

    let dims = match backend.identify(&path) {
        Ok(dims) => dims,
        Err(e) => {
            error!("Unreadable image, skipping: {} ({})", path.display(), e);
            return None;
        }
    };

    Some(ImageRecord::new(
        filename.to_string(),
        ImageIdentity {
            code: parsed.code,
            variant: parsed.variant,
        },
        parsed.extension,
        created_at,
        metadata.len(),
        dims.width,
        dims.height,
        folder_path.to_path_buf(),
    ))
}

/// Assign a shared group id to every set of folders with the same code.
fn link_duplicate_folders(folders: &mut [FolderRecord]) {
    let mut by_code: HashMap<u32, Vec<usize>> = HashMap::new();
    for (i, folder) in folders.iter().enumerate() {
        if let Some(code) = folder.code {
            by_code.entry(code).or_default().push(i);
        }
    }

    let mut next_group = 0usize;
    let mut groups: Vec<_> = by_code.into_iter().collect();
    groups.sort_by_key(|(code, _)| *code);
    for (_, members) in groups {
        if members.len() < 2 {
            continue;
        }
        for i in members {
            folders[i].duplicate_group = Some(next_group);
        }
        next_group += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use crate::imaging::backend::tests::MockBackend;
    use tempfile::TempDir;

    fn backend_with_dims(n: usize) -> MockBackend {
        MockBackend::with_dimensions(vec![
            Dimensions {
                width: 1600,
                height: 1200
            };
            n
        ])
    }

    fn write_file(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"fake image data").unwrap();
    }

    #[test]
    fn staging_scan_builds_folder_records() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("12345");
        fs::create_dir(&folder).unwrap();
        write_file(&folder, "12345.jpg");
        write_file(&folder, "12345_1.jpg");

        let scan = scan_staging(tmp.path(), &backend_with_dims(2)).unwrap();
        assert_eq!(scan.folders.len(), 1);
        assert_eq!(scan.folders[0].code, Some(12345));
        assert_eq!(scan.folders[0].images.len(), 2);
        assert_eq!(scan.image_count(), 2);
    }

    #[test]
    fn non_item_folders_are_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("notes")).unwrap();
        fs::create_dir(tmp.path().join("123456")).unwrap();
        write_file(&tmp.path().join("123456"), "12345.jpg");

        let scan = scan_staging(tmp.path(), &backend_with_dims(0)).unwrap();
        assert!(scan.folders.is_empty());
    }

    #[test]
    fn folder_name_with_suffix_parses_code() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("54321 blue sofa")).unwrap();

        let scan = scan_staging(tmp.path(), &backend_with_dims(0)).unwrap();
        assert_eq!(scan.folders.len(), 1);
        assert_eq!(scan.folders[0].code, Some(54321));
        assert_eq!(scan.folders[0].name, "54321 blue sofa");
    }

    #[test]
    fn nested_item_folder_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let outer = tmp.path().join("12345");
        let inner = outer.join("67890");
        fs::create_dir_all(&inner).unwrap();
        write_file(&outer, "12345.jpg");
        write_file(&inner, "67890.jpg");

        let scan = scan_staging(tmp.path(), &backend_with_dims(2)).unwrap();
        assert_eq!(scan.folders.len(), 1);
        assert_eq!(scan.folders[0].code, Some(12345));
        // the nested folder's file is not attached anywhere
        assert_eq!(scan.image_count(), 1);
    }

    #[test]
    fn deeply_nested_item_folder_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let inner = tmp.path().join("12345").join("extra").join("67890");
        fs::create_dir_all(&inner).unwrap();

        let scan = scan_staging(tmp.path(), &backend_with_dims(0)).unwrap();
        assert_eq!(scan.folders.len(), 1);
        assert_eq!(scan.folders[0].code, Some(12345));
    }

    #[test]
    fn sibling_item_folders_both_accepted() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("12345")).unwrap();
        fs::create_dir(tmp.path().join("67890")).unwrap();

        let scan = scan_staging(tmp.path(), &backend_with_dims(0)).unwrap();
        assert_eq!(scan.folders.len(), 2);
    }

    #[test]
    fn duplicate_coded_folders_share_a_group() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("12345")).unwrap();
        fs::create_dir(tmp.path().join("12345-copy")).unwrap();
        fs::create_dir(tmp.path().join("67890")).unwrap();

        let scan = scan_staging(tmp.path(), &backend_with_dims(0)).unwrap();
        assert_eq!(scan.folders.len(), 3);

        let by_name: HashMap<&str, usize> = scan
            .folders
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.as_str(), i))
            .collect();

        let first = by_name["12345"];
        let copy = by_name["12345-copy"];
        let other = by_name["67890"];

        assert_eq!(scan.duplicate_names_of(first), vec!["12345-copy"]);
        assert_eq!(scan.duplicate_names_of(copy), vec!["12345"]);
        assert!(scan.duplicate_names_of(other).is_empty());
        assert_eq!(scan.folders[other].duplicate_group, None);
    }

    #[test]
    fn non_conforming_filenames_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("12345");
        fs::create_dir(&folder).unwrap();
        write_file(&folder, "12345.jpg");
        write_file(&folder, "readme.txt");
        write_file(&folder, "123456.jpg");
        write_file(&folder, "12345_.jpg");

        let scan = scan_staging(tmp.path(), &backend_with_dims(4)).unwrap();
        assert_eq!(scan.folders[0].images.len(), 1);
        assert_eq!(scan.folders[0].images[0].filename, "12345.jpg");
    }

    #[test]
    fn unreadable_image_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("12345");
        fs::create_dir(&folder).unwrap();
        write_file(&folder, "12345.jpg");
        write_file(&folder, "12345_1.jpg");

        // only one probe result: the second file fails to identify
        let scan = scan_staging(tmp.path(), &backend_with_dims(1)).unwrap();
        assert_eq!(scan.folders[0].images.len(), 1);
    }

    #[test]
    fn misplaced_file_is_still_scanned() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("12345");
        fs::create_dir(&folder).unwrap();
        write_file(&folder, "99999.jpg");

        let scan = scan_staging(tmp.path(), &backend_with_dims(1)).unwrap();
        assert_eq!(scan.folders[0].images.len(), 1);
        assert_eq!(scan.folders[0].images[0].identity.code, 99999);
        assert_eq!(scan.folders[0].code, Some(12345));
    }

    #[test]
    fn missing_staging_root_is_fatal() {
        let result = scan_staging(Path::new("/nonexistent/staging"), &backend_with_dims(0));
        assert!(matches!(result, Err(ScanError::RootNotAccessible(_))));
    }

    #[test]
    fn production_scan_is_flat() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "12345.jpg");
        write_file(tmp.path(), "12345_1.jpg");
        write_file(tmp.path(), "67890.png");

        let images = scan_production(tmp.path(), &backend_with_dims(3)).unwrap();
        assert_eq!(images.len(), 3);
        assert!(images.iter().all(|i| i.folder_path == tmp.path()));
    }

    #[test]
    fn production_subdirectory_contents_ignored() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "12345.jpg");
        let sub = tmp.path().join("archive");
        fs::create_dir(&sub).unwrap();
        write_file(&sub, "67890.jpg");

        let images = scan_production(tmp.path(), &backend_with_dims(2)).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].identity, ImageIdentity::primary(12345));
    }

    #[test]
    fn missing_production_root_is_fatal() {
        let result = scan_production(Path::new("/nonexistent/prod"), &backend_with_dims(0));
        assert!(matches!(result, Err(ScanError::RootNotAccessible(_))));
    }

    #[test]
    fn scanned_records_carry_metadata() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("12345");
        fs::create_dir(&folder).unwrap();
        write_file(&folder, "12345_2.jpg");

        let scan = scan_staging(tmp.path(), &backend_with_dims(1)).unwrap();
        let image = &scan.folders[0].images[0];
        assert_eq!(image.identity, ImageIdentity::variant(12345, 2));
        assert_eq!(image.extension, "jpg");
        assert_eq!(image.width, 1600);
        assert_eq!(image.height, 1200);
        assert_eq!(image.size_bytes, 15);
        assert_eq!(image.source_path(), folder.join("12345_2.jpg"));
    }
}
