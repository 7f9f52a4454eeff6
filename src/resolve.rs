//! Freshness resolution: one winner per logical image.
//!
//! Staging trees accumulate copies — the same photo re-uploaded into the
//! same folder under another extension, or into a second folder carrying
//! the same item code. Promotion must consider exactly one copy per
//! [`ImageIdentity`](crate::types::ImageIdentity): the one with the latest
//! creation timestamp.
//!
//! Losers are marked [`Stale`](crate::types::PromotionState::Stale) and
//! take no further part in the pipeline (they still appear in the report's
//! folder contents). Ties break to the first record encountered in scan
//! order, which is deterministic because the scanners sort directory
//! entries.

use crate::scan::StagingScan;
use crate::types::ImageIdentity;
use std::collections::HashMap;
use std::time::SystemTime;

/// Mark every staged image that loses the freshness race as stale.
///
/// After this returns, exactly one record per identity group is left
/// unresolved (the newest; strictly-later timestamps win, ties go to the
/// first encountered).
pub fn resolve_newest(scan: &mut StagingScan) {
    // (winner position in iteration order, winning timestamp)
    let mut winners: HashMap<ImageIdentity, (usize, SystemTime)> = HashMap::new();

    for (position, image) in scan.images().enumerate() {
        match winners.get(&image.identity) {
            Some(&(_, best)) if image.created_at <= best => {}
            _ => {
                winners.insert(image.identity, (position, image.created_at));
            }
        }
    }

    for (position, image) in scan.images_mut().enumerate() {
        let (winner, _) = winners[&image.identity];
        if winner != position {
            image.mark_stale();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FolderRecord, ImageRecord, PromotionState};
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn record(filename: &str, code: u32, variant: Option<u32>, secs: u64) -> ImageRecord {
        ImageRecord::new(
            filename.to_string(),
            ImageIdentity { code, variant },
            "jpg".into(),
            SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
            100,
            1600,
            1200,
            PathBuf::from("/staging/12345"),
        )
    }

    fn scan_of(images: Vec<ImageRecord>) -> StagingScan {
        let mut folder = FolderRecord::new("12345".into(), Some(12345), Path::new("/staging/12345"));
        folder.images = images;
        StagingScan {
            folders: vec![folder],
        }
    }

    fn states(scan: &StagingScan) -> Vec<PromotionState> {
        scan.images().map(|i| i.state()).collect()
    }

    #[test]
    fn lone_image_stays_a_candidate() {
        let mut scan = scan_of(vec![record("12345.jpg", 12345, None, 100)]);
        resolve_newest(&mut scan);
        assert_eq!(states(&scan), vec![PromotionState::Unresolved]);
    }

    #[test]
    fn newest_of_a_group_wins() {
        let mut scan = scan_of(vec![
            record("12345.jpg", 12345, None, 100),
            record("12345.png", 12345, None, 200),
        ]);
        resolve_newest(&mut scan);
        assert_eq!(
            states(&scan),
            vec![PromotionState::Stale, PromotionState::Unresolved]
        );
    }

    #[test]
    fn distinct_identities_do_not_compete() {
        let mut scan = scan_of(vec![
            record("12345.jpg", 12345, None, 100),
            record("12345_1.jpg", 12345, Some(1), 50),
        ]);
        resolve_newest(&mut scan);
        assert_eq!(
            states(&scan),
            vec![PromotionState::Unresolved, PromotionState::Unresolved]
        );
    }

    #[test]
    fn exactly_one_winner_per_group() {
        let mut scan = scan_of(vec![
            record("12345.jpg", 12345, None, 300),
            record("12345.png", 12345, None, 100),
            record("12345.webp", 12345, None, 200),
        ]);
        resolve_newest(&mut scan);
        let unresolved = scan
            .images()
            .filter(|i| i.state() == PromotionState::Unresolved)
            .count();
        assert_eq!(unresolved, 1);
        assert_eq!(states(&scan)[0], PromotionState::Unresolved);
    }

    #[test]
    fn timestamp_tie_breaks_to_first_encountered() {
        let mut scan = scan_of(vec![
            record("12345.jpg", 12345, None, 100),
            record("12345.png", 12345, None, 100),
        ]);
        resolve_newest(&mut scan);
        assert_eq!(
            states(&scan),
            vec![PromotionState::Unresolved, PromotionState::Stale]
        );
    }

    #[test]
    fn copies_compete_across_folders() {
        let mut first =
            FolderRecord::new("12345".into(), Some(12345), Path::new("/staging/12345"));
        first.images = vec![record("12345.jpg", 12345, None, 100)];
        let mut second = FolderRecord::new(
            "12345-copy".into(),
            Some(12345),
            Path::new("/staging/12345-copy"),
        );
        second.images = vec![record("12345.jpg", 12345, None, 200)];

        let mut scan = StagingScan {
            folders: vec![first, second],
        };
        resolve_newest(&mut scan);

        assert_eq!(scan.folders[0].images[0].state(), PromotionState::Stale);
        assert_eq!(
            scan.folders[1].images[0].state(),
            PromotionState::Unresolved
        );
    }

    #[test]
    fn resolution_is_repeatable() {
        let mut scan = scan_of(vec![
            record("12345.jpg", 12345, None, 100),
            record("12345.png", 12345, None, 200),
        ]);
        resolve_newest(&mut scan);
        let first = states(&scan);
        resolve_newest(&mut scan);
        assert_eq!(states(&scan), first);
    }
}
