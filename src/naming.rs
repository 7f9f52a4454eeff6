//! Centralized filename parsing for the 5-digit item code convention.
//!
//! Every catalog image follows the same naming pattern: a 5-digit item code,
//! an optional variant suffix, and an image extension:
//!
//! - `12345.jpg` → code 12345, primary photo (no variant)
//! - `12345_2.jpg` → code 12345, variant 2
//! - `12345-10.webp` → code 12345, variant 10 (dash and underscore are
//!   interchangeable separators)
//!
//! Staging folders carry the same code as a name prefix (`12345`,
//! `12345 red chair`), parsed independently of the images inside — a
//! mismatch between the two is how misplaced images are detected later.
//!
//! Names that do not conform are rejected here, not repaired: anything
//! between the code and the variant/extension separator (extra digits,
//! letters) invalidates the whole name. Callers log and skip.

/// Extensions accepted for catalog images, lowercase.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "webp"];

/// Result of parsing a conforming image filename like `12345_2.jpg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedImageName {
    /// The 5-digit item code.
    pub code: u32,
    /// Variant number if present; `None` means the primary ("main") photo.
    pub variant: Option<u32>,
    /// Extension, lowercased.
    pub extension: String,
}

/// Parse an image filename into its structured identity.
///
/// A name conforms iff all three rules hold:
/// 1. the stem starts with exactly 5 ASCII digits (the item code);
/// 2. the rest of the stem is empty or a single `[-_]<digits>` variant
///    segment immediately before the extension separator;
/// 3. the extension case-insensitively matches one of
///    [`SUPPORTED_EXTENSIONS`].
///
/// Returns `None` for anything else. `123456.jpg` is rejected (six leading
/// digits, so the code is not *exactly* five), as is `12345x.jpg` (residue
/// between code and extension that is not a variant segment).
pub fn parse_image_name(name: &str) -> Option<ParsedImageName> {
    let (stem, extension) = split_extension(name)?;

    let code = parse_code(stem.get(..5)?)?;
    let rest = &stem[5..];

    let variant = if rest.is_empty() {
        None
    } else {
        let sep = rest.chars().next()?;
        if sep != '-' && sep != '_' {
            return None;
        }
        let digits = &rest[1..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(digits.parse().ok()?)
    };

    Some(ParsedImageName {
        code,
        variant,
        extension,
    })
}

/// Whether a directory name marks an item folder: 5 digits optionally
/// followed by non-digit text (`12345`, `12345 red chair` — but not
/// `123456`, whose sixth digit would make the code ambiguous).
pub fn is_item_folder_name(name: &str) -> bool {
    let Some(prefix) = name.get(..5) else {
        return false;
    };
    if parse_code(prefix).is_none() {
        return false;
    }
    // A sixth digit would extend the code past five digits.
    !name[5..].starts_with(|c: char| c.is_ascii_digit())
}

/// Extract the 5-digit code prefix of a folder name, if it has one.
pub fn parse_folder_code(name: &str) -> Option<u32> {
    parse_code(name.get(..5)?)
}

/// Parse exactly five ASCII digits.
fn parse_code(prefix: &str) -> Option<u32> {
    if prefix.len() == 5 && prefix.bytes().all(|b| b.is_ascii_digit()) {
        prefix.parse().ok()
    } else {
        None
    }
}

/// Split a filename into (stem, lowercased extension), requiring the
/// extension to be a supported image format.
fn split_extension(name: &str) -> Option<(&str, String)> {
    let dot = name.rfind('.')?;
    let ext = name[dot + 1..].to_lowercase();
    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Some((&name[..dot], ext))
    } else {
        None
    }
}
