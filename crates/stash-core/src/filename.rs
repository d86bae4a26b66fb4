//! Randomized names for stored files.
//!
//! A token is a uniformly random integer in `[16^8, 16^9)` rendered as
//! lowercase hex, so it is always nine digits. Collisions are not checked.

use rand::Rng;

const TOKEN_MIN: u64 = 0x1_0000_0000;
const TOKEN_MAX: u64 = 0x10_0000_0000;

/// Used when the source path has no usable extension.
pub const FALLBACK_EXTENSION: &str = "bin";

pub fn random_token() -> String {
    random_token_with(&mut rand::thread_rng())
}

pub fn random_token_with<R: Rng>(rng: &mut R) -> String {
    format!("{:x}", rng.gen_range(TOKEN_MIN..TOKEN_MAX))
}

/// Lowercased extension of the last path segment, if it has one.
///
/// Only ASCII alphanumerics survive; anything else means "no extension".
pub fn extension_of(path: &str) -> Option<String> {
    let last = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = last.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// `<token>.<ext>` for a file fetched from `source_path`.
pub fn generate(source_path: &str) -> String {
    let ext = extension_of(source_path).unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
    format!("{}.{ext}", random_token())
}
