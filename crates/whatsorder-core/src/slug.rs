//! Human-readable form slugs.

/// Longest slug ever produced.
pub const MAX_SLUG_LEN: usize = 50;

/// Derive a slug from a business name.
///
/// Lower-cases ASCII, collapses every run of characters outside `[a-z0-9]`
/// into a single `-`, trims leading and trailing `-`, and truncates to
/// [`MAX_SLUG_LEN`]. Lossy and non-unique: distinct names can share a slug.
pub fn generate_slug(name: &str) -> String {
  let mut slug = String::with_capacity(name.len());
  let mut pending_dash = false;

  for c in name.chars().map(|c| c.to_ascii_lowercase()) {
    if c.is_ascii_lowercase() || c.is_ascii_digit() {
      if pending_dash && !slug.is_empty() {
        slug.push('-');
      }
      pending_dash = false;
      slug.push(c);
    } else {
      pending_dash = true;
    }
  }

  slug.truncate(MAX_SLUG_LEN);
  slug
}
