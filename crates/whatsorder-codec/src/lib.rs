//! Product-list codec and link builders for WhatsOrder.
//!
//! Converts between [`ProductList`]s and the compact strings carried in share
//! links. Pure synchronous; no HTTP or database dependencies.
//!
//! Two formats exist. The legacy delimiter format (see [`encode`]) is what
//! every existing link uses and stays the default. The compact format
//! (see [`encode_compact`]) round-trips any valid list. [`decode_any`] reads
//! either.
//!
//! Decoding never fails as a whole: malformed entries are dropped and
//! reported alongside the products that did decode.
//!
//! # Quick start
//!
//! ```
//! use whatsorder_codec::decode;
//!
//! let products = decode("Tea-20,Coffee-30-https%3A%2F%2Fx.com%2Fc.jpg");
//! assert_eq!(products.len(), 2);
//! assert_eq!(products[1].image.as_deref(), Some("https://x.com/c.jpg"));
//! ```

mod compact;
pub mod error;
mod legacy;
pub mod link;

pub use compact::PREFIX as COMPACT_PREFIX;
pub use error::{Error, MalformedEntry, Result};
use whatsorder_core::product::{Product, ProductList};

// ─── Public types ────────────────────────────────────────────────────────────

/// An entry that could not be decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
  /// Zero-based position in the encoded list.
  pub index:  usize,
  /// The entry as it appeared in the input.
  pub raw:    String,
  pub reason: MalformedEntry,
}

/// The outcome of decoding a product list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
  /// Valid products, in input order.
  pub products: ProductList,
  pub rejected: Vec<Rejected>,
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Encode `products` in the legacy delimiter format.
///
/// Each product renders as `name-price` or `name-price-image`, with name and
/// image percent-encoded and the price in its shortest form; entries are
/// joined with `,`. An empty list encodes to `""`.
///
/// `-` is not escaped, so a name containing `-` does not survive
/// [`decode`]. Use [`encode_compact`] where that matters.
pub fn encode(products: &[Product]) -> String { legacy::encode(products) }

/// Decode a legacy product list, silently dropping malformed entries.
pub fn decode(raw: &str) -> ProductList { legacy::decode(raw).products }

/// Decode a legacy product list, keeping the malformed entries.
pub fn decode_report(raw: &str) -> Decoded { legacy::decode(raw) }

/// Encode `products` in the compact `v2:` format.
pub fn encode_compact(products: &[Product]) -> String { compact::encode(products) }

/// Decode a compact `v2:` payload.
///
/// Unlike the legacy format, a payload whose envelope is unreadable is an
/// error; individual bad tuples are still only reported.
pub fn decode_compact(raw: &str) -> Result<Decoded> { compact::decode(raw) }

/// Decode either format, choosing by prefix.
///
/// A compact payload with an unreadable envelope decodes to no products and a
/// single rejected entry covering the whole input.
pub fn decode_any(raw: &str) -> Decoded {
  if !raw.trim_start().starts_with(COMPACT_PREFIX) {
    return legacy::decode(raw);
  }
  compact::decode(raw).unwrap_or_else(|_| Decoded {
    products: Vec::new(),
    rejected: vec![Rejected {
      index:  0,
      raw:    raw.to_owned(),
      reason: MalformedEntry::CorruptPayload,
    }],
  })
}
