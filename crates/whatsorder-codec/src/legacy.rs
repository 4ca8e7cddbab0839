//! The delimiter format carried in `?products=` share links.
//!
//! Grammar: `entry (',' entry)*` with `entry := name '-' price ('-' image)?`.
//! Names and images are percent-encoded, but the encoder leaves `-`
//! untouched, so a name containing `-` cannot survive a round trip. Existing
//! links depend on this exact shape.

use whatsorder_core::product::{Product, validate};

use crate::{Decoded, Rejected, error::MalformedEntry};

pub(crate) const ENTRY_SEPARATOR: char = ',';
pub(crate) const FIELD_SEPARATOR: char = '-';

pub(crate) fn encode(products: &[Product]) -> String {
  products
    .iter()
    .map(encode_entry)
    .collect::<Vec<_>>()
    .join(",")
}

fn encode_entry(p: &Product) -> String {
  let mut entry =
    format!("{}{FIELD_SEPARATOR}{}", urlencoding::encode(&p.name), price_text(p.price));
  if let Some(image) = p.image.as_deref().filter(|i| !i.is_empty()) {
    entry.push(FIELD_SEPARATOR);
    entry.push_str(&urlencoding::encode(image));
  }
  entry
}

/// `-0` would render with a leading `-` and split as an empty price.
fn price_text(price: f64) -> String {
  if price == 0.0 { "0".to_owned() } else { price.to_string() }
}

pub(crate) fn decode(raw: &str) -> Decoded {
  let mut decoded = Decoded::default();
  if raw.trim().is_empty() {
    return decoded;
  }

  for (index, entry) in raw.split(ENTRY_SEPARATOR).enumerate() {
    match decode_entry(entry) {
      Ok(product) => decoded.products.push(product),
      Err(reason) => decoded.rejected.push(Rejected {
        index,
        raw: entry.to_owned(),
        reason,
      }),
    }
  }
  decoded
}

fn decode_entry(entry: &str) -> Result<Product, MalformedEntry> {
  let mut segments = entry.split(FIELD_SEPARATOR);
  let name_raw = segments.next().unwrap_or_default();
  let price_raw = segments.next().ok_or(MalformedEntry::MissingPrice)?;
  let image_raw = segments.collect::<Vec<_>>().join("-");

  let name = percent_decode(name_raw)?;
  let price_text = percent_decode(price_raw)?;
  let image = percent_decode(&image_raw)?;

  let price = parse_price(&price_text)?;
  validate(&name, price)?;

  Ok(Product { name, price, image: None }.with_image(image))
}

/// Only the raw segment is trimmed; escaped whitespace belongs to the value.
fn percent_decode(segment: &str) -> Result<String, MalformedEntry> {
  urlencoding::decode(segment.trim())
    .map(|s| s.into_owned())
    .map_err(|_| MalformedEntry::InvalidEncoding)
}

/// An empty price is malformed rather than zero. Older links that carried a
/// blank price (`Tea-`) lose that entry instead of offering it for free.
fn parse_price(text: &str) -> Result<f64, MalformedEntry> {
  text
    .parse::<f64>()
    .map_err(|_| MalformedEntry::UnparseablePrice(text.to_owned()))
}

#[cfg(test)]
mod tests {
  use whatsorder_core::product::InvalidProduct;

  use super::*;

  fn product(name: &str, price: f64) -> Product { Product::new(name, price).unwrap() }

  #[test]
  fn encodes_in_order_with_shortest_prices() {
    let list = vec![
      product("Veg Thali", 120.0),
      product("Chai", 12.5).with_image("https://x.com/c.jpg"),
    ];
    assert_eq!(
      encode(&list),
      "Veg%20Thali-120,Chai-12.5-https%3A%2F%2Fx.com%2Fc.jpg"
    );
    assert_eq!(encode(&[]), "");
  }

  #[test]
  fn round_trips_names_without_hyphens() {
    let list = vec![
      product("Tea", 20.0),
      product("Masala Dosa, large", 85.25).with_image("https://x.com/d.png?w=200&h=100"),
      product("Café ☕", 0.0),
    ];
    let decoded = decode(&encode(&list));
    assert_eq!(decoded.products, list);
    assert!(decoded.rejected.is_empty());
  }

  #[test]
  fn escaped_spaces_survive_a_round_trip() {
    let list = vec![product(" Tea ", 20.0), product(" ", 1.0)];
    let encoded = encode(&list);
    assert_eq!(encoded, "%20Tea%20-20,%20-1");

    let decoded = decode(&encoded);
    assert_eq!(decoded.products, list);
    assert!(decoded.rejected.is_empty());
  }

  #[test]
  fn negative_zero_price_encodes_as_zero() {
    let encoded = encode(&[product("Tea", -0.0)]);
    assert_eq!(encoded, "Tea-0");
    assert_eq!(decode(&encoded).products, vec![product("Tea", 0.0)]);
  }

  #[test]
  fn hyphenated_name_does_not_round_trip() {
    let encoded = encode(&[product("A-B", 5.0)]);
    assert_eq!(encoded, "A-B-5");

    let decoded = decode(&encoded);
    assert!(decoded.products.is_empty());
    assert_eq!(
      decoded.rejected[0].reason,
      MalformedEntry::UnparseablePrice("B".into())
    );
  }

  #[test]
  fn hyphenated_name_with_numeric_tail_is_misread() {
    let decoded = decode(&encode(&[product("Pack-4", 30.0)]));
    assert_eq!(decoded.products, vec![product("Pack", 4.0).with_image("30")]);
  }

  #[test]
  fn bad_entries_are_dropped_not_fatal() {
    let decoded = decode("Good-10,Bad,Also-5");
    assert_eq!(decoded.products, vec![product("Good", 10.0), product("Also", 5.0)]);
    assert_eq!(decoded.rejected.len(), 1);
    assert_eq!(decoded.rejected[0].index, 1);
    assert_eq!(decoded.rejected[0].raw, "Bad");
    assert_eq!(decoded.rejected[0].reason, MalformedEntry::MissingPrice);
  }

  #[test]
  fn rejects_each_kind_of_malformed_entry() {
    let decoded = decode("-10,Tea-,Tea-abc,Tea--3,Tea-NaN,Tea-inf,%FF-2,Tea-1");
    let reasons: Vec<_> = decoded.rejected.iter().map(|r| r.reason.clone()).collect();
    assert_eq!(reasons, vec![
      MalformedEntry::Invalid(InvalidProduct::EmptyName),
      MalformedEntry::UnparseablePrice(String::new()),
      MalformedEntry::UnparseablePrice("abc".into()),
      MalformedEntry::UnparseablePrice(String::new()),
      MalformedEntry::Invalid(InvalidProduct::NonFinitePrice),
      MalformedEntry::Invalid(InvalidProduct::NonFinitePrice),
      MalformedEntry::InvalidEncoding,
    ]);
    assert_eq!(decoded.products, vec![product("Tea", 1.0)]);
  }

  #[test]
  fn percent_encoded_minus_is_a_negative_price() {
    let decoded = decode("Tea-%2D3");
    assert!(decoded.products.is_empty());
    assert_eq!(
      decoded.rejected[0].reason,
      MalformedEntry::Invalid(InvalidProduct::NegativePrice)
    );
  }

  #[test]
  fn image_keeps_inner_hyphens_and_blank_image_is_absent() {
    let decoded = decode("Tea-20-https%3A%2F%2Fx.com%2Fmy-tea.jpg,Coffee-30-");
    assert_eq!(decoded.products, vec![
      product("Tea", 20.0).with_image("https://x.com/my-tea.jpg"),
      product("Coffee", 30.0),
    ]);
  }

  #[test]
  fn whitespace_around_segments_is_ignored() {
    let decoded = decode(" Tea - 20 ");
    assert_eq!(decoded.products, vec![product("Tea", 20.0)]);
  }

  #[test]
  fn empty_input_is_empty_list() {
    let decoded = decode("");
    assert!(decoded.products.is_empty());
    assert!(decoded.rejected.is_empty());
  }
}
