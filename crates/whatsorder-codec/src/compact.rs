//! The unambiguous compact format.
//!
//! `v2:` followed by unpadded base64url of a JSON array of
//! `[name, price]` or `[name, price, image]` tuples. The legacy encoder
//! always percent-encodes `:`, so the prefix can never start a legacy list.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Value, json};
use whatsorder_core::product::{Product, validate};

use crate::{
  Decoded, Rejected,
  error::{Error, MalformedEntry, Result},
};

pub const PREFIX: &str = "v2:";

pub(crate) fn encode(products: &[Product]) -> String {
  let tuples: Vec<Value> = products
    .iter()
    .map(|p| match p.image.as_deref().filter(|i| !i.is_empty()) {
      Some(image) => json!([p.name, p.price, image]),
      None => json!([p.name, p.price]),
    })
    .collect();
  let payload = Value::Array(tuples).to_string();
  format!("{PREFIX}{}", URL_SAFE_NO_PAD.encode(payload))
}

pub(crate) fn decode(raw: &str) -> Result<Decoded> {
  let body = raw.trim().strip_prefix(PREFIX).ok_or(Error::MissingPrefix)?;
  let bytes = URL_SAFE_NO_PAD.decode(body)?;
  let tuples: Vec<Value> = serde_json::from_slice(&bytes)?;

  let mut decoded = Decoded::default();
  for (index, tuple) in tuples.iter().enumerate() {
    match decode_tuple(tuple) {
      Ok(product) => decoded.products.push(product),
      Err(reason) => decoded.rejected.push(Rejected {
        index,
        raw: tuple.to_string(),
        reason,
      }),
    }
  }
  Ok(decoded)
}

fn decode_tuple(tuple: &Value) -> Result<Product, MalformedEntry> {
  let (name, price, image) = match tuple.as_array().map(Vec::as_slice) {
    Some([name, price]) => (name, price, None),
    Some([name, price, image]) => (name, price, Some(image)),
    _ => return Err(MalformedEntry::InvalidTuple),
  };

  let name = name.as_str().ok_or(MalformedEntry::InvalidTuple)?.to_owned();
  let price = price.as_f64().ok_or(MalformedEntry::InvalidTuple)?;
  let image = match image {
    None | Some(Value::Null) => String::new(),
    Some(Value::String(s)) => s.clone(),
    Some(_) => return Err(MalformedEntry::InvalidTuple),
  };

  validate(&name, price)?;
  Ok(Product { name, price, image: None }.with_image(image))
}
