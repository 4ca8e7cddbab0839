//! Products: the line items of an order form.
//!
//! A product has no identity beyond its position in the owning list. The same
//! validity predicate applies to products decoded from a share link and to
//! products read back from storage; neither source is trusted.

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Why a candidate product was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidProduct {
  #[error("name is empty")]
  EmptyName,
  #[error("price is not a finite number")]
  NonFinitePrice,
  #[error("price is negative")]
  NegativePrice,
}

/// Check the product validity predicate: a non-empty name and a finite,
/// non-negative price.
pub fn validate(name: &str, price: f64) -> Result<(), InvalidProduct> {
  if name.is_empty() {
    return Err(InvalidProduct::EmptyName);
  }
  if !price.is_finite() {
    return Err(InvalidProduct::NonFinitePrice);
  }
  if price < 0.0 {
    return Err(InvalidProduct::NegativePrice);
  }
  Ok(())
}

/// A single orderable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub name:  String,
  pub price: f64,
  /// An already-uploaded image URL. Never raw file data.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image: Option<String>,
}

/// Display order is encoding order.
pub type ProductList = Vec<Product>;

impl Product {
  /// Build a validated product without an image.
  pub fn new(name: impl Into<String>, price: f64) -> Result<Self, InvalidProduct> {
    let name = name.into();
    validate(&name, price)?;
    Ok(Self { name, price, image: None })
  }

  /// Attach an image URL. An empty string clears it.
  pub fn with_image(mut self, image: impl Into<String>) -> Self {
    let image = image.into();
    self.image = (!image.is_empty()).then_some(image);
    self
  }

  pub fn is_valid(&self) -> bool { validate(&self.name, self.price).is_ok() }

  /// Interpret one loosely-typed product entry read from a stored document.
  ///
  /// Returns `None` when the entry is not an object, lacks a string `name` or
  /// a numeric `price`, or fails [`validate`]. An empty `image` string is
  /// treated as absent; extra keys are ignored.
  pub fn from_stored(value: &serde_json::Value) -> Option<Self> {
    let obj = value.as_object()?;
    let name = obj.get("name")?.as_str()?.to_owned();
    let price = obj.get("price")?.as_f64()?;
    let image = match obj.get("image") {
      None | Some(serde_json::Value::Null) => None,
      Some(serde_json::Value::String(s)) if s.is_empty() => None,
      Some(serde_json::Value::String(s)) => Some(s.clone()),
      Some(_) => return None,
    };
    validate(&name, price).ok()?;
    Some(Self { name, price, image })
  }

  /// The stored JSON shape read back by [`Product::from_stored`].
  pub fn to_stored(&self) -> serde_json::Value {
    match &self.image {
      Some(image) => json!({ "name": self.name, "price": self.price, "image": image }),
      None => json!({ "name": self.name, "price": self.price }),
    }
  }
}

/// Total price of `quantities[i]` units of `products[i]`.
///
/// Missing quantities count as zero; extra quantities are ignored.
pub fn order_total(products: &[Product], quantities: &[u32]) -> f64 {
  products
    .iter()
    .zip(quantities.iter().copied())
    .map(|(p, q)| p.price * f64::from(q))
    .sum()
}
