//! Composing the customer's WhatsApp order message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{form::ResolvedForm, product::order_total};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderError {
  #[error("select at least one item")]
  NothingSelected,
  #[error("name and address are required")]
  MissingCustomerDetails,
}

/// What the customer filled in on the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderRequest {
  /// Quantity per product, by position in the form's product list.
  #[serde(default)]
  pub quantities: Vec<u32>,
  pub name:       String,
  pub address:    String,
}

/// A composed order, ready to be sent to the business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderMessage {
  /// One `- {qty}x {name}` line per selected product, in form order.
  pub lines: Vec<String>,
  pub total: f64,
  pub text:  String,
}

/// Build the order message for `form`.
pub fn compose(form: &ResolvedForm, request: &OrderRequest) -> Result<OrderMessage, OrderError> {
  let products = form.products();

  let lines: Vec<String> = products
    .iter()
    .zip(request.quantities.iter().copied())
    .filter(|(_, q)| *q > 0)
    .map(|(p, q)| format!("- {q}x {}", p.name))
    .collect();

  if lines.is_empty() {
    return Err(OrderError::NothingSelected);
  }

  let name = request.name.trim();
  let address = request.address.trim();
  if name.is_empty() || address.is_empty() {
    return Err(OrderError::MissingCustomerDetails);
  }

  let total = order_total(products, &request.quantities);
  let text = format!(
    "Hello {},\nI'd like to order:\n{}\n\nTotal: ₹{total}\n\nName: {name}\nAddress: {address}",
    form.business_name(),
    lines.join("\n"),
  );

  Ok(OrderMessage { lines, total, text })
}
