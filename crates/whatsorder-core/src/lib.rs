//! Core types and trait definitions for WhatsOrder forms.
//!
//! A form is a business name, a WhatsApp number, and a product list. This
//! crate knows how to find one across storage tiers, decide who may see or
//! change it, and turn a selection into an order message. It has no HTTP or
//! database dependencies; backends implement [`store::FormStore`].

// Native `async fn` in traits; the `Send` bounds live on the trait signatures.
#![allow(async_fn_in_trait)]

pub mod editor;
pub mod error;
pub mod form;
pub mod gate;
pub mod locator;
pub mod order;
pub mod phone;
pub mod product;
pub mod slug;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
