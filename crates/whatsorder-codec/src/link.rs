//! Share links and WhatsApp `wa.me` links.

use whatsorder_core::{
  form::{EphemeralForm, FormRecord, ResolvedForm},
  phone::wa_digits,
  slug::generate_slug,
};

const WA_ME: &str = "https://wa.me";

/// Path segment used when a business name yields an empty slug.
const FALLBACK_SLUG: &str = "form";

/// Link that opens a WhatsApp chat with `phone`, pre-filled with `message`.
pub fn whatsapp_order_link(phone: &str, message: &str) -> String {
  format!("{WA_ME}/{}?text={}", wa_digits(phone), urlencoding::encode(message))
}

/// Link that lets the sender pick any chat to forward `message` to.
pub fn whatsapp_share_link(message: &str) -> String {
  format!("{WA_ME}/?text={}", urlencoding::encode(message))
}

/// The text sent when a customer shares a form with someone else.
pub fn share_message(business_name: &str, url: &str) -> String {
  format!("Check out {business_name}'s order form: {url}")
}

/// `/preview/{slug}?id={id}` for a stored form.
pub fn stored_share_path(record: &FormRecord) -> String {
  format!(
    "/preview/{}?{}",
    urlencoding::encode(slug_or_fallback(&record.slug)),
    query_string(&[("id", &record.id)])
  )
}

/// `/preview/{slug}?biz=..&phone=..&products=..` for a form that lives only
/// in its link.
///
/// The product list is appended as the codec emits it, without a second
/// round of percent-encoding; its alphabet is already query-safe.
pub fn ephemeral_share_path(form: &EphemeralForm) -> String {
  let slug = generate_slug(&form.business_name);
  format!(
    "/preview/{}?{}&products={}",
    urlencoding::encode(slug_or_fallback(&slug)),
    query_string(&[("biz", &form.business_name), ("phone", &form.phone_number)]),
    crate::encode(&form.products),
  )
}

pub fn share_path(form: &ResolvedForm) -> String {
  match form {
    ResolvedForm::Stored(record) => stored_share_path(record),
    ResolvedForm::Ephemeral(form) => ephemeral_share_path(form),
  }
}

/// Join `base_url` and an absolute `path` with exactly one `/`.
pub fn absolute(base_url: &str, path: &str) -> String {
  format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// `k=v&k=v`, with every value percent-encoded.
pub fn query_string(pairs: &[(&str, &str)]) -> String {
  pairs
    .iter()
    .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
    .collect::<Vec<_>>()
    .join("&")
}

fn slug_or_fallback(slug: &str) -> &str { if slug.is_empty() { FALLBACK_SLUG } else { slug } }
