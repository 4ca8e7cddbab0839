//! WhatsApp phone number handling (Indian mobile numbers).

const COUNTRY_PREFIX: &str = "+91";

/// `true` for a ten-digit Indian mobile number starting with 6–9, optionally
/// prefixed with `+91`. Surrounding whitespace is ignored.
pub fn is_valid_phone(phone: &str) -> bool {
  let phone = phone.trim();
  let local = phone.strip_prefix(COUNTRY_PREFIX).unwrap_or(phone);
  local.len() == 10
    && local.bytes().all(|b| b.is_ascii_digit())
    && matches!(local.as_bytes().first(), Some(b'6'..=b'9'))
}

/// Canonical stored form: `+91` followed by the last ten digits of the input.
///
/// Fails when the input holds fewer than ten digits, or when the resulting
/// number is not a valid mobile number.
pub fn normalize_phone(phone: &str) -> Option<String> {
  let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
  let local = digits.get(digits.len().checked_sub(10)?..)?;
  let normalized = format!("{COUNTRY_PREFIX}{local}");
  is_valid_phone(&normalized).then_some(normalized)
}

/// Digits only, as expected by `wa.me` links.
pub fn wa_digits(phone: &str) -> String {
  phone.chars().filter(char::is_ascii_digit).collect()
}
