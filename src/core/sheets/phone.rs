// Phone normalization for messaging deep links (wa.me).
//
// This is not an E.164 normalizer: it strips everything but digits and swaps a
// national trunk `0` for one configured country calling code. Nothing is
// validated, so callers must handle an empty result.

/// Country calling code used when no other profile is configured (Benin).
pub const DEFAULT_COUNTRY_CODE: &str = "229";

/// Which calling code replaces a leading national `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneProfile {
    pub country_code: String,
}

impl PhoneProfile {
    pub fn new(country_code: impl Into<String>) -> Self {
        let country_code: String = country_code.into();
        Self {
            // accept "+33" as well as "33"
            country_code: country_code.chars().filter(|c| c.is_ascii_digit()).collect(),
        }
    }
}

impl Default for PhoneProfile {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRY_CODE)
    }
}

/// Converts a free-form phone string into the digit string wa.me expects.
pub fn normalize_for_messaging(raw: &str, profile: &PhoneProfile) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.strip_prefix('0') {
        Some(national) => format!("{}{}", profile.country_code, national),
        None => digits,
    }
}

/// WhatsApp deep link, or `None` when the number has no digits at all.
pub fn whatsapp_link(raw: &str, profile: &PhoneProfile) -> Option<String> {
    let number = normalize_for_messaging(raw, profile);
    if number.is_empty() {
        return None;
    }
    Some(format!("https://wa.me/{}", number))
}

/// `tel:` link keeping a leading `+`, other separators removed.
pub fn tel_link(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let mut number: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if number.is_empty() {
        return None;
    }
    if trimmed.starts_with('+') {
        number.insert(0, '+');
    }
    Some(format!("tel:{}", number))
}
