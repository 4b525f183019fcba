//! Sub-record codecs.
//!
//! Each codec maps one wire element to the values of one sub-record and a
//! stored sub-record back to its wire element.

pub mod alarm;
pub mod attendee;
pub mod date;
pub mod rule;

use kunai_core::constants::MAILTO_PREFIX;

/// Removes a leading `mailto:` scheme, case-insensitively.
#[must_use]
pub fn strip_mailto(address: &str) -> &str {
    let prefix_len = MAILTO_PREFIX.len();
    match address.get(..prefix_len) {
        Some(prefix) if prefix.eq_ignore_ascii_case(MAILTO_PREFIX) => &address[prefix_len..],
        _ => address,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_mailto_any_case() {
        assert_eq!(strip_mailto("MAILTO:a@example.com"), "a@example.com");
        assert_eq!(strip_mailto("mailto:a@example.com"), "a@example.com");
        assert_eq!(strip_mailto("a@example.com"), "a@example.com");
        assert_eq!(strip_mailto("mail"), "mail");
    }
}
