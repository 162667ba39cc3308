//! Domain name normalization.

use crate::error::{Result, SuffixError};

/// ASCII-compatible encoding prefix of internationalized labels
pub const PUNY_PREFIX: &str = "xn--";

/// Check whether a label is in punycode (ACE) form
pub fn is_punycode(label: &str) -> bool {
    label
        .get(..PUNY_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(PUNY_PREFIX))
}

/// Lowercase a name, strip one trailing dot and split it into labels.
///
/// The leftmost label is the most specific one, the rightmost is the root.
pub fn split_labels(fqdn: &str) -> Result<Vec<String>> {
    if fqdn.is_empty() {
        return Err(SuffixError::InvalidInput("empty domain name".to_string()));
    }

    let name = fqdn.strip_suffix('.').unwrap_or(fqdn);
    if name.is_empty() {
        return Err(SuffixError::InvalidInput(format!(
            "no labels in domain name: {:?}",
            fqdn
        )));
    }

    name.split('.')
        .map(|label| {
            if label.is_empty() {
                Err(SuffixError::InvalidInput(format!(
                    "empty label in domain name: {:?}",
                    fqdn
                )))
            } else if label.chars().any(|c| c.is_whitespace() || c.is_control()) {
                Err(SuffixError::InvalidInput(format!(
                    "invalid character in domain name: {:?}",
                    fqdn
                )))
            } else {
                Ok(label.to_lowercase())
            }
        })
        .collect()
}
