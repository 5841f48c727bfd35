//! Display helpers shared by the API layer and the CLI

use std::borrow::Cow;

use crate::TxHash;

/// Longest label rendered before truncation kicks in
pub const MAX_LABEL_LEN: usize = 20;

/// Truncate a user-supplied label for display.
///
/// Labels longer than `max` characters are cut at the character boundary
/// and suffixed with `...`; anything at or under the limit passes through
/// untouched.
pub fn truncate_label(label: &str, max: usize) -> Cow<'_, str> {
    let mut chars = label.char_indices();
    match chars.nth(max) {
        None => Cow::Borrowed(label),
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + 3);
            out.push_str(&label[..byte_idx]);
            out.push_str("...");
            Cow::Owned(out)
        }
    }
}

/// Build an explorer link for a transaction.
///
/// `explorer_base` is stored without a trailing slash but one is tolerated.
pub fn tx_url(explorer_base: &str, hash: &TxHash) -> String {
    format!("{}/tx/{}", explorer_base.trim_end_matches('/'), hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_labels_pass_through() {
        assert_eq!(truncate_label("guardian", MAX_LABEL_LEN), "guardian");

        // Exactly at the limit: untouched
        let exact = "a".repeat(MAX_LABEL_LEN);
        assert_eq!(truncate_label(&exact, MAX_LABEL_LEN), exact.as_str());
    }

    #[test]
    fn test_long_labels_get_ellipsis() {
        let long = "a".repeat(MAX_LABEL_LEN + 1);
        let shown = truncate_label(&long, MAX_LABEL_LEN);
        assert_eq!(shown.len(), MAX_LABEL_LEN + 3);
        assert!(shown.ends_with("..."));
        assert!(shown.starts_with(&"a".repeat(MAX_LABEL_LEN)));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let label = "géant".repeat(6);
        let shown = truncate_label(&label, MAX_LABEL_LEN);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), MAX_LABEL_LEN + 3);
    }

    #[test]
    fn test_tx_url() {
        let hash = TxHash::new("0xabc");
        assert_eq!(
            tx_url("https://sepolia.basescan.org", &hash),
            "https://sepolia.basescan.org/tx/0xabc"
        );
        assert_eq!(
            tx_url("https://sepolia.basescan.org/", &hash),
            "https://sepolia.basescan.org/tx/0xabc"
        );
    }
}
