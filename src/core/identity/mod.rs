//! # Identity Module
//!
//! Derives the identity key that joins a preview to its raw siblings.
//!
//! Cameras number their shots with a fixed prefix and a four digit counter
//! (`_DSC0042.ARW`, `IMG_0042.JPG`). The counter alone is the identity key;
//! it wraps every 10 000 shots, which is why several raw files may share one
//! key and the capture time is needed to tell them apart.

use regex::Regex;

/// Default filename prefixes that precede the shot counter
pub const DEFAULT_PREFIXES: &[&str] = &["_DSC", "DSC", "IMG_"];

/// Number of digits in the shot counter
pub const KEY_DIGITS: usize = 4;

/// Extracts identity keys from file names
#[derive(Debug, Clone)]
pub struct IdentityPattern {
    regex: Option<Regex>,
}

impl IdentityPattern {
    /// Build a pattern accepting any of the given literal prefixes.
    ///
    /// Longer prefixes are tried first so `_DSC` wins over `DSC`.
    pub fn new<S: AsRef<str>>(prefixes: &[S]) -> Self {
        let mut prefixes: Vec<String> = prefixes
            .iter()
            .map(|p| p.as_ref().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        prefixes.dedup();

        let alternation = prefixes
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let regex = if prefixes.is_empty() {
            None
        } else {
            Regex::new(&format!(r"^(?:{})([0-9]{{{}}})", alternation, KEY_DIGITS)).ok()
        };

        Self { regex }
    }

    /// Extract the identity key from a base file name.
    ///
    /// Returns `None` when the name does not start with a known prefix
    /// followed by exactly four digits.
    pub fn extract(&self, file_name: &str) -> Option<String> {
        self.regex
            .as_ref()?
            .captures(file_name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl Default for IdentityPattern {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIXES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_counter_after_raw_prefix() {
        let pattern = IdentityPattern::default();
        assert_eq!(pattern.extract("_DSC0001.ARW"), Some("0001".to_string()));
        assert_eq!(pattern.extract("_DSC0002_b.RAW"), Some("0002".to_string()));
    }

    #[test]
    fn extracts_counter_after_preview_prefix() {
        let pattern = IdentityPattern::default();
        assert_eq!(pattern.extract("IMG_0001.jpg"), Some("0001".to_string()));
        assert_eq!(pattern.extract("DSC9999.JPG"), Some("9999".to_string()));
    }

    #[test]
    fn prefix_must_be_at_start() {
        let pattern = IdentityPattern::default();
        assert_eq!(pattern.extract("copy_DSC0001.ARW"), None);
    }

    #[test]
    fn fewer_than_four_digits_is_no_key() {
        let pattern = IdentityPattern::default();
        assert_eq!(pattern.extract("_DSC001.ARW"), None);
        assert_eq!(pattern.extract("_DSC.ARW"), None);
    }

    #[test]
    fn only_first_four_digits_form_the_key() {
        let pattern = IdentityPattern::default();
        assert_eq!(pattern.extract("_DSC123456.ARW"), Some("1234".to_string()));
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        let pattern = IdentityPattern::default();
        assert_eq!(pattern.extract("_dsc0001.arw"), None);
    }

    #[test]
    fn custom_prefixes_replace_defaults() {
        let pattern = IdentityPattern::new(&["P"]);
        assert_eq!(pattern.extract("P1000123.RW2"), Some("1000".to_string()));
        assert_eq!(pattern.extract("_DSC0001.ARW"), None);
    }

    #[test]
    fn longest_prefix_is_preferred() {
        let pattern = IdentityPattern::new(&["DSC", "_DSC"]);
        assert_eq!(pattern.extract("_DSC0420.ARW"), Some("0420".to_string()));
        assert_eq!(pattern.extract("DSC0421.JPG"), Some("0421".to_string()));
    }

    #[test]
    fn empty_prefix_list_never_matches() {
        let pattern = IdentityPattern::new::<&str>(&[]);
        assert_eq!(pattern.extract("_DSC0001.ARW"), None);
    }
}
