use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// base letters, then accents, then case (lower first)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    primary: String,
    secondary: String,
    tertiary: Vec<bool>,
}

impl CollationKey {
    pub fn new(value: &str) -> Self {
        let secondary: String = value.nfd().flat_map(char::to_lowercase).collect();
        let primary = secondary
            .chars()
            .filter(|c| !is_combining_mark(*c))
            .collect();
        let tertiary = value.chars().map(char::is_uppercase).collect();
        Self {
            primary,
            secondary,
            tertiary,
        }
    }
}

pub fn compare(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}
