use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use std::fmt::Display;

/// Maximum number of characters handed to the classifier.
pub const MAX_INPUT_CHARS: usize = 50;

/// Informal and unaccented tokens with their canonical spelling.
///
/// Applied in this order, one whole-word pass per entry. `vui` maps to itself.
const REPLACEMENTS: &[(&str, &str)] = &[
    ("rat", "rất"),
    ("tot", "tốt"),
    ("xau", "xấu"),
    ("kho", "khó"),
    ("de", "dễ"),
    ("vui", "vui"),
    ("buon", "buồn"),
    ("ghet", "ghét"),
    ("bth", "bình thường"),
    ("chan", "chán"),
    ("thich", "thích"),
    ("do", "đó"),
    ("toi", "tôi"),
    ("ban", "bạn"),
    ("a", "anh"),
    ("e", "em"),
    ("t", "tao"),
    ("m", "mày"),
    ("yeu", "yêu"),
    ("iu", "yêu"),
    ("thuong", "thương"),
    ("lam", "lắm"),
    ("dang", "đang"),
];

// `\b` is Unicode-aware, so accented letters count as word characters.
static WORD_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    REPLACEMENTS
        .iter()
        .map(|&(from, to)| {
            let pattern = format!(r"\b{}\b", regex::escape(from));
            let re = Regex::new(&pattern).expect("hardcoded replacement pattern is valid");
            (re, to)
        })
        .collect()
});

/// Normalize a sentence before it is classified.
///
/// Lowercases (Unicode-aware), rewrites informal tokens to their accented form,
/// then keeps the first [`MAX_INPUT_CHARS`] characters. Anything [`Display`] is accepted.
///
/// The transform is not idempotent: truncation can cut a word down to a dictionary
/// key that a second pass would rewrite.
///
/// ```rust
/// use vi_sentiment::sentiment::normalize_text;
///
/// assert_eq!(normalize_text("Hôm nay tôi RAT vui"), "hôm nay tôi rất vui");
/// assert_eq!(normalize_text(&2024), "2024");
/// ```
pub fn normalize_text<T: Display + ?Sized>(raw: &T) -> String {
    let mut text = raw.to_string().to_lowercase();

    for (re, to) in WORD_RULES.iter() {
        text = re.replace_all(&text, NoExpand(to)).into_owned();
    }

    text.chars().take(MAX_INPUT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_informal_tokens() {
        assert_eq!(normalize_text("Hôm nay tôi rat vui"), "hôm nay tôi rất vui");
        assert_eq!(normalize_text("phim nay hay lam"), "phim nay hay lắm");
        assert_eq!(normalize_text("bth thoi"), "bình thường thoi");
    }

    #[test]
    fn accented_tokens_are_untouched() {
        assert_eq!(normalize_text("Hôm nay tôi rất vui"), "hôm nay tôi rất vui");
    }

    #[test]
    fn single_letters_only_match_whole_words() {
        assert_eq!(normalize_text("bart"), "bart");
        assert_eq!(normalize_text("team"), "team");
        assert_eq!(normalize_text("e yeu a"), "em yêu anh");
        assert_eq!(normalize_text("t ghet m"), "tao ghét mày");
    }

    #[test]
    fn lowercases_unicode() {
        assert_eq!(normalize_text("RẤT TỐT"), "rất tốt");
        assert_eq!(normalize_text("ĐANG Buồn"), "đang buồn");
    }

    #[test]
    fn truncates_by_characters() {
        let long = "ư".repeat(80);
        let out = normalize_text(&long);
        assert_eq!(out.chars().count(), MAX_INPUT_CHARS);
        assert!(out.len() > MAX_INPUT_CHARS);
    }

    #[test]
    fn expansion_is_truncated_too() {
        let out = normalize_text(&"t ".repeat(40));
        assert_eq!(out.chars().count(), MAX_INPUT_CHARS);
        assert!(out.starts_with("tao tao"));
    }

    #[test]
    fn output_never_exceeds_limit() {
        for input in [
            "",
            "a",
            "bth bth bth bth bth bth bth bth bth bth",
            "xin chào",
        ] {
            assert!(normalize_text(input).chars().count() <= MAX_INPUT_CHARS);
        }
    }

    #[test]
    fn coerces_non_string_input() {
        assert_eq!(normalize_text(&3.5), "3.5");
        assert_eq!(normalize_text(&'A'), "anh");
    }

    #[test]
    fn second_pass_can_differ() {
        // Truncation leaves a bare "rat" at the end, which a second pass rewrites.
        let input = format!("{} ratxyz", "x".repeat(46));
        let once = normalize_text(&input);
        assert!(once.ends_with(" rat"));
        let twice = normalize_text(&once);
        assert!(twice.ends_with(" rất"));
        assert_ne!(once, twice);
    }
}
