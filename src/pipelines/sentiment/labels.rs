use serde::{Serialize, Serializer};
use std::fmt;

/// Generic class names some checkpoints emit instead of human-readable labels.
const FALLBACK_LABELS: [(&str, &str); 3] = [
    ("LABEL_0", "NEGATIVE"),
    ("LABEL_1", "NEUTRAL"),
    ("LABEL_2", "POSITIVE"),
];

/// Map a raw model label onto the sentiment vocabulary.
///
/// The label is uppercased; `LABEL_0/1/2` become `NEGATIVE/NEUTRAL/POSITIVE`.
/// Labels outside the vocabulary are returned uppercased rather than rejected.
///
/// ```rust
/// use vi_sentiment::sentiment::normalize_label;
///
/// assert_eq!(normalize_label("LABEL_2"), "POSITIVE");
/// assert_eq!(normalize_label("positive"), "POSITIVE");
/// assert_eq!(normalize_label("WEIRD_TAG"), "WEIRD_TAG");
/// ```
pub fn normalize_label(raw_label: &str) -> String {
    let upper = raw_label.to_uppercase();

    FALLBACK_LABELS
        .iter()
        .find(|(from, _)| *from == upper)
        .map(|(_, mapped)| (*mapped).to_string())
        .unwrap_or(upper)
}

/// A sentiment as displayed and stored.
///
/// [`Sentiment::Other`] carries labels from unknown model schemes unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sentiment {
    /// `POSITIVE`
    Positive,
    /// `NEGATIVE`
    Negative,
    /// `NEUTRAL`
    Neutral,
    /// Any other label, kept verbatim.
    Other(String),
}

impl Sentiment {
    /// Stored and displayed form, e.g. `"POSITIVE"`.
    pub fn as_str(&self) -> &str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
            Sentiment::Other(label) => label,
        }
    }
}

impl From<&str> for Sentiment {
    /// Exact match against the vocabulary; anything else becomes [`Sentiment::Other`].
    fn from(label: &str) -> Self {
        match label {
            "POSITIVE" => Sentiment::Positive,
            "NEGATIVE" => Sentiment::Negative,
            "NEUTRAL" => Sentiment::Neutral,
            other => Sentiment::Other(other.to_string()),
        }
    }
}

impl From<String> for Sentiment {
    fn from(label: String) -> Self {
        match label.as_str() {
            "POSITIVE" | "NEGATIVE" | "NEUTRAL" => Sentiment::from(label.as_str()),
            _ => Sentiment::Other(label),
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Sentiment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
