use crate::graph::ElementKind;

/// Strategy for deciding how a process renders in markup.
///
/// Classification is a heuristic over free-text descriptions, not a reliable
/// signal, so it lives behind a trait: callers with better knowledge of
/// their data can swap in their own predicate, and the ambiguity stays
/// testable in one place.
pub trait ProcessClassifier: Send + Sync {
    /// Returns [`ElementKind::If`] for processes that should render as a
    /// condition branch and [`ElementKind::Invoke`] for ordinary steps.
    fn classify(&self, description: &str) -> ElementKind;
}

/// Default classifier: a process whose description contains any keyword
/// associated with approval or validation semantics renders as a condition.
/// Matching is case-insensitive substring search.
pub struct KeywordClassifier {
    keywords: Vec<String>,
}

impl KeywordClassifier {
    pub fn new(keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        // The approval/validation vocabulary of the upstream rule tables,
        // which mix English and Turkish descriptions.
        Self::new(["onay", "approval", "validation", "validasyon"])
    }
}

impl ProcessClassifier for KeywordClassifier {
    fn classify(&self, description: &str) -> ElementKind {
        let description = description.to_lowercase();
        if self.keywords.iter().any(|k| description.contains(k)) {
            ElementKind::If
        } else {
            ElementKind::Invoke
        }
    }
}
