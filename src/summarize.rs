// src/summarize.rs
//! Pluggable summarization seam. The orchestrator only knows this trait;
//! the default implementation is a deterministic truncation fallback that
//! a learned or remote summarizer can replace later.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub summary: String,
    pub bullets: Vec<String>,
}

pub trait Summarizer: Send + Sync {
    fn summarize(&self, title: &str, excerpt: &str, source_labels: &[String]) -> Summary;
}

/// Deterministic fallback: the excerpt (or the title when the excerpt is
/// empty) truncated at a character budget, with bullets derived from the
/// first sentence and the covering publishers.
#[derive(Debug, Clone)]
pub struct TruncationSummarizer {
    pub max_chars: usize,
}

impl Default for TruncationSummarizer {
    fn default() -> Self {
        Self { max_chars: 280 }
    }
}

impl TruncationSummarizer {
    fn truncate(&self, text: &str) -> String {
        if text.chars().count() <= self.max_chars {
            return text.trim().to_string();
        }
        let cut: String = text.chars().take(self.max_chars).collect();
        format!("{}…", cut.trim_end())
    }
}

impl Summarizer for TruncationSummarizer {
    fn summarize(&self, title: &str, excerpt: &str, source_labels: &[String]) -> Summary {
        let body = if excerpt.trim().is_empty() {
            title
        } else {
            excerpt
        };
        let summary = self.truncate(body);

        let first_sentence = body
            .split_terminator(['.', '!', '?'])
            .next()
            .unwrap_or(body)
            .trim();

        let mut bullets = Vec::new();
        if !first_sentence.is_empty() {
            bullets.push(self.truncate(first_sentence));
        }
        if !source_labels.is_empty() {
            bullets.push(format!("Coverage: {}", source_labels.join(", ")));
        }
        Summary { summary, bullets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_preferred_over_title() {
        let s = TruncationSummarizer::default();
        let out = s.summarize("Title", "A useful excerpt. More detail.", &[]);
        assert_eq!(out.summary, "A useful excerpt. More detail.");
        assert_eq!(out.bullets, vec!["A useful excerpt".to_string()]);
    }

    #[test]
    fn empty_excerpt_falls_back_to_title() {
        let s = TruncationSummarizer::default();
        let out = s.summarize("Just the title", "  ", &["Reuters".to_string()]);
        assert_eq!(out.summary, "Just the title");
        assert_eq!(
            out.bullets,
            vec!["Just the title".to_string(), "Coverage: Reuters".to_string()]
        );
    }

    #[test]
    fn long_text_is_truncated_with_ellipsis() {
        let s = TruncationSummarizer { max_chars: 10 };
        let out = s.summarize("t", "abcdefghijXYZ", &[]);
        assert_eq!(out.summary, "abcdefghij…");
    }

    #[test]
    fn deterministic() {
        let s = TruncationSummarizer::default();
        let a = s.summarize("T", "Body text here.", &["A".into(), "B".into()]);
        let b = s.summarize("T", "Body text here.", &["A".into(), "B".into()]);
        assert_eq!(a, b);
    }
}
