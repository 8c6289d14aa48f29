//! Prompt construction for the logic evaluator

use crate::matcher::MatchedChunk;

/// A prompt plus how much context made it in
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltPrompt {
    /// Full prompt text
    pub text: String,
    /// Number of matched chunks included, best first
    pub included: usize,
    /// Some context was dropped or cut to fit the budget
    pub truncated: bool,
}

/// Builds bounded-size reasoning prompts
///
/// Context entries are added best first. When the budget runs out the
/// remaining, lower-ranked entries are dropped; if even the best entry is
/// too large on its own, its text is cut to fit.
pub struct PromptBuilder<'a> {
    question: &'a str,
    key_terms: &'a [String],
    matches: &'a [MatchedChunk],
    char_budget: usize,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(question: &'a str, char_budget: usize) -> Self {
        Self {
            question,
            key_terms: &[],
            matches: &[],
            char_budget,
        }
    }

    /// Key terms to highlight
    pub fn with_key_terms(mut self, key_terms: &'a [String]) -> Self {
        self.key_terms = key_terms;
        self
    }

    /// Matched chunks, best first
    pub fn with_matches(mut self, matches: &'a [MatchedChunk]) -> Self {
        self.matches = matches;
        self
    }

    /// Build the complete reasoning prompt
    pub fn build(&self) -> BuiltPrompt {
        let (context, included, truncated) = self.context();

        let mut prompt = String::new();
        prompt.push_str(REASONING_INSTRUCTIONS);
        prompt.push_str("\n\n");

        prompt.push_str(&format!("Question: {}\n", self.question));
        if !self.key_terms.is_empty() {
            prompt.push_str(&format!("Key terms: {}\n", self.key_terms.join(", ")));
        }
        prompt.push('\n');

        prompt.push_str("Relevant clauses:\n");
        prompt.push_str("---\n");
        if included == 0 {
            prompt.push_str(NO_CONTEXT);
            prompt.push('\n');
        } else {
            prompt.push_str(&context);
        }
        prompt.push_str("---\n\n");

        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        BuiltPrompt {
            text: prompt,
            included,
            truncated,
        }
    }

    fn context(&self) -> (String, usize, bool) {
        let mut context = String::new();
        let mut included = 0;

        for (i, m) in self.matches.iter().enumerate() {
            let header = format!("[Clause {}] (relevance: {:.2})\n", i + 1, m.score);
            let entry_len = header.len() + m.chunk.text.len() + 2;

            if context.len() + entry_len <= self.char_budget {
                context.push_str(&header);
                context.push_str(&m.chunk.text);
                context.push_str("\n\n");
                included += 1;
                continue;
            }

            if included == 0 {
                let room = self.char_budget.saturating_sub(header.len() + 2);
                let cut = floor_char_boundary(&m.chunk.text, room);
                if cut > 0 {
                    context.push_str(&header);
                    context.push_str(&m.chunk.text[..cut]);
                    context.push_str("\n\n");
                    included = 1;
                }
            }
            return (context, included, true);
        }

        (context, included, false)
    }
}

/// Largest char boundary of `text` not after `max`
fn floor_char_boundary(text: &str, max: usize) -> usize {
    if max >= text.len() {
        return text.len();
    }
    (0..=max).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0)
}

const REASONING_INSTRUCTIONS: &str = r#"You answer questions about insurance, legal, HR and compliance documents.
Use only the clauses provided below. Quote specific conditions, limits and
time periods where they apply. If the clauses do not contain the answer, say
that the information is not available in the document."#;

const NO_CONTEXT: &str = "No relevant clauses were found in the document.";

const OUTPUT_FORMAT_REMINDER: &str = r#"Respond with a single JSON object and nothing else:
{"answer": "<concise answer>", "confidence": <0.0-1.0>, "reasoning": "<which clauses support the answer>"}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use clausal_domain::{Chunk, ChunkId, DocumentId};

    fn matched(seq: usize, text: &str, score: f64) -> MatchedChunk {
        let doc = DocumentId::from_raw("doc");
        MatchedChunk {
            chunk: Chunk {
                id: ChunkId::new(&doc, seq),
                document_id: doc,
                sequence: seq,
                text: text.to_string(),
                start: 0,
                end: text.len(),
                word_count: text.split_whitespace().count(),
                overlap_words: 0,
            },
            similarity: score as f32,
            keyword_score: 0.0,
            has_clause: false,
            score,
            original_rank: seq,
        }
    }

    #[test]
    fn test_prompt_contains_question_and_context() {
        let matches = vec![matched(0, "A grace period of thirty days.", 0.9)];
        let terms = vec!["grace".to_string(), "period".to_string()];
        let prompt = PromptBuilder::new("What is the grace period?", 10_000)
            .with_key_terms(&terms)
            .with_matches(&matches)
            .build();

        assert!(prompt.text.contains("Question: What is the grace period?"));
        assert!(prompt.text.contains("Key terms: grace, period"));
        assert!(prompt.text.contains("[Clause 1] (relevance: 0.90)"));
        assert!(prompt.text.contains("A grace period of thirty days."));
        assert!(prompt.text.contains("\"answer\""));
        assert_eq!(prompt.included, 1);
        assert!(!prompt.truncated);
    }

    #[test]
    fn test_lowest_ranked_dropped_first() {
        let long = "word ".repeat(40);
        let matches = vec![
            matched(0, &long, 0.9),
            matched(1, &long, 0.8),
            matched(2, "LOWEST RANKED", 0.1),
        ];
        let budget = 2 * (long.len() + 40);
        let prompt = PromptBuilder::new("q", budget).with_matches(&matches).build();

        assert_eq!(prompt.included, 2);
        assert!(prompt.truncated);
        assert!(!prompt.text.contains("LOWEST RANKED"));
    }

    #[test]
    fn test_oversized_top_chunk_is_cut() {
        let long = "é".repeat(500);
        let matches = vec![matched(0, &long, 0.9)];
        let prompt = PromptBuilder::new("q", 120).with_matches(&matches).build();

        assert_eq!(prompt.included, 1);
        assert!(prompt.truncated);
        assert!(!prompt.text.contains(&long));
    }

    #[test]
    fn test_no_matches() {
        let prompt = PromptBuilder::new("q", 100).build();
        assert_eq!(prompt.included, 0);
        assert!(prompt.text.contains(NO_CONTEXT));
    }

    #[test]
    fn test_floor_char_boundary() {
        assert_eq!(floor_char_boundary("héllo", 2), 1);
        assert_eq!(floor_char_boundary("abc", 10), 3);
    }
}
