//! Prompt assembly in the Llama-2 instruction format.

use tracing::warn;

use crate::document::ScoredChunk;

/// Separator between context chunks in the assembled prompt.
const CONTEXT_DELIMITER: &str = "\n\n";

/// A rendered prompt ready to hand to a generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// The full rendered prompt text.
    pub text: String,
    /// Whether context chunks were dropped to fit the character budget.
    pub truncated: bool,
}

/// Combines a system instruction, retrieved context, and the user question
/// into a single bounded prompt string.
///
/// The rendered template is the `[INST]` instruction format:
///
/// ```text
/// [INST] <<SYS>>
/// {system_prompt}
/// <</SYS>>
///
/// {context}
///
/// Question: {question} [/INST]
/// ```
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system_prompt: String,
    max_chars: usize,
}

impl PromptAssembler {
    /// Create an assembler with the given system instruction and character
    /// budget for the rendered prompt.
    pub fn new(system_prompt: impl Into<String>, max_chars: usize) -> Self {
        Self { system_prompt: system_prompt.into(), max_chars }
    }

    /// Render a prompt from ranked context chunks and the question.
    ///
    /// Chunk texts are joined in ranked order with a blank line. If the
    /// rendered prompt would exceed the budget, whole chunks are dropped
    /// from the lowest-ranked end first until it fits; the returned
    /// [`Prompt`] signals this via `truncated` and a warning is logged.
    /// The question is always present verbatim.
    pub fn assemble(&self, chunks: &[ScoredChunk], question: &str) -> Prompt {
        let mut kept = chunks.len();
        loop {
            let context: Vec<&str> = chunks[..kept].iter().map(|c| c.chunk.text.as_str()).collect();
            let text = self.render(&context.join(CONTEXT_DELIMITER), question);
            if text.chars().count() <= self.max_chars || kept == 0 {
                let truncated = kept < chunks.len();
                if truncated {
                    warn!(
                        dropped = chunks.len() - kept,
                        kept, "prompt over budget, dropped lowest-ranked context chunks"
                    );
                }
                return Prompt { text, truncated };
            }
            kept -= 1;
        }
    }

    fn render(&self, context: &str, question: &str) -> String {
        format!(
            "[INST] <<SYS>>\n{}\n<</SYS>>\n\n{context}\n\nQuestion: {question} [/INST]",
            self.system_prompt
        )
    }
}
