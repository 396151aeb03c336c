//! LLM prompts for TOC expansion.

/// Collection of prompts used for material generation.
pub struct Prompts;

impl Prompts {
    /// Prompt to expand an ordered list of chapter titles into per-section
    /// descriptions, emitted directly in the persisted output shape.
    pub fn expand_sections() -> &'static str {
        r#"I have the following table of contents for a book:
{toc}

For each chapter title, generate a chapter description consisting of exactly two sentences. The first sentence should provide a supplementary explanation of the chapter title, and the second sentence should state the learning objectives for the chapter. Do not include any additional information.

Format the output as a single JSON object. Each key is a string "chapter1", "chapter2", etc., following the order of the titles above. Each value is an object with the following keys:
- "title": the chapter title, unchanged.
- "description": the two-sentence chapter description.

Make sure the output is valid JSON and does not include any extra text."#
    }

    /// System prompt for the expansion call.
    pub fn system_academic_writer() -> &'static str {
        "You are a professional academic writing assistant. Always respond with valid JSON when requested."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_are_not_empty() {
        assert!(!Prompts::expand_sections().is_empty());
        assert!(!Prompts::system_academic_writer().is_empty());
    }

    #[test]
    fn test_expand_prompt_has_toc_placeholder() {
        assert!(Prompts::expand_sections().contains("{toc}"));
    }
}
