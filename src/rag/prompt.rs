//! Prompt construction for grounded answering.

use super::index::ScoredPassage;

/// Answer strictly from the retrieved passages, or say so
pub const PROMPT_TEMPLATE: &str = "Answer the following query based on the provided context. If the context does
not include an answer, reply with 'I don't know'.

Query: {query}
Documents:
{documents}
Answer:
";

pub fn build_prompt(question: &str, passages: &[ScoredPassage<'_>]) -> String {
    let documents = passages
        .iter()
        .map(|p| p.passage.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    PROMPT_TEMPLATE
        .replace("{query}", question.trim())
        .replace("{documents}", &documents)
}
