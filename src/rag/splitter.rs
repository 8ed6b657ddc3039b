//! Sentence-based passage splitting.

/// Split text into sentences.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace or the end of
/// the text. Whitespace inside a sentence (including PDF line breaks) is
/// collapsed to single spaces.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            push_sentence(&mut sentences, &current);
            current.clear();
        }
    }
    push_sentence(&mut sentences, &current);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !collapsed.is_empty() {
        sentences.push(collapsed);
    }
}

/// Group consecutive sentences into passages of `sentences_per_passage`
pub fn split_into_passages(text: &str, sentences_per_passage: usize) -> Vec<String> {
    let size = sentences_per_passage.max(1);
    split_sentences(text)
        .chunks(size)
        .map(|chunk| chunk.join(" "))
        .collect()
}
