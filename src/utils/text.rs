//! Text normalization shared by the OCR and matching stages

/// Capitalize the first letter of every word, and of every part after an
/// apostrophe or hyphen ("O'Neil", "Anne-Marie"), lowercasing the rest;
/// runs of whitespace collapse to one space.
pub fn title_case(input: &str) -> String {
    input.split_whitespace().map(capitalize_word).collect::<Vec<String>>().join(" ")
}

fn capitalize_word(word: &str) -> String {
    let mut capitalized = String::with_capacity(word.len());
    let mut at_start = true;
    for c in word.chars() {
        if at_start {
            capitalized.extend(c.to_uppercase());
        } else {
            capitalized.extend(c.to_lowercase());
        }
        at_start = is_name_joiner(c);
    }
    capitalized
}

fn is_name_joiner(c: char) -> bool {
    matches!(c, '\'' | '-')
}

/// Normalize raw OCR output: keep letters, spaces and the apostrophes or
/// hyphens that join letters inside a name, then title-case.
///
/// Digits and other punctuation on ID cards (dates, document numbers, "<<"
/// MRZ filler) become spaces, so "SMITH, JOHN" becomes "Smith John" while
/// "O'NEIL" stays one word.
pub fn normalize_region_text(raw: &str) -> String {
    let chars: Vec<char> = raw
        .chars()
        .map(|c| if matches!(c, '\u{2019}' | '`') { '\'' } else { c })
        .collect();

    let letters: String = chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if c.is_alphabetic() {
                return c;
            }
            let between_letters = i > 0
                && chars[i - 1].is_alphabetic()
                && chars.get(i + 1).is_some_and(|next| next.is_alphabetic());
            if is_name_joiner(c) && between_letters {
                c
            } else {
                ' '
            }
        })
        .collect();
    title_case(&letters)
}
