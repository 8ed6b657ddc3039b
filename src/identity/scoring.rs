//! Fuzzy comparison of extracted names against a claimed name.

use strsim::normalized_levenshtein;

use crate::models::NamedEntity;
use crate::utils::text::title_case;

/// Similarity of two names on a 0-100 scale.
///
/// Both sides are title-cased with whitespace collapsed before comparing, so
/// case and spacing differences never cost points.
pub fn score_match(candidate: &str, claimed: &str) -> u8 {
    let candidate = title_case(candidate);
    let claimed = title_case(claimed);
    if candidate.is_empty() || claimed.is_empty() {
        return 0;
    }

    let ratio = normalized_levenshtein(&candidate, &claimed);
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Index and score of the best-scoring candidate.
///
/// Ties go to the earliest candidate, i.e. the one read first on the page.
pub fn select_best_candidate(candidates: &[NamedEntity], claimed: &str) -> Option<(usize, u8)> {
    let mut best: Option<(usize, u8)> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let score = score_match(&candidate.text, claimed);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }

    best
}

/// Split a full name into (first, last).
///
/// The first token is the first name; every remaining token, joined by single
/// spaces, is the last name. A single token yields an empty last name.
pub fn split_name(full_name: &str) -> (String, String) {
    let mut tokens = full_name.split_whitespace();
    let first = tokens.next().unwrap_or_default().to_string();
    let last = tokens.collect::<Vec<_>>().join(" ");
    (first, last)
}
