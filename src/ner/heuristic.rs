//! Built-in person-name recognizer for identity documents.
//!
//! A run of capitalized words is a person candidate unless its words are
//! printed field labels ("Date Of Birth", "Nationality", ...). Labels break
//! runs, so "Name John Smith" still yields "John Smith".

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::{NerBackend, NerError, RecognizedEntity};
use crate::models::EntityLabel;

static CAPITALIZED_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Lu}[\p{Ll}\p{Lu}]*(?:['-]\p{L}+)*$").expect("valid regex"));

/// Words printed on passports, ID cards and driver licenses that are never names
static DOCUMENT_LABELS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "passport", "passeport", "pasaporte", "identity", "identification", "card", "id", "national",
        "nationality", "citizen", "citizenship", "republic", "kingdom", "united", "states", "america",
        "federal", "government", "department", "ministry", "state", "country", "code", "type",
        "document", "number", "no", "name", "names", "surname", "surnames", "given", "first", "last",
        "middle", "date", "of", "birth", "dob", "place", "sex", "gender", "male", "female", "issue",
        "issued", "issuing", "expiry", "expiration", "expires", "exp", "valid", "until", "authority",
        "signature", "holder", "address", "height", "weight", "eyes", "hair", "class", "restrictions",
        "endorsements", "driver", "drivers", "driving", "license", "licence", "permit", "residence",
        "great", "britain", "northern", "ireland", "donor", "organ", "veteran", "personal", "the",
        "and", "mrz", "p", "dl", "usa", "uk",
    ]
    .into_iter()
    .collect()
});

pub struct HeuristicNerBackend;

impl HeuristicNerBackend {
    pub fn new() -> Self {
        Self
    }

    /// Person-name candidates in `text`, left to right
    pub fn find_person_names(text: &str) -> Vec<String> {
        let mut names = Vec::new();
        let mut run: Vec<&str> = Vec::new();

        for word in text.split_whitespace() {
            let is_label = DOCUMENT_LABELS.contains(word.to_lowercase().as_str());
            if CAPITALIZED_WORD.is_match(word) && !is_label && word.chars().count() > 1 {
                run.push(word);
            } else {
                flush_run(&mut run, &mut names);
            }
        }
        flush_run(&mut run, &mut names);

        names
    }
}

fn flush_run(run: &mut Vec<&str>, names: &mut Vec<String>) {
    if run.len() >= 2 {
        names.push(run.join(" "));
    }
    run.clear();
}

impl Default for HeuristicNerBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NerBackend for HeuristicNerBackend {
    fn backend_id(&self) -> &str {
        "heuristic"
    }

    async fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>, NerError> {
        Ok(Self::find_person_names(text)
            .into_iter()
            .map(|text| RecognizedEntity {
                text,
                label: EntityLabel::Person,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        assert_eq!(HeuristicNerBackend::find_person_names("John Smith"), vec!["John Smith"]);
    }

    #[test]
    fn test_labels_break_runs() {
        assert_eq!(HeuristicNerBackend::find_person_names("Name John Smith"), vec!["John Smith"]);
        assert_eq!(
            HeuristicNerBackend::find_person_names("Surname Smith Given Names John"),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_field_labels_are_not_names() {
        assert!(HeuristicNerBackend::find_person_names("Date Of Birth").is_empty());
        assert!(HeuristicNerBackend::find_person_names("United Kingdom Of Great Britain").is_empty());
        assert!(HeuristicNerBackend::find_person_names("Driver License").is_empty());
    }

    #[test]
    fn test_lowercase_and_single_words_ignored() {
        assert!(HeuristicNerBackend::find_person_names("john smith").is_empty());
        assert!(HeuristicNerBackend::find_person_names("Smith").is_empty());
    }

    #[test]
    fn test_hyphenated_and_accented_names() {
        assert_eq!(
            HeuristicNerBackend::find_person_names("Anne-Marie O'Neil"),
            vec!["Anne-Marie O'Neil"]
        );
        assert_eq!(HeuristicNerBackend::find_person_names("José Núñez"), vec!["José Núñez"]);
    }

    #[tokio::test]
    async fn test_recognize_labels_person() {
        let entities = HeuristicNerBackend::new().recognize("Holder Jane Doe").await.unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "Jane Doe");
        assert_eq!(entities[0].label, EntityLabel::Person);
    }
}
