use crate::Direction::{Across, Down};
use crate::{ClueId, Error};
use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

/// Where correct answers come from. The built-in implementation is a static
/// [AnswerKey] loaded from a JSON document; an app that keeps its answers on a
/// backend can implement this on top of whatever lookup it performs, as long
/// as the result is in hand before submitting.
pub trait AnswerSource {
  /// The correct answer for the given clue, if known.
  fn lookup(&self, id: ClueId) -> Option<&str>;
}

/// The answer key document: answers listed per direction, keyed by clue
/// number, mirroring the clue section of a puzzle document.
#[derive(Debug, Deserialize)]
struct AnswerDoc {
  across: BTreeMap<String, String>,
  down: BTreeMap<String, String>,
}

/// A static answer key.
#[derive(Debug, Default)]
pub struct AnswerKey {
  answers: HashMap<ClueId, String>,
}

impl AnswerKey {
  /// Creates an AnswerKey from the text of an answer key JSON document.
  pub fn parse(json: &str) -> Result<Self, Error> {
    let doc: AnswerDoc = serde_json::from_str(json)?;
    let mut key = Self::default();
    for (direction, listed) in [(Across, doc.across), (Down, doc.down)] {
      for (name, answer) in listed {
        let number = name.parse().map_err(|_| Error::InvalidClueNumber(name))?;
        key.insert((number, direction), answer);
      }
    }
    Ok(key)
  }

  /// Records the correct answer for a clue.
  pub fn insert(&mut self, id: ClueId, answer: impl Into<String>) {
    self.answers.insert(id, answer.into());
  }
}

impl AnswerSource for AnswerKey {
  fn lookup(&self, id: ClueId) -> Option<&str> {
    self.answers.get(&id).map(String::as_str)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_answers_per_direction() {
    let key = AnswerKey::parse(
      r#"{
        "across": { "1": "CAT", "4": "WET" },
        "down": { "1": "COW", "2": "AXE", "3": "TOT" }
      }"#,
    )
    .unwrap();

    assert_eq!(key.lookup((1, Across)), Some("CAT"));
    assert_eq!(key.lookup((1, Down)), Some("COW"));
    assert_eq!(key.lookup((4, Down)), None);
    assert_eq!(key.lookup((9, Across)), None);
  }

  #[test]
  fn bad_clue_number_is_rejected() {
    let err = AnswerKey::parse(r#"{ "across": { "first": "CAT" }, "down": {} }"#).unwrap_err();
    assert!(matches!(err, Error::InvalidClueNumber(_)));
  }

  #[test]
  fn inserting_overwrites() {
    let mut key = AnswerKey::default();
    key.insert((1, Across), "CAT");
    key.insert((1, Across), "CAR");
    assert_eq!(key.lookup((1, Across)), Some("CAR"));
  }
}
