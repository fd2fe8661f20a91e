//! End-to-end solve flows: a user clicking, typing and arrowing their way
//! through a small puzzle, then submitting.

use crossfill::Direction::{Across, Down};
use crossfill::{AnswerKey, Arrow, ClueStatus, Puzzle, Session, Square, Status, SubmitError};

/// A 5x5 grid with one across clue (CAT) and one down clue (COW) sharing
/// their first square.
fn puzzle() -> Puzzle {
  Puzzle::parse(
    r#"{
      "rows": 5,
      "columns": 5,
      "clues": {
        "across": { "1": { "clue": "Feline pet", "startPosition": [0, 0], "length": 3 } },
        "down": { "1": { "clue": "Dairy animal", "startPosition": [0, 0], "length": 3 } }
      }
    }"#,
  )
  .unwrap()
}

fn key() -> AnswerKey {
  AnswerKey::parse(r#"{ "across": { "1": "CAT" }, "down": { "1": "COW" } }"#).unwrap()
}

/// Types a letter into the currently selected square.
fn type_letter(session: &mut Session, letter: char) {
  let pos = session.selected_cell().expect("a square should be selected");
  let mut buf = [0; 4];
  session.input(pos, letter.encode_utf8(&mut buf));
}

#[test]
fn typing_both_words_and_submitting_passes() {
  let mut session = Session::new(puzzle());

  // Fill the across word. Typing advances the selection on its own, but an
  // arrow press in between should not upset anything.
  session.click_cell((0, 0));
  assert_eq!(session.direction(), Across);
  type_letter(&mut session, 'c');
  assert_eq!(session.selected_cell(), Some((0, 1)));
  type_letter(&mut session, 'a');
  session.arrow(Arrow::Left, (0, 2));
  session.arrow(Arrow::Right, (0, 1));
  type_letter(&mut session, 't');

  // Back to the shared square; a second click switches to down.
  session.click_cell((0, 0));
  session.click_cell((0, 0));
  assert_eq!(session.direction(), Down);
  type_letter(&mut session, 'c');
  assert_eq!(session.selected_cell(), Some((1, 0)));
  type_letter(&mut session, 'o');
  type_letter(&mut session, 'w');

  assert_eq!(session.submit(&key()), Ok(Status::Pass));
  assert_eq!(session.clue_status((1, Across)), ClueStatus::Correct);
  assert_eq!(session.clue_status((1, Down)), ClueStatus::Correct);
}

#[test]
fn one_wrong_word_fails_and_is_marked() {
  let mut session = Session::new(puzzle());

  session.click_cell((0, 0));
  for letter in ['c', 'a', 't'] {
    type_letter(&mut session, letter);
  }

  session.click_cell((0, 0));
  session.click_cell((0, 0));
  for letter in ['c', 'o', 'x'] {
    type_letter(&mut session, letter);
  }

  assert_eq!(session.submit(&key()), Ok(Status::Fail));
  let verdict = session.verdict().unwrap();
  assert_eq!(verdict.status, Status::Fail);
  assert!(verdict.failed.contains(&(1, Down)));
  assert!(!verdict.failed.contains(&(1, Across)));
}

#[test]
fn an_empty_square_blocks_validation_and_changes_nothing() {
  let mut session = Session::new(puzzle());

  session.click_cell((0, 0));
  for letter in ['c', 'a', 't'] {
    type_letter(&mut session, letter);
  }
  // 1 Down still has two empty squares.

  assert_eq!(session.submit(&key()), Err(SubmitError::Incomplete));
  assert!(session.verdict().is_none());
  assert!(session.is_incomplete((1, Down)));

  // The grid kept what was typed.
  assert_eq!(session.grid().get((0, 0)), Square::Letter('C'));
  assert_eq!(session.grid().get((0, 1)), Square::Letter('A'));
  assert_eq!(session.grid().get((0, 2)), Square::Letter('T'));
  assert_eq!(session.grid().get((1, 0)), Square::Empty);
}
