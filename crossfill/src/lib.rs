//! This crate is meant to be used as the foundation for a crossword puzzle app.
//! It tracks the grid the user is filling in, the selected square and typing
//! direction, and checks a completed grid against an answer key. It provides
//! no UI itself, but see `crossfill-tui` for an example of how you can use it
//! to produce a crossword app.
//!
//! Puzzles are described by a JSON document listing the grid size and the
//! across and down clues; see [Puzzle]. The matching correct answers come from
//! an [AnswerSource], typically an [AnswerKey] loaded from a second document.

use Direction::{Across, Down};
use std::collections::{BTreeSet, HashSet};
use std::fmt::Debug;
use std::fmt::Display;
use std::ops::Not;

use log::info;

mod answers;
mod puzzle;

pub use answers::{AnswerKey, AnswerSource};
pub use puzzle::{Clue, Positions, Puzzle};

/// The two crossword directions: `Across` and `Down`
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone)]
pub enum Direction {
  Across,
  Down,
}

impl Not for Direction {
  type Output = Self;
  fn not(self) -> Self {
    match self {
      Across => Down,
      Down => Across,
    }
  }
}

impl Display for Direction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Across => write!(f, "Across"),
      Down => write!(f, "Down"),
    }
  }
}

/// A position in a grid: (row, column)
pub type Pos = (usize, usize);

/// Identifies a clue by its number and direction. Across and down clues are
/// numbered independently, so the clue for 12 Down is `(12, Down)`.
pub type ClueId = (u32, Direction);

/// A square in a crossword grid.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Square {
  /// A black square where nothing can be entered.
  Black,
  /// A square where a letter could be entered, but that is currently empty.
  Empty,
  /// A square with a letter written in it.
  Letter(char),
}

impl Square {
  fn is_empty(&self) -> bool {
    *self == Self::Empty
  }
}

impl Debug for Square {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Black => write!(f, "■"),
      Self::Empty => write!(f, " "),
      Self::Letter(c) => write!(f, "{}", c),
    }?;
    Ok(())
  }
}

impl Display for Square {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self)
  }
}

/// A grid of squares holding the user's entries. Squares covered by no clue
/// are black and stay that way; every other square starts out empty.
#[derive(Eq, PartialEq)]
pub struct Grid(Vec<Vec<Square>>);

impl Grid {
  /// Builds the initial grid for a puzzle: black wherever no clue reaches.
  fn from_puzzle(puzzle: &Puzzle) -> Self {
    let rows = (0..puzzle.rows())
      .map(|row| {
        (0..puzzle.columns())
          .map(|col| {
            if puzzle.is_open((row, col)) {
              Square::Empty
            } else {
              Square::Black
            }
          })
          .collect()
      })
      .collect();
    Self(rows)
  }

  /// The width of this grid.
  pub fn width(&self) -> usize {
    self.0[0].len()
  }

  /// The height of this grid.
  pub fn height(&self) -> usize {
    self.0.len()
  }

  /// Returns the [Square] at the given [Pos].
  pub fn get(&self, (r, c): Pos) -> Square {
    self.0[r][c]
  }

  fn set(&mut self, (r, c): Pos, square: Square) {
    self.0[r][c] = square;
  }
}

impl Debug for Grid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for row in &self.0 {
      for sq in row {
        write!(f, "{}", sq)?;
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

impl Display for Grid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "\n{:?}", self)
  }
}

/// The four arrow keys.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Arrow {
  Up,
  Down,
  Left,
  Right,
}

/// The aggregate outcome of checking a filled grid.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum Status {
  /// Every clue matched the answer key.
  Pass,
  /// At least one clue did not.
  Fail,
}

/// The result of the most recent successful submit: the overall [Status] and
/// the clues whose answers were wrong. Replaced wholesale on the next submit.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Verdict {
  pub status: Status,
  pub failed: BTreeSet<ClueId>,
}

/// What a clue's entry in the clue list should show next to it.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum ClueStatus {
  /// Nothing. Either the puzzle has never been submitted, or the clue was
  /// edited since the last submit.
  None,
  /// The clue had at least one empty square at the last submit.
  Incomplete,
  Correct,
  Incorrect,
}

/// Why a submit did not produce a [Verdict]. Both cases are recoverable and
/// leave the grid and selection untouched.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SubmitError {
  /// At least one square of some clue is still empty.
  Incomplete,
  /// The answer key has no entry for this clue, so nothing was checked.
  MissingAnswer(ClueId),
}

impl Display for SubmitError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Incomplete => write!(f, "Please complete all the clues before submitting."),
      Self::MissingAnswer((number, direction)) => {
        write!(f, "No answer is available for {} {}.", number, direction)
      }
    }
  }
}

impl std::error::Error for SubmitError {}

/// An in-progress solve of a crossword [Puzzle]. When implementing a crossword
/// app, this will be the main structure you will use: it owns the grid and
/// selection, and exposes a handler for each user event.
#[derive(Debug)]
pub struct Session {
  puzzle: Puzzle,
  grid: Grid,
  selected: Option<Pos>,
  direction: Direction,
  /// Clues edited since the last submit. Their status icons are suppressed
  /// until the next submit.
  modified: HashSet<ClueId>,
  /// Clues that had an empty square at the last submit.
  incomplete: BTreeSet<ClueId>,
  verdict: Option<Verdict>,
}

impl Session {
  pub fn new(puzzle: Puzzle) -> Self {
    let grid = Grid::from_puzzle(&puzzle);
    Self {
      puzzle,
      grid,
      selected: None,
      direction: Across,
      modified: HashSet::new(),
      incomplete: BTreeSet::new(),
      verdict: None,
    }
  }

  pub fn puzzle(&self) -> &Puzzle {
    &self.puzzle
  }

  /// Returns a reference to the current puzzle grid.
  pub fn grid(&self) -> &Grid {
    &self.grid
  }

  /// The currently-selected square, if any. Always an open square.
  pub fn selected_cell(&self) -> Option<Pos> {
    self.selected
  }

  /// The current typing direction.
  pub fn direction(&self) -> Direction {
    self.direction
  }

  /// The clue the selection currently sits in, in the typing direction.
  pub fn current_clue(&self) -> Option<ClueId> {
    let pos = self.selected?;
    self.puzzle.clue_at(pos, self.direction)
  }

  /// The [Verdict] from the most recent completed submit, if there is one.
  pub fn verdict(&self) -> Option<&Verdict> {
    self.verdict.as_ref()
  }

  /// Whether this clue had an empty square at the last submit.
  pub fn is_incomplete(&self, id: ClueId) -> bool {
    self.incomplete.contains(&id)
  }

  /// Handles a click on the square at `pos`. Clicks on black squares do
  /// nothing. Clicking the already-selected square swaps the typing direction,
  /// but only if the square is part of both an across and a down clue;
  /// otherwise the direction is forced to the one clue the square belongs to.
  pub fn click_cell(&mut self, pos: Pos) {
    if !self.puzzle.is_open(pos) {
      return;
    }

    let across = self.puzzle.clue_at(pos, Across);
    let down = self.puzzle.clue_at(pos, Down);
    let repeat = self.selected == Some(pos);
    self.selected = Some(pos);

    self.direction = match (across, down) {
      (Some(_), Some(_)) if repeat => !self.direction,
      (Some(_), Some(_)) => Across,
      (Some(_), None) => Across,
      (None, Some(_)) => Down,
      (None, None) => self.direction,
    };
  }

  /// Handles text input on the square at `pos`. A single letter is stored
  /// uppercased and the selection advances along the typing direction. Empty
  /// input erases the square without moving. Anything else, like a
  /// multi-character paste, is dropped silently: a crossword square holds one
  /// letter, and that is not worth an error.
  pub fn input(&mut self, pos: Pos, text: &str) {
    if !self.puzzle.is_open(pos) {
      return;
    }

    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
      (None, _) => {
        self.grid.set(pos, Square::Empty);
        self.mark_modified(pos);
      }
      (Some(c), None) if c.is_ascii_alphabetic() => {
        self.grid.set(pos, Square::Letter(c.to_ascii_uppercase()));
        self.mark_modified(pos);
        self.advance_from(pos);
      }
      _ => {}
    }
  }

  /// Handles an arrow key pressed on the square at `pos`: the selection moves
  /// exactly one square, and only onto an open one. Unlike the advance after
  /// typing a letter, arrows stop at black squares rather than skipping them,
  /// and the typing direction is left alone.
  pub fn arrow(&mut self, arrow: Arrow, (row, col): Pos) {
    let next = match arrow {
      Arrow::Up if row > 0 => (row - 1, col),
      Arrow::Down => (row + 1, col),
      Arrow::Left if col > 0 => (row, col - 1),
      Arrow::Right => (row, col + 1),
      _ => return,
    };

    if next.0 < self.puzzle.rows() && next.1 < self.puzzle.columns() && self.puzzle.is_open(next) {
      self.selected = Some(next);
    }
  }

  /// Checks the filled grid against the answer key.
  ///
  /// If any clue still has an empty square, no checking happens: the
  /// incomplete clues are recorded and [SubmitError::Incomplete] is returned.
  /// Likewise, if the key is missing an answer the submit is abandoned with
  /// nothing changed. Otherwise each clue's letters are read back off the
  /// grid, compared case-insensitively against the key, and the resulting
  /// [Verdict] is stored; the set of modified clues starts over empty.
  pub fn submit(&mut self, key: &impl AnswerSource) -> Result<Status, SubmitError> {
    let incomplete = self.scan_incomplete();
    if !incomplete.is_empty() {
      self.incomplete = incomplete;
      return Err(SubmitError::Incomplete);
    }

    let mut failed = BTreeSet::new();
    for (id, clue) in self.puzzle.clues() {
      let expected = key.lookup(id).ok_or(SubmitError::MissingAnswer(id))?;
      let answer = self.read_answer(clue, id.1);
      if !answer.eq_ignore_ascii_case(expected) {
        failed.insert(id);
      }
    }

    let status = if failed.is_empty() {
      Status::Pass
    } else {
      Status::Fail
    };
    info!("validation result: {:?}, failed clues: {:?}", status, failed);

    self.incomplete.clear();
    self.modified.clear();
    self.verdict = Some(Verdict { status, failed });
    Ok(status)
  }

  /// Determines what to show next to a clue in the clue list.
  pub fn clue_status(&self, id: ClueId) -> ClueStatus {
    if self.modified.contains(&id) {
      return ClueStatus::None;
    }
    if self.incomplete.contains(&id) {
      return ClueStatus::Incomplete;
    }
    let Some(verdict) = &self.verdict else {
      return ClueStatus::None;
    };
    if verdict.status == Status::Pass {
      return ClueStatus::Correct;
    }
    if verdict.failed.contains(&id) {
      ClueStatus::Incorrect
    } else {
      ClueStatus::Correct
    }
  }

  /// Marks the clues covering `pos` as edited, in both directions.
  fn mark_modified(&mut self, pos: Pos) {
    for direction in [Across, Down] {
      if let Some(id) = self.puzzle.clue_at(pos, direction) {
        self.modified.insert(id);
      }
    }
  }

  /// Moves the selection to the next open square after `pos` along the typing
  /// direction, scanning over any run of black squares. If only black squares
  /// remain before the edge of the grid, the selection stays put.
  fn advance_from(&mut self, pos: Pos) {
    let (mut row, mut col) = pos;
    let (dr, dc) = match self.direction {
      Across => (0, 1),
      Down => (1, 0),
    };

    loop {
      row += dr;
      col += dc;
      if row >= self.puzzle.rows() || col >= self.puzzle.columns() {
        return;
      }
      if self.puzzle.is_open((row, col)) {
        self.selected = Some((row, col));
        return;
      }
    }
  }

  /// The clues that still have at least one empty square.
  fn scan_incomplete(&self) -> BTreeSet<ClueId> {
    self
      .puzzle
      .clues()
      .filter(|&(id, clue)| clue.cells(id.1).any(|pos| self.grid.get(pos).is_empty()))
      .map(|(id, _)| id)
      .collect()
  }

  /// Reads a clue's current answer off the grid.
  fn read_answer(&self, clue: &Clue, direction: Direction) -> String {
    clue
      .cells(direction)
      .filter_map(|pos| match self.grid.get(pos) {
        Square::Letter(c) => Some(c),
        Square::Black | Square::Empty => None,
      })
      .collect()
  }
}

/// The errors that may be produced when loading a puzzle or an answer key.
#[derive(Debug)]
pub enum Error {
  /// The document was not valid JSON of the expected shape.
  JsonError(serde_json::Error),
  /// A clue map key that could not be read as a clue number.
  InvalidClueNumber(String),
  /// The grid has zero rows or zero columns.
  EmptyGrid,
  /// A clue with a length of zero.
  EmptyClue(ClueId),
  /// A clue whose span extends past the edge of the grid.
  OutOfBounds(ClueId),
  /// Two clues running in the same direction cover the same square.
  Overlap(ClueId, ClueId),
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self {
    Self::JsonError(e)
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::JsonError(e) => write!(f, "invalid document: {}", e),
      Self::InvalidClueNumber(key) => write!(f, "'{}' is not a valid clue number", key),
      Self::EmptyGrid => write!(f, "the grid must have at least one row and one column"),
      Self::EmptyClue((n, d)) => write!(f, "clue {} {} has a length of zero", n, d),
      Self::OutOfBounds((n, d)) => {
        write!(f, "clue {} {} extends past the edge of the grid", n, d)
      }
      Self::Overlap((n1, d1), (n2, _)) => {
        write!(f, "clues {} and {} {} cover the same square", n1, n2, d1)
      }
    }
  }
}

impl std::error::Error for Error {}
