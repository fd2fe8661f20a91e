use crate::Direction::{Across, Down};
use crate::{ClueId, Direction, Error, Pos};
use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use serde::Deserialize;

/// The puzzle document as it appears on disk.
#[derive(Debug, Deserialize)]
struct PuzzleDoc {
  rows: usize,
  columns: usize,
  clues: CluesDoc,
}

#[derive(Debug, Deserialize)]
struct CluesDoc {
  across: BTreeMap<String, ClueDoc>,
  down: BTreeMap<String, ClueDoc>,
}

#[derive(Debug, Deserialize)]
struct ClueDoc {
  clue: String,
  #[serde(rename = "startPosition")]
  start_position: (usize, usize),
  length: usize,
}

/// A single clue: its display text and the span its answer occupies.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Clue {
  pub text: String,
  /// The position of the first square, 0-indexed (row, column).
  pub start: Pos,
  /// How many squares the answer takes up.
  pub length: usize,
}

impl Clue {
  /// The positions this clue's answer occupies, in entry order.
  pub fn cells(&self, direction: Direction) -> impl Iterator<Item = Pos> {
    let (row, col) = self.start;
    (0..self.length).map(move |i| match direction {
      Across => (row, col + i),
      Down => (row + i, col),
    })
  }
}

/// A crossword puzzle: the grid extent plus the across and down clues, with a
/// square-to-clue index built once at load time. Loaded from a JSON document
/// and never mutated afterwards.
#[derive(Debug)]
pub struct Puzzle {
  rows: usize,
  columns: usize,
  clues: BTreeMap<ClueId, Clue>,
  /// Which clue number covers each square, per direction.
  owners: HashMap<(Pos, Direction), u32>,
  /// Mapping from grid positions to the numbers displayed on them.
  numbered_squares: HashMap<Pos, u32>,
  /// Squares that are the last square of at least one clue.
  word_ends: HashSet<Pos>,
}

impl Puzzle {
  /// Creates a Puzzle from the text of a puzzle JSON document. Fails fast on
  /// a malformed document: a clue running off the grid, two same-direction
  /// clues covering one square, an unparseable clue number, or a zero extent.
  pub fn parse(json: &str) -> Result<Self, Error> {
    let doc: PuzzleDoc = serde_json::from_str(json)?;
    Self::from_doc(doc)
  }

  fn from_doc(doc: PuzzleDoc) -> Result<Self, Error> {
    if doc.rows == 0 || doc.columns == 0 {
      return Err(Error::EmptyGrid);
    }

    let mut puzzle = Self {
      rows: doc.rows,
      columns: doc.columns,
      clues: BTreeMap::new(),
      owners: HashMap::new(),
      numbered_squares: HashMap::new(),
      word_ends: HashSet::new(),
    };

    // Across first, so that when an across and a down clue share a start
    // square, the across number is the one displayed there.
    for (direction, listed) in [(Across, doc.clues.across), (Down, doc.clues.down)] {
      for (key, clue) in listed {
        let number = key.parse().map_err(|_| Error::InvalidClueNumber(key))?;
        puzzle.add_clue((number, direction), clue)?;
      }
    }

    debug!(
      "loaded {}x{} puzzle with {} clues",
      puzzle.rows,
      puzzle.columns,
      puzzle.clues.len()
    );
    Ok(puzzle)
  }

  fn add_clue(&mut self, id: ClueId, doc: ClueDoc) -> Result<(), Error> {
    let clue = Clue {
      text: doc.clue,
      start: doc.start_position,
      length: doc.length,
    };
    let (number, direction) = id;

    if clue.length == 0 {
      return Err(Error::EmptyClue(id));
    }

    let end = match direction {
      Across => (clue.start.0, clue.start.1 + clue.length - 1),
      Down => (clue.start.0 + clue.length - 1, clue.start.1),
    };
    if end.0 >= self.rows || end.1 >= self.columns {
      return Err(Error::OutOfBounds(id));
    }

    for pos in clue.cells(direction) {
      if let Some(&other) = self.owners.get(&(pos, direction)) {
        return Err(Error::Overlap((other, direction), id));
      }
      self.owners.insert((pos, direction), number);
    }

    self.word_ends.insert(end);
    self.numbered_squares.entry(clue.start).or_insert(number);
    self.clues.insert(id, clue);
    Ok(())
  }

  /// The number of rows in the grid.
  pub fn rows(&self) -> usize {
    self.rows
  }

  /// The number of columns in the grid.
  pub fn columns(&self) -> usize {
    self.columns
  }

  /// Whether the square at `pos` is part of at least one clue. Squares
  /// covered by no clue are black: drawn solid, never selected or edited.
  pub fn is_open(&self, pos: Pos) -> bool {
    self.owners.contains_key(&(pos, Across)) || self.owners.contains_key(&(pos, Down))
  }

  /// The clue covering `pos` in the given direction, if any. A square may
  /// have an across clue, a down clue, both, or neither.
  pub fn clue_at(&self, pos: Pos, direction: Direction) -> Option<ClueId> {
    self
      .owners
      .get(&(pos, direction))
      .map(|&number| (number, direction))
  }

  /// The clue identified by `id`.
  pub fn clue(&self, id: ClueId) -> Option<&Clue> {
    self.clues.get(&id)
  }

  /// All clues, across and down, in number order.
  pub fn clues(&self) -> impl Iterator<Item = (ClueId, &Clue)> {
    self.clues.iter().map(|(&id, clue)| (id, clue))
  }

  /// The clues running in one direction, in number order.
  pub fn clues_in(&self, direction: Direction) -> impl Iterator<Item = (u32, &Clue)> {
    self
      .clues
      .iter()
      .filter(move |&(&(_, d), _)| d == direction)
      .map(|(&(number, _), clue)| (number, clue))
  }

  /// The positions a clue's answer occupies, in entry order.
  pub fn span(&self, id: ClueId) -> Option<impl Iterator<Item = Pos>> {
    self.clues.get(&id).map(|clue| clue.cells(id.1))
  }

  /// The number displayed on the square at `pos`: the number of a clue
  /// starting there, if any.
  pub fn start_number(&self, pos: Pos) -> Option<u32> {
    self.numbered_squares.get(&pos).copied()
  }

  /// Whether `pos` is the last square of at least one clue. Only used to
  /// draw an end-of-word marker; nothing else depends on it.
  pub fn is_word_end(&self, pos: Pos) -> bool {
    self.word_ends.contains(&pos)
  }

  /// An iterator over all the positions of the grid, from left to right and
  /// top to bottom.
  pub fn positions(&self) -> Positions {
    Positions::new((self.columns, self.rows))
  }
}

/// Iterator over all the positions in a grid.
pub struct Positions {
  pos: Pos,
  size: (usize, usize),
}

impl Positions {
  fn new(size: (usize, usize)) -> Self {
    Self { pos: (0, 0), size }
  }
}

impl Iterator for Positions {
  type Item = Pos;
  fn next(&mut self) -> Option<Self::Item> {
    let (width, height) = self.size;
    let (row, col) = self.pos;

    if row == height {
      return None;
    }

    if col == width - 1 {
      self.pos = (row + 1, 0);
    } else {
      self.pos = (row, col + 1);
    }

    Some((row, col))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  /// A fully-crossed 3x3 block: CAT and WET across, COW, AXE and TOT down.
  fn crossed() -> Puzzle {
    Puzzle::parse(
      r#"{
        "rows": 3,
        "columns": 3,
        "clues": {
          "across": {
            "1": { "clue": "Feline pet", "startPosition": [0, 0], "length": 3 },
            "4": { "clue": "Not dry", "startPosition": [2, 0], "length": 3 }
          },
          "down": {
            "1": { "clue": "Dairy animal", "startPosition": [0, 0], "length": 3 },
            "2": { "clue": "Wood chopper", "startPosition": [0, 1], "length": 3 },
            "3": { "clue": "Small child", "startPosition": [0, 2], "length": 3 }
          }
        }
      }"#,
    )
    .unwrap()
  }

  #[test]
  fn spans_are_contiguous_and_sized_by_length() {
    let puzzle = crossed();

    let across: Vec<Pos> = puzzle.span((1, Across)).unwrap().collect();
    assert_eq!(across, [(0, 0), (0, 1), (0, 2)]);

    let down: Vec<Pos> = puzzle.span((2, Down)).unwrap().collect();
    assert_eq!(down, [(0, 1), (1, 1), (2, 1)]);

    for (id, clue) in puzzle.clues() {
      assert_eq!(clue.cells(id.1).count(), clue.length);
    }

    assert!(puzzle.span((9, Across)).is_none());
  }

  #[test]
  fn squares_are_open_exactly_where_a_clue_covers_them() {
    let puzzle = Puzzle::parse(
      r#"{
        "rows": 5,
        "columns": 5,
        "clues": {
          "across": { "1": { "clue": "Feline pet", "startPosition": [0, 0], "length": 3 } },
          "down": { "1": { "clue": "Dairy animal", "startPosition": [0, 0], "length": 3 } }
        }
      }"#,
    )
    .unwrap();

    let open = [(0, 0), (0, 1), (0, 2), (1, 0), (2, 0)];
    for pos in puzzle.positions() {
      assert_eq!(puzzle.is_open(pos), open.contains(&pos), "at {:?}", pos);
    }
  }

  #[test]
  fn clue_ownership_per_direction() {
    let puzzle = crossed();

    assert_eq!(puzzle.clue_at((0, 0), Across), Some((1, Across)));
    assert_eq!(puzzle.clue_at((0, 0), Down), Some((1, Down)));
    assert_eq!(puzzle.clue_at((1, 1), Down), Some((2, Down)));
    assert_eq!(puzzle.clue_at((1, 1), Across), None);
  }

  #[test]
  fn start_numbers_label_clue_starts_only() {
    let puzzle = crossed();

    assert_eq!(puzzle.start_number((0, 0)), Some(1));
    assert_eq!(puzzle.start_number((0, 1)), Some(2));
    assert_eq!(puzzle.start_number((0, 2)), Some(3));
    assert_eq!(puzzle.start_number((2, 0)), Some(4));
    assert_eq!(puzzle.start_number((1, 1)), None);
  }

  #[test]
  fn across_number_wins_on_a_shared_start_square() {
    let puzzle = Puzzle::parse(
      r#"{
        "rows": 4,
        "columns": 4,
        "clues": {
          "across": { "7": { "clue": "Feline pet", "startPosition": [0, 0], "length": 3 } },
          "down": { "2": { "clue": "Dairy animal", "startPosition": [0, 0], "length": 3 } }
        }
      }"#,
    )
    .unwrap();

    assert_eq!(puzzle.start_number((0, 0)), Some(7));
  }

  #[test]
  fn word_ends_mark_last_squares() {
    let puzzle = crossed();

    assert!(puzzle.is_word_end((0, 2))); // end of 1 Across
    assert!(puzzle.is_word_end((2, 0))); // end of 1 Down
    assert!(puzzle.is_word_end((2, 2))); // end of 4 Across and 3 Down
    assert!(!puzzle.is_word_end((0, 0)));
    assert!(!puzzle.is_word_end((1, 1)));
  }

  #[test]
  fn clues_are_listed_in_number_order() {
    let puzzle = crossed();

    let across: Vec<u32> = puzzle.clues_in(Across).map(|(n, _)| n).collect();
    assert_eq!(across, [1, 4]);

    let down: Vec<u32> = puzzle.clues_in(Down).map(|(n, _)| n).collect();
    assert_eq!(down, [1, 2, 3]);
  }

  #[test]
  fn positions_cover_the_grid_in_reading_order() {
    let puzzle = crossed();
    let all: Vec<Pos> = puzzle.positions().collect();
    assert_eq!(all.len(), 9);
    assert_eq!(&all[..4], [(0, 0), (0, 1), (0, 2), (1, 0)]);
    assert_eq!(all[8], (2, 2));
  }

  #[test]
  fn clue_running_off_the_grid_is_rejected() {
    let err = Puzzle::parse(
      r#"{
        "rows": 3,
        "columns": 3,
        "clues": {
          "across": { "1": { "clue": "Too long", "startPosition": [0, 1], "length": 3 } },
          "down": {}
        }
      }"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::OutOfBounds((1, Across))));
  }

  #[test]
  fn overlapping_same_direction_clues_are_rejected() {
    let err = Puzzle::parse(
      r#"{
        "rows": 1,
        "columns": 6,
        "clues": {
          "across": {
            "1": { "clue": "First", "startPosition": [0, 0], "length": 4 },
            "2": { "clue": "Second", "startPosition": [0, 3], "length": 3 }
          },
          "down": {}
        }
      }"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Overlap((1, Across), (2, Across))));
  }

  #[test]
  fn zero_length_clue_is_rejected() {
    let err = Puzzle::parse(
      r#"{
        "rows": 3,
        "columns": 3,
        "clues": {
          "across": { "1": { "clue": "Nothing", "startPosition": [0, 0], "length": 0 } },
          "down": {}
        }
      }"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::EmptyClue((1, Across))));
  }

  #[test]
  fn bad_clue_number_is_rejected() {
    let err = Puzzle::parse(
      r#"{
        "rows": 3,
        "columns": 3,
        "clues": {
          "across": { "one": { "clue": "Feline pet", "startPosition": [0, 0], "length": 3 } },
          "down": {}
        }
      }"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidClueNumber(_)));
  }

  #[test]
  fn zero_extent_grid_is_rejected() {
    let err = Puzzle::parse(r#"{ "rows": 0, "columns": 5, "clues": { "across": {}, "down": {} } }"#)
      .unwrap_err();
    assert!(matches!(err, Error::EmptyGrid));
  }

  #[test]
  fn malformed_json_is_rejected() {
    assert!(matches!(
      Puzzle::parse("not json").unwrap_err(),
      Error::JsonError(_)
    ));
  }
}
