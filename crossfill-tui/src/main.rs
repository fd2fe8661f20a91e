use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use crossfill::Direction::{Across, Down};
use crossfill::{AnswerKey, Arrow, ClueStatus, Direction, Pos, Puzzle, Session, Square, Status};
use crossterm::event::{
  self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
  KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::{
  DefaultTerminal, Frame,
  buffer::Buffer,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style, Stylize},
  text::{Line, Span, Text},
  widgets::{Block, Padding, Paragraph, Widget},
};

const SQUARE_WIDTH: u16 = 7;
const SQUARE_HEIGHT: u16 = 3;

/// Fill and check crossword puzzles in your terminal.
#[derive(Debug, Parser)]
struct Cli {
  /// Path to a puzzle JSON document.
  puzzle: PathBuf,
  /// Path to the matching answer key JSON document.
  answers: PathBuf,
}

fn main() -> io::Result<()> {
  env_logger::init();
  let cli = Cli::parse();

  let puzzle = load(&cli.puzzle, Puzzle::parse);
  let answers = load(&cli.answers, AnswerKey::parse);
  let app = App::new(puzzle, answers);

  let terminal = ratatui::init();
  execute!(io::stdout(), EnableMouseCapture)?;
  let result = app.run(terminal);
  let _ = execute!(io::stdout(), DisableMouseCapture);
  ratatui::restore();
  result
}

fn load<T>(path: &Path, parse: impl Fn(&str) -> Result<T, crossfill::Error>) -> T {
  let text = std::fs::read_to_string(path).unwrap_or_else(|err| {
    println!("Failed to read {}: {}", path.display(), err);
    std::process::exit(1);
  });
  parse(&text).unwrap_or_else(|err| {
    println!("Failed to load {}: {}", path.display(), err);
    std::process::exit(2);
  })
}

#[derive(Debug)]
enum SquareStyle {
  // Default styling
  Standard,
  // The selection is positioned on this square.
  Cursor,
  // The selection is not on this square, but the current clue includes it.
  Word,
}

impl From<SquareStyle> for Style {
  fn from(value: SquareStyle) -> Self {
    let base_style = match value {
      SquareStyle::Standard => Style::new().bg(Color::White),
      SquareStyle::Cursor => Style::new().bg(Color::LightRed),
      SquareStyle::Word => Style::new().bg(Color::LightYellow),
    };
    base_style.fg(Color::Black).add_modifier(Modifier::BOLD)
  }
}

#[derive(Debug)]
struct Banner {
  text: String,
  error: bool,
}

#[derive(Debug)]
pub struct App {
  session: Session,
  answers: AnswerKey,
  banner: Option<Banner>,
  /// Where the grid was drawn last frame; used to map clicks onto squares.
  grid_area: Rect,
  running: bool,
}

impl App {
  fn new(puzzle: Puzzle, answers: AnswerKey) -> Self {
    let mut session = Session::new(puzzle);

    // Start on the first open square, as if the user had clicked it.
    let start = session
      .puzzle()
      .positions()
      .find(|&pos| session.puzzle().is_open(pos));
    if let Some(pos) = start {
      session.click_cell(pos);
    }

    Self {
      session,
      answers,
      banner: None,
      grid_area: Rect::default(),
      running: true,
    }
  }

  pub fn run(mut self, mut terminal: DefaultTerminal) -> io::Result<()> {
    self.running = true;
    while self.running {
      terminal.draw(|frame| self.draw(frame))?;
      self.handle_crossterm_events()?;
    }
    Ok(())
  }

  fn draw(&mut self, frame: &mut Frame) {
    let (_, grid_area, _, _) = self.areas(frame.area());
    self.grid_area = grid_area;
    frame.render_widget(&*self, frame.area());
  }

  fn areas(&self, area: Rect) -> (Rect, Rect, Rect, Rect) {
    let [title_area, main_area, status_area] = Layout::vertical([
      Constraint::Length(2),
      Constraint::Min(0),
      Constraint::Length(1),
    ])
    .areas(area);

    let [grid_area, clue_area] =
      Layout::horizontal([Constraint::Min(0), Constraint::Length(45)]).areas(main_area);

    let puzzle = self.session.puzzle();
    let grid_area = center(
      grid_area,
      Constraint::Length(
        (puzzle.columns() * (1 + SQUARE_WIDTH as usize))
          .try_into()
          .unwrap(),
      ),
      Constraint::Length(
        (puzzle.rows() * (1 + SQUARE_HEIGHT as usize))
          .try_into()
          .unwrap(),
      ),
    );

    (title_area, grid_area, clue_area, status_area)
  }

  /// Reads the crossterm events and updates the state of [`App`].
  fn handle_crossterm_events(&mut self) -> io::Result<()> {
    match event::read()? {
      // it's important to check KeyEventKind::Press to avoid handling key release events
      Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
      Event::Mouse(mouse) => self.on_mouse_event(mouse),
      Event::Resize(_, _) => {}
      _ => {}
    }
    Ok(())
  }

  /// Handles the key events and updates the state of [`App`].
  fn on_key_event(&mut self, key: KeyEvent) {
    match (key.modifiers, key.code) {
      (_, KeyCode::Esc) | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => {
        self.quit()
      }
      (_, KeyCode::Enter) => self.submit(),
      (_, KeyCode::Up) => self.arrow(Arrow::Up),
      (_, KeyCode::Down) => self.arrow(Arrow::Down),
      (_, KeyCode::Left) => self.arrow(Arrow::Left),
      (_, KeyCode::Right) => self.arrow(Arrow::Right),
      (_, KeyCode::Backspace | KeyCode::Delete) => self.erase(),
      (_, KeyCode::Char(' ')) => self.toggle_direction(),
      (_, KeyCode::Char(c)) if c.is_ascii_alphabetic() => self.type_letter(c),
      _ => {}
    }
  }

  fn on_mouse_event(&mut self, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
      return;
    }
    if let Some(pos) = self.square_at(mouse.column, mouse.row) {
      self.session.click_cell(pos);
    }
  }

  /// Set running to false to quit the application.
  fn quit(&mut self) {
    self.running = false;
  }

  fn arrow(&mut self, arrow: Arrow) {
    if let Some(pos) = self.session.selected_cell() {
      self.session.arrow(arrow, pos);
    }
  }

  fn type_letter(&mut self, c: char) {
    if let Some(pos) = self.session.selected_cell() {
      let mut buf = [0; 4];
      self.session.input(pos, c.encode_utf8(&mut buf));
    }
  }

  fn erase(&mut self) {
    if let Some(pos) = self.session.selected_cell() {
      self.session.input(pos, "");
    }
  }

  // A second click on the selected square swaps the typing direction, so
  // spacebar maps to exactly that.
  fn toggle_direction(&mut self) {
    if let Some(pos) = self.session.selected_cell() {
      self.session.click_cell(pos);
    }
  }

  fn submit(&mut self) {
    let banner = match self.session.submit(&self.answers) {
      Ok(Status::Pass) => Banner {
        text: "Congratulations! You've solved the puzzle correctly!".into(),
        error: false,
      },
      Ok(Status::Fail) => Banner {
        text: "Some clues are incorrect. Please check the marked clues and try again.".into(),
        error: true,
      },
      Err(err) => Banner {
        text: err.to_string(),
        error: true,
      },
    };
    self.banner = Some(banner);
  }

  /// Maps screen coordinates back to the grid square drawn there.
  fn square_at(&self, x: u16, y: u16) -> Option<Pos> {
    let area = self.grid_area;
    if x < area.x || y < area.y {
      return None;
    }

    let (dx, dy) = (x - area.x, y - area.y);
    if dx % (SQUARE_WIDTH + 1) >= SQUARE_WIDTH || dy % (SQUARE_HEIGHT + 1) >= SQUARE_HEIGHT {
      return None; // the gap between squares
    }

    let col = (dx / (SQUARE_WIDTH + 1)) as usize;
    let row = (dy / (SQUARE_HEIGHT + 1)) as usize;
    let puzzle = self.session.puzzle();
    (row < puzzle.rows() && col < puzzle.columns()).then_some((row, col))
  }

  // Determines how a particular square should be styled.
  fn square_style(&self, pos: Pos) -> SquareStyle {
    if self.session.selected_cell() == Some(pos) {
      return SquareStyle::Cursor;
    }

    if let Some(id) = self.session.current_clue() {
      if let Some(mut span) = self.session.puzzle().span(id) {
        if span.any(|p| p == pos) {
          return SquareStyle::Word;
        }
      }
    }

    SquareStyle::Standard
  }

  fn render_square(&self, pos: Pos, square_area: Rect, buf: &mut Buffer) {
    let square = self.session.grid().get(pos);
    if square == Square::Black {
      Block::new()
        .style(Style::new().bg(Color::Black))
        .render(square_area, buf);
      return;
    }

    let puzzle = self.session.puzzle();
    let number = puzzle
      .start_number(pos)
      .map(|n| n.to_string())
      .unwrap_or_default();
    let letter = match square {
      Square::Letter(c) => c.to_string(),
      _ => String::new(),
    };
    let end_marker = if puzzle.is_word_end(pos) { "." } else { "" };

    let text = Text::from(vec![
      Line::from(number).left_aligned(),
      Line::from(letter).centered(),
      Line::from(end_marker).right_aligned(),
    ]);
    Paragraph::new(text)
      .style(self.square_style(pos))
      .render(square_area, buf);
  }

  fn clue_lines(&self, direction: Direction) -> Vec<Line<'_>> {
    let current = self.session.current_clue();
    self
      .session
      .puzzle()
      .clues_in(direction)
      .map(|(number, clue)| {
        let id = (number, direction);
        let mut spans = vec![
          format!("{}. ", number).bold(),
          Span::from(format!("{} ({})", clue.text, clue.length)),
        ];
        match self.session.clue_status(id) {
          ClueStatus::Correct => spans.push(" ✔".green()),
          ClueStatus::Incorrect => spans.push(" ✘".red()),
          ClueStatus::Incomplete => spans.push(" !".yellow()),
          ClueStatus::None => {}
        }

        let line = Line::from(spans);
        if current == Some(id) {
          line.style(Style::new().bg(Color::LightYellow).fg(Color::Black))
        } else if self.session.is_incomplete(id) {
          line.style(Style::new().bg(Color::Yellow).fg(Color::Black))
        } else {
          line
        }
      })
      .collect()
  }
}

impl Widget for &App {
  fn render(self, area: Rect, buf: &mut Buffer) {
    let (title_area, grid_area, clue_area, status_area) = self.areas(area);

    Line::from("Crossword Puzzle".bold().blue())
      .centered()
      .render(title_area, buf);

    let mut square_area = Rect {
      x: grid_area.x,
      y: grid_area.y,
      width: SQUARE_WIDTH,
      height: SQUARE_HEIGHT,
    };
    for row in 0..self.session.grid().height() {
      for col in 0..self.session.grid().width() {
        self.render_square((row, col), square_area, buf);
        square_area.x += SQUARE_WIDTH + 1;
      }
      square_area.x = grid_area.x;
      square_area.y += SQUARE_HEIGHT + 1;
    }

    let [across_area, down_area] =
      Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(clue_area);
    Paragraph::new(self.clue_lines(Across))
      .block(
        Block::bordered()
          .title(Line::from("Across").centered())
          .padding(Padding::horizontal(1)),
      )
      .render(across_area, buf);
    Paragraph::new(self.clue_lines(Down))
      .block(
        Block::bordered()
          .title(Line::from("Down").centered())
          .padding(Padding::horizontal(1)),
      )
      .render(down_area, buf);

    let status = match &self.banner {
      Some(banner) if banner.error => Line::from(banner.text.clone().red()),
      Some(banner) => Line::from(banner.text.clone().green()),
      None => Line::from(
        "Type letters, arrows move, space switches direction, enter submits, esc quits".dim(),
      ),
    };
    status.centered().render(status_area, buf);
  }
}

/// https://ratatui.rs/recipes/layout/center-a-widget/
fn center(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
  let [area] = Layout::horizontal([horizontal])
    .flex(Flex::Center)
    .areas(area);
  let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
  area
}
