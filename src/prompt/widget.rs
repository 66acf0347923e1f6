//! Selection-widget prompts on a raw-mode terminal.
//!
//! Each question is a small key-driven state machine: [`Select`] for choice
//! sets, [`Confirm`] for yes/no, [`LineEditor`] for one line and
//! [`MultiLine`] for lists. Widgets only turn keys into state and state into
//! lines of text; [`WidgetFrontend`] owns the terminal.

use std::io::{self, Stdout, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, queue};

use super::Frontend;

/// Result of feeding one key to a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step<T> {
    Continue,
    Done(T),
    Cancel,
}

pub(crate) trait Widget {
    type Output;

    fn handle_key(&mut self, key: KeyEvent) -> Step<Self::Output>;

    /// The widget's current rendering, one entry per terminal row.
    fn lines(&self) -> Vec<String>;

    /// Cursor column on the last row, when the widget shows a cursor.
    fn cursor(&self) -> Option<usize> {
        None
    }
}

fn is_cancel(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
}

/// Pick one option with the arrow keys (or `j`/`k`).
#[derive(Debug)]
pub(crate) struct Select<'a> {
    label: &'a str,
    options: &'a [String],
    index: usize,
}

impl<'a> Select<'a> {
    pub(crate) fn new(label: &'a str, options: &'a [String], index: usize) -> Self {
        let index = if index < options.len() { index } else { 0 };
        Self {
            label,
            options,
            index,
        }
    }
}

impl Widget for Select<'_> {
    type Output = String;

    fn handle_key(&mut self, key: KeyEvent) -> Step<String> {
        if is_cancel(&key) {
            return Step::Cancel;
        }
        let count = self.options.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                self.index = (self.index + count - 1) % count;
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab if count > 0 => {
                self.index = (self.index + 1) % count;
            }
            KeyCode::Home => self.index = 0,
            KeyCode::End => self.index = count.saturating_sub(1),
            KeyCode::Enter => {
                return Step::Done(self.options.get(self.index).cloned().unwrap_or_default());
            }
            _ => {}
        }
        Step::Continue
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.label.to_string()];
        for (i, option) in self.options.iter().enumerate() {
            let marker = if i == self.index { ">" } else { " " };
            lines.push(format!("{marker} {option}"));
        }
        lines
    }
}

/// Yes/no with `y`/`n`, or arrows and Enter.
#[derive(Debug)]
pub(crate) struct Confirm<'a> {
    label: &'a str,
    value: bool,
}

impl<'a> Confirm<'a> {
    pub(crate) fn new(label: &'a str, default: bool) -> Self {
        Self {
            label,
            value: default,
        }
    }
}

impl Widget for Confirm<'_> {
    type Output = bool;

    fn handle_key(&mut self, key: KeyEvent) -> Step<bool> {
        if is_cancel(&key) {
            return Step::Cancel;
        }
        match key.code {
            KeyCode::Char('y' | 'Y') => {
                self.value = true;
                Step::Done(true)
            }
            KeyCode::Char('n' | 'N') => {
                self.value = false;
                Step::Done(false)
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                self.value = !self.value;
                Step::Continue
            }
            KeyCode::Enter => Step::Done(self.value),
            _ => Step::Continue,
        }
    }

    fn lines(&self) -> Vec<String> {
        let options = if self.value { "[Yes] / No" } else { "Yes / [No]" };
        vec![format!("{}{options}", self.label)]
    }
}

/// How a line was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Submitted {
    Enter(String),
    /// Ctrl-D: end of input.
    End(String),
}

/// A single-line editor with cursor movement.
#[derive(Debug)]
pub(crate) struct LineEditor<'a> {
    label: &'a str,
    buffer: Vec<char>,
    cursor: usize,
}

impl<'a> LineEditor<'a> {
    pub(crate) fn new(label: &'a str) -> Self {
        Self {
            label,
            buffer: Vec::new(),
            cursor: 0,
        }
    }

    fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    fn take(&mut self) -> String {
        let text = self.text();
        self.buffer.clear();
        self.cursor = 0;
        text
    }
}

impl Widget for LineEditor<'_> {
    type Output = Submitted;

    fn handle_key(&mut self, key: KeyEvent) -> Step<Submitted> {
        if is_cancel(&key) {
            return Step::Cancel;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('d') => Step::Done(Submitted::End(self.take())),
                KeyCode::Char('a') => {
                    self.cursor = 0;
                    Step::Continue
                }
                KeyCode::Char('e') => {
                    self.cursor = self.buffer.len();
                    Step::Continue
                }
                KeyCode::Char('u') => {
                    self.buffer.drain(..self.cursor);
                    self.cursor = 0;
                    Step::Continue
                }
                _ => Step::Continue,
            };
        }
        match key.code {
            KeyCode::Char(c) => {
                self.buffer.insert(self.cursor, c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.buffer.remove(self.cursor);
            }
            KeyCode::Delete if self.cursor < self.buffer.len() => {
                self.buffer.remove(self.cursor);
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.buffer.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.buffer.len(),
            KeyCode::Enter => return Step::Done(Submitted::Enter(self.take())),
            _ => {}
        }
        Step::Continue
    }

    fn lines(&self) -> Vec<String> {
        vec![format!("{}{}", self.label, self.text())]
    }

    fn cursor(&self) -> Option<usize> {
        Some(self.label.chars().count() + self.cursor)
    }
}

const LIST_HINT: &str = "Item per line. Press Enter on an empty line to continue.";

/// A list, one item per line. An empty line or Ctrl-D ends it.
#[derive(Debug)]
pub(crate) struct MultiLine<'a> {
    label: &'a str,
    items: Vec<String>,
    editor: LineEditor<'static>,
}

impl<'a> MultiLine<'a> {
    pub(crate) fn new(label: &'a str) -> Self {
        Self {
            label,
            items: Vec::new(),
            editor: LineEditor::new(""),
        }
    }
}

impl Widget for MultiLine<'_> {
    type Output = Vec<String>;

    fn handle_key(&mut self, key: KeyEvent) -> Step<Vec<String>> {
        match self.editor.handle_key(key) {
            Step::Continue => Step::Continue,
            Step::Cancel => Step::Cancel,
            Step::Done(Submitted::Enter(line)) if line.is_empty() => {
                Step::Done(std::mem::take(&mut self.items))
            }
            Step::Done(Submitted::Enter(line)) => {
                self.items.push(line);
                Step::Continue
            }
            Step::Done(Submitted::End(line)) => {
                if !line.is_empty() {
                    self.items.push(line);
                }
                Step::Done(std::mem::take(&mut self.items))
            }
        }
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("{}{LIST_HINT}", self.label)];
        lines.extend(self.items.iter().cloned());
        lines.extend(self.editor.lines());
        lines
    }

    fn cursor(&self) -> Option<usize> {
        self.editor.cursor()
    }
}

/// Restores cooked mode when dropped.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            tracing::warn!(error = %e, "failed to restore terminal mode");
        }
    }
}

/// Prompts drawn with crossterm: arrow-key selection for choices, a yes/no
/// toggle for flags and line editing for text and lists.
///
/// Esc or Ctrl-C aborts the session with an `Interrupted` I/O error.
#[derive(Debug)]
pub struct WidgetFrontend<W: Write = Stdout> {
    out: W,
}

impl WidgetFrontend<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> WidgetFrontend<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn run<T: Widget>(&mut self, widget: &mut T) -> io::Result<T::Output> {
        let _raw = RawMode::enable()?;
        let mut rows = 0;
        loop {
            self.redraw(widget, &mut rows)?;
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match widget.handle_key(key) {
                Step::Continue => {}
                Step::Done(output) => {
                    self.redraw(widget, &mut rows)?;
                    write!(self.out, "\r\n")?;
                    self.out.flush()?;
                    return Ok(output);
                }
                Step::Cancel => {
                    write!(self.out, "\r\n")?;
                    self.out.flush()?;
                    return Err(io::Error::new(io::ErrorKind::Interrupted, "prompt cancelled"));
                }
            }
        }
    }

    /// Replace the previous rendering (`rows` lines above the cursor) with
    /// the widget's current one.
    fn redraw<T: Widget>(&mut self, widget: &T, rows: &mut u16) -> io::Result<()> {
        if *rows > 0 {
            queue!(self.out, cursor::MoveUp(*rows))?;
        }
        queue!(
            self.out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::FromCursorDown)
        )?;
        let lines = widget.lines();
        write!(self.out, "{}", lines.join("\r\n"))?;
        *rows = u16::try_from(lines.len().saturating_sub(1)).unwrap_or(u16::MAX);
        if let Some(column) = widget.cursor() {
            queue!(
                self.out,
                cursor::MoveToColumn(u16::try_from(column).unwrap_or(u16::MAX))
            )?;
        }
        self.out.flush()
    }
}

impl<W: Write> Frontend for WidgetFrontend<W> {
    fn show(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text.bold())
    }

    fn warn(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", format!("{text}!").red())
    }

    fn ask_text(&mut self, label: &str) -> io::Result<String> {
        match self.run(&mut LineEditor::new(label))? {
            Submitted::Enter(text) | Submitted::End(text) => Ok(text),
        }
    }

    fn ask_lines(&mut self, label: &str) -> io::Result<Vec<String>> {
        self.run(&mut MultiLine::new(label))
    }

    fn ask_choice(
        &mut self,
        label: &str,
        options: &[String],
        default: usize,
    ) -> io::Result<String> {
        self.run(&mut Select::new(label, options, default))
    }

    fn ask_flag(&mut self, label: &str, default: bool) -> io::Result<String> {
        let yes = self.run(&mut Confirm::new(label, default))?;
        Ok(if yes { "yes" } else { "no" }.to_string())
    }
}
