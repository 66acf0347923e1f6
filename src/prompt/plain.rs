use std::io::{self, BufRead, Stderr, StdinLock, Stdout, Write};

use super::Frontend;

#[cfg(windows)]
const END_OF_LIST_HINT: &str = "Item per line. Press Ctrl-Z in a new line then Enter to continue.";
#[cfg(not(windows))]
const END_OF_LIST_HINT: &str = "Item per line. Press Ctrl-D in a new line to continue.";

/// Line-based prompts over any reader and writers.
///
/// Questions and help go to `out`, diagnostics to `err`. Lists are read until
/// end of input.
#[derive(Debug)]
pub struct PlainFrontend<R, W, E> {
    input: R,
    out: W,
    err: E,
}

impl PlainFrontend<StdinLock<'static>, Stdout, Stderr> {
    /// Prompt on the process's standard streams.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout(), io::stderr())
    }
}

impl<R: BufRead, W: Write, E: Write> PlainFrontend<R, W, E> {
    pub fn new(input: R, out: W, err: E) -> Self {
        Self { input, out, err }
    }

    pub fn into_parts(self) -> (R, W, E) {
        (self.input, self.out, self.err)
    }

    /// One line without its terminator; `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn prompt_line(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        self.read_line()?
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "input ended"))
    }
}

impl<R: BufRead, W: Write, E: Write> Frontend for PlainFrontend<R, W, E> {
    fn show(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    fn warn(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.err, "Oops! {text}.")
    }

    fn ask_text(&mut self, label: &str) -> io::Result<String> {
        self.prompt_line(label)
    }

    fn ask_lines(&mut self, label: &str) -> io::Result<Vec<String>> {
        writeln!(self.out, "{label}{END_OF_LIST_HINT}")?;
        self.out.flush()?;
        let mut lines = Vec::new();
        while let Some(line) = self.read_line()? {
            lines.push(line);
        }
        Ok(lines)
    }

    fn ask_choice(
        &mut self,
        label: &str,
        options: &[String],
        _default: usize,
    ) -> io::Result<String> {
        self.prompt_line(&format!("{label}{{{}}} ", options.join(",")))
    }

    fn ask_flag(&mut self, label: &str, _default: bool) -> io::Result<String> {
        self.prompt_line(&format!("{label}[yes/no] "))
    }
}
