use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Context;
use inquire::{InquireError, Text};

/// The two questions asked each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Crop,
    Location,
}

impl Field {
    pub fn message(&self) -> &'static str {
        match self {
            Field::Crop => "Enter crop type",
            Field::Location => "Enter your city/location",
        }
    }

    pub fn example(&self) -> &'static str {
        match self {
            Field::Crop => "e.g., wheat, rice, tomato, corn",
            Field::Location => "e.g., London, New York, Mumbai or London,GB",
        }
    }
}

/// Source of answers. `None` means the user is gone (end of input, Ctrl+C).
pub trait Prompter {
    fn ask(&mut self, field: Field) -> anyhow::Result<Option<String>>;
}

impl<P: Prompter + ?Sized> Prompter for Box<P> {
    fn ask(&mut self, field: Field) -> anyhow::Result<Option<String>> {
        (**self).ask(field)
    }
}

/// Interactive prompt on a terminal.
#[derive(Debug, Default)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn ask(&mut self, field: Field) -> anyhow::Result<Option<String>> {
        let answer = Text::new(&format!("{}:", field.message()))
            .with_placeholder(field.example())
            .with_help_message("type 'exit' or 'quit' to leave")
            .prompt();

        match answer {
            Ok(line) => Ok(Some(line)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
            Err(e) => Err(e).context("Failed to read input"),
        }
    }
}

/// Plain line-by-line prompt, used when stdin is not a terminal.
pub struct LinePrompter<R, W> {
    reader: R,
    echo: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(reader: R, echo: W) -> Self {
        Self { reader, echo }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, field: Field) -> anyhow::Result<Option<String>> {
        write!(self.echo, "{} ({}): ", field.message(), field.example())?;
        self.echo.flush()?;

        let mut line = String::new();
        let read = self.reader.read_line(&mut line).context("Failed to read input")?;
        if read == 0 {
            return Ok(None);
        }

        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Pick the prompt style for the current stdin.
pub fn stdin_prompter() -> Box<dyn Prompter> {
    if io::stdin().is_terminal() {
        Box::new(InquirePrompter)
    } else {
        Box::new(LinePrompter::new(io::stdin().lock(), io::stdout()))
    }
}
