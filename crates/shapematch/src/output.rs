use crate::compare::Outcome;
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Machine-readable form of an [`Outcome`].
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub result: bool,
    pub message: &'a str,
}

impl<'a> From<&'a Outcome> for Report<'a> {
    fn from(outcome: &'a Outcome) -> Self {
        Self {
            result: outcome.matched,
            message: &outcome.message,
        }
    }
}

pub struct Output {
    stdout: StandardStream,
}

impl Output {
    pub fn new(color: bool) -> Self {
        let color_choice = if color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            stdout: StandardStream::stdout(color_choice),
        }
    }

    fn set_color(&mut self, color: Color) -> io::Result<()> {
        self.stdout
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))
    }

    pub fn print_outcome(&mut self, outcome: &Outcome) -> io::Result<()> {
        if outcome.matched {
            self.set_color(Color::Green)?;
            write!(self.stdout, "✓ match")?;
            self.stdout.reset()?;
            writeln!(self.stdout)?;
        } else {
            self.set_color(Color::Red)?;
            write!(self.stdout, "✗ mismatch")?;
            self.stdout.reset()?;
            writeln!(self.stdout, ": {}", outcome.message)?;
        }
        self.stdout.flush()
    }

    pub fn print_json(&mut self, outcome: &Outcome) -> io::Result<()> {
        let report = Report::from(outcome);
        serde_json::to_writer(&mut self.stdout, &report)?;
        writeln!(self.stdout)?;
        self.stdout.flush()
    }
}
