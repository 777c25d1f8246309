use std::fmt::Display;
use std::io::{self, BufRead, Write};

use bplus_tree_set::BPlusTreeSet;
use log::debug;

use crate::command::{Command, Condition};

const PROMPT: &str = ">>> ";

/// Whether the read loop keeps going after a command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Flow {
    Continue,
    Exit,
}

/// Interactive front end over a set of `i32`, writing every response to `out`.
pub(crate) struct Console<W> {
    set: BPlusTreeSet<i32>,
    out: W,
    verbose: bool,
}

impl<W: Write> Console<W> {
    pub(crate) fn new(set: BPlusTreeSet<i32>, out: W) -> Self {
        Console {
            set,
            out,
            verbose: false,
        }
    }

    /// Prompts for and executes lines from `input` until it is exhausted or an `EXIT` is read.
    pub(crate) fn run<R: BufRead>(&mut self, mut input: R) -> io::Result<()> {
        let mut line = String::new();
        loop {
            self.out.write_all(PROMPT.as_bytes())?;
            self.out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                // Leave the cursor on a fresh line after end of input.
                writeln!(self.out)?;
                return Ok(());
            }
            if let Some(command) = Command::parse(&line) {
                if self.execute(&command)? == Flow::Exit {
                    return Ok(());
                }
            }
        }
    }

    pub(crate) fn execute(&mut self, command: &Command) -> io::Result<Flow> {
        match command {
            Command::Exit => return Ok(Flow::Exit),
            Command::Print => write!(self.out, "{}", self.set)?,
            Command::Clear => self.set.clear(),
            Command::First => writeln!(self.out, "FIRST: {}", OrNull(self.set.first()))?,
            Command::Last => writeln!(self.out, "LAST: {}", OrNull(self.set.last()))?,
            Command::Add(values) => {
                for &value in values {
                    let added = self.set.insert(value);
                    debug!("Added {value}? {added}");
                }
            }
            Command::Remove(values) => {
                for value in values {
                    let removed = self.set.remove(value);
                    debug!("Removed {value}? {removed}");
                }
            }
            Command::Contains(values) => {
                for value in values {
                    writeln!(self.out, "{value}: {}", self.set.contains(value))?;
                }
            }
            Command::Is(conditions) => {
                for condition in conditions {
                    match condition {
                        Condition::Empty => writeln!(self.out, "EMPTY: {}", self.set.is_empty())?,
                    }
                }
            }
            Command::SetVerbose(verbose) => self.verbose = *verbose,
        }

        if self.verbose && command.is_mutating() {
            write!(self.out, "{}", self.set)?;
        }
        Ok(Flow::Continue)
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.out
    }
}

/// Displays the value, or `null` when there is none.
struct OrNull<T>(Option<T>);

impl<T: Display> Display for OrNull<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str("null"),
        }
    }
}
