//! Line-oriented front end for a [`Processor`].
//!
//! Every input line is either an instruction (`SET A 10`) or a dot-command:
//!
//! - `.regs`: print all registers
//! - `.get <R>`: print one register
//! - `.reset`: zero all registers
//! - `.quit`: end the session
//!
//! Blank lines and `#` comments are skipped.

use std::fmt;
use std::io::{self, BufRead, Write};

use serde::Serialize;

use crate::error::Error;
use crate::processor::Processor;
use crate::response::{RegisterValue, Response};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// `A=1 B=2 C=0 D=0`
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Configuration for a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub format: OutputFormat,
    /// End the session at the first failing line.
    pub stop_on_error: bool,
    /// Written before each line is read, if set.
    pub prompt: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            stop_on_error: false,
            prompt: None,
        }
    }
}

/// Counts reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Lines that ran without error (instructions and commands).
    pub executed: usize,
    pub failed: usize,
    /// True if the session ended early because of `stop_on_error`.
    pub stopped: bool,
}

enum Command<'a> {
    Instruction(&'a str),
    Registers,
    Get(&'a str),
    Reset,
    Quit,
}

/// Strip a trailing `#` comment and surrounding whitespace. Returns `None` for lines with
/// nothing left to run.
pub fn strip_comment(line: &str) -> Option<&str> {
    let code = match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    };
    let code = code.trim();
    (!code.is_empty()).then_some(code)
}

/// The runnable lines of a program text, each paired with its 1-based line number.
pub fn program_lines(text: &str) -> Vec<(usize, &str)> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| strip_comment(line).map(|code| (i + 1, code)))
        .collect()
}

fn parse_command(line: &str) -> Result<Command<'_>, Error> {
    let Some(rest) = line.strip_prefix('.') else {
        return Ok(Command::Instruction(line));
    };
    let mut parts = rest.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();
    match (cmd, args.as_slice()) {
        ("regs", []) => Ok(Command::Registers),
        ("get", [name]) => Ok(Command::Get(*name)),
        ("reset", []) => Ok(Command::Reset),
        ("quit" | "exit", []) => Ok(Command::Quit),
        _ => Err(Error::InvalidSyntax(format!("Invalid command: {line}"))),
    }
}

/// Write `value` in the requested format, followed by a newline.
pub fn emit<W, T>(out: &mut W, format: OutputFormat, value: &T) -> io::Result<()>
where
    W: Write,
    T: Serialize + fmt::Display,
{
    match format {
        OutputFormat::Text => writeln!(out, "{value}"),
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, value).map_err(io::Error::from)?;
            writeln!(out)
        }
    }
}

/// Drives one [`Processor`] from a stream of text lines.
pub struct Session {
    processor: Processor,
    config: SessionConfig,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_processor(Processor::new(), config)
    }

    pub fn with_processor(processor: Processor, config: SessionConfig) -> Self {
        Self { processor, config }
    }

    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    pub fn into_processor(self) -> Processor {
        self.processor
    }

    /// Read lines from `input` until EOF or `.quit`, writing one response per line to `out`.
    ///
    /// Only I/O failures end the session with an error. Instruction failures are reported on
    /// `out` and counted in the summary.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        let mut lines = input.lines();
        loop {
            if let Some(prompt) = &self.config.prompt {
                write!(out, "{prompt}")?;
                out.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            let Some(code) = strip_comment(&line) else {
                continue;
            };
            let ok = match parse_command(code) {
                Ok(Command::Quit) => break,
                Ok(command) => self.dispatch(command, out)?,
                Err(err) => {
                    emit(out, self.config.format, &Response::error(&err))?;
                    false
                }
            };
            if ok {
                summary.executed += 1;
            } else {
                summary.failed += 1;
                if self.config.stop_on_error {
                    summary.stopped = true;
                    break;
                }
            }
        }
        crate::info!(
            "session finished: {} ok, {} failed",
            summary.executed,
            summary.failed
        );
        Ok(summary)
    }

    fn dispatch<W: Write>(&mut self, command: Command<'_>, out: &mut W) -> io::Result<bool> {
        let format = self.config.format;
        let response = match command {
            Command::Instruction(line) => Response::from(self.processor.execute(line)),
            Command::Registers => Response::success(self.processor.registers()),
            Command::Reset => Response::from(self.processor.reset()),
            Command::Get(name) => {
                return match self.processor.register(name) {
                    Ok(value) => {
                        let value = RegisterValue {
                            register: name.to_ascii_uppercase(),
                            value,
                        };
                        emit(out, format, &value)?;
                        Ok(true)
                    }
                    Err(err) => {
                        emit(out, format, &Response::error(&err))?;
                        Ok(false)
                    }
                };
            }
            Command::Quit => return Ok(true),
        };
        emit(out, format, &response)?;
        Ok(response.is_success())
    }
}
