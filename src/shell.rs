//! Line-oriented command shell.
//!
//! The transport hands over one received line at a time. [`Shell::parse`]
//! checks the length, pretreats the bytes into whitespace-separated tokens,
//! looks up the command named by the first token, and returns the numeric
//! status the transport loop reports back:
//!
//! | Code | Status           | Printed line                    |
//! |------|------------------|---------------------------------|
//! | 0    | `Success`        | (none)                          |
//! | 1    | `RunFailed`      | `amg8833: run failed.`          |
//! | 2    | `UnknownCommand` | `amg8833: unknown command.`     |
//! | 3    | `TooLong`        | `amg8833: length is too long.`  |
//! | 4    | `PretreatFailed` | `amg8833: pretreat failed.`     |
//! | 5    | `InvalidParam`   | `amg8833: param is invalid.`    |

use core::fmt::Write;

use log::debug;

use crate::error::Error;

/// Hard upper bound on the transport line buffer.
pub const MAX_LINE_CAPACITY: usize = 1024;
/// Maximum number of tokens in one command line (command name included).
pub const MAX_ARGS: usize = 16;
/// Maximum number of commands a shell can hold.
pub const MAX_COMMANDS: usize = 4;

/// Result of one shell invocation. The discriminants are the wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ShellStatus {
    Success = 0,
    RunFailed = 1,
    UnknownCommand = 2,
    TooLong = 3,
    PretreatFailed = 4,
    InvalidParam = 5,
}

impl ShellStatus {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::RunFailed),
            2 => Some(Self::UnknownCommand),
            3 => Some(Self::TooLong),
            4 => Some(Self::PretreatFailed),
            5 => Some(Self::InvalidParam),
            _ => None,
        }
    }

    /// Fixed diagnostic line for a terminal status; `None` on success.
    pub const fn diagnostic(self) -> Option<&'static str> {
        match self {
            Self::Success => None,
            Self::RunFailed => Some("amg8833: run failed."),
            Self::UnknownCommand => Some("amg8833: unknown command."),
            Self::TooLong => Some("amg8833: length is too long."),
            Self::PretreatFailed => Some("amg8833: pretreat failed."),
            Self::InvalidParam => Some("amg8833: param is invalid."),
        }
    }
}

/// Diagnostic line for a raw status code, including codes outside the scheme.
pub const fn status_line(code: u8) -> Option<&'static str> {
    match ShellStatus::from_code(code) {
        Some(status) => status.diagnostic(),
        None => Some("amg8833: unknown status code."),
    }
}

/// A command the shell can dispatch to.
pub trait ShellCommand {
    /// Name matched against the first token.
    fn name(&self) -> &'static str;

    /// Run with the full token list (`args[0]` is the command name).
    fn run(&mut self, args: &[&str], out: &mut dyn Write) -> ShellStatus;
}

/// Command registry plus line pretreatment.
pub struct Shell<'a> {
    commands: heapless::Vec<&'a mut dyn ShellCommand, MAX_COMMANDS>,
    max_line_len: usize,
}

impl<'a> Shell<'a> {
    pub fn new(max_line_len: usize) -> Self {
        Self {
            commands: heapless::Vec::new(),
            max_line_len: max_line_len.min(MAX_LINE_CAPACITY),
        }
    }

    /// Register a command. Names must be unique.
    pub fn register(&mut self, command: &'a mut dyn ShellCommand) -> Result<(), Error> {
        if self.commands.iter().any(|c| c.name() == command.name()) {
            return Err(Error::Config("command already registered"));
        }
        self.commands
            .push(command)
            .map_err(|_| Error::Config("command table full"))
    }

    /// Parse and execute one received line.
    pub fn parse(&mut self, line: &[u8], out: &mut dyn Write) -> ShellStatus {
        if line.len() > self.max_line_len {
            return ShellStatus::TooLong;
        }

        let Some(tokens) = pretreat(line) else {
            return ShellStatus::PretreatFailed;
        };

        let name = tokens[0];
        match self.commands.iter_mut().find(|c| c.name() == name) {
            Some(command) => {
                let status = command.run(&tokens, out);
                debug!("shell: '{}' -> {:?}", name, status);
                status
            }
            None => ShellStatus::UnknownCommand,
        }
    }
}

/// Split a raw line into tokens. Fails on non-ASCII input, blank lines and
/// lines with more than [`MAX_ARGS`] tokens.
fn pretreat(line: &[u8]) -> Option<heapless::Vec<&str, MAX_ARGS>> {
    if !line.is_ascii() {
        return None;
    }
    let text = core::str::from_utf8(line).ok()?;
    let text = text.trim_end_matches(['\r', '\n', '\0']);

    let mut tokens = heapless::Vec::new();
    for token in text.split_ascii_whitespace() {
        tokens.push(token).ok()?;
    }
    if tokens.is_empty() { None } else { Some(tokens) }
}
