//! Fuzz target: `Shell::parse` → `parse_args`
//!
//! Drives arbitrary bytes through line pretreatment and argument parsing
//! and asserts that every line ends in a defined status code, that the
//! command only runs on lines that pretreat cleanly, and that argument
//! parsing never panics on the resulting tokens.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use core::fmt::Write;

use amg8833_shell::app::commands::parse_args;
use amg8833_shell::shell::{Shell, ShellCommand, ShellStatus, MAX_ARGS};
use libfuzzer_sys::fuzz_target;

struct ParseOnly {
    runs: usize,
}

impl ShellCommand for ParseOnly {
    fn name(&self) -> &'static str {
        "amg8833"
    }

    fn run(&mut self, args: &[&str], _out: &mut dyn Write) -> ShellStatus {
        self.runs += 1;
        assert!(!args.is_empty() && args.len() <= MAX_ARGS);
        match parse_args(args) {
            Ok(_) => ShellStatus::Success,
            Err(e) => e.status(),
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut command = ParseOnly { runs: 0 };
    let status = {
        let mut shell = Shell::new(256);
        let _ = shell.register(&mut command);
        shell.parse(data, &mut String::new())
    };

    assert!(ShellStatus::from_code(status.code()).is_some());
    if matches!(
        status,
        ShellStatus::TooLong | ShellStatus::PretreatFailed | ShellStatus::UnknownCommand
    ) {
        assert_eq!(command.runs, 0, "command ran on a rejected line");
    }
    if data.len() > 256 {
        assert_eq!(status, ShellStatus::TooLong);
    }
});
