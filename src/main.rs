//! AMG8833 Shell: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StdinLines ──line──▶ Shell ──args──▶ Amg8833Command         │
//! │                                          │        │          │
//! │                               SimAmg8833 │        │ Bridge   │
//! │                            (SensorDriver)│        │ IntPin   │
//! │                                          ▼        ▼          │
//! │  StdoutConsole ◀── report_to_console ◀── INT_SLOT.on_edge()  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads one command per line from stdin (the UART console on ESP-IDF,
//! the terminal on the host), prints the command output and the status
//! diagnostic, then sleeps for the configured poll interval. Set
//! `AMG8833_SHELL_CONFIG` to a JSON file to override the timing.
#![deny(unused_must_use)]

use core::fmt::Write;

use anyhow::{anyhow, Context, Result};
use embedded_hal::delay::DelayNs;
use log::{debug, info};

use amg8833_shell::adapters::console::{StdinLines, StdoutConsole};
use amg8833_shell::adapters::time::SystemDelay;
use amg8833_shell::app::ports::StatusCallback;
use amg8833_shell::app::service::Amg8833Command;
use amg8833_shell::config::ShellConfig;
use amg8833_shell::drivers::amg8833_sim::SimAmg8833;
use amg8833_shell::drivers::int_pin::IntPin;
use amg8833_shell::irq::bridge::{InterruptBridge, INT_SLOT};
use amg8833_shell::irq::decoder::{self, InterruptStatus};
use amg8833_shell::shell::Shell;

/// Environment variable naming an optional JSON config file.
const CONFIG_ENV: &str = "AMG8833_SHELL_CONFIG";

/// Status callback handed to the driver in interrupt mode. Runs in the
/// IRQ path: prints straight to the console, reads the table once.
fn report_to_console(status: InterruptStatus) {
    let mut console = StdoutConsole::new();
    if decoder::report_status(status, &mut SimAmg8833::new(), &mut console).is_err() {
        log::warn!("irq: console write failed");
    }
}

fn load_config() -> Result<ShellConfig> {
    let Ok(path) = std::env::var(CONFIG_ENV) else {
        info!("Config: defaults ({} not set)", CONFIG_ENV);
        return Ok(ShellConfig::default());
    };
    let text =
        std::fs::read_to_string(&path).with_context(|| format!("reading config {}", path))?;
    let config: ShellConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path))?;
    info!("Config loaded from {}", path);
    Ok(config)
}

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;

    info!("AMG8833 shell v{} (simulated sensor)", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    config.validate()?;

    let bridge = InterruptBridge::new(&INT_SLOT, IntPin::new())
        .ok_or_else(|| anyhow!("INT slot already claimed"))?;
    let mut command = Amg8833Command::new(
        SimAmg8833::new(),
        bridge,
        SystemDelay::new(),
        config.clone(),
        StatusCallback::new(report_to_console),
    );

    let mut shell = Shell::new(config.max_line_len);
    shell.register(&mut command)?;

    let mut clock = SystemDelay::new();
    let mut console = StdoutConsole::new();
    let mut lines = StdinLines::stdin();

    writeln!(console, "amg8833: welcome to the amg8833 shell. type \"amg8833 -h\" for help.")?;

    loop {
        console.flush();
        let Some(line) = lines.next_line().context("reading stdin")? else {
            break;
        };
        if line.iter().all(|b| b.is_ascii_whitespace() || *b == 0) {
            continue;
        }

        let started = clock.uptime_us();
        let status = shell.parse(line, &mut console);
        if let Some(diagnostic) = status.diagnostic() {
            writeln!(console, "{}", diagnostic)?;
        }
        debug!("shell: status {} after {} ms", status.code(), clock.elapsed_ms(started));

        clock.delay_ms(config.poll_interval_ms);
    }

    console.flush();
    info!("shell: end of input");
    Ok(())
}
