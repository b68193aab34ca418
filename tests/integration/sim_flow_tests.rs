//! End-to-end tests against the simulated sensor.
//!
//! These use the process-wide `INT_SLOT`, the simulated INT pin and the
//! simulated chip, all of which are statics, so every test takes `LOCK`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use amg8833_shell::app::ports::StatusCallback;
use amg8833_shell::app::service::Amg8833Command;
use amg8833_shell::config::ShellConfig;
use amg8833_shell::drivers::amg8833_sim::SimAmg8833;
use amg8833_shell::drivers::int_pin::IntPin;
use amg8833_shell::irq::bridge::{InterruptBridge, INT_SLOT};
use amg8833_shell::irq::decoder::{self, InterruptStatus};

use crate::mock_hw::MockDelay;

static LOCK: Mutex<()> = Mutex::new(());
static REPORTS: Mutex<String> = Mutex::new(String::new());

fn serial() -> MutexGuard<'static, ()> {
    LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

fn record_report(status: InterruptStatus) {
    let mut reports = REPORTS.lock().unwrap_or_else(PoisonError::into_inner);
    decoder::report_status(status, &mut SimAmg8833::new(), &mut *reports).unwrap();
}

fn sim_command() -> Amg8833Command<SimAmg8833, IntPin, MockDelay> {
    SimAmg8833::new().reset();
    REPORTS.lock().unwrap_or_else(PoisonError::into_inner).clear();
    let bridge = InterruptBridge::new(&INT_SLOT, IntPin::new()).expect("INT slot free");
    Amg8833Command::new(
        SimAmg8833::new(),
        bridge,
        MockDelay::default(),
        ShellConfig::default(),
        StatusCallback::new(record_report),
    )
}

fn run(command: &mut Amg8833Command<SimAmg8833, IntPin, MockDelay>, line: &str) -> (u8, String) {
    let args: Vec<&str> = line.split_whitespace().collect();
    let mut out = String::new();
    let status = command.execute(&args, &mut out);
    (status.code(), out)
}

#[test]
fn polled_read_prints_walking_hotspot() {
    let _g = serial();
    let mut command = sim_command();
    let (code, out) = run(&mut command, "amg8833 -c read 0 2");
    assert_eq!(code, 0);

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 18);
    // Frame 1: hotspot at row 0, column 1.
    assert_eq!(lines[0], "28.50  31.50  28.50  25.50  23.50  23.50  23.50  23.50");
    assert!(lines[8].starts_with("amg8833: temperature is 23."));
    assert!(SimAmg8833::new().is_idle());
}

#[test]
fn threshold_outbreak_is_reported_through_the_bridge() {
    let _g = serial();
    let mut command = sim_command();
    let delivered_before = INT_SLOT.delivered_edges();

    let (code, out) = run(&mut command, "amg8833 -c int 0 3 abs 30 0 1");
    assert_eq!(code, 0);
    assert!(out.starts_with("amg8833: absolute mode.\n"));
    assert_eq!(out.lines().filter(|l| l.starts_with("amg8833: temperature is")).count(), 3);

    let reports = REPORTS.lock().unwrap_or_else(PoisonError::into_inner).clone();
    let lines: Vec<&str> = reports.lines().collect();
    assert_eq!(lines[0], "amg8833: irq interrupt outbreak.");
    // Frame 1 trips only the hotspot pixel at row 0, column 1.
    assert_eq!(lines[1], "0 1 0 0 0 0 0 0");
    assert!(lines[2..9].iter().all(|l| *l == "0 0 0 0 0 0 0 0"));

    assert!(INT_SLOT.delivered_edges() > delivered_before);
    assert!(!INT_SLOT.is_armed());
    assert!(!IntPin::sim_enabled());
    assert!(SimAmg8833::new().is_idle());
}

#[test]
fn self_tests_pass_against_the_model() {
    let _g = serial();
    let mut command = sim_command();
    assert_eq!(run(&mut command, "amg8833 -t reg 1").0, 0);
    assert_eq!(run(&mut command, "amg8833 -t read 0 3").0, 0);
    let (code, out) = run(&mut command, "amg8833 -t int 0 5 diff 2 -2 1");
    assert_eq!(code, 0);
    assert_eq!(out, "amg8833: difference mode.\n");
    assert!(!INT_SLOT.is_armed());
    assert!(REPORTS.lock().unwrap_or_else(PoisonError::into_inner).is_empty());
}
