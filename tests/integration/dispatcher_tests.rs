//! Integration tests for the `amg8833` command dispatcher.
//!
//! Each test drives `Amg8833Command::execute` with a token list and checks
//! the returned status, the printed output and the exact hardware call
//! sequence recorded by the mocks.

use amg8833_shell::app::commands::InterruptMode;
use amg8833_shell::app::service::Phase;

use crate::mock_hw::{call_log, count, rig, rig_with, run, HwCall, MockDriver, MockLine};

const TEMPERATURE_LINE: &str = "amg8833: temperature is 23.500C.";

fn temperature_lines(out: &str) -> usize {
    out.lines().filter(|l| *l == TEMPERATURE_LINE).count()
}

// ── Validation ────────────────────────────────────────────────

#[test]
fn malformed_invocations_touch_no_hardware() {
    let cases = [
        "amg8833 -t",
        "amg8833 -x",
        "amg8833 -i extra",
        "amg8833 -t reg",
        "amg8833 -t reg 2",
        "amg8833 -t read 0",
        "amg8833 -t bogus 0 1",
        "amg8833 -c read 7 3",
        "amg8833 -c int 0 3 abs 30 20",
        "amg8833 -c int 0 3 both 30 20 1",
        "amg8833 -t int 2 3 abs 30 20 1",
        "amg8833 -c int 0 3 abs 30 20 1 9",
    ];
    for line in cases {
        let (mut command, log) = rig();
        let (code, out) = run(&mut command, line);
        assert_eq!(code, 5, "{line}");
        assert!(log.borrow().is_empty(), "{line} made hardware calls: {:?}", log.borrow());
        assert!(out.is_empty(), "{line} printed {out:?}");
        assert!(!command.bridge().is_armed());
        assert_eq!(command.phase(), Phase::Done);
    }
}

// ── Informational modes ───────────────────────────────────────

#[test]
fn info_prints_chip_description() {
    let (mut command, log) = rig();
    let (code, out) = run(&mut command, "amg8833 -i");
    assert_eq!(code, 0);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        [
            "amg8833: chip is Panasonic AMG8833.",
            "amg8833: manufacturer is Panasonic.",
            "amg8833: interface is IIC.",
            "amg8833: driver version is 1.0.",
            "amg8833: min supply voltage is 3.0V.",
            "amg8833: max supply voltage is 3.6V.",
            "amg8833: max current is 4.50mA.",
            "amg8833: max temperature is 80.0C.",
            "amg8833: min temperature is 0.0C.",
        ]
    );
    assert!(log.borrow().is_empty());
}

#[test]
fn help_is_the_default() {
    for line in ["amg8833", "amg8833 -h"] {
        let (mut command, log) = rig();
        let (code, out) = run(&mut command, line);
        assert_eq!(code, 0);
        assert!(out.contains("amg8833 -c int (0 | 1)"));
        assert!(log.borrow().is_empty());
    }
}

#[test]
fn pin_map_names_each_signal() {
    let (mut command, _log) = rig();
    let (code, out) = run(&mut command, "amg8833 -p");
    assert_eq!(code, 0);
    assert_eq!(
        out,
        "amg8833: SCL connected to GPIO15.\n\
         amg8833: SDA connected to GPIO14.\n\
         amg8833: INT connected to GPIO16.\n"
    );
}

// ── Self tests ────────────────────────────────────────────────

#[test]
fn register_test_calls_driver_once_per_address() {
    for (arg, addr) in [("0", 0x68), ("1", 0x69)] {
        let (mut command, log) = rig();
        let (code, _) = run(&mut command, &format!("amg8833 -t reg {arg}"));
        assert_eq!(code, 0);
        assert_eq!(*log.borrow(), [HwCall::RegisterTest(addr)]);
    }
}

#[test]
fn failing_self_test_reports_run_failed() {
    let log = call_log();
    let mut driver = MockDriver::new(&log);
    driver.fail_test = true;
    let mut command = rig_with(driver, MockLine::new(&log));

    assert_eq!(run(&mut command, "amg8833 -t reg 0").0, 1);
    assert_eq!(run(&mut command, "amg8833 -t read 1 4").0, 1);
    assert_eq!(
        *log.borrow(),
        [HwCall::RegisterTest(0x68), HwCall::ReadTest { addr: 0x69, times: 4 }]
    );
}

#[test]
fn interrupt_test_arms_around_the_driver_test() {
    let (mut command, log) = rig();
    let (code, out) = run(&mut command, "amg8833 -t int 0 2 diff 5 -5 1.5");
    assert_eq!(code, 0);
    assert_eq!(out, "amg8833: difference mode.\n");
    assert_eq!(
        *log.borrow(),
        [
            HwCall::LineEnable,
            HwCall::InterruptTest { addr: 0x68, times: 2 },
            HwCall::LineDisable,
        ]
    );

    let params = command.driver().last_params.unwrap();
    assert_eq!(params.mode, InterruptMode::Differential);
    assert_eq!((params.high, params.low, params.hysteresis), (5.0, -5.0, 1.5));
    assert_eq!(command.driver().test_irq_handler_requests.get(), 1);
    assert_eq!(command.driver().irq_handler_requests.get(), 0);
    assert!(!command.bridge().is_armed());
}

#[test]
fn interrupt_test_disarms_even_when_the_test_fails() {
    let log = call_log();
    let mut driver = MockDriver::new(&log);
    driver.fail_test = true;
    let mut command = rig_with(driver, MockLine::new(&log));

    assert_eq!(run(&mut command, "amg8833 -t int 1 3 abs 30 20 1").0, 1);
    assert_eq!(count(&log, &HwCall::LineEnable), 1);
    assert_eq!(count(&log, &HwCall::LineDisable), 1);
    assert!(!command.bridge().is_armed());
    assert!(!command.bridge().slot().is_armed());
}

#[test]
fn interrupt_test_does_not_run_when_arming_fails() {
    let log = call_log();
    let mut line = MockLine::new(&log);
    line.fail_enable = true;
    let mut command = rig_with(MockDriver::new(&log), line);

    let (code, out) = run(&mut command, "amg8833 -t int 0 3 abs 30 20 1");
    assert_eq!(code, 1);
    assert_eq!(out, "amg8833: absolute mode.\n");
    assert_eq!(*log.borrow(), [HwCall::LineEnable, HwCall::LineDisable]);
    assert!(!command.bridge().slot().is_armed());
}

// ── Continuous polled read ────────────────────────────────────

#[test]
fn continuous_read_reports_every_iteration() {
    let (mut command, log) = rig();
    let (code, out) = run(&mut command, "amg8833 -c read 0 3");
    assert_eq!(code, 0);
    assert_eq!(temperature_lines(&out), 3);
    // Three frames of 8 rows plus three temperature lines.
    assert_eq!(out.lines().count(), 3 * 9);
    assert!(out.starts_with("23.50  23.50  23.50  23.50  23.50  23.50  23.50  23.50\n"));

    let mut expected = vec![HwCall::BasicInit(0x68)];
    for _ in 0..3 {
        expected.push(HwCall::ReadArray);
        expected.push(HwCall::ReadTemperature);
    }
    expected.push(HwCall::BasicDeinit);
    assert_eq!(*log.borrow(), expected);

    // Settle once, then one pause per report.
    assert_eq!(command.delay().delays_ms, [1000, 1000, 1000, 1000]);
    assert_eq!(command.phase(), Phase::Done);
}

#[test]
fn continuous_read_with_zero_or_negative_times_still_tears_down() {
    for line in ["amg8833 -c read 1 0", "amg8833 -c read 1 -3", "amg8833 -c read 1 abc"] {
        let (mut command, log) = rig();
        let (code, out) = run(&mut command, line);
        assert_eq!(code, 0, "{line}");
        assert!(out.is_empty());
        assert_eq!(*log.borrow(), [HwCall::BasicInit(0x69), HwCall::BasicDeinit]);
    }
}

#[test]
fn continuous_read_stops_at_first_failed_array_read() {
    for k in 0..4u32 {
        let log = call_log();
        let mut driver = MockDriver::new(&log);
        driver.fail_array_at = Some(k);
        let mut command = rig_with(driver, MockLine::new(&log));

        let (code, out) = run(&mut command, "amg8833 -c read 0 4");
        assert_eq!(code, 1, "failure at {k}");
        assert_eq!(temperature_lines(&out), k as usize);
        assert!(out.ends_with("amg8833: read temperature array failed.\n"));
        assert_eq!(count(&log, &HwCall::BasicDeinit), 1);
        assert_eq!(log.borrow().last(), Some(&HwCall::BasicDeinit));
    }
}

#[test]
fn continuous_read_stops_at_failed_thermistor_read() {
    let log = call_log();
    let mut driver = MockDriver::new(&log);
    driver.fail_temperature_at = Some(1);
    let mut command = rig_with(driver, MockLine::new(&log));

    let (code, out) = run(&mut command, "amg8833 -c read 0 5");
    assert_eq!(code, 1);
    assert_eq!(temperature_lines(&out), 1);
    assert!(out.ends_with("amg8833: read temperature failed.\n"));
    assert_eq!(count(&log, &HwCall::ReadArray), 2);
    assert_eq!(count(&log, &HwCall::BasicDeinit), 1);
}

#[test]
fn failed_init_skips_loop_and_teardown() {
    let log = call_log();
    let mut driver = MockDriver::new(&log);
    driver.fail_init = true;
    let mut command = rig_with(driver, MockLine::new(&log));

    let (code, out) = run(&mut command, "amg8833 -c read 0 3");
    assert_eq!(code, 1);
    assert!(out.is_empty());
    assert_eq!(*log.borrow(), [HwCall::BasicInit(0x68)]);
    assert!(command.delay().delays_ms.is_empty());
}

#[test]
fn teardown_failure_does_not_change_the_status() {
    let log = call_log();
    let mut driver = MockDriver::new(&log);
    driver.fail_deinit = true;
    let mut command = rig_with(driver, MockLine::new(&log));

    assert_eq!(run(&mut command, "amg8833 -c read 0 2").0, 0);
    assert_eq!(run(&mut command, "amg8833 -c int 0 2 abs 30 20 1").0, 0);
    assert!(!command.bridge().is_armed());
}

// ── Continuous interrupt read ─────────────────────────────────

#[test]
fn interrupt_read_arms_before_init_and_disarms_after_deinit() {
    let (mut command, log) = rig();
    let (code, out) = run(&mut command, "amg8833 -c int 1 3 abs 30 20 1");
    assert_eq!(code, 0);

    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "amg8833: absolute mode.");
    assert_eq!(&lines[1..], [TEMPERATURE_LINE; 3]);

    assert_eq!(
        *log.borrow(),
        [
            HwCall::LineEnable,
            HwCall::InterruptInit(0x69),
            HwCall::InterruptReadTemperature,
            HwCall::InterruptReadTemperature,
            HwCall::InterruptReadTemperature,
            HwCall::InterruptDeinit,
            HwCall::LineDisable,
        ]
    );
    assert_eq!(command.driver().irq_handler_requests.get(), 1);
    assert_eq!(command.driver().test_irq_handler_requests.get(), 0);
    assert!(!command.bridge().is_armed());
    assert_eq!(command.delay().delays_ms, [1000, 1000, 1000, 1000]);
}

#[test]
fn interrupt_read_without_line_never_inits_the_chip() {
    let log = call_log();
    let mut line = MockLine::new(&log);
    line.fail_enable = true;
    let mut command = rig_with(MockDriver::new(&log), line);

    let (code, _) = run(&mut command, "amg8833 -c int 0 3 diff 2 -2 0");
    assert_eq!(code, 1);
    assert_eq!(count(&log, &HwCall::InterruptInit(0x68)), 0);
    assert!(!command.bridge().slot().is_armed());
}

#[test]
fn interrupt_read_disarms_when_init_fails() {
    let log = call_log();
    let mut driver = MockDriver::new(&log);
    driver.fail_init = true;
    let mut command = rig_with(driver, MockLine::new(&log));

    assert_eq!(run(&mut command, "amg8833 -c int 0 3 abs 30 20 1").0, 1);
    assert_eq!(
        *log.borrow(),
        [HwCall::LineEnable, HwCall::InterruptInit(0x68), HwCall::LineDisable]
    );
    assert!(!command.bridge().is_armed());
}

#[test]
fn interrupt_read_failure_ends_the_loop() {
    let log = call_log();
    let mut driver = MockDriver::new(&log);
    driver.fail_temperature_at = Some(2);
    let mut command = rig_with(driver, MockLine::new(&log));

    let (code, out) = run(&mut command, "amg8833 -c int 0 10 abs 30 20 1");
    assert_eq!(code, 1);
    assert_eq!(temperature_lines(&out), 2);
    assert!(out.ends_with("amg8833: read temperature failed.\n"));
    assert_eq!(count(&log, &HwCall::InterruptReadTemperature), 3);

    let calls = log.borrow();
    let tail = &calls[calls.len() - 2..];
    assert_eq!(tail, [HwCall::InterruptDeinit, HwCall::LineDisable]);
}

#[test]
fn enables_and_disables_balance_across_invocations() {
    let (mut command, log) = rig();
    for line in [
        "amg8833 -t int 0 1 abs 30 20 1",
        "amg8833 -c int 1 2 diff 3 -3 1",
        "amg8833 -c read 0 1",
        "amg8833 -t int 1 1 diff 3 -3 1",
    ] {
        assert_eq!(run(&mut command, line).0, 0, "{line}");
    }
    assert_eq!(count(&log, &HwCall::LineEnable), 3);
    assert_eq!(count(&log, &HwCall::LineDisable), 3);
}
