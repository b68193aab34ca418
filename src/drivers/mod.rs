//! Sensor-facing drivers: the INT line and the simulated AMG8833.

pub mod amg8833_sim;
pub mod int_pin;
