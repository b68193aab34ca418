//! Adapters: platform implementations behind the dispatcher's ports.
//!
//! | Adapter   | Provides                | Connects to                 |
//! |-----------|-------------------------|-----------------------------|
//! | `console` | `fmt::Write`, line input | UART / USB-CDC or terminal |
//! | `time`    | `DelayNs`, uptime        | ESP32 timer / std clock    |

pub mod console;
pub mod time;
