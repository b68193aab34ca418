//! Application core: command parsing and dispatch, zero direct I/O.
//!
//! The dispatcher sequences driver calls and the interrupt bridge for one
//! shell invocation. All interaction with hardware happens through the
//! **port traits** in [`ports`], so the whole layer runs against mocks.

pub mod commands;
pub mod ports;
pub mod service;
