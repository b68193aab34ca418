//! Interrupt path: the ISR-to-handler bridge and the event decoder that
//! the armed handler's status callback feeds.

pub mod bridge;
pub mod decoder;
