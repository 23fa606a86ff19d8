//! Ports (hexagonal boundaries) for the trust gate.

pub mod outbound;

pub use outbound::{ManualTimeSource, SystemTimeSource, TimeSource};
