//! Infrastructure: zones document loading and injectable clocks

pub mod clock;
pub mod config;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ZoneEntry, ZonesDocument};
