//! IO modules - file egress for event payloads
//!
//! Event transport (MQTT publish, persistence) lives outside this crate; the
//! only IO here is the JSONL sink the replay binary writes to.

pub mod egress;

pub use egress::EventLog;
