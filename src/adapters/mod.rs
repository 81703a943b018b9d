//! Adapters implementing the port traits.
//!
//! `live` touches the real disk, `recording` wraps another adapter and
//! captures every call into a cassette, and `replaying` serves calls back
//! from a cassette.

pub mod live;
pub mod recording;
pub mod replaying;
