//! Durable state: latest-per-channel table, append log + cursor, occupancy.

pub mod journal;
pub mod latest;
pub mod occupancy;
