//! Command implementations for the relay CLI

pub mod check;
pub mod serve;
