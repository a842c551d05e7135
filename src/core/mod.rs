//! Core support systems

pub mod logging;
