//! Guidance engines
//!
//! - [`geometry`]: stateless spherical-earth math
//! - [`lnav`]: the hold-entry transition and predicted-path types
//! - [`vnav`]: the vertical profile driver and its builder contracts
//! - [`types`]: units, positions and the control-law output type

pub mod geometry;
pub mod lnav;
pub mod types;
pub mod vnav;

pub use types::{AircraftState, LateralGuidance};
