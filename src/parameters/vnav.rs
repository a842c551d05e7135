//! Vertical profile parameter definitions
//!
//! # Parameters
//!
//! - `VNAV_CLB_EN` - Compute the climb profile when the geometry changes

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

const DEFAULT_CLIMB_PROFILE_ENABLED: bool = true;

/// Vertical profile configuration consumed by the driver
#[derive(Clone, Copy, Debug)]
pub struct VnavConfig {
    /// Compute the climb profile when the geometry changes; descent and
    /// approach profiles are always computed
    pub calculate_climb_profile: bool,
}

impl Default for VnavConfig {
    fn default() -> Self {
        Self {
            calculate_climb_profile: DEFAULT_CLIMB_PROFILE_ENABLED,
        }
    }
}

/// Vertical profile parameters loaded from the parameter store
#[derive(Clone, Copy, Debug)]
pub struct VnavParams {
    /// Climb profile computation enabled (VNAV_CLB_EN)
    pub climb_profile_enabled: bool,
}

impl Default for VnavParams {
    fn default() -> Self {
        Self {
            climb_profile_enabled: DEFAULT_CLIMB_PROFILE_ENABLED,
        }
    }
}

impl VnavParams {
    /// Register vertical profile parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register(
            "VNAV_CLB_EN",
            ParamValue::Bool(DEFAULT_CLIMB_PROFILE_ENABLED),
            ParamFlags::empty(),
        )
    }

    /// Load vertical profile parameters from the parameter store
    pub fn from_store(store: &ParameterStore) -> Self {
        let climb_profile_enabled = match store.get("VNAV_CLB_EN") {
            Some(ParamValue::Bool(enabled)) => *enabled,
            Some(ParamValue::Int(value)) => *value != 0,
            _ => DEFAULT_CLIMB_PROFILE_ENABLED,
        };
        Self {
            climb_profile_enabled,
        }
    }

    /// Convert to the `VnavConfig` consumed by the driver
    pub fn to_config(&self) -> VnavConfig {
        VnavConfig {
            calculate_climb_profile: self.climb_profile_enabled,
        }
    }
}
