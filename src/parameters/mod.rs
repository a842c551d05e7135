//! Runtime configuration
//!
//! An in-memory parameter store plus typed parameter blocks loaded from it.
//! Parameters configure the ambient behavior of the guidance engines; the
//! spherical geometry and classification policies themselves are fixed.
//!
//! Values live only for the process lifetime. There is no persistence layer:
//! guidance state and configuration are rebuilt when the owning system
//! restarts.

pub mod error;
pub mod storage;
pub mod vnav;

pub use error::ParameterError;
pub use storage::{ParamFlags, ParamValue, ParameterStore};
