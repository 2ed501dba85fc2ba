//! Core math modules.

pub mod normal;
pub mod proportion;
pub mod ratio;
