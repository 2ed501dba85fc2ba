//! Order funnel analytics math utilities.

pub mod math;

pub use math::normal::*;
pub use math::proportion::*;
pub use math::ratio::*;
