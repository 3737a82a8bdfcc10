pub mod count;

pub use count::{BreakdownEntry, CountOptions, CountRecord};
