mod core;
mod matches;

pub use self::core::*;
pub use matches::*;
