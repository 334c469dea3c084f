pub mod candidate;
pub mod supplier;

pub use candidate::*;
pub use supplier::*;
