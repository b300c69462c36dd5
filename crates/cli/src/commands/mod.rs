pub mod compare;
pub mod extract;

pub use compare::*;
pub use extract::*;
