pub mod identity;
pub mod qa;

pub use identity::*;
pub use qa::*;
