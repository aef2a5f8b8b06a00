pub mod expiry;
pub mod model;

pub use expiry::*;
pub use model::*;
