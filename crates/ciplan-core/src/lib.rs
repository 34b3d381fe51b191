pub mod surface;
pub mod types;

pub use surface::*;
pub use types::*;
