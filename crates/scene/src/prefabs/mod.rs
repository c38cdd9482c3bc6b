pub mod globe;
pub mod solar_system;

pub use globe::*;
pub use solar_system::*;
