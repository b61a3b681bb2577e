// programs/cairn_master/src/instructions/mod.rs

pub mod emergency;
pub mod initialize;
pub mod registry;
pub mod upgrade;

pub use emergency::*;
pub use initialize::*;
pub use registry::*;
pub use upgrade::*;
