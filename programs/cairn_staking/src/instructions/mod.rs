// programs/cairn_staking/src/instructions/mod.rs

pub mod allocation;
pub mod deposit;
pub mod initialize;
pub mod products;
pub mod views;

pub use allocation::*;
pub use deposit::*;
pub use initialize::*;
pub use products::*;
pub use views::*;
