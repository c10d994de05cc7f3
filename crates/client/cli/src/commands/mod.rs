//! Command implementations for battle-sim
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod balance;
mod catalog;
mod simulate;

pub use balance::Balance;
pub use catalog::Catalog;
pub use simulate::Simulate;
