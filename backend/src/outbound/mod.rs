//! Driven adapters: implementations of the domain's repository ports.

pub mod memory;
pub mod persistence;
