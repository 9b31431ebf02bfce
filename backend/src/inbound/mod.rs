//! Driving adapters: interfaces through which the outside world reaches the
//! domain.

pub mod http;
