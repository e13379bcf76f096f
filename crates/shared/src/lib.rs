//! Types shared by the register service, its client and the console.

pub mod domain;
pub mod error;
pub mod protocol;
