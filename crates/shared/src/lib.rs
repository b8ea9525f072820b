//! Wire model shared by the taskboard client crates.

pub mod domain;
pub mod error;
pub mod protocol;
