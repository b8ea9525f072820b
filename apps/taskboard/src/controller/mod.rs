//! Controller layer: mounted views and intent routing.

pub mod orchestration;
pub mod view;
