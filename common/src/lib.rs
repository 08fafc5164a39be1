//! Code shared between the robot program and anything that reads or writes its store

pub mod error;
pub mod store;
pub mod types;
