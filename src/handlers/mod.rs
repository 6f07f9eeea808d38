// src/handlers/mod.rs

pub mod control;

pub use control::{health_handler, method_not_allowed, start_handler, stop_handler, StartRequest};
