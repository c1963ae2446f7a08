// src/models/mod.rs

pub mod assessment;
pub mod progress;
pub mod submission;
pub mod user;
