// src/lib.rs

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod flow;
pub mod gate;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod scoring;
pub mod state;
pub mod storage;
pub mod utils;

pub use routes::create_router;
