// src/lib.rs

//! ruHungry free-food event aggregator library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
