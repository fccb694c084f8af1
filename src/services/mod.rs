// src/services/mod.rs

pub mod attempt_service;
pub mod quiz_service;
pub mod stats_service;
