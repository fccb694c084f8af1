// src/handlers/mod.rs

pub mod attempt;
pub mod meta;
pub mod quiz;
pub mod stats;
