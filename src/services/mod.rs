// src/services/mod.rs

pub mod aggregator;
pub mod engine;
pub mod evaluation;
pub mod generator;
pub mod pipeline;
pub mod progression;

pub use engine::LearningEngine;
