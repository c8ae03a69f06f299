// src/handlers/mod.rs

pub mod generator;
pub mod profile;
pub mod quiz;
