pub mod macros;

pub mod config;
pub mod engine;
pub mod events;
pub mod geometry;
pub mod menu;
pub mod sys;
