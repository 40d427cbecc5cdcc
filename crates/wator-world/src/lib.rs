//! Wa-Tor world simulation engine.
//!
//! This crate implements the predator-prey cellular automaton: a bounded
//! 2D grid of prey and predators that move, reproduce, eat, and starve
//! over discrete chronons.

pub mod entity;
pub mod grid;
pub mod simulation;

pub use entity::{Entity, EntityData};
pub use grid::Grid;
pub use simulation::{Census, Simulation, SimulationReport};
