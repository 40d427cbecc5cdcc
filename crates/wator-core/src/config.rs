//! Configuration types for the simulation.

use crate::error::{Error, Result};
use crate::types::Species;
use serde::{Deserialize, Serialize};

/// Planet dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Width of the planet grid (columns)
    pub width: i32,
    /// Height of the planet grid (rows)
    pub height: i32,
}

impl WorldConfig {
    pub fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
        }
    }
}

/// Fixed per-species constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesConfig {
    /// Chronons between prey reproductions
    pub prey_reproduction_time: i32,
    /// Chronons between predator reproductions
    pub predator_reproduction_time: i32,
    /// Energy a predator starts with
    pub predator_initial_energy: i32,
    /// Energy a predator gains per prey eaten
    pub predator_food_value: i32,
}

impl SpeciesConfig {
    /// Reproduction period for the given species.
    pub fn reproduction_time(&self, species: Species) -> i32 {
        match species {
            Species::Prey => self.prey_reproduction_time,
            Species::Predator => self.predator_reproduction_time,
        }
    }

    /// Starting energy for the given species. Prey carry none.
    pub fn initial_energy(&self, species: Species) -> Option<i32> {
        match species {
            Species::Prey => None,
            Species::Predator => Some(self.predator_initial_energy),
        }
    }
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            prey_reproduction_time: 5,
            predator_reproduction_time: 20,
            predator_initial_energy: 15,
            predator_food_value: 5,
        }
    }
}

/// Population seeding and capacity limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Prey placed at simulation start
    pub initial_prey: usize,
    /// Predators placed at simulation start
    pub initial_predators: usize,
    /// Hard cap on total live entities
    pub max_entities: usize,
    /// Entities of the dominant species removed per balancing pass
    pub purge_count: usize,
}

impl PopulationConfig {
    /// Population level at which balancing kicks in (90% of the cap).
    pub fn high_water_mark(&self) -> usize {
        self.max_entities * 9 / 10
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_prey: 30,
            initial_predators: 50,
            max_entities: 500,
            purge_count: 50,
        }
    }
}

/// Full simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Planet dimensions
    pub world: WorldConfig,
    /// Species constants
    pub species: SpeciesConfig,
    /// Population limits
    pub population: PopulationConfig,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.world.width < 1 || self.world.height < 1 {
            return Err(Error::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.world.width, self.world.height
            )));
        }
        if self.species.prey_reproduction_time < 1 || self.species.predator_reproduction_time < 1 {
            return Err(Error::InvalidConfig(
                "reproduction times must be at least 1".to_string(),
            ));
        }
        if self.species.predator_initial_energy < 1 {
            return Err(Error::InvalidConfig(
                "predator initial energy must be at least 1".to_string(),
            ));
        }
        if self.population.max_entities > self.world.cell_count() {
            return Err(Error::InvalidConfig(format!(
                "max_entities {} exceeds grid capacity {}",
                self.population.max_entities,
                self.world.cell_count()
            )));
        }
        if self.population.initial_prey + self.population.initial_predators
            > self.population.max_entities
        {
            return Err(Error::InvalidConfig(
                "initial population exceeds max_entities".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            world: WorldConfig::default(),
            species: SpeciesConfig::default(),
            population: PopulationConfig::default(),
        }
    }
}
