//! Simulation engine driving the chronon loop.

use crate::entity::{Entity, EntityData};
use crate::grid::Grid;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info, trace, warn};
use wator_core::{Direction, EntityId, Error, Position, Result, SimulationConfig, Species};

/// Random placement gives up after this many occupied cells in a row.
const MAX_SPAWN_ATTEMPTS: u32 = 100;

/// The Wa-Tor engine: owns the planet grid, the config, and one seeded RNG
/// so a run is reproducible from its seed.
pub struct Simulation {
    grid: Grid,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    chronon: u64,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let grid = Grid::new(config.world.width, config.world.height);

        let mut sim = Self {
            grid,
            config,
            rng,
            chronon: 0,
        };

        let initial_prey = sim.config.population.initial_prey;
        let initial_predators = sim.config.population.initial_predators;
        sim.seed_population(Species::Prey, initial_prey)?;
        sim.seed_population(Species::Predator, initial_predators)?;

        Ok(sim)
    }

    fn seed_population(&mut self, species: Species, count: usize) -> Result<()> {
        for _ in 0..count {
            match self.add_entity(species) {
                Ok(_) => {}
                Err(err @ Error::NoSpaceAvailable { .. }) => {
                    warn!(%species, %err, "skipping initial spawn");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn chronon(&self) -> u64 {
        self.chronon
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Snapshot of every live entity, for rendering and reporting.
    pub fn entities(&self) -> Vec<EntityData> {
        self.grid
            .entities_snapshot()
            .iter()
            .filter_map(|id| self.grid.entity(*id))
            .map(EntityData::from)
            .collect()
    }

    pub fn census(&self) -> Census {
        let prey = self.grid.count_species(Species::Prey);
        let predators = self.grid.count_species(Species::Predator);
        Census {
            prey,
            predators,
            total: prey + predators,
        }
    }

    /// Place a new entity of the given kind on a uniformly random empty
    /// cell, retrying on collisions up to a fixed budget.
    ///
    /// `NoSpaceAvailable` is recoverable: callers skip the spawn. The
    /// engine's capacity check before reproduction keeps this path away
    /// from near-full grids.
    pub fn add_entity(&mut self, species: Species) -> Result<EntityId> {
        for _ in 0..MAX_SPAWN_ATTEMPTS {
            let row = self.rng.gen_range(0..self.grid.height);
            let col = self.rng.gen_range(0..self.grid.width);
            let position = Position::new(row, col);

            if self.grid.is_empty(position) {
                let entity = Entity::new(species, position, &self.config.species);
                return self.grid.place(entity, position);
            }
        }

        Err(Error::NoSpaceAvailable {
            attempts: MAX_SPAWN_ATTEMPTS,
        })
    }

    /// Place a new entity on a specific cell. Deterministic counterpart of
    /// [`add_entity`](Self::add_entity) for scripted setups.
    pub fn spawn_at(&mut self, species: Species, position: Position) -> Result<EntityId> {
        let entity = Entity::new(species, position, &self.config.species);
        self.grid.place(entity, position)
    }

    /// Move to the first empty adjacent cell in priority order, then
    /// reproduce into the vacated cell if the countdown has elapsed and
    /// the planet is below capacity.
    ///
    /// The countdown decrements every chronon the entity does not
    /// reproduce, whether or not it managed to move. On a grid with no
    /// reachable neighbor (1x1) the entity simply never moves.
    pub fn move_and_reproduce(&mut self, id: EntityId, priority: &[Direction]) -> Result<()> {
        let Some(entity) = self.grid.entity(id) else {
            return Ok(());
        };
        let origin = entity.position;

        let destination = priority
            .iter()
            .map(|dir| origin.offset(*dir))
            .find(|pos| self.grid.is_empty(*pos));

        match destination {
            Some(dest) => {
                self.grid.move_entity(id, dest)?;
                self.reproduce_into(id, origin)?;
            }
            None => {
                if let Some(entity) = self.grid.entity_mut(id) {
                    entity.reproduction_countdown -= 1;
                }
            }
        }
        Ok(())
    }

    /// Spawn offspring into the cell the parent just vacated, when the
    /// parent is eligible and the population is below the cap; otherwise
    /// tick the parent's countdown down by one.
    fn reproduce_into(&mut self, parent: EntityId, origin: Position) -> Result<()> {
        let Some(entity) = self.grid.entity(parent) else {
            return Ok(());
        };
        let species = entity.species;

        if entity.can_reproduce()
            && self.grid.live_count() < self.config.population.max_entities
        {
            let offspring = Entity::new(species, origin, &self.config.species);
            let offspring_id = self.grid.place(offspring, origin)?;
            if let Some(entity) = self.grid.entity_mut(parent) {
                entity.reset_reproduction_countdown(&self.config.species);
            }
            debug!(%species, parent = %parent, offspring = %offspring_id, at = %origin, "entity reproduced");
        } else if let Some(entity) = self.grid.entity_mut(parent) {
            entity.reproduction_countdown -= 1;
        }
        Ok(())
    }

    /// Prey only move and reproduce.
    pub fn perform_prey_action(&mut self, id: EntityId, priority: &[Direction]) -> Result<()> {
        self.move_and_reproduce(id, priority)
    }

    /// Live prey on the predator's orthogonal neighbor cells, in fixed
    /// N, S, W, E scan order. The engine always eats the first match, so
    /// tie-breaking between several adjacent prey is deterministic.
    pub fn surrounding_prey(&self, id: EntityId) -> Vec<Position> {
        let Some(entity) = self.grid.entity(id) else {
            return Vec::new();
        };
        self.grid
            .neighbors4(entity.position)
            .into_iter()
            .filter(|pos| {
                self.grid
                    .entity_at(*pos)
                    .map(|e| e.is_prey())
                    .unwrap_or(false)
            })
            .collect()
    }

    /// One predator chronon: starve at zero energy, else eat an adjacent
    /// prey and take its cell, else fall back to ordinary movement. Energy
    /// drops by one at the end of the surviving branches.
    ///
    /// A kill-move always lands in the prey's cell; if the countdown is
    /// simultaneously eligible, offspring still spawn into the vacated
    /// origin cell, same as an ordinary move.
    pub fn perform_predator_action(
        &mut self,
        id: EntityId,
        target: Option<Position>,
        priority: &[Direction],
    ) -> Result<()> {
        let Some(entity) = self.grid.entity(id) else {
            return Ok(());
        };
        let origin = entity.position;
        let Some(energy) = entity.energy else {
            // Prey dispatched here would be an engine bug; nothing to do.
            return Ok(());
        };

        if energy == 0 {
            if let Some(entity) = self.grid.entity_mut(id) {
                entity.alive = false;
            }
            self.grid.remove(origin)?;
            debug!(predator = %id, at = %origin, "predator starved");
            return Ok(());
        }

        let prey_target = target.and_then(|pos| {
            self.grid
                .entity_at(pos)
                .filter(|e| e.is_prey())
                .map(|e| (pos, e.id))
        });

        match prey_target {
            Some((prey_pos, prey_id)) => {
                if let Some(prey) = self.grid.entity_mut(prey_id) {
                    prey.alive = false;
                }
                self.grid.remove(prey_pos)?;
                self.grid.move_entity(id, prey_pos)?;
                if let Some(entity) = self.grid.entity_mut(id) {
                    entity.energy = entity
                        .energy
                        .map(|e| e + self.config.species.predator_food_value);
                }
                trace!(predator = %id, prey = %prey_id, at = %prey_pos, "prey eaten");
                self.reproduce_into(id, origin)?;
            }
            None => {
                self.move_and_reproduce(id, priority)?;
            }
        }

        if let Some(entity) = self.grid.entity_mut(id) {
            entity.energy = entity.energy.map(|e| e - 1);
        }
        Ok(())
    }

    /// Once the population reaches the high-water mark, cull a fixed
    /// number of whichever species is strictly more numerous, walking the
    /// grid in enumeration order. A tie culls nothing.
    pub fn balance_population(&mut self) -> Result<()> {
        let live = self.grid.live_count();
        if live < self.config.population.high_water_mark() {
            return Ok(());
        }

        let prey = self.grid.count_species(Species::Prey);
        let predators = self.grid.count_species(Species::Predator);
        let dominant = match prey.cmp(&predators) {
            Ordering::Greater => Species::Prey,
            Ordering::Less => Species::Predator,
            Ordering::Equal => return Ok(()),
        };

        let victims: Vec<Position> = self
            .grid
            .entities_snapshot()
            .iter()
            .filter_map(|id| self.grid.entity(*id))
            .filter(|entity| entity.species == dominant)
            .map(|entity| entity.position)
            .take(self.config.population.purge_count)
            .collect();

        let removed = victims.len();
        for position in victims {
            self.grid.remove(position)?;
        }

        info!(species = %dominant, removed, population = live, "population rebalanced");
        Ok(())
    }

    /// One chronon: snapshot the live entities, act on each once in a
    /// shuffled order with a fresh direction permutation, skip anything
    /// killed earlier in the same pass, then rebalance. Entities born this
    /// chronon wait for the next one.
    pub fn step(&mut self) -> Result<()> {
        let mut order = self.grid.entities_snapshot();
        order.shuffle(&mut self.rng);

        for id in order {
            let species = match self.grid.entity(id) {
                Some(entity) if entity.alive => entity.species,
                // Eaten earlier this chronon; already handled.
                _ => continue,
            };

            let mut priority = Direction::ALL;
            priority.shuffle(&mut self.rng);

            match species {
                Species::Prey => self.perform_prey_action(id, &priority)?,
                Species::Predator => {
                    let target = self.surrounding_prey(id).into_iter().next();
                    self.perform_predator_action(id, target, &priority)?;
                }
            }
        }

        self.balance_population()?;
        self.chronon += 1;
        Ok(())
    }

    /// Run for the given number of chronons.
    pub fn run(&mut self, chronons: u64) -> Result<SimulationReport> {
        self.run_with_observer(chronons, |_, _| {})
    }

    /// Run for the given number of chronons, handing the grid to the
    /// observer after each one. This is the seam external renderers hook
    /// into.
    pub fn run_with_observer<F>(&mut self, chronons: u64, mut observe: F) -> Result<SimulationReport>
    where
        F: FnMut(u64, &Grid),
    {
        info!(chronons, seed = self.config.seed, "starting simulation");

        for _ in 0..chronons {
            self.step()?;
            observe(self.chronon, &self.grid);

            if self.chronon % 100 == 0 {
                let census = self.census();
                info!(
                    chronon = self.chronon,
                    prey = census.prey,
                    predators = census.predators,
                    "census"
                );
            }
        }

        Ok(SimulationReport {
            chronons: self.chronon,
            census: self.census(),
        })
    }
}

/// Live population counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub prey: usize,
    pub predators: usize,
    pub total: usize,
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub chronons: u64,
    pub census: Census,
}
