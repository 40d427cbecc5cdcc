//! Entity state and management.

use serde::{Deserialize, Serialize};
use wator_core::{EntityId, Position, Species, SpeciesConfig};

/// One organism occupying exactly one grid cell.
///
/// Prey never carry an energy value; predators always do. The constructor
/// is the only place the `energy` field is decided, which keeps that
/// invariant structural.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub species: Species,
    pub position: Position,
    pub alive: bool,
    pub reproduction_countdown: i32,
    pub energy: Option<i32>,
}

impl Entity {
    pub fn new(species: Species, position: Position, config: &SpeciesConfig) -> Self {
        Self {
            id: EntityId::new(),
            species,
            position,
            alive: true,
            reproduction_countdown: config.reproduction_time(species),
            energy: config.initial_energy(species),
        }
    }

    pub fn is_prey(&self) -> bool {
        self.species.is_prey()
    }

    /// Eligible to spawn offspring this chronon.
    pub fn can_reproduce(&self) -> bool {
        self.reproduction_countdown <= 0
    }

    /// Restore the species reproduction period, whatever the countdown
    /// held before.
    pub fn reset_reproduction_countdown(&mut self, config: &SpeciesConfig) {
        self.reproduction_countdown = config.reproduction_time(self.species);
    }
}

/// Serializable entity data for external observers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityData {
    pub id: EntityId,
    pub species: Species,
    pub position: Position,
    pub reproduction_countdown: i32,
    pub energy: Option<i32>,
}

impl From<&Entity> for EntityData {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id,
            species: entity.species,
            position: entity.position,
            reproduction_countdown: entity.reproduction_countdown,
            energy: entity.energy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_prey_initialization() {
        let config = SpeciesConfig::default();
        let entity = Entity::new(Species::Prey, Position::new(0, 0), &config);

        assert!(entity.is_prey());
        assert_eq!(entity.position, Position::new(0, 0));
        assert!(entity.alive);
        assert_eq!(entity.reproduction_countdown, 5);
        assert_eq!(entity.energy, None);
    }

    #[test]
    fn test_predator_initialization() {
        let config = SpeciesConfig::default();
        let entity = Entity::new(Species::Predator, Position::new(0, 0), &config);

        assert!(!entity.is_prey());
        assert!(entity.alive);
        assert_eq!(entity.reproduction_countdown, 20);
        assert_eq!(entity.energy, Some(15));
    }

    #[test]
    fn test_reset_reproduction_countdown() {
        let config = SpeciesConfig::default();

        let mut prey = Entity::new(Species::Prey, Position::new(0, 0), &config);
        prey.reproduction_countdown = 0;
        prey.reset_reproduction_countdown(&config);
        assert_eq!(prey.reproduction_countdown, 5);

        let mut predator = Entity::new(Species::Predator, Position::new(0, 0), &config);
        predator.reproduction_countdown = 0;
        predator.reset_reproduction_countdown(&config);
        assert_eq!(predator.reproduction_countdown, 20);
    }

    #[test]
    fn test_entity_data_from_entity() {
        let config = SpeciesConfig::default();
        let entity = Entity::new(Species::Predator, Position::new(2, 3), &config);
        let data = EntityData::from(&entity);
        assert_eq!(data.id, entity.id);
        assert_eq!(data.species, entity.species);
        assert_eq!(data.position, entity.position);
        assert_eq!(data.energy, Some(15));
    }

    proptest! {
        // Reset must restore the species period from any prior countdown,
        // negative values included.
        #[test]
        fn prop_reset_from_any_countdown(countdown in i32::MIN..i32::MAX, prey in any::<bool>()) {
            let config = SpeciesConfig::default();
            let species = if prey { Species::Prey } else { Species::Predator };
            let mut entity = Entity::new(species, Position::new(0, 0), &config);
            entity.reproduction_countdown = countdown;
            entity.reset_reproduction_countdown(&config);
            prop_assert_eq!(entity.reproduction_countdown, config.reproduction_time(species));
        }

        #[test]
        fn prop_energy_matches_species(prey in any::<bool>()) {
            let config = SpeciesConfig::default();
            let species = if prey { Species::Prey } else { Species::Predator };
            let entity = Entity::new(species, Position::new(0, 0), &config);
            prop_assert_eq!(entity.energy.is_none(), entity.is_prey());
            if let Some(energy) = entity.energy {
                prop_assert!(energy >= 0);
            }
        }
    }
}
