//! 2D grid for the planet.

use crate::entity::Entity;
use std::collections::HashMap;
use wator_core::{EntityId, Error, Position, Result, Species};

/// A bounded (non-toroidal) 2D grid, the sole source of spatial truth.
///
/// Each cell holds at most one entity id; the grid owns the entities
/// themselves in a side table keyed by id, so ids stay valid while
/// entities move between cells. Standing invariant: an entity's stored
/// `position` always names the cell holding its id.
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
    cells: Vec<Option<EntityId>>,
    entities: HashMap<EntityId, Entity>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![None; size],
            entities: HashMap::new(),
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.row < self.height && pos.col >= 0 && pos.col < self.width
    }

    fn index(&self, pos: Position) -> usize {
        (pos.row * self.width + pos.col) as usize
    }

    fn index_to_pos(&self, index: usize) -> Position {
        Position::new((index as i32) / self.width, (index as i32) % self.width)
    }

    /// True when the cell is inside the grid and holds no live entity.
    /// Out-of-bounds coordinates are never empty, so they are never a
    /// valid move target.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.entity_at(pos).is_none()
    }

    /// The live entity occupying the cell, if any.
    pub fn entity_at(&self, pos: Position) -> Option<&Entity> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells[self.index(pos)]
            .and_then(|id| self.entities.get(&id))
            .filter(|entity| entity.alive)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Store an entity in the given cell and point its `position` there.
    ///
    /// A cell holding only a dead tombstone counts as free; the tombstone
    /// is dropped.
    pub fn place(&mut self, mut entity: Entity, position: Position) -> Result<EntityId> {
        if !self.in_bounds(position) {
            return Err(Error::OutOfBounds { position });
        }
        if self.entity_at(position).is_some() {
            return Err(Error::OccupiedCell { position });
        }
        let index = self.index(position);
        if let Some(stale) = self.cells[index] {
            self.entities.remove(&stale);
        }
        let id = entity.id;
        entity.position = position;
        self.cells[index] = Some(id);
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Clear a cell, returning whatever entity occupied it. No-op when the
    /// cell is already empty.
    pub fn remove(&mut self, position: Position) -> Result<Option<Entity>> {
        if !self.in_bounds(position) {
            return Err(Error::OutOfBounds { position });
        }
        let index = self.index(position);
        match self.cells[index].take() {
            Some(id) => Ok(self.entities.remove(&id)),
            None => Ok(None),
        }
    }

    /// Relocate an entity to an empty cell, restoring the position/cell
    /// invariant. No-op for an id the grid does not know.
    pub fn move_entity(&mut self, id: EntityId, to: Position) -> Result<()> {
        if !self.in_bounds(to) {
            return Err(Error::OutOfBounds { position: to });
        }
        if self.entity_at(to).is_some() {
            return Err(Error::OccupiedCell { position: to });
        }
        let Some(entity) = self.entities.get_mut(&id) else {
            return Ok(());
        };
        let from_index = (entity.position.row * self.width + entity.position.col) as usize;
        entity.position = to;
        let to_index = self.index(to);
        self.cells[from_index] = None;
        self.cells[to_index] = Some(id);
        Ok(())
    }

    /// All live entities in row-major scan order. Stable within one call;
    /// this order is also what balancing purges walk.
    pub fn entities_snapshot(&self) -> Vec<EntityId> {
        self.cells
            .iter()
            .flatten()
            .copied()
            .filter(|id| self.entities.get(id).map(|e| e.alive).unwrap_or(false))
            .collect()
    }

    /// Up to four orthogonally adjacent in-bounds coordinates in N, S, W, E
    /// order. Never wraps around an edge.
    pub fn neighbors4(&self, pos: Position) -> Vec<Position> {
        wator_core::Direction::ALL
            .iter()
            .map(|dir| pos.offset(*dir))
            .filter(|neighbor| self.in_bounds(*neighbor))
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.entities.values().filter(|e| e.alive).count()
    }

    pub fn count_species(&self, species: Species) -> usize {
        self.entities
            .values()
            .filter(|e| e.alive && e.species == species)
            .count()
    }

    /// Iterator over every cell with its occupant, for rendering.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Option<&Entity>)> + '_ {
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let occupant = cell.and_then(|id| self.entities.get(&id));
            (self.index_to_pos(i), occupant)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wator_core::SpeciesConfig;

    fn prey_at(row: i32, col: i32) -> Entity {
        Entity::new(Species::Prey, Position::new(row, col), &SpeciesConfig::default())
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(10, 5);
        assert_eq!(grid.width, 10);
        assert_eq!(grid.height, 5);
        assert_eq!(grid.live_count(), 0);
        assert!(grid.in_bounds(Position::new(4, 9)));
        assert!(!grid.in_bounds(Position::new(5, 0)));
        assert!(!grid.in_bounds(Position::new(0, 10)));
        assert!(!grid.in_bounds(Position::new(-1, 0)));
    }

    #[test]
    fn test_place_sets_position() {
        let mut grid = Grid::new(10, 10);
        let entity = prey_at(0, 0);
        let id = grid.place(entity, Position::new(3, 4)).unwrap();

        let stored = grid.entity(id).unwrap();
        assert_eq!(stored.position, Position::new(3, 4));
        assert_eq!(grid.entity_at(Position::new(3, 4)).unwrap().id, id);
        assert_eq!(grid.live_count(), 1);
    }

    #[test]
    fn test_place_occupied_cell_fails() {
        let mut grid = Grid::new(10, 10);
        grid.place(prey_at(0, 0), Position::new(0, 0)).unwrap();

        let result = grid.place(prey_at(0, 0), Position::new(0, 0));
        assert_eq!(
            result.unwrap_err(),
            Error::OccupiedCell {
                position: Position::new(0, 0)
            }
        );
    }

    #[test]
    fn test_place_out_of_bounds_fails() {
        let mut grid = Grid::new(10, 10);
        let result = grid.place(prey_at(0, 0), Position::new(10, 0));
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn test_remove_is_noop_on_empty_cell() {
        let mut grid = Grid::new(10, 10);
        assert!(grid.remove(Position::new(5, 5)).unwrap().is_none());

        let id = grid.place(prey_at(0, 0), Position::new(5, 5)).unwrap();
        let removed = grid.remove(Position::new(5, 5)).unwrap().unwrap();
        assert_eq!(removed.id, id);
        assert!(grid.entity(id).is_none());
        assert!(grid.is_empty(Position::new(5, 5)));
    }

    #[test]
    fn test_move_entity_restores_invariant() {
        let mut grid = Grid::new(10, 10);
        let id = grid.place(prey_at(0, 0), Position::new(2, 2)).unwrap();

        grid.move_entity(id, Position::new(2, 3)).unwrap();

        assert!(grid.is_empty(Position::new(2, 2)));
        assert_eq!(grid.entity(id).unwrap().position, Position::new(2, 3));
        assert_eq!(grid.entity_at(Position::new(2, 3)).unwrap().id, id);
    }

    #[test]
    fn test_move_entity_rejects_occupied_destination() {
        let mut grid = Grid::new(10, 10);
        let id = grid.place(prey_at(0, 0), Position::new(0, 0)).unwrap();
        grid.place(prey_at(0, 0), Position::new(0, 1)).unwrap();

        let result = grid.move_entity(id, Position::new(0, 1));
        assert!(matches!(result, Err(Error::OccupiedCell { .. })));
        // Mover stays put.
        assert_eq!(grid.entity(id).unwrap().position, Position::new(0, 0));
    }

    #[test]
    fn test_neighbors4_center_and_corner() {
        let grid = Grid::new(10, 10);

        let center = grid.neighbors4(Position::new(5, 5));
        assert_eq!(
            center,
            vec![
                Position::new(4, 5), // N
                Position::new(6, 5), // S
                Position::new(5, 4), // W
                Position::new(5, 6), // E
            ]
        );

        let corner = grid.neighbors4(Position::new(0, 0));
        assert_eq!(corner, vec![Position::new(1, 0), Position::new(0, 1)]);
    }

    #[test]
    fn test_neighbors4_never_wraps() {
        let grid = Grid::new(1, 1);
        assert!(grid.neighbors4(Position::new(0, 0)).is_empty());
    }

    #[test]
    fn test_snapshot_is_row_major_and_live_only() {
        let mut grid = Grid::new(3, 3);
        let late = grid.place(prey_at(0, 0), Position::new(2, 2)).unwrap();
        let early = grid.place(prey_at(0, 0), Position::new(0, 1)).unwrap();
        let mid = grid.place(prey_at(0, 0), Position::new(1, 0)).unwrap();

        assert_eq!(grid.entities_snapshot(), vec![early, mid, late]);

        grid.entity_mut(mid).unwrap().alive = false;
        assert_eq!(grid.entities_snapshot(), vec![early, late]);
    }

    #[test]
    fn test_count_species() {
        let mut grid = Grid::new(3, 3);
        let config = SpeciesConfig::default();
        grid.place(
            Entity::new(Species::Predator, Position::new(0, 0), &config),
            Position::new(0, 0),
        )
        .unwrap();
        grid.place(prey_at(0, 0), Position::new(0, 1)).unwrap();
        grid.place(prey_at(0, 0), Position::new(0, 2)).unwrap();

        assert_eq!(grid.count_species(Species::Prey), 2);
        assert_eq!(grid.count_species(Species::Predator), 1);
        assert_eq!(grid.live_count(), 3);
    }
}
