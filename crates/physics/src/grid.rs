//! Uniform-grid broad phase.
//!
//! World space is cut into fixed square cells; each collidable entity is
//! inserted into every cell its bounding box overlaps. Candidate pairs
//! are entities sharing at least one cell, reported exactly once in
//! canonical (ascending id) order.

use glam::Vec2;
use wallball_core::Entity;

/// Fixed spatial grid over a bounded region of world space.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    min: Vec2,
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<Entity>>,
}

impl SpatialGrid {
    /// Grid covering `[min_x, max_x] x [min_y, max_y]` with square
    /// cells of `cell_size` meters.
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32, cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "cell size must be positive");
        let cols = ((max_x - min_x) / cell_size).ceil() as usize;
        let rows = ((max_y - min_y) / cell_size).ceil() as usize;
        Self {
            min: Vec2::new(min_x, min_y),
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        }
    }

    /// Drop every stored entity, keeping cell allocations.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Insert an entity into every cell its AABB overlaps. Boxes
    /// sticking out of the grid are clamped to the border cells; boxes
    /// fully outside are ignored.
    pub fn insert(&mut self, entity: Entity, aabb_min: Vec2, aabb_max: Vec2) {
        let extent = Vec2::new(
            self.min.x + self.cols as f32 * self.cell_size,
            self.min.y + self.rows as f32 * self.cell_size,
        );
        if aabb_max.x < self.min.x
            || aabb_max.y < self.min.y
            || aabb_min.x >= extent.x
            || aabb_min.y >= extent.y
        {
            return;
        }

        let (col_min, row_min) = self.clamped_cell_of(aabb_min);
        let (col_max, row_max) = self.clamped_cell_of(aabb_max);
        for row in row_min..=row_max {
            for col in col_min..=col_max {
                self.cells[row * self.cols + col].push(entity);
            }
        }
    }

    fn clamped_cell_of(&self, point: Vec2) -> (usize, usize) {
        let rel = (point - self.min) / self.cell_size;
        let col = (rel.x.max(0.0) as usize).min(self.cols - 1);
        let row = (rel.y.max(0.0) as usize).min(self.rows - 1);
        (col, row)
    }

    /// Every unordered pair sharing at least one cell, each pair once,
    /// ordered by ascending entity id.
    pub fn collision_pairs(&self) -> Vec<(Entity, Entity)> {
        let mut pairs = Vec::new();
        for cell in &self.cells {
            if cell.len() < 2 {
                continue;
            }
            for i in 0..cell.len() {
                for j in i + 1..cell.len() {
                    let (a, b) = (cell[i], cell[j]);
                    pairs.push(if a < b { (a, b) } else { (b, a) });
                }
            }
        }
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SpatialGrid {
        SpatialGrid::new(-50.0, 50.0, -50.0, 50.0, 10.0)
    }

    #[test]
    fn overlapping_boxes_pair_once() {
        let mut grid = grid();
        // Both straddle several cells; the pair must still appear once.
        grid.insert(Entity(0), Vec2::new(-1.0, -1.0), Vec2::new(11.0, 11.0));
        grid.insert(Entity(1), Vec2::new(5.0, 5.0), Vec2::new(15.0, 15.0));

        let pairs = grid.collision_pairs();
        assert_eq!(pairs, vec![(Entity(0), Entity(1))]);
    }

    #[test]
    fn distant_boxes_never_pair() {
        let mut grid = grid();
        grid.insert(Entity(0), Vec2::new(-40.0, -40.0), Vec2::new(-35.0, -35.0));
        grid.insert(Entity(1), Vec2::new(35.0, 35.0), Vec2::new(40.0, 40.0));

        assert!(grid.collision_pairs().is_empty());
    }

    #[test]
    fn pairs_are_canonically_ordered() {
        let mut grid = grid();
        grid.insert(Entity(7), Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        grid.insert(Entity(2), Vec2::new(0.5, 0.5), Vec2::new(1.5, 1.5));

        assert_eq!(grid.collision_pairs(), vec![(Entity(2), Entity(7))]);
    }

    #[test]
    fn clear_empties_cells() {
        let mut grid = grid();
        grid.insert(Entity(0), Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        grid.insert(Entity(1), Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        assert_eq!(grid.collision_pairs().len(), 1);

        grid.clear();
        assert!(grid.collision_pairs().is_empty());
    }

    #[test]
    fn partially_outside_boxes_are_clamped_in() {
        let mut grid = grid();
        // The arena walls are far larger than the grid: they must still
        // pair with bodies inside it.
        grid.insert(Entity(0), Vec2::new(-500.0, -2.0), Vec2::new(500.0, 2.0));
        grid.insert(Entity(1), Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0));

        assert_eq!(grid.collision_pairs(), vec![(Entity(0), Entity(1))]);
    }
}
