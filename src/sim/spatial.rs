//! Uniform grid for neighbor search.
//!
//! The grid bins particles into square cells at least one interaction
//! diameter wide, so every partner within the cutoff is found by scanning
//! the 3x3 neighborhood around a particle's cell. The result is
//! deterministic for a given set of positions: cells are scanned in fixed
//! order and hold indices in insertion order.
//!
//! The simulation core treats this module as a fixed-contract service; it
//! validates the returned indices rather than trusting them.

use bevy::prelude::*;

/// Uniform 2D grid over the simulation domain.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    /// Size of each grid cell (at least the interaction diameter).
    cell_size: f32,
    /// Number of cells in each dimension.
    dims: UVec2,
    /// Origin of the grid (minimum corner of the domain).
    origin: Vec2,
    /// Cell to particle indices mapping, row-major.
    cells: Vec<Vec<usize>>,
}

/// Upper bound on cells per axis. Cells grow past the requested size when
/// the domain would otherwise need more; a larger cell never loses a
/// neighbor, it only widens the candidate scan.
const MAX_CELLS_PER_AXIS: u32 = 1024;

impl SpatialGrid {
    /// Create a grid covering `[min, max]` with cells at least `cell_size`
    /// wide.
    pub fn for_domain(min: Vec2, max: Vec2, cell_size: f32) -> Self {
        let size = max - min;
        let limit = MAX_CELLS_PER_AXIS as f32;
        let cell_size = cell_size.max(size.x / limit).max(size.y / limit);
        let dims = UVec2::new(
            (size.x / cell_size).ceil().max(1.0) as u32,
            (size.y / cell_size).ceil().max(1.0) as u32,
        );
        let cells = vec![Vec::new(); (dims.x * dims.y) as usize];
        Self {
            cell_size,
            dims,
            origin: min,
            cells,
        }
    }

    /// Rebuild the cell lists from particle positions. Positions outside
    /// the domain are clamped into the border cells.
    pub fn build(&mut self, positions: &[Vec2]) {
        for cell in &mut self.cells {
            cell.clear();
        }
        for (i, &pos) in positions.iter().enumerate() {
            let idx = self.cell_index(self.position_to_cell(pos));
            self.cells[idx].push(i);
        }
    }

    /// For every particle, the indices of partners strictly other than
    /// itself whose distance is at most `diameter`.
    ///
    /// Call [`SpatialGrid::build`] with the same positions first.
    pub fn neighbors(&self, positions: &[Vec2], diameter: f32) -> Vec<Vec<usize>> {
        let cutoff_sq = diameter * diameter;
        let mut sets = Vec::with_capacity(positions.len());

        for (i, &pos) in positions.iter().enumerate() {
            let cell = self.position_to_cell(pos);
            let mut set = Vec::new();

            for dy in -1..=1 {
                for dx in -1..=1 {
                    let nx = cell.x as i32 + dx;
                    let ny = cell.y as i32 + dy;
                    if nx < 0 || ny < 0 || nx >= self.dims.x as i32 || ny >= self.dims.y as i32 {
                        continue;
                    }
                    let idx = self.cell_index(UVec2::new(nx as u32, ny as u32));
                    for &j in &self.cells[idx] {
                        if j != i && (positions[j] - pos).length_squared() <= cutoff_sq {
                            set.push(j);
                        }
                    }
                }
            }

            sets.push(set);
        }

        sets
    }

    fn position_to_cell(&self, position: Vec2) -> UVec2 {
        let local = position - self.origin;
        let x = ((local.x / self.cell_size) as i64).clamp(0, self.dims.x as i64 - 1);
        let y = ((local.y / self.cell_size) as i64).clamp(0, self.dims.y as i64 - 1);
        UVec2::new(x as u32, y as u32)
    }

    fn cell_index(&self, cell: UVec2) -> usize {
        (cell.y * self.dims.x + cell.x) as usize
    }
}
