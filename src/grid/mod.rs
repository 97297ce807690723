//! Spatial grid model for boss attack areas.
//!
//! A `cols x rows` lattice of cell centres around an anchor point. Column 0 is
//! the leftmost (most negative x). The grid is pure data and recomputed from
//! the anchor every time it is needed.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{DEFAULT_GRID_ANCHOR, GRID_COLS, GRID_ROWS, GRID_SPACING};

/// Grid dimensions and cell spacing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridModel {
    pub cols: usize,
    pub rows: usize,
    pub spacing: f32,
}

impl Default for GridModel {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            rows: GRID_ROWS,
            spacing: GRID_SPACING,
        }
    }
}

impl GridModel {
    pub fn cells(&self, anchor: Vec2) -> CellGrid {
        compute_cell_centers(anchor, self.cols, self.rows, self.spacing)
    }
}

/// Cell address within a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
}

/// Cell-centre positions for one anchor, stored row-major
#[derive(Debug, Clone)]
pub struct CellGrid {
    cols: usize,
    rows: usize,
    spacing: f32,
    centers: Vec<Vec2>,
}

impl CellGrid {
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn center(&self, col: usize, row: usize) -> Option<Vec2> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.centers.get(row * self.cols + col).copied()
    }

    /// Every cell in the given columns, all rows
    pub fn columns(&self, cols: impl IntoIterator<Item = usize>) -> Vec<Cell> {
        let mut out = Vec::new();
        for col in cols {
            if col >= self.cols {
                continue;
            }
            for row in 0..self.rows {
                out.push(Cell { col, row });
            }
        }
        out
    }

    /// The leftmost `n` columns (clamped to grid width)
    pub fn left_columns(&self, n: usize) -> Vec<Cell> {
        self.columns(0..n.min(self.cols))
    }

    /// The rightmost `n` columns (clamped to grid width)
    pub fn right_columns(&self, n: usize) -> Vec<Cell> {
        let n = n.min(self.cols);
        self.columns(self.cols - n..self.cols)
    }

    pub fn all_cells(&self) -> Vec<Cell> {
        self.columns(0..self.cols)
    }

    /// A point occupies a cell when it lies within half a spacing of its centre
    pub fn occupies(&self, cell: Cell, point: Vec2) -> bool {
        self.center(cell.col, cell.row)
            .map(|c| c.distance(point) <= self.spacing * 0.5)
            .unwrap_or(false)
    }

    pub fn occupies_any(&self, cells: &[Cell], point: Vec2) -> bool {
        cells.iter().any(|cell| self.occupies(*cell, point))
    }
}

/// Cell (x, y) centre = anchor + ((x - (cols-1)/2) * spacing, (y - (rows-1)/2) * spacing)
pub fn compute_cell_centers(anchor: Vec2, cols: usize, rows: usize, spacing: f32) -> CellGrid {
    let half_w = (cols.saturating_sub(1)) as f32 * 0.5;
    let half_h = (rows.saturating_sub(1)) as f32 * 0.5;
    let mut centers = Vec::with_capacity(cols * rows);
    for y in 0..rows {
        for x in 0..cols {
            centers.push(Vec2::new(
                anchor.x + (x as f32 - half_w) * spacing,
                anchor.y + (y as f32 - half_h) * spacing,
            ));
        }
    }
    CellGrid {
        cols,
        rows,
        spacing,
        centers,
    }
}

/// Where the grid anchor is read from. Resolved once, read live.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnchorSource {
    Fixed([f32; 2]),
    ArenaCenter,
    Defender,
    Default,
}

/// Live positions an anchor source can be read from
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorInputs {
    pub arena_center: Option<Vec2>,
    pub defender: Option<Vec2>,
}

impl AnchorSource {
    /// First match wins: fixed, arena marker, defender, default
    pub fn resolve(fixed: Option<[f32; 2]>, inputs: &AnchorInputs) -> Self {
        if let Some(p) = fixed {
            return Self::Fixed(p);
        }
        if inputs.arena_center.is_some() {
            return Self::ArenaCenter;
        }
        if inputs.defender.is_some() {
            return Self::Defender;
        }
        warn!("no grid anchor available, using default");
        Self::Default
    }

    /// Current anchor position. A source that has gone missing falls back to
    /// the default anchor.
    pub fn position(&self, inputs: &AnchorInputs) -> Vec2 {
        let fallback = Vec2::from(DEFAULT_GRID_ANCHOR);
        match self {
            Self::Fixed(p) => Vec2::from(*p),
            Self::ArenaCenter => inputs.arena_center.unwrap_or_else(|| {
                warn!("arena centre marker missing, using default anchor");
                fallback
            }),
            Self::Defender => inputs.defender.unwrap_or_else(|| {
                warn!("defender missing, using default anchor");
                fallback
            }),
            Self::Default => fallback,
        }
    }
}
