//! Grid Object Store: sparse cell -> marker map plus the grid view's zoom.

use std::collections::BTreeMap;

use serde::Serialize;
use shared::domain::{CellCoord, ObjectKind};
use tracing::debug;

pub const DEFAULT_GRID_SIZE: usize = 20;
pub const INITIAL_ZOOM: f64 = 1.0;
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 2.0;
pub const ZOOM_IN_FACTOR: f64 = 1.2;
pub const ZOOM_OUT_FACTOR: f64 = 0.8;

#[derive(Debug, Clone)]
pub struct GridObjectStore {
    size: usize,
    // Absent key means `ObjectKind::None`; `None` is never stored.
    cells: BTreeMap<CellCoord, ObjectKind>,
    zoom: f64,
}

impl Default for GridObjectStore {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE)
    }
}

impl GridObjectStore {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: BTreeMap::new(),
            zoom: INITIAL_ZOOM,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom
    }

    pub fn kind_at(&self, coord: CellCoord) -> ObjectKind {
        self.cells.get(&coord).copied().unwrap_or_default()
    }

    /// Advances the marker at `coord` one step through QR -> Robot ->
    /// Charging -> QR. Callers only pass coordinates of rendered cells; no
    /// bounds check is made here.
    pub fn cycle(&mut self, coord: CellCoord) -> ObjectKind {
        let next = self.kind_at(coord).next();
        if next.is_none() {
            self.cells.remove(&coord);
        } else {
            self.cells.insert(coord, next);
        }
        debug!(row = coord.row, col = coord.col, kind = next.label(), "grid: cell cycled");
        next
    }

    /// Multiplies the zoom level by `factor` and clamps into
    /// `[MIN_ZOOM, MAX_ZOOM]`. Degenerate factors (zero, negative, NaN) are
    /// not rejected; they simply land on the lower bound.
    pub fn zoom(&mut self, factor: f64) -> f64 {
        self.zoom = clamp_zoom(self.zoom * factor);
        debug!(factor, zoom = self.zoom, "grid: zoom changed");
        self.zoom
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.zoom(ZOOM_IN_FACTOR)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.zoom(ZOOM_OUT_FACTOR)
    }

    /// Placed cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (CellCoord, ObjectKind)> + '_ {
        self.cells.iter().map(|(coord, kind)| (*coord, *kind))
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.len()
    }

    pub fn snapshot(&self) -> GridSnapshot {
        let rows = (0..self.size)
            .map(|row| {
                (0..self.size)
                    .map(|col| self.kind_at(CellCoord::new(row, col)))
                    .collect()
            })
            .collect();
        GridSnapshot {
            size: self.size,
            zoom: self.zoom,
            rows,
        }
    }
}

// `f64::max`/`min` ignore a NaN operand, so a NaN product resolves to MIN_ZOOM
// instead of escaping the range the way `f64::clamp` would.
fn clamp_zoom(value: f64) -> f64 {
    value.max(MIN_ZOOM).min(MAX_ZOOM)
}

/// Read-only view of every cell plus the zoom level, handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSnapshot {
    pub size: usize,
    pub zoom: f64,
    pub rows: Vec<Vec<ObjectKind>>,
}

impl GridSnapshot {
    pub fn kind_at(&self, coord: CellCoord) -> Option<ObjectKind> {
        self.rows.get(coord.row)?.get(coord.col).copied()
    }
}

#[cfg(test)]
#[path = "tests/grid_tests.rs"]
mod tests;
