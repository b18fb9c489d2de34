//! Document Model
//!
//! In-memory notebook: ordered cells plus app-level configuration.

pub mod app_config;
pub mod cell;
pub mod reconcile;

pub use app_config::{AppConfig, Width};
pub use cell::{Cell, CellConfig, CellId, DEFAULT_CELL_NAME};
pub use reconcile::{CellReconciler, FreshIds, SimilarityReconciler};

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::{FileManagerError, Result};

/// A notebook held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    cells: Vec<Cell>,
    pub config: AppConfig,
    next_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Document {
    /// A document seeded with exactly one empty cell
    pub fn new(config: AppConfig) -> Self {
        let mut doc = Self::without_cells(config);
        doc.ensure_one_cell();
        doc
    }

    /// A document with no cells yet; used by parsers before cells are pushed
    pub fn without_cells(config: AppConfig) -> Self {
        Self {
            cells: Vec::new(),
            config,
            next_id: 0,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|c| c.code.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|c| c.name.as_str())
    }

    pub fn configs(&self) -> impl Iterator<Item = &CellConfig> {
        self.cells.iter().map(|c| &c.config)
    }

    pub fn ids(&self) -> impl Iterator<Item = &CellId> {
        self.cells.iter().map(|c| &c.id)
    }

    /// Append a cell with a freshly generated id
    pub fn push_cell(&mut self, code: impl Into<String>, name: impl Into<String>, config: CellConfig) -> &Cell {
        let id = self.fresh_id();
        self.cells.push(Cell {
            id,
            code: code.into(),
            name: name.into(),
            config,
        });
        &self.cells[self.cells.len() - 1]
    }

    /// Pad with one empty cell if there are none
    pub fn ensure_one_cell(&mut self) {
        if self.cells.is_empty() {
            let id = self.fresh_id();
            self.cells.push(Cell::empty(id));
        }
    }

    /// Replace every cell with the supplied lists
    ///
    /// Missing ids are generated; the lists must have equal length.
    pub fn with_data(
        &mut self,
        cell_ids: Option<&[CellId]>,
        codes: &[String],
        names: &[String],
        configs: &[CellConfig],
    ) -> Result<()> {
        if codes.len() != names.len() || codes.len() != configs.len() {
            return Err(FileManagerError::InvalidRequest(format!(
                "mismatched cell data: {} codes, {} names, {} configs",
                codes.len(),
                names.len(),
                configs.len()
            )));
        }
        if let Some(ids) = cell_ids {
            if ids.len() != codes.len() {
                return Err(FileManagerError::InvalidRequest(format!(
                    "mismatched cell data: {} ids for {} codes",
                    ids.len(),
                    codes.len()
                )));
            }
            let distinct: HashSet<&CellId> = ids.iter().collect();
            if distinct.len() != ids.len() {
                return Err(FileManagerError::InvalidRequest(
                    "duplicate cell ids".to_string(),
                ));
            }
        }

        self.cells.clear();
        for (i, code) in codes.iter().enumerate() {
            let id = match cell_ids {
                Some(ids) => ids[i].clone(),
                None => self.fresh_id(),
            };
            self.cells.push(Cell {
                id,
                code: code.clone(),
                name: names[i].clone(),
                config: configs[i].clone(),
            });
        }
        Ok(())
    }

    /// Merge a partial app configuration; see [`AppConfig::update`]
    pub fn update_config(&mut self, partial: &Map<String, Value>) -> Result<&AppConfig> {
        self.config.update(partial)?;
        Ok(&self.config)
    }

    /// Re-key cells so they keep the ids they had in `previous`
    pub fn adopt_ids(&mut self, previous: &Document, reconciler: &dyn CellReconciler) {
        let assigned = reconciler.reconcile(&previous.cells, &self.cells);
        self.next_id = self.next_id.max(previous.next_id);

        let mut taken: HashSet<CellId> = assigned.iter().flatten().cloned().collect();
        for (cell, id) in self.cells.iter_mut().zip(assigned) {
            cell.id = match id {
                Some(id) => id,
                None => loop {
                    let candidate = CellId::from_index(self.next_id);
                    self.next_id += 1;
                    if taken.insert(candidate.clone()) {
                        break candidate;
                    }
                },
            };
        }
    }

    fn fresh_id(&mut self) -> CellId {
        loop {
            let id = CellId::from_index(self.next_id);
            self.next_id += 1;
            if !self.cells.iter().any(|c| c.id == id) {
                return id;
            }
        }
    }
}
