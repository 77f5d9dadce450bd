use std::collections::HashMap;

use tracing::debug;

use crate::cell::build::CellTables;
use crate::cell::{Cell, CellSpec, Fill, MATERIAL_VOID};
use crate::error::{CellError, GeometryError, Result};
use crate::math::K_BOLTZMANN;
use crate::surface::{Surface, SurfaceRegistry};

/// Maps user-visible ids to dense table indices.
///
/// Minimal model of an external collaborator table (materials,
/// lattices): the kernel only needs the id space, not the physics.
#[derive(Debug, Clone, Default)]
pub struct IdTable {
    ids: Vec<i32>,
    index: HashMap<i32, usize>,
}

impl IdTable {
    /// Creates a new, empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an id, returning its index; an already-present id keeps
    /// its existing index.
    pub fn insert(&mut self, id: i32) -> usize {
        if let Some(&i) = self.index.get(&id) {
            return i;
        }
        let i = self.ids.len();
        self.ids.push(id);
        self.index.insert(id, i);
        i
    }

    /// Returns the index of the given user id.
    #[must_use]
    pub fn index_of(&self, id: i32) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Returns the user id at the given index.
    #[must_use]
    pub fn id_of(&self, index: usize) -> Option<i32> {
        self.ids.get(index).copied()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A universe: the cells that together tile a region of space.
///
/// Universes are created lazily, in the order their ids are first seen
/// on a cell; members are cell-table indices in discovery order.
#[derive(Debug, Clone)]
pub struct Universe {
    pub(crate) id: i32,
    pub(crate) cells: Vec<usize>,
}

impl Universe {
    /// User-visible universe id.
    #[must_use]
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Indices of the member cells, in discovery order.
    #[must_use]
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }
}

/// Accumulates the pieces of a geometry, then compiles every cell.
///
/// Surfaces, materials, and lattices must all be registered before
/// [`finish`](GeometryBuilder::finish) runs, since cell regions and
/// fills resolve against them.
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    surfaces: SurfaceRegistry,
    materials: IdTable,
    lattices: IdTable,
    specs: Vec<CellSpec>,
}

impl GeometryBuilder {
    /// Creates a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a surface.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-positive or duplicate surface id.
    pub fn surface(&mut self, surface: Box<dyn Surface>) -> Result<()> {
        self.surfaces.add(surface)?;
        Ok(())
    }

    /// Registers a material id.
    pub fn material(&mut self, id: i32) -> &mut Self {
        self.materials.insert(id);
        self
    }

    /// Registers a lattice id.
    pub fn lattice(&mut self, id: i32) -> &mut Self {
        self.lattices.insert(id);
        self
    }

    /// Adds a cell description to be compiled by `finish`.
    pub fn cell(&mut self, spec: CellSpec) -> &mut Self {
        self.specs.push(spec);
        self
    }

    /// Compiles the geometry: builds the universe table from the cell
    /// descriptions, then compiles every cell against the registries.
    ///
    /// # Errors
    ///
    /// Fails on an empty cell list, a repeated cell id, or any cell
    /// whose description violates the construction rules.
    pub fn finish(self) -> Result<Geometry> {
        if self.specs.is_empty() {
            return Err(GeometryError::NoCells.into());
        }

        // Universe ids are known before any cell compiles, so fills can
        // resolve against the complete table in a single pass.
        let mut universes: Vec<Universe> = Vec::new();
        let mut universe_index: HashMap<i32, usize> = HashMap::new();
        for (i, spec) in self.specs.iter().enumerate() {
            let uid = spec.universe.unwrap_or(0);
            let ui = *universe_index.entry(uid).or_insert_with(|| {
                universes.push(Universe {
                    id: uid,
                    cells: Vec::new(),
                });
                universes.len() - 1
            });
            universes[ui].cells.push(i);
        }

        let tables = CellTables {
            surfaces: &self.surfaces,
            materials: &self.materials,
            lattices: &self.lattices,
            universes: &universe_index,
        };

        let mut cells = Vec::with_capacity(self.specs.len());
        let mut cell_index: HashMap<i32, usize> = HashMap::new();
        for spec in &self.specs {
            let cell = Cell::from_spec(spec, &tables)?;
            if cell_index.insert(cell.id(), cells.len()).is_some() {
                return Err(GeometryError::DuplicateCellId(cell.id()).into());
            }
            cells.push(cell);
        }

        debug!(
            n_cells = cells.len(),
            n_universes = universes.len(),
            n_surfaces = self.surfaces.len(),
            "compiled geometry"
        );

        Ok(Geometry {
            surfaces: self.surfaces,
            materials: self.materials,
            lattices: self.lattices,
            cells,
            cell_index,
            universes,
            universe_index,
        })
    }
}

/// The compiled geometry: every registry a particle query needs, built
/// once at load time and read-only afterwards except for the indexed
/// fill and temperature mutators.
#[derive(Debug)]
pub struct Geometry {
    surfaces: SurfaceRegistry,
    materials: IdTable,
    lattices: IdTable,
    cells: Vec<Cell>,
    cell_index: HashMap<i32, usize>,
    universes: Vec<Universe>,
    universe_index: HashMap<i32, usize>,
}

impl Geometry {
    /// The surface registry.
    #[must_use]
    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    /// The material id table.
    #[must_use]
    pub fn materials(&self) -> &IdTable {
        &self.materials
    }

    /// The lattice id table.
    #[must_use]
    pub fn lattices(&self) -> &IdTable {
        &self.lattices
    }

    /// The compiled cells, in input order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The universes, in first-seen order.
    #[must_use]
    pub fn universes(&self) -> &[Universe] {
        &self.universes
    }

    /// Looks up a cell by user id.
    #[must_use]
    pub fn cell_by_id(&self, id: i32) -> Option<&Cell> {
        self.cell_index.get(&id).map(|&i| &self.cells[i])
    }

    /// Looks up a universe by user id.
    #[must_use]
    pub fn universe_by_id(&self, id: i32) -> Option<&Universe> {
        self.universe_index.get(&id).map(|&i| &self.universes[i])
    }

    /// Returns the fill of the cell at the given 1-based index. The
    /// returned [`Fill`] carries both the kind and the borrowed indices.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` for an invalid cell index.
    pub fn cell_fill(&self, index: usize) -> Result<&Fill> {
        let cell = index
            .checked_sub(1)
            .and_then(|i| self.cells.get(i))
            .ok_or(GeometryError::OutOfBounds("cells"))?;
        Ok(&cell.fill)
    }

    /// Replaces the fill of the cell at the given 1-based index.
    ///
    /// Material entries are internal material indices, with
    /// [`MATERIAL_VOID`] accepted; universe and lattice indices are
    /// checked against their tables. The compiled region is untouched.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` for an invalid cell, material, universe, or
    /// lattice index.
    pub fn set_cell_fill(&mut self, index: usize, fill: Fill) -> Result<()> {
        match &fill {
            Fill::Material(mats) => {
                for &m in mats {
                    if m != MATERIAL_VOID && (m < 0 || m as usize >= self.materials.len()) {
                        return Err(GeometryError::OutOfBounds("materials").into());
                    }
                }
            }
            Fill::Universe(u) => {
                if *u >= self.universes.len() {
                    return Err(GeometryError::OutOfBounds("universes").into());
                }
            }
            Fill::Lattice(l) => {
                if *l >= self.lattices.len() {
                    return Err(GeometryError::OutOfBounds("lattices").into());
                }
            }
        }

        let cell = index
            .checked_sub(1)
            .and_then(|i| self.cells.get_mut(i))
            .ok_or(GeometryError::OutOfBounds("cells"))?;
        cell.fill = fill;
        Ok(())
    }

    /// Sets the temperature of one instance of the cell at the given
    /// 1-based index, or of every instance when `instance` is `None`.
    /// The value is stored as sqrt(k*T).
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` for an invalid cell or instance index, and
    /// `NegativeTemperature` for a temperature below zero.
    pub fn set_cell_temperature(
        &mut self,
        index: usize,
        temperature: f64,
        instance: Option<usize>,
    ) -> Result<()> {
        let cell = index
            .checked_sub(1)
            .and_then(|i| self.cells.get_mut(i))
            .ok_or(GeometryError::OutOfBounds("cells"))?;
        if temperature < 0.0 {
            return Err(CellError::NegativeTemperature(cell.id).into());
        }

        let sqrtkt = (K_BOLTZMANN * temperature).sqrt();
        match instance {
            Some(i) => {
                let slot = cell
                    .sqrtkt
                    .get_mut(i)
                    .ok_or(GeometryError::OutOfBounds("cell instances"))?;
                *slot = sqrtkt;
            }
            None => {
                for slot in &mut cell.sqrtkt {
                    *slot = sqrtkt;
                }
            }
        }
        Ok(())
    }
}
