use std::collections::BTreeMap;

use serde::Serialize;

use crate::cell::{Cell, Fill, MATERIAL_VOID};
use crate::geometry::Geometry;
use crate::math::K_BOLTZMANN;
use crate::region::{OpKind, Token};
use crate::surface::SurfaceRegistry;

/// One dataset in the keyed export store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataValue {
    Int(i32),
    Double(f64),
    Text(String),
    IntList(Vec<i32>),
    DoubleList(Vec<f64>),
}

impl From<i32> for DataValue {
    fn from(v: i32) -> Self {
        DataValue::Int(v)
    }
}

impl From<f64> for DataValue {
    fn from(v: f64) -> Self {
        DataValue::Double(v)
    }
}

impl From<&str> for DataValue {
    fn from(v: &str) -> Self {
        DataValue::Text(v.to_string())
    }
}

impl From<String> for DataValue {
    fn from(v: String) -> Self {
        DataValue::Text(v)
    }
}

impl From<Vec<i32>> for DataValue {
    fn from(v: Vec<i32>) -> Self {
        DataValue::IntList(v)
    }
}

impl From<Vec<f64>> for DataValue {
    fn from(v: Vec<f64>) -> Self {
        DataValue::DoubleList(v)
    }
}

/// A hierarchical keyed store: named datasets plus named sub-groups.
///
/// This is the semantic contract of the persisted-state writer; the
/// actual on-disk format (HDF5 in production) lives outside the kernel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataGroup {
    datasets: BTreeMap<String, DataValue>,
    groups: BTreeMap<String, DataGroup>,
}

impl DataGroup {
    /// Creates a new, empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a dataset, replacing any previous value under that name.
    pub fn write(&mut self, name: &str, value: impl Into<DataValue>) {
        self.datasets.insert(name.to_string(), value.into());
    }

    /// Returns the sub-group with the given name, creating it if absent.
    pub fn group_mut(&mut self, name: &str) -> &mut DataGroup {
        self.groups.entry(name.to_string()).or_default()
    }

    /// Reads a dataset back.
    #[must_use]
    pub fn dataset(&self, name: &str) -> Option<&DataValue> {
        self.datasets.get(name)
    }

    /// Reads a sub-group back.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&DataGroup> {
        self.groups.get(name)
    }
}

/// Re-emits a compiled infix region as specification text.
///
/// Every token is prefixed with a space except intersection, which is
/// emitted as nothing at all: juxtaposition is the input convention, and
/// the neighbouring tokens' prefixes keep the operands apart. The result
/// re-tokenizes to the original user-id token sequence.
#[must_use]
pub fn region_to_string(region: &[Token], surfaces: &SurfaceRegistry) -> String {
    let mut out = String::new();
    for &token in region {
        match token {
            Token::Op(OpKind::LeftParen) => out.push_str(" ("),
            Token::Op(OpKind::RightParen) => out.push_str(" )"),
            Token::Op(OpKind::Complement) => out.push_str(" ~"),
            Token::Op(OpKind::Union) => out.push_str(" |"),
            Token::Op(OpKind::Intersection) => {}
            Token::Halfspace(t) => {
                let id = surfaces[(t.abs() - 1) as usize].id();
                out.push(' ');
                out.push_str(&(if t < 0 { -id } else { id }).to_string());
            }
        }
    }
    out
}

/// Emits every cell and universe of a geometry into a keyed store,
/// mirroring the structure the persisted-state writer expects.
#[must_use]
pub fn export_geometry(geometry: &Geometry) -> DataGroup {
    let mut root = DataGroup::new();

    let cells = root.group_mut("cells");
    for cell in geometry.cells() {
        let group = cells.group_mut(&format!("cell {}", cell.id()));
        write_cell(geometry, cell, group);
    }

    let universes = root.group_mut("universes");
    for universe in geometry.universes() {
        let group = universes.group_mut(&format!("universe {}", universe.id()));
        if !universe.cells().is_empty() {
            let ids: Vec<i32> = universe
                .cells()
                .iter()
                .map(|&i| geometry.cells()[i].id())
                .collect();
            group.write("cells", ids);
        }
    }

    root
}

fn write_cell(geometry: &Geometry, cell: &Cell, group: &mut DataGroup) {
    if let Some(name) = cell.name() {
        group.write("name", name);
    }
    group.write("universe", cell.universe_id());

    if !cell.region().is_empty() {
        group.write(
            "region",
            region_to_string(cell.region(), geometry.surfaces()),
        );
    }

    match cell.fill() {
        Fill::Material(materials) => {
            group.write("fill_type", "material");
            let ids: Vec<i32> = materials
                .iter()
                .map(|&m| {
                    if m == MATERIAL_VOID {
                        MATERIAL_VOID
                    } else {
                        geometry.materials().id_of(m as usize).unwrap_or(m)
                    }
                })
                .collect();
            if let [only] = ids[..] {
                group.write("material", only);
            } else {
                group.write("material", ids);
            }
            let temperatures: Vec<f64> = cell
                .sqrtkt()
                .iter()
                .map(|s| s * s / K_BOLTZMANN)
                .collect();
            group.write("temperature", temperatures);
        }
        Fill::Universe(index) => {
            group.write("fill_type", "universe");
            group.write("fill", geometry.universes()[*index].id());
            if let Some(t) = cell.translation() {
                group.write("translation", vec![t.x, t.y, t.z]);
            }
            if let Some(r) = cell.rotation() {
                group.write("rotation", r.angles.to_vec());
            }
        }
        Fill::Lattice(index) => {
            group.write("fill_type", "lattice");
            group.write("lattice", geometry.lattices().id_of(*index).unwrap_or(0));
        }
    }
}
