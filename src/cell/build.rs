use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{CellError, Result};
use crate::geometry::IdTable;
use crate::math::{rotation::rotation_matrix, Vector3, K_BOLTZMANN};
use crate::region::{generate_rpn, tokenize, OpKind, Token};
use crate::surface::SurfaceRegistry;

use super::{Cell, Fill, Rotation, MATERIAL_VOID};

/// Structured description of one cell, as found in a geometry input.
///
/// `material` and `temperature` keep the input convention of the
/// surface-geometry language: whitespace-separated lists, with the
/// literal word `void` accepted as a material.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CellSpec {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub universe: Option<i32>,
    pub fill: Option<i32>,
    pub material: Option<String>,
    pub temperature: Option<String>,
    pub region: Option<String>,
    pub translation: Option<Vec<f64>>,
    pub rotation: Option<Vec<f64>>,
}

/// Lookup tables a cell needs while it is being compiled.
pub(crate) struct CellTables<'a> {
    pub surfaces: &'a SurfaceRegistry,
    pub materials: &'a IdTable,
    pub lattices: &'a IdTable,
    /// Universe user id to universe table index.
    pub universes: &'a HashMap<i32, usize>,
}

impl Cell {
    /// Compiles a cell from its structured description.
    ///
    /// Validates the fill/material exclusivity, parses and normalizes
    /// materials and temperatures, compiles the region text to infix and
    /// postfix token form with user surface ids rewritten to internal
    /// indices, and builds the transform of the filled universe.
    ///
    /// # Errors
    ///
    /// Returns a [`CellError`] or [`crate::error::RegionError`] for any
    /// violation of the description rules; construction of the enclosing
    /// geometry stops at the first failing cell.
    pub(crate) fn from_spec(spec: &CellSpec, tables: &CellTables<'_>) -> Result<Self> {
        let id = spec.id.ok_or(CellError::MissingId)?;

        if spec.fill.is_some() && spec.material.is_some() {
            return Err(CellError::FillAmbiguity(id).into());
        }
        if spec.fill.is_none() && spec.material.is_none() {
            return Err(CellError::FillMissing(id).into());
        }

        // There can be more than one material (one per distributed
        // instance), and some materials may be "void".
        let mut materials = Vec::new();
        if let Some(mats) = &spec.material {
            for word in mats.split_whitespace() {
                if word == "void" {
                    materials.push(MATERIAL_VOID);
                } else {
                    let material_id: i32 = word.parse().map_err(|_| CellError::BadMaterial {
                        cell_id: id,
                        word: word.to_string(),
                    })?;
                    let index = tables.materials.index_of(material_id).ok_or(
                        CellError::UnknownMaterial {
                            cell_id: id,
                            material_id,
                        },
                    )?;
                    materials.push(index as i32);
                }
            }
            if materials.is_empty() {
                return Err(CellError::EmptyMaterial(id).into());
            }
        }

        // Temperatures may be distributed like materials. Stored as
        // sqrt(k*T), which is what the physics needs at lookup time.
        let mut sqrtkt = Vec::new();
        if let Some(temps) = &spec.temperature {
            if spec.material.is_none() {
                return Err(CellError::TemperatureWithoutMaterial(id).into());
            }
            for word in temps.split_whitespace() {
                let t: f64 = word.parse().map_err(|_| CellError::BadTemperature {
                    cell_id: id,
                    word: word.to_string(),
                })?;
                if t < 0.0 {
                    return Err(CellError::NegativeTemperature(id).into());
                }
                sqrtkt.push((K_BOLTZMANN * t).sqrt());
            }
            if sqrtkt.len() != 1 && sqrtkt.len() != materials.len() {
                return Err(CellError::TemperatureLengthMismatch {
                    cell_id: id,
                    n_temps: sqrtkt.len(),
                    n_mats: materials.len(),
                }
                .into());
            }
        }

        // Compile the region: tokenize, rewrite user surface ids to
        // internal indices (offset by one so the signed token can never
        // be zero), then convert to postfix.
        let mut region = tokenize(spec.region.as_deref().unwrap_or(""))?;
        for token in &mut region {
            if let Token::Halfspace(t) = *token {
                let surface_id = t.abs();
                let index = tables.surfaces.index_of(surface_id).ok_or(
                    CellError::UnknownSurface {
                        cell_id: id,
                        surface_id,
                    },
                )?;
                *token = Token::Halfspace((index as i32 + 1) * t.signum());
            }
        }
        let rpn = generate_rpn(id, &region)?;

        let simple = !rpn
            .iter()
            .any(|t| t.is_op(OpKind::Union) || t.is_op(OpKind::Complement));

        let fill = match spec.fill {
            Some(fill_id) => {
                if let Some(index) = tables.lattices.index_of(fill_id) {
                    Fill::Lattice(index)
                } else if let Some(&index) = tables.universes.get(&fill_id) {
                    Fill::Universe(index)
                } else {
                    return Err(CellError::UnknownFill {
                        cell_id: id,
                        fill_id,
                    }
                    .into());
                }
            }
            None => Fill::Material(materials),
        };

        let translation = match &spec.translation {
            Some(xyz) => {
                if matches!(fill, Fill::Material(_)) {
                    return Err(CellError::IllegalTransformOnMaterialCell {
                        cell_id: id,
                        transform: "translation",
                    }
                    .into());
                }
                if xyz.len() != 3 {
                    return Err(CellError::BadVectorDimension {
                        cell_id: id,
                        transform: "translation",
                    }
                    .into());
                }
                Some(Vector3::new(xyz[0], xyz[1], xyz[2]))
            }
            None => None,
        };

        let rotation = match &spec.rotation {
            Some(angles) => {
                if matches!(fill, Fill::Material(_)) {
                    return Err(CellError::IllegalTransformOnMaterialCell {
                        cell_id: id,
                        transform: "rotation",
                    }
                    .into());
                }
                if angles.len() != 3 {
                    return Err(CellError::BadVectorDimension {
                        cell_id: id,
                        transform: "rotation",
                    }
                    .into());
                }
                Some(Rotation {
                    angles: [angles[0], angles[1], angles[2]],
                    matrix: rotation_matrix(angles[0], angles[1], angles[2]),
                })
            }
            None => None,
        };

        Ok(Self {
            id,
            name: spec.name.clone(),
            universe_id: spec.universe.unwrap_or(0),
            fill,
            sqrtkt,
            translation,
            rotation,
            region,
            rpn,
            simple,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MontecellError;
    use crate::math::Matrix3;
    use crate::surface::Plane;

    struct Fixture {
        surfaces: SurfaceRegistry,
        materials: IdTable,
        lattices: IdTable,
        universes: HashMap<i32, usize>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut surfaces = SurfaceRegistry::new();
            surfaces.add(Box::new(Plane::x(1, 0.0))).unwrap();
            surfaces.add(Box::new(Plane::x(2, 1.0))).unwrap();

            let mut materials = IdTable::new();
            materials.insert(10);
            materials.insert(20);

            let mut lattices = IdTable::new();
            lattices.insert(500);

            let mut universes = HashMap::new();
            universes.insert(0, 0);
            universes.insert(4, 1);

            Self {
                surfaces,
                materials,
                lattices,
                universes,
            }
        }

        fn tables(&self) -> CellTables<'_> {
            CellTables {
                surfaces: &self.surfaces,
                materials: &self.materials,
                lattices: &self.lattices,
                universes: &self.universes,
            }
        }
    }

    fn material_spec(id: i32) -> CellSpec {
        CellSpec {
            id: Some(id),
            material: Some("10".to_string()),
            ..CellSpec::default()
        }
    }

    fn cell_err(result: Result<Cell>) -> CellError {
        match result.unwrap_err() {
            MontecellError::Cell(e) => e,
            other => panic!("expected cell error, got {other}"),
        }
    }

    #[test]
    fn compiles_a_material_cell() {
        let fx = Fixture::new();
        let spec = CellSpec {
            region: Some("1 -2".to_string()),
            ..material_spec(3)
        };
        let cell = Cell::from_spec(&spec, &fx.tables()).unwrap();
        assert_eq!(cell.id(), 3);
        assert_eq!(cell.universe_id(), 0);
        assert_eq!(cell.fill(), &Fill::Material(vec![0]));
        assert!(cell.is_simple());
        // Surface ids 1 and 2 sit at indices 0 and 1: tokens 1 and -2.
        assert_eq!(
            cell.region(),
            &[
                Token::Halfspace(1),
                Token::Op(OpKind::Intersection),
                Token::Halfspace(-2),
            ]
        );
    }

    #[test]
    fn void_and_distributed_materials() {
        let fx = Fixture::new();
        let spec = CellSpec {
            material: Some("10 void 20".to_string()),
            ..material_spec(1)
        };
        let cell = Cell::from_spec(&spec, &fx.tables()).unwrap();
        assert_eq!(cell.fill(), &Fill::Material(vec![0, MATERIAL_VOID, 1]));
    }

    #[test]
    fn temperatures_become_sqrtkt() {
        let fx = Fixture::new();
        let spec = CellSpec {
            temperature: Some("300 600".to_string()),
            material: Some("10 20".to_string()),
            ..material_spec(1)
        };
        let cell = Cell::from_spec(&spec, &fx.tables()).unwrap();
        assert_eq!(cell.sqrtkt().len(), 2);
        assert!((cell.sqrtkt()[0] - (K_BOLTZMANN * 300.0).sqrt()).abs() < 1e-18);
        assert!((cell.sqrtkt()[1] - (K_BOLTZMANN * 600.0).sqrt()).abs() < 1e-18);
    }

    #[test]
    fn missing_id_is_fatal() {
        let fx = Fixture::new();
        let spec = CellSpec {
            material: Some("10".to_string()),
            ..CellSpec::default()
        };
        assert_eq!(
            cell_err(Cell::from_spec(&spec, &fx.tables())),
            CellError::MissingId
        );
    }

    #[test]
    fn fill_and_material_are_exclusive() {
        let fx = Fixture::new();
        let spec = CellSpec {
            fill: Some(4),
            ..material_spec(9)
        };
        assert_eq!(
            cell_err(Cell::from_spec(&spec, &fx.tables())),
            CellError::FillAmbiguity(9)
        );

        let spec = CellSpec {
            id: Some(9),
            ..CellSpec::default()
        };
        assert_eq!(
            cell_err(Cell::from_spec(&spec, &fx.tables())),
            CellError::FillMissing(9)
        );
    }

    #[test]
    fn empty_material_is_fatal() {
        let fx = Fixture::new();
        let spec = CellSpec {
            material: Some("  ".to_string()),
            ..material_spec(2)
        };
        assert_eq!(
            cell_err(Cell::from_spec(&spec, &fx.tables())),
            CellError::EmptyMaterial(2)
        );
    }

    #[test]
    fn negative_temperature_is_fatal() {
        let fx = Fixture::new();
        let spec = CellSpec {
            temperature: Some("-1".to_string()),
            ..material_spec(2)
        };
        assert_eq!(
            cell_err(Cell::from_spec(&spec, &fx.tables())),
            CellError::NegativeTemperature(2)
        );
    }

    #[test]
    fn temperature_requires_material() {
        let fx = Fixture::new();
        let spec = CellSpec {
            id: Some(2),
            fill: Some(4),
            temperature: Some("300".to_string()),
            ..CellSpec::default()
        };
        assert_eq!(
            cell_err(Cell::from_spec(&spec, &fx.tables())),
            CellError::TemperatureWithoutMaterial(2)
        );
    }

    #[test]
    fn temperature_count_must_match_materials() {
        let fx = Fixture::new();
        let spec = CellSpec {
            temperature: Some("300 600".to_string()),
            ..material_spec(2)
        };
        assert_eq!(
            cell_err(Cell::from_spec(&spec, &fx.tables())),
            CellError::TemperatureLengthMismatch {
                cell_id: 2,
                n_temps: 2,
                n_mats: 1,
            }
        );
    }

    #[test]
    fn unknown_surface_is_fatal() {
        let fx = Fixture::new();
        let spec = CellSpec {
            region: Some("1 -99".to_string()),
            ..material_spec(2)
        };
        assert_eq!(
            cell_err(Cell::from_spec(&spec, &fx.tables())),
            CellError::UnknownSurface {
                cell_id: 2,
                surface_id: 99,
            }
        );
    }

    #[test]
    fn fill_resolves_lattice_before_universe() {
        let fx = Fixture::new();
        let spec = CellSpec {
            id: Some(2),
            fill: Some(500),
            ..CellSpec::default()
        };
        let cell = Cell::from_spec(&spec, &fx.tables()).unwrap();
        assert_eq!(cell.fill(), &Fill::Lattice(0));

        let spec = CellSpec {
            id: Some(2),
            fill: Some(4),
            ..CellSpec::default()
        };
        let cell = Cell::from_spec(&spec, &fx.tables()).unwrap();
        assert_eq!(cell.fill(), &Fill::Universe(1));
    }

    #[test]
    fn unknown_fill_is_fatal() {
        let fx = Fixture::new();
        let spec = CellSpec {
            id: Some(2),
            fill: Some(777),
            ..CellSpec::default()
        };
        assert_eq!(
            cell_err(Cell::from_spec(&spec, &fx.tables())),
            CellError::UnknownFill {
                cell_id: 2,
                fill_id: 777,
            }
        );
    }

    #[test]
    fn transforms_are_illegal_on_material_cells() {
        let fx = Fixture::new();
        let spec = CellSpec {
            translation: Some(vec![1.0, 0.0, 0.0]),
            ..material_spec(2)
        };
        assert_eq!(
            cell_err(Cell::from_spec(&spec, &fx.tables())),
            CellError::IllegalTransformOnMaterialCell {
                cell_id: 2,
                transform: "translation",
            }
        );
    }

    #[test]
    fn transform_vectors_must_be_three_dimensional() {
        let fx = Fixture::new();
        let spec = CellSpec {
            id: Some(2),
            fill: Some(4),
            rotation: Some(vec![0.0, 90.0]),
            ..CellSpec::default()
        };
        assert_eq!(
            cell_err(Cell::from_spec(&spec, &fx.tables())),
            CellError::BadVectorDimension {
                cell_id: 2,
                transform: "rotation",
            }
        );
    }

    #[test]
    fn rotation_stores_angles_and_matrix() {
        let fx = Fixture::new();
        let spec = CellSpec {
            id: Some(2),
            fill: Some(4),
            rotation: Some(vec![0.0, 0.0, 0.0]),
            translation: Some(vec![1.0, 2.0, 3.0]),
            ..CellSpec::default()
        };
        let cell = Cell::from_spec(&spec, &fx.tables()).unwrap();
        let rot = cell.rotation().unwrap();
        assert_eq!(rot.angles, [0.0, 0.0, 0.0]);
        assert!((rot.matrix - Matrix3::identity()).norm() < 1e-12);
        assert_eq!(cell.translation(), Some(&Vector3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn spec_deserializes_from_structured_input() {
        let spec: CellSpec = serde_json::from_str(
            r#"{"id": 5, "material": "10 void", "region": "1 -2", "temperature": "300"}"#,
        )
        .unwrap();
        assert_eq!(spec.id, Some(5));
        assert_eq!(spec.material.as_deref(), Some("10 void"));
        let fx = Fixture::new();
        assert!(Cell::from_spec(&spec, &fx.tables()).is_ok());
    }
}
