use super::error::FormatError;
use super::traits::PersistedFile;
use crate::core::models::crystal::Crystal;
use crate::core::models::element::Element;
use crate::core::models::ids::MoleculeId;
use crate::core::models::lattice::Lattice;
use crate::core::models::molecule::Molecule;
use crate::core::models::structure::Structure;
use crate::core::models::symmetry::SymmetryOperation;
use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct FileLattice {
    a: [f64; 3],
    b: [f64; 3],
    c: [f64; 3],
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct FileMolecule {
    id: u32,
    #[serde(default)]
    solvent: bool,
    elements: Vec<String>,
    positions: Vec<[f64; 3]>,
    #[serde(default)]
    bonds: Vec<[usize; 2]>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct FileSymmetryOperation {
    /// Row-major 3x3 Cartesian rotation.
    rotation: [[f64; 3]; 3],
    #[serde(default)]
    translation: [f64; 3],
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
struct FileCrystal {
    lattice: FileLattice,
    #[serde(default)]
    molecules: Vec<FileMolecule>,
    #[serde(default)]
    symmetry: Vec<FileSymmetryOperation>,
}

impl FileMolecule {
    fn into_molecule(self) -> Result<Molecule, FormatError> {
        let elements = self
            .elements
            .iter()
            .map(|symbol| symbol.parse::<Element>())
            .collect::<Result<Vec<_>, _>>()?;
        let positions = self
            .positions
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
            .collect();
        let bonds: Vec<(usize, usize)> = self.bonds.iter().map(|&[a, b]| (a, b)).collect();
        let structure =
            Structure::new(elements, positions, &bonds).map_err(|source| {
                FormatError::Structure {
                    molecule: self.id,
                    source,
                }
            })?;
        Ok(Molecule::new(MoleculeId(self.id), structure).with_solvent_flag(self.solvent))
    }

    fn from_molecule(molecule: &Molecule) -> Self {
        let s = &molecule.structure;
        Self {
            id: molecule.id.0,
            solvent: molecule.is_solvent,
            elements: s.elements().map(|e| e.symbol().to_string()).collect(),
            positions: s.positions().iter().map(|p| [p.x, p.y, p.z]).collect(),
            bonds: s.bonds().map(|(a, b)| [a, b]).collect(),
        }
    }
}

impl From<&FileSymmetryOperation> for SymmetryOperation {
    fn from(op: &FileSymmetryOperation) -> Self {
        let r = op.rotation;
        SymmetryOperation::new(
            Matrix3::new(
                r[0][0], r[0][1], r[0][2], r[1][0], r[1][1], r[1][2], r[2][0], r[2][1], r[2][2],
            ),
            Vector3::from(op.translation),
        )
    }
}

impl From<&SymmetryOperation> for FileSymmetryOperation {
    fn from(op: &SymmetryOperation) -> Self {
        let m = &op.rotation;
        Self {
            rotation: [
                [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
                [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
                [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
            ],
            translation: [op.translation.x, op.translation.y, op.translation.z],
        }
    }
}

/// TOML description of an already decomposed crystal.
///
/// ```toml
/// [lattice]
/// a = [10.0, 0.0, 0.0]
/// b = [0.0, 10.0, 0.0]
/// c = [0.0, 0.0, 10.0]
///
/// [[molecules]]
/// id = 1
/// elements = ["O", "H", "H"]
/// positions = [[0.0, 0.0, 0.0], [0.96, 0.0, 0.0], [-0.24, 0.93, 0.0]]
/// bonds = [[0, 1], [0, 2]]
///
/// [[symmetry]]
/// rotation = [[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, -1.0]]
/// ```
pub struct CrystalFile;

impl PersistedFile for CrystalFile {
    type Content = Crystal;
    type Error = FormatError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Content, Self::Error> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let file: FileCrystal = toml::from_str(&text)?;

        let lattice = Lattice::from_vectors(
            Vector3::from(file.lattice.a),
            Vector3::from(file.lattice.b),
            Vector3::from(file.lattice.c),
        )?;
        let molecules = file
            .molecules
            .into_iter()
            .map(FileMolecule::into_molecule)
            .collect::<Result<Vec<_>, _>>()?;
        let symmetry = file.symmetry.iter().map(SymmetryOperation::from).collect();
        Ok(Crystal::new(lattice, molecules, symmetry)?)
    }

    fn write_to(content: &Self::Content, writer: &mut impl Write) -> Result<(), Self::Error> {
        let m = content.lattice().matrix();
        let column = |i: usize| [m[(0, i)], m[(1, i)], m[(2, i)]];
        let file = FileCrystal {
            lattice: FileLattice {
                a: column(0),
                b: column(1),
                c: column(2),
            },
            molecules: content.molecules().map(FileMolecule::from_molecule).collect(),
            symmetry: content
                .symmetry_operations()
                .iter()
                .map(FileSymmetryOperation::from)
                .collect(),
        };
        writer.write_all(toml::to_string(&file)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATER_DIMER_CELL: &str = r#"
[lattice]
a = [10.0, 0.0, 0.0]
b = [0.0, 10.0, 0.0]
c = [0.0, 0.0, 10.0]

[[molecules]]
id = 2
elements = ["O", "H", "H"]
positions = [[5.0, 5.0, 5.0], [5.96, 5.0, 5.0], [4.76, 5.93, 5.0]]
bonds = [[0, 1], [0, 2]]

[[molecules]]
id = 1
solvent = true
elements = ["o", "h", "h"]
positions = [[1.0, 1.0, 1.0], [1.96, 1.0, 1.0], [0.76, 1.93, 1.0]]
bonds = [[0, 1], [0, 2]]

[[symmetry]]
rotation = [[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, -1.0]]
"#;

    #[test]
    fn reads_lattice_molecules_and_symmetry() {
        let crystal = CrystalFile::read_from_str(WATER_DIMER_CELL).unwrap();
        assert_eq!(crystal.molecule_ids(), vec![MoleculeId(1), MoleculeId(2)]);
        let first = crystal.molecule(MoleculeId(1)).unwrap();
        assert!(first.is_solvent);
        assert_eq!(first.structure.element(0).symbol(), "O");
        assert_eq!(first.structure.graph().edge_count(), 2);
        assert_eq!(crystal.symmetry_operations().len(), 1);
        assert!(!crystal.symmetry_operations()[0].has_translation());
    }

    #[test]
    fn written_crystal_reads_back_identically() {
        let crystal = CrystalFile::read_from_str(WATER_DIMER_CELL).unwrap();
        let text = CrystalFile::write_to_string(&crystal).unwrap();
        let reread = CrystalFile::read_from_str(&text).unwrap();
        assert_eq!(CrystalFile::write_to_string(&reread).unwrap(), text);
    }

    #[test]
    fn bad_bond_index_names_the_molecule() {
        let text = WATER_DIMER_CELL.replace("[[0, 1], [0, 2]]", "[[0, 7]]");
        let err = CrystalFile::read_from_str(&text).unwrap_err();
        assert!(matches!(err, FormatError::Structure { molecule: 2, .. }));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let text = WATER_DIMER_CELL.replace("solvent = true", "solvant = true");
        assert!(matches!(
            CrystalFile::read_from_str(&text),
            Err(FormatError::Toml(_))
        ));
    }
}
