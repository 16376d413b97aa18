use super::error::FormatError;
use super::traits::PersistedFile;
use crate::core::models::dimer::Dimer;
use crate::core::models::ids::{DimerId, MoleculeId};
use crate::core::models::lattice::LatticeDisplacement;
use nalgebra::Vector3;
use std::collections::HashMap;
use std::io::{BufRead, Write};

const FIELD_COUNT: usize = 12;

/// One persisted dimer: identity, placement and recentering.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub id: DimerId,
    pub molecule_1: MoleculeId,
    pub molecule_2: MoleculeId,
    pub displacement: LatticeDisplacement,
    pub cartesian_displacement: Vector3<f64>,
    pub recentering: Vector3<f64>,
}

impl LedgerEntry {
    pub fn key(&self) -> (MoleculeId, MoleculeId, LatticeDisplacement) {
        (self.molecule_1, self.molecule_2, self.displacement)
    }
}

impl From<&Dimer> for LedgerEntry {
    fn from(dimer: &Dimer) -> Self {
        Self {
            id: dimer.id,
            molecule_1: dimer.molecule_1,
            molecule_2: dimer.molecule_2,
            displacement: dimer.displacement,
            cartesian_displacement: dimer.cartesian_displacement,
            recentering: dimer.recentering,
        }
    }
}

/// All dimers of a run, in id order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimerLedger {
    entries: Vec<LedgerEntry>,
}

impl DimerLedger {
    pub fn new(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }

    pub fn from_dimers(dimers: &[Dimer]) -> Self {
        Self::new(dimers.iter().map(LedgerEntry::from).collect())
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persisted recentering vectors keyed by dimer identity.
    pub fn recentering_by_key(
        &self,
    ) -> HashMap<(MoleculeId, MoleculeId, LatticeDisplacement), Vector3<f64>> {
        self.entries
            .iter()
            .map(|entry| (entry.key(), entry.recentering))
            .collect()
    }
}

pub struct LedgerFile;

fn parse_field<T: std::str::FromStr>(
    field: &str,
    name: &str,
    line: usize,
) -> Result<T, FormatError> {
    field
        .parse()
        .map_err(|_| FormatError::parse(line, format!("invalid {} '{}'", name, field)))
}

fn parse_line(line: &str, line_num: usize) -> Result<LedgerEntry, FormatError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FIELD_COUNT {
        return Err(FormatError::parse(
            line_num,
            format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        ));
    }
    let float = |idx: usize, name: &str| parse_field::<f64>(fields[idx], name, line_num);
    Ok(LedgerEntry {
        id: DimerId(parse_field(fields[0], "dimer id", line_num)?),
        molecule_1: MoleculeId(parse_field(fields[1], "molecule id", line_num)?),
        molecule_2: MoleculeId(parse_field(fields[2], "molecule id", line_num)?),
        displacement: LatticeDisplacement::new(
            parse_field(fields[3], "displacement", line_num)?,
            parse_field(fields[4], "displacement", line_num)?,
            parse_field(fields[5], "displacement", line_num)?,
        ),
        cartesian_displacement: Vector3::new(
            float(6, "cartesian displacement")?,
            float(7, "cartesian displacement")?,
            float(8, "cartesian displacement")?,
        ),
        recentering: Vector3::new(
            float(9, "recentering vector")?,
            float(10, "recentering vector")?,
            float(11, "recentering vector")?,
        ),
    })
}

impl PersistedFile for LedgerFile {
    type Content = DimerLedger;
    type Error = FormatError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Content, Self::Error> {
        let mut entries = Vec::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(parse_line(&line, line_num + 1)?);
        }
        Ok(DimerLedger::new(entries))
    }

    fn write_to(content: &Self::Content, writer: &mut impl Write) -> Result<(), Self::Error> {
        for entry in content.entries() {
            writeln!(
                writer,
                " {:>7} {:>7} {:>7} {:>4} {:>4} {:>4} {:>21.12} {:>21.12} {:>21.12} {:>21.12} {:>21.12} {:>21.12}",
                entry.id.0,
                entry.molecule_1.0,
                entry.molecule_2.0,
                entry.displacement.i,
                entry.displacement.j,
                entry.displacement.k,
                entry.cartesian_displacement.x,
                entry.cartesian_displacement.y,
                entry.cartesian_displacement.z,
                entry.recentering.x,
                entry.recentering.y,
                entry.recentering.z,
            )?;
        }
        Ok(())
    }
}
