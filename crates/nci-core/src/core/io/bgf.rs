use crate::core::chemistry::residues;
use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::builder::{MolecularSystemBuilder, SystemError};
use crate::core::models::chain::ChainType;
use crate::core::models::element::Element;
use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::system::MolecularSystem;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use std::collections::{BTreeMap, HashMap};
use std::io::{self, BufRead};
use thiserror::Error;

/// Partial charges at least this large on unbonded non-water atoms are read as
/// ionic formal charges.
const ION_CHARGE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BgfMetadata {
    /// Header, remark and format lines, in file order.
    pub header_lines: Vec<String>,
    pub force_field: Option<String>,
}

#[derive(Debug, Error)]
pub enum BgfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: BgfParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(#[from] SystemError),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BgfParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 80 chars)")]
    LineTooShort,
    #[error("Invalid atom serial in {record} record (value: '{value}')")]
    InvalidBondSerial { record: String, value: String },
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_field<T: std::str::FromStr>(
    line: &str,
    line_num: usize,
    (start, end): (usize, usize),
    as_float: bool,
) -> Result<T, BgfError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| {
        let columns = format!("{}-{}", start + 1, end);
        let value = value.to_string();
        BgfError::Parse {
            line: line_num,
            kind: if as_float {
                BgfParseErrorKind::InvalidFloat { columns, value }
            } else {
                BgfParseErrorKind::InvalidInt { columns, value }
            },
        }
    })
}

/// Element from the force-field type prefix (`C_R` -> C, `Zn` -> Zn), falling
/// back to the atom name.
fn element_of(ff_type: &str, atom_name: &str) -> Element {
    ff_type
        .split('_')
        .next()
        .and_then(Element::from_symbol)
        .unwrap_or_else(|| Element::guess_from_atom_name(atom_name))
}

fn chain_type_of(record_type: &str, residue_name: &str) -> ChainType {
    if record_type == "ATOM" {
        ChainType::Protein
    } else if residues::is_water(residue_name) {
        ChainType::Water
    } else {
        ChainType::Ligand
    }
}

fn parse_serials(parts: &[&str], record: &str, line_num: usize) -> Result<Vec<usize>, BgfError> {
    parts
        .iter()
        .map(|p| {
            p.parse().map_err(|_| BgfError::Parse {
                line: line_num,
                kind: BgfParseErrorKind::InvalidBondSerial {
                    record: record.to_string(),
                    value: p.to_string(),
                },
            })
        })
        .collect()
}

/// Reader for BGF (BIOGRF) structure files.
///
/// `ATOM`/`HETATM` records provide atoms, `CONECT` records list every partner of
/// an atom and the optional `ORDER` record that follows gives the bond orders
/// in the same partner order.
pub struct BgfFile;

#[derive(Default)]
struct AtomRecords {
    current_chain: Option<char>,
    current_residue: Option<isize>,
    partial_charges: Vec<(AtomId, f64)>,
}

impl BgfFile {
    fn read_atom(
        builder: &mut MolecularSystemBuilder,
        records: &mut AtomRecords,
        record_type: &str,
        line: &str,
        line_num: usize,
    ) -> Result<(), BgfError> {
        if line.len() < 80 {
            return Err(BgfError::Parse {
                line: line_num,
                kind: BgfParseErrorKind::LineTooShort,
            });
        }

        let name = slice_and_trim(line, 13, 18);
        if name.is_empty() {
            return Err(BgfError::Parse {
                line: line_num,
                kind: BgfParseErrorKind::MissingRequiredField {
                    columns: "14-18".into(),
                },
            });
        }
        let ff_type = slice_and_trim(line, 61, 66);
        if ff_type.is_empty() {
            return Err(BgfError::Parse {
                line: line_num,
                kind: BgfParseErrorKind::MissingRequiredField {
                    columns: "62-66".into(),
                },
            });
        }
        let serial: usize = parse_field(line, line_num, (7, 12), false)?;
        let residue_number: isize = parse_field(line, line_num, (25, 30), false)?;
        let x: f64 = parse_field(line, line_num, (30, 40), true)?;
        let y: f64 = parse_field(line, line_num, (40, 50), true)?;
        let z: f64 = parse_field(line, line_num, (50, 60), true)?;
        let charge: f64 = parse_field(line, line_num, (72, 80), true)?;
        let residue_name = slice_and_trim(line, 19, 22);
        let chain_id = slice_and_trim(line, 23, 24).chars().next().unwrap_or('A');

        if records.current_chain != Some(chain_id) {
            builder.start_chain(chain_id, chain_type_of(record_type, residue_name));
            records.current_chain = Some(chain_id);
            records.current_residue = None;
        }
        if records.current_residue != Some(residue_number) {
            builder.start_residue(residue_number, residue_name)?;
            records.current_residue = Some(residue_number);
        }

        let atom = Atom {
            serial,
            ..Atom::new(name, ResidueId::default(), Point3::new(x, y, z))
                .with_element(element_of(ff_type, name))
        };
        let atom_id = builder.add_atom(atom)?;
        if !residues::is_water(residue_name) {
            records.partial_charges.push((atom_id, charge));
        }
        Ok(())
    }

    /// Unbonded atoms carrying a large partial charge are ions; their charge is
    /// rounded into the formal charge.
    fn assign_ion_charges(system: &mut MolecularSystem, partial_charges: &[(AtomId, f64)]) {
        for &(atom_id, charge) in partial_charges {
            if charge.abs() < ION_CHARGE_THRESHOLD {
                continue;
            }
            let unbonded = system
                .get_bonded_neighbors(atom_id)
                .is_none_or(|n| n.is_empty());
            if let (true, Some(atom)) = (unbonded, system.atom_mut(atom_id)) {
                atom.formal_charge = charge.round().clamp(-8.0, 8.0) as i8;
            }
        }
    }
}

impl MolecularFile for BgfFile {
    const FORMAT: &'static str = "BGF";

    type Metadata = BgfMetadata;
    type Error = BgfError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut builder = MolecularSystemBuilder::new();
        let mut metadata = BgfMetadata::default();
        let mut records = AtomRecords::default();

        let mut conect: Vec<(usize, Vec<usize>)> = Vec::new();
        let mut orders: HashMap<usize, Vec<BondOrder>> = HashMap::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;
            if line.trim().is_empty() {
                continue;
            }

            let record_type = slice_and_trim(&line, 0, 6);
            match record_type {
                "ATOM" | "HETATM" => {
                    Self::read_atom(&mut builder, &mut records, record_type, &line, line_num)?;
                }
                "CONECT" | "ORDER" => {
                    let parts: Vec<&str> = line.split_whitespace().skip(1).collect();
                    let Some((first, rest)) = parts.split_first() else {
                        continue;
                    };
                    let atom = parse_serials(&[*first], record_type, line_num)?[0];
                    if record_type == "CONECT" {
                        conect.push((atom, parse_serials(rest, record_type, line_num)?));
                    } else {
                        let bond_orders = rest.iter().map(|o| o.parse().unwrap_or_default());
                        orders.insert(atom, bond_orders.collect());
                    }
                }
                "END" => break,
                _ => {
                    if let Some(force_field) = line.strip_prefix("FORCEFIELD") {
                        metadata.force_field = Some(force_field.trim().to_string());
                    }
                    metadata.header_lines.push(line);
                }
            }
        }

        if builder.atom_count() == 0 {
            return Err(BgfError::MissingRecord("ATOM/HETATM records".into()));
        }

        let mut bonds: BTreeMap<(usize, usize), BondOrder> = BTreeMap::new();
        for (atom, partners) in &conect {
            let atom = *atom;
            for (k, &partner) in partners.iter().enumerate() {
                let order = orders
                    .get(&atom)
                    .and_then(|o| o.get(k))
                    .copied()
                    .unwrap_or_default();
                let entry = bonds
                    .entry((atom.min(partner), atom.max(partner)))
                    .or_insert(order);
                if *entry == BondOrder::Single {
                    *entry = order;
                }
            }
        }
        for ((serial1, serial2), order) in bonds {
            builder.add_bond(serial1, serial2, order)?;
        }

        let mut system = builder.build();
        Self::assign_ion_charges(&mut system, &records.partial_charges);
        Ok((system, metadata))
    }
}
