use super::atom::Atom;
use super::chain::ChainType;
use super::ids::{AtomId, ChainId, ResidueId};
use super::system::MolecularSystem;
use super::topology::BondOrder;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SystemError {
    #[error("Residue {0} started before any chain")]
    NoCurrentChain(isize),
    #[error("Atom '{0}' added before any residue")]
    NoCurrentResidue(String),
    #[error("Duplicate atom serial: {0}")]
    DuplicateSerial(usize),
    #[error("Bond references unknown atom serial: {0}")]
    UnknownSerial(usize),
    #[error("Invalid bond between atom serials {0} and {1}")]
    InvalidBond(usize, usize),
}

/// Incremental, serial-addressed construction of a [`MolecularSystem`].
///
/// Readers stream records into the builder: a chain is started, then residues
/// within it, then atoms within the current residue. Bonds are added by atom
/// serial once the atoms exist.
#[derive(Debug, Default)]
pub struct MolecularSystemBuilder {
    system: MolecularSystem,
    atom_serial_map: HashMap<usize, AtomId>,
    current_chain: Option<ChainId>,
    current_residue: Option<ResidueId>,
}

impl MolecularSystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the chain with `id` current, creating it if needed.
    pub fn start_chain(&mut self, id: char, chain_type: ChainType) -> &mut Self {
        self.current_chain = Some(self.system.add_chain(id, chain_type));
        self.current_residue = None;
        self
    }

    /// Makes the residue `residue_number` of the current chain current, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::NoCurrentChain`] if no chain was started.
    pub fn start_residue(
        &mut self,
        residue_number: isize,
        name: &str,
    ) -> Result<&mut Self, SystemError> {
        let chain_id = self
            .current_chain
            .ok_or(SystemError::NoCurrentChain(residue_number))?;
        let residue_id = self
            .system
            .add_residue(chain_id, residue_number, name)
            .ok_or(SystemError::NoCurrentChain(residue_number))?;
        self.current_residue = Some(residue_id);
        Ok(self)
    }

    /// Adds an atom to the current residue, keyed by `atom.serial`.
    ///
    /// # Errors
    ///
    /// Returns an error if no residue was started or the serial is already taken.
    pub fn add_atom(&mut self, atom: Atom) -> Result<AtomId, SystemError> {
        let residue_id = self
            .current_residue
            .ok_or_else(|| SystemError::NoCurrentResidue(atom.name.clone()))?;
        let serial = atom.serial;
        if self.atom_serial_map.contains_key(&serial) {
            return Err(SystemError::DuplicateSerial(serial));
        }
        let name = atom.name.clone();
        let atom_id = self
            .system
            .add_atom_to_residue(residue_id, atom)
            .ok_or(SystemError::NoCurrentResidue(name))?;
        self.atom_serial_map.insert(serial, atom_id);
        Ok(atom_id)
    }

    /// Bonds the atoms with the given serials.
    ///
    /// # Errors
    ///
    /// Returns an error if either serial is unknown or both are the same atom.
    pub fn add_bond(
        &mut self,
        serial1: usize,
        serial2: usize,
        order: BondOrder,
    ) -> Result<&mut Self, SystemError> {
        let atom1 = self.atom_id(serial1)?;
        let atom2 = self.atom_id(serial2)?;
        self.system
            .add_bond(atom1, atom2, order)
            .ok_or(SystemError::InvalidBond(serial1, serial2))?;
        Ok(self)
    }

    fn atom_id(&self, serial: usize) -> Result<AtomId, SystemError> {
        self.atom_serial_map
            .get(&serial)
            .copied()
            .ok_or(SystemError::UnknownSerial(serial))
    }

    pub fn atom_count(&self) -> usize {
        self.atom_serial_map.len()
    }

    pub fn build(self) -> MolecularSystem {
        self.system
    }
}
