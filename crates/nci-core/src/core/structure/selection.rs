use super::Structure;
use crate::core::collections::BitSet;
use crate::core::models::element::Element;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A composable description of a set of atoms.
///
/// Selections are resolved against a [`Structure`] into a [`BitSet`] over its atom
/// indices. The textual form accepted by [`FromStr`] is a list of terms:
///
/// - `all`
/// - `chain:A`
/// - `resname:HEM`
/// - `residue:A/42` (chain and residue number)
/// - `element:Zn`
/// - `model:0`
/// - `atoms:3,4,17` (dense atom indices)
///
/// A term may be prefixed with `!` to negate it; terms joined by `&` intersect,
/// and `|` separates alternatives (lowest precedence).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomSelection {
    All,
    Chain(char),
    ResidueName(String),
    Residue { chain_id: char, residue_number: isize },
    Element(Element),
    Model(usize),
    Atoms(Vec<usize>),
    Not(Box<AtomSelection>),
    And(Vec<AtomSelection>),
    Or(Vec<AtomSelection>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionParseError {
    #[error("Empty selection term")]
    EmptyTerm,
    #[error("Unknown selection keyword '{0}'")]
    UnknownKeyword(String),
    #[error("Invalid value '{value}' for selection keyword '{keyword}'")]
    InvalidValue { keyword: String, value: String },
}

impl AtomSelection {
    /// Whether a single atom is part of the selection.
    pub fn matches(&self, structure: &dyn Structure, atom: usize) -> bool {
        match self {
            AtomSelection::All => true,
            AtomSelection::Chain(id) => structure.chain_id(structure.residue_index(atom)) == *id,
            AtomSelection::ResidueName(name) => structure
                .atom_residue_name(atom)
                .trim()
                .eq_ignore_ascii_case(name),
            AtomSelection::Residue {
                chain_id,
                residue_number,
            } => {
                let residue = structure.residue_index(atom);
                structure.chain_id(residue) == *chain_id
                    && structure.residue_number(residue) == *residue_number
            }
            AtomSelection::Element(element) => structure.element(atom) == *element,
            AtomSelection::Model(model) => structure.model_index(atom) == *model,
            AtomSelection::Atoms(atoms) => atoms.contains(&atom),
            AtomSelection::Not(inner) => !inner.matches(structure, atom),
            AtomSelection::And(terms) => terms.iter().all(|t| t.matches(structure, atom)),
            AtomSelection::Or(terms) => terms.iter().any(|t| t.matches(structure, atom)),
        }
    }

    /// Resolves the selection to a bitset over all atoms of `structure`.
    pub fn resolve(&self, structure: &dyn Structure) -> BitSet {
        let count = structure.atom_count();
        match self {
            AtomSelection::All => BitSet::new(count, true),
            AtomSelection::Atoms(atoms) => {
                BitSet::from_indices(count, atoms.iter().copied().filter(|&a| a < count))
            }
            _ => BitSet::from_indices(count, (0..count).filter(|&a| self.matches(structure, a))),
        }
    }

    fn parse_term(term: &str) -> Result<Self, SelectionParseError> {
        let term = term.trim();
        if let Some(rest) = term.strip_prefix('!') {
            return Ok(AtomSelection::Not(Box::new(Self::parse_term(rest)?)));
        }
        if term.is_empty() {
            return Err(SelectionParseError::EmptyTerm);
        }
        if term.eq_ignore_ascii_case("all") {
            return Ok(AtomSelection::All);
        }

        let (keyword, value) = term
            .split_once(':')
            .ok_or_else(|| SelectionParseError::UnknownKeyword(term.to_string()))?;
        let keyword = keyword.trim().to_ascii_lowercase();
        let value = value.trim();
        let invalid = || SelectionParseError::InvalidValue {
            keyword: keyword.clone(),
            value: value.to_string(),
        };

        match keyword.as_str() {
            "chain" => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(AtomSelection::Chain(c)),
                    _ => Err(invalid()),
                }
            }
            "resname" if !value.is_empty() => Ok(AtomSelection::ResidueName(value.to_string())),
            "residue" => {
                let (chain, number) = value.split_once('/').ok_or_else(invalid)?;
                let mut chars = chain.chars();
                let chain_id = match (chars.next(), chars.next()) {
                    (Some(c), None) => c,
                    _ => return Err(invalid()),
                };
                let residue_number = number.trim().parse().map_err(|_| invalid())?;
                Ok(AtomSelection::Residue {
                    chain_id,
                    residue_number,
                })
            }
            "element" => value
                .parse::<Element>()
                .map(AtomSelection::Element)
                .map_err(|_| invalid()),
            "model" => value
                .parse()
                .map(AtomSelection::Model)
                .map_err(|_| invalid()),
            "atoms" => value
                .split(',')
                .map(|v| v.trim().parse::<usize>())
                .collect::<Result<Vec<_>, _>>()
                .map(AtomSelection::Atoms)
                .map_err(|_| invalid()),
            "resname" => Err(invalid()),
            _ => Err(SelectionParseError::UnknownKeyword(keyword.to_string())),
        }
    }
}

impl FromStr for AtomSelection {
    type Err = SelectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut alternatives = s
            .split('|')
            .map(|alternative| {
                let mut terms = alternative
                    .split('&')
                    .map(AtomSelection::parse_term)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if terms.len() == 1 {
                    terms.remove(0)
                } else {
                    AtomSelection::And(terms)
                })
            })
            .collect::<Result<Vec<_>, SelectionParseError>>()?;
        Ok(if alternatives.len() == 1 {
            alternatives.remove(0)
        } else {
            AtomSelection::Or(alternatives)
        })
    }
}

impl fmt::Display for AtomSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomSelection::All => write!(f, "all"),
            AtomSelection::Chain(id) => write!(f, "chain:{id}"),
            AtomSelection::ResidueName(name) => write!(f, "resname:{name}"),
            AtomSelection::Residue {
                chain_id,
                residue_number,
            } => write!(f, "residue:{chain_id}/{residue_number}"),
            AtomSelection::Element(element) => write!(f, "element:{element}"),
            AtomSelection::Model(model) => write!(f, "model:{model}"),
            AtomSelection::Atoms(atoms) => {
                let list: Vec<String> = atoms.iter().map(|a| a.to_string()).collect();
                write!(f, "atoms:{}", list.join(","))
            }
            AtomSelection::Not(inner) => write!(f, "!{inner}"),
            AtomSelection::And(terms) => {
                let parts: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
                write!(f, "{}", parts.join("&"))
            }
            AtomSelection::Or(terms) => {
                let parts: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
                write!(f, "{}", parts.join("|"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::chain::ChainType;
    use crate::core::models::system::MolecularSystem;
    use crate::core::structure::IndexedStructure;
    use nalgebra::Point3;

    fn system() -> MolecularSystem {
        let mut system = MolecularSystem::new();
        let a = system.add_chain('A', ChainType::Protein);
        let b = system.add_chain('B', ChainType::Ligand);
        let his = system.add_residue(a, 42, "HIS").unwrap();
        let zn = system.add_residue(b, 1, "ZN").unwrap();
        for name in ["N", "CA", "NE2"] {
            system
                .add_atom_to_residue(his, Atom::new(name, his, Point3::origin()))
                .unwrap();
        }
        system
            .add_atom_to_residue(
                zn,
                Atom::new("ZN", zn, Point3::origin())
                    .with_element(Element::ZN)
                    .with_model_index(1),
            )
            .unwrap();
        system
    }

    #[test]
    fn parse_simple_terms() {
        assert_eq!("all".parse::<AtomSelection>(), Ok(AtomSelection::All));
        assert_eq!("chain:A".parse::<AtomSelection>(), Ok(AtomSelection::Chain('A')));
        assert_eq!(
            "residue:A/-3".parse::<AtomSelection>(),
            Ok(AtomSelection::Residue {
                chain_id: 'A',
                residue_number: -3
            })
        );
        assert_eq!("element:zn".parse::<AtomSelection>(), Ok(AtomSelection::Element(Element::ZN)));
        assert_eq!("atoms:1, 2".parse::<AtomSelection>(), Ok(AtomSelection::Atoms(vec![1, 2])));
    }

    #[test]
    fn parse_combines_terms_with_precedence() {
        let selection: AtomSelection = "chain:A & !element:N | resname:ZN".parse().unwrap();
        assert_eq!(
            selection,
            AtomSelection::Or(vec![
                AtomSelection::And(vec![
                    AtomSelection::Chain('A'),
                    AtomSelection::Not(Box::new(AtomSelection::Element(Element::N))),
                ]),
                AtomSelection::ResidueName("ZN".to_string()),
            ])
        );
        assert_eq!(selection.to_string(), "chain:A&!element:N|resname:ZN");
    }

    #[test]
    fn parse_reports_bad_terms() {
        assert_eq!(
            "colour:red".parse::<AtomSelection>(),
            Err(SelectionParseError::UnknownKeyword("colour".to_string()))
        );
        assert!(matches!(
            "chain:AB".parse::<AtomSelection>(),
            Err(SelectionParseError::InvalidValue { .. })
        ));
        assert_eq!(
            "chain:A&".parse::<AtomSelection>(),
            Err(SelectionParseError::EmptyTerm)
        );
    }

    #[test]
    fn resolve_produces_matching_bitsets() {
        let system = system();
        let view = IndexedStructure::new(&system);

        let chain_a: AtomSelection = "chain:A".parse().unwrap();
        assert_eq!(chain_a.resolve(&view).iter().collect::<Vec<_>>(), vec![0, 1, 2]);

        let nitrogens: AtomSelection = "element:N".parse().unwrap();
        assert_eq!(nitrogens.resolve(&view).iter().collect::<Vec<_>>(), vec![0, 2]);

        let model: AtomSelection = "model:1".parse().unwrap();
        assert_eq!(model.resolve(&view).iter().collect::<Vec<_>>(), vec![3]);

        let residue: AtomSelection = "residue:A/42&!element:C".parse().unwrap();
        assert_eq!(residue.resolve(&view).count(), 2);

        assert_eq!(AtomSelection::All.resolve(&view).count(), 4);
        assert_eq!(
            AtomSelection::Atoms(vec![3, 99]).resolve(&view).iter().collect::<Vec<_>>(),
            vec![3]
        );
    }
}
