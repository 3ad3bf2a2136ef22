use super::ids::{AtomId, ResidueId};
use crate::core::utils::identifiers;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identity shared by every kind of molecule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityRecord {
    /// Primary (label) asym id.
    pub id: String,
    /// Author-assigned chain id.
    pub auth_id: String,
    /// The entity this molecule instantiates, if the file declared one.
    pub entity_id: Option<String>,
    /// Entity description for polymers, component id for small molecules.
    pub name: String,
    /// One-letter sequence; empty for small molecules.
    pub sequence: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoleculeType {
    Polymer,
    BranchedPolymer,
    NonPolymer,
    Water,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown entity type '{0}'")]
pub struct ParseMoleculeTypeError(pub String);

impl FromStr for MoleculeType {
    type Err = ParseMoleculeTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "polymer" => Ok(Self::Polymer),
            "branched" => Ok(Self::BranchedPolymer),
            "non-polymer" | "macrolide" => Ok(Self::NonPolymer),
            "water" => Ok(Self::Water),
            _ => Err(ParseMoleculeTypeError(s.to_string())),
        }
    }
}

impl fmt::Display for MoleculeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Polymer => "polymer",
            Self::BranchedPolymer => "branched",
            Self::NonPolymer => "non-polymer",
            Self::Water => "water",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polymer {
    pub entity: EntityRecord,
    pub(crate) residues: Vec<ResidueId>,
    pub(crate) helices: Vec<Vec<ResidueId>>,
    pub(crate) strands: Vec<Vec<ResidueId>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BranchedPolymer {
    pub entity: EntityRecord,
    pub(crate) residues: Vec<ResidueId>,
}

/// A ligand or water: atoms owned directly, without residues.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SmallMolecule {
    pub entity: EntityRecord,
    /// Author sequence number of the source residue.
    pub number: Option<i64>,
    pub insertion_code: String,
    pub(crate) atoms: Vec<AtomId>,
}

impl SmallMolecule {
    /// Author-facing label such as `"A.500"`.
    pub fn label(&self) -> String {
        match self.number {
            Some(number) => format!(
                "{}.{}",
                self.entity.auth_id,
                identifiers::residue_key(number, &self.insertion_code)
            ),
            None => self.entity.auth_id.clone(),
        }
    }
}

/// A molecule in a model, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Molecule {
    Polymer(Polymer),
    BranchedPolymer(BranchedPolymer),
    NonPolymer(SmallMolecule),
    Water(SmallMolecule),
}

impl Molecule {
    /// Creates an empty molecule of the given kind.
    pub fn new(molecule_type: MoleculeType, entity: EntityRecord) -> Self {
        match molecule_type {
            MoleculeType::Polymer => Self::Polymer(Polymer {
                entity,
                ..Default::default()
            }),
            MoleculeType::BranchedPolymer => Self::BranchedPolymer(BranchedPolymer {
                entity,
                ..Default::default()
            }),
            MoleculeType::NonPolymer => Self::NonPolymer(SmallMolecule {
                entity,
                ..Default::default()
            }),
            MoleculeType::Water => Self::Water(SmallMolecule {
                entity,
                ..Default::default()
            }),
        }
    }

    pub fn molecule_type(&self) -> MoleculeType {
        match self {
            Self::Polymer(_) => MoleculeType::Polymer,
            Self::BranchedPolymer(_) => MoleculeType::BranchedPolymer,
            Self::NonPolymer(_) => MoleculeType::NonPolymer,
            Self::Water(_) => MoleculeType::Water,
        }
    }

    pub fn entity(&self) -> &EntityRecord {
        match self {
            Self::Polymer(p) => &p.entity,
            Self::BranchedPolymer(b) => &b.entity,
            Self::NonPolymer(m) | Self::Water(m) => &m.entity,
        }
    }

    pub fn entity_mut(&mut self) -> &mut EntityRecord {
        match self {
            Self::Polymer(p) => &mut p.entity,
            Self::BranchedPolymer(b) => &mut b.entity,
            Self::NonPolymer(m) | Self::Water(m) => &mut m.entity,
        }
    }

    pub fn asym_id(&self) -> &str {
        &self.entity().id
    }

    pub fn name(&self) -> &str {
        &self.entity().name
    }

    pub fn is_water(&self) -> bool {
        matches!(self, Self::Water(_))
    }

    /// Residues in chain order; empty for ligands and waters.
    pub fn residues(&self) -> &[ResidueId] {
        match self {
            Self::Polymer(p) => &p.residues,
            Self::BranchedPolymer(b) => &b.residues,
            Self::NonPolymer(_) | Self::Water(_) => &[],
        }
    }

    pub(crate) fn residues_mut(&mut self) -> Option<&mut Vec<ResidueId>> {
        match self {
            Self::Polymer(p) => Some(&mut p.residues),
            Self::BranchedPolymer(b) => Some(&mut b.residues),
            Self::NonPolymer(_) | Self::Water(_) => None,
        }
    }

    /// Atoms owned directly by a ligand or water; empty for polymers.
    pub fn direct_atoms(&self) -> &[AtomId] {
        match self {
            Self::NonPolymer(m) | Self::Water(m) => &m.atoms,
            Self::Polymer(_) | Self::BranchedPolymer(_) => &[],
        }
    }

    pub(crate) fn direct_atoms_mut(&mut self) -> Option<&mut Vec<AtomId>> {
        match self {
            Self::NonPolymer(m) | Self::Water(m) => Some(&mut m.atoms),
            Self::Polymer(_) | Self::BranchedPolymer(_) => None,
        }
    }

    pub fn small_molecule(&self) -> Option<&SmallMolecule> {
        match self {
            Self::NonPolymer(m) | Self::Water(m) => Some(m),
            Self::Polymer(_) | Self::BranchedPolymer(_) => None,
        }
    }

    pub(crate) fn small_molecule_mut(&mut self) -> Option<&mut SmallMolecule> {
        match self {
            Self::NonPolymer(m) | Self::Water(m) => Some(m),
            Self::Polymer(_) | Self::BranchedPolymer(_) => None,
        }
    }

    /// Helix spans, each an ordered run of residues. Only polymers carry them.
    pub fn helices(&self) -> &[Vec<ResidueId>] {
        match self {
            Self::Polymer(p) => &p.helices,
            _ => &[],
        }
    }

    pub fn strands(&self) -> &[Vec<ResidueId>] {
        match self {
            Self::Polymer(p) => &p.strands,
            _ => &[],
        }
    }

    pub(crate) fn forget_residue(&mut self, residue_id: ResidueId) {
        if let Some(residues) = self.residues_mut() {
            residues.retain(|&id| id != residue_id);
        }
        if let Self::Polymer(p) = self {
            for span in p.helices.iter_mut().chain(p.strands.iter_mut()) {
                span.retain(|&id| id != residue_id);
            }
            p.helices.retain(|span| !span.is_empty());
            p.strands.retain(|span| !span.is_empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn entity(id: &str) -> EntityRecord {
        EntityRecord {
            id: id.to_string(),
            auth_id: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn molecule_type_parses_mmcif_entity_types() {
        assert_eq!("polymer".parse::<MoleculeType>(), Ok(MoleculeType::Polymer));
        assert_eq!("branched".parse::<MoleculeType>(), Ok(MoleculeType::BranchedPolymer));
        assert_eq!("non-polymer".parse::<MoleculeType>(), Ok(MoleculeType::NonPolymer));
        assert_eq!("WATER".parse::<MoleculeType>(), Ok(MoleculeType::Water));
        assert!("protein".parse::<MoleculeType>().is_err());
    }

    #[test]
    fn molecule_type_display_round_trips() {
        for t in [
            MoleculeType::Polymer,
            MoleculeType::BranchedPolymer,
            MoleculeType::NonPolymer,
            MoleculeType::Water,
        ] {
            assert_eq!(t.to_string().parse::<MoleculeType>(), Ok(t));
        }
    }

    #[test]
    fn new_molecule_matches_requested_kind() {
        let polymer = Molecule::new(MoleculeType::Polymer, entity("A"));
        assert_eq!(polymer.molecule_type(), MoleculeType::Polymer);
        assert_eq!(polymer.asym_id(), "A");
        assert!(polymer.direct_atoms().is_empty());

        let water = Molecule::new(MoleculeType::Water, entity("C"));
        assert!(water.is_water());
        assert!(water.residues().is_empty());
        assert!(water.helices().is_empty());
    }

    #[test]
    fn small_molecule_label_uses_author_chain_and_number() {
        let mut ligand = SmallMolecule {
            entity: EntityRecord {
                id: "C".to_string(),
                auth_id: "A".to_string(),
                ..Default::default()
            },
            number: Some(500),
            ..Default::default()
        };
        assert_eq!(ligand.label(), "A.500");
        ligand.insertion_code = "B".to_string();
        assert_eq!(ligand.label(), "A.500B");
    }

    #[test]
    fn forget_residue_prunes_secondary_structure() {
        let r1 = ResidueId::from(KeyData::from_ffi(1));
        let r2 = ResidueId::from(KeyData::from_ffi(2));
        let mut molecule = Molecule::Polymer(Polymer {
            entity: entity("A"),
            residues: vec![r1, r2],
            helices: vec![vec![r1]],
            strands: vec![vec![r1, r2]],
        });
        molecule.forget_residue(r1);
        assert_eq!(molecule.residues(), &[r2]);
        assert!(molecule.helices().is_empty());
        assert_eq!(molecule.strands(), &[vec![r2]]);
    }
}
