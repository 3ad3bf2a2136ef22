use super::ids::{AtomId, MoleculeId};
use crate::core::utils::identifiers;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub id: String,                         // "<asym>.<number><insertion code>"
    pub name: String,                       // Component id (e.g., "ALA", "DG")
    pub number: i64,                        // Ordering position: label_seq_id, else auth_seq_id
    pub insertion_code: String,             // Empty when absent
    pub label_seq_id: Option<i64>,          // As written in the source, if numeric
    pub auth_seq_id: Option<i64>,           // As written in the source, if numeric
    pub is_missing: bool,                   // Declared unobserved, atoms are ghosts
    pub(crate) molecule_id: MoleculeId,     // Owning polymer
    pub(crate) atoms: Vec<AtomId>,          // File order
    atom_name_map: HashMap<String, AtomId>, // First atom of each name
}

impl Residue {
    pub fn new(
        asym_id: &str,
        number: i64,
        insertion_code: &str,
        name: &str,
        molecule_id: MoleculeId,
    ) -> Self {
        let insertion_code = insertion_code.trim().to_string();
        Self {
            id: format!("{}.{}", asym_id, identifiers::residue_key(number, &insertion_code)),
            name: name.to_string(),
            number,
            insertion_code,
            label_seq_id: None,
            auth_seq_id: None,
            is_missing: false,
            molecule_id,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map
            .entry(atom_name.to_string())
            .or_insert(atom_id);
    }

    pub(crate) fn remove_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.retain(|&id| id != atom_id);
        if self.atom_name_map.get(atom_name) == Some(&atom_id) {
            self.atom_name_map.remove(atom_name);
        }
    }

    pub(crate) fn clear_atoms(&mut self) {
        self.atoms.clear();
        self.atom_name_map.clear();
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    pub fn molecule_id(&self) -> MoleculeId {
        self.molecule_id
    }

    pub fn atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map.get(name).copied()
    }

    /// The `(number, insertion code)` pair used for ordering within a polymer.
    pub fn key(&self) -> (i64, &str) {
        (self.number, &self.insertion_code)
    }

    pub fn code(&self) -> char {
        identifiers::one_letter_code(&self.name)
    }

    pub fn full_name(&self) -> Option<&'static str> {
        identifiers::full_name(&self.name)
    }
}
