use crate::core::io::dict::IntermediateDict;
use crate::core::models::atom::{Atom, Occupancy};
use crate::core::models::model::Model;
use crate::core::models::residue::Residue;
use crate::core::topology::registry::{TopologyRegistry, element_from_atom_name};
use crate::core::utils::identifiers;
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Inserts ghost residues for every unobserved polymer residue of this model.
///
/// Each goes straight after the residue with the greatest key below its own. Its atoms come
/// from the topology table and have no coordinates.
pub(crate) fn reconstruct(model: &mut Model, dict: &IntermediateDict, topology: &TopologyRegistry) {
    let mut added = 0;
    for row in dict.rows("pdbx_unobs_or_zero_occ_residues") {
        if row.get("polymer_flag").is_some_and(|f| f != "Y") {
            continue;
        }
        if row.parse::<i64>("PDB_model_num").unwrap_or(1) != model.number() {
            continue;
        }
        let molecule_id = row
            .defined("label_asym_id")
            .and_then(|asym| model.molecule_by_asym(asym))
            .or_else(|| {
                let auth = row.defined("auth_asym_id")?;
                model
                    .polymers()
                    .find(|(_, m)| m.entity().auth_id == auth)
                    .map(|(id, _)| id)
            });
        let Some(molecule_id) = molecule_id else {
            continue;
        };
        let label_seq_id = row.parse::<i64>("label_seq_id");
        let auth_seq_id = row.parse::<i64>("auth_seq_id");
        let Some(number) = label_seq_id.or(auth_seq_id) else {
            continue;
        };
        let insertion_code = row.defined("PDB_ins_code").unwrap_or_default();
        let name = row
            .defined("label_comp_id")
            .or_else(|| row.defined("auth_comp_id"))
            .unwrap_or_default();

        let Some(molecule) = model.molecule(molecule_id) else {
            continue;
        };
        if molecule.small_molecule().is_some() {
            continue;
        }
        let key = (number, insertion_code);
        let mut index = 0;
        let mut best: Option<(i64, &str)> = None;
        let mut duplicate = false;
        for (position, residue) in molecule
            .residues()
            .iter()
            .filter_map(|&id| model.residue(id))
            .enumerate()
        {
            match identifiers::residue_key_order(residue.key(), key) {
                Ordering::Equal => duplicate = true,
                Ordering::Less
                    if best.is_none_or(|b| {
                        identifiers::residue_key_order(residue.key(), b) == Ordering::Greater
                    }) =>
                {
                    best = Some(residue.key());
                    index = position + 1;
                }
                _ => {}
            }
        }
        if duplicate {
            continue;
        }

        let asym = molecule.asym_id().to_string();
        let mut residue = Residue::new(&asym, number, insertion_code, name, molecule_id);
        residue.label_seq_id = label_seq_id;
        residue.auth_seq_id = auth_seq_id;
        residue.is_missing = true;
        let Some(residue_id) = model.insert_residue(molecule_id, index, residue) else {
            continue;
        };
        for atom_name in topology.get(name).map(|t| t.atoms.as_slice()).unwrap_or_default() {
            let id = model.next_free_atom_id();
            let mut atom = Atom::ghost(id, atom_name, &element_from_atom_name(atom_name));
            atom.occupancy = Occupancy::Value(0.0);
            model.add_atom_to_residue(residue_id, atom);
        }
        trace!(asym = %asym, number, name, "Reconstructed missing residue");
        added += 1;
    }
    if added > 0 {
        debug!(model = model.number(), residues = added, "Inserted missing residues");
    }
}
