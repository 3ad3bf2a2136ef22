use super::error::{Diagnostics, StructureWarning};
use crate::core::io::connections;
use crate::core::io::dict::IntermediateDict;
use crate::core::models::ids::AtomId;
use crate::core::models::model::Model;
use crate::core::models::topology::{BondOrder, BondOutcome};
use crate::core::topology::registry::TopologyRegistry;
use tracing::debug;

fn link(model: &mut Model, a: AtomId, b: AtomId, diagnostics: &mut Diagnostics) -> bool {
    match model.add_bond(a, b, BondOrder::Single) {
        Some(BondOutcome::Created) => true,
        Some(BondOutcome::CreatedLong { length }) => {
            let id = |atom| model.atom(atom).map_or(0, |a| a.id);
            // Model::add_bond has already logged it.
            diagnostics.record(StructureWarning::LongBond {
                first: id(a),
                second: id(b),
                length,
            });
            true
        }
        _ => false,
    }
}

/// Bonds atoms inside residues by the topology table, and links consecutive polymer residues.
///
/// Backbone links are only made when the two atoms are within `cutoff` Å. Residues rebuilt
/// from a missing-residue declaration are left unbonded.
pub(crate) fn infer_residue_bonds(
    model: &mut Model,
    topology: &TopologyRegistry,
    cutoff: f64,
    diagnostics: &mut Diagnostics,
) {
    let mut pairs: Vec<(AtomId, AtomId)> = Vec::new();

    for (_, residue) in model.residues() {
        if residue.is_missing {
            continue;
        }
        let Some(table) = topology.get(&residue.name) else {
            continue;
        };
        for [a, b] in &table.bonds {
            if let (Some(a), Some(b)) = (residue.atom_id_by_name(a), residue.atom_id_by_name(b)) {
                pairs.push((a, b));
            }
        }
    }

    for (_, polymer) in model.polymers() {
        for window in polymer.residues().windows(2) {
            let (Some(this), Some(next)) = (model.residue(window[0]), model.residue(window[1])) else {
                continue;
            };
            if this.is_missing || next.is_missing {
                continue;
            }
            let out_name = topology.get(&this.name).map_or("C", |t| t.link_out());
            let in_name = topology.get(&next.name).map_or("N", |t| t.link_in());
            let (Some(out_atom), Some(in_atom)) =
                (this.atom_id_by_name(out_name), next.atom_id_by_name(in_name))
            else {
                continue;
            };
            if model.distance(out_atom, in_atom).is_some_and(|d| d <= cutoff) {
                pairs.push((out_atom, in_atom));
            }
        }
    }

    let created = pairs
        .into_iter()
        .filter(|&(a, b)| link(model, a, b, diagnostics))
        .count();
    debug!(model = model.number(), bonds = created, "Inferred residue bonds");
}

/// Creates the bonds the file lists explicitly, through `conect` or `struct_conn`.
pub(crate) fn connect_listed(model: &mut Model, dict: &IntermediateDict, diagnostics: &mut Diagnostics) {
    let mut created = 0;
    for (a, b) in connections::listed_bonds(dict) {
        let (Some(a), Some(b)) = (model.atom_by_serial(a), model.atom_by_serial(b)) else {
            continue;
        };
        if link(model, a, b, diagnostics) {
            created += 1;
        }
    }
    if created > 0 {
        debug!(model = model.number(), bonds = created, "Connected listed bonds");
    }
}
