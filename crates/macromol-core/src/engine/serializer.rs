use crate::core::io::dict::{Category, INAPPLICABLE, IntermediateDict, UNKNOWN};
use crate::core::models::atom::Atom;
use crate::core::models::ids::AtomId;
use crate::core::models::model::Model;
use crate::core::models::molecule::{Molecule, MoleculeType};
use crate::core::models::residue::Residue;
use tracing::debug;

const ATOM_SITE_KEYS: [&str; 21] = [
    "group_PDB",
    "id",
    "type_symbol",
    "label_atom_id",
    "label_alt_id",
    "label_comp_id",
    "label_asym_id",
    "label_entity_id",
    "label_seq_id",
    "pdbx_PDB_ins_code",
    "Cartn_x",
    "Cartn_y",
    "Cartn_z",
    "occupancy",
    "B_iso_or_equiv",
    "pdbx_formal_charge",
    "auth_seq_id",
    "auth_comp_id",
    "auth_asym_id",
    "auth_atom_id",
    "pdbx_PDB_model_num",
];

const ANISOTROP_KEYS: [&str; 15] = [
    "id",
    "type_symbol",
    "pdbx_label_atom_id",
    "pdbx_label_alt_id",
    "pdbx_label_comp_id",
    "pdbx_label_asym_id",
    "pdbx_label_seq_id",
    "U[1][1]",
    "U[2][2]",
    "U[3][3]",
    "U[1][2]",
    "U[1][3]",
    "U[2][3]",
    "pdbx_auth_seq_id",
    "pdbx_auth_asym_id",
];

/// Where an atom sits, as written on its `atom_site` row.
struct Placement<'a> {
    comp: &'a str,
    asym: &'a str,
    auth_asym: &'a str,
    entity: &'a str,
    label_seq: String,
    auth_seq: String,
    insertion_code: &'a str,
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() { UNKNOWN } else { value }
}

fn placement<'a>(molecule: &'a Molecule, residue: Option<&'a Residue>) -> Placement<'a> {
    let entity = molecule.entity();
    let (comp, label_seq, auth_seq, insertion_code) = match (residue, molecule.small_molecule()) {
        (Some(residue), _) => (
            residue.name.as_str(),
            residue
                .label_seq_id
                .map_or_else(|| INAPPLICABLE.to_string(), |n| n.to_string()),
            residue.auth_seq_id.unwrap_or(residue.number).to_string(),
            residue.insertion_code.as_str(),
        ),
        (None, Some(small)) => (
            entity.name.as_str(),
            INAPPLICABLE.to_string(),
            small
                .number
                .map_or_else(|| UNKNOWN.to_string(), |n| n.to_string()),
            small.insertion_code.as_str(),
        ),
        (None, None) => (entity.name.as_str(), INAPPLICABLE.to_string(), UNKNOWN.to_string(), ""),
    };
    Placement {
        comp,
        asym: &entity.id,
        auth_asym: or_unknown(&entity.auth_id),
        entity: entity.entity_id.as_deref().unwrap_or(UNKNOWN),
        label_seq,
        auth_seq,
        insertion_code,
    }
}

fn atom_row(model: &Model, atom: &Atom, at: &Placement<'_>) -> Option<Vec<String>> {
    let position = atom.position?;
    let alt = atom.alt_loc.as_deref().unwrap_or(INAPPLICABLE);
    Some(vec![
        if atom.is_hetatm { "HETATM" } else { "ATOM" }.to_string(),
        atom.id.to_string(),
        or_unknown(&atom.element).to_string(),
        atom.name.clone(),
        alt.to_string(),
        at.comp.to_string(),
        at.asym.to_string(),
        at.entity.to_string(),
        at.label_seq.clone(),
        or_unknown(at.insertion_code).to_string(),
        format!("{:.3}", position.x),
        format!("{:.3}", position.y),
        format!("{:.3}", position.z),
        atom.occupancy.to_string(),
        format!("{:.2}", atom.b_factor),
        if atom.charge == 0 { UNKNOWN.to_string() } else { atom.charge.to_string() },
        at.auth_seq.clone(),
        at.comp.to_string(),
        at.auth_asym.to_string(),
        atom.name.clone(),
        model.number().to_string(),
    ])
}

fn anisotrop_row(atom: &Atom, at: &Placement<'_>) -> Option<Vec<String>> {
    let tensor = atom.anisotropy?;
    atom.position?;
    let mut row = vec![
        atom.id.to_string(),
        or_unknown(&atom.element).to_string(),
        atom.name.clone(),
        atom.alt_loc.as_deref().unwrap_or(INAPPLICABLE).to_string(),
        at.comp.to_string(),
        at.asym.to_string(),
        at.label_seq.clone(),
    ];
    row.extend(tensor.iter().map(|u| format!("{:.4}", u)));
    row.push(at.auth_seq.clone());
    row.push(at.auth_asym.to_string());
    Some(row)
}

fn emit(
    model: &Model,
    molecule: &Molecule,
    residue: Option<&Residue>,
    atom_ids: &[AtomId],
    atom_site: &mut Category,
    anisotrop: &mut Category,
) {
    let at = placement(molecule, residue);
    for atom in atom_ids.iter().filter_map(|&id| model.atom(id)) {
        if let Some(row) = atom_row(model, atom, &at) {
            atom_site.push_row(row);
        }
        if let Some(row) = anisotrop_row(atom, &at) {
            anisotrop.push_row(row);
        }
    }
}

fn model_rows(model: &Model, atom_site: &mut Category, anisotrop: &mut Category) {
    for (_, molecule) in model.molecules() {
        match molecule.molecule_type() {
            MoleculeType::Polymer | MoleculeType::BranchedPolymer => {
                for residue in molecule.residues().iter().filter_map(|&r| model.residue(r)) {
                    emit(model, molecule, Some(residue), residue.atoms(), atom_site, anisotrop);
                }
            }
            MoleculeType::NonPolymer | MoleculeType::Water => {
                emit(model, molecule, None, molecule.direct_atoms(), atom_site, anisotrop);
            }
        }
    }
}

/// Serializes the atoms of every model into `atom_site` and `atom_site_anisotrop`.
///
/// Ghost atoms have no coordinates and are not written.
pub fn models_to_categories(models: &[Model]) -> (Category, Category) {
    let mut atom_site = Category::looped(ATOM_SITE_KEYS);
    let mut anisotrop = Category::looped(ANISOTROP_KEYS);
    for model in models {
        model_rows(model, &mut atom_site, &mut anisotrop);
    }
    debug!(atoms = atom_site.len(), anisotropic = anisotrop.len(), "Serialized models");
    (atom_site, anisotrop)
}

/// Replaces the coordinate categories of `dict` with the current state of `models`.
pub fn write_models(models: &[Model], dict: &mut IntermediateDict) {
    let (atom_site, anisotrop) = models_to_categories(models);
    if atom_site.is_empty() {
        dict.remove("atom_site");
    } else {
        dict.insert("atom_site", atom_site);
    }
    if anisotrop.is_empty() {
        dict.remove("atom_site_anisotrop");
    } else {
        dict.insert("atom_site_anisotrop", anisotrop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::mmcif::CifFile;
    use crate::core::io::traits::StructureFormat;
    use crate::core::topology::registry::TopologyRegistry;
    use crate::engine::builder::build_models;
    use crate::engine::config::BuildOptions;

    const CIF: &str = "data_TEST
loop_
_entity.id
_entity.type
_entity.pdbx_description
1 polymer PROTEIN
2 water water
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.type_symbol
_atom_site.label_atom_id
_atom_site.label_alt_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_entity_id
_atom_site.label_seq_id
_atom_site.pdbx_PDB_ins_code
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
_atom_site.occupancy
_atom_site.B_iso_or_equiv
_atom_site.pdbx_formal_charge
_atom_site.auth_seq_id
_atom_site.auth_comp_id
_atom_site.auth_asym_id
_atom_site.auth_atom_id
_atom_site.pdbx_PDB_model_num
ATOM 1 N N . GLY A 1 1 ? 12.681 37.302 -25.211 1.00 15.56 ? 13 GLY X N 1
ATOM 2 C CA . GLY A 1 1 ? 13.000 37.000 -25.000 1.00 15.00 ? 13 GLY X CA 1
HETATM 3 O O . HOH B 2 . ? 1.000 2.000 3.000 1.00 20.00 -1 301 HOH X O 1
loop_
_atom_site_anisotrop.id
_atom_site_anisotrop.U[1][1]
_atom_site_anisotrop.U[2][2]
_atom_site_anisotrop.U[3][3]
_atom_site_anisotrop.U[1][2]
_atom_site_anisotrop.U[1][3]
_atom_site_anisotrop.U[2][3]
1 0.1000 0.2000 0.3000 0.0100 0.0200 0.0300
";

    #[test]
    fn atom_site_rows_are_rewritten_from_the_graph() {
        let dict = CifFile::read_dict_from_str(CIF).unwrap();
        let output = build_models(&dict, &BuildOptions::default(), &TopologyRegistry::standard().unwrap());
        let (atom_site, anisotrop) = models_to_categories(&output.models);

        let original = dict.category("atom_site").unwrap();
        assert_eq!(atom_site.keys(), original.keys());
        assert_eq!(atom_site.raw_rows(), original.raw_rows());
        assert_eq!(anisotrop.len(), 1);
        let row = anisotrop.row(0).unwrap();
        assert_eq!(row.get("pdbx_label_atom_id"), Some("N"));
        assert_eq!(row.get("U[2][3]"), Some("0.0300"));
        assert_eq!(row.get("pdbx_auth_seq_id"), Some("13"));
    }

    #[test]
    fn null_occupancies_are_written_back_verbatim() {
        let text = CIF
            .replace("-25.211 1.00 15.56", "-25.211 . 15.56")
            .replace("3.000 1.00 20.00", "3.000 ? 20.00");
        let dict = CifFile::read_dict_from_str(&text).unwrap();
        let output = build_models(&dict, &BuildOptions::default(), &TopologyRegistry::standard().unwrap());
        let (atom_site, _) = models_to_categories(&output.models);
        let occupancies: Vec<&str> = atom_site.rows().filter_map(|r| r.get("occupancy")).collect();
        assert_eq!(occupancies, vec![".", "1.00", "?"]);
    }

    #[test]
    fn ghost_atoms_are_left_out() {
        let dict = CifFile::read_dict_from_str(CIF).unwrap();
        let mut output = build_models(&dict, &BuildOptions::default(), &TopologyRegistry::default());
        let model = &mut output.models[0];
        let atom = model.atom_by_serial(2).unwrap();
        model.atom_mut(atom).unwrap().position = None;

        let mut rewritten = dict.clone();
        write_models(&output.models, &mut rewritten);
        let ids: Vec<&str> = rewritten
            .rows("atom_site")
            .filter_map(|r| r.get("id"))
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(
            rewritten.categories().map(|(name, _)| name).collect::<Vec<_>>(),
            vec!["entity", "atom_site", "atom_site_anisotrop"]
        );
    }
}
