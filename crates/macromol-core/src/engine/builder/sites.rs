use crate::core::io::dict::{IntermediateDict, Row};
use crate::core::models::ids::{MoleculeId, ResidueId};
use crate::core::models::model::{BindSite, Model};

enum Member {
    Residue(ResidueId),
    Molecule(MoleculeId),
}

fn resolve(model: &Model, row: &Row<'_>) -> Option<Member> {
    let number = row
        .parse::<i64>("label_seq_id")
        .or_else(|| row.parse::<i64>("auth_seq_id"));
    let insertion_code = row.defined("pdbx_auth_ins_code").unwrap_or_default();
    let auth_number = row.parse::<i64>("auth_seq_id");

    let by_label = row
        .defined("label_asym_id")
        .and_then(|asym| model.molecule_by_asym(asym));
    if let Some(molecule_id) = by_label {
        let molecule = model.molecule(molecule_id)?;
        if molecule.small_molecule().is_some() {
            return Some(Member::Molecule(molecule_id));
        }
        return model
            .residue_by_key(molecule_id, number?, insertion_code)
            .map(Member::Residue);
    }

    let auth = row.defined("auth_asym_id")?;
    for (molecule_id, molecule) in model.molecules() {
        if molecule.entity().auth_id != auth {
            continue;
        }
        match molecule.small_molecule() {
            Some(small) if small.number == auth_number && small.insertion_code == insertion_code => {
                return Some(Member::Molecule(molecule_id));
            }
            Some(_) => {}
            None => {
                if let Some(residue) = auth_number
                    .and_then(|n| model.residue_by_key(molecule_id, n, insertion_code))
                {
                    return Some(Member::Residue(residue));
                }
            }
        }
    }
    None
}

/// Groups `struct_site_gen` rows into sites, resolved against this model.
pub(crate) fn bind_sites(model: &Model, dict: &IntermediateDict) -> Vec<BindSite> {
    let mut sites: Vec<BindSite> = Vec::new();
    for row in dict.rows("struct_site_gen") {
        let Some(site_id) = row.defined("site_id") else {
            continue;
        };
        let index = match sites.iter().position(|s| s.id == site_id) {
            Some(index) => index,
            None => {
                let details = dict
                    .rows("struct_site")
                    .find(|s| s.get("id") == Some(site_id))
                    .and_then(|s| s.defined("details"))
                    .map(String::from);
                sites.push(BindSite {
                    id: site_id.to_string(),
                    details,
                    ..Default::default()
                });
                sites.len() - 1
            }
        };
        let site = &mut sites[index];
        match resolve(model, &row) {
            Some(Member::Residue(id)) if !site.residues.contains(&id) => site.residues.push(id),
            Some(Member::Molecule(id)) if !site.molecules.contains(&id) => site.molecules.push(id),
            _ => {}
        }
    }
    sites
}
