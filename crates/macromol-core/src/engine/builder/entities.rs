use crate::core::io::dict::{IntermediateDict, Row};
use crate::core::models::molecule::MoleculeType;
use crate::core::utils::identifiers;
use std::collections::HashMap;
use tracing::debug;

/// What the entity table says about one entity id.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInfo {
    pub kind: MoleculeType,
    pub description: Option<String>,
    pub sequence: String,
}

pub fn entity_table(dict: &IntermediateDict) -> HashMap<String, EntityInfo> {
    let sequences: HashMap<&str, String> = dict
        .rows("entity_poly")
        .filter_map(|row| {
            let code = row.defined("pdbx_seq_one_letter_code")?;
            Some((row.get("entity_id")?, code.split_whitespace().collect()))
        })
        .collect();

    let mut table = HashMap::new();
    for row in dict.rows("entity") {
        let Some(id) = row.defined("id") else {
            continue;
        };
        let Some(kind) = row.get("type").and_then(|t| t.parse::<MoleculeType>().ok()) else {
            debug!(entity = id, kind = row.get("type"), "Skipping entity of unknown type");
            continue;
        };
        table.insert(
            id.to_string(),
            EntityInfo {
                kind,
                description: row.defined("pdbx_description").map(String::from),
                sequence: sequences.get(id).cloned().unwrap_or_default(),
            },
        );
    }
    table
}

/// Classifies rows whose entity is undeclared.
pub(crate) fn fallback_kind(first: &Row<'_>) -> MoleculeType {
    let name = first.get("label_comp_id").unwrap_or_default();
    if identifiers::is_water_name(name) {
        MoleculeType::Water
    } else if first.get("group_PDB") == Some("HETATM") {
        MoleculeType::NonPolymer
    } else {
        MoleculeType::Polymer
    }
}
