use crate::core::io::dict::{IntermediateDict, Row};
use crate::core::models::model::Model;
use crate::core::models::molecule::Molecule;
use crate::core::utils::identifiers;
use crate::engine::error::{Diagnostics, StructureWarning};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Helix,
    Strand,
}

/// A run of residues in one asym, given by its inclusive end keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub asym: String,
    pub start: (i64, String),
    pub end: (i64, String),
}

fn endpoint(row: &Row<'_>, prefix: &str) -> Option<(i64, String)> {
    let number = row
        .parse(&format!("{}_label_seq_id", prefix))
        .or_else(|| row.parse(&format!("{}_auth_seq_id", prefix)))?;
    let insertion_code = row
        .defined(&format!("pdbx_{}_PDB_ins_code", prefix))
        .unwrap_or_default();
    Some((number, insertion_code.to_string()))
}

fn span(row: &Row<'_>, kind: SpanKind) -> Option<Span> {
    let asym = row
        .defined("beg_label_asym_id")
        .or_else(|| row.defined("beg_auth_asym_id"))?;
    Some(Span {
        kind,
        asym: asym.to_string(),
        start: endpoint(row, "beg")?,
        end: endpoint(row, "end")?,
    })
}

/// Reads helix spans from `struct_conf` and strand spans from `struct_sheet_range`.
pub fn harvest(dict: &IntermediateDict) -> Vec<Span> {
    let helices = dict
        .rows("struct_conf")
        .filter(|row| row.get("conf_type_id").is_none_or(|t| t.starts_with("HELX")))
        .filter_map(|row| span(&row, SpanKind::Helix));
    let strands = dict
        .rows("struct_sheet_range")
        .filter_map(|row| span(&row, SpanKind::Strand));
    helices.chain(strands).collect()
}

/// Resolves spans against a model's polymers.
///
/// Spans naming a residue the polymer doesn't have are dropped; when `report` is set a
/// warning is raised for each of them.
pub(crate) fn attach(model: &mut Model, spans: &[Span], report: bool, diagnostics: &mut Diagnostics) {
    for span in spans {
        let Some(molecule_id) = model.molecule_by_asym(&span.asym) else {
            continue;
        };
        let resolve = |key: &(i64, String)| model.residue_by_key(molecule_id, key.0, &key.1);
        let (start, end) = match (resolve(&span.start), resolve(&span.end)) {
            (Some(start), Some(end)) => (start, end),
            (start, _) => {
                if report {
                    let missing = if start.is_none() { &span.start } else { &span.end };
                    diagnostics.raise(StructureWarning::UnknownSecondaryStructureResidue {
                        asym: span.asym.clone(),
                        residue: identifiers::residue_key(missing.0, &missing.1),
                    });
                }
                continue;
            }
        };
        let Some(Molecule::Polymer(polymer)) = model.molecule_mut(molecule_id) else {
            continue;
        };
        let position = |id| polymer.residues.iter().position(|&r| r == id);
        let (Some(a), Some(b)) = (position(start), position(end)) else {
            continue;
        };
        let run = polymer.residues[a.min(b)..=a.max(b)].to_vec();
        match span.kind {
            SpanKind::Helix => polymer.helices.push(run),
            SpanKind::Strand => polymer.strands.push(run),
        }
    }
}
