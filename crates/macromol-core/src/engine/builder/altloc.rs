use super::IndexedRow;
use crate::core::io::dict::{Row, is_null};
use crate::engine::error::{Diagnostics, StructureWarning};
use std::collections::HashMap;

fn occupancy(row: &Row<'_>) -> Option<f64> {
    row.defined("occupancy")?.parse().ok()
}

fn alt_id<'a>(row: &Row<'a>) -> Option<&'a str> {
    row.get("label_alt_id").filter(|v| !is_null(v))
}

pub(crate) fn atom_name<'a>(row: &Row<'a>) -> &'a str {
    row.defined("label_atom_id")
        .or_else(|| row.defined("auth_atom_id"))
        .unwrap_or_default()
}

/// Keeps one conformer of a group of rows.
///
/// When a group has partial occupancy and alternate locations, only atoms that are fully
/// occupied, unlabelled, or labelled with the lowest alternate id survive.
pub(crate) fn resolve<'a>(rows: Vec<IndexedRow<'a>>) -> Vec<IndexedRow<'a>> {
    let partial = rows
        .iter()
        .any(|(_, row)| occupancy(row).is_some_and(|o| o < 1.0));
    let chosen = rows.iter().filter_map(|(_, row)| alt_id(row)).min();
    let Some(chosen) = chosen.filter(|_| partial) else {
        return rows;
    };
    rows.into_iter()
        .filter(|(_, row)| {
            occupancy(row).is_none_or(|o| o >= 1.0) || alt_id(row).is_none_or(|alt| alt == chosen)
        })
        .collect()
}

/// Drops repeated atom names within a residue.
///
/// Of the rows sharing a name, the one with the lowest alternate location survives; an
/// unlabelled row only survives when no labelled one competes with it. Surviving rows keep
/// their file order, and every dropped row raises a warning.
pub(crate) fn dedupe<'a>(
    rows: Vec<IndexedRow<'a>>,
    asym: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<IndexedRow<'a>> {
    let mut slots: HashMap<(&'a str, &'a str, &'a str), usize> = HashMap::new();
    let mut kept: Vec<IndexedRow<'a>> = Vec::with_capacity(rows.len());
    for (index, row) in rows {
        let seq = row.get("auth_seq_id").unwrap_or_default();
        let ins = row.defined("pdbx_PDB_ins_code").unwrap_or_default();
        let name = atom_name(&row);
        let Some(&slot) = slots.get(&(seq, ins, name)) else {
            slots.insert((seq, ins, name), kept.len());
            kept.push((index, row));
            continue;
        };
        diagnostics.raise(StructureWarning::AmbiguousAltloc {
            residue: format!("{}.{}{}", asym, seq, ins),
            atom: name.to_string(),
        });
        if outranks(&row, &kept[slot].1) {
            kept[slot] = (index, row);
        }
    }
    kept.sort_by_key(|(index, _)| *index);
    kept
}

fn outranks(candidate: &Row<'_>, incumbent: &Row<'_>) -> bool {
    match (alt_id(candidate), alt_id(incumbent)) {
        (Some(a), Some(b)) => a < b,
        (Some(_), None) => true,
        _ => false,
    }
}
