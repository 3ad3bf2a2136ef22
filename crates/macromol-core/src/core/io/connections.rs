//! Explicit bonds in both vocabularies.
//!
//! PDB lists bonds as `conect` pairs of atom ids, while mmCIF lists them as `struct_conn` rows
//! naming both partners by label. When a dictionary only has one of the two, the other is
//! derived from it against the first model's `atom_site` rows.

use super::dict::{Category, IntermediateDict, Row, UNKNOWN, is_null};
use crate::core::utils::elements;
use std::collections::{HashMap, HashSet};

const STRUCT_CONN_KEYS: [&str; 20] = [
    "id",
    "conn_type_id",
    "ptnr1_label_asym_id",
    "ptnr1_label_comp_id",
    "ptnr1_label_seq_id",
    "ptnr1_label_atom_id",
    "pdbx_ptnr1_label_alt_id",
    "pdbx_ptnr1_PDB_ins_code",
    "ptnr1_auth_asym_id",
    "ptnr1_auth_seq_id",
    "ptnr1_symmetry",
    "ptnr2_label_asym_id",
    "ptnr2_label_comp_id",
    "ptnr2_label_seq_id",
    "ptnr2_label_atom_id",
    "pdbx_ptnr2_label_alt_id",
    "pdbx_ptnr2_PDB_ins_code",
    "ptnr2_auth_asym_id",
    "ptnr2_auth_seq_id",
    "ptnr2_symmetry",
];

const IDENTITY_SYMMETRY: &str = "1_555";

/// Asym, author sequence number, insertion code, atom name and alternate location.
type PartnerKey<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str);

fn plain(value: Option<&str>) -> &str {
    value.filter(|v| !is_null(v)).unwrap_or_default()
}

/// Connection types that describe a bond rather than a contact such as `hydrog`.
fn is_bond_type(kind: &str) -> bool {
    let kind = kind.to_ascii_lowercase();
    kind.starts_with("covale") || kind == "disulf" || kind == "metalc"
}

fn first_model_atoms(dict: &IntermediateDict) -> Vec<Row<'_>> {
    let model = dict.first("atom_site", "pdbx_PDB_model_num");
    dict.rows("atom_site")
        .filter(|row| row.get("pdbx_PDB_model_num") == model)
        .collect()
}

fn conect_pairs(dict: &IntermediateDict) -> Vec<(i64, i64)> {
    dict.rows("conect")
        .filter_map(|row| Some((row.parse("atom_id")?, row.parse("bonded_atom_id")?)))
        .collect()
}

fn partner_key<'a>(row: &Row<'a>, n: u8) -> PartnerKey<'a> {
    let get = |field: String| plain(row.get(&field));
    (
        get(format!("ptnr{n}_label_asym_id")),
        get(format!("ptnr{n}_auth_seq_id")),
        get(format!("pdbx_ptnr{n}_PDB_ins_code")),
        get(format!("ptnr{n}_label_atom_id")),
        get(format!("pdbx_ptnr{n}_label_alt_id")),
    )
}

/// Atom id pairs of the bonding `struct_conn` rows, one pair per row.
///
/// A partner without an alternate location matches the first atom of that name.
pub fn struct_conn_pairs(dict: &IntermediateDict) -> Vec<(i64, i64)> {
    let mut index: HashMap<PartnerKey<'_>, i64> = HashMap::new();
    for row in first_model_atoms(dict) {
        let Some(id) = row.parse::<i64>("id") else {
            continue;
        };
        let asym = plain(row.get("label_asym_id"));
        let seq = plain(row.get("auth_seq_id"));
        let ins = plain(row.get("pdbx_PDB_ins_code"));
        let name = plain(row.get("label_atom_id"));
        let alt = plain(row.get("label_alt_id"));
        index.entry((asym, seq, ins, name, alt)).or_insert(id);
        index.entry((asym, seq, ins, name, "")).or_insert(id);
    }
    dict.rows("struct_conn")
        .filter(|row| row.get("conn_type_id").is_some_and(is_bond_type))
        .filter_map(|row| {
            let a = index.get(&partner_key(&row, 1))?;
            let b = index.get(&partner_key(&row, 2))?;
            Some((*a, *b))
        })
        .collect()
}

/// Bonds listed explicitly by the dictionary, as atom id pairs.
///
/// `conect` is used when present; otherwise the bonding `struct_conn` rows are resolved.
pub fn listed_bonds(dict: &IntermediateDict) -> Vec<(i64, i64)> {
    if dict.contains("conect") {
        conect_pairs(dict)
    } else {
        struct_conn_pairs(dict)
    }
}

fn connection_type(first: &Row<'_>, second: &Row<'_>) -> &'static str {
    let is = |row: &Row<'_>, comp: &str, atom: &str| {
        row.get("label_comp_id") == Some(comp) && row.get("label_atom_id") == Some(atom)
    };
    let metal = |row: &Row<'_>| row.defined("type_symbol").is_some_and(elements::is_metal);
    if is(first, "CYS", "SG") && is(second, "CYS", "SG") {
        "disulf"
    } else if metal(first) || metal(second) {
        "metalc"
    } else {
        "covale"
    }
}

fn partner_values(row: &Row<'_>) -> [String; 9] {
    let get = |key: &str| row.get(key).unwrap_or(UNKNOWN).to_string();
    [
        get("label_asym_id"),
        get("label_comp_id"),
        get("label_seq_id"),
        get("label_atom_id"),
        get("label_alt_id"),
        get("pdbx_PDB_ins_code"),
        get("auth_asym_id"),
        get("auth_seq_id"),
        IDENTITY_SYMMETRY.to_string(),
    ]
}

/// Rewrites the `conect` pairs as `struct_conn` rows, each unordered pair once.
///
/// Returns `None` when no pair resolves to two atoms.
pub fn struct_conn_from_conect(dict: &IntermediateDict) -> Option<Category> {
    let mut atoms: HashMap<i64, Row<'_>> = HashMap::new();
    for row in first_model_atoms(dict) {
        if let Some(id) = row.parse::<i64>("id") {
            atoms.entry(id).or_insert(row);
        }
    }
    let mut seen = HashSet::new();
    let mut counters: HashMap<&str, usize> = HashMap::new();
    let mut category = Category::looped(STRUCT_CONN_KEYS);
    for (a, b) in conect_pairs(dict) {
        if a == b || !seen.insert((a.min(b), a.max(b))) {
            continue;
        }
        let (Some(first), Some(second)) = (atoms.get(&a), atoms.get(&b)) else {
            continue;
        };
        let kind = connection_type(first, second);
        let count = counters.entry(kind).or_default();
        *count += 1;
        let mut row = vec![format!("{}{}", kind, count), kind.to_string()];
        row.extend(partner_values(first));
        row.extend(partner_values(second));
        category.push_row(row);
    }
    (!category.is_empty()).then_some(category)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atoms() -> Category {
        let mut atoms = Category::looped([
            "id",
            "type_symbol",
            "label_atom_id",
            "label_alt_id",
            "label_comp_id",
            "label_asym_id",
            "label_seq_id",
            "pdbx_PDB_ins_code",
            "auth_asym_id",
            "auth_seq_id",
        ]);
        for row in [
            ["1", "S", "SG", ".", "CYS", "A", "3", "?", "A", "3"],
            ["2", "S", "SG", ".", "CYS", "A", "40", "?", "A", "40"],
            ["3", "ZN", "ZN", ".", "ZN", "B", ".", "?", "A", "101"],
            ["4", "C", "C1", ".", "NAG", "C", ".", "?", "A", "201"],
        ] {
            atoms.push_row(row.map(String::from).to_vec());
        }
        atoms
    }

    fn dict_with_conect(pairs: &[(&str, &str)]) -> IntermediateDict {
        let mut dict = IntermediateDict::new("TEST");
        dict.insert("atom_site", atoms());
        for (a, b) in pairs {
            dict.entry("conect").push_pairs([("atom_id", *a), ("bonded_atom_id", *b)]);
        }
        dict
    }

    #[test]
    fn conect_pairs_become_typed_struct_conn_rows() {
        let dict = dict_with_conect(&[("1", "2"), ("2", "1"), ("1", "3"), ("3", "1"), ("2", "4"), ("4", "4"), ("1", "99")]);
        let category = struct_conn_from_conect(&dict).unwrap();
        let summary: Vec<(&str, &str, &str)> = category
            .rows()
            .map(|r| {
                (
                    r.get("id").unwrap(),
                    r.get("ptnr1_auth_seq_id").unwrap(),
                    r.get("ptnr2_auth_seq_id").unwrap(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![("disulf1", "3", "40"), ("metalc1", "3", "101"), ("covale1", "40", "201")]
        );
        assert_eq!(category.row(0).unwrap().get("ptnr1_symmetry"), Some("1_555"));
    }

    #[test]
    fn struct_conn_rows_resolve_back_to_atom_ids() {
        let mut dict = dict_with_conect(&[("1", "2"), ("1", "3")]);
        let mut conn = struct_conn_from_conect(&dict).unwrap();
        conn.push_pairs([("id", "hydrog1"), ("conn_type_id", "hydrog")]);
        dict.remove("conect");
        dict.insert("struct_conn", conn);
        assert_eq!(listed_bonds(&dict), vec![(1, 2), (1, 3)]);
    }

    #[test]
    fn conect_takes_precedence_and_unresolved_pairs_yield_nothing() {
        let dict = dict_with_conect(&[("7", "8")]);
        assert_eq!(listed_bonds(&dict), vec![(7, 8)]);
        assert!(struct_conn_from_conect(&dict).is_none());
        assert!(struct_conn_pairs(&IntermediateDict::new("EMPTY")).is_empty());
    }
}
