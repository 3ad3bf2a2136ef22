use phf::{Map, Set, phf_map, phf_set};
use std::cmp::Ordering;

static ONE_LETTER_CODES: Map<&'static str, char> = phf_map! {
    "ALA" => 'A', "ARG" => 'R', "ASN" => 'N', "ASP" => 'D', "CYS" => 'C',
    "GLN" => 'Q', "GLU" => 'E', "GLY" => 'G', "HIS" => 'H', "ILE" => 'I',
    "LEU" => 'L', "LYS" => 'K', "MET" => 'M', "PHE" => 'F', "PRO" => 'P',
    "SER" => 'S', "THR" => 'T', "TRP" => 'W', "TYR" => 'Y', "VAL" => 'V',
    "HIP" => 'H', "HIE" => 'H', "HID" => 'H', "MSE" => 'M', "SEC" => 'U', "PYL" => 'O',
    "DA" => 'A', "DC" => 'C', "DG" => 'G', "DT" => 'T', "DU" => 'U',
    "A" => 'A', "C" => 'C', "G" => 'G', "U" => 'U', "T" => 'T',
};

static FULL_NAMES: Map<&'static str, &'static str> = phf_map! {
    "GLY" => "glycine", "ALA" => "alanine", "VAL" => "valine", "LEU" => "leucine",
    "ILE" => "isoleucine", "MET" => "methionine", "PHE" => "phenylalanine",
    "TRP" => "tryptophan", "PRO" => "proline", "SER" => "serine", "THR" => "threonine",
    "CYS" => "cysteine", "TYR" => "tyrosine", "ASN" => "asparagine", "GLN" => "glutamine",
    "ASP" => "aspartic acid", "GLU" => "glutamic acid", "LYS" => "lysine",
    "ARG" => "arginine", "HIS" => "histidine", "HOH" => "water",
};

static WATER_NAMES: Set<&'static str> = phf_set! { "HOH", "WAT", "DOD", "H2O" };

/// One-letter code for a residue name, `'X'` when the component is not a standard monomer.
pub fn one_letter_code(residue_name: &str) -> char {
    ONE_LETTER_CODES
        .get(residue_name.trim())
        .copied()
        .unwrap_or('X')
}

pub fn full_name(residue_name: &str) -> Option<&'static str> {
    FULL_NAMES.get(residue_name.trim()).copied()
}

pub fn is_water_name(residue_name: &str) -> bool {
    WATER_NAMES.contains(residue_name.trim())
}

/// Converts a list of three-letter residue names into a one-letter sequence string.
pub fn sequence_from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names.into_iter().map(one_letter_code).collect()
}

/// Orders residue keys numerically first, then by insertion code (blank sorts first).
pub fn residue_key_order(a: (i64, &str), b: (i64, &str)) -> Ordering {
    a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1))
}

/// Formats the position part of a residue key, e.g. `13` + `A` becomes `"13A"`.
pub fn residue_key(number: i64, insertion_code: &str) -> String {
    format!("{}{}", number, insertion_code.trim())
}

/// Splits `"-5A"` into `(-5, "A")`. Returns `None` when no leading integer is present.
pub fn split_residue_key(key: &str) -> Option<(i64, String)> {
    let key = key.trim();
    let digits_end = key
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(key.len());
    let number = key[..digits_end].parse().ok()?;
    Some((number, key[digits_end..].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_letter_codes_cover_protein_and_nucleic_acids() {
        assert_eq!(one_letter_code("GLY"), 'G');
        assert_eq!(one_letter_code("MSE"), 'M');
        assert_eq!(one_letter_code("DA"), 'A');
        assert_eq!(one_letter_code(" U "), 'U');
        assert_eq!(one_letter_code("XYZ"), 'X');
    }

    #[test]
    fn sequence_from_names_maps_unknowns_to_x() {
        assert_eq!(sequence_from_names(["MET", "ALA", "HEM", "LYS"]), "MAXK");
    }

    #[test]
    fn water_names_are_recognized() {
        assert!(is_water_name("HOH"));
        assert!(is_water_name("DOD"));
        assert!(!is_water_name("HEM"));
    }

    #[test]
    fn full_names_are_available_for_standard_residues() {
        assert_eq!(full_name("ASP"), Some("aspartic acid"));
        assert_eq!(full_name("HEM"), None);
    }

    #[test]
    fn residue_key_order_is_numeric_then_insertion_code() {
        assert_eq!(residue_key_order((9, ""), (10, "")), Ordering::Less);
        assert_eq!(residue_key_order((10, "A"), (10, "")), Ordering::Greater);
        assert_eq!(residue_key_order((10, "A"), (10, "B")), Ordering::Less);
        assert_eq!(residue_key_order((-1, "Z"), (0, "")), Ordering::Less);
    }

    #[test]
    fn split_residue_key_handles_signs_and_insertion_codes() {
        assert_eq!(split_residue_key("13"), Some((13, String::new())));
        assert_eq!(split_residue_key("13A"), Some((13, "A".to_string())));
        assert_eq!(split_residue_key("-5B"), Some((-5, "B".to_string())));
        assert_eq!(split_residue_key("A"), None);
        assert_eq!(split_residue_key(""), None);
    }

    #[test]
    fn residue_key_trims_insertion_code() {
        assert_eq!(residue_key(13, " "), "13");
        assert_eq!(residue_key(13, "A"), "13A");
    }
}
