use super::reader::MONTHS;
use crate::core::io::connections;
use crate::core::io::dict::{IntermediateDict, Row};
use crate::core::utils::formatting::format_number;
use crate::engine::assembly::{OperatorTable, expression_matrices};
use std::collections::HashMap;

const TEXT_WIDTH: usize = 70;
const CONTINUATION_WIDTH: usize = 69;
const JOURNAL_WIDTH: usize = 61;

/// Renders a dictionary as PDB records, one string per line.
pub fn dict_to_lines(dict: &IntermediateDict) -> Vec<String> {
    let mut lines = Vec::new();
    write_header(dict, &mut lines);
    write_remarks(dict, &mut lines);
    write_sequences(dict, &mut lines);
    write_helices(dict, &mut lines);
    write_sheets(dict, &mut lines);
    write_sites(dict, &mut lines);
    write_coordinates(dict, &mut lines);
    write_connections(dict, &mut lines);
    lines.push("END".to_string());
    lines.into_iter().map(|l| l.trim_end().to_string()).collect()
}

/// A defined value, or the empty string for absent and null values.
fn text<'a>(row: &Row<'a>, key: &str) -> &'a str {
    row.defined(key).unwrap_or_default()
}

/// The first defined value among `keys`.
fn either<'a>(row: &Row<'a>, keys: &[&str]) -> &'a str {
    keys.iter().find_map(|k| row.defined(k)).unwrap_or_default()
}

/// Converts `YYYY-MM-DD` back into `DD-MON-YY`.
pub fn iso_to_pdb_date(date: &str) -> Option<String> {
    let mut parts = date.trim().split('-');
    let year: u32 = parts.next()?.parse().ok()?;
    let month: usize = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    let name = MONTHS.get(month.checked_sub(1)?)?;
    Some(format!("{:02}-{}-{:02}", day, name, year % 100))
}

/// Splits text into lines no wider than `first` (then `rest`) characters, breaking after
/// spaces and, when `break_on_comma` is set, after commas. Runs of whitespace collapse.
fn wrap(text: &str, first: usize, rest: usize, break_on_comma: bool) -> Vec<String> {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut pieces: Vec<String> = Vec::new();
    let mut piece = String::new();
    for c in text.chars() {
        piece.push(c);
        if c == ' ' || (break_on_comma && c == ',') {
            pieces.push(std::mem::take(&mut piece));
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for piece in pieces {
        let width = if lines.is_empty() { first } else { rest };
        if !current.is_empty() && current.len() + piece.trim_end().len() > width {
            lines.push(current.trim_end().to_string());
            current.clear();
        }
        let width = if lines.is_empty() { first } else { rest };
        let mut piece = piece.as_str();
        while piece.trim_end().len() > width {
            let split = piece
                .char_indices()
                .nth(width)
                .map_or(piece.len(), |(i, _)| i);
            let (head, tail) = piece.split_at(split);
            lines.push(head.to_string());
            piece = tail;
        }
        current.push_str(piece);
    }
    if !current.trim().is_empty() {
        lines.push(current.trim_end().to_string());
    }
    lines
}

/// Writes a free-text record starting at column 10 with continuation counters in columns 8–9.
fn continued(lines: &mut Vec<String>, name: &str, value: &str, break_on_comma: bool) {
    for (index, chunk) in wrap(value, TEXT_WIDTH, CONTINUATION_WIDTH, break_on_comma)
        .iter()
        .enumerate()
    {
        if index == 0 {
            lines.push(format!("{:<6}    {}", name, chunk));
        } else {
            lines.push(format!("{:<6}  {:>2} {}", name, index + 1, chunk));
        }
    }
}

fn journal(lines: &mut Vec<String>, kind: &str, value: &str, break_on_comma: bool) {
    for (index, chunk) in wrap(value, JOURNAL_WIDTH, JOURNAL_WIDTH, break_on_comma)
        .iter()
        .enumerate()
    {
        if index == 0 {
            lines.push(format!("JRNL        {:<4}   {}", kind, chunk));
        } else {
            lines.push(format!("JRNL        {:<4} {:>2} {}", kind, index + 1, chunk));
        }
    }
}

fn write_header(dict: &IntermediateDict, lines: &mut Vec<String>) {
    let classification = dict
        .first_defined("struct_keywords", "pdbx_keywords")
        .unwrap_or_default();
    let date = dict
        .first_defined("pdbx_database_status", "recvd_initial_deposition_date")
        .and_then(iso_to_pdb_date)
        .unwrap_or_default();
    let code = dict.first_defined("entry", "id").unwrap_or_default();
    if !classification.is_empty() || !date.is_empty() || !code.is_empty() {
        lines.push(format!("HEADER    {:<40}{:<9}   {:<4}", classification, date, code));
    }

    if let Some(title) = dict.first_defined("struct", "title") {
        continued(lines, "TITLE", title, false);
    }
    if let Some(keywords) = dict.first_defined("struct_keywords", "text") {
        continued(lines, "KEYWDS", keywords, false);
    }
    let methods: Vec<&str> = dict.rows("exptl").filter_map(|r| r.defined("method")).collect();
    if !methods.is_empty() {
        continued(lines, "EXPDTA", &methods.join("; "), false);
    }
    let authors: Vec<&str> = dict.rows("audit_author").filter_map(|r| r.defined("name")).collect();
    if !authors.is_empty() {
        continued(lines, "AUTHOR", &authors.join(","), true);
    }

    let citation_authors: Vec<&str> = dict
        .rows("citation_author")
        .filter(|r| r.get("citation_id") == Some("primary"))
        .filter_map(|r| r.defined("name"))
        .collect();
    if !citation_authors.is_empty() {
        journal(lines, "AUTH", &citation_authors.join(","), true);
    }
    if let Some(title) = dict
        .rows("citation")
        .find(|r| r.get("id") == Some("primary"))
        .and_then(|r| r.defined("title"))
    {
        journal(lines, "TITL", title, false);
    }
}

fn write_remarks(dict: &IntermediateDict, lines: &mut Vec<String>) {
    if let Some(resolution) = dict
        .first_defined("refine", "ls_d_res_high")
        .and_then(|v| v.parse::<f64>().ok())
    {
        lines.push("REMARK   2".to_string());
        lines.push(format!("REMARK   2 RESOLUTION. {:>7.2} ANGSTROMS.", resolution));
    }

    let r_work = dict.first_defined("refine", "ls_R_factor_R_work");
    let r_free = dict.first_defined("refine", "ls_R_factor_R_free");
    if r_work.is_some() || r_free.is_some() {
        lines.push("REMARK   3".to_string());
        if let Some(value) = r_work {
            lines.push(format!("REMARK   3   R VALUE            (WORKING SET) : {}", value));
        }
        if let Some(value) = r_free {
            lines.push(format!("REMARK   3   FREE R VALUE                     : {}", value));
        }
    }

    write_assemblies(dict, lines);
    write_missing_residues(dict, lines);
}

fn write_assemblies(dict: &IntermediateDict, lines: &mut Vec<String>) {
    if !dict.contains("pdbx_struct_assembly") {
        return;
    }
    let table = OperatorTable::from_dict(dict);
    let mut authors: HashMap<&str, &str> = HashMap::new();
    for row in dict.rows("atom_site") {
        if let (Some(label), Some(auth)) = (row.defined("label_asym_id"), row.defined("auth_asym_id")) {
            authors.entry(label).or_insert(auth);
        }
    }

    lines.push("REMARK 350".to_string());
    for assembly in dict.rows("pdbx_struct_assembly") {
        let Some(id) = assembly.defined("id") else {
            continue;
        };
        lines.push(format!("REMARK 350 BIOMOLECULE: {}", id));
        if let Some(software) = assembly.defined("method_details") {
            lines.push(format!("REMARK 350 SOFTWARE USED: {}", software));
        }
        for prop in dict
            .rows("pdbx_struct_assembly_prop")
            .filter(|r| r.get("biol_id") == Some(id))
        {
            let value = text(&prop, "value");
            match prop.get("type") {
                Some("ABSA (A^2)") => {
                    lines.push(format!("REMARK 350 TOTAL BURIED SURFACE AREA: {} ANGSTROM**2", value))
                }
                Some("SSA (A^2)") => {
                    lines.push(format!("REMARK 350 SURFACE AREA OF THE COMPLEX: {} ANGSTROM**2", value))
                }
                Some("MORE") => {
                    lines.push(format!("REMARK 350 CHANGE IN SOLVENT FREE ENERGY: {} KCAL/MOL", value))
                }
                _ => {}
            }
        }
        for generator in dict
            .rows("pdbx_struct_assembly_gen")
            .filter(|r| r.get("assembly_id") == Some(id))
        {
            let Ok(matrices) = expression_matrices(text(&generator, "oper_expression"), &table) else {
                continue;
            };
            let mut chains: Vec<&str> = Vec::new();
            for label in text(&generator, "asym_id_list").split(',').map(str::trim) {
                let chain = authors.get(label).copied().unwrap_or(label);
                if !chain.is_empty() && !chains.contains(&chain) {
                    chains.push(chain);
                }
            }
            lines.push(format!("REMARK 350 APPLY THE FOLLOWING TO CHAINS: {}", chains.join(", ")));
            for (index, matrix) in matrices.iter().enumerate() {
                for r in 0..3 {
                    lines.push(format!(
                        "REMARK 350   BIOMT{}{:>4}{:>10.6}{:>10.6}{:>10.6}{:>15.5}",
                        r + 1,
                        index + 1,
                        matrix[(r, 0)],
                        matrix[(r, 1)],
                        matrix[(r, 2)],
                        matrix[(r, 3)]
                    ));
                }
            }
        }
    }
}

fn write_missing_residues(dict: &IntermediateDict, lines: &mut Vec<String>) {
    let rows: Vec<Row<'_>> = dict
        .rows("pdbx_unobs_or_zero_occ_residues")
        .filter(|r| r.get("polymer_flag") != Some("N"))
        .collect();
    if rows.is_empty() {
        return;
    }
    let several_models = rows
        .iter()
        .any(|r| r.defined("PDB_model_num").is_some_and(|m| m != "1"));
    lines.extend(
        [
            "REMARK 465",
            "REMARK 465 MISSING RESIDUES",
            "REMARK 465 THE FOLLOWING RESIDUES WERE NOT LOCATED IN THE",
            "REMARK 465 EXPERIMENT. (M=MODEL NUMBER; RES=RESIDUE NAME; C=CHAIN",
            "REMARK 465 IDENTIFIER; SSSEQ=SEQUENCE NUMBER; I=INSERTION CODE.)",
            "REMARK 465",
            "REMARK 465   M RES C SSSEQI",
        ]
        .map(String::from),
    );
    for row in rows {
        let model = if several_models { text(&row, "PDB_model_num") } else { "" };
        lines.push(format!(
            "REMARK 465 {:>3} {:>3} {} {:>5}{}",
            model,
            either(&row, &["auth_comp_id", "label_comp_id"]),
            either(&row, &["auth_asym_id", "label_asym_id"]),
            either(&row, &["auth_seq_id", "label_seq_id"]),
            text(&row, "PDB_ins_code"),
        ));
    }
}

fn write_sequences(dict: &IntermediateDict, lines: &mut Vec<String>) {
    for poly in dict.rows("entity_poly") {
        let Some(entity) = poly.defined("entity_id") else {
            continue;
        };
        let names: Vec<&str> = dict
            .rows("entity_poly_seq")
            .filter(|r| r.get("entity_id") == Some(entity))
            .filter_map(|r| r.defined("mon_id"))
            .collect();
        if names.is_empty() {
            continue;
        }
        for chain in text(&poly, "pdbx_strand_id").split(',').map(str::trim) {
            for (index, chunk) in names.chunks(13).enumerate() {
                lines.push(format!(
                    "SEQRES {:>3} {} {:>4}  {}",
                    index + 1,
                    chain,
                    names.len(),
                    chunk.join(" ")
                ));
            }
        }
    }
}

/// Name, chain, number and insertion code of one end of a secondary structure span.
fn span_end<'a>(row: &Row<'a>, prefix: &str) -> [&'a str; 4] {
    let field = |suffix: &str| {
        let auth = format!("{}_auth_{}", prefix, suffix);
        let label = format!("{}_label_{}", prefix, suffix);
        either(row, &[auth.as_str(), label.as_str()])
    };
    [
        field("comp_id"),
        field("asym_id"),
        field("seq_id"),
        text(row, &format!("pdbx_{}_PDB_ins_code", prefix)),
    ]
}

fn write_helices(dict: &IntermediateDict, lines: &mut Vec<String>) {
    let helices = dict
        .rows("struct_conf")
        .filter(|r| r.get("conf_type_id").is_none_or(|t| t.starts_with("HELX")));
    for (index, row) in helices.enumerate() {
        let [beg_name, beg_chain, beg_seq, beg_ins] = span_end(&row, "beg");
        let [end_name, end_chain, end_seq, end_ins] = span_end(&row, "end");
        lines.push(format!(
            "HELIX  {:>3} {:>3} {:>3} {:1} {:>4}{:1} {:>3} {:1} {:>4}{:1}{:>2}{:30} {:>5}",
            index + 1,
            either(&row, &["pdbx_PDB_helix_id", "id"]),
            beg_name,
            beg_chain,
            beg_seq,
            beg_ins,
            end_name,
            end_chain,
            end_seq,
            end_ins,
            text(&row, "pdbx_PDB_helix_class"),
            "",
            text(&row, "pdbx_PDB_helix_length"),
        ));
    }
}

fn write_sheets(dict: &IntermediateDict, lines: &mut Vec<String>) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for row in dict.rows("struct_sheet_range") {
        *counts.entry(text(&row, "sheet_id")).or_default() += 1;
    }
    let mut started: Vec<&str> = Vec::new();
    for row in dict.rows("struct_sheet_range") {
        let sheet = text(&row, "sheet_id");
        let sense = if started.contains(&sheet) {
            ""
        } else {
            started.push(sheet);
            "0"
        };
        let [beg_name, beg_chain, beg_seq, beg_ins] = span_end(&row, "beg");
        let [end_name, end_chain, end_seq, end_ins] = span_end(&row, "end");
        lines.push(format!(
            "SHEET  {:>3} {:>3}{:>2} {:>3} {:1}{:>4}{:1} {:>3} {:1}{:>4}{:1}{:>2}",
            text(&row, "id"),
            sheet,
            counts.get(sheet).copied().unwrap_or(1),
            beg_name,
            beg_chain,
            beg_seq,
            beg_ins,
            end_name,
            end_chain,
            end_seq,
            end_ins,
            sense,
        ));
    }
}

fn write_sites(dict: &IntermediateDict, lines: &mut Vec<String>) {
    let mut sites: Vec<(&str, Vec<Row<'_>>)> = Vec::new();
    for row in dict.rows("struct_site_gen") {
        let site = text(&row, "site_id");
        match sites.iter_mut().find(|(s, _)| *s == site) {
            Some((_, rows)) => rows.push(row),
            None => sites.push((site, vec![row])),
        }
    }
    for (site, rows) in &sites {
        for (index, chunk) in rows.chunks(4).enumerate() {
            let mut line = format!("SITE   {:>3} {:>3} {:>2} ", index + 1, site, rows.len());
            for row in chunk {
                line.push_str(&format!(
                    "{:>3} {:1}{:>4}{:1} ",
                    either(row, &["auth_comp_id", "label_comp_id"]),
                    either(row, &["auth_asym_id", "label_asym_id"]),
                    either(row, &["auth_seq_id", "label_seq_id"]),
                    either(row, &["pdbx_auth_ins_code", "pdbx_PDB_ins_code"]),
                ));
            }
            lines.push(line);
        }
    }
}

/// Formats a charge as PDB writes it (`2+`, `1-`); zero and absent charges are blank.
pub fn charge_text(charge: Option<i64>) -> String {
    match charge {
        Some(c) if c > 0 => format!("{}+", c),
        Some(c) if c < 0 => format!("{}-", -c),
        _ => String::new(),
    }
}

fn atom_name_field(name: &str, element: &str) -> String {
    if name.len() < 4 && element.len() == 1 {
        format!(" {:<3}", name)
    } else {
        format!("{:<4}", name)
    }
}

/// The identifying columns 6–26 shared by ATOM, HETATM and ANISOU records.
fn atom_identity(row: &Row<'_>, name_field: &str) -> String {
    format!(
        "{:>5} {}{:1}{:>3} {:1}{:>4}{:1}",
        text(row, "id"),
        name_field,
        text(row, "label_alt_id"),
        either(row, &["auth_comp_id", "label_comp_id"]),
        either(row, &["auth_asym_id", "label_asym_id"]),
        either(row, &["auth_seq_id", "label_seq_id"]),
        text(row, "pdbx_PDB_ins_code"),
    )
}

fn write_coordinates(dict: &IntermediateDict, lines: &mut Vec<String>) {
    let polymer_entities: Vec<&str> = dict
        .rows("entity")
        .filter(|r| r.get("type") == Some("polymer"))
        .filter_map(|r| r.defined("id"))
        .collect();
    let has_entities = dict.contains("entity");
    let anisotropy: HashMap<&str, Row<'_>> = dict
        .rows("atom_site_anisotrop")
        .filter_map(|r| Some((r.defined("id")?, r)))
        .collect();

    let rows: Vec<Row<'_>> = dict.rows("atom_site").collect();
    let mut models: Vec<&str> = Vec::new();
    for row in &rows {
        let model = text(row, "pdbx_PDB_model_num");
        if !models.contains(&model) {
            models.push(model);
        }
    }
    let multiple = models.len() > 1;

    for model in models {
        if multiple {
            lines.push(format!("MODEL     {:>4}", model));
        }
        let model_rows: Vec<&Row<'_>> = rows
            .iter()
            .filter(|r| text(r, "pdbx_PDB_model_num") == model)
            .collect();
        for (index, row) in model_rows.iter().enumerate() {
            let element = text(row, "type_symbol");
            let name = either(row, &["auth_atom_id", "label_atom_id"]);
            let name_field = atom_name_field(name, element);
            let identity = atom_identity(row, &name_field);
            let charge = charge_text(row.parse::<i64>("pdbx_formal_charge"));
            let record = row.defined("group_PDB").unwrap_or("ATOM");
            lines.push(format!(
                "{:<6}{}   {}{}{}{}{}          {:>2}{:>2}",
                record,
                identity,
                format_number(row.parse("Cartn_x"), 8, 3),
                format_number(row.parse("Cartn_y"), 8, 3),
                format_number(row.parse("Cartn_z"), 8, 3),
                format_number(row.parse("occupancy"), 6, 2),
                format_number(row.parse("B_iso_or_equiv"), 6, 2),
                element,
                charge,
            ));

            if let Some(tensor) = anisotropy.get(text(row, "id")) {
                let values: String = ["U[1][1]", "U[2][2]", "U[3][3]", "U[1][2]", "U[1][3]", "U[2][3]"]
                    .iter()
                    .map(|key| match tensor.parse::<f64>(key) {
                        Some(u) => format!("{:>7}", (u * 10000.0).round() as i64),
                        None => " ".repeat(7),
                    })
                    .collect();
                lines.push(format!(
                    "ANISOU{} {}      {:>2}{:>2}",
                    identity, values, element, charge
                ));
            }

            let asym = text(row, "label_asym_id");
            let chain_ends = model_rows
                .get(index + 1)
                .is_none_or(|next| text(next, "label_asym_id") != asym);
            let polymer = if has_entities {
                polymer_entities.contains(&text(row, "label_entity_id"))
            } else {
                record == "ATOM"
            };
            if chain_ends && polymer {
                let serial = row.parse::<i64>("id").map_or(String::new(), |id| (id + 1).to_string());
                lines.push(format!(
                    "TER   {:>5}      {:>3} {:1}{:>4}{:1}",
                    serial,
                    either(row, &["auth_comp_id", "label_comp_id"]),
                    either(row, &["auth_asym_id", "label_asym_id"]),
                    either(row, &["auth_seq_id", "label_seq_id"]),
                    text(row, "pdbx_PDB_ins_code"),
                ));
            }
        }
        if multiple {
            lines.push("ENDMDL".to_string());
        }
    }
}

/// Writes `conect` as CONECT records, or the bonding `struct_conn` rows when there is no
/// `conect`, listing each of those bonds from both ends.
fn write_connections(dict: &IntermediateDict, lines: &mut Vec<String>) {
    let pairs: Vec<(String, String)> = if dict.contains("conect") {
        dict.rows("conect")
            .filter_map(|row| {
                Some((
                    row.defined("atom_id")?.to_string(),
                    row.defined("bonded_atom_id")?.to_string(),
                ))
            })
            .collect()
    } else {
        connections::struct_conn_pairs(dict)
            .into_iter()
            .flat_map(|(a, b)| [(a.to_string(), b.to_string()), (b.to_string(), a.to_string())])
            .collect()
    };
    let mut partners: Vec<(&str, Vec<&str>)> = Vec::new();
    for (atom, bonded) in &pairs {
        match partners.iter_mut().find(|(a, _)| *a == atom.as_str()) {
            Some((_, list)) => list.push(bonded.as_str()),
            None => partners.push((atom.as_str(), vec![bonded.as_str()])),
        }
    }
    for (atom, bonded) in partners {
        for chunk in bonded.chunks(4) {
            let ids: String = chunk.iter().map(|id| format!("{:>5}", id)).collect();
            lines.push(format!("CONECT{:>5}{}", atom, ids));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::pdb::reader::records_to_dict;
    use crate::core::io::pdb::record::RecordStream;

    fn dict_from(text: &str) -> IntermediateDict {
        records_to_dict(&RecordStream::parse(text))
    }

    fn lines_named<'a>(lines: &'a [String], name: &str) -> Vec<&'a str> {
        lines.iter().filter(|l| l.starts_with(name)).map(String::as_str).collect()
    }

    #[test]
    fn dates_convert_back_to_pdb_style() {
        assert_eq!(iso_to_pdb_date("1998-01-12").as_deref(), Some("12-JAN-98"));
        assert_eq!(iso_to_pdb_date("2005-12-01").as_deref(), Some("01-DEC-05"));
        assert!(iso_to_pdb_date("2005-13-01").is_none());
    }

    #[test]
    fn charges_are_written_with_trailing_sign() {
        assert_eq!(charge_text(Some(2)), "2+");
        assert_eq!(charge_text(Some(-1)), "1-");
        assert_eq!(charge_text(Some(0)), "");
        assert_eq!(charge_text(None), "");
    }

    #[test]
    fn wrap_breaks_at_spaces_and_optionally_commas() {
        let lines = wrap("alpha beta gamma", 11, 11, false);
        assert_eq!(lines, vec!["alpha beta", "gamma"]);
        let lines = wrap("A.B,C.D,E.F", 8, 8, true);
        assert_eq!(lines, vec!["A.B,C.D,", "E.F"]);
    }

    #[test]
    fn atom_record_columns_match_the_format() {
        let source = "ATOM      1  N   GLY A  13      12.681  37.302 -25.211  1.00 15.56           N";
        let lines = dict_to_lines(&dict_from(&format!("{}\n", source)));
        let atom = lines_named(&lines, "ATOM")[0];
        assert_eq!(&atom[0..6], "ATOM  ");
        assert_eq!(&atom[6..11], "    1");
        assert_eq!(&atom[12..16], " N  ");
        assert_eq!(&atom[17..20], "GLY");
        assert_eq!(&atom[21..22], "A");
        assert_eq!(&atom[22..26], "  13");
        assert_eq!(atom[30..38].trim(), "12.681");
        assert_eq!(atom[46..54].trim(), "-25.211");
        assert_eq!(atom[54..60].trim(), "1.0");
        assert_eq!(atom[60..66].trim(), "15.56");
        assert_eq!(&atom[76..78], " N");
        assert_eq!(lines_named(&lines, "TER").len(), 1);
        assert_eq!(lines.last().map(String::as_str), Some("END"));
    }

    #[test]
    fn header_and_remarks_read_back_identically() {
        let source = concat!(
            "HEADER    HYDROLASE                               12-JAN-98   1LOL\n",
            "TITLE     CRYSTAL STRUCTURE OF OROTIDINE MONOPHOSPHATE DECARBOXYLASE FROM\n",
            "TITLE    2 METHANOBACTERIUM THERMOAUTOTROPHICUM COMPLEXED WITH XMP\n",
            "AUTHOR    N.WU,E.F.PAI\n",
            "REMARK   2 RESOLUTION.    1.90 ANGSTROMS.\n",
            "REMARK   3   R VALUE            (WORKING SET) : 0.193\n",
            "REMARK 465   M RES C SSSEQI\n",
            "REMARK 465     MET A     1\n",
            "REMARK 350 BIOMOLECULE: 1\n",
            "REMARK 350 APPLY THE FOLLOWING TO CHAINS: A\n",
            "REMARK 350   BIOMT1   1  1.000000  0.000000  0.000000        0.00000\n",
            "REMARK 350   BIOMT2   1  0.000000  1.000000  0.000000        0.00000\n",
            "REMARK 350   BIOMT3   1  0.000000  0.000000  1.000000        0.00000\n",
            "ATOM      1  CA  MET A   2       0.000   0.000   0.000  1.00  0.00           C\n",
        );
        let original = dict_from(source);
        let written = dict_to_lines(&original).join("\n");
        let reread = dict_from(&written);
        for (category, key) in [
            ("entry", "id"),
            ("struct", "title"),
            ("struct_keywords", "pdbx_keywords"),
            ("pdbx_database_status", "recvd_initial_deposition_date"),
            ("refine", "ls_d_res_high"),
            ("refine", "ls_R_factor_R_work"),
            ("pdbx_unobs_or_zero_occ_residues", "auth_comp_id"),
            ("pdbx_struct_assembly_gen", "asym_id_list"),
            ("pdbx_struct_oper_list", "matrix[2][2]"),
        ] {
            assert_eq!(reread.first(category, key), original.first(category, key), "{category}.{key}");
        }
        let authors: Vec<&str> = reread.rows("audit_author").filter_map(|r| r.get("name")).collect();
        assert_eq!(authors, vec!["N.WU", "E.F.PAI"]);
    }

    #[test]
    fn multiple_models_are_wrapped_and_conect_is_chunked() {
        let source = concat!(
            "MODEL        1\n",
            "HETATM    1  C1  LIG A   1       0.000   0.000   0.000  1.00  0.00           C\n",
            "ENDMDL\n",
            "MODEL        2\n",
            "HETATM    1  C1  LIG A   1       1.000   0.000   0.000  1.00  0.00           C\n",
            "ENDMDL\n",
            "CONECT    1    2    3    4    5\n",
            "CONECT    1    6\n",
        );
        let lines = dict_to_lines(&dict_from(source));
        assert_eq!(lines_named(&lines, "MODEL").len(), 2);
        assert_eq!(lines_named(&lines, "ENDMDL").len(), 2);
        assert!(lines_named(&lines, "TER").is_empty());
        assert_eq!(
            lines_named(&lines, "CONECT"),
            vec!["CONECT    1    2    3    4    5", "CONECT    1    6"]
        );
    }

    #[test]
    fn secondary_structure_records_keep_their_columns() {
        let source = concat!(
            "HELIX    1   1 GLY A    1  SER A    3  1                                   3\n",
            "SHEET    1   A 2 GLY A   1  ALA A   2  0\n",
            "SITE     1 AC1  2 GLY A   1  ALA A   2\n",
            "ATOM      1  CA  GLY A   1       0.000   0.000   0.000  1.00  0.00           C\n",
        );
        let lines = dict_to_lines(&dict_from(source));
        let written = lines.join("\n");
        let reread = dict_from(&written);
        let helix = reread.category("struct_conf").unwrap().row(0).unwrap();
        assert_eq!(helix.get("beg_auth_comp_id"), Some("GLY"));
        assert_eq!(helix.get("end_auth_seq_id"), Some("3"));
        assert_eq!(helix.get("pdbx_PDB_helix_length"), Some("3"));
        let strand = reread.category("struct_sheet_range").unwrap().row(0).unwrap();
        assert_eq!(strand.get("beg_auth_seq_id"), Some("1"));
        assert_eq!(strand.get("end_auth_comp_id"), Some("ALA"));
        let sites: Vec<&str> = reread
            .rows("struct_site_gen")
            .filter_map(|r| r.get("auth_comp_id"))
            .collect();
        assert_eq!(sites, vec!["GLY", "ALA"]);
    }
}
