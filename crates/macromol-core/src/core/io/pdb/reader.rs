use super::record::{Record, RecordStream, TokenBlock, TokenValue, merge_records, parse_token_blocks, token};
use crate::core::io::dict::{INAPPLICABLE, IntermediateDict, UNKNOWN};
use crate::core::utils::identifiers;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

pub(super) const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Column ranges of the four residue slots of a SITE record: name, chain, number, icode.
const SITE_SLOTS: [(usize, usize, usize, usize); 4] = [(18, 22, 23, 27), (29, 33, 34, 38), (40, 44, 45, 49), (51, 55, 56, 60)];

/// Translates a PDB record stream into the mmCIF-vocabulary dictionary.
pub fn records_to_dict(stream: &RecordStream) -> IntermediateDict {
    let atoms = AtomPass::run(stream);
    let entities = Entities::build(stream, &atoms);

    let code = stream
        .first("HEADER")
        .and_then(|r| r.as_str(62, 66))
        .unwrap_or_default();
    let mut dict = IntermediateDict::new(code);

    read_header(stream, &mut dict);
    read_authors(stream, &mut dict);
    entities.write(stream, &mut dict);
    read_source(stream, &mut dict);
    read_refinement(stream, &mut dict);
    read_assemblies(stream, &atoms.asyms, &mut dict);
    read_missing_residues(stream, &atoms.asyms, &mut dict);
    read_helices(stream, &atoms.asyms, &mut dict);
    read_sheets(stream, &atoms.asyms, &mut dict);
    read_sites(stream, &atoms.asyms, &mut dict);
    atoms.write(&entities, &mut dict);
    read_connections(stream, &mut dict);

    debug!(
        records = stream.len(),
        categories = dict.len(),
        "Translated PDB records into {} categories",
        dict.len()
    );
    dict
}

fn text_or_unknown(value: Option<&str>) -> String {
    value.unwrap_or(UNKNOWN).to_string()
}

/// Converts `DD-MON-YY` into `YYYY-MM-DD`. Years 00–68 are 20xx, 69–99 are 19xx.
pub fn pdb_date_to_iso(date: &str) -> Option<String> {
    let mut parts = date.trim().split('-');
    let day: u32 = parts.next()?.parse().ok()?;
    let month_name = parts.next()?.to_ascii_uppercase();
    let year: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !(1..=31).contains(&day) || year > 99 {
        return None;
    }
    let month = MONTHS.iter().position(|m| *m == month_name)? + 1;
    let century = if year <= 68 { 2000 } else { 1900 };
    Some(format!("{:04}-{:02}-{:02}", century + year, month, day))
}

fn read_header(stream: &RecordStream, dict: &mut IntermediateDict) {
    let header = stream.first("HEADER");
    if let Some(code) = header.and_then(|r| r.as_str(62, 66)) {
        dict.entry("entry").push_pairs([("id", code)]);
    }

    let titles: Vec<&Record> = stream.named("TITLE").collect();
    if !titles.is_empty() {
        dict.entry("struct")
            .push_pairs([("title", merge_records(&titles, 10, " ", ",;:-"))]);
    }

    let classification = header.and_then(|r| r.as_str(10, 50));
    let keywords: Vec<&Record> = stream.named("KEYWDS").collect();
    if classification.is_some() || !keywords.is_empty() {
        let text = if keywords.is_empty() {
            UNKNOWN.to_string()
        } else {
            merge_records(&keywords, 10, " ", ",")
        };
        dict.entry("struct_keywords").push_pairs([
            ("pdbx_keywords", text_or_unknown(classification)),
            ("text", text),
        ]);
    }

    if let Some(date) = header
        .and_then(|r| r.as_str(50, 59))
        .and_then(pdb_date_to_iso)
    {
        dict.entry("pdbx_database_status")
            .push_pairs([("recvd_initial_deposition_date", date)]);
    }

    let methods: Vec<&Record> = stream.named("EXPDTA").collect();
    if !methods.is_empty() {
        let merged = merge_records(&methods, 10, " ", ",;:-");
        for method in merged.split(';').map(str::trim).filter(|m| !m.is_empty()) {
            dict.entry("exptl").push_pairs([("method", method)]);
        }
    }
}

fn split_names(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn read_authors(stream: &RecordStream, dict: &mut IntermediateDict) {
    let authors: Vec<&Record> = stream.named("AUTHOR").collect();
    for (ordinal, name) in split_names(&merge_records(&authors, 10, " ", "-"))
        .into_iter()
        .enumerate()
    {
        dict.entry("audit_author")
            .push_pairs([("name", name), ("pdbx_ordinal", (ordinal + 1).to_string())]);
    }

    let titles = journal_records(stream, "TITL");
    if !titles.is_empty() {
        dict.entry("citation").push_pairs([
            ("id", "primary".to_string()),
            ("title", merge_records(&titles, 19, " ", ",;:-")),
        ]);
    }
    let journal_authors = journal_records(stream, "AUTH");
    for (ordinal, name) in split_names(&merge_records(&journal_authors, 19, " ", "-"))
        .into_iter()
        .enumerate()
    {
        dict.entry("citation_author").push_pairs([
            ("citation_id", "primary".to_string()),
            ("name", name),
            ("ordinal", (ordinal + 1).to_string()),
        ]);
    }
}

fn journal_records<'a>(stream: &'a RecordStream, kind: &str) -> Vec<&'a Record> {
    stream
        .named("JRNL")
        .filter(|r| r.as_str(12, 16) == Some(kind))
        .collect()
}

fn token_blocks(stream: &RecordStream, name: &str) -> Vec<TokenBlock> {
    let records: Vec<&Record> = stream.named(name).collect();
    if records.is_empty() {
        return Vec::new();
    }
    parse_token_blocks(&merge_records(&records, 10, " ", ",-"))
}

fn block_id(block: &TokenBlock, fallback: usize) -> String {
    token(block, "MOL_ID")
        .and_then(TokenValue::as_int)
        .map_or_else(|| fallback.to_string(), |id| id.to_string())
}

fn read_source(stream: &RecordStream, dict: &mut IntermediateDict) {
    for (index, block) in token_blocks(stream, "SOURCE").iter().enumerate() {
        let organism = token(block, "ORGANISM_SCIENTIFIC").and_then(TokenValue::as_str);
        let host = token(block, "EXPRESSION_SYSTEM").and_then(TokenValue::as_str);
        if organism.is_none() && host.is_none() {
            continue;
        }
        dict.entry("entity_src_gen").push_pairs([
            ("entity_id", block_id(block, index + 1)),
            ("pdbx_gene_src_scientific_name", text_or_unknown(organism)),
            ("pdbx_host_org_scientific_name", text_or_unknown(host)),
        ]);
    }
}

fn value_after_colon(text: &str) -> Option<&str> {
    let (_, value) = text.split_once(':')?;
    value.split_whitespace().next()
}

fn numeric(text: Option<&str>) -> Option<String> {
    let text = text?;
    text.parse::<f64>().ok().map(|_| text.to_string())
}

fn read_refinement(stream: &RecordStream, dict: &mut IntermediateDict) {
    let resolution = stream.remarks(2).into_iter().find_map(|r| {
        let mut tokens = r.tail(11).split_whitespace();
        match tokens.next() {
            Some("RESOLUTION.") => numeric(tokens.next()),
            _ => None,
        }
    });

    let remark3 = stream.remarks(3);
    let r_work = remark3.iter().find_map(|r| {
        let text = r.tail(10).trim();
        (text.starts_with("R VALUE") && text.contains("(WORKING SET)"))
            .then(|| numeric(value_after_colon(text)))
            .flatten()
    });
    let r_free = remark3.iter().find_map(|r| {
        let text = r.tail(10).trim();
        (text.starts_with("FREE R VALUE") && !text.contains("TEST SET"))
            .then(|| numeric(value_after_colon(text)))
            .flatten()
    });

    if resolution.is_none() && r_work.is_none() && r_free.is_none() {
        return;
    }
    dict.entry("refine").push_pairs([
        ("ls_d_res_high", resolution.unwrap_or_else(|| UNKNOWN.to_string())),
        ("ls_R_factor_R_work", r_work.unwrap_or_else(|| UNKNOWN.to_string())),
        ("ls_R_factor_R_free", r_free.unwrap_or_else(|| UNKNOWN.to_string())),
    ]);
}

type OperatorRows = [[f64; 4]; 3];

#[derive(Default)]
struct AssemblyBlock {
    id: String,
    software: Option<String>,
    buried_surface_area: Option<String>,
    surface_area: Option<String>,
    delta_energy: Option<String>,
    generators: Vec<(Vec<String>, Vec<OperatorRows>)>,
}

fn parse_biomt(text: &str) -> Option<(usize, [f64; 4])> {
    let mut tokens = text.split_whitespace();
    let row = tokens.next()?.strip_prefix("BIOMT")?.parse::<usize>().ok()?;
    tokens.next()?;
    let mut values = [0.0; 4];
    for value in &mut values {
        *value = tokens.next()?.parse().ok()?;
    }
    (1..=3).contains(&row).then_some((row - 1, values))
}

fn read_assemblies(stream: &RecordStream, asyms: &AsymMap, dict: &mut IntermediateDict) {
    let mut blocks: Vec<AssemblyBlock> = Vec::new();
    for record in stream.remarks(350) {
        let text = record.tail(11).trim();
        if let Some(id) = text.strip_prefix("BIOMOLECULE:") {
            blocks.push(AssemblyBlock {
                id: id.trim().to_string(),
                ..Default::default()
            });
            continue;
        }
        let Some(block) = blocks.last_mut() else {
            continue;
        };
        if let Some(software) = text.strip_prefix("SOFTWARE USED:") {
            block.software = Some(software.trim().to_string());
        } else if text.starts_with("TOTAL BURIED SURFACE AREA:") {
            block.buried_surface_area = numeric(value_after_colon(text));
        } else if text.starts_with("SURFACE AREA OF THE COMPLEX:") {
            block.surface_area = numeric(value_after_colon(text));
        } else if text.starts_with("CHANGE IN SOLVENT FREE ENERGY:") {
            block.delta_energy = numeric(value_after_colon(text));
        } else if text.contains("APPLY THE FOLLOWING TO CHAINS:") || text.starts_with("AND CHAINS:") {
            let chains = text
                .rsplit_once(':')
                .map(|(_, c)| split_names(c))
                .unwrap_or_default();
            match (text.starts_with("AND CHAINS:"), block.generators.last_mut()) {
                (true, Some((existing, _))) => existing.extend(chains),
                _ => block.generators.push((chains, Vec::new())),
            }
        } else if let Some((row, values)) = parse_biomt(text) {
            let Some((_, matrices)) = block.generators.last_mut() else {
                continue;
            };
            if row == 0 || matrices.is_empty() {
                matrices.push([[0.0; 4]; 3]);
            }
            if let Some(matrix) = matrices.last_mut() {
                matrix[row] = values;
            }
        }
    }

    let mut operators: Vec<OperatorRows> = Vec::new();
    for block in &blocks {
        dict.entry("pdbx_struct_assembly").push_pairs([
            ("id", block.id.clone()),
            ("details", UNKNOWN.to_string()),
            ("method_details", text_or_unknown(block.software.as_deref())),
        ]);
        for (kind, value) in [
            ("ABSA (A^2)", &block.buried_surface_area),
            ("MORE", &block.delta_energy),
            ("SSA (A^2)", &block.surface_area),
        ] {
            if let Some(value) = value {
                dict.entry("pdbx_struct_assembly_prop").push_pairs([
                    ("biol_id", block.id.clone()),
                    ("type", kind.to_string()),
                    ("value", value.clone()),
                    ("details", UNKNOWN.to_string()),
                ]);
            }
        }
        for (chains, matrices) in &block.generators {
            let ids: Vec<String> = matrices
                .iter()
                .map(|m| {
                    let index = operators.iter().position(|o| o == m).unwrap_or_else(|| {
                        operators.push(*m);
                        operators.len() - 1
                    });
                    (index + 1).to_string()
                })
                .collect();
            let asym_list: Vec<String> = chains
                .iter()
                .flat_map(|chain| asyms.labels_for_author_chain(chain))
                .collect();
            dict.entry("pdbx_struct_assembly_gen").push_pairs([
                ("assembly_id", block.id.clone()),
                ("oper_expression", ids.join(",")),
                ("asym_id_list", asym_list.join(",")),
            ]);
        }
    }

    for (index, matrix) in operators.iter().enumerate() {
        let mut pairs = vec![("id".to_string(), (index + 1).to_string()), ("type".to_string(), UNKNOWN.to_string())];
        for (r, row) in matrix.iter().enumerate() {
            for (c, value) in row.iter().take(3).enumerate() {
                pairs.push((format!("matrix[{}][{}]", r + 1, c + 1), format!("{:.6}", value)));
            }
        }
        for (r, row) in matrix.iter().enumerate() {
            pairs.push((format!("vector[{}]", r + 1), format!("{:.5}", row[3])));
        }
        dict.entry("pdbx_struct_oper_list").push_pairs(pairs);
    }
}

fn read_missing_residues(stream: &RecordStream, asyms: &AsymMap, dict: &mut IntermediateDict) {
    let mut in_table = false;
    let mut ordinal = 0;
    for record in stream.remarks(465) {
        let text = record.tail(10);
        if text.contains("RES C SSSEQI") {
            in_table = true;
            continue;
        }
        if !in_table {
            continue;
        }
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let (model, name, chain, position) = match tokens.as_slice() {
            [model, name, chain, position] if model.parse::<i64>().is_ok() => (*model, *name, *chain, *position),
            [name, chain, position] => ("1", *name, *chain, *position),
            _ => continue,
        };
        let Some((number, insertion_code)) = identifiers::split_residue_key(position) else {
            continue;
        };
        ordinal += 1;
        trace!(chain, number, name, "Missing residue declared");
        dict.entry("pdbx_unobs_or_zero_occ_residues").push_pairs([
            ("id", ordinal.to_string()),
            ("PDB_model_num", model.to_string()),
            ("polymer_flag", "Y".to_string()),
            ("occupancy_flag", "1".to_string()),
            ("auth_asym_id", chain.to_string()),
            ("auth_comp_id", name.to_string()),
            ("auth_seq_id", number.to_string()),
            (
                "PDB_ins_code",
                if insertion_code.is_empty() { UNKNOWN.to_string() } else { insertion_code },
            ),
            ("label_asym_id", asyms.polymer_label(chain)),
            ("label_comp_id", name.to_string()),
            ("label_seq_id", UNKNOWN.to_string()),
        ]);
    }
}

struct Span<'a> {
    name: Option<&'a str>,
    chain: &'a str,
    number: Option<&'a str>,
    insertion_code: Option<&'a str>,
}

impl<'a> Span<'a> {
    fn read(record: &'a Record, name: usize, chain: usize, number: (usize, usize), icode: usize) -> Self {
        Self {
            name: record.as_str(name, name + 3),
            chain: record.as_str(chain, chain + 1).unwrap_or_default(),
            number: record.as_str(number.0, number.1),
            insertion_code: record.as_str(icode, icode + 1),
        }
    }

    fn pairs(&self, end: &str, asyms: &AsymMap) -> Vec<(String, String)> {
        let (prefix, ins_key) = match end {
            "beg" => ("beg", "pdbx_beg_PDB_ins_code"),
            _ => ("end", "pdbx_end_PDB_ins_code"),
        };
        vec![
            (format!("{}_label_comp_id", prefix), text_or_unknown(self.name)),
            (format!("{}_label_asym_id", prefix), asyms.polymer_label(self.chain)),
            (format!("{}_label_seq_id", prefix), UNKNOWN.to_string()),
            (ins_key.to_string(), text_or_unknown(self.insertion_code)),
            (format!("{}_auth_comp_id", prefix), text_or_unknown(self.name)),
            (format!("{}_auth_asym_id", prefix), self.chain.to_string()),
            (format!("{}_auth_seq_id", prefix), text_or_unknown(self.number)),
        ]
    }
}

fn read_helices(stream: &RecordStream, asyms: &AsymMap, dict: &mut IntermediateDict) {
    for (index, record) in stream.named("HELIX").enumerate() {
        let start = Span::read(record, 15, 19, (21, 25), 25);
        let end = Span::read(record, 27, 31, (33, 37), 37);
        let mut pairs = vec![
            ("conf_type_id".to_string(), "HELX_P".to_string()),
            ("id".to_string(), format!("HELX_P{}", index + 1)),
            ("pdbx_PDB_helix_id".to_string(), text_or_unknown(record.as_str(11, 14))),
        ];
        pairs.extend(start.pairs("beg", asyms));
        pairs.extend(end.pairs("end", asyms));
        pairs.push(("pdbx_PDB_helix_class".to_string(), text_or_unknown(record.as_str(38, 40))));
        pairs.push(("pdbx_PDB_helix_length".to_string(), text_or_unknown(record.as_str(71, 76))));
        dict.entry("struct_conf").push_pairs(pairs);
    }
}

fn read_sheets(stream: &RecordStream, asyms: &AsymMap, dict: &mut IntermediateDict) {
    for record in stream.named("SHEET") {
        let start = Span::read(record, 17, 21, (22, 26), 26);
        let end = Span::read(record, 28, 32, (33, 37), 37);
        let mut pairs = vec![
            ("sheet_id".to_string(), text_or_unknown(record.as_str(11, 14))),
            ("id".to_string(), text_or_unknown(record.as_str(7, 10))),
        ];
        pairs.extend(start.pairs("beg", asyms));
        pairs.extend(end.pairs("end", asyms));
        dict.entry("struct_sheet_range").push_pairs(pairs);
    }
}

fn read_sites(stream: &RecordStream, asyms: &AsymMap, dict: &mut IntermediateDict) {
    let mut ordinal = 0;
    for record in stream.named("SITE") {
        let Some(site_id) = record.as_str(11, 14) else {
            continue;
        };
        for (name_col, chain_col, number_col, icode_col) in SITE_SLOTS {
            let Some(name) = record.as_str(name_col, name_col + 3) else {
                continue;
            };
            let chain = record.as_str(chain_col, chain_col + 1).unwrap_or_default();
            let number = record.as_str(number_col, number_col + 4).unwrap_or(UNKNOWN);
            let insertion_code = record.as_str(icode_col, icode_col + 1);
            ordinal += 1;
            dict.entry("struct_site_gen").push_pairs([
                ("id", ordinal.to_string()),
                ("site_id", site_id.to_string()),
                ("label_comp_id", name.to_string()),
                ("label_asym_id", asyms.label_for_residue(chain, number, insertion_code.unwrap_or(""), name)),
                ("label_seq_id", INAPPLICABLE.to_string()),
                ("pdbx_auth_ins_code", text_or_unknown(insertion_code)),
                ("auth_comp_id", name.to_string()),
                ("auth_asym_id", chain.to_string()),
                ("auth_seq_id", number.to_string()),
            ]);
        }
    }
}

fn read_connections(stream: &RecordStream, dict: &mut IntermediateDict) {
    for record in stream.named("CONECT") {
        let Some(atom) = record.int(6, 11) else {
            continue;
        };
        for start in [11, 16, 21, 26] {
            if let Some(bonded) = record.int(start, start + 5) {
                dict.entry("conect").push_pairs([
                    ("atom_id", atom.to_string()),
                    ("bonded_atom_id", bonded.to_string()),
                ]);
            }
        }
    }
}

/// Converts PDB charges such as `2+`, `+2` or `1-` to a signed integer string.
pub fn pdb_charge(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    let (digits, sign) = if let Some(d) = text.strip_suffix('+') {
        (d, 1)
    } else if let Some(d) = text.strip_suffix('-') {
        (d, -1)
    } else {
        return None;
    };
    let magnitude: i64 = if digits.is_empty() { 1 } else { digits.parse().ok()? };
    Some(sign * magnitude)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Polymer,
    NonPolymer,
    Water,
}

struct AtomEntry<'a> {
    record: &'a Record,
    model: i64,
    kind: Kind,
}

impl AtomEntry<'_> {
    fn chain(&self) -> &str {
        self.record.as_str(21, 22).unwrap_or_default()
    }

    fn residue_name(&self) -> &str {
        self.record.as_str(17, 20).unwrap_or_default()
    }

    fn residue_number(&self) -> &str {
        self.record.as_str(22, 26).unwrap_or(UNKNOWN)
    }

    fn insertion_code(&self) -> &str {
        self.record.as_str(26, 27).unwrap_or_default()
    }
}

/// Walks coordinate records and yields each with the model number it belongs to.
fn model_records(stream: &RecordStream) -> Vec<(i64, &Record)> {
    let mut model = 1;
    let mut ended = false;
    let mut records = Vec::new();
    for record in stream.records() {
        match record.name() {
            "MODEL" => {
                model = record.int(10, 14).unwrap_or(if ended { model + 1 } else { model });
                ended = false;
            }
            "ENDMDL" => ended = true,
            "ATOM" | "HETATM" | "ANISOU" | "TER" => {
                if ended {
                    model += 1;
                    ended = false;
                }
                records.push((model, record));
            }
            _ => {}
        }
    }
    records
}

/// Label asym ids assigned to the chains, ligands and waters of a PDB file.
#[derive(Default)]
struct AsymMap {
    polymers: HashMap<String, String>,
    ligands: HashMap<(String, String, String, String), String>,
    waters: HashMap<String, String>,
    /// Every label with its author chain, first-seen order.
    authors: Vec<(String, String)>,
    used: HashSet<String>,
    next: usize,
}

/// The `n`-th label in the sequence A..Z, AA, BA, CA, ...
fn asym_label(mut n: usize) -> String {
    let mut label = String::new();
    loop {
        label.push(char::from(b'A' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label
}

impl AsymMap {
    fn fresh(&mut self) -> String {
        loop {
            let label = asym_label(self.next);
            self.next += 1;
            if self.used.insert(label.clone()) {
                return label;
            }
        }
    }

    fn record_author(&mut self, label: &str, chain: &str) {
        if !self.authors.iter().any(|(l, _)| l == label) {
            self.authors.push((label.to_string(), chain.to_string()));
        }
    }

    fn polymer_label(&self, chain: &str) -> String {
        self.polymers
            .get(chain)
            .cloned()
            .unwrap_or_else(|| chain.to_string())
    }

    fn label_for_residue(&self, chain: &str, number: &str, insertion_code: &str, name: &str) -> String {
        let key = (chain.to_string(), number.to_string(), insertion_code.to_string(), name.to_string());
        if let Some(label) = self.ligands.get(&key) {
            return label.clone();
        }
        if identifiers::is_water_name(name) {
            if let Some(label) = self.waters.get(chain) {
                return label.clone();
            }
        }
        self.polymer_label(chain)
    }

    fn labels_for_author_chain(&self, chain: &str) -> Vec<String> {
        let labels: Vec<String> = self
            .authors
            .iter()
            .filter(|(_, c)| c == chain)
            .map(|(l, _)| l.clone())
            .collect();
        if labels.is_empty() {
            vec![chain.to_string()]
        } else {
            labels
        }
    }

    fn label_for(&self, entry: &AtomEntry<'_>) -> String {
        match entry.kind {
            Kind::Polymer => self.polymer_label(entry.chain()),
            Kind::NonPolymer => self.label_for_residue(
                entry.chain(),
                entry.residue_number(),
                entry.insertion_code(),
                entry.residue_name(),
            ),
            Kind::Water => self
                .waters
                .get(entry.chain())
                .cloned()
                .unwrap_or_else(|| entry.chain().to_string()),
        }
    }
}

struct AtomPass<'a> {
    entries: Vec<AtomEntry<'a>>,
    anisotropy: Vec<&'a Record>,
    asyms: AsymMap,
}

impl<'a> AtomPass<'a> {
    fn run(stream: &'a RecordStream) -> Self {
        let records = model_records(stream);

        let mut has_ter: HashSet<(i64, String)> = HashSet::new();
        let mut has_atom: HashSet<(i64, String)> = HashSet::new();
        let mut last_chain = String::new();
        for (model, record) in &records {
            let chain = record.as_str(21, 22).unwrap_or_default().to_string();
            match record.name() {
                "TER" => {
                    let chain = if chain.is_empty() { last_chain.clone() } else { chain };
                    has_ter.insert((*model, chain));
                }
                "ATOM" => {
                    has_atom.insert((*model, chain.clone()));
                    last_chain = chain;
                }
                "HETATM" => last_chain = chain,
                _ => {}
            }
        }

        let mut entries = Vec::new();
        let mut anisotropy = Vec::new();
        let mut seen_anisotropy: HashSet<i64> = HashSet::new();
        let mut terminated: HashSet<(i64, String)> = HashSet::new();
        let mut last_chain = String::new();
        for (model, record) in records {
            let chain = record.as_str(21, 22).unwrap_or_default().to_string();
            match record.name() {
                "TER" => {
                    let chain = if chain.is_empty() { last_chain.clone() } else { chain };
                    terminated.insert((model, chain));
                }
                "ANISOU" => {
                    if let Some(id) = record.int(6, 11) {
                        if seen_anisotropy.insert(id) {
                            anisotropy.push(record);
                        }
                    }
                }
                name => {
                    let residue_name = record.as_str(17, 20).unwrap_or_default();
                    let key = (model, chain.clone());
                    let kind = if identifiers::is_water_name(residue_name) {
                        Kind::Water
                    } else if name == "ATOM" {
                        Kind::Polymer
                    } else if has_ter.contains(&key) && has_atom.contains(&key) && !terminated.contains(&key) {
                        Kind::Polymer
                    } else {
                        Kind::NonPolymer
                    };
                    last_chain = chain;
                    entries.push(AtomEntry { record, model, kind });
                }
            }
        }

        let asyms = Self::assign_asyms(&entries);
        debug!(atoms = entries.len(), "Collected coordinate records");
        Self {
            entries,
            anisotropy,
            asyms,
        }
    }

    fn assign_asyms(entries: &[AtomEntry<'_>]) -> AsymMap {
        let mut asyms = AsymMap::default();
        let mut blank_polymer = false;
        for entry in entries.iter().filter(|e| e.kind == Kind::Polymer) {
            let chain = entry.chain();
            if chain.is_empty() {
                blank_polymer = true;
            } else if !asyms.polymers.contains_key(chain) {
                asyms.polymers.insert(chain.to_string(), chain.to_string());
                asyms.used.insert(chain.to_string());
            }
        }
        asyms.next = asyms
            .polymers
            .values()
            .filter_map(|label| match label.as_bytes() {
                [b] if b.is_ascii_uppercase() => Some(usize::from(b - b'A') + 1),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        if blank_polymer {
            let label = asyms.fresh();
            asyms.polymers.insert(String::new(), label);
        }

        for entry in entries {
            let chain = entry.chain().to_string();
            let label = match entry.kind {
                Kind::Polymer => asyms.polymer_label(&chain),
                Kind::NonPolymer => {
                    let key = (
                        chain.clone(),
                        entry.residue_number().to_string(),
                        entry.insertion_code().to_string(),
                        entry.residue_name().to_string(),
                    );
                    match asyms.ligands.get(&key) {
                        Some(label) => label.clone(),
                        None => {
                            let label = asyms.fresh();
                            asyms.ligands.insert(key, label.clone());
                            label
                        }
                    }
                }
                Kind::Water => match asyms.waters.get(&chain) {
                    Some(label) => label.clone(),
                    None => {
                        let label = asyms.fresh();
                        asyms.waters.insert(chain.clone(), label.clone());
                        label
                    }
                },
            };
            asyms.record_author(&label, &chain);
        }
        asyms
    }

    fn write(&self, entities: &Entities, dict: &mut IntermediateDict) {
        for entry in &self.entries {
            let record = entry.record;
            let label = self.asyms.label_for(entry);
            let name = record.as_str(12, 16).unwrap_or_default();
            let element = record
                .as_str(76, 78)
                .map(String::from)
                .unwrap_or_else(|| element_from_name(name));
            let charge = record
                .as_str(78, 80)
                .and_then(pdb_charge)
                .map_or_else(|| UNKNOWN.to_string(), |c| c.to_string());
            let entity = entities.entity_for(entry);
            let field = |start, end| text_or_unknown(record.as_str(start, end));
            dict.entry("atom_site").push_pairs([
                ("group_PDB", record.name().to_string()),
                ("id", field(6, 11)),
                ("type_symbol", element),
                ("label_atom_id", name.to_string()),
                ("label_alt_id", record.as_str(16, 17).unwrap_or(INAPPLICABLE).to_string()),
                ("label_comp_id", entry.residue_name().to_string()),
                ("label_asym_id", label),
                ("label_entity_id", entity),
                ("label_seq_id", INAPPLICABLE.to_string()),
                ("pdbx_PDB_ins_code", field(26, 27)),
                ("Cartn_x", field(30, 38)),
                ("Cartn_y", field(38, 46)),
                ("Cartn_z", field(46, 54)),
                ("occupancy", field(54, 60)),
                ("B_iso_or_equiv", field(60, 66)),
                ("pdbx_formal_charge", charge),
                ("auth_seq_id", entry.residue_number().to_string()),
                ("auth_comp_id", entry.residue_name().to_string()),
                ("auth_asym_id", entry.chain().to_string()),
                ("auth_atom_id", name.to_string()),
                ("pdbx_PDB_model_num", entry.model.to_string()),
            ]);
        }

        let labels: HashMap<i64, String> = self
            .entries
            .iter()
            .filter_map(|e| Some((e.record.int(6, 11)?, self.asyms.label_for(e))))
            .collect();
        for record in &self.anisotropy {
            let Some(id) = record.int(6, 11) else {
                continue;
            };
            let mut pairs = vec![
                ("id".to_string(), id.to_string()),
                ("type_symbol".to_string(), text_or_unknown(record.as_str(76, 78))),
                ("pdbx_label_atom_id".to_string(), text_or_unknown(record.as_str(12, 16))),
                ("pdbx_label_alt_id".to_string(), record.as_str(16, 17).unwrap_or(INAPPLICABLE).to_string()),
                ("pdbx_label_comp_id".to_string(), text_or_unknown(record.as_str(17, 20))),
                (
                    "pdbx_label_asym_id".to_string(),
                    labels.get(&id).cloned().unwrap_or_else(|| UNKNOWN.to_string()),
                ),
                ("pdbx_label_seq_id".to_string(), INAPPLICABLE.to_string()),
            ];
            for (index, key) in ["U[1][1]", "U[2][2]", "U[3][3]", "U[1][2]", "U[1][3]", "U[2][3]"]
                .iter()
                .enumerate()
            {
                let start = 28 + index * 7;
                let value = record
                    .int(start, start + 7)
                    .map_or_else(|| UNKNOWN.to_string(), |v| format!("{:.4}", v as f64 / 10000.0));
                pairs.push((key.to_string(), value));
            }
            pairs.push(("pdbx_auth_seq_id".to_string(), text_or_unknown(record.as_str(22, 26))));
            pairs.push(("pdbx_auth_asym_id".to_string(), text_or_unknown(record.as_str(21, 22))));
            dict.entry("atom_site_anisotrop").push_pairs(pairs);
        }
    }
}

/// Guesses an element from an atom name when the element columns are blank.
fn element_from_name(name: &str) -> String {
    name.chars()
        .find(|c| c.is_ascii_alphabetic())
        .map_or_else(|| UNKNOWN.to_string(), |c| c.to_string())
}

struct EntityRow {
    id: String,
    kind: &'static str,
    description: String,
    chains: Vec<String>,
}

/// Entities declared by COMPND, plus ones inferred for unlisted chains, ligands and water.
struct Entities {
    rows: Vec<EntityRow>,
    chains: HashMap<String, String>,
    ligands: HashMap<String, String>,
    water: Option<String>,
}

impl Entities {
    fn build(stream: &RecordStream, atoms: &AtomPass<'_>) -> Self {
        let mut entities = Self {
            rows: Vec::new(),
            chains: HashMap::new(),
            ligands: HashMap::new(),
            water: None,
        };
        for (index, block) in token_blocks(stream, "COMPND").iter().enumerate() {
            let id = block_id(block, index + 1);
            let chains: Vec<String> = token(block, "CHAIN")
                .and_then(TokenValue::as_list)
                .map(<[String]>::to_vec)
                .unwrap_or_default();
            for chain in &chains {
                entities.chains.entry(chain.clone()).or_insert_with(|| id.clone());
            }
            entities.rows.push(EntityRow {
                id,
                kind: "polymer",
                description: token(block, "MOLECULE")
                    .and_then(TokenValue::as_str)
                    .unwrap_or(UNKNOWN)
                    .to_string(),
                chains,
            });
        }

        let mut next_id = entities
            .rows
            .iter()
            .filter_map(|r| r.id.parse::<usize>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let mut fresh = || {
            let id = next_id.to_string();
            next_id += 1;
            id
        };

        for entry in &atoms.entries {
            match entry.kind {
                Kind::Polymer => {
                    let chain = entry.chain();
                    if !entities.chains.contains_key(chain) {
                        let id = fresh();
                        entities.chains.insert(chain.to_string(), id.clone());
                        entities.rows.push(EntityRow {
                            id,
                            kind: "polymer",
                            description: UNKNOWN.to_string(),
                            chains: vec![chain.to_string()],
                        });
                    }
                }
                Kind::NonPolymer => {
                    let name = entry.residue_name();
                    if !entities.ligands.contains_key(name) {
                        let id = fresh();
                        entities.ligands.insert(name.to_string(), id.clone());
                        entities.rows.push(EntityRow {
                            id,
                            kind: "non-polymer",
                            description: name.to_string(),
                            chains: Vec::new(),
                        });
                    }
                }
                Kind::Water => {
                    if entities.water.is_none() {
                        let id = fresh();
                        entities.water = Some(id.clone());
                        entities.rows.push(EntityRow {
                            id,
                            kind: "water",
                            description: "water".to_string(),
                            chains: Vec::new(),
                        });
                    }
                }
            }
        }
        entities
    }

    fn entity_for(&self, entry: &AtomEntry<'_>) -> String {
        let id = match entry.kind {
            Kind::Polymer => self.chains.get(entry.chain()),
            Kind::NonPolymer => self.ligands.get(entry.residue_name()),
            Kind::Water => self.water.as_ref(),
        };
        id.cloned().unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn write(&self, stream: &RecordStream, dict: &mut IntermediateDict) {
        for row in &self.rows {
            dict.entry("entity").push_pairs([
                ("id", row.id.clone()),
                ("type", row.kind.to_string()),
                ("pdbx_description", row.description.clone()),
            ]);
        }

        let mut sequences: Vec<(String, Vec<String>)> = Vec::new();
        for record in stream.named("SEQRES") {
            let chain = record.as_str(11, 12).unwrap_or_default();
            let names = record.tail(19).split_whitespace().map(String::from);
            match sequences.iter_mut().find(|(c, _)| c == chain) {
                Some((_, existing)) => existing.extend(names),
                None => sequences.push((chain.to_string(), names.collect())),
            }
        }

        for row in self.rows.iter().filter(|r| r.kind == "polymer") {
            let names = row
                .chains
                .iter()
                .find_map(|chain| sequences.iter().find(|(c, _)| c == chain).map(|(_, n)| n));
            let sequence = names
                .map(|n| identifiers::sequence_from_names(n.iter().map(String::as_str)))
                .unwrap_or_else(|| UNKNOWN.to_string());
            dict.entry("entity_poly").push_pairs([
                ("entity_id", row.id.clone()),
                ("pdbx_seq_one_letter_code", sequence),
                ("pdbx_strand_id", row.chains.join(",")),
            ]);
            for (index, name) in names.into_iter().flatten().enumerate() {
                dict.entry("entity_poly_seq").push_pairs([
                    ("entity_id", row.id.clone()),
                    ("num", (index + 1).to_string()),
                    ("mon_id", name.clone()),
                    ("hetero", "n".to_string()),
                ]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict_from(text: &str) -> IntermediateDict {
        records_to_dict(&RecordStream::parse(text))
    }

    #[test]
    fn dates_convert_with_two_digit_year_pivot() {
        assert_eq!(pdb_date_to_iso("12-JAN-98").as_deref(), Some("1998-01-12"));
        assert_eq!(pdb_date_to_iso("01-DEC-05").as_deref(), Some("2005-12-01"));
        assert_eq!(pdb_date_to_iso("30-jun-68").as_deref(), Some("2068-06-30"));
        assert_eq!(pdb_date_to_iso("30-JUN-69").as_deref(), Some("1969-06-30"));
        assert!(pdb_date_to_iso("XX-JAN-98").is_none());
        assert!(pdb_date_to_iso("12-FOO-98").is_none());
    }

    #[test]
    fn charges_accept_trailing_and_leading_signs() {
        assert_eq!(pdb_charge("2+"), Some(2));
        assert_eq!(pdb_charge("1-"), Some(-1));
        assert_eq!(pdb_charge("+2"), Some(2));
        assert_eq!(pdb_charge("-"), Some(-1));
        assert_eq!(pdb_charge("x"), None);
    }

    #[test]
    fn asym_labels_follow_mmcif_sequence() {
        assert_eq!(asym_label(0), "A");
        assert_eq!(asym_label(25), "Z");
        assert_eq!(asym_label(26), "AA");
        assert_eq!(asym_label(27), "BA");
    }

    #[test]
    fn header_records_fill_descriptive_categories() {
        let dict = dict_from(concat!(
            "HEADER    HYDROLASE                               12-JAN-98   1LOL              \n",
            "TITLE     CRYSTAL STRUCTURE OF OROTIDINE MONOPHOSPHATE DECARBOXYLASE\n",
            "TITLE    2 COMPLEX WITH XMP\n",
            "KEYWDS    TIM BARREL, LYASE\n",
            "EXPDTA    X-RAY DIFFRACTION\n",
            "AUTHOR    N.WU, E.F.PAI\n",
            "JRNL        AUTH   N.WU,Y.MO,J.GAO,E.F.PAI\n",
            "REMARK   2 RESOLUTION.    1.90 ANGSTROMS.\n",
            "REMARK   3   R VALUE            (WORKING SET) : 0.193\n",
            "REMARK   3   FREE R VALUE                     : 0.229\n",
            "REMARK   3   FREE R VALUE TEST SET SIZE   (%) : 5.000\n",
        ));
        assert_eq!(dict.name(), "1LOL");
        assert_eq!(dict.first("entry", "id"), Some("1LOL"));
        assert_eq!(
            dict.first("struct", "title"),
            Some("CRYSTAL STRUCTURE OF OROTIDINE MONOPHOSPHATE DECARBOXYLASE COMPLEX WITH XMP")
        );
        assert_eq!(dict.first("struct_keywords", "pdbx_keywords"), Some("HYDROLASE"));
        assert_eq!(dict.first("struct_keywords", "text"), Some("TIM BARREL, LYASE"));
        assert_eq!(
            dict.first("pdbx_database_status", "recvd_initial_deposition_date"),
            Some("1998-01-12")
        );
        assert_eq!(dict.first("exptl", "method"), Some("X-RAY DIFFRACTION"));
        let authors: Vec<&str> = dict.rows("audit_author").filter_map(|r| r.get("name")).collect();
        assert_eq!(authors, vec!["N.WU", "E.F.PAI"]);
        assert_eq!(dict.rows("citation_author").count(), 4);
        assert_eq!(dict.first("refine", "ls_d_res_high"), Some("1.90"));
        assert_eq!(dict.first("refine", "ls_R_factor_R_work"), Some("0.193"));
        assert_eq!(dict.first("refine", "ls_R_factor_R_free"), Some("0.229"));
    }

    #[test]
    fn single_atom_record_becomes_atom_site_row() {
        let dict = dict_from(
            "ATOM      1  N   GLY A  13      12.681  37.302 -25.211  1.00 15.56           N\n",
        );
        let row = dict.category("atom_site").unwrap().row(0).unwrap();
        assert_eq!(row.get("id"), Some("1"));
        assert_eq!(row.get("label_atom_id"), Some("N"));
        assert_eq!(row.get("label_comp_id"), Some("GLY"));
        assert_eq!(row.get("label_asym_id"), Some("A"));
        assert_eq!(row.get("label_alt_id"), Some("."));
        assert_eq!(row.get("auth_seq_id"), Some("13"));
        assert_eq!(row.get("Cartn_x"), Some("12.681"));
        assert_eq!(row.get("Cartn_z"), Some("-25.211"));
        assert_eq!(row.get("B_iso_or_equiv"), Some("15.56"));
        assert_eq!(row.get("type_symbol"), Some("N"));
        assert_eq!(row.get("pdbx_PDB_model_num"), Some("1"));
        assert_eq!(dict.first("entity", "type"), Some("polymer"));
    }

    #[test]
    fn ligands_and_waters_get_fresh_asyms_after_ter() {
        let dict = dict_from(concat!(
            "ATOM      1  CA  GLY A   1       0.000   0.000   0.000  1.00  0.00           C\n",
            "ATOM      2  CA  ALA B   1       3.800   0.000   0.000  1.00  0.00           C\n",
            "TER       3      ALA B   1\n",
            "HETATM    4 ZN    ZN B 101       1.000   1.000   1.000  1.00  0.00          ZN2+\n",
            "HETATM    5  O   HOH B 201       2.000   2.000   2.000  1.00  0.00           O\n",
            "HETATM    6  O   HOH B 202       3.000   2.000   2.000  1.00  0.00           O\n",
        ));
        let asyms: Vec<&str> = dict
            .rows("atom_site")
            .filter_map(|r| r.get("label_asym_id"))
            .collect();
        assert_eq!(asyms, vec!["A", "B", "C", "D", "D"]);
        let charges: Vec<&str> = dict
            .rows("atom_site")
            .filter_map(|r| r.get("pdbx_formal_charge"))
            .collect();
        assert_eq!(charges[2], "2");
        let types: Vec<&str> = dict.rows("entity").filter_map(|r| r.get("type")).collect();
        assert_eq!(types, vec!["polymer", "polymer", "non-polymer", "water"]);
    }

    #[test]
    fn hetatm_before_ter_stays_in_the_polymer() {
        let dict = dict_from(concat!(
            "ATOM      1  CA  GLY A   1       0.000   0.000   0.000  1.00  0.00           C\n",
            "HETATM    2  CA  MSE A   2       3.800   0.000   0.000  1.00  0.00           C\n",
            "TER       3      MSE A   2\n",
        ));
        let asyms: Vec<&str> = dict
            .rows("atom_site")
            .filter_map(|r| r.get("label_asym_id"))
            .collect();
        assert_eq!(asyms, vec!["A", "A"]);
    }

    #[test]
    fn models_number_atom_rows() {
        let dict = dict_from(concat!(
            "MODEL        1\n",
            "ATOM      1  CA  GLY A   1       0.000   0.000   0.000  1.00  0.00           C\n",
            "ENDMDL\n",
            "MODEL        2\n",
            "ATOM      1  CA  GLY A   1       1.000   0.000   0.000  1.00  0.00           C\n",
            "ENDMDL\n",
        ));
        let models: Vec<&str> = dict
            .rows("atom_site")
            .filter_map(|r| r.get("pdbx_PDB_model_num"))
            .collect();
        assert_eq!(models, vec!["1", "2"]);
    }

    #[test]
    fn remark_350_becomes_assembly_categories() {
        let dict = dict_from(concat!(
            "REMARK 350 BIOMOLECULE: 1\n",
            "REMARK 350 SOFTWARE USED: PISA\n",
            "REMARK 350 TOTAL BURIED SURFACE AREA: 1500 ANGSTROM**2\n",
            "REMARK 350 SURFACE AREA OF THE COMPLEX: 16000 ANGSTROM**2\n",
            "REMARK 350 CHANGE IN SOLVENT FREE ENERGY: -10.5 KCAL/MOL\n",
            "REMARK 350 APPLY THE FOLLOWING TO CHAINS: A\n",
            "REMARK 350                    AND CHAINS: B\n",
            "REMARK 350   BIOMT1   1  1.000000  0.000000  0.000000        0.00000\n",
            "REMARK 350   BIOMT2   1  0.000000  1.000000  0.000000        0.00000\n",
            "REMARK 350   BIOMT3   1  0.000000  0.000000  1.000000        0.00000\n",
            "REMARK 350   BIOMT1   2 -1.000000  0.000000  0.000000       10.00000\n",
            "REMARK 350   BIOMT2   2  0.000000 -1.000000  0.000000        0.00000\n",
            "REMARK 350   BIOMT3   2  0.000000  0.000000  1.000000        0.00000\n",
            "ATOM      1  CA  GLY A   1       0.000   0.000   0.000  1.00  0.00           C\n",
            "ATOM      2  CA  GLY B   1       0.000   0.000   0.000  1.00  0.00           C\n",
        ));
        assert_eq!(dict.first("pdbx_struct_assembly", "method_details"), Some("PISA"));
        let props: Vec<(&str, &str)> = dict
            .rows("pdbx_struct_assembly_prop")
            .filter_map(|r| Some((r.get("type")?, r.get("value")?)))
            .collect();
        assert_eq!(props, vec![("ABSA (A^2)", "1500"), ("MORE", "-10.5"), ("SSA (A^2)", "16000")]);
        assert_eq!(dict.first("pdbx_struct_assembly_gen", "oper_expression"), Some("1,2"));
        assert_eq!(dict.first("pdbx_struct_assembly_gen", "asym_id_list"), Some("A,B"));
        let operators = dict.category("pdbx_struct_oper_list").unwrap();
        assert_eq!(operators.len(), 2);
        assert_eq!(operators.row(1).unwrap().get("matrix[1][1]"), Some("-1.000000"));
        assert_eq!(operators.row(1).unwrap().get("vector[1]"), Some("10.00000"));
    }

    #[test]
    fn remark_465_lists_missing_residues() {
        let dict = dict_from(concat!(
            "REMARK 465 MISSING RESIDUES\n",
            "REMARK 465   M RES C SSSEQI\n",
            "REMARK 465     MET A     1\n",
            "REMARK 465     ALA A    13A\n",
        ));
        let rows: Vec<(&str, &str, &str)> = dict
            .rows("pdbx_unobs_or_zero_occ_residues")
            .filter_map(|r| Some((r.get("auth_comp_id")?, r.get("auth_seq_id")?, r.get("PDB_ins_code")?)))
            .collect();
        assert_eq!(rows, vec![("MET", "1", "?"), ("ALA", "13", "A")]);
    }

    #[test]
    fn secondary_structure_and_sequence_records_are_translated() {
        let dict = dict_from(concat!(
            "SEQRES   1 A    3  GLY ALA SER\n",
            "HELIX    1   1 GLY A    1  SER A    3  1                                   3\n",
            "SHEET    1   A 2 GLY A   1  ALA A   2  0\n",
            "ATOM      1  CA  GLY A   1       0.000   0.000   0.000  1.00  0.00           C\n",
        ));
        assert_eq!(dict.first("entity_poly", "pdbx_seq_one_letter_code"), Some("GAS"));
        assert_eq!(dict.rows("entity_poly_seq").count(), 3);
        let helix = dict.category("struct_conf").unwrap().row(0).unwrap();
        assert_eq!(helix.get("beg_auth_seq_id"), Some("1"));
        assert_eq!(helix.get("end_auth_seq_id"), Some("3"));
        assert_eq!(helix.get("beg_label_asym_id"), Some("A"));
        let strand = dict.category("struct_sheet_range").unwrap().row(0).unwrap();
        assert_eq!(strand.get("sheet_id"), Some("A"));
        assert_eq!(strand.get("end_label_comp_id"), Some("ALA"));
    }

    #[test]
    fn conect_records_become_pairs() {
        let dict = dict_from("CONECT    1    2    3\nCONECT    2    1\n");
        let pairs: Vec<(&str, &str)> = dict
            .rows("conect")
            .filter_map(|r| Some((r.get("atom_id")?, r.get("bonded_atom_id")?)))
            .collect();
        assert_eq!(pairs, vec![("1", "2"), ("1", "3"), ("2", "1")]);
    }

    #[test]
    fn compnd_and_source_blocks_name_entities() {
        let dict = dict_from(concat!(
            "COMPND    MOL_ID: 1;\n",
            "COMPND   2 MOLECULE: LYSOZYME;\n",
            "COMPND   3 CHAIN: A;\n",
            "SOURCE    MOL_ID: 1;\n",
            "SOURCE   2 ORGANISM_SCIENTIFIC: GALLUS GALLUS;\n",
            "SOURCE   3 EXPRESSION_SYSTEM: ESCHERICHIA COLI;\n",
            "ATOM      1  CA  LYS A   1       0.000   0.000   0.000  1.00  0.00           C\n",
        ));
        assert_eq!(dict.first("entity", "pdbx_description"), Some("LYSOZYME"));
        assert_eq!(dict.first("entity_src_gen", "pdbx_gene_src_scientific_name"), Some("GALLUS GALLUS"));
        assert_eq!(dict.first("entity_src_gen", "pdbx_host_org_scientific_name"), Some("ESCHERICHIA COLI"));
        assert_eq!(dict.first("atom_site", "label_entity_id"), Some("1"));
    }
}
