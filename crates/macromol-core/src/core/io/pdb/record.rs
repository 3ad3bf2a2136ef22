use super::PdbError;
use std::collections::HashMap;
use tracing::warn;

/// Width of a PDB record.
pub const RECORD_WIDTH: usize = 80;

/// Punctuation whose following space may be condensed when merging continuation lines.
const MERGE_PUNCTUATION: &[char] = &['-', ':', ',', ';'];

/// A column slice promoted to the narrowest fitting type.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl RecordValue {
    fn promote(text: &str) -> Self {
        if let Ok(value) = text.parse::<i64>() {
            return Self::Int(value);
        }
        if text.matches('.').count() == 1 {
            if let Ok(value) = text.parse::<f64>() {
                return Self::Float(value);
            }
        }
        Self::Str(text.to_string())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Floats, and integers widened to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Str(_) => None,
        }
    }
}

/// A single 80-column line of a PDB file.
///
/// The stored text is always exactly [`RECORD_WIDTH`] ASCII characters, right-padded with
/// spaces, so every column slice is well-defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    text: String,
    line: usize,
}

impl Record {
    /// Builds a record from one line of text. Trailing whitespace is not counted.
    ///
    /// # Errors
    ///
    /// Returns [`PdbError::OverlongRecord`] if the line is wider than 80 characters.
    pub fn new(line: usize, text: &str) -> Result<Self, PdbError> {
        let trimmed: String = text.trim_end().chars().filter(|c| c.is_ascii()).collect();
        if trimmed.len() > RECORD_WIDTH {
            return Err(PdbError::OverlongRecord {
                line,
                length: trimmed.len(),
            });
        }
        Ok(Self {
            text: format!("{:<width$}", trimmed, width = RECORD_WIDTH),
            line,
        })
    }

    /// 1-based line number in the source file.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The padded 80-character text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Record name from columns [0, 6), without padding.
    pub fn name(&self) -> &str {
        self.text[0..6].trim_end()
    }

    /// Columns [6, 80).
    pub fn content(&self) -> &str {
        &self.text[6..]
    }

    fn slice(&self, start: usize, end: usize) -> &str {
        let end = end.min(RECORD_WIDTH);
        let start = start.min(end);
        &self.text[start..end]
    }

    /// The stripped text of a column range; `None` if it is blank.
    pub fn as_str(&self, start: usize, end: usize) -> Option<&str> {
        let value = self.slice(start, end).trim();
        (!value.is_empty()).then_some(value)
    }

    /// The stripped text of a column range promoted to an integer, float or string.
    pub fn get(&self, start: usize, end: usize) -> Option<RecordValue> {
        self.as_str(start, end).map(RecordValue::promote)
    }

    pub fn int(&self, start: usize, end: usize) -> Option<i64> {
        self.as_str(start, end)?.parse().ok()
    }

    pub fn float(&self, start: usize, end: usize) -> Option<f64> {
        self.get(start, end)?.as_float()
    }

    /// The raw text from `start` to the end of the record, trailing spaces removed.
    pub fn tail(&self, start: usize) -> &str {
        self.slice(start, RECORD_WIDTH).trim_end()
    }
}

/// Characters kept by ingestion: printable ASCII and newlines.
pub fn sanitise(text: &str) -> String {
    text.chars()
        .filter(|&c| c == '\n' || (' '..='~').contains(&c))
        .collect()
}

/// A line that could not become a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: usize,
    pub length: usize,
}

/// All records of a file, in order, indexed by record name.
#[derive(Debug, Clone, Default)]
pub struct RecordStream {
    records: Vec<Record>,
    index: HashMap<String, Vec<usize>>,
    skipped: Vec<SkippedLine>,
}

impl RecordStream {
    /// Splits sanitised text into records, skipping blank lines.
    ///
    /// Lines wider than 80 characters are left out with a warning and listed in
    /// [`skipped`](Self::skipped); the rest of the file still loads.
    pub fn parse(text: &str) -> Self {
        let text = sanitise(text);
        let mut stream = Self::default();
        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match Record::new(number + 1, line) {
                Ok(record) => stream.push(record),
                Err(PdbError::OverlongRecord { line, length }) => {
                    warn!(line, length, "Skipping overlong PDB record");
                    stream.skipped.push(SkippedLine { line, length });
                }
                Err(err) => warn!(line = number + 1, %err, "Skipping unreadable PDB record"),
            }
        }
        stream
    }

    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    pub fn push(&mut self, record: Record) {
        self.index
            .entry(record.name().to_string())
            .or_default()
            .push(self.records.len());
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Records with the given name, in file order.
    pub fn named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Record> + use<'a> {
        self.index
            .get(name)
            .into_iter()
            .flatten()
            .map(|&i| &self.records[i])
    }

    pub fn first(&self, name: &str) -> Option<&Record> {
        self.named(name).next()
    }

    /// REMARK records of one remark number, excluding the bare header line.
    pub fn remarks(&self, number: u32) -> Vec<&Record> {
        self.named("REMARK")
            .filter(|r| r.int(7, 10) == Some(i64::from(number)))
            .filter(|r| r.as_str(11, RECORD_WIDTH).is_some())
            .collect()
    }
}

/// Joins the text of several records into one string.
///
/// Each record's text from column `start` is trimmed and joined with `separator`. Then, for
/// each merge punctuation character not listed in `preserve`, one space following it is
/// removed, so words hyphenated across lines come back together.
pub fn merge_records(records: &[&Record], start: usize, separator: &str, preserve: &str) -> String {
    let mut merged = records
        .iter()
        .map(|r| r.tail(start).trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator);
    for &punctuation in MERGE_PUNCTUATION {
        if !preserve.contains(punctuation) {
            merged = merged.replace(&format!("{} ", punctuation), &punctuation.to_string());
        }
    }
    merged
}

/// A value from a `TOKEN: VALUE;` block.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Bool(bool),
    Int(i64),
    List(Vec<String>),
    Str(String),
}

impl TokenValue {
    fn from_raw(token: &str, raw: &str) -> Self {
        let raw = raw.trim();
        if token == "CHAIN" || token == "SYNONYM" {
            return Self::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            );
        }
        match raw {
            "YES" => Self::Bool(true),
            "NO" => Self::Bool(false),
            _ if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => {
                raw.parse().map_or_else(|_| Self::Str(raw.to_string()), Self::Int)
            }
            _ => Self::Str(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// One `MOL_ID` group of a COMPND or SOURCE section.
pub type TokenBlock = Vec<(String, TokenValue)>;

fn is_token(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
        && candidate.bytes().next().is_some_and(|b| b.is_ascii_uppercase())
}

/// Splits merged COMPND/SOURCE text into token blocks.
///
/// A `;` segment that does not start with a recognisable `TOKEN:` is appended to the
/// previous value, so stray semicolons inside values survive.
pub fn parse_token_blocks(text: &str) -> Vec<TokenBlock> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for segment in text.split(';') {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.split_once(':') {
            Some((token, value)) if is_token(token.trim()) => {
                pairs.push((token.trim().to_string(), value.trim().to_string()));
            }
            _ => match pairs.last_mut() {
                Some((_, value)) => {
                    value.push_str("; ");
                    value.push_str(trimmed);
                }
                None => continue,
            },
        }
    }

    let mut blocks: Vec<TokenBlock> = Vec::new();
    for (token, raw) in pairs {
        if token == "MOL_ID" || blocks.is_empty() {
            blocks.push(Vec::new());
        }
        let value = TokenValue::from_raw(&token, &raw);
        if let Some(block) = blocks.last_mut() {
            block.push((token, value));
        }
    }
    blocks
}

/// Looks up a token in a block.
pub fn token<'a>(block: &'a TokenBlock, name: &str) -> Option<&'a TokenValue> {
    block.iter().find(|(t, _)| t == name).map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ATOM_LINE: &str =
        "ATOM      1  N   GLY A  13      12.681  37.302 -25.211  1.00 15.56           N";

    #[test]
    fn record_is_padded_and_sliced_by_columns() {
        let record = Record::new(1, "END").unwrap();
        assert_eq!(record.text().len(), RECORD_WIDTH);
        assert_eq!(record.name(), "END");
        assert!(record.as_str(6, 80).is_none());

        let atom = Record::new(1, ATOM_LINE).unwrap();
        assert_eq!(atom.name(), "ATOM");
        assert_eq!(atom.int(6, 11), Some(1));
        assert_eq!(atom.as_str(12, 16), Some("N"));
        assert_eq!(atom.float(30, 38), Some(12.681));
        assert_eq!(atom.as_str(76, 78), Some("N"));
    }

    #[test]
    fn column_values_are_promoted_to_the_narrowest_type() {
        let record = Record::new(1, "X     12  1.50  1.2.3  ABC").unwrap();
        assert_eq!(record.get(6, 8), Some(RecordValue::Int(12)));
        assert_eq!(record.get(9, 14), Some(RecordValue::Float(1.5)));
        assert_eq!(record.get(15, 21), Some(RecordValue::Str("1.2.3".into())));
        assert_eq!(record.get(22, 26), Some(RecordValue::Str("ABC".into())));
        assert_eq!(record.as_str(9, 14), Some("1.50"));
    }

    #[test]
    fn overlong_records_are_rejected() {
        let long = format!("{}X", "A".repeat(80));
        assert!(matches!(
            Record::new(7, &long),
            Err(PdbError::OverlongRecord { line: 7, length: 81 })
        ));
        let padded = format!("{}      ", "A".repeat(80));
        assert!(Record::new(1, &padded).is_ok());
    }

    #[test]
    fn sanitise_drops_non_printable_characters() {
        assert_eq!(sanitise("AB\u{7}C\r\nD\u{e9}"), "ABC\nD");
    }

    #[test]
    fn stream_indexes_records_by_name_and_skips_blank_lines() {
        let text = "HEADER    TEST\n\nREMARK   2\nREMARK   2 RESOLUTION.    1.90 ANGSTROMS.\nATOM      1\nATOM      2\n";
        let stream = RecordStream::parse(text);
        assert_eq!(stream.len(), 5);
        assert_eq!(stream.named("ATOM").count(), 2);
        assert_eq!(stream.remarks(2).len(), 1);
        assert_eq!(stream.first("HEADER").unwrap().line(), 1);
        assert_eq!(stream.named("SEQRES").count(), 0);
    }

    #[test]
    fn overlong_lines_are_skipped_and_listed() {
        let text = format!("REMARK 999 {}\nATOM      1\nATOM      2\n", "X".repeat(75));
        let stream = RecordStream::parse(&text);
        assert_eq!(stream.named("ATOM").count(), 2);
        assert_eq!(stream.named("REMARK").count(), 0);
        assert_eq!(stream.skipped(), &[SkippedLine { line: 1, length: 86 }]);
    }

    #[test]
    fn merge_condenses_spaces_after_unpreserved_punctuation() {
        let r1 = Record::new(1, "TITLE     CRYSTAL STRUCTURE OF ALPHA-").unwrap();
        let r2 = Record::new(2, "TITLE    2 BETA, GAMMA").unwrap();
        let records = [&r1, &r2];
        assert_eq!(merge_records(&records, 10, " ", ",;:"), "CRYSTAL STRUCTURE OF ALPHA-BETA, GAMMA");
        assert_eq!(merge_records(&records, 10, " ", ",;:-"), "CRYSTAL STRUCTURE OF ALPHA- BETA, GAMMA");
        assert_eq!(merge_records(&records, 10, " ", ""), "CRYSTAL STRUCTURE OF ALPHA-BETA,GAMMA");
    }

    #[test]
    fn token_blocks_split_on_mol_id_and_type_values() {
        let text = "MOL_ID: 1; MOLECULE: LYSOZYME; CHAIN: A, B; ENGINEERED: YES; MOL_ID: 2; MOLECULE: INHIBITOR";
        let blocks = parse_token_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(token(&blocks[0], "MOL_ID"), Some(&TokenValue::Int(1)));
        assert_eq!(token(&blocks[0], "MOLECULE").and_then(TokenValue::as_str), Some("LYSOZYME"));
        assert_eq!(
            token(&blocks[0], "CHAIN").and_then(TokenValue::as_list),
            Some(&["A".to_string(), "B".to_string()][..])
        );
        assert_eq!(token(&blocks[0], "ENGINEERED"), Some(&TokenValue::Bool(true)));
        assert_eq!(token(&blocks[1], "MOLECULE").and_then(TokenValue::as_str), Some("INHIBITOR"));
    }

    #[test]
    fn stray_semicolons_are_folded_back_into_the_value() {
        let blocks = parse_token_blocks("MOL_ID: 1; MOLECULE: PROTEIN X; FRAGMENT 2; CHAIN: A");
        assert_eq!(
            token(&blocks[0], "MOLECULE").and_then(TokenValue::as_str),
            Some("PROTEIN X; FRAGMENT 2")
        );
    }
}
