use super::CifError;
use super::lexer::{Lexer, Token};
use crate::core::io::dict::{Category, IntermediateDict, UNKNOWN};
use tracing::{debug, trace, warn};

/// Splits `_category.key` into its two halves. A tag without a `.` is a category with an
/// empty key.
pub fn split_tag(tag: &str) -> (&str, &str) {
    let tag = tag.strip_prefix('_').unwrap_or(tag);
    tag.split_once('.').unwrap_or((tag, ""))
}

struct TokenStream<'a> {
    lexer: Lexer<'a>,
    pending: Option<Token>,
}

impl TokenStream<'_> {
    fn next(&mut self) -> Result<Token, CifError> {
        match self.pending.take() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        }
    }

    fn push_back(&mut self, token: Token) {
        self.pending = Some(token);
    }
}

/// Parses the first data block of an mmCIF document.
///
/// Later data blocks are skipped. Only lexical faults are errors; structural oddities such as
/// a tag with no value or a short final loop row are padded with `?`.
pub fn parse(text: &str) -> Result<IntermediateDict, CifError> {
    let mut tokens = TokenStream {
        lexer: Lexer::new(text),
        pending: None,
    };
    let mut dict = IntermediateDict::default();
    let mut seen_block = false;

    loop {
        match tokens.next()? {
            Token::Eof => break,
            Token::DataBlock(name) => {
                if seen_block {
                    debug!(block = %name, line = tokens.lexer.line(), "Skipping additional data block");
                    break;
                }
                seen_block = true;
                dict.set_name(name);
            }
            Token::Loop => read_loop(&mut tokens, &mut dict)?,
            Token::Tag(tag) => {
                let value = match tokens.next()? {
                    Token::Value(value) => value,
                    other => {
                        tokens.push_back(other);
                        UNKNOWN.to_string()
                    }
                };
                let (category, key) = split_tag(&tag);
                let target = dict.entry(category);
                if target.is_empty() {
                    target.push_pairs([(key, value)]);
                } else {
                    target.set(0, key, value);
                }
            }
            Token::Value(value) => trace!(value = %value, "Ignoring value outside of a tag or loop"),
            Token::Break => {}
        }
    }

    debug!(name = dict.name(), categories = dict.len(), "Parsed mmCIF data block");
    Ok(dict)
}

fn read_loop(tokens: &mut TokenStream<'_>, dict: &mut IntermediateDict) -> Result<(), CifError> {
    let mut tags = Vec::new();
    loop {
        match tokens.next()? {
            Token::Tag(tag) => tags.push(tag),
            Token::Break => {}
            other => {
                tokens.push_back(other);
                break;
            }
        }
    }

    let mut values = Vec::new();
    loop {
        match tokens.next()? {
            Token::Value(value) => values.push(value),
            Token::Break if values.is_empty() => {}
            Token::Break => break,
            other => {
                tokens.push_back(other);
                break;
            }
        }
    }

    let Some(first) = tags.first() else {
        return Ok(());
    };
    let category_name = split_tag(first).0.to_string();
    let keys: Vec<&str> = tags.iter().map(|t| split_tag(t).1).collect();
    let mut category = Category::looped(keys.iter().copied());
    let width = keys.len();
    if values.len() % width != 0 {
        warn!(
            category = %category_name,
            values = values.len(),
            columns = width,
            "Loop ends with an incomplete row; padding with '?'"
        );
    }
    let mut values = values.into_iter().peekable();
    while values.peek().is_some() {
        category.push_row(values.by_ref().take(width).collect());
    }
    trace!(category = %category_name, rows = category.len(), "Read loop");
    dict.insert(&category_name, category);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_pairs_share_one_row() {
        let dict = parse("data_1ABC\n_entry.id 1ABC\n_struct.title 'A title'\n_struct.pdbx_descriptor ?\n").unwrap();
        assert_eq!(dict.name(), "1ABC");
        assert_eq!(dict.first("entry", "id"), Some("1ABC"));
        let category = dict.category("struct").unwrap();
        assert_eq!(category.len(), 1);
        assert!(!category.is_looped());
        assert_eq!(dict.first("struct", "title"), Some("A title"));
        assert_eq!(dict.first("struct", "pdbx_descriptor"), Some("?"));
    }

    #[test]
    fn loops_fill_rows_column_major() {
        let dict = parse("data_x\nloop_\n_atom_site.id\n_atom_site.type_symbol\n1 N\n2 C 3\nO\n").unwrap();
        let category = dict.category("atom_site").unwrap();
        assert!(category.is_looped());
        let rows: Vec<(&str, &str)> = category
            .rows()
            .map(|r| (r.get("id").unwrap(), r.get("type_symbol").unwrap()))
            .collect();
        assert_eq!(rows, vec![("1", "N"), ("2", "C"), ("3", "O")]);
    }

    #[test]
    fn blank_line_ends_a_loop_body() {
        let dict = parse("data_x\nloop_\n_a.x\n1\n2\n\n3\n_b.y 4\n").unwrap();
        assert_eq!(dict.category("a").unwrap().len(), 2);
        assert_eq!(dict.first("b", "y"), Some("4"));
    }

    #[test]
    fn short_final_row_is_padded() {
        let dict = parse("data_x\nloop_\n_a.x\n_a.y\n1 2\n3\n").unwrap();
        let row = dict.category("a").unwrap().row(1).unwrap();
        assert_eq!(row.get("x"), Some("3"));
        assert_eq!(row.get("y"), Some("?"));
    }

    #[test]
    fn tag_without_value_defaults_to_unknown() {
        let dict = parse("data_x\n_a.x\n_a.y 2\n").unwrap();
        assert_eq!(dict.first("a", "x"), Some("?"));
        assert_eq!(dict.first("a", "y"), Some("2"));
    }

    #[test]
    fn only_the_first_data_block_is_read() {
        let dict = parse("data_first\n_a.x 1\ndata_second\n_b.y 2\n").unwrap();
        assert_eq!(dict.name(), "first");
        assert!(!dict.contains("b"));
    }

    #[test]
    fn tags_split_on_first_dot() {
        assert_eq!(split_tag("_atom_site.Cartn_x"), ("atom_site", "Cartn_x"));
        assert_eq!(split_tag("_pdbx.a.b"), ("pdbx", "a.b"));
        assert_eq!(split_tag("_lonely"), ("lonely", ""));
    }
}
