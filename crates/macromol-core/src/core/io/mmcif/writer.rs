use crate::core::io::connections;
use crate::core::io::dict::{Category, IntermediateDict, is_null};
use std::fmt::Write;

const RESERVED_PREFIXES: [&str; 5] = ["data_", "loop_", "save_", "global_", "stop_"];

/// Quotes a value so that it lexes back as a single token.
pub fn quote(value: &str) -> String {
    if is_null(value) {
        return value.to_string();
    }
    if value.is_empty() {
        return "''".to_string();
    }
    if value.contains('\n') {
        return text_field(value);
    }
    let lower = value.to_ascii_lowercase();
    let needs_quotes = value.chars().any(char::is_whitespace)
        || value.starts_with(['_', '#', '$', '\'', '"', '[', ']', ';'])
        || RESERVED_PREFIXES.iter().any(|p| lower.starts_with(p));
    if !needs_quotes {
        return value.to_string();
    }
    if !closes_early(value, '\'') {
        format!("'{}'", value)
    } else if !closes_early(value, '"') {
        format!("\"{}\"", value)
    } else {
        text_field(value)
    }
}

/// Whether `quote` inside the value would end a quoted token before the value does.
fn closes_early(value: &str, quote: char) -> bool {
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c == quote && chars.peek().is_none_or(|next| next.is_whitespace() || *next == '#') {
            return true;
        }
    }
    false
}

fn text_field(value: &str) -> String {
    format!(";{}\n;", value)
}

fn is_text_field(value: &str) -> bool {
    value.starts_with(';')
}

fn write_pairs(out: &mut String, name: &str, category: &Category) {
    let Some(row) = category.row(0) else {
        return;
    };
    let width = category.keys().iter().map(|k| k.len()).max().unwrap_or(0) + name.len() + 3;
    for (key, value) in category.keys().iter().zip(row.values()) {
        let tag = format!("_{}.{}", name, key);
        let value = quote(value);
        if is_text_field(&value) {
            let _ = writeln!(out, "{}\n{}", tag, value);
        } else {
            let _ = writeln!(out, "{:<width$}{}", tag, value, width = width);
        }
    }
}

fn write_loop(out: &mut String, name: &str, category: &Category) {
    out.push_str("loop_\n");
    for key in category.keys() {
        let _ = writeln!(out, "_{}.{}", name, key);
    }
    let quoted: Vec<Vec<String>> = category
        .raw_rows()
        .iter()
        .map(|row| row.iter().map(|v| quote(v)).collect())
        .collect();
    let mut widths = vec![0; category.keys().len()];
    for row in &quoted {
        for (width, value) in widths.iter_mut().zip(row) {
            if !is_text_field(value) {
                *width = (*width).max(value.len());
            }
        }
    }
    for row in &quoted {
        let mut line = String::new();
        for (value, width) in row.iter().zip(&widths) {
            if is_text_field(value) {
                if !line.is_empty() {
                    out.push_str(line.trim_end());
                    out.push('\n');
                    line.clear();
                }
                out.push_str(value);
                out.push('\n');
            } else {
                if !line.is_empty() {
                    line.push(' ');
                }
                let _ = write!(line, "{:<width$}", value, width = width);
            }
        }
        if !line.is_empty() {
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }
}

fn write_category(out: &mut String, name: &str, category: &Category) {
    if category.len() == 1 && !category.is_looped() {
        write_pairs(out, name, category);
    } else {
        write_loop(out, name, category);
    }
    out.push_str("#\n");
}

/// Renders the dictionary as one mmCIF data block.
///
/// Single-row categories that were not read as loops become key-value pairs; everything else
/// becomes a `loop_`. The PDB-only `conect` category is not written itself; when there is no
/// `struct_conn`, its pairs are written as one just before `atom_site`.
pub fn dict_to_string(dict: &IntermediateDict) -> String {
    let mut out = format!("data_{}\n#\n", dict.name());
    let mut derived = if dict.contains("struct_conn") {
        None
    } else {
        connections::struct_conn_from_conect(dict)
    };
    for (name, category) in dict.categories() {
        if name == "atom_site" {
            if let Some(conn) = derived.take() {
                write_category(&mut out, "struct_conn", &conn);
            }
        }
        if name == "conect" || category.is_empty() || category.keys().is_empty() {
            continue;
        }
        write_category(&mut out, name, category);
    }
    out
}
