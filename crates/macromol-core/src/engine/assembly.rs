use super::error::{AssemblyError, Diagnostics, StructureWarning};
use crate::core::io::dict::IntermediateDict;
use crate::core::models::assembly::{Assembly, Transformation};
use nalgebra::Matrix4;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

fn malformed(expression: &str, reason: impl Into<String>) -> AssemblyError {
    AssemblyError::MalformedExpression {
        expression: expression.to_string(),
        reason: reason.into(),
    }
}

/// Parses an `oper_expression` such as `(1-3)(5,6)` into ordered groups of operator ids.
///
/// A bare expression like `1,2,5-7` is read as a single group. Ranges are inclusive and must
/// not run backwards.
pub fn parse_operator_expression(expression: &str) -> Result<Vec<Vec<String>>, AssemblyError> {
    let compact: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(malformed(expression, "empty expression"));
    }
    let wrapped = if compact.starts_with('(') {
        compact
    } else {
        format!("({})", compact)
    };

    let mut groups = Vec::new();
    let mut rest = wrapped.as_str();
    while !rest.is_empty() {
        let Some(body) = rest.strip_prefix('(') else {
            return Err(malformed(expression, format!("expected '(' before '{}'", rest)));
        };
        let Some(close) = body.find(')') else {
            return Err(malformed(expression, "unbalanced parenthesis"));
        };
        let content = &body[..close];
        if content.contains('(') {
            return Err(malformed(expression, "nested parenthesis"));
        }
        groups.push(parse_group(expression, content)?);
        rest = &body[close + 1..];
    }
    Ok(groups)
}

fn parse_int(expression: &str, text: &str) -> Result<u64, AssemblyError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(expression, format!("'{}' is not an operator number", text)));
    }
    text.parse()
        .map_err(|_| malformed(expression, format!("'{}' is out of range", text)))
}

fn parse_group(expression: &str, content: &str) -> Result<Vec<String>, AssemblyError> {
    if content.is_empty() {
        return Err(malformed(expression, "empty group"));
    }
    let mut ids = Vec::new();
    for element in content.split(',') {
        match element.split_once('-') {
            Some((start, end)) => {
                let start = parse_int(expression, start)?;
                let end = parse_int(expression, end)?;
                if start > end {
                    return Err(malformed(expression, format!("range {}-{} runs backwards", start, end)));
                }
                ids.extend((start..=end).map(|id| id.to_string()));
            }
            None => ids.push(parse_int(expression, element)?.to_string()),
        }
    }
    Ok(ids)
}

/// The 4×4 homogeneous matrices of `pdbx_struct_oper_list`, keyed by operator id.
#[derive(Debug, Clone, Default)]
pub struct OperatorTable {
    operators: HashMap<String, Matrix4<f64>>,
}

impl OperatorTable {
    pub fn from_dict(dict: &IntermediateDict) -> Self {
        let mut operators = HashMap::new();
        for row in dict.rows("pdbx_struct_oper_list") {
            let Some(id) = row.defined("id") else {
                continue;
            };
            let mut matrix = Matrix4::identity();
            for r in 0..3 {
                for c in 0..3 {
                    if let Some(value) = row.parse::<f64>(&format!("matrix[{}][{}]", r + 1, c + 1)) {
                        matrix[(r, c)] = value;
                    }
                }
                matrix[(r, 3)] = row.parse::<f64>(&format!("vector[{}]", r + 1)).unwrap_or(0.0);
            }
            operators.insert(id.to_string(), matrix);
        }
        Self { operators }
    }

    pub fn insert(&mut self, id: impl Into<String>, matrix: Matrix4<f64>) {
        self.operators.insert(id.into(), matrix);
    }

    pub fn get(&self, id: &str) -> Option<&Matrix4<f64>> {
        self.operators.get(id)
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

/// Folds groups from the left so the result holds `A·B` for every `A` of the first group and
/// `B` of the second, in row-major order.
pub fn combine_operator_groups(groups: Vec<Vec<Matrix4<f64>>>) -> Vec<Matrix4<f64>> {
    let mut groups = groups.into_iter();
    let Some(first) = groups.next() else {
        return Vec::new();
    };
    groups.fold(first, |left, right| {
        left.iter()
            .flat_map(|a| right.iter().map(move |b| a * b))
            .collect()
    })
}

/// Resolves an expression against the operator table to its list of combined matrices.
pub fn expression_matrices(
    expression: &str,
    table: &OperatorTable,
) -> Result<Vec<Matrix4<f64>>, AssemblyError> {
    let groups = parse_operator_expression(expression)?
        .into_iter()
        .map(|ids| {
            ids.into_iter()
                .map(|id| {
                    table
                        .get(&id)
                        .copied()
                        .ok_or(AssemblyError::UnresolvedOperator { id })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(combine_operator_groups(groups))
}

fn property(dict: &IntermediateDict, assembly_id: &str, kind: &str) -> Option<f64> {
    dict.rows("pdbx_struct_assembly_prop")
        .filter(|row| row.get("biol_id") == Some(assembly_id) && row.get("type") == Some(kind))
        .find_map(|row| row.defined("value")?.split('/').next()?.trim().parse().ok())
}

fn assembly_ids(dict: &IntermediateDict) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    let declared = dict.rows("pdbx_struct_assembly").filter_map(|r| r.defined("id"));
    let generated = dict
        .rows("pdbx_struct_assembly_gen")
        .filter_map(|r| r.defined("assembly_id"));
    for id in declared.chain(generated) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

/// Materialises every biological assembly declared in the dictionary.
///
/// An assembly whose expression is malformed or names an undefined operator is dropped with an
/// [`StructureWarning::AssemblyRejected`]; the others are still returned. Asym ids that are
/// not in `known_asyms` are removed from the chain lists.
pub fn assemblies_from_dict(
    dict: &IntermediateDict,
    known_asyms: &HashSet<String>,
) -> (Vec<Assembly>, Vec<StructureWarning>) {
    let table = OperatorTable::from_dict(dict);
    let mut diagnostics = Diagnostics::default();
    let mut assemblies = Vec::new();

    'assemblies: for id in assembly_ids(dict) {
        let software = dict
            .rows("pdbx_struct_assembly")
            .find(|row| row.get("id") == Some(id.as_str()))
            .and_then(|row| row.defined("method_details").map(String::from));
        let mut transformations = Vec::new();

        for row in dict
            .rows("pdbx_struct_assembly_gen")
            .filter(|row| row.get("assembly_id") == Some(id.as_str()))
        {
            let expression = row.get("oper_expression").unwrap_or_default();
            let matrices = match expression_matrices(expression, &table) {
                Ok(matrices) => matrices,
                Err(reason) => {
                    diagnostics.raise(StructureWarning::AssemblyRejected {
                        id: id.clone(),
                        reason,
                    });
                    continue 'assemblies;
                }
            };
            let mut chains = Vec::new();
            for asym in row
                .defined("asym_id_list")
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
            {
                if known_asyms.contains(asym) {
                    chains.push(asym.to_string());
                } else {
                    diagnostics.raise(StructureWarning::UnknownAsym {
                        assembly: id.clone(),
                        asym: asym.to_string(),
                    });
                }
            }
            trace!(assembly = %id, expression, copies = matrices.len(), "Expanded assembly generator");
            transformations.extend(
                matrices
                    .iter()
                    .map(|m| Transformation::from_homogeneous(m, chains.clone())),
            );
        }

        assemblies.push(Assembly {
            delta_energy: property(dict, &id, "MORE"),
            surface_area: property(dict, &id, "SSA (A^2)"),
            buried_surface_area: property(dict, &id, "ABSA (A^2)"),
            id,
            software,
            transformations,
        });
    }

    debug!(assemblies = assemblies.len(), "Materialised biological assemblies");
    (assemblies, diagnostics.into_inner())
}
