use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Malformed operator expression '{expression}': {reason}")]
    MalformedExpression { expression: String, reason: String },

    #[error("Operator '{id}' is not defined in pdbx_struct_oper_list")]
    UnresolvedOperator { id: String },

    #[error("No assembly with id '{id}'")]
    UnknownAssembly { id: String },
}

/// A non-fatal fault found while building a structure.
///
/// The builder never aborts on these; it records them and carries on so that partial files
/// still load.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StructureWarning {
    #[error("PDB record on line {line} is {length} characters long; record skipped")]
    OverlongRecord { line: usize, length: usize },

    #[error("atom_site row {row} lacks a usable '{field}'; atom skipped")]
    MissingRequiredField { row: usize, field: &'static str },

    #[error("Residue {residue} has several '{atom}' atoms after altloc resolution; keeping the lowest alternate location")]
    AmbiguousAltloc { residue: String, atom: String },

    #[error("Bond between atoms {first} and {second} is {length:.2} Å long")]
    LongBond { first: i64, second: i64, length: f64 },

    #[error("Secondary structure span on {asym} names unknown residue {residue}")]
    UnknownSecondaryStructureResidue { asym: String, residue: String },

    #[error("Assembly {id} rejected: {reason}")]
    AssemblyRejected { id: String, reason: AssemblyError },

    #[error("Assembly {assembly} refers to asym {asym}, which is not in the model")]
    UnknownAsym { assembly: String, asym: String },
}

/// Collects warnings raised during one build.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    warnings: Vec<StructureWarning>,
}

impl Diagnostics {
    /// Logs the warning and keeps it.
    pub(crate) fn raise(&mut self, warning: StructureWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Keeps a warning that was already logged where it arose.
    pub(crate) fn record(&mut self, warning: StructureWarning) {
        self.warnings.push(warning);
    }

    pub(crate) fn into_inner(self) -> Vec<StructureWarning> {
        self.warnings
    }
}
