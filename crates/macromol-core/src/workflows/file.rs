use crate::core::io::dict::IntermediateDict;
use crate::core::io::mmcif::{self, CifError, CifFile};
use crate::core::io::pdb::record::RecordStream;
use crate::core::io::pdb::{self, PdbError, PdbFile};
use crate::core::io::traits::StructureFormat;
use crate::core::models::assembly::Assembly;
use crate::core::models::model::Model;
use crate::core::topology::registry::{TopologyLoadError, TopologyRegistry};
use crate::engine::assembly::assemblies_from_dict;
use crate::engine::builder::build_models;
use crate::engine::config::BuildOptions;
use crate::engine::error::{AssemblyError, StructureWarning};
use crate::engine::serializer;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, instrument};

const PDB_RECORD_NAMES: [&str; 17] = [
    "HEADER", "TITLE", "COMPND", "SOURCE", "KEYWDS", "EXPDTA", "AUTHOR", "REMARK", "SEQRES",
    "HELIX", "SHEET", "CRYST1", "MODEL", "ATOM", "HETATM", "CONECT", "END",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Pdb,
    Mmcif,
}

impl FileFormat {
    /// The format implied by a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()?.to_str()?.parse().ok()
    }

    /// Guesses the format from the first meaningful line.
    pub fn sniff(text: &str) -> Option<Self> {
        let line = text
            .lines()
            .map(str::trim_end)
            .find(|l| !l.trim().is_empty() && !l.starts_with('#'))?;
        let lower = line.to_ascii_lowercase();
        if lower.starts_with("data_") || lower.starts_with("loop_") || line.starts_with('_') {
            return Some(Self::Mmcif);
        }
        let name = line.get(..6).unwrap_or(line).trim_end();
        PDB_RECORD_NAMES.contains(&name).then_some(Self::Pdb)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdb => "pdb",
            Self::Mmcif => "cif",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown structure format '{0}'")]
pub struct ParseFileFormatError(pub String);

impl FromStr for FileFormat {
    type Err = ParseFileFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdb" | "ent" => Ok(Self::Pdb),
            "cif" | "mmcif" => Ok(Self::Mmcif),
            _ => Err(ParseFileFormatError(s.to_string())),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdb => write!(f, "PDB"),
            Self::Mmcif => write!(f, "mmCIF"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FileError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("PDB error: {0}")]
    Pdb(#[from] PdbError),
    #[error("mmCIF error: {0}")]
    Cif(#[from] CifError),
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyLoadError),
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),
    #[error("Cannot tell the structure format of '{name}'")]
    UnknownFormat { name: String },
}

/// A residue the file declares but has no coordinates for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingResidue {
    pub model: i64,
    pub asym_id: String,
    pub auth_asym_id: String,
    pub name: String,
    pub number: Option<i64>,
    pub insertion_code: String,
}

/// A parsed structure file: its dictionary, its models and its assemblies.
#[derive(Debug, Clone)]
pub struct File {
    dict: IntermediateDict,
    format: FileFormat,
    models: Vec<Model>,
    assemblies: Vec<Assembly>,
    warnings: Vec<StructureWarning>,
}

impl File {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FileError> {
        Self::open_with_options(path, &BuildOptions::default())
    }

    /// Reads a file, taking the format from its extension or, failing that, its content.
    pub fn open_with_options(path: impl AsRef<Path>, options: &BuildOptions) -> Result<Self, FileError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| FileError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        let format = FileFormat::from_path(path)
            .or_else(|| FileFormat::sniff(&text))
            .ok_or_else(|| FileError::UnknownFormat {
                name: path.display().to_string(),
            })?;
        Self::parse_with_options(&text, format, options)
    }

    pub fn parse(text: &str, format: FileFormat) -> Result<Self, FileError> {
        Self::parse_with_options(text, format, &BuildOptions::default())
    }

    #[instrument(skip_all, name = "parse_file", fields(format = %format))]
    pub fn parse_with_options(text: &str, format: FileFormat, options: &BuildOptions) -> Result<Self, FileError> {
        let mut skipped = Vec::new();
        let dict = match format {
            FileFormat::Pdb => {
                let stream = RecordStream::parse(text);
                skipped.extend(
                    stream
                        .skipped()
                        .iter()
                        .map(|s| StructureWarning::OverlongRecord { line: s.line, length: s.length }),
                );
                pdb::reader::records_to_dict(&stream)
            }
            FileFormat::Mmcif => CifFile::read_dict_from_str(text)?,
        };
        let topology = match &options.topology_path {
            Some(path) => TopologyRegistry::load(path)?,
            None => TopologyRegistry::standard()?,
        };
        let mut file = Self::from_dict(dict, format, options, &topology);
        skipped.append(&mut file.warnings);
        file.warnings = skipped;
        Ok(file)
    }

    /// Builds models and assemblies from an already parsed dictionary.
    pub fn from_dict(
        dict: IntermediateDict,
        format: FileFormat,
        options: &BuildOptions,
        topology: &TopologyRegistry,
    ) -> Self {
        let output = build_models(&dict, options, topology);
        let mut warnings = output.warnings;
        let known: HashSet<String> = output
            .models
            .first()
            .map(|m| m.molecules().map(|(_, mol)| mol.asym_id().to_string()).collect())
            .unwrap_or_default();
        let (assemblies, assembly_warnings) = assemblies_from_dict(&dict, &known);
        warnings.extend(assembly_warnings);
        info!(
            code = dict.first_defined("entry", "id"),
            models = output.models.len(),
            assemblies = assemblies.len(),
            "Loaded structure"
        );
        Self {
            dict,
            format,
            models: output.models,
            assemblies,
            warnings,
        }
    }

    pub fn dict(&self) -> &IntermediateDict {
        &self.dict
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// First-row value of `category.key`; `?` and `.` come back verbatim.
    pub fn field(&self, category: &str, key: &str) -> Option<&str> {
        self.dict.first(category, key)
    }

    fn text(&self, category: &str, key: &str) -> Option<&str> {
        self.dict.first_defined(category, key)
    }

    fn number(&self, category: &str, key: &str) -> Option<f64> {
        self.text(category, key)?.parse().ok()
    }

    fn column(&self, category: &str, key: &str) -> Vec<&str> {
        self.dict
            .rows(category)
            .filter_map(|row| row.defined(key))
            .collect()
    }

    pub fn code(&self) -> Option<&str> {
        self.text("entry", "id")
    }

    pub fn title(&self) -> Option<&str> {
        self.text("struct", "title")
    }

    /// Deposition date as `YYYY-MM-DD`.
    pub fn deposition_date(&self) -> Option<&str> {
        self.text("pdbx_database_status", "recvd_initial_deposition_date")
    }

    pub fn classification(&self) -> Option<&str> {
        self.text("struct_keywords", "pdbx_keywords")
    }

    pub fn keywords(&self) -> Vec<&str> {
        self.text("struct_keywords", "text")
            .map(|text| text.split(',').map(str::trim).filter(|k| !k.is_empty()).collect())
            .unwrap_or_default()
    }

    pub fn authors(&self) -> Vec<&str> {
        self.column("audit_author", "name")
    }

    pub fn technique(&self) -> Option<&str> {
        self.text("exptl", "method")
    }

    pub fn resolution(&self) -> Option<f64> {
        self.number("refine", "ls_d_res_high")
    }

    pub fn r_value(&self) -> Option<f64> {
        self.number("refine", "ls_R_factor_R_work")
    }

    pub fn r_free(&self) -> Option<f64> {
        self.number("refine", "ls_R_factor_R_free")
    }

    pub fn source_organism(&self) -> Option<&str> {
        self.text("entity_src_gen", "pdbx_gene_src_scientific_name")
    }

    pub fn expression_system(&self) -> Option<&str> {
        self.text("entity_src_gen", "pdbx_host_org_scientific_name")
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn models_mut(&mut self) -> &mut [Model] {
        &mut self.models
    }

    /// The first model.
    pub fn model(&self) -> Option<&Model> {
        self.models.first()
    }

    pub fn model_mut(&mut self) -> Option<&mut Model> {
        self.models.first_mut()
    }

    /// Swaps in new models; the next save writes their atoms.
    pub fn replace_models(&mut self, models: Vec<Model>) {
        self.models = models;
    }

    pub fn assemblies(&self) -> &[Assembly] {
        &self.assemblies
    }

    pub fn assembly(&self, id: &str) -> Option<&Assembly> {
        self.assemblies.iter().find(|a| a.id == id)
    }

    pub fn warnings(&self) -> &[StructureWarning] {
        &self.warnings
    }

    pub fn missing_residues(&self) -> Vec<MissingResidue> {
        self.dict
            .rows("pdbx_unobs_or_zero_occ_residues")
            .filter(|row| row.get("polymer_flag").is_none_or(|f| f == "Y"))
            .map(|row| MissingResidue {
                model: row.parse("PDB_model_num").unwrap_or(1),
                asym_id: row.defined("label_asym_id").unwrap_or_default().to_string(),
                auth_asym_id: row.defined("auth_asym_id").unwrap_or_default().to_string(),
                name: row
                    .defined("label_comp_id")
                    .or_else(|| row.defined("auth_comp_id"))
                    .unwrap_or_default()
                    .to_string(),
                number: row.parse("auth_seq_id"),
                insertion_code: row.defined("PDB_ins_code").unwrap_or_default().to_string(),
            })
            .collect()
    }

    /// Builds the biological assembly `id` from the first model.
    ///
    /// Every transformation copies each molecule whose asym id it lists and moves the copy by
    /// its rotation and then its translation.
    pub fn generate_assembly(&self, id: &str) -> Result<Model, AssemblyError> {
        let assembly = self.assembly(id).ok_or_else(|| AssemblyError::UnknownAssembly {
            id: id.to_string(),
        })?;
        let Some(source) = self.model() else {
            return Ok(Model::new(1));
        };
        let mut model = Model::new(source.number());
        for transformation in &assembly.transformations {
            for chain in &transformation.chains {
                let originals: Vec<_> = source
                    .molecules()
                    .filter(|(_, m)| m.asym_id() == chain.as_str())
                    .map(|(mid, _)| mid)
                    .collect();
                for original in originals {
                    let Some(copy) = model.copy_molecule_from(source, original) else {
                        continue;
                    };
                    let atoms = model.molecule_atom_ids(copy);
                    model.transform(&atoms, &transformation.rotation);
                    model.translate(&atoms, &transformation.translation);
                }
            }
        }
        Ok(model)
    }

    /// The source dictionary with its coordinate categories rewritten from the models.
    pub fn to_dict(&self) -> IntermediateDict {
        let mut dict = self.dict.clone();
        serializer::write_models(&self.models, &mut dict);
        dict
    }

    pub fn to_pdb_string(&self) -> String {
        let mut text = pdb::writer::dict_to_lines(&self.to_dict()).join("\n");
        text.push('\n');
        text
    }

    pub fn to_mmcif_string(&self) -> String {
        mmcif::writer::dict_to_string(&self.to_dict())
    }

    /// Writes the file, choosing the format from the extension or keeping the source format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), FileError> {
        let path = path.as_ref();
        let dict = self.to_dict();
        match FileFormat::from_path(path).unwrap_or(self.format) {
            FileFormat::Pdb => PdbFile::write_dict_to_path(&dict, path)?,
            FileFormat::Mmcif => CifFile::write_dict_to_path(&dict, path)?,
        }
        info!(path = %path.display(), "Saved structure");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use tempfile::TempDir;

    const LYSOZYME: &str = "\
HEADER    HYDROLASE                               19-MAY-93   1LYZ
TITLE     THE STRUCTURE OF HEN EGG-WHITE LYSOZYME
KEYWDS    HYDROLASE, O-GLYCOSYL
EXPDTA    X-RAY DIFFRACTION
AUTHOR    A.N.OTHER, B.SMITH
REMARK   2 RESOLUTION.    1.90 ANGSTROMS.
REMARK 350 BIOMOLECULE: 1
REMARK 350 APPLY THE FOLLOWING TO CHAINS: A
REMARK 350   BIOMT1   1  1.000000  0.000000  0.000000        0.00000
REMARK 350   BIOMT2   1  0.000000  1.000000  0.000000        0.00000
REMARK 350   BIOMT3   1  0.000000  0.000000  1.000000        0.00000
REMARK 350   BIOMT1   2 -1.000000  0.000000  0.000000       10.00000
REMARK 350   BIOMT2   2  0.000000 -1.000000  0.000000        0.00000
REMARK 350   BIOMT3   2  0.000000  0.000000  1.000000        0.00000
REMARK 465 MISSING RESIDUES
REMARK 465 THE FOLLOWING RESIDUES WERE NOT LOCATED IN THE
REMARK 465 EXPERIMENT. (M=MODEL NUMBER; RES=RESIDUE NAME; C=CHAIN
REMARK 465 IDENTIFIER; SSSEQ=SEQUENCE NUMBER; I=INSERTION CODE.)
REMARK 465
REMARK 465   M RES C SSSEQI
REMARK 465     GLY A    13
ATOM      1  N   ALA A  12      10.000  10.000  10.000  1.00 10.00           N
ATOM      2  CA  ALA A  12      11.000  10.000  10.000  1.00 10.00           C
ATOM      3  N   SER A  14      14.000  10.000  10.000  1.00 10.00           N
ATOM      4  CA  SER A  14      15.000  10.000  10.000  1.00 10.00           C
TER       5      SER A  14
HETATM    6 ZN    ZN A 201       0.000   0.000   0.000  1.00 20.00          ZN
HETATM    7  O   HOH A 301       3.000   4.000  12.000  1.00 30.00           O
END
";

    #[test]
    fn header_metadata_is_exposed() {
        let file = File::parse(LYSOZYME, FileFormat::Pdb).unwrap();
        assert_eq!(file.code(), Some("1LYZ"));
        assert_eq!(file.classification(), Some("HYDROLASE"));
        assert_eq!(file.deposition_date(), Some("1993-05-19"));
        assert_eq!(file.title(), Some("THE STRUCTURE OF HEN EGG-WHITE LYSOZYME"));
        assert_eq!(file.keywords(), vec!["HYDROLASE", "O-GLYCOSYL"]);
        assert_eq!(file.authors(), vec!["A.N.OTHER", "B.SMITH"]);
        assert_eq!(file.technique(), Some("X-RAY DIFFRACTION"));
        assert_eq!(file.resolution(), Some(1.9));
        assert_eq!(file.field("entry", "id"), Some("1LYZ"));
        assert_eq!(file.field("entry", "missing"), None);
    }

    #[test]
    fn single_atom_record_builds_one_residue() {
        let line = "ATOM      1  N   GLY A  13      12.681  37.302 -25.211  1.00 15.56           N\n";
        let file = File::parse(line, FileFormat::Pdb).unwrap();
        let model = file.model().unwrap();
        let (chain_id, chain) = model.polymers().next().unwrap();
        assert_eq!(chain.asym_id(), "A");
        let residue = model.residue(chain.residues()[0]).unwrap();
        assert_eq!((residue.id.as_str(), residue.name.as_str()), ("A.13", "GLY"));
        let atoms = model.molecule_atom_ids(chain_id);
        assert_eq!(atoms.len(), 1);
        let atom = model.atom(atoms[0]).unwrap();
        assert_eq!((atom.id, atom.name.as_str(), atom.element.as_str()), (1, "N", "N"));
        assert_eq!(atom.position, Some(Point3::new(12.681, 37.302, -25.211)));
        assert_eq!(atom.b_factor, 15.56);
    }

    #[test]
    fn overlong_record_is_skipped_and_reported() {
        let text = format!("REMARK 999 {}\n{}", "X".repeat(75), LYSOZYME);
        let file = File::parse(&text, FileFormat::Pdb).unwrap();
        assert_eq!(file.code(), Some("1LYZ"));
        assert!(file.model().unwrap().atom_by_serial(7).is_some());
        assert_eq!(
            file.warnings().first(),
            Some(&StructureWarning::OverlongRecord { line: 1, length: 86 })
        );
    }

    #[test]
    fn missing_residues_are_listed_and_rebuilt() {
        let file = File::parse(LYSOZYME, FileFormat::Pdb).unwrap();
        let missing = file.missing_residues();
        assert_eq!(missing.len(), 1);
        assert_eq!((missing[0].name.as_str(), missing[0].number), ("GLY", Some(13)));

        let model = file.model().unwrap();
        let (_, chain) = model.polymers().next().unwrap();
        let ids: Vec<&str> = chain
            .residues()
            .iter()
            .map(|&r| model.residue(r).unwrap().id.as_str())
            .collect();
        assert_eq!(ids, vec!["A.12", "A.13", "A.14"]);
        assert_eq!(model.waters().count(), 1);
        assert_eq!(model.non_polymers().count(), 1);
    }

    #[test]
    fn assemblies_expand_into_transformed_copies() {
        let file = File::parse(LYSOZYME, FileFormat::Pdb).unwrap();
        assert_eq!(file.assemblies().len(), 1);
        let assembly = file.generate_assembly("1").unwrap();
        assert_eq!(assembly.polymers().count(), 2);
        let xs: Vec<f64> = assembly
            .polymers()
            .map(|(id, _)| {
                let first = assembly.molecule_atom_ids(id)[0];
                assembly.atom(first).unwrap().position.unwrap().x
            })
            .collect();
        assert_eq!(xs, vec![10.0, 0.0]);
        assert!(matches!(
            file.generate_assembly("9"),
            Err(AssemblyError::UnknownAssembly { .. })
        ));
    }

    #[test]
    fn pdb_output_reparses_to_the_same_structure() {
        let file = File::parse(LYSOZYME, FileFormat::Pdb).unwrap();
        let again = File::parse(&file.to_pdb_string(), FileFormat::Pdb).unwrap();
        let summary = |f: &File| {
            let model = f.model().unwrap();
            model
                .atoms()
                .filter(|(_, a)| !a.is_ghost())
                .map(|(_, a)| (a.id, a.name.clone(), a.position))
                .collect::<Vec<_>>()
        };
        assert_eq!(summary(&again), summary(&file));
        assert_eq!(again.code(), Some("1LYZ"));
        assert_eq!(again.missing_residues().len(), 1);
    }

    #[test]
    fn mmcif_output_keeps_every_category() {
        let file = File::parse(LYSOZYME, FileFormat::Pdb).unwrap();
        let cif = File::parse(&file.to_mmcif_string(), FileFormat::Mmcif).unwrap();
        assert_eq!(cif.code(), Some("1LYZ"));
        assert_eq!(cif.title(), file.title());
        assert_eq!(cif.model().unwrap().atom_count(), file.model().unwrap().atom_count());
        assert_eq!(cif.assemblies().len(), 1);
        assert!(cif.dict().category("conect").is_none());
    }

    #[test]
    fn listed_bonds_survive_conversion_to_mmcif_and_back() {
        let text = LYSOZYME.replace("END\n", "CONECT    6    7\nCONECT    7    6\nEND\n");
        let file = File::parse(&text, FileFormat::Pdb).unwrap();
        let cif_text = file.to_mmcif_string();
        assert!(cif_text.contains("metalc1"));
        let cif = File::parse(&cif_text, FileFormat::Mmcif).unwrap();

        let bonds = |f: &File| f.model().unwrap().bonds().len();
        assert_eq!(bonds(&cif), bonds(&file));
        let model = cif.model().unwrap();
        let zinc = model.atom_by_serial(6).unwrap();
        let partners: Vec<i64> = model
            .bonded_atoms(zinc)
            .iter()
            .map(|&a| model.atom(a).unwrap().id)
            .collect();
        assert_eq!(partners, vec![7]);

        let pdb = cif.to_pdb_string();
        assert!(pdb.contains("CONECT    6    7\n"));
        assert!(pdb.contains("CONECT    7    6\n"));
    }

    #[test]
    fn save_picks_format_from_extension() {
        let dir = TempDir::new().unwrap();
        let file = File::parse(LYSOZYME, FileFormat::Pdb).unwrap();
        let cif_path = dir.path().join("out.cif");
        file.save(&cif_path).unwrap();
        let text = std::fs::read_to_string(&cif_path).unwrap();
        assert!(text.starts_with("data_1LYZ"));

        let reopened = File::open(&cif_path).unwrap();
        assert_eq!(reopened.format(), FileFormat::Mmcif);
        let sniffed_path = dir.path().join("structure.txt");
        std::fs::write(&sniffed_path, LYSOZYME).unwrap();
        assert_eq!(File::open(&sniffed_path).unwrap().format(), FileFormat::Pdb);
    }

    #[test]
    fn unknown_content_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello world\n").unwrap();
        assert!(matches!(File::open(&path), Err(FileError::UnknownFormat { .. })));
        assert!(matches!(File::open(dir.path().join("absent.pdb")), Err(FileError::Io { .. })));
    }

    #[test]
    fn format_sniffing_and_names() {
        assert_eq!(FileFormat::sniff("data_1ABC\n"), Some(FileFormat::Mmcif));
        assert_eq!(FileFormat::sniff("\n# comment\nloop_\n"), Some(FileFormat::Mmcif));
        assert_eq!(FileFormat::sniff("HEADER    X\n"), Some(FileFormat::Pdb));
        assert_eq!(FileFormat::sniff("END\n"), Some(FileFormat::Pdb));
        assert_eq!(FileFormat::sniff("whatever"), None);
        assert_eq!("ENT".parse::<FileFormat>(), Ok(FileFormat::Pdb));
        assert_eq!(FileFormat::from_path(Path::new("a/b.mmcif")), Some(FileFormat::Mmcif));
        assert_eq!(FileFormat::from_path(Path::new("a/b")), None);
    }

    #[test]
    fn distance_between_atoms_is_exact() {
        let file = File::parse(LYSOZYME, FileFormat::Pdb).unwrap();
        let model = file.model().unwrap();
        let zinc = model.atom_by_serial(6).unwrap();
        let water = model.atom_by_serial(7).unwrap();
        assert_eq!(model.distance(zinc, water), Some(13.0));
    }
}
