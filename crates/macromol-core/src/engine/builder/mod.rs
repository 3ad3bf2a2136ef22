//! Turns an [`IntermediateDict`] into [`Model`]s.
//!
//! The build runs in phases: entity classification, secondary structure and anisotropy
//! harvesting, partitioning of `atom_site` into models and asyms, per-asym molecule
//! construction, then the cross-references (missing residues, helices and strands, bonds and
//! bind sites) that need a finished model.

pub mod altloc;
pub mod entities;
pub mod missing;
pub mod secondary;
pub mod sites;

use crate::core::io::dict::{IntermediateDict, Row};
use crate::core::models::atom::{Anisotropy, Atom, Occupancy};
use crate::core::models::ids::MoleculeId;
use crate::core::models::model::Model;
use crate::core::models::molecule::{EntityRecord, Molecule, MoleculeType};
use crate::core::models::residue::Residue;
use crate::core::topology::registry::TopologyRegistry;
use crate::engine::bonds;
use crate::engine::config::BuildOptions;
use crate::engine::error::{Diagnostics, StructureWarning};
use entities::EntityInfo;
use nalgebra::Point3;
use std::collections::HashMap;
use tracing::{debug, info};

/// An `atom_site` row with its position in the category.
pub(crate) type IndexedRow<'a> = (usize, Row<'a>);

const ANISOTROPY_KEYS: [&str; 6] = ["U[1][1]", "U[2][2]", "U[3][3]", "U[1][2]", "U[1][3]", "U[2][3]"];

/// Models built from a dictionary, with every warning raised along the way.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub models: Vec<Model>,
    pub warnings: Vec<StructureWarning>,
}

struct AsymRows<'a> {
    asym: String,
    rows: Vec<IndexedRow<'a>>,
}

struct ModelRows<'a> {
    number: i64,
    asyms: Vec<AsymRows<'a>>,
}

pub struct StructureBuilder<'a> {
    dict: &'a IntermediateDict,
    options: &'a BuildOptions,
    topology: &'a TopologyRegistry,
    entities: HashMap<String, EntityInfo>,
    anisotropy: HashMap<i64, Anisotropy>,
    diagnostics: Diagnostics,
}

impl<'a> StructureBuilder<'a> {
    pub fn new(dict: &'a IntermediateDict, options: &'a BuildOptions, topology: &'a TopologyRegistry) -> Self {
        Self {
            dict,
            options,
            topology,
            entities: entities::entity_table(dict),
            anisotropy: anisotropy_index(dict),
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn build(mut self) -> BuildOutput {
        let spans = secondary::harvest(self.dict);
        let partitions = partition(self.dict);
        debug!(
            entities = self.entities.len(),
            spans = spans.len(),
            models = partitions.len(),
            "Partitioned atom_site"
        );

        let mut models = Vec::with_capacity(partitions.len());
        for (index, partition) in partitions.into_iter().enumerate() {
            let mut model = Model::new(partition.number);
            model.set_long_bond_threshold(self.options.long_bond_threshold);
            for asym in partition.asyms {
                self.build_asym(&mut model, asym);
            }
            if self.options.reconstruct_missing_residues {
                missing::reconstruct(&mut model, self.dict, self.topology);
            }
            secondary::attach(&mut model, &spans, index == 0, &mut self.diagnostics);
            if self.options.infer_bonds {
                bonds::infer_residue_bonds(
                    &mut model,
                    self.topology,
                    self.options.backbone_link_cutoff,
                    &mut self.diagnostics,
                );
            }
            bonds::connect_listed(&mut model, self.dict, &mut self.diagnostics);
            model.sites = sites::bind_sites(&model, self.dict);
            debug!(
                model = model.number(),
                molecules = model.molecules().count(),
                atoms = model.atom_count(),
                "Built model"
            );
            models.push(model);
        }

        let warnings = self.diagnostics.into_inner();
        info!(models = models.len(), warnings = warnings.len(), "Structure built");
        BuildOutput { models, warnings }
    }

    fn kind_of(&self, rows: &[IndexedRow<'_>]) -> (MoleculeType, Option<&EntityInfo>) {
        let Some((_, first)) = rows.first() else {
            return (MoleculeType::NonPolymer, None);
        };
        match first.defined("label_entity_id").and_then(|id| self.entities.get(id)) {
            Some(info) => (info.kind, Some(info)),
            None => (entities::fallback_kind(first), None),
        }
    }

    fn build_asym(&mut self, model: &mut Model, asym: AsymRows<'_>) {
        let (kind, info) = self.kind_of(&asym.rows);
        let Some((_, first)) = asym.rows.first().copied() else {
            return;
        };
        let mut entity = EntityRecord {
            id: asym.asym.clone(),
            auth_id: first
                .defined("auth_asym_id")
                .unwrap_or(asym.asym.as_str())
                .to_string(),
            entity_id: first.defined("label_entity_id").map(String::from),
            name: first.get("label_comp_id").unwrap_or_default().to_string(),
            sequence: String::new(),
        };

        match kind {
            MoleculeType::Polymer | MoleculeType::BranchedPolymer => {
                if let Some(info) = info {
                    entity.name = info.description.clone().unwrap_or_default();
                    entity.sequence = info.sequence.clone();
                }
                let molecule_id = model.add_molecule(Molecule::new(kind, entity));
                for group in residue_groups(asym.rows) {
                    self.build_residue(model, molecule_id, &asym.asym, group);
                }
            }
            MoleculeType::NonPolymer => {
                let rows = self.resolved(asym.rows, &asym.asym);
                self.build_small_molecule(model, kind, entity, rows);
            }
            MoleculeType::Water => {
                for group in residue_groups(asym.rows) {
                    let rows = self.resolved(group, &asym.asym);
                    let Some((_, first)) = rows.first() else {
                        continue;
                    };
                    let mut entity = entity.clone();
                    entity.name = first.get("label_comp_id").unwrap_or_default().to_string();
                    self.build_small_molecule(model, kind, entity, rows);
                }
            }
        }
    }

    fn resolved<'r>(&mut self, rows: Vec<IndexedRow<'r>>, asym: &str) -> Vec<IndexedRow<'r>> {
        altloc::dedupe(altloc::resolve(rows), asym, &mut self.diagnostics)
    }

    fn build_residue(
        &mut self,
        model: &mut Model,
        molecule_id: MoleculeId,
        asym: &str,
        rows: Vec<IndexedRow<'_>>,
    ) {
        let rows = self.resolved(rows, asym);
        let Some(&(index, first)) = rows.first() else {
            return;
        };
        let label_seq_id = first.parse::<i64>("label_seq_id");
        let auth_seq_id = first.parse::<i64>("auth_seq_id");
        let Some(number) = label_seq_id.or(auth_seq_id) else {
            self.diagnostics.raise(StructureWarning::MissingRequiredField {
                row: index,
                field: "auth_seq_id",
            });
            return;
        };
        let insertion_code = first.defined("pdbx_PDB_ins_code").unwrap_or_default();
        let name = first.get("label_comp_id").unwrap_or_default();
        let mut residue = Residue::new(asym, number, insertion_code, name, molecule_id);
        residue.label_seq_id = label_seq_id;
        residue.auth_seq_id = auth_seq_id;
        let Some(residue_id) = model.add_residue(molecule_id, residue) else {
            return;
        };
        for (index, row) in rows {
            if let Some(atom) = self.atom_from_row(index, &row) {
                model.add_atom_to_residue(residue_id, atom);
            }
        }
    }

    fn build_small_molecule(
        &mut self,
        model: &mut Model,
        kind: MoleculeType,
        entity: EntityRecord,
        rows: Vec<IndexedRow<'_>>,
    ) {
        let mut molecule = Molecule::new(kind, entity);
        if let (Some(small), Some((_, first))) = (molecule.small_molecule_mut(), rows.first()) {
            small.number = first.parse("auth_seq_id");
            small.insertion_code = first
                .defined("pdbx_PDB_ins_code")
                .unwrap_or_default()
                .to_string();
        }
        let molecule_id = model.add_molecule(molecule);
        for (index, row) in rows {
            if let Some(atom) = self.atom_from_row(index, &row) {
                model.add_atom_to_molecule(molecule_id, atom);
            }
        }
    }

    fn atom_from_row(&mut self, index: usize, row: &Row<'_>) -> Option<Atom> {
        let Some(id) = row.parse::<i64>("id") else {
            self.diagnostics
                .raise(StructureWarning::MissingRequiredField { row: index, field: "id" });
            return None;
        };
        let mut require = |field: &'static str| {
            let value = row.parse::<f64>(field);
            if value.is_none() {
                self.diagnostics
                    .raise(StructureWarning::MissingRequiredField { row: index, field });
            }
            value
        };
        let x = require("Cartn_x")?;
        let y = require("Cartn_y")?;
        let z = require("Cartn_z")?;

        let name = altloc::atom_name(row);
        let element = row.defined("type_symbol").unwrap_or_default();
        let mut atom = Atom::new(id, name, element, Point3::new(x, y, z));
        atom.charge = row.parse("pdbx_formal_charge").unwrap_or(0);
        atom.b_factor = row.parse("B_iso_or_equiv").unwrap_or(0.0);
        atom.occupancy = row.get("occupancy").map_or_else(Occupancy::default, Occupancy::from_cif);
        atom.alt_loc = row.defined("label_alt_id").map(String::from);
        atom.anisotropy = self.anisotropy.get(&id).copied();
        atom.is_hetatm = row.get("group_PDB") == Some("HETATM");
        Some(atom)
    }
}

/// Builds every model of the dictionary with the given options.
pub fn build_models(
    dict: &IntermediateDict,
    options: &BuildOptions,
    topology: &TopologyRegistry,
) -> BuildOutput {
    StructureBuilder::new(dict, options, topology).build()
}

fn anisotropy_index(dict: &IntermediateDict) -> HashMap<i64, Anisotropy> {
    dict.rows("atom_site_anisotrop")
        .filter_map(|row| {
            let id = row.parse::<i64>("id")?;
            let mut tensor = [0.0; 6];
            for (slot, key) in tensor.iter_mut().zip(ANISOTROPY_KEYS) {
                *slot = row.parse(key)?;
            }
            Some((id, tensor))
        })
        .collect()
}

fn partition(dict: &IntermediateDict) -> Vec<ModelRows<'_>> {
    let mut models: Vec<ModelRows<'_>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut current: Option<&str> = None;

    for (position, row) in dict.rows("atom_site").enumerate() {
        let model_number = row.get("pdbx_PDB_model_num");
        if models.is_empty() || model_number != current {
            current = model_number;
            index.clear();
            models.push(ModelRows {
                number: row.parse("pdbx_PDB_model_num").unwrap_or(1),
                asyms: Vec::new(),
            });
        }
        let Some(model) = models.last_mut() else {
            continue;
        };
        let asym = row
            .defined("label_asym_id")
            .or_else(|| row.defined("auth_asym_id"))
            .unwrap_or_default();
        let slot = *index.entry(asym.to_string()).or_insert_with(|| {
            model.asyms.push(AsymRows {
                asym: asym.to_string(),
                rows: Vec::new(),
            });
            model.asyms.len() - 1
        });
        model.asyms[slot].rows.push((position, row));
    }
    models
}

/// Splits rows into runs sharing `(auth_seq_id, pdbx_PDB_ins_code)`.
fn residue_groups(rows: Vec<IndexedRow<'_>>) -> Vec<Vec<IndexedRow<'_>>> {
    let mut groups: Vec<Vec<IndexedRow<'_>>> = Vec::new();
    let mut current = None;
    for (index, row) in rows {
        let key = (row.get("auth_seq_id"), row.get("pdbx_PDB_ins_code"));
        match groups.last_mut() {
            Some(group) if current == Some(key) => group.push((index, row)),
            _ => {
                current = Some(key);
                groups.push(vec![(index, row)]);
            }
        }
    }
    groups
}
