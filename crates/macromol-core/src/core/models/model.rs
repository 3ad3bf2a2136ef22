use super::atom::{Atom, AtomParent};
use super::ids::{AtomId, MoleculeId, ResidueId};
use super::molecule::{Molecule, MoleculeType};
use super::residue::Residue;
use super::topology::{Bond, BondOrder, BondOutcome};
use crate::core::utils::geometry::{self, Axis};
use nalgebra::{Matrix3, Point3, Vector3};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::warn;

/// Bonds at or beyond this length are reported when created.
pub const DEFAULT_LONG_BOND_THRESHOLD: f64 = 20.0;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Cannot pair structures with different atom counts ({left} vs {right})")]
    AtomCountMismatch { left: usize, right: usize },
    #[error("Atom {0} has no coordinates")]
    MissingCoordinates(i64),
    #[error("Atom handle does not belong to this model")]
    UnknownAtom,
}

/// A binding site annotation linking the residues and ligands it is made of.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BindSite {
    pub id: String,
    pub details: Option<String>,
    pub residues: Vec<ResidueId>,
    pub molecules: Vec<MoleculeId>,
}

/// One model (conformer) of a structure, holding every molecule, residue, atom and bond.
///
/// All entities live in arenas owned by the model. Molecules, residues and atoms refer to
/// their owners through plain ids, so traversal always goes through the model. Iteration
/// order over molecules, residues and atoms is the order in which they were added.
#[derive(Debug, Clone)]
pub struct Model {
    /// The model number from the source file.
    number: i64,
    /// Primary storage for atoms.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for molecules.
    molecules: SlotMap<MoleculeId, Molecule>,
    /// Molecules in insertion order.
    molecule_order: Vec<MoleculeId>,
    /// List of all bonds in the model.
    bonds: Vec<Bond>,
    /// Cached adjacency list for bond connectivity, indexed by atom ID.
    bond_adjacency: SecondaryMap<AtomId, Vec<AtomId>>,
    /// Lookup from the file's integer atom id to the arena handle.
    atom_id_map: HashMap<i64, AtomId>,
    /// Binding site annotations.
    pub sites: Vec<BindSite>,
    long_bond_threshold: f64,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Model {
    /// Creates a new, empty model with the given model number.
    pub fn new(number: i64) -> Self {
        Self {
            number,
            atoms: SlotMap::with_key(),
            residues: SlotMap::with_key(),
            molecules: SlotMap::with_key(),
            molecule_order: Vec::new(),
            bonds: Vec::new(),
            bond_adjacency: SecondaryMap::new(),
            atom_id_map: HashMap::new(),
            sites: Vec::new(),
            long_bond_threshold: DEFAULT_LONG_BOND_THRESHOLD,
        }
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    pub fn set_long_bond_threshold(&mut self, threshold: f64) {
        self.long_bond_threshold = threshold;
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn residue_mut(&mut self, id: ResidueId) -> Option<&mut Residue> {
        self.residues.get_mut(id)
    }

    pub fn molecule(&self, id: MoleculeId) -> Option<&Molecule> {
        self.molecules.get(id)
    }

    pub fn molecule_mut(&mut self, id: MoleculeId) -> Option<&mut Molecule> {
        self.molecules.get_mut(id)
    }

    /// Returns an iterator over all molecules in insertion order.
    pub fn molecules(&self) -> impl Iterator<Item = (MoleculeId, &Molecule)> {
        self.molecule_order
            .iter()
            .filter_map(|&id| self.molecules.get(id).map(|m| (id, m)))
    }

    pub fn molecules_of_type(
        &self,
        molecule_type: MoleculeType,
    ) -> impl Iterator<Item = (MoleculeId, &Molecule)> {
        self.molecules()
            .filter(move |(_, m)| m.molecule_type() == molecule_type)
    }

    pub fn polymers(&self) -> impl Iterator<Item = (MoleculeId, &Molecule)> {
        self.molecules_of_type(MoleculeType::Polymer)
    }

    pub fn branched_polymers(&self) -> impl Iterator<Item = (MoleculeId, &Molecule)> {
        self.molecules_of_type(MoleculeType::BranchedPolymer)
    }

    pub fn non_polymers(&self) -> impl Iterator<Item = (MoleculeId, &Molecule)> {
        self.molecules_of_type(MoleculeType::NonPolymer)
    }

    pub fn waters(&self) -> impl Iterator<Item = (MoleculeId, &Molecule)> {
        self.molecules_of_type(MoleculeType::Water)
    }

    /// Returns an iterator over every residue of every molecule, in chain order.
    pub fn residues(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.molecules()
            .flat_map(|(_, m)| m.residues().iter())
            .filter_map(|&id| self.residues.get(id).map(|r| (id, r)))
    }

    /// Returns an iterator over every atom in traversal order.
    pub fn atoms(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.molecule_order
            .iter()
            .flat_map(|&id| self.molecule_atom_ids(id))
            .filter_map(|id| self.atoms.get(id).map(|a| (id, a)))
    }

    pub fn atom_ids(&self) -> Vec<AtomId> {
        self.atoms().map(|(id, _)| id).collect()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// All atoms of a molecule, through its residues for polymers.
    pub fn molecule_atom_ids(&self, id: MoleculeId) -> Vec<AtomId> {
        let Some(molecule) = self.molecules.get(id) else {
            return Vec::new();
        };
        match molecule {
            Molecule::Polymer(_) | Molecule::BranchedPolymer(_) => molecule
                .residues()
                .iter()
                .filter_map(|&rid| self.residues.get(rid))
                .flat_map(|r| r.atoms().iter().copied())
                .collect(),
            Molecule::NonPolymer(_) | Molecule::Water(_) => molecule.direct_atoms().to_vec(),
        }
    }

    /// The atoms owned by a residue or by a small molecule.
    pub fn parent_atom_ids(&self, parent: AtomParent) -> Vec<AtomId> {
        match parent {
            AtomParent::Residue(rid) => self
                .residues
                .get(rid)
                .map(|r| r.atoms().to_vec())
                .unwrap_or_default(),
            AtomParent::Molecule(mid) => self.molecule_atom_ids(mid),
        }
    }

    /// The molecule an atom belongs to, directly or through its residue.
    pub fn molecule_of_atom(&self, id: AtomId) -> Option<MoleculeId> {
        match self.atoms.get(id)?.parent? {
            AtomParent::Residue(rid) => Some(self.residues.get(rid)?.molecule_id),
            AtomParent::Molecule(mid) => Some(mid),
        }
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Finds an atom by the integer id it had in the source file.
    pub fn atom_by_serial(&self, id: i64) -> Option<AtomId> {
        self.atom_id_map.get(&id).copied()
    }

    /// Finds the first molecule with the given primary asym id.
    pub fn molecule_by_asym(&self, asym_id: &str) -> Option<MoleculeId> {
        self.molecules()
            .find(|(_, m)| m.asym_id() == asym_id)
            .map(|(id, _)| id)
    }

    /// Finds a residue of a polymer by its sequence number and insertion code.
    pub fn residue_by_key(
        &self,
        molecule_id: MoleculeId,
        number: i64,
        insertion_code: &str,
    ) -> Option<ResidueId> {
        self.molecules
            .get(molecule_id)?
            .residues()
            .iter()
            .copied()
            .find(|&rid| {
                self.residues
                    .get(rid)
                    .is_some_and(|r| r.key() == (number, insertion_code.trim()))
            })
    }

    fn residue_neighbour(&self, id: ResidueId, offset: isize) -> Option<ResidueId> {
        let residue = self.residues.get(id)?;
        let residues = self.molecules.get(residue.molecule_id)?.residues();
        let index = residues.iter().position(|&r| r == id)?;
        let target = index.checked_add_signed(offset)?;
        residues.get(target).copied()
    }

    /// The residue that follows this one in its polymer.
    pub fn next_residue(&self, id: ResidueId) -> Option<ResidueId> {
        self.residue_neighbour(id, 1)
    }

    pub fn previous_residue(&self, id: ResidueId) -> Option<ResidueId> {
        self.residue_neighbour(id, -1)
    }

    /// Appends a molecule to the model.
    pub fn add_molecule(&mut self, molecule: Molecule) -> MoleculeId {
        let id = self.molecules.insert(molecule);
        self.molecule_order.push(id);
        id
    }

    /// Appends a residue to the end of a polymer.
    ///
    /// Returns `None` if the molecule does not exist or cannot hold residues.
    pub fn add_residue(&mut self, molecule_id: MoleculeId, residue: Residue) -> Option<ResidueId> {
        let len = self.molecules.get(molecule_id)?.residues().len();
        self.insert_residue(molecule_id, len, residue)
    }

    /// Inserts a residue into a polymer at `index` (clamped to the chain length).
    pub fn insert_residue(
        &mut self,
        molecule_id: MoleculeId,
        index: usize,
        mut residue: Residue,
    ) -> Option<ResidueId> {
        if self.molecules.get(molecule_id)?.small_molecule().is_some() {
            return None;
        }
        residue.molecule_id = molecule_id;
        residue.clear_atoms();
        let residue_id = self.residues.insert(residue);
        let residues = self.molecules.get_mut(molecule_id)?.residues_mut()?;
        let index = index.min(residues.len());
        residues.insert(index, residue_id);
        Some(residue_id)
    }

    /// Adds an atom to a polymer residue.
    ///
    /// Returns `None` if the residue doesn't exist.
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, mut atom: Atom) -> Option<AtomId> {
        if !self.residues.contains_key(residue_id) {
            return None;
        }
        atom.parent = Some(AtomParent::Residue(residue_id));
        let name = atom.name.clone();
        let atom_id = self.register_atom(atom);
        self.residues.get_mut(residue_id)?.add_atom(&name, atom_id);
        Some(atom_id)
    }

    /// Adds an atom directly to a ligand or water.
    ///
    /// Returns `None` if the molecule doesn't exist or is a polymer.
    pub fn add_atom_to_molecule(&mut self, molecule_id: MoleculeId, mut atom: Atom) -> Option<AtomId> {
        self.molecules.get(molecule_id)?.small_molecule()?;
        atom.parent = Some(AtomParent::Molecule(molecule_id));
        let atom_id = self.register_atom(atom);
        self.molecules
            .get_mut(molecule_id)?
            .direct_atoms_mut()?
            .push(atom_id);
        Some(atom_id)
    }

    fn register_atom(&mut self, atom: Atom) -> AtomId {
        let file_id = atom.id;
        let atom_id = self.atoms.insert(atom);
        self.bond_adjacency.insert(atom_id, Vec::new());
        self.atom_id_map.entry(file_id).or_insert(atom_id);
        atom_id
    }

    /// The smallest integer atom id not yet used by this model's atoms.
    pub fn next_free_atom_id(&self) -> i64 {
        self.atom_id_map.keys().max().map_or(1, |max| max + 1)
    }

    /// Adds a bond between two atoms.
    ///
    /// This method is idempotent; adding an existing bond reports
    /// [`BondOutcome::AlreadyPresent`]. Bonds whose length reaches the long-bond
    /// threshold are still created, and a warning is logged.
    ///
    /// Returns `None` if either atom doesn't exist or both ids are the same atom.
    pub fn add_bond(
        &mut self,
        atom1_id: AtomId,
        atom2_id: AtomId,
        order: BondOrder,
    ) -> Option<BondOutcome> {
        if atom1_id == atom2_id {
            return None;
        }
        let a = self.atoms.get(atom1_id)?;
        let b = self.atoms.get(atom2_id)?;

        if self
            .bond_adjacency
            .get(atom1_id)
            .is_some_and(|neighbors| neighbors.contains(&atom2_id))
        {
            return Some(BondOutcome::AlreadyPresent);
        }

        let length = a.distance_to(b);
        let (id1, id2) = (a.id, b.id);

        self.bonds.push(Bond::new(atom1_id, atom2_id, order));
        self.bond_adjacency.get_mut(atom1_id)?.push(atom2_id);
        self.bond_adjacency.get_mut(atom2_id)?.push(atom1_id);

        match length {
            Some(length) if length >= self.long_bond_threshold => {
                warn!(
                    atom1 = id1,
                    atom2 = id2,
                    length,
                    "Long bond created between atoms {} and {} ({:.2} Å)",
                    id1,
                    id2,
                    length
                );
                Some(BondOutcome::CreatedLong { length })
            }
            _ => Some(BondOutcome::Created),
        }
    }

    /// Retrieves the bonded neighbors of an atom.
    pub fn bonded_atoms(&self, atom_id: AtomId) -> &[AtomId] {
        self.bond_adjacency
            .get(atom_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Removes an atom from the model together with its bonds.
    pub fn remove_atom(&mut self, atom_id: AtomId) -> Option<Atom> {
        let atom = self.atoms.remove(atom_id)?;

        match atom.parent {
            Some(AtomParent::Residue(rid)) => {
                if let Some(residue) = self.residues.get_mut(rid) {
                    residue.remove_atom(&atom.name, atom_id);
                }
            }
            Some(AtomParent::Molecule(mid)) => {
                if let Some(atoms) = self
                    .molecules
                    .get_mut(mid)
                    .and_then(|m| m.direct_atoms_mut())
                {
                    atoms.retain(|&id| id != atom_id);
                }
            }
            None => {}
        }

        self.bonds.retain(|bond| !bond.contains(atom_id));
        let neighbors = self.bond_adjacency.remove(atom_id).unwrap_or_default();
        for neighbor_id in neighbors {
            if let Some(adjacency) = self.bond_adjacency.get_mut(neighbor_id) {
                adjacency.retain(|&id| id != atom_id);
            }
        }

        if self.atom_id_map.get(&atom.id) == Some(&atom_id) {
            self.atom_id_map.remove(&atom.id);
        }

        Some(atom)
    }

    /// Removes a residue and all of its atoms.
    pub fn remove_residue(&mut self, residue_id: ResidueId) -> Option<Residue> {
        let atom_ids = self.residues.get(residue_id)?.atoms().to_vec();
        for atom_id in atom_ids {
            self.remove_atom(atom_id);
        }
        let residue = self.residues.remove(residue_id)?;
        if let Some(molecule) = self.molecules.get_mut(residue.molecule_id) {
            molecule.forget_residue(residue_id);
        }
        for site in &mut self.sites {
            site.residues.retain(|&id| id != residue_id);
        }
        Some(residue)
    }

    /// Removes a molecule with all of its residues and atoms.
    pub fn remove_molecule(&mut self, molecule_id: MoleculeId) -> Option<Molecule> {
        let molecule = self.molecules.get(molecule_id)?;
        let residue_ids = molecule.residues().to_vec();
        let direct_atoms = molecule.direct_atoms().to_vec();
        for residue_id in residue_ids {
            self.remove_residue(residue_id);
        }
        for atom_id in direct_atoms {
            self.remove_atom(atom_id);
        }
        self.molecule_order.retain(|&id| id != molecule_id);
        for site in &mut self.sites {
            site.molecules.retain(|&id| id != molecule_id);
        }
        self.molecules.remove(molecule_id)
    }

    /// Removes every water molecule from the model.
    pub fn dehydrate(&mut self) {
        let waters: Vec<MoleculeId> = self.waters().map(|(id, _)| id).collect();
        for id in waters {
            self.remove_molecule(id);
        }
    }

    /// Copies a molecule from another model into this one.
    ///
    /// The copy gets fresh handles, and bonds between its own atoms are copied too. Atom ids
    /// that clash with atoms already in this model are renumbered past the current maximum.
    pub fn copy_molecule_from(&mut self, source: &Model, molecule_id: MoleculeId) -> Option<MoleculeId> {
        let molecule = source.molecule(molecule_id)?;
        let mut template = molecule.clone();
        if let Some(residues) = template.residues_mut() {
            residues.clear();
        }
        if let Some(atoms) = template.direct_atoms_mut() {
            atoms.clear();
        }
        if let Molecule::Polymer(p) = &mut template {
            p.helices.clear();
            p.strands.clear();
        }
        let new_molecule = self.add_molecule(template);

        let mut atom_map: HashMap<AtomId, AtomId> = HashMap::new();
        let mut residue_map: HashMap<ResidueId, ResidueId> = HashMap::new();
        let mut next_id = self.next_free_atom_id();

        let mut copy_atom = |model: &mut Model, old_id: AtomId, parent: AtomParent| -> Option<()> {
            let mut atom = source.atom(old_id)?.clone();
            if model.atom_id_map.contains_key(&atom.id) {
                atom.id = next_id;
                next_id += 1;
            } else if atom.id >= next_id {
                next_id = atom.id + 1;
            }
            let new_id = match parent {
                AtomParent::Residue(rid) => model.add_atom_to_residue(rid, atom)?,
                AtomParent::Molecule(mid) => model.add_atom_to_molecule(mid, atom)?,
            };
            atom_map.insert(old_id, new_id);
            Some(())
        };

        for &old_residue in molecule.residues() {
            let residue = source.residue(old_residue)?;
            let new_residue = self.add_residue(new_molecule, residue.clone())?;
            residue_map.insert(old_residue, new_residue);
            for &atom_id in residue.atoms() {
                copy_atom(self, atom_id, AtomParent::Residue(new_residue))?;
            }
        }
        for &atom_id in molecule.direct_atoms() {
            copy_atom(self, atom_id, AtomParent::Molecule(new_molecule))?;
        }

        let map_span = |span: &Vec<ResidueId>| -> Vec<ResidueId> {
            span.iter().filter_map(|r| residue_map.get(r).copied()).collect()
        };
        let helices: Vec<Vec<ResidueId>> = molecule.helices().iter().map(map_span).collect();
        let strands: Vec<Vec<ResidueId>> = molecule.strands().iter().map(map_span).collect();
        if let Some(Molecule::Polymer(p)) = self.molecules.get_mut(new_molecule) {
            p.helices = helices;
            p.strands = strands;
        }

        for bond in source.bonds() {
            if let (Some(&a), Some(&b)) = (atom_map.get(&bond.atom1_id), atom_map.get(&bond.atom2_id)) {
                self.add_bond(a, b, bond.order);
            }
        }
        Some(new_molecule)
    }

    /// Euclidean distance between two atoms; `None` if either is missing or a ghost.
    pub fn distance(&self, a: AtomId, b: AtomId) -> Option<f64> {
        self.atoms.get(a)?.distance_to(self.atoms.get(b)?)
    }

    /// Atoms with coordinates within `radius` of `center`, in traversal order.
    pub fn atoms_in_sphere(&self, center: &Point3<f64>, radius: f64) -> Vec<AtomId> {
        self.atoms()
            .filter(|(_, atom)| atom.distance_to_point(center).is_some_and(|d| d <= radius))
            .map(|(id, _)| id)
            .collect()
    }

    /// Atoms within `cutoff` of the given atom, excluding the atom itself.
    pub fn nearby_atoms(&self, atom_id: AtomId, cutoff: f64) -> Vec<AtomId> {
        let Some(center) = self.atoms.get(atom_id).and_then(|a| a.position) else {
            return Vec::new();
        };
        self.atoms_in_sphere(&center, cutoff)
            .into_iter()
            .filter(|&id| id != atom_id)
            .collect()
    }

    /// Residues and small molecules with any atom within `cutoff` of the given atom.
    ///
    /// The atom's own residue or molecule is excluded, as are waters unless `include_waters`.
    pub fn nearby_structures(&self, atom_id: AtomId, cutoff: f64, include_waters: bool) -> Vec<AtomParent> {
        let own_parent = self.atoms.get(atom_id).and_then(|a| a.parent);
        let mut found: Vec<AtomParent> = Vec::new();
        for id in self.nearby_atoms(atom_id, cutoff) {
            let Some(parent) = self.atoms.get(id).and_then(|a| a.parent) else {
                continue;
            };
            if Some(parent) == own_parent || found.contains(&parent) {
                continue;
            }
            if !include_waters {
                if let AtomParent::Molecule(mid) = parent {
                    if self.molecules.get(mid).is_some_and(|m| m.is_water()) {
                        continue;
                    }
                }
            }
            found.push(parent);
        }
        found
    }

    pub fn mass_of(&self, atoms: &[AtomId]) -> f64 {
        atoms
            .iter()
            .filter_map(|&id| self.atoms.get(id))
            .map(Atom::mass)
            .sum()
    }

    pub fn charge_of(&self, atoms: &[AtomId]) -> i64 {
        atoms
            .iter()
            .filter_map(|&id| self.atoms.get(id))
            .map(|a| i64::from(a.charge))
            .sum()
    }

    /// Element counts keyed by upper-case symbol.
    pub fn formula_of(&self, atoms: &[AtomId]) -> BTreeMap<String, usize> {
        let mut formula = BTreeMap::new();
        for atom in atoms.iter().filter_map(|&id| self.atoms.get(id)) {
            *formula.entry(atom.element.trim().to_ascii_uppercase()).or_insert(0) += 1;
        }
        formula
    }

    /// Mass-weighted centre of the positioned atoms; `None` when their total mass is zero.
    pub fn center_of_mass_of(&self, atoms: &[AtomId]) -> Option<Point3<f64>> {
        let mut total = 0.0;
        let mut weighted = Vector3::zeros();
        for atom in atoms.iter().filter_map(|&id| self.atoms.get(id)) {
            if let Some(position) = atom.position {
                let mass = atom.mass();
                total += mass;
                weighted += position.coords * mass;
            }
        }
        (total > 0.0).then(|| Point3::from(weighted / total))
    }

    /// Root-mean-square distance of the positioned atoms from their centre of mass.
    pub fn radius_of_gyration_of(&self, atoms: &[AtomId]) -> Option<f64> {
        let center = self.center_of_mass_of(atoms)?;
        let distances: Vec<f64> = atoms
            .iter()
            .filter_map(|&id| self.atoms.get(id)?.distance_to_point(&center))
            .collect();
        if distances.is_empty() {
            return None;
        }
        let sum_sq: f64 = distances.iter().map(|d| d * d).sum();
        Some((sum_sq / distances.len() as f64).sqrt())
    }

    pub fn mass(&self) -> f64 {
        self.mass_of(&self.atom_ids())
    }

    pub fn formula(&self) -> BTreeMap<String, usize> {
        self.formula_of(&self.atom_ids())
    }

    pub fn center_of_mass(&self) -> Option<Point3<f64>> {
        self.center_of_mass_of(&self.atom_ids())
    }

    fn update_positions(&mut self, atoms: &[AtomId], f: impl Fn(&Point3<f64>) -> Point3<f64>) {
        for &id in atoms {
            if let Some(position) = self.atoms.get_mut(id).and_then(|a| a.position.as_mut()) {
                *position = f(position);
            }
        }
    }

    pub fn translate(&mut self, atoms: &[AtomId], vector: &Vector3<f64>) {
        self.update_positions(atoms, |p| p + vector);
    }

    /// Applies a 3×3 matrix to every position.
    pub fn transform(&mut self, atoms: &[AtomId], matrix: &Matrix3<f64>) {
        self.update_positions(atoms, |p| Point3::from(matrix * p.coords));
    }

    /// Rotates positions about a Cartesian axis through the origin.
    pub fn rotate(&mut self, atoms: &[AtomId], angle_radians: f64, axis: Axis) {
        let matrix = geometry::rotation_about_axis(axis, angle_radians);
        self.transform(atoms, &matrix);
    }

    /// Rounds coordinates to `places` decimals; `None` leaves them untouched.
    pub fn trim(&mut self, atoms: &[AtomId], places: Option<u32>) {
        self.update_positions(atoms, |p| {
            p.map(|c| geometry::round_to_places(c, places))
        });
    }

    /// Pairs atoms of this model with atoms of another structure of equal size.
    ///
    /// Both sides are ordered by element, then name, then id, then their position in the
    /// input slice, and matched one-to-one in that order.
    pub fn pairing_with(
        &self,
        atoms: &[AtomId],
        other: &Model,
        other_atoms: &[AtomId],
    ) -> Result<Vec<(AtomId, AtomId)>, ModelError> {
        if atoms.len() != other_atoms.len() {
            return Err(ModelError::AtomCountMismatch {
                left: atoms.len(),
                right: other_atoms.len(),
            });
        }
        let left = sorted_for_pairing(self, atoms)?;
        let right = sorted_for_pairing(other, other_atoms)?;
        Ok(left.into_iter().zip(right).collect())
    }

    /// RMSD between paired atoms, optionally after optimal superposition.
    pub fn rmsd_with(
        &self,
        atoms: &[AtomId],
        other: &Model,
        other_atoms: &[AtomId],
        superpose: bool,
    ) -> Result<f64, ModelError> {
        let pairs = self.pairing_with(atoms, other, other_atoms)?;
        let mut left = Vec::with_capacity(pairs.len());
        let mut right = Vec::with_capacity(pairs.len());
        for (a, b) in pairs {
            left.push(position_of(self, a)?);
            right.push(position_of(other, b)?);
        }
        let rmsd = if superpose {
            geometry::superposed_rmsd(&left, &right)
        } else {
            geometry::calculate_rmsd(&left, &right)
        };
        Ok(rmsd.unwrap_or(0.0))
    }
}

fn sorted_for_pairing(model: &Model, atoms: &[AtomId]) -> Result<Vec<AtomId>, ModelError> {
    let mut keyed = Vec::with_capacity(atoms.len());
    for (index, &id) in atoms.iter().enumerate() {
        let atom = model.atom(id).ok_or(ModelError::UnknownAtom)?;
        keyed.push((atom.element.to_ascii_uppercase(), atom.name.clone(), atom.id, index, id));
    }
    keyed.sort();
    Ok(keyed.into_iter().map(|(.., id)| id).collect())
}

fn position_of(model: &Model, id: AtomId) -> Result<Point3<f64>, ModelError> {
    let atom = model.atom(id).ok_or(ModelError::UnknownAtom)?;
    atom.position.ok_or(ModelError::MissingCoordinates(atom.id))
}
