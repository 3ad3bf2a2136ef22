use super::ids::{MoleculeId, ResidueId};
use crate::core::io::dict::{INAPPLICABLE, UNKNOWN};
use crate::core::utils::{elements, geometry};
use nalgebra::Point3;
use std::fmt;

/// The structure that directly owns an atom.
///
/// Polymer atoms belong to a residue; non-polymer and water atoms belong to the
/// molecule itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomParent {
    Residue(ResidueId),
    Molecule(MoleculeId),
}

/// Anisotropic displacement tensor, stored as U11, U22, U33, U12, U13, U23 in Å².
pub type Anisotropy = [f64; 6];

/// Occupancy as the file states it.
///
/// The two null markers are kept apart so that a written file repeats whichever one it read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Occupancy {
    Value(f64),
    Unknown,
    Inapplicable,
}

impl Occupancy {
    /// Reads an `atom_site.occupancy` value. Text that is not a number counts as unknown.
    pub fn from_cif(text: &str) -> Self {
        match text.trim() {
            UNKNOWN => Self::Unknown,
            INAPPLICABLE => Self::Inapplicable,
            other => other.parse().map_or(Self::Unknown, Self::Value),
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unknown | Self::Inapplicable => None,
        }
    }
}

impl Default for Occupancy {
    fn default() -> Self {
        Self::Value(1.0)
    }
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{:.2}", v),
            Self::Unknown => f.write_str(UNKNOWN),
            Self::Inapplicable => f.write_str(INAPPLICABLE),
        }
    }
}

/// A single atom as read from a coordinate record.
///
/// Atoms synthesised for residues that are known to exist but were not observed carry no
/// position (see [`Atom::is_ghost`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The integer atom id from the source file, unique within a model.
    pub id: i64,
    /// The atom name (e.g., "CA", "N", "O1").
    pub name: String,
    /// The element symbol as written in the file; lookups ignore case.
    pub element: String,
    /// Cartesian position in Ångströms, `None` for ghost atoms.
    pub position: Option<Point3<f64>>,
    /// Formal charge.
    pub charge: i32,
    /// Isotropic B-factor.
    pub b_factor: f64,
    /// Occupancy that survived altloc resolution.
    pub occupancy: Occupancy,
    /// Alternate location indicator, if any.
    pub alt_loc: Option<String>,
    /// Anisotropic displacement parameters, if provided.
    pub anisotropy: Option<Anisotropy>,
    /// Whether the atom came from a HETATM record.
    pub is_hetatm: bool,
    pub(crate) parent: Option<AtomParent>,
}

impl Atom {
    /// Creates an atom with default charge, B-factor and occupancy.
    pub fn new(id: i64, name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            position: Some(position),
            ..Self::ghost(id, name, element)
        }
    }

    /// Creates an atom without coordinates.
    pub fn ghost(id: i64, name: &str, element: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            element: element.to_string(),
            position: None,
            charge: 0,
            b_factor: 0.0,
            occupancy: Occupancy::default(),
            alt_loc: None,
            anisotropy: None,
            is_hetatm: false,
            parent: None,
        }
    }

    pub fn parent(&self) -> Option<AtomParent> {
        self.parent
    }

    pub fn is_ghost(&self) -> bool {
        self.position.is_none()
    }

    pub fn mass(&self) -> f64 {
        elements::atomic_mass(&self.element)
    }

    pub fn covalent_radius(&self) -> f64 {
        elements::covalent_radius(&self.element)
    }

    pub fn is_metal(&self) -> bool {
        elements::is_metal(&self.element)
    }

    /// Euclidean distance to another atom; `None` if either is a ghost.
    pub fn distance_to(&self, other: &Atom) -> Option<f64> {
        Some(geometry::distance(self.position.as_ref()?, other.position.as_ref()?))
    }

    pub fn distance_to_point(&self, point: &Point3<f64>) -> Option<f64> {
        Some(geometry::distance(self.position.as_ref()?, point))
    }

    /// Angle in radians formed at this atom by `a` and `b`.
    pub fn angle(&self, a: &Atom, b: &Atom) -> Option<f64> {
        geometry::angle(a.position.as_ref()?, self.position.as_ref()?, b.position.as_ref()?)
    }

    pub fn move_to(&mut self, position: Point3<f64>) {
        self.position = Some(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_has_expected_default_fields() {
        let atom = Atom::new(1, "CA", "C", Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.id, 1);
        assert_eq!(atom.name, "CA");
        assert_eq!(atom.position, Some(Point3::new(1.0, 2.0, 3.0)));
        assert_eq!(atom.charge, 0);
        assert_eq!(atom.b_factor, 0.0);
        assert_eq!(atom.occupancy.value(), Some(1.0));
        assert!(atom.alt_loc.is_none());
        assert!(atom.parent().is_none());
        assert!(!atom.is_ghost());
    }

    #[test]
    fn occupancy_keeps_null_markers_apart() {
        assert_eq!(Occupancy::from_cif("0.50"), Occupancy::Value(0.5));
        assert_eq!(Occupancy::from_cif("."), Occupancy::Inapplicable);
        assert_eq!(Occupancy::from_cif("?"), Occupancy::Unknown);
        assert_eq!(Occupancy::from_cif("n/a"), Occupancy::Unknown);
        assert_eq!(Occupancy::Value(0.5).to_string(), "0.50");
        assert_eq!(Occupancy::Inapplicable.to_string(), ".");
        assert_eq!(Occupancy::Unknown.value(), None);
    }

    #[test]
    fn ghost_atoms_have_no_geometry() {
        let ghost = Atom::ghost(5, "N", "N");
        let real = Atom::new(6, "CA", "C", Point3::origin());
        assert!(ghost.is_ghost());
        assert!(ghost.distance_to(&real).is_none());
        assert!(real.distance_to(&ghost).is_none());
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Atom::new(1, "C1", "C", Point3::new(0.0, 0.0, 0.0));
        let b = Atom::new(2, "C2", "C", Point3::new(3.0, 4.0, 12.0));
        assert_eq!(a.distance_to(&b), Some(13.0));
        assert_eq!(a.distance_to_point(&Point3::new(0.0, 0.0, 2.0)), Some(2.0));
    }

    #[test]
    fn element_properties_use_case_insensitive_lookup() {
        let zinc = Atom::new(1, "ZN", "Zn", Point3::origin());
        assert!(zinc.is_metal());
        assert_eq!(zinc.mass(), 65.39);
        let unknown = Atom::new(2, "X", "Xx", Point3::origin());
        assert_eq!(unknown.mass(), 0.0);
        assert_eq!(unknown.covalent_radius(), 0.0);
    }

    #[test]
    fn angle_is_measured_at_self() {
        let vertex = Atom::new(1, "O", "O", Point3::origin());
        let h1 = Atom::new(2, "H1", "H", Point3::new(1.0, 0.0, 0.0));
        let h2 = Atom::new(3, "H2", "H", Point3::new(0.0, 0.0, 1.0));
        let angle = vertex.angle(&h1, &h2).unwrap();
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn move_to_gives_ghost_a_position() {
        let mut atom = Atom::ghost(1, "N", "N");
        atom.move_to(Point3::new(1.0, 1.0, 1.0));
        assert!(!atom.is_ghost());
    }
}
