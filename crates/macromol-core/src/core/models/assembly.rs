use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

/// One copy operation of a biological assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
    /// Asym ids of the chains this operation copies.
    pub chains: Vec<String>,
}

impl Transformation {
    /// Splits a homogeneous 4×4 matrix into its rotation and translation parts.
    pub fn from_homogeneous(matrix: &Matrix4<f64>, chains: Vec<String>) -> Self {
        Self {
            rotation: matrix.fixed_view::<3, 3>(0, 0).into_owned(),
            translation: matrix.fixed_view::<3, 1>(0, 3).into_owned(),
            chains,
        }
    }

    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    pub fn is_identity(&self) -> bool {
        self.rotation == Matrix3::identity() && self.translation == Vector3::zeros()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assembly {
    pub id: String,
    pub software: Option<String>,
    pub delta_energy: Option<f64>,
    pub buried_surface_area: Option<f64>,
    pub surface_area: Option<f64>,
    pub transformations: Vec<Transformation>,
}

impl Assembly {
    /// Every asym id touched by any transformation, first-seen order.
    pub fn chain_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for chain in self.transformations.iter().flat_map(|t| &t.chains) {
            if !ids.contains(&chain.as_str()) {
                ids.push(chain);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_homogeneous_separates_rotation_and_translation() {
        #[rustfmt::skip]
        let m = Matrix4::new(
            0.0, -1.0, 0.0, 10.0,
            1.0,  0.0, 0.0, 20.0,
            0.0,  0.0, 1.0, 30.0,
            0.0,  0.0, 0.0,  1.0,
        );
        let t = Transformation::from_homogeneous(&m, vec!["A".into()]);
        assert_eq!(t.rotation[(0, 1)], -1.0);
        assert_eq!(t.rotation[(1, 0)], 1.0);
        assert_eq!(t.translation, Vector3::new(10.0, 20.0, 30.0));
        assert_eq!(t.apply(&Point3::new(1.0, 0.0, 0.0)), Point3::new(10.0, 21.0, 30.0));
        assert!(!t.is_identity());
    }

    #[test]
    fn chain_ids_are_unique_in_first_seen_order() {
        let identity = Matrix4::identity();
        let assembly = Assembly {
            id: "1".into(),
            transformations: vec![
                Transformation::from_homogeneous(&identity, vec!["B".into(), "A".into()]),
                Transformation::from_homogeneous(&identity, vec!["A".into(), "C".into()]),
            ],
            ..Default::default()
        };
        assert_eq!(assembly.chain_ids(), vec!["B", "A", "C"]);
        assert!(assembly.transformations[0].is_identity());
    }
}
