use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What happens to a particle reaching the outer surface of the box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryType {
    Vacuum,
    Reflective,
    Periodic,
}

impl Default for BoundaryType {
    fn default() -> Self {
        BoundaryType::Reflective
    }
}

impl FromStr for BoundaryType {
    type Err = String;

    /// Case-insensitive: "vacuum", "Vacuum" and "VACUUM" are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vacuum" => Ok(BoundaryType::Vacuum),
            "reflective" => Ok(BoundaryType::Reflective),
            "periodic" => Ok(BoundaryType::Periodic),
            _ => Err(format!(
                "unknown boundary condition `{}`, expected vacuum, reflective or periodic",
                s
            )),
        }
    }
}

impl<'de> Deserialize<'de> for BoundaryType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl fmt::Display for BoundaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoundaryType::Vacuum => "Vacuum",
            BoundaryType::Reflective => "Reflective",
            BoundaryType::Periodic => "Periodic",
        };
        f.write_str(name)
    }
}

/// Axis-aligned box `[0, x) × [0, y) × [0, z)` with one boundary condition on
/// every face.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub boundary: BoundaryType,
}

impl Geometry {
    pub fn new(x: f64, y: f64, z: f64, boundary: BoundaryType) -> Result<Self, String> {
        if !(x > 0.0 && y > 0.0 && z > 0.0) {
            return Err(format!(
                "Length of domain must be positive in every dimension, got ({}, {}, {})",
                x, y, z
            ));
        }
        Ok(Self { x, y, z, boundary })
    }

    /// Extents along each axis.
    pub fn extents(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Whether `position` lies inside the box.
    pub fn contains(&self, position: [f64; 3]) -> bool {
        position
            .iter()
            .zip(self.extents())
            .all(|(&p, l)| p >= 0.0 && p < l)
    }

    /// Distance along `direction` from `position` to the nearest face, and the
    /// axis of that face.
    pub fn distance_to_boundary(&self, position: [f64; 3], direction: [f64; 3]) -> (f64, usize) {
        let mut dist = f64::INFINITY;
        let mut axis = 0;
        for (i, l) in self.extents().into_iter().enumerate() {
            let d = if direction[i] > 0.0 {
                (l - position[i]) / direction[i]
            } else if direction[i] < 0.0 {
                -position[i] / direction[i]
            } else {
                f64::INFINITY
            };
            if d < dist {
                dist = d;
                axis = i;
            }
        }
        (dist.max(0.0), axis)
    }

    /// Pull every coordinate of `position` back into the half-open box.
    pub fn confine(&self, position: &mut [f64; 3]) {
        for (p, l) in position.iter_mut().zip(self.extents()) {
            if *p < 0.0 {
                *p = 0.0;
            } else if *p >= l {
                *p = below(l);
            }
        }
    }
}

/// Largest value this close to `l` that still compares below it.
#[inline]
pub fn below(l: f64) -> f64 {
    l * (1.0 - f64::EPSILON)
}

/// Regular mesh with `n` cells along each axis of a box.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub n: usize,
    pub extents: [f64; 3],
    pub widths: [f64; 3],
}

impl Mesh {
    pub fn new(n: usize, geometry: &Geometry) -> Self {
        let n = n.max(1);
        let extents = geometry.extents();
        let widths = extents.map(|l| l / n as f64);
        Self { n, extents, widths }
    }

    pub fn n_cells(&self) -> usize {
        self.n * self.n * self.n
    }

    pub fn cell_volume(&self) -> f64 {
        self.widths.iter().product()
    }

    /// Index of the cell containing `coordinate` along `axis`, or None when the
    /// coordinate lies outside `[0, extent)`.
    #[inline]
    pub fn axis_index(&self, coordinate: f64, axis: usize) -> Option<usize> {
        if !(coordinate >= 0.0 && coordinate < self.extents[axis]) {
            return None;
        }
        // floor(x / dx); the min only absorbs rounding right below the upper face
        Some(((coordinate / self.widths[axis]) as usize).min(self.n - 1))
    }

    /// Flat index `ix + n*iy + n*n*iz` of the cell containing `position`.
    #[inline]
    pub fn cell_index(&self, position: [f64; 3]) -> Option<usize> {
        let ix = self.axis_index(position[0], 0)?;
        let iy = self.axis_index(position[1], 1)?;
        let iz = self.axis_index(position[2], 2)?;
        Some(ix + self.n * iy + self.n * self.n * iz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_from_str() {
        assert_eq!("Vacuum".parse::<BoundaryType>(), Ok(BoundaryType::Vacuum));
        assert_eq!("REFLECTIVE".parse::<BoundaryType>(), Ok(BoundaryType::Reflective));
        assert_eq!("periodic".parse::<BoundaryType>(), Ok(BoundaryType::Periodic));
        assert!("white".parse::<BoundaryType>().is_err());
    }

    #[test]
    fn test_geometry_rejects_non_positive_extent() {
        assert!(Geometry::new(1.0, 0.0, 1.0, BoundaryType::Vacuum).is_err());
        assert!(Geometry::new(1.0, 1.0, -2.0, BoundaryType::Vacuum).is_err());
        assert!(Geometry::new(1.0, 1.0, 1.0, BoundaryType::Vacuum).is_ok());
    }

    #[test]
    fn test_contains_is_half_open() {
        let g = Geometry::new(2.0, 2.0, 2.0, BoundaryType::Vacuum).unwrap();
        assert!(g.contains([0.0, 0.0, 0.0]));
        assert!(g.contains([1.999, 1.0, 1.0]));
        assert!(!g.contains([2.0, 1.0, 1.0]));
        assert!(!g.contains([-1e-9, 1.0, 1.0]));
    }

    #[test]
    fn test_distance_to_boundary() {
        let g = Geometry::new(10.0, 10.0, 10.0, BoundaryType::Vacuum).unwrap();
        let (d, axis) = g.distance_to_boundary([2.0, 5.0, 5.0], [-1.0, 0.0, 0.0]);
        assert!((d - 2.0).abs() < 1e-12);
        assert_eq!(axis, 0);

        let (d, axis) = g.distance_to_boundary([5.0, 5.0, 9.0], [0.0, 0.6, 0.8]);
        assert!((d - 1.25).abs() < 1e-12);
        assert_eq!(axis, 2);
    }

    #[test]
    fn test_confine() {
        let g = Geometry::new(4.0, 4.0, 4.0, BoundaryType::Reflective).unwrap();
        let mut pos = [-0.1, 4.0, 2.0];
        g.confine(&mut pos);
        assert_eq!(pos[0], 0.0);
        assert!(pos[1] < 4.0 && pos[1] > 3.999);
        assert_eq!(pos[2], 2.0);
        assert!(g.contains(pos));
    }

    #[test]
    fn test_mesh_indexing() {
        let g = Geometry::new(3.0, 6.0, 9.0, BoundaryType::Vacuum).unwrap();
        let mesh = Mesh::new(3, &g);
        assert_eq!(mesh.n_cells(), 27);
        assert_eq!(mesh.cell_index([0.5, 0.5, 0.5]), Some(0));
        assert_eq!(mesh.cell_index([1.5, 0.5, 0.5]), Some(1));
        assert_eq!(mesh.cell_index([0.5, 2.5, 0.5]), Some(3));
        assert_eq!(mesh.cell_index([2.9, 5.9, 8.9]), Some(26));
        assert_eq!(mesh.cell_index([below(3.0), 0.0, 0.0]), Some(2));
        assert_eq!(mesh.cell_index([3.0, 1.0, 1.0]), None);
        assert_eq!(mesh.cell_index([1.0, -0.5, 1.0]), None);
        assert_eq!(mesh.cell_index([f64::NAN, 1.0, 1.0]), None);
        assert!((mesh.cell_volume() - 6.0).abs() < 1e-12);
    }
}
