use serde::{Deserialize, Serialize};

/// A neutron: a source site, a fission site or a history in flight.
///
/// Particles are plain values; banks copy them wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: [f64; 3],
    pub direction: [f64; 3],
    pub energy: f64,
    pub alive: bool,
}

impl Particle {
    pub fn new(position: [f64; 3], direction: [f64; 3], energy: f64) -> Self {
        Self {
            position,
            direction,
            energy,
            alive: true,
        }
    }

    /// Particle at `position` with a default direction, used for sites whose
    /// direction is irrelevant.
    pub fn at(position: [f64; 3]) -> Self {
        Self::new(position, [0.0, 0.0, 1.0], 1.0)
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.position[0]
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.position[1]
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.position[2]
    }

    /// Move the particle along its direction by `distance`.
    pub fn move_by(&mut self, distance: f64) {
        for i in 0..3 {
            self.position[i] += distance * self.direction[i];
        }
    }

    /// Squared distance between two particles.
    pub fn distance_squared(&self, other: &Particle) -> f64 {
        let dx = self.x() - other.x();
        let dy = self.y() - other.y();
        let dz = self.z() - other.z();
        dx * dx + dy * dy + dz * dz
    }
}
