use rand::Rng;

/// Direction distribution of source particles.
#[derive(Debug, Clone, PartialEq)]
pub enum AngularDistribution {
    Isotropic,
    Monodirectional { reference_uvw: [f64; 3] },
}

impl AngularDistribution {
    /// Every particle travels along `(u, v, w)`, normalised. Panics on a zero vector.
    pub fn new_monodirectional(u: f64, v: f64, w: f64) -> Self {
        let mag = (u * u + v * v + w * w).sqrt();
        assert!(mag > 0.0, "Direction vector cannot be zero");
        Self::Monodirectional {
            reference_uvw: [u / mag, v / mag, w / mag],
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> [f64; 3] {
        match self {
            AngularDistribution::Isotropic => isotropic_direction(rng),
            AngularDistribution::Monodirectional { reference_uvw } => *reference_uvw,
        }
    }
}

impl Default for AngularDistribution {
    fn default() -> Self {
        AngularDistribution::Isotropic
    }
}

/// Sample a direction uniformly on the unit sphere.
pub fn isotropic_direction<R: Rng + ?Sized>(rng: &mut R) -> [f64; 3] {
    let xi1: f64 = rng.gen();
    let xi2: f64 = rng.gen();

    let mu = 2.0 * xi1 - 1.0;
    let phi = 2.0 * std::f64::consts::PI * xi2;
    let s = (1.0 - mu * mu).sqrt();
    [s * phi.cos(), s * phi.sin(), mu]
}
