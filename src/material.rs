/// One-group macroscopic cross sections of the homogeneous fissile medium.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Fission cross section (1/cm)
    pub xs_f: f64,
    /// Absorption cross section (1/cm), fission included
    pub xs_a: f64,
    /// Scattering cross section (1/cm)
    pub xs_s: f64,
    /// Average number of neutrons released per fission
    pub nu: f64,
}

impl Material {
    pub fn new(xs_f: f64, xs_a: f64, xs_s: f64, nu: f64) -> Result<Self, String> {
        if xs_f < 0.0 || xs_a < 0.0 || xs_s < 0.0 {
            return Err("Macroscopic cross section values cannot be negative".to_string());
        }
        if xs_f > xs_a {
            return Err(format!(
                "Fission cross section {} cannot exceed absorption cross section {}",
                xs_f, xs_a
            ));
        }
        if nu < 0.0 {
            return Err("Average number of fission neutrons produced cannot be negative".to_string());
        }
        Ok(Self { xs_f, xs_a, xs_s, nu })
    }

    /// Total cross section
    pub fn xs_t(&self) -> f64 {
        self.xs_a + self.xs_s
    }

    /// Infinite-medium multiplication factor, nu * Σf / Σa
    pub fn k_infinity(&self) -> f64 {
        if self.xs_a == 0.0 {
            return 0.0;
        }
        self.nu * self.xs_f / self.xs_a
    }
}
