use crate::bank::Bank;
use crate::error::Result;
use crate::fast_rng::{RandomStreams, Stream};
use crate::geometry::{below, Geometry};
use crate::particle::Particle;
use crate::stats::AngularDistribution;

/// Initial source spread uniformly through the box.
#[derive(Debug, Clone)]
pub struct BoxSource {
    pub angle: AngularDistribution,
    pub energy: f64,
}

impl BoxSource {
    pub fn new() -> Self {
        Self {
            angle: AngularDistribution::Isotropic,
            energy: 1.0,
        }
    }

    /// Sample one source particle
    pub fn sample<R: rand::Rng + ?Sized>(&self, geometry: &Geometry, rng: &mut R) -> Particle {
        let mut position = [0.0; 3];
        for (p, l) in position.iter_mut().zip(geometry.extents()) {
            let xi: f64 = rng.gen();
            *p = (xi * l).min(below(l));
        }
        let direction = self.angle.sample(rng);
        Particle::new(position, direction, self.energy)
    }

    /// Sample a bank of `n` particles.
    ///
    /// Particle `i` is drawn from history `i` of the `Other` stream, so the
    /// bank depends only on the seed and `n`.
    pub fn sample_bank(&self, geometry: &Geometry, n: usize, seed: u64) -> Result<Bank> {
        let mut bank = Bank::with_capacity(n)?;
        let mut streams = RandomStreams::new(seed);
        streams.set_stream(Stream::Other);
        for i in 0..n {
            streams.rn_skip(i as u64);
            bank.push(self.sample(geometry, streams.rng()))?;
        }
        Ok(bank)
    }
}

impl Default for BoxSource {
    fn default() -> Self {
        Self::new()
    }
}
