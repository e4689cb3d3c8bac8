// Particle banks for eigenvalue calculations.
//
// A bank is an ordered run of particle records with a live count and an
// allocated capacity. Capacity only ever grows, and only through `resize`,
// which roughly doubles it. Allocation failure is reported rather than
// aborting the process.

use crate::error::{Error, Result};
use crate::particle::Particle;

/// Ordered collection of particles, used both for the source population and
/// for the fission sites produced during a generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bank {
    sites: Vec<Particle>,
}

impl Bank {
    /// Create an empty bank
    pub fn new() -> Self {
        Bank { sites: Vec::new() }
    }

    /// Create an empty bank with room for at least `capacity` sites
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut sites = Vec::new();
        sites
            .try_reserve_exact(capacity)
            .map_err(|_| Error::BankGrowth { requested: capacity })?;
        Ok(Bank { sites })
    }

    /// Wrap an existing population
    pub fn from_particles(sites: Vec<Particle>) -> Self {
        Bank { sites }
    }

    /// Number of live sites
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Number of allocated slots
    pub fn capacity(&self) -> usize {
        self.sites.capacity()
    }

    /// Grow the capacity, keeping every existing site.
    pub fn resize(&mut self) -> Result<()> {
        let target = (self.capacity() * 2).max(1);
        self.grow_to(target)
    }

    /// Grow until at least `required` sites fit. Never shrinks.
    pub fn ensure_capacity(&mut self, required: usize) -> Result<()> {
        while self.capacity() < required {
            self.resize()?;
        }
        Ok(())
    }

    fn grow_to(&mut self, target: usize) -> Result<()> {
        let additional = target.saturating_sub(self.len());
        self.sites
            .try_reserve_exact(additional)
            .map_err(|_| Error::BankGrowth { requested: target })
    }

    /// Append a site, growing the bank when it is full
    pub fn push(&mut self, particle: Particle) -> Result<()> {
        if self.len() == self.capacity() {
            self.resize()?;
        }
        self.sites.push(particle);
        Ok(())
    }

    /// Append a run of sites, growing the bank if they do not fit
    pub fn extend_from_slice(&mut self, particles: &[Particle]) -> Result<()> {
        self.ensure_capacity(self.len() + particles.len())?;
        self.sites.extend_from_slice(particles);
        Ok(())
    }

    /// Drop every site; the capacity is kept
    pub fn clear(&mut self) {
        self.sites.clear();
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.sites
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.sites
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.sites.iter()
    }

    pub fn into_vec(self) -> Vec<Particle> {
        self.sites
    }
}

impl std::ops::Index<usize> for Bank {
    type Output = Particle;

    fn index(&self, index: usize) -> &Particle {
        &self.sites[index]
    }
}

impl<'a> IntoIterator for &'a Bank {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.sites.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(x: f64) -> Particle {
        Particle::new([x, 0.0, 0.0], [0.0, 0.0, 1.0], 1.0)
    }

    #[test]
    fn test_bank_basic() {
        let mut bank = Bank::new();
        assert!(bank.is_empty());
        assert_eq!(bank.len(), 0);

        bank.push(site(1.0)).unwrap();
        assert_eq!(bank.len(), 1);
        assert!(!bank.is_empty());
        assert_eq!(bank[0].x(), 1.0);
    }

    #[test]
    fn test_bank_with_capacity() {
        let bank = Bank::with_capacity(100).unwrap();
        assert!(bank.is_empty());
        assert!(bank.capacity() >= 100);
    }

    #[test]
    fn test_bank_push_grows_and_keeps_order() {
        let mut bank = Bank::with_capacity(2).unwrap();
        for i in 0..50 {
            bank.push(site(i as f64)).unwrap();
            assert!(bank.len() <= bank.capacity());
        }
        assert_eq!(bank.len(), 50);
        for (i, p) in bank.iter().enumerate() {
            assert_eq!(p.x(), i as f64);
        }
    }

    #[test]
    fn test_bank_resize_preserves_sites() {
        let mut bank = Bank::with_capacity(4).unwrap();
        bank.extend_from_slice(&[site(1.0), site(2.0), site(3.0)]).unwrap();
        let before = bank.capacity();
        bank.resize().unwrap();
        assert!(bank.capacity() >= 2 * before);
        assert_eq!(bank.as_slice(), &[site(1.0), site(2.0), site(3.0)]);
    }

    #[test]
    fn test_bank_clear_keeps_capacity() {
        let mut bank = Bank::new();
        bank.extend_from_slice(&[site(1.0), site(2.0), site(3.0)]).unwrap();
        let capacity = bank.capacity();

        bank.clear();
        assert!(bank.is_empty());
        assert_eq!(bank.capacity(), capacity);
    }

    #[test]
    fn test_bank_ensure_capacity_never_shrinks() {
        let mut bank = Bank::with_capacity(64).unwrap();
        let capacity = bank.capacity();
        bank.ensure_capacity(8).unwrap();
        assert_eq!(bank.capacity(), capacity);
        bank.ensure_capacity(65).unwrap();
        assert!(bank.capacity() >= 65);
    }
}
