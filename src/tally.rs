use crate::geometry::{Geometry, Mesh};

/// Flux tally on a regular n×n×n mesh covering the geometry.
///
/// Workers never touch `flux` directly: each one records collisions in its
/// own [`TallyScratch`], and the scratches are folded in with [`Tally::reduce`]
/// after the parallel region. Scratch counts are integers, so the reduced
/// flux does not depend on how particles were split across workers.
#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    pub mesh: Mesh,
    pub flux: Vec<f64>,
    /// Scores are only recorded while this is set
    pub active: bool,
}

impl Tally {
    pub fn new(n: usize, geometry: &Geometry) -> Self {
        let mesh = Mesh::new(n, geometry);
        let flux = vec![0.0; mesh.n_cells()];
        Self {
            mesh,
            flux,
            active: false,
        }
    }

    /// Number of mesh cells along each axis
    pub fn n(&self) -> usize {
        self.mesh.n
    }

    /// Fresh per-worker accumulator matching this tally's mesh
    pub fn scratch(&self) -> TallyScratch {
        TallyScratch {
            counts: vec![0; self.mesh.n_cells()],
        }
    }

    /// Add every scratch into the flux, each count weighted by `norm`, and
    /// zero the scratches.
    pub fn reduce<'a, I>(&mut self, scratches: I, norm: f64)
    where
        I: IntoIterator<Item = &'a mut TallyScratch>,
    {
        let mut totals = vec![0u64; self.flux.len()];
        for scratch in scratches {
            for (total, count) in totals.iter_mut().zip(scratch.counts.iter_mut()) {
                *total += *count;
                *count = 0;
            }
        }
        for (flux, total) in self.flux.iter_mut().zip(totals) {
            if total > 0 {
                *flux += total as f64 * norm;
            }
        }
    }

    /// Zero the flux
    pub fn reset(&mut self) {
        self.flux.iter_mut().for_each(|f| *f = 0.0);
    }

    /// Flux in cell (i, j, k)
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        let n = self.mesh.n;
        self.flux[i + n * j + n * n * k]
    }

    pub fn total(&self) -> f64 {
        self.flux.iter().sum()
    }
}

/// Collision counts gathered by one worker during a generation.
#[derive(Debug, Clone, PartialEq)]
pub struct TallyScratch {
    counts: Vec<u64>,
}

impl TallyScratch {
    /// Record one collision at `position`. Positions off the mesh are ignored.
    #[inline]
    pub fn score(&mut self, mesh: &Mesh, position: [f64; 3]) {
        if let Some(i) = mesh.cell_index(position) {
            self.counts[i] += 1;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}
