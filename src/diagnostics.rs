// Source convergence diagnostics.
//
// These look only at particle positions, never at transport physics, so they
// can be evaluated on any bank.

use crate::bank::Bank;
use crate::error::{Error, Result};
use crate::geometry::{Geometry, Mesh};

/// Number of mesh cells per axis used for the entropy of a bank of `n` sites:
/// `ceil(cbrt(n / 20))` with `n / 20` truncated, at least one.
pub fn entropy_mesh_size(n: usize) -> usize {
    let m = ((n / 20) as f64).cbrt().ceil() as usize;
    m.max(1)
}

/// Shannon entropy (base 2) of the spatial distribution of a bank.
///
/// Sites are binned on a cubic mesh whose resolution follows the bank size
/// (see [`entropy_mesh_size`]), so values are comparable between runs with the
/// same population. Every site must lie inside the geometry.
pub fn shannon_entropy(geometry: &Geometry, bank: &Bank) -> Result<f64> {
    let n = bank.len();
    if n == 0 {
        return Ok(0.0);
    }

    let mesh = Mesh::new(entropy_mesh_size(n), geometry);
    let mut count = vec![0u64; mesh.n_cells()];
    for p in bank {
        let i = mesh
            .cell_index(p.position)
            .ok_or(Error::OutsideMesh { position: p.position })?;
        count[i] += 1;
    }

    let total = n as f64;
    let h = count
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let f = c as f64 / total;
            -f * f.log2()
        })
        .sum::<f64>();
    Ok(h)
}

/// Mean squared distance between all unordered pairs of sites.
///
/// Quadratic in the bank size. Returns None for fewer than two sites.
pub fn mean_squared_distance(bank: &Bank) -> Option<f64> {
    let n = bank.len();
    if n < 2 {
        return None;
    }

    let sites = bank.as_slice();
    let mut msd = 0.0;
    for (i, p) in sites.iter().enumerate() {
        for q in &sites[i + 1..] {
            msd += p.distance_squared(q);
        }
    }

    let n_pairs = (n * (n - 1) / 2) as f64;
    Some(msd / n_pairs)
}

/// Fraction of the bank in each cell of an `n_bins` × `n_bins` grid over the
/// x-y extent of the geometry, flattened as `ix + n_bins * iy`.
pub fn source_distribution(geometry: &Geometry, bank: &Bank, n_bins: usize) -> Result<Vec<f64>> {
    let mesh = Mesh::new(n_bins, geometry);
    let n = mesh.n;
    let mut dist = vec![0.0; n * n];
    if bank.is_empty() {
        return Ok(dist);
    }

    for p in bank {
        let outside = || Error::OutsideMesh { position: p.position };
        let ix = mesh.axis_index(p.x(), 0).ok_or_else(outside)?;
        let iy = mesh.axis_index(p.y(), 1).ok_or_else(outside)?;
        dist[ix + n * iy] += 1.0;
    }

    let total = bank.len() as f64;
    dist.iter_mut().for_each(|d| *d /= total);
    Ok(dist)
}
