// Resampling of the fission bank into the next generation's source bank.

use crate::bank::Bank;
use crate::error::{Error, Result};
use crate::fast_rng::RandomStreams;

/// Overwrite `source_bank` with a resample of `fission_bank`, keeping the
/// source population size fixed, then empty the fission bank.
///
/// With a surplus of sites (`n_f >= n_s`) this is reservoir sampling: every
/// fission site ends up in the source bank with probability `n_s / n_f` and no
/// site is taken twice. With a deficit every fission site is kept once and the
/// remaining `n_s - n_f` slots are drawn with replacement, so duplicates are
/// expected in that case.
///
/// Random numbers come from whatever stream `rng` currently has active.
pub fn synchronize_bank(
    source_bank: &mut Bank,
    fission_bank: &mut Bank,
    rng: &mut RandomStreams,
) -> Result<()> {
    let n_s = source_bank.len();
    let n_f = fission_bank.len();
    if n_f == 0 {
        return Err(Error::EmptyFissionBank);
    }

    let source = source_bank.as_mut_slice();
    let sites = fission_bank.as_slice();

    if n_f >= n_s {
        // Start from the first n_s sites, then replace slots with decreasing
        // probability so every site ends with the same chance of selection
        source.copy_from_slice(&sites[..n_s]);
        for (i, site) in sites.iter().enumerate().skip(n_s) {
            let j = rng.rni(0, i as u64 + 1) as usize;
            if j < n_s {
                source[j] = *site;
            }
        }
    } else {
        // Sample the shortfall with replacement, then keep every site once
        let n_extra = n_s - n_f;
        for slot in source[..n_extra].iter_mut() {
            let j = rng.rni(0, n_f as u64) as usize;
            *slot = sites[j];
        }
        source[n_extra..].copy_from_slice(sites);
    }

    fission_bank.clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;

    fn numbered(n: usize) -> Bank {
        Bank::from_particles((0..n).map(|i| Particle::at([i as f64, 0.0, 0.0])).collect())
    }

    fn ids(bank: &Bank) -> Vec<usize> {
        bank.iter().map(|p| p.x() as usize).collect()
    }

    #[test]
    fn test_surplus_has_no_duplicates() {
        let mut rng = RandomStreams::new(11);
        let mut source = numbered(50);
        let mut fission = numbered(173);

        synchronize_bank(&mut source, &mut fission, &mut rng).unwrap();

        assert_eq!(source.len(), 50);
        assert!(fission.is_empty());
        let mut selected = ids(&source);
        selected.sort_unstable();
        selected.dedup();
        assert_eq!(selected.len(), 50, "reservoir sampling must not duplicate sites");
        assert!(selected.iter().all(|&i| i < 173));
    }

    #[test]
    fn test_equal_sizes_copies_bank() {
        let mut rng = RandomStreams::new(1);
        let mut source = Bank::from_particles(vec![Particle::at([9.0, 9.0, 9.0]); 20]);
        let mut fission = numbered(20);

        synchronize_bank(&mut source, &mut fission, &mut rng).unwrap();
        assert_eq!(ids(&source), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_deficit_keeps_every_site() {
        let mut rng = RandomStreams::new(5);
        let mut source = numbered(100);
        let mut fission = Bank::from_particles(
            (0..37).map(|i| Particle::at([1000.0 + i as f64, 0.0, 0.0])).collect(),
        );

        synchronize_bank(&mut source, &mut fission, &mut rng).unwrap();

        assert_eq!(source.len(), 100);
        assert!(fission.is_empty());
        let selected = ids(&source);
        // The fission sites fill the tail in their original order
        assert_eq!(&selected[63..], (1000..1037).collect::<Vec<_>>().as_slice());
        // And the head is drawn from the same sites
        assert!(selected[..63].iter().all(|&i| (1000..1037).contains(&i)));
    }

    #[test]
    fn test_single_site_fills_source() {
        let mut rng = RandomStreams::new(5);
        let mut source = numbered(10);
        let mut fission = Bank::from_particles(vec![Particle::at([0.5, 0.5, 0.5])]);

        synchronize_bank(&mut source, &mut fission, &mut rng).unwrap();
        assert!(source.iter().all(|p| p.position == [0.5, 0.5, 0.5]));
    }

    #[test]
    fn test_empty_fission_bank_is_an_error() {
        let mut rng = RandomStreams::new(5);
        let mut source = numbered(10);
        let mut fission = Bank::new();
        assert!(matches!(
            synchronize_bank(&mut source, &mut fission, &mut rng),
            Err(Error::EmptyFissionBank)
        ));
        assert_eq!(source.len(), 10);
    }

    #[test]
    fn test_reservoir_selection_is_uniform() {
        let n_s = 10;
        let n_f = 40;
        let trials = 20_000;
        let mut rng = RandomStreams::new(2024);
        let mut hits = vec![0usize; n_f];

        let mut source = numbered(n_s);
        for _ in 0..trials {
            let mut fission = numbered(n_f);
            synchronize_bank(&mut source, &mut fission, &mut rng).unwrap();
            for i in ids(&source) {
                hits[i] += 1;
            }
        }

        // Expected frequency n_s / n_f = 0.25; binomial sd is about 0.003
        let expected = n_s as f64 / n_f as f64;
        for (i, &h) in hits.iter().enumerate() {
            let freq = h as f64 / trials as f64;
            assert!(
                (freq - expected).abs() < 0.02,
                "site {} selected with frequency {} (expected {})",
                i,
                freq,
                expected
            );
        }
    }
}
