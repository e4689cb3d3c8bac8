// Power iteration on the fission source.
//
// Each batch runs `generations` generations. A generation transports every
// source particle in parallel, merges the per-worker fission banks, resamples
// them into a fixed-size source bank and evaluates the convergence
// diagnostics. Particle `p` of generation `g` in batch `b` draws from history
// `(b * generations + g) * particles + p` of the track stream, and particles
// are handed to workers in contiguous chunks merged back in order, so results
// do not depend on the worker count.

use crate::bank::Bank;
use crate::diagnostics::{mean_squared_distance, shannon_entropy};
use crate::error::{Error, Result};
use crate::fast_rng::{RandomStreams, Stream};
use crate::fission_bank::WorkerArena;
use crate::geometry::Geometry;
use crate::io::Output;
use crate::keff::{KeffEstimate, KeffSeries};
use crate::material::Material;
use crate::physics::Transport;
use crate::settings::Settings;
use crate::synchronize::synchronize_bank;
use crate::tally::Tally;
use rayon::prelude::*;
use std::fmt;
use tracing::{debug, info, warn};

/// What is reported at the end of every batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchStatus {
    /// 1-based batch number
    pub batch: usize,
    /// Entropy of the source bank after the batch's last generation
    pub entropy: f64,
    pub keff: f64,
    /// Running estimate over the active batches so far
    pub estimate: Option<KeffEstimate>,
}

impl BatchStatus {
    pub fn header() -> String {
        format!("{:<15} {:<15} {:<15} {}", "BATCH", "ENTROPY", "KEFF", "MEAN KEFF")
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<15} {:<15.6} {:<15.6}", self.batch, self.entropy, self.keff)?;
        if let Some(estimate) = &self.estimate {
            write!(f, " {}", estimate)?;
        }
        Ok(())
    }
}

/// Results of a complete eigenvalue run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// k-effective of every active batch, in order
    pub keff: Vec<f64>,
    pub statuses: Vec<BatchStatus>,
    /// Final estimate; None when no batch was active
    pub estimate: Option<KeffEstimate>,
    /// Entropy after every generation of every batch
    pub entropy: Vec<f64>,
    /// Source bank left by the last generation
    pub source: Bank,
}

/// Run the batch loop on `source`, which must hold exactly
/// `settings.particles` sites.
///
/// Any error from transport, resampling or an output sink ends the run.
pub fn run_eigenvalue<T, O>(
    settings: &Settings,
    geometry: &Geometry,
    material: &Material,
    transport: &T,
    output: &mut O,
    mut source: Bank,
    tally: &mut Tally,
) -> Result<RunSummary>
where
    T: Transport + ?Sized,
    O: Output + ?Sized,
{
    let n_particles = settings.particles;
    let n_generations = settings.generations;
    if source.len() != n_particles {
        return Err(Error::SourceSizeMismatch {
            expected: n_particles,
            found: source.len(),
        });
    }

    let n_workers = settings.threads.unwrap_or_else(rayon::current_num_threads).max(1);
    let pool = rayon::ThreadPoolBuilder::new().num_threads(n_workers).build()?;
    let mut arena = WorkerArena::for_particles(n_workers, n_particles, tally)?;
    let chunk = n_particles.div_ceil(n_workers);

    // Histories 0..n_particles of the other stream belong to the initial source
    let mut resample_rng = RandomStreams::new(settings.seed);
    resample_rng.set_stream(Stream::Other);
    resample_rng.rn_skip(n_particles as u64);

    let mut track_rng = RandomStreams::new(settings.seed);
    track_rng.set_stream(Stream::Track);

    let xs_t = material.xs_t();
    let norm = if xs_t > 0.0 {
        1.0 / (xs_t * tally.mesh.cell_volume() * (n_particles * n_generations) as f64)
    } else {
        0.0
    };

    let first_active = settings.first_active_batch();
    let mut series = KeffSeries::with_capacity(settings.active);
    let mut statuses = Vec::with_capacity(settings.batches);
    let mut entropies = Vec::with_capacity(settings.batches * n_generations);

    info!(
        "Running {} batches of {} particles on {} workers",
        settings.batches, n_particles, n_workers
    );
    info!("{}", BatchStatus::header());

    for b in 0..settings.batches {
        if settings.output.write_bank {
            output.bank(&source)?;
        }

        let active = b >= first_active;
        if active && settings.tally {
            tally.active = true;
        }

        let mut keff_sum = 0.0;
        let mut entropy = 0.0;

        for g in 0..n_generations {
            let offset = ((b * n_generations + g) * n_particles) as u64;
            let sites = source.as_slice();
            let shared: &Tally = &*tally;

            pool.install(|| {
                arena
                    .slots_mut()
                    .par_iter_mut()
                    .enumerate()
                    .try_for_each(|(w, slot)| -> Result<()> {
                        let start = (w * chunk).min(n_particles);
                        let end = (start + chunk).min(n_particles);
                        for (p, particle) in sites[start..end].iter().enumerate() {
                            let mut rng = track_rng;
                            rng.rn_skip(offset + (start + p) as u64);
                            transport.transport(*particle, geometry, material, shared, &mut rng, slot)?;
                        }
                        Ok(())
                    })
            })?;

            if tally.active {
                tally.reduce(arena.slots_mut().iter_mut().map(|s| &mut s.tally), norm);
            }

            let n_sites = arena.merge()?;
            let keff_gen = n_sites as f64 / source.len() as f64;
            keff_sum += keff_gen;

            synchronize_bank(&mut source, arena.primary_mut(), &mut resample_rng)?;

            entropy = shannon_entropy(geometry, &source)?;
            entropies.push(entropy);
            debug!(batch = b + 1, generation = g + 1, n_sites, keff = keff_gen, entropy);

            if settings.output.write_entropy {
                output.entropy(entropy)?;
            }
            if settings.output.write_msd {
                match mean_squared_distance(&source) {
                    Some(msd) => output.msd(msd)?,
                    None => warn!("Mean squared distance needs at least two sites, skipping"),
                }
            }
            if settings.output.write_source {
                output.source(geometry, &source)?;
            }
        }

        let keff = keff_sum / n_generations as f64;
        if active {
            series.push(keff);
        }

        if tally.active {
            if settings.output.write_tally {
                output.tally(tally)?;
            }
            tally.reset();
        }

        let status = BatchStatus {
            batch: b + 1,
            entropy,
            keff,
            estimate: series.estimate()?,
        };
        info!("{}", status);
        statuses.push(status);
    }

    if settings.output.write_keff {
        output.keff(series.values())?;
    }
    if settings.save_source {
        output.save_source(&source)?;
    }

    let estimate = series.estimate()?;
    if let Some(estimate) = &estimate {
        info!("Final k-effective: {}", estimate);
    }

    Ok(RunSummary {
        keff: series.into_vec(),
        statuses,
        estimate,
        entropy: entropies,
        source,
    })
}
