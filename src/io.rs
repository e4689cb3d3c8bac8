// Output sinks and the binary source snapshot.
//
// The driver decides *when* something is emitted; an `Output` decides where it
// goes. `FileOutput` appends plain-text files, one record per call.

use crate::bank::Bank;
use crate::diagnostics::source_distribution;
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::particle::Particle;
use crate::settings::OutputSettings;
use crate::tally::Tally;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Receiver for everything a run can emit. Every hook defaults to a no-op.
pub trait Output {
    /// Source bank at the start of a batch
    fn bank(&mut self, _bank: &Bank) -> Result<()> {
        Ok(())
    }

    /// Shannon entropy of the source bank after a generation
    fn entropy(&mut self, _entropy: f64) -> Result<()> {
        Ok(())
    }

    /// Mean squared distance of the source bank after a generation
    fn msd(&mut self, _msd: f64) -> Result<()> {
        Ok(())
    }

    /// Source bank after a generation, to be binned on the x-y grid
    fn source(&mut self, _geometry: &Geometry, _bank: &Bank) -> Result<()> {
        Ok(())
    }

    /// Flux tally at the end of an active batch
    fn tally(&mut self, _tally: &Tally) -> Result<()> {
        Ok(())
    }

    /// Active-batch k-effective series at the end of the run
    fn keff(&mut self, _keff: &[f64]) -> Result<()> {
        Ok(())
    }

    /// Final source bank, for restarting a later run
    fn save_source(&mut self, _bank: &Bank) -> Result<()> {
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutput;

impl Output for NullOutput {}

/// Appends each record to the files named in [`OutputSettings`].
#[derive(Debug, Clone)]
pub struct FileOutput {
    files: OutputSettings,
    bins: usize,
    source_path: PathBuf,
}

impl FileOutput {
    pub fn new(files: OutputSettings, bins: usize, source_path: PathBuf) -> Self {
        Self {
            files,
            bins,
            source_path,
        }
    }
}

fn append(path: &Path) -> Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    Ok(BufWriter::new(file))
}

fn write_with<F>(path: &Path, f: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let mut writer = append(path)?;
    f(&mut writer)
        .and_then(|_| writer.flush())
        .map_err(|e| Error::io(path, e))
}

impl Output for FileOutput {
    fn bank(&mut self, bank: &Bank) -> Result<()> {
        write_with(&self.files.bank_file, |w| {
            for p in bank {
                write!(w, "{:.10} {:.10} ", p.x(), p.y())?;
            }
            writeln!(w)
        })
    }

    fn entropy(&mut self, entropy: f64) -> Result<()> {
        write_with(&self.files.entropy_file, |w| writeln!(w, "{:.10}", entropy))
    }

    fn msd(&mut self, msd: f64) -> Result<()> {
        write_with(&self.files.msd_file, |w| writeln!(w, "{:.10}", msd))
    }

    fn source(&mut self, geometry: &Geometry, bank: &Bank) -> Result<()> {
        let n = self.bins.max(1);
        let dist = source_distribution(geometry, bank, n)?;
        write_with(&self.files.source_file, |w| {
            for i in 0..n {
                for j in 0..n {
                    write!(w, "{:e} ", dist[i + n * j])?;
                }
                writeln!(w)?;
            }
            Ok(())
        })
    }

    fn tally(&mut self, tally: &Tally) -> Result<()> {
        let n = tally.n();
        write_with(&self.files.tally_file, |w| {
            // One n×n block per z plane
            for k in 0..n {
                for i in 0..n {
                    for j in 0..n {
                        write!(w, "{:e} ", tally.get(i, j, k))?;
                    }
                    writeln!(w)?;
                }
                writeln!(w)?;
            }
            Ok(())
        })
    }

    fn keff(&mut self, keff: &[f64]) -> Result<()> {
        write_with(&self.files.keff_file, |w| {
            for k in keff {
                writeln!(w, "{:.10}", k)?;
            }
            Ok(())
        })
    }

    fn save_source(&mut self, bank: &Bank) -> Result<()> {
        save_source(&self.source_path, bank)
    }
}

/// Write a source bank as a length-prefixed binary particle array.
pub fn save_source<P: AsRef<Path>>(path: P, bank: &Bank) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, bank.as_slice())?;
    writer.flush().map_err(|e| Error::io(path, e))
}

/// Read a source bank written by [`save_source`]. The snapshot must hold
/// exactly `expected` particles.
pub fn load_source<P: AsRef<Path>>(path: P, expected: usize) -> Result<Bank> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let particles: Vec<Particle> = bincode::deserialize_from(BufReader::new(file))?;
    if particles.len() != expected {
        return Err(Error::SourceSizeMismatch {
            expected,
            found: particles.len(),
        });
    }
    Ok(Bank::from_particles(particles))
}
