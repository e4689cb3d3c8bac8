use crate::error::{Error, Result};
use crate::geometry::BoundaryType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Which diagnostics and results are written, and where.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub write_tally: bool,
    pub write_entropy: bool,
    pub write_msd: bool,
    pub write_keff: bool,
    pub write_bank: bool,
    pub write_source: bool,
    pub tally_file: PathBuf,
    pub entropy_file: PathBuf,
    pub msd_file: PathBuf,
    pub keff_file: PathBuf,
    pub bank_file: PathBuf,
    pub source_file: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            write_tally: false,
            write_entropy: false,
            write_msd: false,
            write_keff: false,
            write_bank: false,
            write_source: false,
            tally_file: PathBuf::from("tally.dat"),
            entropy_file: PathBuf::from("entropy.dat"),
            msd_file: PathBuf::from("msd.dat"),
            keff_file: PathBuf::from("keff.dat"),
            bank_file: PathBuf::from("bank.dat"),
            source_file: PathBuf::from("source.dat"),
        }
    }
}

/// Run configuration. Read-only once validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Source particles per generation
    pub particles: usize,
    pub batches: usize,
    /// Trailing batches that contribute to k-effective and tallies
    pub active: usize,
    pub generations: usize,
    pub seed: u64,
    /// Worker count; defaults to the size of the global rayon pool
    pub threads: Option<usize>,
    pub boundary: BoundaryType,
    /// Accumulate the mesh flux tally during active batches
    pub tally: bool,
    /// Mesh cells per axis for the flux tally and the source distribution
    pub bins: usize,
    pub nu: f64,
    pub xs_f: f64,
    pub xs_a: f64,
    pub xs_s: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Start from a saved binary source bank instead of sampling one
    pub load_source: bool,
    /// Save the final source bank for a later restart
    pub save_source: bool,
    pub source_path: PathBuf,
    pub output: OutputSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            particles: 10_000,
            batches: 10,
            active: 5,
            generations: 1,
            seed: 1,
            threads: None,
            boundary: BoundaryType::Reflective,
            tally: false,
            bins: 16,
            nu: 2.5,
            xs_f: 0.012,
            xs_a: 0.03,
            xs_s: 0.27,
            x: 400.0,
            y: 400.0,
            z: 400.0,
            load_source: false,
            save_source: false,
            source_path: PathBuf::from("source.bin"),
            output: OutputSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing keys take their default value.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let settings: Settings = serde_json::from_reader(BufReader::new(file))?;
        Ok(settings)
    }

    /// Index of the first active batch
    pub fn first_active_batch(&self) -> usize {
        self.batches.saturating_sub(self.active)
    }

    /// Check every value is usable before a run starts.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| -> Result<()> { Err(Error::InvalidSettings(msg.to_string())) };

        if self.particles < 1 {
            return invalid("Number of particles must be greater than 0");
        }
        if self.batches < 1 || self.generations < 1 {
            return invalid("Must have at least one batch and one generation");
        }
        if self.active > self.batches {
            return invalid("Number of active batches cannot be greater than number of batches");
        }
        if self.threads == Some(0) {
            return invalid("Number of threads must be greater than 0");
        }
        if (self.tally || self.output.write_source) && self.bins < 1 {
            return invalid("Number of bins must be greater than 0");
        }
        if self.nu < 0.0 {
            return invalid("Average number of fission neutrons produced cannot be negative");
        }
        if !(self.x > 0.0 && self.y > 0.0 && self.z > 0.0) {
            return invalid("Length of domain must be positive in x, y and z dimension");
        }
        if self.xs_f < 0.0 || self.xs_a < 0.0 || self.xs_s < 0.0 {
            return invalid("Macroscopic cross section values cannot be negative");
        }
        if self.xs_f > self.xs_a {
            return invalid("Fission cross section cannot exceed absorption cross section");
        }
        if self.boundary != BoundaryType::Vacuum && self.xs_a <= 0.0 {
            // Nothing would ever end a history in a closed, non-absorbing box
            return invalid("Absorption cross section must be positive unless boundaries are vacuum");
        }
        Ok(())
    }
}

const BORDER_WIDTH: usize = 80;

/// Integer with comma thousands separators, e.g. 1,234,567
pub fn fancy_int(a: usize) -> String {
    let digits = a.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Banner line used around the input summary
pub fn border() -> String {
    "=".repeat(BORDER_WIDTH)
}

/// `s` centred in a field of `width` columns
pub fn center(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(s.len()) / 2 + 1;
    format!("{}{}", " ".repeat(pad), s)
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let threads = self
            .threads
            .map(|t| t.to_string())
            .unwrap_or_else(|| "auto".to_string());
        writeln!(f, "{}", border())?;
        writeln!(f, "{}", center("INPUT SUMMARY", BORDER_WIDTH - 1))?;
        writeln!(f, "{}", border())?;
        writeln!(f, "Number of particles:            {}", fancy_int(self.particles))?;
        writeln!(f, "Number of batches:              {}", self.batches)?;
        writeln!(f, "Number of active batches:       {}", self.active)?;
        writeln!(f, "Number of generations:          {}", self.generations)?;
        writeln!(f, "Boundary conditions:            {}", self.boundary)?;
        writeln!(f, "Number of threads:              {}", threads)?;
        writeln!(f, "RNG seed:                       {}", self.seed)?;
        write!(f, "{}", border())
    }
}
