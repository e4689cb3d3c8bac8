//! Monte Carlo k-eigenvalue solver for a homogeneous one-group box.
//!
//! Power iteration over batches of fission generations, with parallel
//! transport into per-worker fission banks, an order-stable bank merge,
//! population-preserving resampling and source convergence diagnostics.

pub mod bank;
pub mod diagnostics;
pub mod eigenvalue;
pub mod error;
pub mod fast_rng;
pub mod fission_bank;
pub mod geometry;
pub mod io;
pub mod keff;
pub mod material;
pub mod model;
pub mod particle;
pub mod physics;
pub mod settings;
pub mod source;
pub mod stats;
pub mod synchronize;
pub mod tally;

pub use bank::Bank;
pub use eigenvalue::{run_eigenvalue, BatchStatus, RunSummary};
pub use error::{Error, Result};
pub use fast_rng::{FastRng, RandomStreams, Stream};
pub use fission_bank::{WorkerArena, WorkerSlot};
pub use geometry::{BoundaryType, Geometry, Mesh};
pub use io::{FileOutput, NullOutput, Output};
pub use keff::{calculate_keff, KeffEstimate, KeffSeries};
pub use material::Material;
pub use model::Model;
pub use particle::Particle;
pub use physics::{OneGroupTransport, Transport};
pub use settings::{OutputSettings, Settings};
pub use source::BoxSource;
pub use synchronize::synchronize_bank;
pub use tally::{Tally, TallyScratch};
