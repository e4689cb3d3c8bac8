use crate::bank::Bank;
use crate::eigenvalue::{run_eigenvalue, RunSummary};
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::io::{load_source, FileOutput, Output};
use crate::material::Material;
use crate::physics::{OneGroupTransport, Transport};
use crate::settings::Settings;
use crate::source::BoxSource;
use crate::tally::Tally;
use tracing::info;

/// A validated problem: run settings plus the box and its material.
#[derive(Debug, Clone)]
pub struct Model {
    pub settings: Settings,
    pub geometry: Geometry,
    pub material: Material,
    pub source: BoxSource,
}

impl Model {
    /// Validate `settings` and build the geometry and material they describe.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let geometry = Geometry::new(settings.x, settings.y, settings.z, settings.boundary)
            .map_err(Error::InvalidSettings)?;
        let material = Material::new(settings.xs_f, settings.xs_a, settings.xs_s, settings.nu)
            .map_err(Error::InvalidSettings)?;
        Ok(Self {
            settings,
            geometry,
            material,
            source: BoxSource::new(),
        })
    }

    /// Starting source bank: the saved snapshot if requested, otherwise
    /// sampled uniformly in the box.
    pub fn initial_source(&self) -> Result<Bank> {
        if self.settings.load_source {
            info!("Loading source bank from {}", self.settings.source_path.display());
            load_source(&self.settings.source_path, self.settings.particles)
        } else {
            self.source
                .sample_bank(&self.geometry, self.settings.particles, self.settings.seed)
        }
    }

    /// Run with one-group transport, writing results to the configured files.
    pub fn run(&self) -> Result<RunSummary> {
        let mut output = FileOutput::new(
            self.settings.output.clone(),
            self.settings.bins,
            self.settings.source_path.clone(),
        );
        self.run_with(&OneGroupTransport, &mut output)
    }

    /// Run with any transport kernel and output sink.
    pub fn run_with<T, O>(&self, transport: &T, output: &mut O) -> Result<RunSummary>
    where
        T: Transport + ?Sized,
        O: Output + ?Sized,
    {
        let source = self.initial_source()?;
        let mut tally = Tally::new(self.settings.bins.max(1), &self.geometry);
        run_eigenvalue(
            &self.settings,
            &self.geometry,
            &self.material,
            transport,
            output,
            source,
            &mut tally,
        )
    }
}
