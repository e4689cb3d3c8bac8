use simple_mc::{Model, NullOutput, OneGroupTransport, Output, Result, RunSummary, Settings, Tally};

fn settings(seed: u64) -> Settings {
    Settings {
        particles: 300,
        batches: 5,
        active: 3,
        generations: 2,
        seed,
        threads: Some(2),
        tally: true,
        bins: 4,
        x: 60.0,
        y: 60.0,
        z: 60.0,
        ..Settings::default()
    }
}

fn run(settings: Settings) -> RunSummary {
    let model = Model::from_settings(settings).unwrap();
    model.run_with(&OneGroupTransport, &mut NullOutput).unwrap()
}

#[test]
fn test_same_seed_same_results() {
    let a = run(settings(12345));
    let b = run(settings(12345));

    assert_eq!(a.keff, b.keff);
    assert_eq!(a.entropy, b.entropy);
    assert_eq!(a.statuses, b.statuses);
    assert_eq!(a.source, b.source);
}

#[test]
fn test_different_seeds_differ() {
    let a = run(settings(1));
    let b = run(settings(2));
    assert_ne!(a.keff, b.keff);
    assert_ne!(a.source, b.source);
}

#[test]
fn test_all_values_finite() {
    let summary = run(settings(99));
    assert!(summary.keff.iter().all(|k| k.is_finite() && *k > 0.0));
    assert!(summary.entropy.iter().all(|h| h.is_finite() && *h >= 0.0));
    let estimate = summary.estimate.unwrap();
    assert_eq!(estimate.n, 3);
    assert!(estimate.std_dev.unwrap() >= 0.0);
}

/// Collects the flux of every active batch.
#[derive(Default)]
struct FluxRecord {
    flux: Vec<Vec<f64>>,
}

impl Output for FluxRecord {
    fn tally(&mut self, tally: &Tally) -> Result<()> {
        self.flux.push(tally.flux.clone());
        Ok(())
    }
}

fn single_worker_flux(seed: u64) -> (RunSummary, Vec<Vec<f64>>) {
    let mut settings = Settings {
        threads: Some(1),
        ..settings(seed)
    };
    settings.output.write_tally = true;
    let model = Model::from_settings(settings).unwrap();
    let mut record = FluxRecord::default();
    let summary = model.run_with(&OneGroupTransport, &mut record).unwrap();
    (summary, record.flux)
}

#[test]
fn test_single_worker_tallies_are_identical() {
    let (a, a_flux) = single_worker_flux(4321);
    let (b, b_flux) = single_worker_flux(4321);

    assert_eq!(a_flux.len(), 3);
    assert!(a_flux.iter().all(|f| f.len() == 64 && f.iter().sum::<f64>() > 0.0));
    assert_eq!(a_flux, b_flux);
    assert_eq!(a.keff, b.keff);
    assert_eq!(a.source, b.source);
}
