use simple_mc::{Model, Settings};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run() {
        eprintln!("ERROR: {e}");
        process::exit(1);
    }
}

fn run() -> simple_mc::Result<()> {
    // Optional JSON settings file; built-in defaults otherwise
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::from_json_file(path)?,
        None => Settings::default(),
    };
    println!("{settings}");

    let model = Model::from_settings(settings)?;
    let summary = model.run()?;
    if let Some(estimate) = summary.estimate {
        println!("k-effective: {estimate}");
    }
    Ok(())
}
