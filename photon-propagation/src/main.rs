use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use photolib_common::{
    init_tracer,
    metrics::{component_info_metric, describe_propagation_metrics},
    tracer::TracerOptions,
};
use photon_propagation::{
    PhotonLibrary, RunParameters, Runner, StreamSeeds, VisibilityProvider,
    event_file::{EventFile, RunOutput},
};
use std::{
    fs::File,
    io::{BufWriter, Write},
    net::SocketAddr,
    path::PathBuf,
};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Run configuration document (JSON)
    #[clap(long)]
    config: PathBuf,

    /// Photon library document (JSON)
    #[clap(long)]
    library: PathBuf,

    /// Event document holding the labelled deposit sources of each event (JSON)
    #[clap(long)]
    events: PathBuf,

    /// Where to write the results, stdout if not given
    #[clap(long)]
    output: Option<PathBuf>,

    /// Seed of the emission time stream
    #[clap(long, env, default_value = "0")]
    time_seed: u64,

    /// Seed of the photon count stream
    #[clap(long, env, default_value = "0")]
    count_seed: u64,

    /// Propagate events concurrently. Each event then owns a stream pair derived
    /// from the seeds and its event number, so results differ from a sequential run.
    #[clap(long)]
    parallel: bool,

    /// Include every photon in the output, not only per-channel counts
    #[clap(long)]
    full_photons: bool,

    /// If given, serve Prometheus metrics on this address for the duration of the run
    #[clap(long, env)]
    observability_address: Option<SocketAddr>,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let tracer = init_tracer!(TracerOptions::default());

    if let Some(address) = args.observability_address {
        PrometheusBuilder::new()
            .with_http_listener(address)
            .install()
            .with_context(|| format!("Cannot serve metrics on {address}"))?;
        info!("Serving metrics on {address}");
    }
    component_info_metric("photon-propagation");
    describe_propagation_metrics();

    // Configuration errors stop the run before any event is processed
    let run_parameters = RunParameters::load(&args.config)
        .with_context(|| format!("Cannot load run parameters from {}", args.config.display()))?;
    let parameters = run_parameters
        .validate()
        .context("Invalid run parameters")?;
    let library = PhotonLibrary::load(&args.library)
        .with_context(|| format!("Cannot load photon library from {}", args.library.display()))?;
    let event_file = EventFile::load(&args.events)
        .with_context(|| format!("Cannot load events from {}", args.events.display()))?;
    let events = event_file.select_sources(&run_parameters.deposit_sources)?;

    info!(
        "{}: propagating {} events over {} channels",
        tracer.service_name(),
        events.len(),
        library.channel_count()
    );

    let runner = Runner::new(
        &parameters,
        &library,
        &run_parameters.yield_calculator,
        StreamSeeds::new(args.time_seed, args.count_seed),
    )
    .with_full_photons(args.full_photons);
    let (outputs, summary) = if args.parallel {
        info!("Parallel mode: each event uses its own derived stream pair");
        runner.parallel(&events)
    } else {
        runner.sequential(&events)
    };

    info!(
        "Propagated {} deposits into {} photons",
        summary.deposits, summary.photons
    );
    if summary.skipped() > 0 {
        warn!(
            "{} deposits had no usable visibility and produced no light",
            summary.skipped()
        );
    }
    if summary.timing_retries_exhausted > 0 {
        warn!(
            "{} emission times hit the rejection retry limit",
            summary.timing_retries_exhausted
        );
    }

    let output = RunOutput {
        summary,
        events: outputs,
    };
    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Cannot create output file {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    serde_json::to_writer_pretty(&mut writer, &output)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
