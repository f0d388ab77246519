use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tracing::error;
use tracing::info;
use tracing_subscriber::EnvFilter;
use watchlog::Cli;
use watchlog::Client;
use watchlog::ClientConfig;
use watchlog::Error;
use watchlog::EventSink;
use watchlog::Result;
use watchlog::StopGate;
use watchlog::Watcher;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    // Initializing Logs
    init_observability();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(index) = e.store_index() {
                error!("store index: {}", index);
            }
            error!("error when closing: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = cli.load_config()?;
    let mut sink = EventSink::open(&settings.output)?;

    let client = Client::builder(settings.store.endpoints.clone())
        .set_config(ClientConfig::from(&settings.store))
        .build()
        .await
        .map_err(|e| {
            error!("error connecting to etcd: {:?}", e);
            Error::from(e)
        })?;

    let watcher = Watcher::from_config(Arc::new(client), &settings.watch);
    let mut events = watcher.watch();
    info!("watching {} from index {}", settings.watch.path, settings.watch.start_index);

    // Listen on Shutdown Signal
    let gate = watcher.stop_gate();
    tokio::spawn(async move {
        if let Err(e) = graceful_shutdown(gate).await {
            error!("Failed to listen for shutdown signals: {:?}", e);
        }
    });

    while let Some(event) = events.recv().await {
        if let Err(e) = sink.write(&event) {
            watcher.close();
            return Err(e.into());
        }
    }
    sink.flush()?;

    if let Some(e) = watcher.err() {
        return Err(e.into());
    }

    info!("watch closed");
    Ok(())
}

/// Close the gate on SIGINT, SIGTERM or Ctrl+C
async fn graceful_shutdown(gate: StopGate) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    loop {
        tokio::select! {
            _ = sigint.recv() => {
                info!("SIGINT detected.");
            },
            _ = sigterm.recv() => {
                info!("SIGTERM detected.");
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C detected.");
            },
        }
        if !gate.close() {
            info!("watcher already stopping");
        }
    }
}

fn init_observability() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}
