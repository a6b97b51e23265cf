use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use zevermon::cli::{Args, Command};
use zevermon::fetcher::HttpFetcher;
use zevermon::monitor::DeviceMonitor;
use zevermon::probe::probe;
use zevermon::runtime::PollLoop;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.load_config().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    if args.command() == Command::Probe {
        let fetcher = HttpFetcher::new(&config.device.base_url, config.device.timeout())?;
        let outcome = probe(&fetcher).await;
        println!("{}", outcome);
        if !outcome.is_ready() {
            std::process::exit(1);
        }
        return Ok(());
    }

    zevermon::logging::init_logging(&config.logging)?;
    info!(
        "zevermon {} starting; polling {} every {}s",
        zevermon::runtime::APP_VERSION,
        config.device.base_url,
        config.poll_interval_secs
    );

    let monitor = DeviceMonitor::from_config(&config)?;
    let mut poll_loop = PollLoop::new(monitor, config.poll_interval());

    #[cfg(feature = "web")]
    let web_task = config.web.enabled.then(|| {
        let snapshot_rx = poll_loop.subscribe();
        let host = config.web.host.clone();
        let port = config.web.port;
        tokio::spawn(async move {
            if let Err(e) = zevermon::web::serve(snapshot_rx, &host, port).await {
                error!("{}", e);
            }
        })
    });

    poll_loop
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await;

    #[cfg(feature = "web")]
    if let Some(task) = web_task {
        task.abort();
    }

    info!("zevermon shutdown complete");
    Ok(())
}
