//! `cibmon`: print the CIB, then follow its changes until Ctrl+C.
//!
//! Configuration comes from `Settings::load` (optional TOML file given as the
//! first argument, `CIB_CONFIG_PATH`, `CIB__*` environment variables).

use std::time::Duration;

use cib_client::config::MonitorConfig;
use cib_client::config::Settings;
use cib_client::CibClient;
use cib_client::CibEvent;
use cib_client::DispatchOutcome;
use cib_client::Result;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_observability();

    let config_path = std::env::args().nth(1);
    let settings = Settings::load(config_path.as_deref())?;
    let mut client = CibClient::new(settings.client.clone())?;

    tokio::select! {
        result = monitor(&mut client, &settings.monitor) => {
            if let Err(e) = &result {
                error!(error = %e, "monitor stopped");
            }
            result?;
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }

    if let Err(e) = client.close().await {
        warn!(error = %e, "close failed");
    }
    println!("Exiting program.");
    Ok(())
}

/// Connect, print, subscribe and dispatch; reconnect after every destroy
async fn monitor(
    client: &mut CibClient,
    settings: &MonitorConfig,
) -> Result<()> {
    let delay = Duration::from_millis(settings.reconnect_delay_ms);
    let mut first = true;

    loop {
        if !first {
            tokio::time::sleep(delay).await;
        }
        first = false;

        if let Err(e) = client.connect().await {
            warn!(error = %e, "failed connection to CIB");
            continue;
        }

        let document = client.query().await?;
        if settings.verbose {
            println!("CIB: {document}");
        } else {
            println!("CIB version {}", client.version().await?);
        }

        let verbose = settings.verbose;
        let subscribed = client
            .subscribe(move |event, document| match event {
                CibEvent::Update => {
                    println!();
                    println!("event: {event}");
                    if let (true, Some(document)) = (verbose, document) {
                        println!("cib: {document}");
                    }
                }
                CibEvent::Destroy => warn!("lost connection: {event}"),
            })
            .await;
        if let Err(e) = subscribed {
            warn!(error = %e, "failed to subscribe to CIB");
        }

        while let Some(outcome) = client.dispatch_next().await {
            if outcome == DispatchOutcome::Delivered(CibEvent::Destroy) {
                break;
            }
        }
        info!("reconnecting");
    }
}

fn init_observability() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
