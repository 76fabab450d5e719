use eapol_relay::build_info::BuildInfo;
use eapol_relay::config::{self, Command, RelayConfig};
use eapol_relay::engine::ProxyEngine;
use eapol_relay::error::{RelayError, Result};
use eapol_relay::lock::{InstanceLock, LOCK_NAME};
use eapol_relay::logging;
use std::process;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

fn main() {
    let matches = config::app().get_matches();
    let build = BuildInfo::current();

    let config = match Command::from_matches(&matches) {
        Ok(Command::Version) => {
            println!("{}", build);
            return;
        }
        Ok(Command::Run(config)) => config,
        Err(err) => {
            eprintln!("{}\n\n{}", err, matches.usage());
            process::exit(1);
        }
    };

    if let Err(err) = logging::init(config.log_sink) {
        eprintln!("{}", err);
        process::exit(1);
    }

    if let Err(err) = run(config, build) {
        error!("{}", err);
        process::exit(1);
    }
}

fn run(config: RelayConfig, build: BuildInfo) -> Result<()> {
    let _lock = InstanceLock::acquire(LOCK_NAME)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let engine = ProxyEngine::bind(&config)?;
        info!("eapol-relay {} started", build.version);

        let handle = engine.start();
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res?,
            _ = terminate.recv() => {}
        }

        info!("shutting down");
        handle.shutdown();
        handle.join().await?;
        Ok::<(), RelayError>(())
    })
}
