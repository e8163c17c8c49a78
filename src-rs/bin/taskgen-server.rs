use std::process::ExitCode;

use taskgen_rs::api::{ApiServer, AppState};
use taskgen_rs::helpers::{build_text_generator, load_service_config, open_task_database};
use taskgen_rs::logging::init_tracing;
use tracing::{error, info};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = load_service_config();
    init_tracing(cfg.log_json);

    let generator = match build_text_generator(&cfg) {
        Ok(generator) => generator,
        Err(err) => {
            error!(error = %err, "failed to build Gemini client");
            return ExitCode::FAILURE;
        }
    };
    let database = match open_task_database(&cfg) {
        Ok(database) => database,
        Err(err) => {
            error!(error = %err, "failed to open task database");
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::new(generator, database.as_ref().map(|db| db.store()));
    let server = ApiServer::new(cfg.port, state);
    let served = server.start(shutdown_signal()).await;

    if let Some(database) = database {
        if let Err(err) = database.close().await {
            error!(error = %err, "failed to close task database");
        }
    }

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "server error");
            ExitCode::FAILURE
        }
    }
}
