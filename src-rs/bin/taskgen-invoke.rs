use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use taskgen_rs::api::function::{self, FunctionEvent, FunctionName};
use taskgen_rs::api::AppState;
use taskgen_rs::helpers::{build_text_generator, load_service_config, open_task_database};
use taskgen_rs::logging::init_tracing;
use tracing::error;

/// Run one serverless-function invocation: read an event, print the response.
#[derive(Debug, Parser)]
#[command(name = "taskgen-invoke", version)]
struct Cli {
    /// Function to invoke (`gemini` or `tasks`).
    function: FunctionName,

    /// Event JSON file. Reads stdin when omitted.
    #[arg(long, short)]
    event: Option<PathBuf>,
}

fn read_event(path: Option<&PathBuf>) -> Result<FunctionEvent, String> {
    let raw = match path {
        Some(path) => {
            fs::read_to_string(path).map_err(|err| format!("{}: {}", path.display(), err))?
        }
        None => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .map_err(|err| format!("stdin: {}", err))?;
            raw
        }
    };
    serde_json::from_str(&raw).map_err(|err| format!("invalid event: {}", err))
}

async fn run(cli: Cli) -> Result<(), String> {
    let cfg = load_service_config();
    init_tracing(cfg.log_json);

    let event = read_event(cli.event.as_ref())?;
    let generator = build_text_generator(&cfg).map_err(|err| err.to_string())?;
    let database = open_task_database(&cfg).map_err(|err| err.to_string())?;
    let state = AppState::new(generator, database.as_ref().map(|db| db.store()));

    let resp = function::invoke(&state, cli.function, event).await;

    if let Some(database) = database {
        database.close().await.map_err(|err| err.to_string())?;
    }
    let rendered = serde_json::to_string_pretty(&resp).map_err(|err| err.to_string())?;
    println!("{}", rendered);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "invocation failed");
            ExitCode::FAILURE
        }
    }
}
