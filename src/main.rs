use anyhow::{anyhow, Result};
use serde::Serialize;
use std::io::Read;
use tracing_subscriber::EnvFilter;

use item_import::commands;
use item_import::config::{data_dir, load_settings, DB_FILE_NAME};
use item_import::db::Database;
use item_import::services::state::AppState;

const USAGE: &str = "usage: item-import <command>

commands:
  import <file>              import a .csv/.tsv/.txt/.xlsx/.xls file
  paste                      import pasted text read from stdin
  check <file>               parse and validate without sending anything
  template <out.csv>         write the import template
  settings                   show settings
  settings set <key> <value> store a setting (api_base_url, user_id, auth_token, inbox_folder)
  test-connection            check that the backend accepts the token
  history [limit]            list recent imports
  run <id>                   show one import with its batches
  scan                       import every file in the inbox folder
  watch                      import inbox files as they arrive";

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("item_import=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_state() -> Result<AppState> {
    let dir = data_dir()?;
    std::fs::create_dir_all(&dir)?;
    let db = Database::new(&dir.join(DB_FILE_NAME))?;
    let settings = load_settings(&db);
    Ok(AppState::new(db, settings))
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = run(args).await {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

async fn run(args: Vec<String>) -> Result<()> {
    let arg = |idx: usize| args.get(idx).cloned().ok_or_else(|| anyhow!(USAGE));
    let command = arg(0)?;

    match command.as_str() {
        "check" => return print_json(&commands::import::check_file(arg(1)?).map_err(|e| anyhow!(e))?),
        "template" => {
            let path = arg(1)?;
            commands::import::save_template(path.clone()).map_err(|e| anyhow!(e))?;
            println!("Template written to {}", path);
            return Ok(());
        }
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            return Ok(());
        }
        _ => {}
    }

    let state = open_state()?;
    match command.as_str() {
        "import" => {
            let report = commands::import::import_file(arg(1)?, &state).await.map_err(|e| anyhow!(e))?;
            print_json(&report)
        }
        "paste" => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            let report = commands::import::import_pasted(text, &state).await.map_err(|e| anyhow!(e))?;
            print_json(&report)
        }
        "settings" => {
            if args.get(1).map(|s| s.as_str()) == Some("set") {
                commands::settings::save_setting(arg(2)?, arg(3)?, &state).map_err(|e| anyhow!(e))?;
            }
            print_json(&commands::settings::get_settings(&state).map_err(|e| anyhow!(e))?)
        }
        "test-connection" => {
            let ok = commands::settings::test_connection(&state).await.map_err(|e| anyhow!(e))?;
            println!("{}", if ok { "Connection OK" } else { "Token rejected" });
            Ok(())
        }
        "history" => {
            let limit = match args.get(1) {
                Some(raw) => Some(raw.parse::<usize>().map_err(|_| anyhow!("Invalid limit: {}", raw))?),
                None => None,
            };
            print_json(&commands::history::get_runs(limit, &state).map_err(|e| anyhow!(e))?)
        }
        "run" => print_json(&commands::history::get_run_detail(arg(1)?, &state).map_err(|e| anyhow!(e))?),
        "scan" => print_json(&commands::import::scan_inbox(&state).await.map_err(|e| anyhow!(e))?),
        "watch" => {
            let reports = commands::import::scan_inbox(&state).await.map_err(|e| anyhow!(e))?;
            print_json(&reports)?;
            state.watch_inbox(tokio::runtime::Handle::current())?;
            tokio::signal::ctrl_c().await?;
            Ok(())
        }
        other => Err(anyhow!("Unknown command: {}\n\n{}", other, USAGE)),
    }
}
