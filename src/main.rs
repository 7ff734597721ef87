mod config;
mod credentials;
mod db;
mod error;
mod ipc;
mod session;
mod store;

use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::io::{self, BufRead, Write};

fn main() {
    let cfg = match config::Cfg::load(std::env::args().nth(1)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("attendanced: {:#}", e);
            std::process::exit(2);
        }
    };

    // stdout carries responses, so logs go to stderr.
    let log_cfg = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("attendanced")
        .build();
    let _ = TermLogger::init(
        cfg.log_level,
        log_cfg,
        TerminalMode::Stderr,
        ColorChoice::Never,
    );
    log::info!("Logging started.");
    log::debug!("Configuration:\n{:#?}", &cfg);

    let startup_workspace = cfg.workspace.clone();
    let mut state = ipc::AppState::new(cfg);
    if let Some(path) = startup_workspace {
        if let Err(e) = ipc::select_workspace(&mut state, &path) {
            log::error!("cannot initialize store in {}: {:?}", path.display(), e);
            std::process::exit(1);
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                log::warn!("unparseable request: {}", e);
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
