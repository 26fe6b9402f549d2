use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;

use countdown::repl::{ReplConfig, Session, parse_line, printing_options};
use countdown::{Timer, TimerConfig, TokioHost, logging};

#[derive(Parser)]
#[command(version, about = "Interactive countdown timer")]
struct Cli {
    /// Timer config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds between ticks, overriding the config file
    #[arg(short, long)]
    tick: Option<f64>,
}

fn main() -> Result<(), String> {
    logging::init();
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| e.to_string())?;

    // timers are single-threaded; their host tasks need a LocalSet
    LocalSet::new().block_on(&runtime, run(cli))
}

async fn run(cli: Cli) -> Result<(), String> {
    let repl_config: ReplConfig = confy::load("countdown", None).unwrap_or_default();
    let mut config = match repl_config.timer_config_path(cli.config) {
        Some(path) => TimerConfig::load(&path).map_err(|e| e.to_string())?,
        None => TimerConfig::default(),
    };
    repl_config.apply_to(&mut config);
    if let Some(tick) = cli.tick {
        config.tick_secs = tick;
    }
    config.validate().map_err(|e| e.to_string())?;
    tracing::debug!(?config, "timer config loaded");

    let timer = Timer::new(TokioHost::new(), printing_options());
    let session = Session::new(timer, &config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt()?;
        let Some(line) = lines.next_line().await.map_err(|e| e.to_string())? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut stdout = std::io::stdout();
        match parse_line(line) {
            Ok(command) => {
                let quit = session
                    .execute(command, &mut stdout)
                    .map_err(|e| e.to_string())?;
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(stdout, "{err}").map_err(|e| e.to_string())?;
                stdout.flush().map_err(|e| e.to_string())?;
            }
        }
    }

    // dropping cancels pending host tasks without firing callbacks
    drop(session);
    Ok(())
}

fn prompt() -> Result<(), String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ").map_err(|e| e.to_string())?;
    stdout.flush().map_err(|e| e.to_string())
}
