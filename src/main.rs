mod host;
mod script;

use anyhow::{Context, Result};
use clap::Parser;
use host::ConsoleHost;
use mapnote_core::host::FileStore;
use mapnote_core::lang::Lang;
use mapnote_core::memory::MemoryWorld;
use mapnote_core::MapNoteTeleport;
use script::ScriptRunner;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Replays map note teleport events against an in-memory world.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Plugin configuration file, created with defaults if missing
    #[arg(long, default_value = "Config.toml")]
    config: PathBuf,

    /// Player preference data file
    #[arg(long, default_value = "data/MapNoteTeleport.json")]
    data: PathBuf,

    /// Height of the flat terrain
    #[arg(long, default_value_t = 0.0)]
    terrain: f32,

    /// Message overrides as `<language>=<file.json>`
    #[arg(long = "lang", value_parser = parse_lang_arg)]
    langs: Vec<(String, PathBuf)>,

    /// Event script; read from stdin if omitted
    script: Option<PathBuf>,
}

fn parse_lang_arg(arg: &str) -> Result<(String, PathBuf), String> {
    match arg.split_once('=') {
        Some((language, path)) if !language.is_empty() && !path.is_empty() => {
            Ok((language.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected `<language>=<file>`, got `{}`", arg)),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let logfile = tracing_appender::rolling::daily("./logs", "mapnote.log");
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("MAPNOTE_LOG")
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_writer(logfile.and(std::io::stdout))
        .with_env_filter(env_filter)
        .init();

    let mut lang = Lang::new();
    for (language, path) in &args.langs {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read messages from {}", path.display()))?;
        let count = lang
            .register_json(language, &json)
            .with_context(|| format!("invalid message file {}", path.display()))?;
        info!("Loaded {} `{}` messages", count, language);
    }

    let host = ConsoleHost::new(
        MemoryWorld::new(args.terrain),
        FileStore::new(&args.config, &args.data),
    );
    let mut plugin = MapNoteTeleport::with_lang(host, lang);
    plugin.on_server_initialized();

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut runner = ScriptRunner::new(Instant::now());
    for (idx, line) in input.lines().enumerate() {
        let line = line.context("failed to read event script")?;
        match script::parse_line(&line) {
            Ok(Some(event)) => runner.apply(&mut plugin, event),
            Ok(None) => {}
            Err(err) => warn!("Line {}: {}", idx + 1, err),
        }
    }

    plugin.unload();
    Ok(())
}
