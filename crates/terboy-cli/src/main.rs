use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use terboy_core::audio::AudioEventQueue;
use terboy_core::session::{ScreenTag, Session};
use terboy_platformer::camera::Camera;
use terboy_platformer::config::PlatformerConfig;
use terboy_platformer::input::Intents;
use terboy_platformer::maps::list_maps;
use terboy_platformer::tile::spawner_pairs;
use terboy_platformer::tilemap::{TileAuthor, TileQuery, TileStore};
use terboy_platformer::{Stage, StageStatus};

const USAGE: &str = "usage:
  terboy validate [level.json] [--write]
  terboy simulate [level.json] <ticks> [--right] [--left] [--jump]
  terboy maps [dir]";

/// Viewport the camera frames when simulating.
const DISPLAY: (f32, f32) = (1260.0, 720.0);

#[derive(Debug, PartialEq)]
enum Command {
    Validate { level: Option<PathBuf>, write: bool },
    Simulate { level: Option<PathBuf>, ticks: u32, intents: Intents },
    Maps { dir: Option<PathBuf> },
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let (cmd, rest) = args.split_first().ok_or("missing command")?;
    let flags: Vec<&str> = rest.iter().map(String::as_str).filter(|a| a.starts_with("--")).collect();
    let positional: Vec<&str> = rest.iter().map(String::as_str).filter(|a| !a.starts_with("--")).collect();

    if let Some(unknown) = flags
        .iter()
        .find(|f| !matches!(**f, "--write" | "--right" | "--left" | "--jump"))
    {
        return Err(format!("unknown flag {unknown}"));
    }
    let has = |flag: &str| flags.contains(&flag);

    match cmd.as_str() {
        "validate" => Ok(Command::Validate {
            level: positional.first().map(PathBuf::from),
            write: has("--write"),
        }),
        "simulate" => {
            let (level, ticks) = match positional.as_slice() {
                [ticks] => (None, *ticks),
                [level, ticks] => (Some(PathBuf::from(level)), *ticks),
                _ => return Err("simulate needs a tick count".to_string()),
            };
            let ticks = ticks
                .parse()
                .map_err(|_| format!("invalid tick count {ticks:?}"))?;
            Ok(Command::Simulate {
                level,
                ticks,
                intents: Intents {
                    left: has("--left"),
                    right: has("--right"),
                    jump: has("--jump"),
                },
            })
        },
        "maps" => Ok(Command::Maps {
            dir: positional.first().map(PathBuf::from),
        }),
        other => Err(format!("unknown command {other:?}")),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            return ExitCode::from(2);
        },
    };

    let cfg = PlatformerConfig::load();
    let mut session = Session::default();
    let result = match command {
        Command::Validate { level, write } => {
            if let Some(level) = level {
                session.select_map(level.display().to_string());
            }
            session.push(ScreenTag::Editor);
            validate(Path::new(&session.selected_map), write, &cfg)
        },
        Command::Simulate {
            level,
            ticks,
            intents,
        } => {
            if let Some(level) = level {
                session.select_map(level.display().to_string());
            }
            session.push(ScreenTag::Game);
            simulate(Path::new(&session.selected_map), ticks, intents, cfg)
        },
        Command::Maps { dir } => {
            session.push(ScreenTag::MapSelect);
            let dir = dir.unwrap_or_else(|| {
                Path::new(&session.selected_map)
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default()
            });
            maps(&dir)
        },
    };
    session.pop();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn validate(path: &Path, write: bool, cfg: &PlatformerConfig) -> CliResult {
    let mut store = TileStore::from_file(path, cfg.tile_size)?;
    let spawners = store.extract(&spawner_pairs(), true).len();
    let recorded_lowest = store.lowest_y();
    let lowest = store.recompute_lowest_y();

    println!("level      {}", path.display());
    println!("grid       {}", store.grid_len());
    println!("offgrid    {}", store.offgrid().len());
    println!("spawners   {spawners}");
    println!("lowest_y   {lowest} (file says {recorded_lowest})");
    println!("background {}", store.background().unwrap_or("-"));

    if write {
        store.save(path)?;
        println!("normalized {}", path.display());
    }
    Ok(())
}

fn simulate(path: &Path, ticks: u32, intents: Intents, cfg: PlatformerConfig) -> CliResult {
    let store = TileStore::from_file(path, cfg.tile_size)?;
    let mut stage = Stage::new(store, cfg, AudioEventQueue::new());
    let mut camera = Camera::new();
    let mut status = stage.status();

    for tick in 0..ticks {
        status = stage.tick(intents);
        camera.follow(&stage.player().rect(), DISPLAY);
        for event in stage.audio_mut().drain() {
            tracing::debug!(tick, sound = event.bank(), "audio");
        }
        if matches!(status, StageStatus::Finished { .. } | StageStatus::DeathHoldElapsed) {
            tracing::info!(tick, ?status, "simulation ended early");
            break;
        }
    }

    let player = stage.player();
    println!("status     {status:?}");
    println!("pos        ({:.2}, {:.2})", player.pos.0, player.pos.1);
    println!("vel        ({:.2}, {:.2})", player.vel.0, player.vel.1);
    println!("action     {}", player.action());
    println!("grounded   {}", player.grounded());
    println!("death      {}", player.terminal.death);
    println!("finish     {}", player.terminal.finish_level);
    println!("time       {}", stage.timer().formatted());
    println!("camera     {:?}", camera.render_offset());
    Ok(())
}

fn maps(dir: &Path) -> CliResult {
    for name in list_maps(dir)? {
        println!("{name}");
    }
    Ok(())
}
