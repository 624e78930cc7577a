use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use tactics_control::{AutopilotController, CommandSource};
use tactics_core::{Event, EventEnvelope, EventLevel, GameSession, GameState};
use tactics_world::{build_initial_state, generate_run_id, load_content, load_state, save_state};
use tracing_subscriber::EnvFilter;

mod batch;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "tactics_cli", about = "Grid tactics autopilot runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game with the autopilot until the turn budget runs out.
    Run {
        /// Start a fresh game with this seed. Mutually exclusive with --state.
        #[arg(long, conflicts_with = "state_file")]
        seed: Option<u64>,
        /// Resume a saved GameState JSON file. Mutually exclusive with --seed.
        #[arg(long = "state", conflicts_with = "seed")]
        state_file: Option<PathBuf>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Hard cap on autopilot steps, in case a game never ends.
        #[arg(long, default_value_t = 10_000)]
        max_steps: u64,
        #[arg(long, default_value_t = 5)]
        print_every: u64,
        #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
        event_level: String,
        /// Sample metrics every N steps.
        #[arg(long, default_value_t = 1)]
        metrics_every: u64,
        /// Disable automatic metrics collection to runs/ directory.
        #[arg(long)]
        no_metrics: bool,
        /// Write the final GameState to this file.
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Play many seeds in parallel and summarise the outcomes.
    Batch {
        /// Number of seeds to run, starting at --first-seed.
        #[arg(long, default_value_t = 16)]
        seeds: u64,
        #[arg(long, default_value_t = 0)]
        first_seed: u64,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        #[arg(long, default_value_t = 10_000)]
        max_steps: u64,
        /// Output directory (default: runs/).
        #[arg(long, default_value = "runs")]
        output_dir: String,
    },
}

struct RunOptions {
    max_steps: u64,
    print_every: u64,
    event_level: EventLevel,
    metrics_every: u64,
    no_metrics: bool,
    save: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn create_run_dir(run_id: &str) -> Result<PathBuf> {
    let dir = PathBuf::from("runs").join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

fn write_run_info(
    dir: &Path,
    run_id: &str,
    seed: u64,
    content_version: &str,
    options: &RunOptions,
) -> Result<()> {
    let info = serde_json::json!({
        "run_id": run_id,
        "seed": seed,
        "start_time": run_id.split('_').take(2).collect::<Vec<_>>().join("_"),
        "content_version": content_version,
        "metrics_every": options.metrics_every,
        "runner": "tactics_cli",
        "args": {
            "max_steps": options.max_steps,
            "print_every": options.print_every,
            "event_level": format!("{:?}", options.event_level),
        }
    });
    let path = dir.join("run_info.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn start_session(
    seed: Option<u64>,
    state_file: Option<&Path>,
    content_dir: &str,
    event_level: EventLevel,
) -> Result<GameSession<ChaCha8Rng>> {
    let content = load_content(content_dir)?;
    let session = if let Some(path) = state_file {
        let loaded = load_state(path)?;
        // Offset the stream so a resumed game does not replay the opening rolls.
        let rng = ChaCha8Rng::seed_from_u64(loaded.meta.seed ^ loaded.meta.turn);
        GameSession::restore(loaded, content, rng, event_level)
    } else {
        let resolved_seed = seed.unwrap_or_else(rand::random);
        let state = build_initial_state(&content, resolved_seed);
        GameSession::new(state, content, ChaCha8Rng::seed_from_u64(resolved_seed), event_level)
    };
    Ok(session)
}

/// Prints events worth seeing regardless of `print_every`.
fn print_notable(events: &[EventEnvelope], turn: u64) {
    for envelope in events {
        match &envelope.event {
            Event::CombatEnded { enemy_id, outcome } => {
                println!("*** COMBAT with {enemy_id}: {outcome:?} at turn={turn:03} ***");
            }
            Event::LevelUp { level, .. } => {
                println!("*** LEVEL UP: {level} at turn={turn:03} ***");
            }
            Event::AchievementUnlocked { achievement_id } => {
                println!("*** ACHIEVEMENT: {achievement_id} at turn={turn:03} ***");
            }
            Event::RelicDiscovered { kind, rarity, .. } => {
                println!("*** RELIC FOUND: {kind} ({rarity:?}) at turn={turn:03} ***");
            }
            _ => {}
        }
    }
}

fn run(mut session: GameSession<ChaCha8Rng>, options: &RunOptions) -> Result<()> {
    let seed = session.state().meta.seed;

    // Set up per-run metrics directory.
    let mut metrics_writer: Option<tactics_core::MetricsFileWriter> = None;
    if !options.no_metrics {
        let run_id = generate_run_id(seed);
        let run_dir = create_run_dir(&run_id)?;
        write_run_info(
            &run_dir,
            &run_id,
            seed,
            &session.content().content_version,
            options,
        )?;
        let writer = tactics_core::MetricsFileWriter::new(run_dir.clone())
            .with_context(|| format!("opening metrics CSV in {}", run_dir.display()))?;
        metrics_writer = Some(writer);
        println!("Run directory: {}", run_dir.display());
    }

    let mut autopilot = AutopilotController::new();
    let mut next_command_id = session.state().counters.next_command_id;

    println!(
        "Starting game: seed={seed} enemies={} turns={} content_version={}",
        session.state().enemies.len(),
        session.state().grid.remaining_turns,
        session.content().content_version,
    );
    println!("{}", "-".repeat(80));

    let mut steps = 0;
    while steps < options.max_steps && !session.state().grid.is_game_over {
        let commands =
            autopilot.generate_commands(session.state(), session.content(), &mut next_command_id);
        for envelope in &commands {
            match session.apply(envelope) {
                Ok(events) => print_notable(&events, session.state().meta.turn),
                Err(err) => {
                    tracing::debug!(
                        id = %envelope.id,
                        command = ?envelope.command,
                        %err,
                        "command rejected"
                    );
                }
            }
        }
        steps += 1;

        if steps % options.print_every == 0 {
            print_status(session.state());
        }
        if let Some(ref mut writer) = metrics_writer {
            if steps % options.metrics_every == 0 {
                writer
                    .write_row(&session.metrics())
                    .context("writing metrics row")?;
            }
        }
    }
    if !session.state().grid.is_game_over {
        tracing::warn!(steps, "step cap reached before the game ended");
    }

    println!("{}", "-".repeat(80));
    println!("Done after {steps} steps. Final state at turn {}:", session.state().meta.turn);
    print_status(session.state());

    if let Some(ref mut writer) = metrics_writer {
        writer.flush().context("final metrics flush")?;
        println!("Metrics written to runs/ directory.");
    }
    if let Some(path) = &options.save {
        save_state(path, session.state())?;
        println!("State saved to {}", path.display());
    }

    Ok(())
}

fn print_status(state: &GameState) {
    let character = &state.character;
    let discovered = state.enemies.iter().filter(|e| e.discovered).count();
    let defeated = state.enemies.iter().filter(|e| e.defeated).count();
    let fighting = if state.in_combat() { "  IN COMBAT" } else { "" };

    println!(
        "[turn={turn:03}  left={left:2}]  pos={pos}  hp={hp}/{max_hp}  shield={shield}  \
         lvl={level}  enemies={discovered}/{defeated}/{total}  \
         bio={bio} scrap={scrap} warp={warp}{fighting}",
        turn = state.meta.turn,
        left = state.grid.remaining_turns,
        pos = state.grid.player,
        hp = character.health,
        max_hp = character.max_health,
        shield = character.shield,
        level = state.progression.level,
        total = state.enemies.len(),
        bio = state.resources.biomass,
        scrap = state.resources.scrap,
        warp = state.resources.warpstone,
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            seed,
            state_file,
            content_dir,
            max_steps,
            print_every,
            event_level,
            metrics_every,
            no_metrics,
            save,
        } => {
            let level = match event_level.as_str() {
                "debug" => EventLevel::Debug,
                _ => EventLevel::Normal,
            };
            let session = start_session(seed, state_file.as_deref(), &content_dir, level)?;
            let options = RunOptions {
                max_steps,
                print_every: print_every.max(1),
                event_level: level,
                metrics_every: metrics_every.max(1),
                no_metrics,
                save,
            };
            run(session, &options)?;
        }
        Commands::Batch {
            seeds,
            first_seed,
            content_dir,
            max_steps,
            output_dir,
        } => batch::run(&content_dir, first_seed..first_seed + seeds, max_steps, &output_dir)?,
    }
    Ok(())
}
