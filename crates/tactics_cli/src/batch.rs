//! Parallel multi-seed runs. Each seed plays a full autopilot game in its own
//! session and writes its metrics under `<output>/batch_<timestamp>/seed_<n>/`.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tactics_control::{AutopilotController, CommandSource};
use tactics_core::{EventLevel, GameContent, GameSession, MetricsFileWriter, MetricsSnapshot};

struct SeedResult {
    seed: u64,
    steps: u64,
    final_snapshot: MetricsSnapshot,
}

fn run_seed(
    content: &GameContent,
    seed: u64,
    max_steps: u64,
    seed_dir: &Path,
) -> Result<SeedResult> {
    std::fs::create_dir_all(seed_dir)
        .with_context(|| format!("creating seed directory: {}", seed_dir.display()))?;
    let mut metrics_writer = MetricsFileWriter::new(seed_dir.to_path_buf())
        .with_context(|| format!("opening metrics CSV in {}", seed_dir.display()))?;

    let state = tactics_world::build_initial_state(content, seed);
    let mut session = GameSession::new(
        state,
        content.clone(),
        ChaCha8Rng::seed_from_u64(seed),
        EventLevel::Normal,
    );
    let mut autopilot = AutopilotController::new();
    let mut next_command_id = 0u64;

    let mut steps = 0;
    while steps < max_steps && !session.state().grid.is_game_over {
        let commands =
            autopilot.generate_commands(session.state(), session.content(), &mut next_command_id);
        for envelope in &commands {
            if let Err(err) = session.apply(envelope) {
                tracing::debug!(seed, id = %envelope.id, %err, "command rejected");
            }
        }
        steps += 1;
        metrics_writer
            .write_row(&session.metrics())
            .context("writing metrics row")?;
    }
    metrics_writer.flush().context("flushing metrics")?;

    Ok(SeedResult {
        seed,
        steps,
        final_snapshot: session.metrics(),
    })
}

fn mean(results: &[SeedResult], value: impl Fn(&MetricsSnapshot) -> f64) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(|r| value(&r.final_snapshot)).sum::<f64>() / results.len() as f64
}

pub fn run(content_dir: &str, seeds: Range<u64>, max_steps: u64, output_dir: &str) -> Result<()> {
    let content = tactics_world::load_content(content_dir)?;
    let seeds: Vec<u64> = seeds.collect();

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let run_dir = PathBuf::from(output_dir).join(format!("batch_{timestamp}"));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("creating output directory: {}", run_dir.display()))?;

    println!("Output: {}", run_dir.display());
    println!("Running {} seeds in parallel...", seeds.len());
    let start = Instant::now();

    let results: Vec<Result<SeedResult>> = seeds
        .par_iter()
        .map(|&seed| run_seed(&content, seed, max_steps, &run_dir.join(format!("seed_{seed}"))))
        .collect();

    let mut seed_results = Vec::new();
    for result in results {
        match result {
            Ok(seed_result) => seed_results.push(seed_result),
            Err(err) => eprintln!("Seed failed: {err:#}"),
        }
    }
    if seed_results.is_empty() {
        anyhow::bail!("all seeds failed");
    }

    let unfinished: Vec<u64> = seed_results
        .iter()
        .filter(|r| r.final_snapshot.remaining_turns > 0)
        .map(|r| r.seed)
        .collect();
    let mean_steps =
        seed_results.iter().map(|r| r.steps as f64).sum::<f64>() / seed_results.len() as f64;
    let summary = serde_json::json!({
        "content_version": content.content_version,
        "seed_count": seed_results.len(),
        "max_steps": max_steps,
        "wall_time_ms": start.elapsed().as_millis() as u64,
        "unfinished_seeds": unfinished,
        "mean": {
            "steps": mean_steps,
            "level": mean(&seed_results, |m| f64::from(m.level)),
            "enemies_defeated": mean(&seed_results, |m| f64::from(m.enemies_defeated)),
            "battles_lost": mean(&seed_results, |m| f64::from(m.battles_lost)),
            "retreats": mean(&seed_results, |m| f64::from(m.retreats)),
            "structures_built": mean(&seed_results, |m| f64::from(m.structures_built)),
            "relics_owned": mean(&seed_results, |m| f64::from(m.relics_owned)),
        },
        "finals": seed_results
            .iter()
            .map(|r| serde_json::json!({ "seed": r.seed, "metrics": r.final_snapshot }))
            .collect::<Vec<_>>(),
    });

    println!("{}", "-".repeat(80));
    println!(
        "{:>8} {:>6} {:>6} {:>9} {:>6} {:>8}",
        "seed", "steps", "level", "defeated", "lost", "retreats"
    );
    for r in &seed_results {
        let m = &r.final_snapshot;
        println!(
            "{:>8} {:>6} {:>6} {:>9} {:>6} {:>8}",
            r.seed, r.steps, m.level, m.enemies_defeated, m.battles_lost, m.retreats
        );
    }
    if !unfinished.is_empty() {
        println!("WARNING: {} seeds hit the step cap", unfinished.len());
    }

    let summary_path = run_dir.join("summary.json");
    let summary_json = serde_json::to_string_pretty(&summary).context("serializing summary")?;
    std::fs::write(&summary_path, summary_json)
        .with_context(|| format!("writing {}", summary_path.display()))?;
    println!("Summary written to {}", summary_path.display());
    Ok(())
}
