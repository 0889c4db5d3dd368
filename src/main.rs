// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

mod config;
mod game;
mod object;
mod scheduler;
mod segment;
mod stage;
mod timing;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::env;

use config::GameFile;
use game::GameDirector;
use object::ObjectId;
use stage::ConsoleStage;

fn print_usage() {
    println!("CHORUS - Memory Sequence Game Core");
    println!();
    println!("Usage: chorus [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --validate <FILE>       Validate a game configuration file");
    println!("  --show <FILE>           Print a summary of a game configuration");
    println!("  --demo [FILE]           Run a simulated playthrough (built-in game if no file)");
    println!("  --seed <N>              Seed for the simulated player (with --demo)");
    println!("  --help                  Show this help message");
}

fn validate_file(path: &str) -> Result<()> {
    let file = GameFile::load(path)?;
    match file.validate() {
        Ok(()) => {
            println!("{}: OK", path);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}: {}", path, e);
            std::process::exit(1);
        }
    }
}

fn show_file(path: &str) -> Result<()> {
    let file = GameFile::load(path)?;
    file.validate()?;

    println!("Game: {}", file.game.name);
    println!(
        "  master beat: {} | auto-advance: {} | camera views: {}",
        file.game.master_beat_interval, file.game.auto_advance, file.game.camera_views
    );
    println!(
        "  grading windows: {} / {} / {}",
        file.game.grading.perfect, file.game.grading.good, file.game.grading.ok
    );
    println!("Objects ({}):", file.objects.len());
    for name in &file.objects {
        println!("  {}", name);
    }
    println!("Segments ({}):", file.segments.len());
    for segment in &file.segments {
        let timing = segment.timing();
        println!(
            "  {} - {} object(s), cycle {}, spacing {}, end-delay {}",
            segment.name,
            segment.objects.len(),
            timing.total_cycle_duration,
            timing.inter_object_delay,
            timing.end_delay(segment.objects.len()),
        );
    }
    Ok(())
}

/// Run a simulated playthrough: a scripted player clicks the expected
/// timeline with random jitter and the occasional wrong object.
fn run_demo(file: GameFile, seed: u64) -> Result<()> {
    let built = file.build()?;
    println!(
        "Simulating '{}' ({} segment(s), seed {})",
        file.game.name,
        built.segments.len(),
        seed
    );
    println!();

    let mut director = GameDirector::new(
        built.bank,
        built.segments,
        built.options,
        built.windows,
        built.camera_views,
        ConsoleStage,
    );
    director.start(0.0);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut planned: Option<(ObjectId, f64)> = None;
    let step = 0.05;
    let max_time = 600.0;
    let mut now = 0.0;

    while !director.is_finished() && now < max_time {
        now += step;
        director.tick(now);

        if !director.session().awaiting_input {
            planned = None;
            continue;
        }

        if planned.is_none() {
            let session = director.session();
            let segment = &director.segments()[session.segment_index];
            let position = session.input_index;
            let Some(&expected_at) = session.expected.get(position) else {
                continue;
            };

            // Mostly on time, sometimes sloppy, rarely the wrong object.
            let jitter: f64 = rng.gen_range(-0.2..0.45);
            let object = if rng.gen::<f64>() < 0.05 && segment.len() > 1 {
                let wrong = (position + 1) % segment.len();
                segment.object_at(wrong).unwrap_or(ObjectId(0))
            } else {
                segment.object_at(position).unwrap_or(ObjectId(0))
            };
            planned = Some((object, expected_at + jitter.max(-0.1)));
        }

        if let Some((object, at)) = planned {
            if now >= at {
                director.object_clicked(object, now);
                planned = None;
            }
        }
    }

    println!();
    if director.is_finished() {
        println!("All segments completed at t={:.2}", now);
    } else {
        println!("Stopped at t={:.2}", now);
    }
    println!(
        "{} background loop(s) running, {} object(s) colored",
        director.looper().active_count(),
        director.bank().iter().filter(|o| o.is_colored()).count()
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("CHORUS - Memory Sequence Game Core");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--validate" => {
            if args.len() < 3 {
                eprintln!("Error: --validate requires a file path");
                std::process::exit(1);
            }
            validate_file(&args[2])?;
        }
        "--show" => {
            if args.len() < 3 {
                eprintln!("Error: --show requires a file path");
                std::process::exit(1);
            }
            show_file(&args[2])?;
        }
        "--demo" => {
            let mut file = GameFile::demo();
            let mut seed = 1;
            let mut rest = args[2..].iter();
            while let Some(arg) = rest.next() {
                if arg.as_str() == "--seed" {
                    seed = rest
                        .next()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or_else(|| {
                            eprintln!("Error: --seed requires a number");
                            std::process::exit(1);
                        });
                } else {
                    file = GameFile::load(arg)?;
                }
            }
            run_demo(file, seed)?;
        }
        "--help" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
