//! Play a protocol in the terminal.
//!
//! Run with: `cargo run --example console -- [protocol-dir] [seed]`
//!
//! The directory defaults to the bundled `protocols/`. Passing a seed makes
//! branch choices and option order repeatable.
//!
//! Logging: set `RUST_LOG=debug` to watch transitions and parsed states,
//! `RUST_LOG=trace` to also see skipped document lines.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::info;
use protocol_drill::{
    trainer::view, GameEvent, GameplayEngine, ProtocolRepository, SessionConfig, StateType,
};

/// Read one trimmed line; `None` on end of input.
fn prompt(label: &str) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input).context("failed to read stdin")? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn choose_protocol(repo: &ProtocolRepository) -> Result<Option<String>> {
    let names = repo.names();
    println!("\nSelect a protocol to practice:");
    for (i, name) in names.iter().enumerate() {
        println!("  {}. {}", i + 1, name);
    }
    loop {
        let Some(input) = prompt("> ")? else {
            return Ok(None);
        };
        if input.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match input.parse::<usize>() {
            Ok(n) if (1..=names.len()).contains(&n) => return Ok(Some(names[n - 1].to_string())),
            _ => println!("  Enter a number between 1 and {}, or q to quit.", names.len()),
        }
    }
}

/// One session from start to results. Returns `false` if input ran out.
fn play(engine: &mut GameplayEngine<'_>, name: &str) -> Result<bool> {
    let mut event = engine.start_game(name)?;
    loop {
        let state = match event {
            GameEvent::StateChanged(state) => state,
            GameEvent::GameComplete { final_state, score } => {
                let results = view::results_view(final_state, score);
                println!("\n========================================");
                println!("          PROTOCOL COMPLETE");
                println!("========================================");
                println!("  {}", results["description"].as_str().unwrap_or_default());
                println!("  Score: {}", results["score"].as_str().unwrap_or_default());
                println!("  {}", results["message"].as_str().unwrap_or_default());
                return Ok(true);
            }
            GameEvent::ScoreUpdated(_) => unreachable!("advance never reports a score"),
        };

        println!("\n{}", state.description());
        if state.state_type() == StateType::Question {
            let options = engine.current_options();
            for (i, option) in options.iter().enumerate() {
                println!("  {}. {}", i + 1, option);
            }
            let choice = loop {
                let Some(input) = prompt("Answer: ")? else {
                    return Ok(false);
                };
                match input.parse::<usize>() {
                    Ok(n) if (1..=options.len()).contains(&n) => break &options[n - 1],
                    _ => println!("  Pick 1-{}.", options.len()),
                }
            };
            let feedback = engine.submit_answer(choice)?;
            if feedback.is_correct {
                println!("Correct!");
            } else {
                println!("Incorrect. The correct answer was:\n  {}", feedback.correct_answer);
            }
            println!("  Score so far: {}", feedback.score);
        }
        if prompt("[Enter] to continue ")?.is_none() {
            return Ok(false);
        }
        event = engine.advance()?;
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut args = std::env::args().skip(1);
    let dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("protocols"));
    let config = match args.next() {
        Some(seed) => SessionConfig::default().with_seed(seed.parse().context("seed must be an integer")?),
        None => SessionConfig::default(),
    };

    let repo = ProtocolRepository::load(&dir);
    if repo.is_empty() {
        bail!("no protocols found in {}", dir.display());
    }
    let mut engine = GameplayEngine::with_config(&repo, &config);

    while let Some(name) = choose_protocol(&repo)? {
        info!("player picked {name:?}");
        loop {
            if !play(&mut engine, &name)? {
                return Ok(());
            }
            match prompt("\n[r] Play again  [m] Menu  [q] Quit: ")?.as_deref() {
                Some("r") => continue,
                Some("m") => break,
                _ => return Ok(()),
            }
        }
    }
    println!("Thanks for practicing!");
    Ok(())
}
