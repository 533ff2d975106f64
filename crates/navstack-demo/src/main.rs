#![forbid(unsafe_code)]

//! Scripted navstack walkthrough.
//!
//! Runs a fixed script against a fading navigator, advancing time in fixed
//! frames, and prints the panel tree after each step.

mod cli;
mod scenario;

use std::env;
use std::process;

use navstack::NavConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{Opts, Parsed};
use crate::scenario::{Demo, script};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("navstack=debug,navstack_demo=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let opts = match Opts::parse_from(env::args().skip(1), |key| env::var(key).ok()) {
        Ok(Parsed::Run(opts)) => opts,
        Ok(Parsed::Help) => {
            println!("{}", cli::HELP_TEXT);
            return;
        }
        Ok(Parsed::Version) => {
            println!("{}", cli::version());
            return;
        }
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("Run with --help for usage information.");
            process::exit(1);
        }
    };

    init_logging();

    let mut config = NavConfig::from_env();
    if opts.instant {
        config = config.with_reduced_motion(true);
    }
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        process::exit(1);
    }

    let mut demo = match Demo::new(config, &opts) {
        Ok(demo) => demo,
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            process::exit(1);
        }
    };

    for (label, step) in script() {
        tracing::info!(step = label, "running step");
        if let Err(reason) = demo.run(&step) {
            tracing::warn!(step = label, reason = %reason, "step rejected");
        }
        let frames = demo.settle();
        if !opts.quiet {
            println!("== {label} ({frames} frames)");
            println!("{}", demo.nav().snapshot());
        }
    }

    let visible = demo.visible();
    if visible.is_empty() {
        println!("done: root idle");
    } else {
        println!("done: visible {}", visible.join(" > "));
    }
}
