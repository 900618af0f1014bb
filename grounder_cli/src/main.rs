#![allow(unused_imports, unused_variables, unused_features, dead_code)]

use std::cell::Cell;

use grounder::dispatch::library::{report, stat::Stat};
use grounder::dispatch::Dispatch;
use grounder::driver;
use grounder::program::Program;

mod config_io;
mod misc;
mod parse;

use config_io::ConfigIO;

fn main() {
    #[cfg(feature = "log")]
    env_logger::init();

    let matches = parse::cli::cli().get_matches();

    let config = parse::config::config_from_args(&matches);
    let config_io = ConfigIO::from_args(&matches);

    if config_io.detail > 0 {
        println!("c Parsing {} files", config_io.files.len());
    }

    let mut program = Program::new();
    for path in &config_io.files {
        if let Err(e) = misc::load_program(&mut program, path) {
            eprintln!("c Error loading {}: {e}", path.display());
            std::process::exit(1);
        }
    }

    let substitutions_considered = Cell::new(0usize);
    let rules_emitted = Cell::new(0usize);
    let handler = |d: Dispatch| match d {
        Dispatch::Stat(Stat::SubstitutionsConsidered(n)) => {
            substitutions_considered.set(substitutions_considered.get() + n)
        }
        Dispatch::Stat(Stat::RulesEmitted(n)) => rules_emitted.set(rules_emitted.get() + n),
        Dispatch::Report(report::Report::Driver(report::Driver::ComponentGrounded { component, passes })) => {
            if config_io.detail > 1 {
                println!("c component {component} grounded in {passes} passes");
            }
        }
        _ => {}
    };

    let ground = if config_io.show_stats {
        driver::ground(&program, &config, Some(&handler))
    } else {
        driver::ground(&program, &config, None)
    };

    let ground = match ground {
        Ok(p) => p,
        Err(e) => {
            eprintln!("c Error grounding: {e}");
            std::process::exit(1);
        }
    };

    if config_io.show_stats {
        println!(
            "c substitutions considered: {}, rules emitted: {}",
            substitutions_considered.get(),
            rules_emitted.get()
        );
    }

    let rendered = ground.to_string();
    match &config_io.out {
        Some(path) => {
            if let Err(e) = std::fs::write(path, rendered) {
                eprintln!("c Error writing {}: {e}", path.display());
                std::process::exit(1);
            }
        }
        None => print!("{rendered}"),
    }
}
