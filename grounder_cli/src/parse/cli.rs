use std::path::PathBuf;

use clap::{value_parser, Arg, Command};

use grounder::config;

pub fn cli() -> Command {
    Command::new("grounder")
        .about("Grounds a non-ground ASP-Core-2 style program into an equivalent ground program")
        .version("pup (it's still growing)")
        .arg(
            Arg::new("paths")
                .required(false)
                .trailing_var_arg(true)
                .num_args(0..)
                .value_parser(value_parser!(PathBuf))
                .help("The program files to ground (concatenated as a single program)."),
        )
        .arg(
            Arg::new("out")
                .short('o')
                .long("out")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .required(false)
                .num_args(1)
                .help("Where to write the ground program. Default: stdout."),
        )
        .arg(
            Arg::new("choice_feedback")
                .long("choice-feedback")
                .value_name("MODE")
                .value_parser(clap::builder::ValueParser::new(choice_feedback_parser))
                .required(false)
                .num_args(1)
                .help("Whether choice-head atoms feed their own stratum while it grounds.")
                .long_help(
                    "Whether choice-head atoms feed their own stratum while it grounds.
Default: Conservative

  - Conservative: choice-head atoms never contribute to the derivation set of
    the component currently being grounded.
  - Optimistic  : choice-head atoms are added as soon as they are
    instantiated, same as an ordinary disjunctive head.",
                ),
        )
        .arg(
            Arg::new("max_iterations")
                .long("max-iterations")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .required(false)
                .num_args(1)
                .help(format!(
                    "Passes a component's fixed-point loop may take before it is reported as non-convergent.
Default: {}",
                    config::defaults::MAX_ITERATIONS_PER_COMPONENT
                )),
        )
        .arg(
            Arg::new("detail")
                .long("detail")
                .short('d')
                .value_name("LEVEL")
                .value_parser(value_parser!(u8))
                .required(false)
                .num_args(1)
                .help(format!(
                    "The level to which details are communicated while grounding.
Default: {}",
                    crate::config_io::DETAILS
                )),
        )
        .arg(
            Arg::new("stats")
                .short('s')
                .long("stats")
                .value_parser(value_parser!(bool))
                .required(false)
                .num_args(0)
                .help("Display stats once grounding finishes."),
        )
}

fn choice_feedback_parser(arg: &str) -> Result<config::ChoiceFeedback, std::io::Error> {
    match arg {
        "Conservative" => Ok(config::ChoiceFeedback::Conservative),
        "Optimistic" => Ok(config::ChoiceFeedback::Optimistic),
        _ => Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Unknown choice-feedback mode",
        )),
    }
}
