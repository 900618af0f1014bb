use clap::ArgMatches;

use grounder::config::{self, Config};

pub fn config_from_args(args: &ArgMatches) -> Config {
    let mut the_config = Config::default();

    if let Ok(Some(mode)) = args.try_get_one::<config::ChoiceFeedback>("choice_feedback") {
        the_config.choice_feedback = *mode;
    };

    if let Ok(Some(n)) = args.try_get_one::<usize>("max_iterations") {
        the_config.max_iterations_per_component = *n;
    };

    the_config
}
