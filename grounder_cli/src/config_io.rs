use std::path::PathBuf;

use clap::ArgMatches;

pub const DETAILS: u8 = 0;

#[derive(Clone)]
pub struct ConfigIO {
    pub files: Vec<PathBuf>,
    pub out: Option<PathBuf>,
    pub detail: u8,
    pub show_stats: bool,
}

impl Default for ConfigIO {
    fn default() -> Self {
        ConfigIO {
            files: Vec::default(),
            out: None,
            detail: DETAILS,
            show_stats: false,
        }
    }
}

impl ConfigIO {
    pub fn from_args(args: &ArgMatches) -> Self {
        let mut io = ConfigIO::default();

        if let Ok(Some(paths)) = args.try_get_many::<PathBuf>("paths") {
            io.files = paths.cloned().collect();
        };

        if let Ok(Some(path)) = args.try_get_one::<PathBuf>("out") {
            io.out = Some(path.clone());
        };

        if let Ok(Some(level)) = args.try_get_one::<u8>("detail") {
            io.detail = *level;
        };

        if let Ok(Some(true)) = args.try_get_one::<bool>("stats") {
            io.show_stats = true;
        };

        io
    }
}
