use std::fmt;
use std::path::Path;

use grounder::builder::{self, ParseError};
use grounder::program::Program;

/// Why [`load_program`] failed to load a file: reading it, or parsing what
/// was read. Kept distinct so a missing file or a permissions error isn't
/// reported to the user as a syntax error.
#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Parse(ParseError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "{e}"),
            LoadError::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl From<ParseError> for LoadError {
    fn from(e: ParseError) -> Self {
        LoadError::Parse(e)
    }
}

/// Read and parse `path`, merging its rules and directives into `program`.
pub fn load_program(program: &mut Program, path: impl AsRef<Path>) -> Result<(), LoadError> {
    let text = std::fs::read_to_string(path.as_ref()).map_err(LoadError::Io)?;
    let parsed = builder::parse_program(&text)?;
    program.rules.extend(parsed.rules);
    program.directives.extend(parsed.directives);
    Ok(())
}
