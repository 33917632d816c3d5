//! Fatal errors surfaced at the CLI boundary.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Startup and teardown failures.
///
/// Transient buffer states (full/empty) never appear here: they are handled
/// by blocking inside the simulation. Malformed input lines are per-record
/// warnings, not errors.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("cannot open request file {}: {source}", path.display())]
    OpenSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create simulation log {}: {source}", path.display())]
    CreateLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot flush simulation log: {0}")]
    FlushLog(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_path() {
        let err = SimError::OpenSource {
            path: PathBuf::from("missing.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("missing.txt"));
    }
}
