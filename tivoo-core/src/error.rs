use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No parser recognized the document, or it is not well-formed XML.
    #[error("no known feed format matched `{document}`")]
    NoMatchingFormat { document: String },

    /// The render destination could not be written. Files written by the
    /// failing call have already been removed.
    #[error("failed to write `{}`: {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
