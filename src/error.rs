use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("no tail value restores checksum {target:#010x}, the search is broken")]
    SearchExhausted { target: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
