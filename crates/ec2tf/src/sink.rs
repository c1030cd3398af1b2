//! final destination of a generated document
//!
//! Files are written to a temporary file next to the destination and renamed into place, so the destination
//! either holds the complete document or is left as it was.
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum Sink {
    Stdout,
    File(PathBuf),
}

impl From<Option<PathBuf>> for Sink {
    fn from(value: Option<PathBuf>) -> Self {
        value.map_or(Sink::Stdout, Sink::File)
    }
}

impl Sink {
    pub fn write(&self, contents: &str) -> Result<(), SinkError> {
        match self {
            Sink::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(contents.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(SinkError::Stdout)
            }
            Sink::File(path) => write_atomic(path, contents),
        }
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), SinkError> {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut file =
        tempfile::NamedTempFile::new_in(directory).map_err(|source| SinkError::TempFile {
            directory: directory.to_owned(),
            source,
        })?;

    file.write_all(contents.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .map_err(|source| SinkError::Write {
            path: file.path().to_owned(),
            source,
        })?;

    // the temporary file is removed on drop if persisting fails
    file.persist(path).map_err(|error| SinkError::Persist {
        path: path.to_owned(),
        source: error.error,
    })?;

    tracing::info!(path=%path.display(), bytes = contents.len(), "written");
    Ok(())
}

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("Unable to write to stdout")]
    Stdout(#[source] std::io::Error),
    #[error("Unable to create temporary file in {}", .directory.display())]
    TempFile {
        directory: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to write temporary file {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to move output into place at {}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
