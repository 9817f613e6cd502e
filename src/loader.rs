//! Entry points for hosts that hand over one or more iglog streams.
//!
//! Every stream is transformed on its own, with fresh registries, and
//! produces its own [`Repository`].

use std::{io::{BufReader, Read}, path::Path};

use eyre::{Context, Result};
use tracing::info;

use crate::{config::TransformConfig, repository::Repository};

/// Transform each named stream into a [`Repository`] of the same name.
pub fn load_repositories<R: Read>(
    streams: impl IntoIterator<Item = (String, R)>,
    config: &TransformConfig
) -> Result<Vec<Repository>>
{
    let mut repositories = vec![];

    for (name, stream) in streams {
        let repository = Repository::from_reader(name.clone(), BufReader::new(stream), config)
            .wrap_err_with(|| format!("failed to load repository {name:?}"))?;

        repositories.push(repository);
    }

    info!(count = repositories.len(), "loaded repositories");

    Ok(repositories)
}

/// Transform the iglog file at `path`, naming the repository after the file.
pub fn load_repository_from_path(path: impl AsRef<Path>, config: &TransformConfig) -> Result<Repository> {
    Repository::from_path(&path, config)
        .wrap_err_with(|| format!("failed to load iglog {}", path.as_ref().display()))
}
