use std::{fs, io::Write, path::Path};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::{error::Result, types::MergeArtifact};

/// Write the finished mix to `dest`. The bytes go to a temp file next to
/// `dest` first and are renamed into place, so `dest` never holds a partial mix.
pub fn write_artifact<P: AsRef<Path>>(dest: P, artifact: &MergeArtifact) -> Result<()> {
    let dest = dest.as_ref();
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&artifact.bytes)?;
    tmp.flush()?;
    tmp.persist(dest).map_err(|e| e.error)?;

    debug!("Wrote {} bytes to {}", artifact.len(), dest.display());
    Ok(())
}
