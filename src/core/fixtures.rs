//! Recording helpers for persisting provider responses as test fixtures.
//! Compiled only when the `test-mode` feature is enabled.

use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub(crate) fn get_fixture_dir() -> PathBuf {
    env::var("FS_FIXDIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"))
}

/// Writes `body` to `<fixture dir>/<endpoint>_<key>.<ext>`; the key is lowercased and
/// whitespace becomes `-` so free-text queries give stable file names.
pub(crate) fn record_fixture(
    endpoint: &str,
    key: &str,
    ext: &str,
    body: &str,
) -> Result<(), std::io::Error> {
    let dir = get_fixture_dir();
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }
    let key = key.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase();
    let path = dir.join(format!("{endpoint}_{key}.{ext}"));

    let mut file = fs::File::create(&path)?;
    file.write_all(body.as_bytes())?;

    if env::var("FS_DEBUG").ok().as_deref() == Some("1") {
        eprintln!("FS_RECORD: wrote fixture to {}", path.display());
    }
    Ok(())
}
