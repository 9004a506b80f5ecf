use std::path::PathBuf;

/// Root of the `apache/parquet-testing` fixture checkout, matching the submodule layout
/// the crate's own unit tests resolve against (see `src/lib.rs::tests::get_path`).
pub fn fixtures_dir() -> PathBuf {
    let dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(dir).join("testing/parquet-testing/data")
}

pub fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// `true` once the fixtures submodule has actually been checked out. Every test in this
/// directory is a no-op (not a failure) when it hasn't been, so this suite doesn't break
/// a checkout that never pulled the submodule.
pub fn fixtures_available() -> bool {
    fixtures_dir().is_dir()
}
