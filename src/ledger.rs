//! The dependency ledger: tracks, per output file, which inputs produced it
//! and what command line built it, so a second run can skip outputs that
//! are still up to date.
//!
//! Three maps (`deps`, `modtimes`, `cmdlines`) keyed by `(input_file,
//! output_format)`, persisted together under a single format version, with
//! staleness decided by [`Ledger::needs_update`]'s six conditions.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// On-disk format version. Bumped whenever the shape of [`DepsRecord`] or
/// the three top-level maps changes incompatibly.
pub const DEPS_FORMAT_VERSION: u32 = 4;

/// The key under which a build step's record is filed: the input file that
/// was processed, and the output format it was processed into (e.g. `"o"`,
/// `"exe"`). Two different formats built from the same input get distinct
/// records.
pub type DepsKey = (String, String);

/// What one build step produced and consumed.
///
/// `outputs` pairs each generated file with the method that produced it
/// (free-form, e.g. `"compile"`, `"link"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepsRecord {
    /// Files this step read, beyond the key's own input file.
    pub deps: Vec<String>,
    /// Files this step wrote, paired with how they were produced.
    pub outputs: Vec<(String, String)>,
}

impl DepsRecord {
    /// An empty record for a fresh key.
    pub fn new() -> Self {
        Self::default()
    }
}

/// On-disk envelope: a format version tag followed by the three maps.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerFile {
    version: u32,
    deps_db: HashMap<DepsKeyOwned, DepsRecord>,
    modtimes_db: HashMap<String, i64>,
    cmdlines_db: HashMap<DepsKeyOwned, Vec<String>>,
}

/// `bincode` can't derive `Serialize`/`Deserialize` for a `HashMap` keyed by
/// a tuple directly through `serde`'s map representation in every backend,
/// so the key is flattened to a single string (`"input\x00format"`) for
/// storage and split back apart on load.
type DepsKeyOwned = String;

fn encode_key(key: &DepsKey) -> DepsKeyOwned {
    format!("{}\u{0}{}", key.0, key.1)
}

fn decode_key(encoded: &str) -> DepsKey {
    match encoded.split_once('\u{0}') {
        Some((input, format)) => (input.to_string(), format.to_string()),
        None => (encoded.to_string(), String::new()),
    }
}

/// The in-memory dependency ledger: what was built from what, when outputs
/// were last declared, and what command line produced each output.
///
/// One ledger per project, loaded once at the start of a build and saved
/// once at the end.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    deps_db: HashMap<DepsKey, DepsRecord>,
    modtimes_db: HashMap<String, i64>,
    cmdlines_db: HashMap<DepsKey, Vec<String>>,
}

impl Ledger {
    /// An empty ledger, as if no prior build had ever run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a ledger previously saved with [`Ledger::save`].
    ///
    /// A missing file is treated as an empty ledger rather than an error —
    /// the first build has no prior knowledge; a version mismatch or
    /// corrupt file is reported via [`Error::LoadError`] so the caller can
    /// decide whether to proceed as if unseeded.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => {
                return Err(Error::LoadError {
                    reason: format!("reading {}: {e}", path.display()),
                })
            }
        };
        let file: LedgerFile = bincode::deserialize(&bytes).map_err(|e| Error::LoadError {
            reason: format!("decoding {}: {e}", path.display()),
        })?;
        if file.version != DEPS_FORMAT_VERSION {
            return Err(Error::LoadError {
                reason: format!(
                    "{} was written with format version {}, expected {}",
                    path.display(),
                    file.version,
                    DEPS_FORMAT_VERSION
                ),
            });
        }
        let mut ledger = Self::new();
        ledger.merge(file);
        Ok(ledger)
    }

    /// Merges a freshly-loaded file into this ledger. On key collision the
    /// loaded entry wins.
    fn merge(&mut self, file: LedgerFile) {
        for (key, record) in file.deps_db {
            self.deps_db.insert(decode_key(&key), record);
        }
        for (output, mtime) in file.modtimes_db {
            self.modtimes_db.insert(output, mtime);
        }
        for (key, cmdline) in file.cmdlines_db {
            self.cmdlines_db.insert(decode_key(&key), cmdline);
        }
    }

    /// Persists the ledger atomically: written to a sibling temp file, then
    /// renamed into place, so a crash mid-write never leaves a truncated
    /// ledger behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = LedgerFile {
            version: DEPS_FORMAT_VERSION,
            deps_db: self
                .deps_db
                .iter()
                .map(|(k, v)| (encode_key(k), v.clone()))
                .collect(),
            modtimes_db: self.modtimes_db.clone(),
            cmdlines_db: self
                .cmdlines_db
                .iter()
                .map(|(k, v)| (encode_key(k), v.clone()))
                .collect(),
        };
        let bytes = bincode::serialize(&file).map_err(|e| Error::IOError {
            path: path.display().to_string(),
            reason: format!("encoding ledger: {e}"),
        })?;
        let tmp_path = tmp_path_for(path);
        fs::write(&tmp_path, &bytes).map_err(|e| Error::IOError {
            path: tmp_path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::rename(&tmp_path, path).map_err(|e| Error::IOError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    /// Records that `key` depends on `dep_file`, in addition to whatever it
    /// already depends on.
    pub fn add_dependency(&mut self, key: &DepsKey, dep_file: impl Into<String>) {
        self.deps_db
            .entry(key.clone())
            .or_insert_with(DepsRecord::new)
            .deps
            .push(dep_file.into());
    }

    /// Records that `key` produced `output_file` via `method`, and stamps
    /// the output's modtime *now* — at declaration time, not at the time
    /// the file is actually written.
    pub fn add_output(&mut self, key: &DepsKey, output_file: impl Into<String>, method: impl Into<String>) {
        let output_file = output_file.into();
        self.deps_db
            .entry(key.clone())
            .or_insert_with(DepsRecord::new)
            .outputs
            .push((output_file.clone(), method.into()));
        self.modtimes_db.insert(output_file, now_secs());
    }

    /// Records the command line used to build `key`.
    pub fn add_cmdline(&mut self, key: &DepsKey, cmdline: Vec<String>) {
        self.cmdlines_db.insert(key.clone(), cmdline);
    }

    /// The record filed for `key`, if any prior build declared one.
    pub fn record(&self, key: &DepsKey) -> Option<&DepsRecord> {
        self.deps_db.get(key)
    }

    /// Decides whether `key`'s outputs need to be regenerated, given the
    /// command line that would be used *this* time and the bakefile's own
    /// modification time.
    ///
    /// Checks six conditions in order, short-circuiting on the first that
    /// applies:
    ///
    /// 1. No record for `key` at all -> stale (never built before).
    /// 2. Recorded command line differs from `cmdline` -> stale.
    /// 3. Any declared output file is missing from disk -> stale.
    /// 4. No declared outputs -> stale (nothing to be up to date about).
    /// 5. The bakefile itself is newer than the oldest output -> stale.
    /// 6. Any dependency file is missing, or newer than the oldest output
    ///    -> stale.
    ///
    /// Otherwise the outputs are up to date.
    pub fn needs_update(&self, key: &DepsKey, cmdline: &[String], bakefile_mtime: i64) -> bool {
        let record = match self.deps_db.get(key) {
            Some(r) => r,
            None => return true,
        };

        match self.cmdlines_db.get(key) {
            Some(recorded) if recorded.as_slice() == cmdline => {}
            _ => return true,
        }

        if record.outputs.is_empty() {
            return true;
        }

        let mut oldest_output: Option<i64> = None;
        for (output_file, _method) in &record.outputs {
            let on_disk = match file_mtime(output_file) {
                Some(mtime) => mtime,
                None => return true,
            };
            let recorded = self.modtimes_db.get(output_file).copied().unwrap_or(0);
            let effective = recorded.max(on_disk);
            oldest_output = Some(match oldest_output {
                Some(current) => current.min(effective),
                None => effective,
            });
        }
        let oldest_output = match oldest_output {
            Some(t) => t,
            None => return true,
        };

        if bakefile_mtime > oldest_output {
            return true;
        }

        for dep_file in &record.deps {
            match file_mtime(dep_file) {
                Some(mtime) if mtime <= oldest_output => {}
                _ => return true,
            }
        }

        false
    }
}

fn file_mtime(path: &str) -> Option<i64> {
    let metadata = fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    Some(
        modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0),
    )
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "deps".to_string());
    name.push_str(".tmp");
    match path.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(input: &str, format: &str) -> DepsKey {
        (input.to_string(), format.to_string())
    }

    #[test]
    fn unknown_key_needs_update() {
        let ledger = Ledger::new();
        assert!(ledger.needs_update(&key("a.c", "o"), &["cc".to_string()], 0));
    }

    #[test]
    fn cmdline_mismatch_triggers_update() {
        let mut ledger = Ledger::new();
        let k = key("a.c", "o");
        ledger.add_cmdline(&k, vec!["cc".to_string(), "-O2".to_string()]);
        ledger.add_output(&k, "a.o", "compile");
        assert!(ledger.needs_update(&k, &["cc".to_string(), "-O3".to_string()], 0));
    }

    #[test]
    fn no_outputs_declared_needs_update() {
        let mut ledger = Ledger::new();
        let k = key("a.c", "o");
        ledger.add_cmdline(&k, vec!["cc".to_string()]);
        assert!(ledger.needs_update(&k, &["cc".to_string()], 0));
    }

    #[test]
    fn missing_output_file_needs_update() {
        let mut ledger = Ledger::new();
        let k = key("a.c", "o");
        ledger.add_cmdline(&k, vec!["cc".to_string()]);
        ledger.add_output(&k, "/nonexistent/path/a.o", "compile");
        assert!(ledger.needs_update(&k, &["cc".to_string()], 0));
    }

    #[test]
    fn up_to_date_when_everything_matches() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a.o");
        fs::write(&out, b"object").unwrap();
        let dep = dir.path().join("a.h");
        fs::write(&dep, b"header").unwrap();

        let mut ledger = Ledger::new();
        let k = key("a.c", "o");
        ledger.add_cmdline(&k, vec!["cc".to_string()]);
        ledger.add_output(&k, out.to_string_lossy().into_owned(), "compile");
        ledger.add_dependency(&k, dep.to_string_lossy().into_owned());

        assert!(!ledger.needs_update(&k, &["cc".to_string()], 0));
    }

    #[test]
    fn newer_dependency_needs_update() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a.o");
        fs::write(&out, b"object").unwrap();

        let mut ledger = Ledger::new();
        let k = key("a.c", "o");
        ledger.add_cmdline(&k, vec!["cc".to_string()]);
        ledger.add_output(&k, out.to_string_lossy().into_owned(), "compile");
        // Dependency doesn't exist on disk at all -> treated as changed.
        ledger.add_dependency(&k, dir.path().join("missing.h").to_string_lossy().into_owned());

        assert!(ledger.needs_update(&k, &["cc".to_string()], 0));
    }

    #[test]
    fn newer_bakefile_needs_update() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("a.o");
        fs::write(&out, b"object").unwrap();

        let mut ledger = Ledger::new();
        let k = key("a.c", "o");
        ledger.add_cmdline(&k, vec!["cc".to_string()]);
        ledger.add_output(&k, out.to_string_lossy().into_owned(), "compile");

        let far_future = now_secs() + 1_000_000;
        assert!(ledger.needs_update(&k, &["cc".to_string()], far_future));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let ledger_path = dir.path().join("deps.db");

        let mut ledger = Ledger::new();
        let k = key("a.c", "o");
        ledger.add_cmdline(&k, vec!["cc".to_string(), "-c".to_string()]);
        ledger.add_output(&k, "a.o", "compile");
        ledger.add_dependency(&k, "a.h");
        ledger.save(&ledger_path).unwrap();

        let loaded = Ledger::load(&ledger_path).unwrap();
        assert_eq!(loaded.record(&k), ledger.record(&k));
        assert_eq!(loaded.cmdlines_db.get(&k), ledger.cmdlines_db.get(&k));
    }

    #[test]
    fn load_missing_file_is_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger_path = dir.path().join("does-not-exist.db");
        let loaded = Ledger::load(&ledger_path).unwrap();
        assert!(loaded.record(&key("a.c", "o")).is_none());
    }

    #[test]
    fn load_rejects_version_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let ledger_path = dir.path().join("deps.db");
        let bad = LedgerFile {
            version: DEPS_FORMAT_VERSION + 1,
            deps_db: HashMap::new(),
            modtimes_db: HashMap::new(),
            cmdlines_db: HashMap::new(),
        };
        fs::write(&ledger_path, bincode::serialize(&bad).unwrap()).unwrap();
        let err = Ledger::load(&ledger_path).unwrap_err();
        assert!(matches!(err, Error::LoadError { .. }));
    }

    #[test]
    fn merge_on_load_overwrites_matching_keys() {
        let dir = tempfile::tempdir().unwrap();
        let ledger_path = dir.path().join("deps.db");

        let mut first = Ledger::new();
        let k = key("a.c", "o");
        first.add_cmdline(&k, vec!["cc".to_string()]);
        first.add_output(&k, "a.o", "compile");
        first.save(&ledger_path).unwrap();

        let mut second = Ledger::load(&ledger_path).unwrap();
        second.add_cmdline(&k, vec!["cc".to_string(), "-O3".to_string()]);
        second.save(&ledger_path).unwrap();

        let reloaded = Ledger::load(&ledger_path).unwrap();
        assert_eq!(
            reloaded.cmdlines_db.get(&k),
            Some(&vec!["cc".to_string(), "-O3".to_string()])
        );
    }
}
