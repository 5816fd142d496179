use crate::settings::Settings;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "picam-tui";
const SETTINGS_FILE: &str = "settings.json";
const SESSION_FILE: &str = "settings_session.json";

/// Where the editor reads and commits the user's settings.
pub trait SettingsRepository {
    /// A fresh copy of the current settings.
    fn current(&self) -> Settings;

    fn replace(&mut self, settings: Settings);

    /// Makes everything replaced so far durable.
    fn flush(&mut self) -> Result<()>;
}

/// Holds the working copy of an interrupted editing session.
pub trait SessionStash {
    fn stash(&mut self, settings: &Settings) -> Result<()>;

    /// Returns the stashed working copy and forgets it.
    fn take(&mut self) -> Result<Option<Settings>>;
}

#[derive(Debug)]
pub struct FileSettingsRepository {
    path: PathBuf,
    current: Settings,
}

impl FileSettingsRepository {
    pub fn open(path: PathBuf) -> Result<Self> {
        let current = read_json::<Settings>(&path, "settings")?
            .map(Settings::normalized)
            .unwrap_or_default();
        Ok(Self { path, current })
    }

    /// Repository for `path` holding default settings, whatever the file has.
    #[must_use]
    pub fn with_defaults(path: PathBuf) -> Self {
        Self {
            path,
            current: Settings::default(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsRepository for FileSettingsRepository {
    fn current(&self) -> Settings {
        self.current.clone()
    }

    fn replace(&mut self, settings: Settings) {
        self.current = settings;
    }

    fn flush(&mut self) -> Result<()> {
        write_json(&self.path, &self.current, "settings")
    }
}

#[derive(Debug)]
pub struct FileSessionStash {
    path: PathBuf,
}

impl FileSessionStash {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Drops a stashed session without reading it.
    pub fn discard(&self) -> Result<()> {
        remove_if_exists(&self.path)
    }
}

impl SessionStash for FileSessionStash {
    fn stash(&mut self, settings: &Settings) -> Result<()> {
        write_json(&self.path, settings, "session")
    }

    fn take(&mut self) -> Result<Option<Settings>> {
        // A stash is consumed even when it cannot be parsed.
        let stashed = read_json::<Settings>(&self.path, "session");
        remove_if_exists(&self.path)?;
        Ok(stashed?.map(Settings::normalized))
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySettingsRepository {
    pub current: Settings,
    pub flushed: Option<Settings>,
    pub flush_count: usize,
}

#[cfg(test)]
impl SettingsRepository for MemorySettingsRepository {
    fn current(&self) -> Settings {
        self.current.clone()
    }

    fn replace(&mut self, settings: Settings) {
        self.current = settings;
    }

    fn flush(&mut self) -> Result<()> {
        self.flushed = Some(self.current.clone());
        self.flush_count += 1;
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySessionStash {
    pub stashed: Option<Settings>,
}

#[cfg(test)]
impl SessionStash for MemorySessionStash {
    fn stash(&mut self, settings: &Settings) -> Result<()> {
        self.stashed = Some(settings.clone());
        Ok(())
    }

    fn take(&mut self) -> Result<Option<Settings>> {
        Ok(self.stashed.take())
    }
}

pub fn settings_path() -> Result<PathBuf> {
    scoped_path(SETTINGS_FILE)
}

/// Session file kept beside the settings file it belongs to.
#[must_use]
pub fn session_path_for(settings_path: &Path) -> PathBuf {
    settings_path.with_file_name(SESSION_FILE)
}

pub fn data_dir() -> Result<PathBuf> {
    Ok(data_root()?.join(APP_DIR))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading {what} at {}", path.display()))?;
    let parsed = serde_json::from_str::<T>(&raw)
        .with_context(|| format!("failed parsing {what} at {}", path.display()))?;
    Ok(Some(parsed))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T, what: &str) -> Result<()> {
    ensure_parent_dir(path)?;

    let payload =
        serde_json::to_string_pretty(value).with_context(|| format!("failed serializing {what}"))?;
    fs::write(path, payload)
        .with_context(|| format!("failed writing {what} at {}", path.display()))?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("failed removing {}", path.display()))?;
    }
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating data directory {}", parent.display()))?;
    }
    Ok(())
}

fn data_root() -> Result<PathBuf> {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .context("unable to determine user data directory")
}

fn scoped_path(file: &str) -> Result<PathBuf> {
    Ok(data_dir()?.join(file))
}

#[cfg(test)]
mod tests {
    use super::{
        FileSessionStash, FileSettingsRepository, SessionStash, SettingsRepository,
        session_path_for,
    };
    use crate::settings::{ConnectionType, Settings};
    use std::fs;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileSettingsRepository::open(dir.path().join("settings.json"))
            .expect("open should succeed");
        assert_eq!(repo.current(), Settings::default());
    }

    #[test]
    fn replace_is_not_durable_until_flush() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.json");
        let mut repo = FileSettingsRepository::open(path.clone()).expect("open");

        let mut edited = repo.current();
        edited.camera_name = "Garage".to_owned();
        edited.scan_timeout = 750;
        repo.replace(edited.clone());
        assert!(!path.exists());

        repo.flush().expect("flush");
        let reopened = FileSettingsRepository::open(path).expect("reopen");
        assert_eq!(reopened.current(), edited);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").expect("write");

        let err = FileSettingsRepository::open(path).expect_err("should fail");
        assert!(format!("{err:#}").contains("failed parsing settings"));
    }

    #[test]
    fn unreadable_session_stash_is_removed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = session_path_for(&dir.path().join("settings.json"));
        fs::write(&path, "{ garbage").expect("write");
        let mut stash = FileSessionStash::new(path.clone());

        let err = stash.take().expect_err("corrupt stash");
        assert!(format!("{err:#}").contains("failed parsing session"));
        assert!(!path.exists());
        assert_eq!(stash.take().expect("take"), None);
    }

    #[test]
    fn with_defaults_overwrites_malformed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "garbage").expect("write");

        let mut repo = FileSettingsRepository::with_defaults(path.clone());
        repo.flush().expect("flush");

        let reopened = FileSettingsRepository::open(path).expect("reopen");
        assert_eq!(reopened.current(), Settings::default());
    }

    #[test]
    fn loaded_slots_are_normalized() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.raw_multicast_source.connection_type = ConnectionType::RawHttp;
        fs::write(&path, serde_json::to_string(&settings).expect("encode")).expect("write");

        let repo = FileSettingsRepository::open(path).expect("open");
        assert_eq!(
            repo.current().raw_multicast_source.connection_type,
            ConnectionType::RawMulticast
        );
    }

    #[test]
    fn session_stash_is_consumed_by_take() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = session_path_for(&dir.path().join("settings.json"));
        let mut stash = FileSessionStash::new(path.clone());

        assert_eq!(stash.take().expect("take"), None);

        let mut settings = Settings::default();
        settings.camera_name = "Half edited".to_owned();
        stash.stash(&settings).expect("stash");
        assert!(path.exists());

        assert_eq!(stash.take().expect("take"), Some(settings));
        assert!(!path.exists());
        assert_eq!(stash.take().expect("take"), None);
    }
}
