//! repository configuration (`.git/config`)
//!
//! grounded on the teacher's `config.rs`, keeping its `git-config` dependency
//! for the parsing/writing concern itself (the format's grammar, however
//! deviant, is exactly the subsystem that dependency exists for) while
//! dropping the teacher's global-scope lookup and path-interning arena —
//! spec.md only ever reads and writes the local `.git/config`.

use crate::error::BitResult;
use git_config::file::GitConfig;
use git_config::values::{Boolean, Integer};
use std::borrow::Cow;
use std::convert::TryFrom;
use std::path::PathBuf;
use std::str::FromStr;

/// the raw text of a config file, reparsed through [`GitConfig`] on every
/// access rather than held as a borrowed, lifetime-tied value — this crate
/// re-reads and re-renders on each write the same way `index.rs` does, so
/// there is no cache to keep in sync
#[derive(Debug, Clone, Default)]
pub struct Config {
    contents: String,
    path: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(path: impl Into<PathBuf>) -> BitResult<Self> {
        let path = path.into();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(err.into()),
        };
        Self::parse(&contents)?;
        Ok(Self { contents, path: Some(path) })
    }

    /// validate that `contents` parses as a git config file, returning it
    /// wrapped up ready for storage
    fn parse(contents: &str) -> BitResult<Self> {
        GitConfig::try_from(contents).map_err(|err| anyhow!("malformed config: {}", err))?;
        Ok(Self { contents: contents.to_owned(), path: None })
    }

    fn inner(&self) -> GitConfig<'_> {
        GitConfig::try_from(self.contents.as_str()).expect("contents were validated in `open`/`parse`")
    }

    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        let value = self.inner().value(section, None, key).ok()?;
        Some(String::from_utf8_lossy(&value).into_owned())
    }

    pub fn get_bool(&self, section: &str, key: &str) -> BitResult<Option<bool>> {
        match self.get(section, key) {
            None => Ok(None),
            Some(raw) => {
                let parsed = Boolean::try_from(raw.clone())
                    .map_err(|_| anyhow!("`{}.{}`: expected a boolean, found `{}`", section, key, raw))?;
                Ok(Some(matches!(parsed, Boolean::True(_))))
            }
        }
    }

    pub fn get_u32(&self, section: &str, key: &str) -> BitResult<Option<u32>> {
        match self.get(section, key) {
            None => Ok(None),
            Some(raw) => {
                let parsed = Integer::from_str(&raw)
                    .map_err(|_| anyhow!("`{}.{}`: expected an integer, found `{}`", section, key, raw))?;
                let value = parsed.value << parsed.suffix.map(|suffix| suffix.bitwise_offset()).unwrap_or(0);
                u32::try_from(value)
                    .map(Some)
                    .map_err(|_| anyhow!("`{}.{}`: integer `{}` does not fit in a u32", section, key, raw))
            }
        }
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        let value = value.into();
        let mut inner = self.inner();
        match inner.section_mut(section, None) {
            Ok(mut existing) => existing.set(Cow::Owned(key.to_owned()), Cow::Owned(value.into_bytes())),
            Err(..) => {
                let mut new_section = inner.new_section(Cow::Owned(section.to_owned()), None);
                new_section.set(Cow::Owned(key.to_owned()), Cow::Owned(value.into_bytes()));
            }
        }
        let bytes: Vec<u8> = (&inner).into();
        self.contents = String::from_utf8(bytes).expect("git-config only ever serializes valid utf8");
    }

    pub fn render(&self) -> String {
        self.contents.clone()
    }

    pub fn write(&self) -> BitResult<()> {
        let path = self.path.as_deref().ok_or_else(|| anyhow!("config has no backing path"))?;
        crate::lockfile::write_atomic(path, self.contents.as_bytes())
    }
}

/// the `core.*` subset of config that bit itself consults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreConfig {
    pub repositoryformatversion: u32,
    pub filemode: bool,
    pub bare: bool,
}

impl CoreConfig {
    pub const SUPPORTED_FORMAT_VERSION: u32 = 0;

    pub fn from_config(config: &Config) -> BitResult<Self> {
        let repositoryformatversion =
            config.get_u32("core", "repositoryformatversion")?.unwrap_or(Self::SUPPORTED_FORMAT_VERSION);
        if repositoryformatversion != Self::SUPPORTED_FORMAT_VERSION {
            return Err(crate::error::BitError::UnsupportedFormat(repositoryformatversion).into());
        }
        Ok(Self {
            repositoryformatversion,
            filemode: config.get_bool("core", "filemode")?.unwrap_or(true),
            bare: config.get_bool("core", "bare")?.unwrap_or(false),
        })
    }

    /// defaults written by `init` (spec.md S2: `repositoryformatversion = 0,
    /// filemode = false, bare = false`)
    pub fn write_defaults(config: &mut Config) {
        config.set("core", "repositoryformatversion", Self::SUPPORTED_FORMAT_VERSION.to_string());
        config.set("core", "filemode", "false");
        config.set("core", "bare", "false");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sections_and_values() {
        let contents = "[core]\n\trepositoryformatversion = 0\n\tfilemode = true\n\tbare = false\n";
        let config = Config::parse(contents).unwrap();
        assert_eq!(config.get("core", "repositoryformatversion"), Some("0".to_owned()));
        assert_eq!(config.get_bool("core", "filemode").unwrap(), Some(true));
    }

    #[test]
    fn rejects_unsupported_format_version() {
        let mut config = Config::new();
        config.set("core", "repositoryformatversion", "1");
        assert!(CoreConfig::from_config(&config).is_err());
    }

    #[test]
    fn roundtrips_through_render_and_parse() {
        let mut config = Config::new();
        CoreConfig::write_defaults(&mut config);
        let rendered = config.render();
        let reparsed = Config::parse(&rendered).unwrap();
        assert_eq!(reparsed.get("core", "filemode"), Some("false".to_owned()));
    }

    #[test]
    fn rejects_an_unterminated_section_header() {
        assert!(Config::parse("[core\n\tfilemode = true\n").is_err());
    }

    #[test]
    fn open_missing_file_yields_empty_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::open(tmp.path().join("config")).unwrap();
        assert!(config.get("core", "filemode").is_none());
    }

    #[test]
    fn write_then_open_roundtrips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config");
        let mut config = Config::open(&path).unwrap();
        CoreConfig::write_defaults(&mut config);
        config.write().unwrap();
        let reopened = Config::open(&path).unwrap();
        assert_eq!(reopened.get("core", "repositoryformatversion"), Some("0".to_owned()));
    }
}
