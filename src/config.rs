use crate::error::Error;
use crate::store::StoreKind;
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::fs::File;
use std::io::BufReader;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub type Shared = Arc<Config>;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[serde_as]
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub port: u16,
    pub root: PathBuf,
    pub dotfiles: bool,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
    pub store: StoreKind,
    pub temp_dir: Option<PathBuf>,
    pub max_body_bytes: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            root: PathBuf::from("."),
            dotfiles: false,
            timeout: DEFAULT_TIMEOUT,
            store: StoreKind::default(),
            temp_dir: None,
            max_body_bytes: None,
        }
    }
}

impl Config {
    /// Load a [`Config`] from the JSON file at the given path. Fields missing from the file take
    /// their default values. The result is not validated, callers are expected to apply any
    /// overrides and then call [`Config::validate`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::IO`] if the path can't be opened, or [`Error::InvalidJSON`] if its
    /// content isn't a valid config.
    pub fn try_from_file(p: impl AsRef<Path>) -> Result<Self, Error> {
        let f = File::open(p)?;
        let reader = BufReader::new(f);
        let conf: Config = serde_json::from_reader(reader)?;
        Ok(conf)
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidRoot`] if `root` isn't an existing directory, and
    /// [`Error::InvalidTimeout`] for a zero `timeout`.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.root.is_dir() {
            return Err(Error::InvalidRoot(self.root.clone()));
        }
        if self.timeout.is_zero() {
            return Err(Error::InvalidTimeout);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Build the on-disk path for a `/file/{path}` segment by plain concatenation onto `root`.
    pub fn file_path(&self, segment: &str) -> PathBuf {
        let root = self.root.to_string_lossy();
        if root.ends_with('/') {
            PathBuf::from(format!("{root}{segment}"))
        } else {
            PathBuf::from(format!("{root}/{segment}"))
        }
    }
}
