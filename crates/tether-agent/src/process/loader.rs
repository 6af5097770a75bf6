//! Configuration loading seam for the launcher.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};

use tether_config::Config;

/// Loads agent configuration.
pub trait ConfigLoader: Send + Sync {
    /// Loads the configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that layers configuration files, environment and command line.
///
/// Reads the process arguments unless explicit arguments were supplied.
#[derive(Debug, Default, Clone)]
pub struct SystemConfigLoader {
    args: Option<Vec<OsString>>,
}

impl SystemConfigLoader {
    /// Loader over the process arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader over `args`, the first of which is the program name.
    #[must_use]
    pub fn with_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self {
            args: Some(args.into_iter().map(Into::into).collect()),
        }
    }
}

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        match &self.args {
            Some(args) => Config::load_from_iter(args.iter().cloned()),
            None => Config::load(),
        }
    }
}

/// Loader returning a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}
