//! Config extraction errors.

use figment::providers::{Format, Toml};
use std::{collections::HashSet, error::Error, fmt};

/// The message prefixed to every failed extraction.
pub const FAILED_TO_EXTRACT_CONFIG_MSG: &str = "failed to extract swap config:";

/// Represents a failed attempt to extract [`SwapConfig`](crate::SwapConfig) from a `Figment`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractConfigError {
    /// error thrown when extracting the config
    pub(crate) error: figment::Error,
}

impl ExtractConfigError {
    /// Wraps the figment error
    pub fn new(error: figment::Error) -> Self {
        Self { error }
    }

    /// Returns the underlying figment error.
    pub fn figment_error(&self) -> &figment::Error {
        &self.error
    }
}

impl fmt::Display for ExtractConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut unique_errors = Vec::with_capacity(self.error.count());
        let mut unique = HashSet::with_capacity(self.error.count());
        for err in self.error.clone() {
            let from_toml = err
                .metadata
                .as_ref()
                .map(|meta| meta.name.contains(Toml::NAME))
                .unwrap_or_default();
            let err = SwapConfigError { error: err, from_toml };
            if unique.insert(err.to_string()) {
                unique_errors.push(err);
            }
        }
        writeln!(f, "{FAILED_TO_EXTRACT_CONFIG_MSG}")?;
        for err in unique_errors {
            writeln!(f, "{err}")?;
        }
        Ok(())
    }
}

impl Error for ExtractConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Error::source(&self.error)
    }
}

/// A single extraction failure, tagged with where it came from.
#[derive(Clone, Debug, PartialEq)]
struct SwapConfigError {
    error: figment::Error,
    from_toml: bool,
}

impl fmt::Display for SwapConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from_toml {
            f.write_str("swap.toml error: ")?;
        } else {
            f.write_str("swap config error: ")?;
        }
        write!(f, "{}", self.error)?;
        if !self.error.path.is_empty() {
            // the path holds the offending setting, like `["default_chain_id"]`
            write!(f, " for setting `{}`", self.error.path.join("."))?;
        }
        Ok(())
    }
}
