//! Output format for rendered SealedSecrets

use std::fmt;

use super::resource::SealedResource;
use crate::error::SealerResult;

/// Serialization format for command output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    /// Render a SealedSecret in this format
    pub fn render(&self, sealed: &SealedResource) -> SealerResult<String> {
        match self {
            Self::Yaml => sealed.to_yaml(),
            Self::Json => {
                let mut json = sealed.to_json_pretty()?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
        }
    }
}
