use std::path::Path;

use crate::error::Error;
use crate::template::{Conventions, Template};

/// Name of the per-directory config file.
pub const CONFIG_FILE: &str = ".codefence.toml";

/// Project configuration loaded from `.codefence.toml`.
/// Every key is optional; absent keys keep the template's conventions.
#[derive(Debug, Default)]
pub struct Config {
    /// Entry path override, e.g. `/src/main.tsx`.
    entry: Option<String>,
    /// Entry marker search window override.
    marker_window: Option<usize>,
    /// Placeholder content override for empty projects.
    placeholder: Option<String>,
    /// Default template when a conversation does not name one.
    template: Option<Template>,
}

/// Raw TOML structure for `.codefence.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct CodefenceTomlConfig {
    /// Entry path override.
    #[serde(default)]
    entry: Option<String>,
    /// Entry marker search window override.
    #[serde(default)]
    marker_window: Option<usize>,
    /// Placeholder content override.
    #[serde(default)]
    placeholder: Option<String>,
    /// Template identifier.
    #[serde(default)]
    template: Option<String>,
}

impl Config {
    /// Conventions for `template`, falling back to the configured template, with overrides applied.
    pub fn conventions(&self, template: Option<Template>) -> Conventions {
        let mut conventions = Conventions::new(template.or(self.template));
        if let Some(entry) = &self.entry {
            conventions.entry_path.clone_from(entry);
        }
        if let Some(window) = self.marker_window {
            conventions.marker_window = window;
        }
        if let Some(placeholder) = &self.placeholder {
            conventions.placeholder.clone_from(placeholder);
        }
        return conventions;
    }

    /// Load config from `.codefence.toml` in the given root directory.
    /// Returns the defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed. A config file the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::TomlDe` if the TOML is malformed, or `Error::UnknownTemplate`
    /// if `template` names no known template.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Parse config from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed, `Error::UnknownTemplate`
    /// for an unrecognized template, or `Error::ConfigInvalid` for a zero marker window.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: CodefenceTomlConfig = toml::from_str(content)?;

        let template = raw.template.as_deref().map(parse_template).transpose()?;
        if raw.marker_window == Some(0) {
            return Err(Error::ConfigInvalid {
                reason: "`marker_window` must be at least 1".to_string(),
            });
        }

        return Ok(Self {
            entry: raw.entry,
            marker_window: raw.marker_window,
            placeholder: raw.placeholder,
            template,
        });
    }
}

/// Parse a template identifier.
///
/// # Errors
///
/// Returns `Error::UnknownTemplate` when the identifier is not recognized.
pub fn parse_template(identifier: &str) -> Result<Template, Error> {
    return Template::parse(identifier).ok_or_else(|| return Error::UnknownTemplate {
        name: identifier.to_string(),
    });
}
