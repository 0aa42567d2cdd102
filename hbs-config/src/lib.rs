//! Configuration loader for the hbs template engine.
//!
//! `defaults/hbs.default.toml` is embedded into the crate and always forms the bottom layer.
//! A [`Loader`] stacks project files, inline TOML and single-option overrides over it; later
//! layers win. Unknown keys are rejected so a misspelled option fails loudly.
//!
//! ```text
//! let config = Loader::new().with_optional_file("hbs.toml").set_render("strict", true)?.build()?;
//! let hbs = config.build_engine();
//! ```

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use hbs::hbs::helpers;
use hbs::{Handlebars, RenderOptions};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/hbs.default.toml");

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HbsConfig {
    pub render: RenderConfig,
    pub helpers: HelpersConfig,
}

/// Mirrors the knobs of [`RenderOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    pub no_escape: bool,
    pub strict: bool,
    pub assume_objects: bool,
    pub ignore_standalone: bool,
    pub prevent_indent: bool,
    pub explicit_partial_context: bool,
    pub allow_proto_properties_by_default: bool,
    pub allow_proto_methods_by_default: bool,
    pub max_depth: usize,
}

/// Which helper libraries to install next to the core helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HelpersConfig {
    pub logic: bool,
    pub string: bool,
    pub container: bool,
}

impl From<RenderConfig> for RenderOptions {
    fn from(config: RenderConfig) -> Self {
        RenderOptions {
            no_escape: config.no_escape,
            strict: config.strict,
            assume_objects: config.assume_objects,
            ignore_standalone: config.ignore_standalone,
            prevent_indent: config.prevent_indent,
            explicit_partial_context: config.explicit_partial_context,
            allow_proto_properties_by_default: config.allow_proto_properties_by_default,
            allow_proto_methods_by_default: config.allow_proto_methods_by_default,
            max_depth: config.max_depth,
            data: None,
        }
    }
}

impl HbsConfig {
    pub fn render_options(&self) -> RenderOptions {
        self.render.clone().into()
    }

    /// An engine with the core helpers plus the enabled libraries.
    pub fn build_engine(&self) -> Handlebars {
        let mut hbs = Handlebars::new();
        let registry = hbs.helpers_mut();
        if self.helpers.logic {
            helpers::register_logic(registry);
        }
        if self.helpers.string {
            helpers::register_string(registry);
        }
        if self.helpers.container {
            helpers::register_container(registry);
        }
        hbs
    }
}

/// Builds an [`HbsConfig`] from the embedded defaults plus any number of layers
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        Loader {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Layer a TOML file that must exist
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer_file(path.as_ref(), true)
    }

    /// Layer a TOML file when it exists, such as a per-project `hbs.toml`
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer_file(path.as_ref(), false)
    }

    /// Layer a TOML document held in memory
    pub fn with_toml(mut self, toml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(toml, FileFormat::Toml));
        self
    }

    fn layer_file(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Override one `[render]` option, e.g. `set_render("strict", true)`
    pub fn set_render<I>(self, option: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.set_override(&format!("render.{}", option), value)
    }

    /// Turn one helper library on or off
    pub fn set_library(self, library: &str, enabled: bool) -> Result<Self, ConfigError> {
        self.set_override(&format!("helpers.{}", library), enabled)
    }

    /// Override any key by its dotted path
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<HbsConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The configuration described by the embedded defaults alone
pub fn load_defaults() -> Result<HbsConfig, ConfigError> {
    Loader::new().build()
}
