//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/springtree/springtree.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `SPRINGTREE_*` prefix, `__` between section and key
//!    (e.g. `SPRINGTREE_VIEW__ROOT_LABEL=Top`, `SPRINGTREE_VIEW__PADDING=10,10,10,10`)

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, SpringConfig, ViewOptions};
use crate::domain::{Canvas, FieldNames, Insets, LayoutOptions};

/// Display settings of the tree view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    /// Label of the synthetic root node
    pub root_label: String,
    /// Record field holding the identifier
    pub id_field: String,
    /// Record field holding the parent identifier
    pub parent_field: String,
    /// Record field holding the label
    pub label_field: String,
    /// Shown for records without a label
    pub default_label: String,
    pub width: f64,
    pub height: f64,
    /// `[top, right, bottom, left]`
    pub padding: Insets,
    pub font_size: f64,
    pub node_radius: f64,
    /// Scale of the selected node
    pub selected_scale: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        let options = ViewOptions::default();
        Self {
            root_label: options.root_label,
            id_field: options.fields.id,
            parent_field: options.fields.parent_id,
            label_field: options.fields.label,
            default_label: options.default_label,
            width: options.canvas.width,
            height: options.canvas.height,
            padding: options.canvas.padding,
            font_size: options.font_size,
            node_radius: options.node_radius,
            selected_scale: options.selected_scale,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub view: ViewConfig,
    pub spring: SpringConfig,
    pub layout: LayoutOptions,
}

/// Returns the global config directory: `$XDG_CONFIG_HOME/springtree/`
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "springtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the global config file path: `$XDG_CONFIG_HOME/springtree/springtree.toml`
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("springtree.toml"))
}

impl Settings {
    /// Load settings from all layers.
    ///
    /// A `local` file must exist; a missing global file is skipped.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), local)
    }

    /// Load settings with an explicit global config location.
    pub fn load_from(global: Option<&Path>, local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&Self::default()).map_err(config_err)?);

        if let Some(global_path) = global {
            if global_path.exists() {
                debug!(path = %global_path.display(), "loading global config");
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        if let Some(local_path) = local {
            debug!(path = %local_path.display(), "loading local config");
            builder = builder.add_source(File::from(local_path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("SPRINGTREE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("view.padding"),
        );

        let settings: Self = builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(config_err)?;
        settings.view_options().validate()?;
        Ok(settings)
    }

    /// Options for a `TreeView` built from these settings.
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            root_label: self.view.root_label.clone(),
            fields: FieldNames {
                id: self.view.id_field.clone(),
                parent_id: self.view.parent_field.clone(),
                label: self.view.label_field.clone(),
            },
            default_label: self.view.default_label.clone(),
            canvas: Canvas {
                width: self.view.width,
                height: self.view.height,
                padding: self.view.padding,
            },
            font_size: self.view.font_size,
            node_radius: self.view.node_radius,
            selected_scale: self.view.selected_scale,
            spring: self.spring,
            layout: self.layout,
        }
    }

    /// Serialize current settings to TOML format.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a commented template configuration file.
    pub fn template() -> String {
        r#"# springtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/springtree/springtree.toml
#   Local:  file passed with --config
#   Env:    SPRINGTREE_<SECTION>__<KEY>, e.g. SPRINGTREE_VIEW__ROOT_LABEL=Top

[view]
# Label of the synthetic root every top-level record hangs from
# root_label = "ROOT"

# Record fields holding identifier, parent identifier and label
# id_field = "id"
# parent_field = "parentId"
# label_field = "name"

# Shown for records without a label
# default_label = "(No Value)"

# Drawing surface and its padding [top, right, bottom, left]
# width = 800.0
# height = 500.0
# padding = [20.0, 120.0, 20.0, 120.0]

# font_size = 12.0
# node_radius = 3.0

# Scale of the selected node
# selected_scale = 1.15

[spring]
# Presets (stiffness/damping): no_wobble 170/26, gentle 120/14,
# wobbly 180/12, stiff 210/20
# stiffness = 170.0
# damping = 26.0
# precision = 0.01

[layout]
# Horizontal separation between siblings and between cousins
# sibling_separation = 1.0
# subtree_separation = 2.0
"#
        .to_string()
    }
}

fn config_err(e: config::ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_files_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None, None).expect("load defaults");
        assert_eq!(settings.view.root_label, "ROOT");
        assert_eq!(settings.view.padding, Insets::new(20.0, 120.0, 20.0, 120.0));
        assert_eq!(settings.spring, SpringConfig::no_wobble());
        assert_eq!(settings.layout, LayoutOptions::default());
    }

    #[test]
    fn given_defaults_when_converting_then_matches_view_defaults() {
        assert_eq!(Settings::default().view_options(), ViewOptions::default());
    }

    #[test]
    fn given_settings_when_to_toml_then_parses_back() {
        let settings = Settings::default();
        let text = settings.to_toml().unwrap();
        assert!(text.contains("[view]"));
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn given_template_when_parsed_then_equals_defaults() {
        let parsed: Settings = toml::from_str(&Settings::template()).unwrap();
        assert_eq!(parsed, Settings::default());
    }
}
