use std::path::Path;

use serde::Deserialize;

const DEFAULT_THEME: &str = "github_light";
const FONT_FAMILY: &str = "sans-serif";
const MONO_FONT_FAMILY: &str = "monospace";

const BUILTIN_THEMES: &[(&str, &str)] = &[
    ("dracula", include_str!("../themes/dracula.toml")),
    ("github_dark", include_str!("../themes/github_dark.toml")),
    ("github_light", include_str!("../themes/github_light.toml")),
    ("nord", include_str!("../themes/nord.toml")),
    ("solarized_dark", include_str!("../themes/solarized_dark.toml")),
    ("solarized_light", include_str!("../themes/solarized_light.toml")),
];

/// Diagram colors, taken from an Alacritty terminal color scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background_color: String,
    pub text_color: String,
    pub directory_color: String,
    pub leaf_color: String,
    pub connector_color: String,
    pub panel_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_builtin(DEFAULT_THEME).unwrap_or_else(|_| Self::github_light())
    }
}

#[derive(Debug, Deserialize)]
struct AlacrittyColors {
    primary: AlacrittyPrimary,
    normal: AlacrittyNormal,
}

#[derive(Debug, Deserialize)]
struct AlacrittyPrimary {
    background: String,
    foreground: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyNormal {
    black: String,
    blue: String,
    cyan: String,
    white: String,
}

#[derive(Debug, Deserialize)]
struct AlacrittyTheme {
    colors: AlacrittyColors,
}

impl Theme {
    pub fn github_light() -> Self {
        Theme {
            background_color: "#ffffff".to_string(),
            text_color: "#24292f".to_string(),
            directory_color: "#0969da".to_string(),
            leaf_color: "#1b7c83".to_string(),
            connector_color: "#6e7781".to_string(),
            panel_color: "#f6f8fa".to_string(),
        }
    }

    pub fn from_builtin(name: &str) -> Result<Self, String> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        let content = BUILTIN_THEMES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, c)| *c)
            .ok_or_else(|| {
                format!(
                    "Unknown built-in theme '{}'. Available: {}",
                    name,
                    Self::list_builtins().join(", ")
                )
            })?;
        Self::from_alacritty_toml(content)
    }

    pub fn list_builtins() -> Vec<&'static str> {
        BUILTIN_THEMES.iter().map(|(n, _)| *n).collect()
    }

    /// Resolve a `--theme` argument: an existing file is parsed as Alacritty
    /// TOML, then YAML; anything else is looked up as a built-in name.
    pub fn resolve(name_or_path: &str) -> Result<Self, String> {
        let path = Path::new(name_or_path);
        if !path.is_file() {
            return Self::from_builtin(name_or_path);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read theme file: {}", e))?;

        // Alacritty moved to TOML, so try that first.
        if let Ok(theme) = Self::from_alacritty_toml(&content) {
            Ok(theme)
        } else if let Ok(theme) = Self::from_alacritty_yaml(&content) {
            Ok(theme)
        } else {
            Err(format!(
                "Failed to parse theme file {} as TOML or YAML",
                path.display()
            ))
        }
    }

    pub fn from_alacritty_yaml(content: &str) -> Result<Self, String> {
        let alacritty: AlacrittyTheme = serde_yaml::from_str(content)
            .map_err(|e| format!("Failed to parse Alacritty YAML: {}", e))?;

        Ok(Self::from_alacritty_theme(alacritty))
    }

    pub fn from_alacritty_toml(content: &str) -> Result<Self, String> {
        let alacritty: AlacrittyTheme = toml::from_str(content)
            .map_err(|e| format!("Failed to parse Alacritty TOML: {}", e))?;

        Ok(Self::from_alacritty_theme(alacritty))
    }

    fn from_alacritty_theme(alacritty: AlacrittyTheme) -> Self {
        let colors = alacritty.colors;

        Theme {
            background_color: colors.primary.background,
            text_color: colors.primary.foreground,
            directory_color: colors.normal.blue,
            leaf_color: colors.normal.cyan,
            connector_color: colors.normal.white,
            panel_color: colors.normal.black,
        }
    }
}

/// Font family to name in the SVG, matching what labels were measured with.
pub fn font_family(monospace: bool) -> &'static str {
    if monospace {
        MONO_FONT_FAMILY
    } else {
        FONT_FAMILY
    }
}

#[cfg(test)]
mod tests {
    use super::Theme;

    #[test]
    fn from_builtin_accepts_hyphenated_and_case_insensitive_names() {
        let underscore = Theme::from_builtin("solarized_light").expect("underscore variant");
        let hyphen = Theme::from_builtin("Solarized-Light").expect("hyphen variant");
        assert_eq!(underscore, hyphen);
    }

    #[test]
    fn every_builtin_parses() {
        for name in Theme::list_builtins() {
            Theme::from_builtin(name).unwrap_or_else(|e| panic!("{name}: {e}"));
        }
    }

    #[test]
    fn unknown_builtin_lists_available() {
        let err = Theme::from_builtin("neon").unwrap_err();
        assert!(err.contains("nord"), "{err}");
    }

    #[test]
    fn maps_alacritty_yaml_colors() {
        let yaml = r##"
colors:
  primary:
    background: "#101010"
    foreground: "#e0e0e0"
  normal:
    black: "#202020"
    blue: "#3060ff"
    cyan: "#30c0c0"
    white: "#c0c0c0"
"##;
        let theme = Theme::from_alacritty_yaml(yaml).unwrap();
        assert_eq!(theme.background_color, "#101010");
        assert_eq!(theme.directory_color, "#3060ff");
        assert_eq!(theme.leaf_color, "#30c0c0");
        assert_eq!(theme.connector_color, "#c0c0c0");
        assert_eq!(theme.panel_color, "#202020");
    }

    #[test]
    fn resolve_reads_theme_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[colors.primary]\nbackground = '#000000'\nforeground = '#ffffff'\n\
             [colors.normal]\nblack = '#111111'\nblue = '#0000ff'\ncyan = '#00ffff'\nwhite = '#eeeeee'\n",
        )
        .unwrap();

        let theme = Theme::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(theme.background_color, "#000000");
        assert_eq!(Theme::resolve("nord").unwrap(), Theme::from_builtin("nord").unwrap());
    }
}
