//! Editor colors, overridable through `theme.json` in the data directory.
//!
//! The file maps role names to `#RRGGBB` strings. Roles left out keep their
//! built-in color; unknown roles are logged and skipped.

use crate::store;
use anyhow::{Context, Result, anyhow};
use ratatui::style::Color;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

const THEME_FILE: &str = "theme.json";

#[derive(Debug, Clone, Copy)]
pub struct ThemePalette {
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub border_active: Color,
    pub accent: Color,
    pub field: Color,
    pub success: Color,
    pub error: Color,
}

impl Default for ThemePalette {
    fn default() -> Self {
        Self {
            text: Color::Rgb(231, 235, 243),
            muted: Color::Rgb(145, 152, 170),
            border: Color::Rgb(88, 98, 120),
            border_active: Color::Rgb(114, 140, 255),
            accent: Color::Rgb(102, 216, 255),
            field: Color::Rgb(36, 41, 56),
            success: Color::Rgb(103, 212, 142),
            error: Color::Rgb(255, 121, 134),
        }
    }
}

type RoleSlot = fn(&mut ThemePalette) -> &mut Color;

const ROLES: [(&str, RoleSlot); 8] = [
    ("text", |p| &mut p.text),
    ("muted", |p| &mut p.muted),
    ("border", |p| &mut p.border),
    ("border_active", |p| &mut p.border_active),
    ("accent", |p| &mut p.accent),
    ("field", |p| &mut p.field),
    ("success", |p| &mut p.success),
    ("error", |p| &mut p.error),
];

impl ThemePalette {
    fn to_roles(mut self) -> BTreeMap<String, String> {
        ROLES
            .iter()
            .map(|(name, slot)| ((*name).to_owned(), to_hex(*slot(&mut self))))
            .collect()
    }

    fn with_overrides(mut self, roles: &BTreeMap<String, String>) -> Result<Self> {
        for (name, value) in roles {
            let Some((_, slot)) = ROLES.iter().find(|(role, _)| *role == name.as_str()) else {
                warn!("ignoring unknown theme role '{name}'");
                continue;
            };
            *slot(&mut self) = parse_hex_color(name, value)?;
        }
        Ok(self)
    }
}

pub fn load_or_create_theme() -> Result<ThemePalette> {
    load_or_create_theme_at(&store::data_dir()?.join(THEME_FILE))
}

fn load_or_create_theme_at(path: &Path) -> Result<ThemePalette> {
    let defaults = ThemePalette::default();
    if !path.exists() {
        write_roles(path, &defaults.to_roles())?;
        return Ok(defaults);
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading theme config at {}", path.display()))?;
    let roles = serde_json::from_str::<BTreeMap<String, String>>(&raw)
        .with_context(|| format!("failed parsing theme config at {}", path.display()))?;
    defaults.with_overrides(&roles)
}

fn write_roles(path: &Path, roles: &BTreeMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating theme directory {}", parent.display()))?;
    }
    let payload = serde_json::to_string_pretty(roles).context("failed serializing theme config")?;
    fs::write(path, payload)
        .with_context(|| format!("failed writing theme config at {}", path.display()))
}

fn to_hex(color: Color) -> String {
    match color {
        Color::Rgb(red, green, blue) => format!("#{red:02X}{green:02X}{blue:02X}"),
        other => other.to_string(),
    }
}

fn parse_hex_color(role: &str, value: &str) -> Result<Color> {
    let input = value.trim();
    let hex = input.strip_prefix('#').unwrap_or(input);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(anyhow!(
            "theme role '{role}' must be a hex color like #RRGGBB, got '{value}'"
        ));
    }
    let packed = u32::from_str_radix(hex, 16)
        .with_context(|| format!("theme role '{role}' is not valid hex"))?;
    let [_, red, green, blue] = packed.to_be_bytes();
    Ok(Color::Rgb(red, green, blue))
}
