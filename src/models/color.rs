use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A color with its user-facing name, as listed in the project's color table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedColor {
    pub name: String,
    pub color: String,
}

/// Parse a hex color into lowercase `#rrggbb`.
///
/// Short forms are expanded (`#abc` → `#aabbcc`, `#abcd` drops the alpha
/// digit), long forms lose their alpha channel. Returns `None` unless the
/// input is 3, 4, 6 or 8 hex digits with an optional leading `#`.
pub fn parse_hex_color(color: &str) -> Option<String> {
    let trimmed = color.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digits: Vec<char> = digits.chars().map(|c| c.to_ascii_lowercase()).collect();

    let doubled = |chars: &[char]| chars.iter().flat_map(|&c| [c, c]).collect::<String>();

    let body = match digits.len() {
        3 => doubled(&digits),
        4 => doubled(&digits[..3]),
        6 | 8 => digits[..6].iter().collect(),
        _ => return None,
    };

    Some(format!("#{}", body))
}

/// Normalize a hex color to lowercase `#rrggbb`. Anything that does not
/// parse as a hex color is returned unchanged.
pub fn normalize_hex_color(color: &str) -> String {
    parse_hex_color(color).unwrap_or_else(|| color.to_string())
}

/// The project's registry of named colors, keyed by normalized color.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorTable {
    names_by_color: BTreeMap<String, String>,
}

impl ColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or rename a color. The color is normalized first.
    pub fn set(&mut self, color: &str, name: Option<&str>) {
        self.names_by_color
            .insert(normalize_hex_color(color), name.unwrap_or("").to_string());
    }

    /// The name of a color, `None` when unknown or unnamed.
    pub fn name_of(&self, color: &str) -> Option<&str> {
        self.names_by_color
            .get(color)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    pub fn contains(&self, color: &str) -> bool {
        self.names_by_color.contains_key(color)
    }

    pub fn len(&self) -> usize {
        self.names_by_color.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names_by_color.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NamedColor> + '_ {
        self.names_by_color.iter().map(|(color, name)| NamedColor {
            name: name.clone(),
            color: color.clone(),
        })
    }

    /// Entries sorted by name, for pickers and panels.
    pub fn alphabetically(&self) -> Vec<NamedColor> {
        let mut colors: Vec<_> = self.iter().collect();
        colors.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.color.cmp(&b.color)));
        colors
    }
}

impl FromIterator<NamedColor> for ColorTable {
    fn from_iter<I: IntoIterator<Item = NamedColor>>(iter: I) -> Self {
        let mut table = ColorTable::new();
        for entry in iter {
            table.set(&entry.color, Some(&entry.name));
        }
        table
    }
}
