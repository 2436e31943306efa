//! INI documents as read by `limits.conf` and the provider config file.
//!
//! The file is read by `config` and split into the `DEFAULT` section (including keys before the first header) and
//! named sections. A named section sees every `DEFAULT` key it does not override. Keys are case-insensitive.

use {
    crate::error::ConfigError,
    config::{Config, File, FileFormat, Map, Source, Value, ValueKind},
    log::trace,
    serde::de::DeserializeOwned,
};

pub(crate) const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Clone, Debug, Default)]
pub(crate) struct IniSections {
    defaults: Map<String, Value>,
    sections: Map<String, Map<String, Value>>,
}

impl IniSections {
    pub(crate) fn parse(text: &str) -> Result<Self, ConfigError> {
        let folded = fold_continuations(text);
        let root = Config::builder().add_source(File::from_str(&folded, FileFormat::Ini)).build()?.collect()?;

        let mut result = Self::default();
        for (name, value) in root {
            match value.kind {
                ValueKind::Table(table) if name.eq_ignore_ascii_case(DEFAULT_SECTION) => {
                    result.defaults.extend(lowercase_keys(table))
                }
                ValueKind::Table(table) => {
                    result.sections.insert(name, lowercase_keys(table));
                }
                kind => {
                    result.defaults.insert(name.to_lowercase(), Value::new(None, kind));
                }
            }
        }

        trace!("Read {} default keys and {} sections", result.defaults.len(), result.sections.len());
        Ok(result)
    }

    /// `DEFAULT` exists whenever it holds at least one key; other sections exist once their header is seen.
    pub(crate) fn has_section(&self, name: &str) -> bool {
        if name.eq_ignore_ascii_case(DEFAULT_SECTION) {
            !self.defaults.is_empty()
        } else {
            self.find(name).is_some()
        }
    }

    /// Deserialize `name` merged over `DEFAULT`.
    pub(crate) fn section<T: DeserializeOwned>(&self, name: &str) -> Result<T, ConfigError> {
        let mut merged = self.defaults.clone();
        if !name.eq_ignore_ascii_case(DEFAULT_SECTION) {
            if let Some(values) = self.find(name) {
                merged.extend(values.clone());
            }
        }

        Ok(Value::new(None, ValueKind::Table(merged)).try_deserialize()?)
    }

    fn find(&self, name: &str) -> Option<&Map<String, Value>> {
        self.sections
            .get(name)
            .or_else(|| self.sections.iter().find(|(section, _)| section.eq_ignore_ascii_case(name)).map(|(_, v)| v))
    }
}

fn lowercase_keys(table: Map<String, Value>) -> Map<String, Value> {
    table.into_iter().map(|(key, value)| (key.to_lowercase(), value)).collect()
}

/// Join indented lines onto the entry above them, across blank lines, and drop comment lines. Values end up
/// whitespace separated on a single line.
fn fold_continuations(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut in_entry = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if in_entry && line.starts_with([' ', '\t']) {
            if let Some(last) = lines.last_mut() {
                last.push(' ');
                last.push_str(trimmed);
                continue;
            }
        }

        in_entry = !trimmed.starts_with('[');
        lines.push(trimmed.to_string());
    }

    lines.join("\n")
}
