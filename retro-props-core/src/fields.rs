//! Ordered, tabbed field tree produced by analyzers.
//!
//! Field order is insertion order. Each field belongs to one tab; the
//! default tab is index 0 and is created lazily with an empty name.

use serde::{Deserialize, Serialize};

/// A single decoded value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    String(String),
    /// Seconds since the Unix epoch (UTC).
    DateTime {
        timestamp: i64,
        has_date: bool,
        has_time: bool,
    },
    /// Nested field set (e.g. an embedded filesystem's fields).
    Group(RomFields),
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::DateTime {
                timestamp,
                has_date,
                has_time,
            } => {
                let Some(dt) = chrono::DateTime::from_timestamp(*timestamp, 0) else {
                    return write!(f, "(invalid: {})", timestamp);
                };
                match (has_date, has_time) {
                    (true, true) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
                    (true, false) => write!(f, "{}", dt.format("%Y-%m-%d")),
                    (false, true) => write!(f, "{}", dt.format("%H:%M:%S")),
                    (false, false) => write!(f, "{}", timestamp),
                }
            }
            Self::Group(g) => write!(f, "({} fields)", g.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    /// Index into [`RomFields::tabs`].
    pub tab: usize,
    pub value: FieldValue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomFields {
    tabs: Vec<String>,
    fields: Vec<Field>,
    #[serde(skip)]
    current_tab: usize,
}

impl RomFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name tab `index`, creating any missing tabs up to it.
    pub fn set_tab_name(&mut self, index: usize, name: impl Into<String>) {
        if self.tabs.len() <= index {
            self.tabs.resize(index + 1, String::new());
        }
        self.tabs[index] = name.into();
    }

    /// Append a new tab and make it current. Returns its index.
    pub fn add_tab(&mut self, name: impl Into<String>) -> usize {
        self.tabs.push(name.into());
        self.current_tab = self.tabs.len() - 1;
        self.current_tab
    }

    pub fn add_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.push(name.into(), FieldValue::String(value.into()));
    }

    pub fn add_datetime(
        &mut self,
        name: impl Into<String>,
        timestamp: i64,
        has_date: bool,
        has_time: bool,
    ) {
        self.push(
            name.into(),
            FieldValue::DateTime {
                timestamp,
                has_date,
                has_time,
            },
        );
    }

    pub fn add_group(&mut self, name: impl Into<String>, group: RomFields) {
        self.push(name.into(), FieldValue::Group(group));
    }

    fn push(&mut self, name: String, value: FieldValue) {
        if self.tabs.is_empty() {
            self.tabs.push(String::new());
        }
        self.fields.push(Field {
            name,
            tab: self.current_tab,
            value,
        });
    }

    pub fn tabs(&self) -> &[String] {
        &self.tabs
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Fields on one tab, in insertion order.
    pub fn fields_in_tab(&self, tab: usize) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.tab == tab)
    }

    /// First field with the given name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/fields_tests.rs"]
mod tests;
