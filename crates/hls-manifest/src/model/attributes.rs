//! Attribute lists (`NAME=value,NAME="quoted value"`) carried by most tags.

use std::fmt;

/// A single attribute value, remembering whether it was quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AttributeValue {
    Quoted(String),
    Unquoted(String),
}

impl AttributeValue {
    pub fn quoted(value: impl Into<String>) -> Self {
        Self::Quoted(value.into())
    }

    pub fn unquoted(value: impl Into<String>) -> Self {
        Self::Unquoted(value.into())
    }

    /// The value without surrounding quotes.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Quoted(value) | Self::Unquoted(value) => value,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Quoted(value) | Self::Unquoted(value) => value,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quoted(value) => write!(f, "\"{value}\""),
            Self::Unquoted(value) => f.write_str(value),
        }
    }
}

/// Ordered attribute list. Order is kept so unknown attributes are written
/// back where they were read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AttributeList {
    entries: Vec<(String, AttributeValue)>,
}

impl AttributeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the text following `TAG:`.
    ///
    /// Commas inside quoted strings do not split. The error is a bare reason;
    /// the codec attaches the line number.
    pub fn parse(input: &str) -> Result<Self, String> {
        let mut entries = Vec::new();
        let mut rest = input.trim();

        while !rest.is_empty() {
            let (name, after_name) = rest
                .split_once('=')
                .ok_or_else(|| format!("attribute without a value: {rest:?}"))?;
            let name = name.trim();
            if name.is_empty() || name.contains(',') {
                return Err(format!("invalid attribute name {name:?}"));
            }

            let (value, remainder) = if let Some(quoted) = after_name.strip_prefix('"') {
                let end = quoted
                    .find('"')
                    .ok_or_else(|| format!("unterminated quoted value for {name}"))?;
                (AttributeValue::quoted(&quoted[..end]), &quoted[end + 1..])
            } else {
                match after_name.find(',') {
                    Some(idx) => (
                        AttributeValue::unquoted(after_name[..idx].trim()),
                        &after_name[idx..],
                    ),
                    None => (AttributeValue::unquoted(after_name.trim()), ""),
                }
            };

            entries.push((name.to_string(), value));

            let remainder = remainder.trim_start();
            rest = match remainder.strip_prefix(',') {
                Some(next) => next.trim_start(),
                None if remainder.is_empty() => remainder,
                None => return Err(format!("unexpected text after {name}: {remainder:?}")),
            };
        }

        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Remove and return the first attribute called `name`.
    pub fn take(&mut self, name: &str) -> Option<AttributeValue> {
        let idx = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn push(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.entries.push((name.into(), value));
    }

    /// Replace the first attribute called `name`, or append it.
    pub fn set(&mut self, name: &str, value: AttributeValue) {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn extend(&mut self, other: &AttributeList) {
        self.entries.extend(other.entries.iter().cloned());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for AttributeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (name, value)) in self.entries.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}
