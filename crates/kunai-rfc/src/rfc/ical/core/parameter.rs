//! Property parameters (RFC 5545 §3.2).

/// A property parameter with one or more values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name, upper-cased.
    pub name: String,
    pub values: Vec<String>,
}

impl Parameter {
    /// Creates a single-valued parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    /// Creates a parameter with several values.
    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// Creates a `TZID` parameter.
    #[must_use]
    pub fn tzid(tzid: impl Into<String>) -> Self {
        Self::new("TZID", tzid)
    }

    /// Creates a `VALUE` parameter.
    #[must_use]
    pub fn value_type(value_type: impl Into<String>) -> Self {
        Self::new("VALUE", value_type)
    }

    /// Creates a `CN` parameter.
    #[must_use]
    pub fn cn(name: impl Into<String>) -> Self {
        Self::new("CN", name)
    }

    /// Creates a `PARTSTAT` parameter.
    #[must_use]
    pub fn partstat(status: impl Into<String>) -> Self {
        Self::new("PARTSTAT", status)
    }

    /// Creates a `ROLE` parameter.
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::new("ROLE", role)
    }

    /// Returns the first value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}
