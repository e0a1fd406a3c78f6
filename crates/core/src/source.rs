use serde::{Deserialize, Serialize};

/// A concrete dataset a query executes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Financial,
    Devices,
}

impl Source {
    /// Canonical warehouse table for this source.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Financial => "financial_orders",
            Self::Devices => "device_metrics",
        }
    }

    /// Vector collection holding this source's documentation chunks.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Financial => "financial_chunks",
            Self::Devices => "devices_chunks",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Devices => "devices",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "financial" => Ok(Self::Financial),
            "devices" => Ok(Self::Devices),
            other => Err(UnknownSource(other.to_owned())),
        }
    }
}

/// Error returned when a string names no known data source.
#[derive(Debug, thiserror::Error)]
#[error("unknown data source: {0}")]
pub struct UnknownSource(pub String);

/// Source as requested by the caller: a concrete dataset or auto-detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceChoice {
    #[default]
    Auto,
    Financial,
    Devices,
}

impl SourceChoice {
    /// The fixed source, if the caller pinned one.
    #[must_use]
    pub const fn fixed(self) -> Option<Source> {
        match self {
            Self::Auto => None,
            Self::Financial => Some(Source::Financial),
            Self::Devices => Some(Source::Devices),
        }
    }
}

/// How a query should be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Aggregate the warehouse with SQL.
    Sql,
    /// Answer from semantically retrieved documentation chunks.
    Retrieval,
}
