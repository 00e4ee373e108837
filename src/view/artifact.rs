use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a view template, e.g. `/WEB-INF/views/hotels.xhtml`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewArtifact(String);

impl ViewArtifact {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewArtifact {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ViewArtifact {
    fn from(value: String) -> Self {
        Self(value)
    }
}
