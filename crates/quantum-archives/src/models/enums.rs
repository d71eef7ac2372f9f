//! Enumeration types for session and request parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// The selectable physicists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Physicist {
    /// Werner Heisenberg.
    #[serde(rename = "Werner Heisenberg", alias = "heisenberg", alias = "Heisenberg")]
    Heisenberg,
    /// Wolfgang Pauli.
    #[serde(rename = "Wolfgang Pauli", alias = "pauli", alias = "Pauli")]
    Pauli,
    /// Erwin Schrödinger.
    #[serde(
        rename = "Erwin Schrödinger",
        alias = "schrodinger",
        alias = "Schrodinger",
        alias = "Schrödinger"
    )]
    Schrodinger,
    /// Paul Dirac.
    #[serde(rename = "Paul Dirac", alias = "dirac", alias = "Dirac")]
    Dirac,
}

impl Physicist {
    /// All physicists in display order.
    pub const ALL: [Self; 4] = [Self::Heisenberg, Self::Pauli, Self::Schrodinger, Self::Dirac];

    /// Full display name, as sent to the model.
    #[must_use]
    pub const fn full_name(self) -> &'static str {
        match self {
            Self::Heisenberg => "Werner Heisenberg",
            Self::Pauli => "Wolfgang Pauli",
            Self::Schrodinger => "Erwin Schrödinger",
            Self::Dirac => "Paul Dirac",
        }
    }

    /// Surname only.
    #[must_use]
    pub const fn surname(self) -> &'static str {
        match self {
            Self::Heisenberg => "Heisenberg",
            Self::Pauli => "Pauli",
            Self::Schrodinger => "Schrödinger",
            Self::Dirac => "Dirac",
        }
    }
}

impl fmt::Display for Physicist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

impl FromStr for Physicist {
    type Err = SessionError;

    /// Accepts the full name or the surname, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase().replace('ö', "o").replace("oe", "o");
        Self::ALL
            .into_iter()
            .find(|p| {
                let surname = p.surname().to_lowercase().replace('ö', "o");
                let full = p.full_name().to_lowercase().replace('ö', "o");
                needle == surname || needle == full
            })
            .ok_or_else(|| SessionError::UnknownPhysicist(s.trim().to_string()))
    }
}

/// Views a front-end can show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    /// Physicist selection and discovered papers.
    #[default]
    Discover,
    /// The user's collected papers.
    Collection,
    /// Chat over the collection.
    Chat,
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "discover" => Ok(Self::Discover),
            "collection" => Ok(Self::Collection),
            "chat" => Ok(Self::Chat),
            other => Err(format!("unknown tab '{other}' (expected discover, collection or chat)")),
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Discover => "discover",
            Self::Collection => "collection",
            Self::Chat => "chat",
        })
    }
}
