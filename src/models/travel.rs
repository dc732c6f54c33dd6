// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Travel record hierarchy: countries, the cities visited in them, and the
//! photos attached to each city.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a [`Country`] record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(Uuid);

impl CountryId {
    /// Mint a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CountryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a [`City`] record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(Uuid);

impl CityId {
    /// Mint a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a [`Photo`] record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(Uuid);

impl PhotoId {
    /// Mint a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PhotoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A photo attached to a visited city.
///
/// `url` is a displayable image reference. Within a running session this is
/// usually a `mem:` preview reference produced by ingestion; the model treats
/// it as an opaque string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    pub url: String,
    pub caption: Option<String>,
    /// When the photo was added, not when it was shot.
    pub taken_at: Option<DateTime<Utc>>,
    /// Lowercase hex SHA-256 of the compressed image, when known.
    pub digest: Option<String>,
    /// Size of the compressed image in bytes.
    pub byte_len: u64,
}

/// A visited city and its photos, owned by exactly one [`Country`].
///
/// Photos keep insertion order; there is no reorder or remove operation once
/// a photo has been attached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub photos: Vec<Photo>,
}

impl City {
    /// Create a city with no photos yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CityId::new(),
            name: name.into(),
            photos: Vec::new(),
        }
    }
}

/// A visited country with its cities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: CountryId,
    pub name: String,
    /// ISO 3166-1 alpha-2 region code, stored uppercase.
    pub code: String,
    pub cities: Vec<City>,
}

impl Country {
    /// Create a country together with its first visited city.
    ///
    /// Taking the first city by value keeps an empty-country state
    /// unrepresentable through this constructor.
    pub fn new(name: impl Into<String>, code: impl Into<String>, first_city: City) -> Self {
        Self {
            id: CountryId::new(),
            name: name.into(),
            code: code.into().to_ascii_uppercase(),
            cities: vec![first_city],
        }
    }
}
