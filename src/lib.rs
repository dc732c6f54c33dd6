// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Session-scoped travel tracking core.
//!
//! Everything lives in memory for one session: the travel collection
//! ([`store::TravelStore`]) holds visited countries, the cities seen in
//! them, and the photos attached to each city. Photos enter through the
//! ingestion pipeline ([`ingest`]): declared-type validation, concurrent
//! compression on a worker pool, and all-or-nothing batching into
//! session previews. Map shading gets its country boundaries from a
//! [`geodata::BoundarySource`], fetched once at startup.
//!
//! The crate has no UI of its own; a front end drives it by holding the
//! store, a preview store, and an ingest pool, and wiring its event
//! handlers to the operations here.

pub mod geodata;
pub mod ingest;
pub mod models;
pub mod store;

pub use models::travel::{City, CityId, Country, CountryId, Photo, PhotoId};
pub use store::{LookupMiss, Snapshot, TravelStore};
