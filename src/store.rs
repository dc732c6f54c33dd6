// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Single source of truth for the travel collection.
//!
//! The store hands out immutable [`Snapshot`]s and applies append-only
//! mutations. Each mutation produces a new snapshot instead of editing
//! nested records in place; countries that a mutation does not touch stay
//! pointer-identical across snapshots, so observers can diff cheaply with
//! [`Arc::ptr_eq`]. Mutations referencing unknown identifiers fail with
//! [`LookupMiss`] and leave the collection untouched.
//!
//! Mutations take `&mut self`: the collection is meant to be driven from one
//! logical thread (event handlers running to completion), and the borrow
//! checker enforces exactly that. Snapshots themselves are `Send + Sync` and
//! may be shipped to background consumers freely.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use thiserror::Error;

use crate::models::travel::{City, CityId, Country, CountryId, Photo};

/// A mutation referenced an identifier absent from the current collection.
///
/// Non-fatal: the collection is unchanged and the store stays usable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupMiss {
    #[error("no country with id {0}")]
    Country(CountryId),
    #[error("country {0} has no city with id {1}")]
    City(CountryId, CityId),
}

/// Immutable view of the collection at one point in time.
///
/// Cloning a snapshot is two reference-count bumps; the country records are
/// shared, never copied.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    countries: Arc<Vec<Arc<Country>>>,
}

impl Snapshot {
    /// Countries in the order they were added.
    pub fn countries(&self) -> &[Arc<Country>] {
        &self.countries
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Look up a country record by identifier.
    pub fn find_country(&self, country_id: CountryId) -> Option<&Arc<Country>> {
        self.countries.iter().find(|c| c.id == country_id)
    }

    /// Look up a city within a country.
    pub fn find_city(&self, country_id: CountryId, city_id: CityId) -> Option<&City> {
        self.find_country(country_id)?
            .cities
            .iter()
            .find(|c| c.id == city_id)
    }

    /// Region codes of visited countries, first-visit order, deduplicated.
    ///
    /// The same country may appear in the collection more than once (repeat
    /// trips are separate records); map shading only needs the code once.
    pub fn visited_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = Vec::with_capacity(self.countries.len());
        for country in self.countries.iter() {
            if !codes.iter().any(|c| c == &country.code) {
                codes.push(country.code.clone());
            }
        }
        codes
    }
}

/// In-memory travel collection with subscriber notification.
///
/// Pass the store explicitly to whatever drives it; it owns no global state
/// and everything it holds dies with the session.
#[derive(Default)]
pub struct TravelStore {
    current: Snapshot,
    subscribers: Vec<Sender<Snapshot>>,
}

impl TravelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.current.clone()
    }

    /// Register an observer. Every successful mutation delivers the new
    /// snapshot to the returned channel; dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<Snapshot> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Append a fully-formed country record.
    ///
    /// No uniqueness constraint is applied to the region code; visiting the
    /// same country twice yields two records.
    pub fn add_country(&mut self, country: Country) -> CountryId {
        let id = country.id;
        debug!("adding country {} ({})", country.name, country.code);

        let mut countries = (*self.current.countries).clone();
        countries.push(Arc::new(country));
        self.publish(countries);
        id
    }

    /// Build and append a country with exactly one visited city.
    ///
    /// This is the add-travel flow: a travel entry always names a country
    /// and the first city visited there.
    pub fn add_travel(
        &mut self,
        country_name: impl Into<String>,
        code: impl Into<String>,
        city_name: impl Into<String>,
    ) -> (CountryId, CityId) {
        let city = City::new(city_name);
        let city_id = city.id;
        let country_id = self.add_country(Country::new(country_name, code, city));
        (country_id, city_id)
    }

    /// Append a city to an existing country.
    pub fn add_city_to_country(
        &mut self,
        country_id: CountryId,
        city: City,
    ) -> Result<CityId, LookupMiss> {
        let index = self
            .country_index(country_id)
            .ok_or(LookupMiss::Country(country_id))?;
        let city_id = city.id;
        debug!("adding city {} to country {country_id}", city.name);

        let mut countries = (*self.current.countries).clone();
        let mut updated = (*countries[index]).clone();
        updated.cities.push(city);
        countries[index] = Arc::new(updated);
        self.publish(countries);
        Ok(city_id)
    }

    /// Append photos to a city, preserving both the existing photo order and
    /// the order of the new batch.
    pub fn add_photos_to_city(
        &mut self,
        country_id: CountryId,
        city_id: CityId,
        photos: Vec<Photo>,
    ) -> Result<(), LookupMiss> {
        let country_index = self
            .country_index(country_id)
            .ok_or(LookupMiss::Country(country_id))?;
        let city_index = self.current.countries[country_index]
            .cities
            .iter()
            .position(|c| c.id == city_id)
            .ok_or(LookupMiss::City(country_id, city_id))?;
        debug!("adding {} photo(s) to city {city_id}", photos.len());

        let mut countries = (*self.current.countries).clone();
        let mut updated = (*countries[country_index]).clone();
        updated.cities[city_index].photos.extend(photos);
        countries[country_index] = Arc::new(updated);
        self.publish(countries);
        Ok(())
    }

    fn country_index(&self, country_id: CountryId) -> Option<usize> {
        self.current.countries.iter().position(|c| c.id == country_id)
    }

    /// Install the new collection state and notify observers.
    fn publish(&mut self, countries: Vec<Arc<Country>>) {
        self.current = Snapshot {
            countries: Arc::new(countries),
        };
        let snapshot = self.current.clone();
        self.subscribers.retain(|tx| {
            if tx.send(snapshot.clone()).is_ok() {
                true
            } else {
                warn!("pruning disconnected store subscriber");
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{LookupMiss, TravelStore};
    use crate::models::travel::{City, CityId, Country, CountryId, Photo, PhotoId};

    fn photo(url: &str) -> Photo {
        Photo {
            id: PhotoId::new(),
            url: url.to_string(),
            caption: None,
            taken_at: None,
            digest: None,
            byte_len: 0,
        }
    }

    #[test]
    fn add_country_preserves_call_order() {
        let mut store = TravelStore::new();
        store.add_country(Country::new("Japan", "JP", City::new("Tokyo")));
        store.add_country(Country::new("Peru", "PE", City::new("Lima")));
        store.add_country(Country::new("Iceland", "IS", City::new("Reykjavik")));

        let snapshot = store.snapshot();
        let names: Vec<_> = snapshot.countries().iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, ["Japan", "Peru", "Iceland"]);
    }

    #[test]
    fn unknown_country_id_leaves_collection_untouched() {
        let mut store = TravelStore::new();
        store.add_country(Country::new("Japan", "JP", City::new("Tokyo")));
        let before = store.snapshot();

        let missing = CountryId::new();
        let result = store.add_city_to_country(missing, City::new("Nowhere"));

        assert_eq!(result, Err(LookupMiss::Country(missing)));
        let after = store.snapshot();
        // Not just equal content: the failed mutation must not have rebuilt
        // the collection at all.
        assert!(Arc::ptr_eq(&before.countries, &after.countries));
    }

    #[test]
    fn unknown_city_id_reports_city_miss() {
        let mut store = TravelStore::new();
        let country_id = store.add_country(Country::new("Japan", "JP", City::new("Tokyo")));
        let missing = CityId::new();

        let result = store.add_photos_to_city(country_id, missing, vec![photo("mem:a")]);

        assert_eq!(result, Err(LookupMiss::City(country_id, missing)));
        assert!(store.snapshot().countries()[0].cities[0].photos.is_empty());
    }

    #[test]
    fn untouched_countries_stay_pointer_identical() {
        let mut store = TravelStore::new();
        let japan = store.add_country(Country::new("Japan", "JP", City::new("Tokyo")));
        store.add_country(Country::new("Peru", "PE", City::new("Lima")));
        let before = store.snapshot();

        store
            .add_city_to_country(japan, City::new("Osaka"))
            .unwrap();

        let after = store.snapshot();
        assert!(
            Arc::ptr_eq(&before.countries()[1], &after.countries()[1]),
            "Peru was not touched and must keep its identity"
        );
        assert!(
            !Arc::ptr_eq(&before.countries()[0], &after.countries()[0]),
            "Japan was replaced by an updated record"
        );
    }

    #[test]
    fn photos_append_after_existing_in_input_order() {
        let mut store = TravelStore::new();
        let (country_id, city_id) = store.add_travel("Japan", "JP", "Tokyo");
        store
            .add_photos_to_city(country_id, city_id, vec![photo("mem:first")])
            .unwrap();

        store
            .add_photos_to_city(country_id, city_id, vec![photo("mem:second"), photo("mem:third")])
            .unwrap();

        let snapshot = store.snapshot();
        let urls: Vec<_> = snapshot
            .find_city(country_id, city_id)
            .unwrap()
            .photos
            .iter()
            .map(|p| p.url.as_str())
            .collect();
        assert_eq!(urls, ["mem:first", "mem:second", "mem:third"]);
    }

    #[test]
    fn round_trip_country_city_two_photos() {
        let mut store = TravelStore::new();
        let (country_id, city_id) = store.add_travel("Portugal", "pt", "Porto");

        store
            .add_photos_to_city(country_id, city_id, vec![photo("mem:a"), photo("mem:b")])
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        let country = snapshot.find_country(country_id).unwrap();
        assert_eq!(country.code, "PT");
        assert_eq!(country.cities.len(), 1);
        let city = &country.cities[0];
        assert_eq!(city.id, city_id);
        assert_eq!(city.photos.len(), 2);
        assert_eq!(city.photos[0].url, "mem:a");
        assert_eq!(city.photos[1].url, "mem:b");
    }

    #[test]
    fn subscribers_receive_each_new_snapshot() {
        let mut store = TravelStore::new();
        let rx = store.subscribe();

        store.add_travel("Japan", "JP", "Tokyo");
        store.add_travel("Peru", "PE", "Lima");

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert!(rx.try_recv().is_err(), "no further notifications expected");
    }

    #[test]
    fn dropped_subscribers_are_pruned_silently() {
        let mut store = TravelStore::new();
        let rx = store.subscribe();
        drop(rx);

        // Must not panic or error; the dead channel is discarded.
        store.add_travel("Japan", "JP", "Tokyo");
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn failed_mutation_does_not_notify() {
        let mut store = TravelStore::new();
        let rx = store.subscribe();

        let result = store.add_city_to_country(CountryId::new(), City::new("Ghost"));

        assert!(result.is_err());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn visited_codes_dedupes_repeat_visits() {
        let mut store = TravelStore::new();
        store.add_travel("Japan", "JP", "Tokyo");
        store.add_travel("Peru", "PE", "Lima");
        store.add_travel("Japan", "jp", "Osaka");

        assert_eq!(store.snapshot().visited_codes(), ["JP", "PE"]);
    }
}
