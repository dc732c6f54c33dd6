// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Staging area between batch ingestion and the travel collection.
//!
//! An [`UploadDraft`] accumulates staged photos across one or more selection
//! rounds. While staged, photos can still be captioned and removed; once
//! committed to a city they are immutable. Committing mints fresh [`Photo`]
//! records and hands them to the store in one append.

use chrono::Utc;
use log::debug;

use super::StagedPhoto;
use crate::models::travel::{CityId, CountryId, Photo, PhotoId};
use crate::store::{LookupMiss, TravelStore};

/// Uncommitted photos for one upload flow.
///
/// Dropping the draft discards everything staged; previews already registered
/// for discarded photos stay live until revoked or the session ends.
#[derive(Debug, Default)]
pub struct UploadDraft {
    staged: Vec<StagedPhoto>,
}

impl UploadDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the results of a successful batch, keeping batch order.
    pub fn extend(&mut self, staged: Vec<StagedPhoto>) {
        self.staged.extend(staged);
    }

    /// Staged photos in the order they will be committed.
    pub fn photos(&self) -> &[StagedPhoto] {
        &self.staged
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Replace the caption of the staged photo at `index`.
    ///
    /// Returns whether the index named a staged photo.
    pub fn set_caption(&mut self, index: usize, caption: impl Into<String>) -> bool {
        match self.staged.get_mut(index) {
            Some(photo) => {
                photo.caption = caption.into();
                true
            }
            None => false,
        }
    }

    /// Remove a staged photo before commit.
    ///
    /// The removed entry is returned so its preview can be revoked by the
    /// caller; later photos shift down, preserving their relative order.
    pub fn remove(&mut self, index: usize) -> Option<StagedPhoto> {
        if index < self.staged.len() {
            Some(self.staged.remove(index))
        } else {
            None
        }
    }

    /// Attach everything staged to the given city and drain the draft.
    ///
    /// Each staged photo becomes a [`Photo`] with a fresh identifier, the
    /// commit time as its timestamp, and its caption carried over (empty
    /// captions become `None`). Returns the number of photos committed; an
    /// empty draft commits nothing and succeeds. On a [`LookupMiss`] the
    /// draft is left intact so it can be re-targeted or discarded.
    pub fn commit(
        &mut self,
        store: &mut TravelStore,
        country_id: CountryId,
        city_id: CityId,
    ) -> Result<usize, LookupMiss> {
        if self.staged.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let photos: Vec<Photo> = self
            .staged
            .iter()
            .map(|staged| Photo {
                id: PhotoId::new(),
                url: staged.url.to_string(),
                caption: (!staged.caption.is_empty()).then(|| staged.caption.clone()),
                taken_at: Some(now),
                digest: Some(staged.digest.clone()),
                byte_len: staged.byte_len,
            })
            .collect();
        let count = photos.len();

        store.add_photos_to_city(country_id, city_id, photos)?;
        self.staged.clear();
        debug!("committed {count} photo(s) to city {city_id}");
        Ok(count)
    }
}
