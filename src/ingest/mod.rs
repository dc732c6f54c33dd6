// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Photo ingestion pipeline: validation, concurrent compression, and
//! all-or-nothing batching into session previews.
//!
//! A batch either produces one staged photo per input file, in input order,
//! or fails with a single [`IngestError`] and registers nothing. Compression
//! runs on a fixed pool of background workers; the call that submits the
//! batch blocks until every job has reported back, while the workers stay
//! available to other callers.

pub mod compress;
pub mod draft;
pub mod preview;
pub mod validate;

pub use compress::{CompressedImage, CompressionError, CompressionOptions, compress_image};
pub use draft::UploadDraft;
pub use preview::{PreviewStore, PreviewUrl};
pub use validate::{ACCEPTED_MEDIA_TYPES, UploadFile, validate_media_type};

use crossbeam_channel::Sender;
use log::debug;
use thiserror::Error;

/// Batch-level ingestion failure. Exactly one is reported per failed batch;
/// partial results are never surfaced.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A file declared a media type outside the accepted set. Reported
    /// before any compression is attempted.
    #[error("invalid file type for {name}: {declared:?}")]
    InvalidFileType { name: String, declared: String },
    /// A file failed to compress; the whole batch is abandoned.
    #[error("failed to process {name}")]
    Compression {
        name: String,
        #[source]
        source: CompressionError,
    },
    /// The worker pool shut down while the batch was in flight.
    #[error("compression workers are no longer running")]
    PoolShutDown,
}

/// A validated, compressed photo staged for upload but not yet committed to
/// a city.
#[derive(Clone, Debug)]
pub struct StagedPhoto {
    /// Original file name.
    pub name: String,
    /// Preview reference registered for this photo.
    pub url: PreviewUrl,
    /// User caption, empty until edited.
    pub caption: String,
    pub width: u32,
    pub height: u32,
    /// Content digest of the compressed bytes.
    pub digest: String,
    /// Size of the compressed bytes.
    pub byte_len: u64,
}

struct Job {
    index: usize,
    name: String,
    bytes: Vec<u8>,
    options: CompressionOptions,
}

struct JobResult {
    index: usize,
    name: String,
    outcome: Result<CompressedImage, CompressionError>,
}

/// Fixed pool of compression workers shared by all upload batches.
///
/// Workers exit when the pool is dropped; jobs already picked up run to
/// completion and their results are discarded.
pub struct IngestPool {
    job_tx: Sender<(Job, Sender<JobResult>)>,
}

impl IngestPool {
    /// Spawn a pool sized to the machine, with at least two workers.
    pub fn new() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get().max(2))
            .unwrap_or(2);
        Self::with_workers(workers)
    }

    /// Spawn a pool with an explicit worker count (minimum one).
    pub fn with_workers(workers: usize) -> Self {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(Job, Sender<JobResult>)>();

        for _ in 0..workers.max(1) {
            let job_rx = job_rx.clone();
            std::thread::spawn(move || {
                for (job, reply_tx) in job_rx.iter() {
                    let outcome = compress_image(&job.bytes, &job.options);
                    // The batch may already have been abandoned; nobody
                    // listening is fine.
                    let _ = reply_tx.send(JobResult {
                        index: job.index,
                        name: job.name,
                        outcome,
                    });
                }
            });
        }

        Self { job_tx }
    }

    /// Validate and compress a batch of uploads.
    ///
    /// Every declared type is checked before any compression is scheduled.
    /// All files are then compressed concurrently; results are reassembled
    /// by input index, so the staged order always matches the input order
    /// no matter which job finishes first. Previews are registered only
    /// after the whole batch has succeeded.
    pub fn ingest_batch(
        &self,
        files: Vec<UploadFile>,
        options: &CompressionOptions,
        previews: &mut PreviewStore,
    ) -> Result<Vec<StagedPhoto>, IngestError> {
        for file in &files {
            if !file.is_accepted() {
                return Err(IngestError::InvalidFileType {
                    name: file.name.clone(),
                    declared: file.declared_type.clone(),
                });
            }
        }

        let total = files.len();
        debug!("dispatching batch of {total} upload(s)");

        // Batch-private reply channel: concurrent batches on the same pool
        // cannot observe each other's results.
        let (reply_tx, reply_rx) = crossbeam_channel::unbounded();
        for (index, file) in files.into_iter().enumerate() {
            let job = Job {
                index,
                name: file.name,
                bytes: file.bytes,
                options: options.clone(),
            };
            self.job_tx
                .send((job, reply_tx.clone()))
                .map_err(|_| IngestError::PoolShutDown)?;
        }
        drop(reply_tx);

        let mut slots: Vec<Option<(String, CompressedImage)>> =
            (0..total).map(|_| None).collect();
        for _ in 0..total {
            let result = reply_rx.recv().map_err(|_| IngestError::PoolShutDown)?;
            match result.outcome {
                Ok(image) => slots[result.index] = Some((result.name, image)),
                // First failure abandons the batch; later results drain into
                // the dropped receiver.
                Err(source) => {
                    return Err(IngestError::Compression {
                        name: result.name,
                        source,
                    });
                }
            }
        }

        // Only now does anything become visible outside the batch.
        let staged = slots
            .into_iter()
            .flatten()
            .map(|(name, image)| {
                let (width, height) = (image.width, image.height);
                let digest = image.digest.clone();
                let byte_len = image.bytes.len() as u64;
                let url = previews.insert(image);
                StagedPhoto {
                    name,
                    url,
                    caption: String::new(),
                    width,
                    height,
                    digest,
                    byte_len,
                }
            })
            .collect();
        debug!("batch of {total} staged");
        Ok(staged)
    }
}

impl Default for IngestPool {
    fn default() -> Self {
        Self::new()
    }
}
