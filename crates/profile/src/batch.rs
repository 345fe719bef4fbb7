//! Lazy batches of flight profiles.
//!
//! A [`FlightProfileBatch`] is a single-pass iterator: each profile is produced on demand
//! when the consumer asks for it, so a sweep over thousands of cruise ranges holds one
//! profile at a time. A batch cannot be rewound. Callers that need a second traversal
//! ask a [`ProfileSource`] for a fresh batch, which re-runs the producer from scratch.

use std::fmt;
use std::sync::Arc;

use crate::FlightProfile;

type ProfileIter<E> = Box<dyn Iterator<Item = Result<FlightProfile, E>> + Send>;

/// Single-traversal, pull-based stream of profiles.
pub struct FlightProfileBatch<E> {
    inner: ProfileIter<E>,
    declared_len: usize,
}

impl<E: 'static> FlightProfileBatch<E> {
    /// Wrap a lazy producer announcing `len` profiles.
    pub fn new<I>(iter: I, len: usize) -> Self
    where
        I: Iterator<Item = Result<FlightProfile, E>> + Send + 'static,
    {
        Self {
            inner: Box::new(iter),
            declared_len: len,
        }
    }

    /// Batch over already materialized profiles.
    pub fn from_profiles(profiles: Vec<FlightProfile>) -> Self
    where
        E: Send,
    {
        let len = profiles.len();
        Self::new(profiles.into_iter().map(Ok), len)
    }

    /// Number of profiles the producer announced.
    pub fn declared_len(&self) -> usize {
        self.declared_len
    }

    /// Lazily apply a pipeline stage to every profile; errors pass through untouched.
    pub fn map_profiles<F, E2>(self, mut stage: F) -> FlightProfileBatch<E2>
    where
        F: FnMut(FlightProfile) -> Result<FlightProfile, E2> + Send + 'static,
        E: Into<E2> + Send,
        E2: 'static,
    {
        let len = self.declared_len;
        let iter = self.inner.map(move |item| match item {
            Ok(profile) => stage(profile),
            Err(err) => Err(err.into()),
        });
        FlightProfileBatch {
            inner: Box::new(iter),
            declared_len: len,
        }
    }
}

impl<E> Iterator for FlightProfileBatch<E> {
    type Item = Result<FlightProfile, E>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<E> fmt::Debug for FlightProfileBatch<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightProfileBatch")
            .field("declared_len", &self.declared_len)
            .finish_non_exhaustive()
    }
}

/// Re-invocable producer of batches.
pub struct ProfileSource<E> {
    producer: Arc<dyn Fn() -> FlightProfileBatch<E> + Send + Sync>,
}

impl<E> Clone for ProfileSource<E> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<E> ProfileSource<E> {
    pub fn new<F>(producer: F) -> Self
    where
        F: Fn() -> FlightProfileBatch<E> + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(producer),
        }
    }

    /// Start a fresh traversal.
    pub fn batch(&self) -> FlightProfileBatch<E> {
        (self.producer)()
    }
}
