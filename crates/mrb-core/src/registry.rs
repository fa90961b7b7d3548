use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use crate::{domain::MessageRef, errors::Error, submission::Submission, Result};

/// Links a review post to the suggestion it represents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewCorrelation {
    pub review_post: MessageRef,
    pub submission: Submission,
}

/// In-memory map of pending suggestions, keyed by review post.
///
/// An entry exists exactly while a decision is pending. The lock is never held
/// across an `.await`, so a plain std mutex is enough.
#[derive(Debug, Default)]
pub struct SubmissionRegistry {
    inner: Mutex<HashMap<MessageRef, ReviewCorrelation>>,
}

impl SubmissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<MessageRef, ReviewCorrelation>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn put(&self, review_post: MessageRef, submission: Submission) -> Result<()> {
        let mut map = self.map();
        if map.contains_key(&review_post) {
            return Err(Error::DuplicateKey(review_post));
        }
        map.insert(
            review_post,
            ReviewCorrelation {
                review_post,
                submission,
            },
        );
        Ok(())
    }

    pub fn get(&self, review_post: MessageRef) -> Result<ReviewCorrelation> {
        self.map()
            .get(&review_post)
            .cloned()
            .ok_or(Error::NotFound(review_post))
    }

    /// Remove a live entry. Calling this for an entry that is already gone is an error.
    pub fn remove(&self, review_post: MessageRef) -> Result<ReviewCorrelation> {
        self.map()
            .remove(&review_post)
            .ok_or(Error::NotFound(review_post))
    }

    /// Atomically claim a pending entry. Of several callers racing on the same
    /// review post, exactly one gets `Some`.
    pub fn take_if_present(&self, review_post: MessageRef) -> Option<ReviewCorrelation> {
        self.map().remove(&review_post)
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }
}
