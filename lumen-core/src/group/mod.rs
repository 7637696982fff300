//! Grouping of fingerprinted records.
//!
//! Callers own their records (database rows, scan results, ...) and expose
//! fingerprints through [`Fingerprinted`]. Missing or empty fingerprints
//! exclude a record from consideration; partial catalogs are expected.

pub mod duplicates;
pub mod similar;

pub use duplicates::{group_duplicates, DuplicateGroup};
pub use similar::{
    group_similar, group_similar_with, ClusterMode, SimilarityGroup, SimilarityOptions,
    DEFAULT_SIMILARITY_THRESHOLD,
};

use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprints;

/// A record that may carry fingerprints.
pub trait Fingerprinted {
    type Id: Clone;

    fn id(&self) -> Self::Id;

    fn content_hash(&self) -> Option<&str>;

    fn perceptual_hash(&self) -> Option<&str>;
}

/// Minimal owned record: an opaque identifier plus optional fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRecord<Id> {
    pub id: Id,
    pub content_hash: Option<String>,
    pub perceptual_hash: Option<String>,
}

impl<Id> FingerprintRecord<Id> {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            content_hash: None,
            perceptual_hash: None,
        }
    }

    pub fn from_fingerprints(id: Id, fingerprints: &Fingerprints) -> Self {
        Self {
            id,
            content_hash: Some(fingerprints.content_hash.to_string()),
            perceptual_hash: Some(fingerprints.perceptual_hash.to_hex()),
        }
    }

    pub fn with_content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    pub fn with_perceptual_hash(mut self, hash: impl Into<String>) -> Self {
        self.perceptual_hash = Some(hash.into());
        self
    }
}

impl<Id: Clone> Fingerprinted for FingerprintRecord<Id> {
    type Id = Id;

    fn id(&self) -> Id {
        self.id.clone()
    }

    fn content_hash(&self) -> Option<&str> {
        self.content_hash.as_deref()
    }

    fn perceptual_hash(&self) -> Option<&str> {
        self.perceptual_hash.as_deref()
    }
}

/// Treat the empty string like an absent fingerprint.
pub(crate) fn present(hash: Option<&str>) -> Option<&str> {
    hash.filter(|h| !h.is_empty())
}
