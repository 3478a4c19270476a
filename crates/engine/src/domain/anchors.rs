// crates/engine/src/domain/anchors.rs

//! Trust configuration store.
//!
//! Anchor configuration is held as an immutable `AnchorSnapshot` in an
//! `ArcSwap`. Writers build a complete replacement and swap the pointer;
//! readers load the pointer once per evaluation without taking a lock and never
//! see a mix of old anchors with a new exclusivity flag.

use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use super::types::{CertificateIdentity, TrustDefaults};

/// One complete anchor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorSnapshot {
    anchors: Vec<CertificateIdentity>,
    only_these: bool,
    generation: u64,
}

impl AnchorSnapshot {
    pub fn new(anchors: Vec<CertificateIdentity>, only_these: bool) -> Self {
        Self { anchors, only_these, generation: 0 }
    }

    pub fn anchors(&self) -> &[CertificateIdentity] {
        &self.anchors
    }

    /// Anchors replace the system root store rather than augmenting it.
    pub fn is_exclusive(&self) -> bool {
        self.only_these
    }

    /// Number of `set_anchors` calls that preceded this snapshot in its store.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for AnchorSnapshot {
    fn default() -> Self {
        Self::new(Vec::new(), TrustDefaults::ANCHORS_ONLY)
    }
}

/// Copy-on-write holder of the current `AnchorSnapshot`.
#[derive(Debug)]
pub struct AnchorStore {
    current: ArcSwap<AnchorSnapshot>,
    // Serializes writers so generations stay strictly increasing.
    writer: Mutex<()>,
}

impl AnchorStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(AnchorSnapshot::default()),
            writer: Mutex::new(()),
        }
    }

    /// Replace the anchor configuration. `only_these` makes the anchors the
    /// exclusive root set; otherwise they are added to the system roots.
    /// Evaluations already holding a snapshot are unaffected.
    pub fn set_anchors(&self, certs: Vec<CertificateIdentity>, only_these: bool) {
        let count = certs.len();
        let mut next = AnchorSnapshot::new(certs, only_these);
        let guard = self.writer.lock();
        let generation = self.current.load().generation + 1;
        next.generation = generation;
        self.current.store(Arc::new(next));
        drop(guard);
        tracing::info!(count, only_these, generation, "anchor certificates configured");
    }

    /// The configuration every new evaluation should use.
    pub fn snapshot(&self) -> Arc<AnchorSnapshot> {
        self.current.load_full()
    }
}

impl Default for AnchorStore {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_ANCHORS: Lazy<Arc<AnchorStore>> = Lazy::new(|| Arc::new(AnchorStore::new()));

/// The process-wide store consulted by evaluations that were not given one.
pub fn global() -> Arc<AnchorStore> {
    Arc::clone(&GLOBAL_ANCHORS)
}

/// Configure the process-wide anchors.
pub fn set_anchor_certs(certs: Vec<CertificateIdentity>, only_these: bool) {
    GLOBAL_ANCHORS.set_anchors(certs, only_these);
}
