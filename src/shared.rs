//! Shared rule index with hot reload support.
//!
//! Readers always see a complete, frozen [`RuleIndex`]. A reload builds a new
//! index off to the side and swaps it in atomically; in-flight lookups finish
//! against the index they started with.

use arc_swap::{ArcSwap, Guard};
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::index::RuleIndex;
use crate::loader::{LoadReport, RuleLoader};
use crate::{Direction, Error, Protocol, Result};

/// Atomically swappable [`RuleIndex`].
///
/// # Example
///
/// ```
/// use fwrule::{Direction, Protocol, RuleIndex, SharedRuleIndex};
///
/// let shared = SharedRuleIndex::default();
/// assert!(!shared.accept(Direction::Inbound, Protocol::Tcp, 22, "10.0.0.1").unwrap());
///
/// shared.reload(RuleIndex::build(["inbound,tcp,22,10.0.0.1"]).unwrap());
/// assert!(shared.accept(Direction::Inbound, Protocol::Tcp, 22, "10.0.0.1").unwrap());
/// assert_eq!(shared.generation(), 1);
/// ```
pub struct SharedRuleIndex {
    inner: ArcSwap<RuleIndex>,
    /// Incremented on each reload
    generation: AtomicU64,
}

impl SharedRuleIndex {
    /// Wrap an index.
    pub fn new(index: RuleIndex) -> Self {
        Self {
            inner: ArcSwap::from_pointee(index),
            generation: AtomicU64::new(0),
        }
    }

    /// Replace the current index.
    pub fn reload(&self, index: RuleIndex) {
        let stats = index.stats();
        self.inner.store(Arc::new(index));
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!("Reloaded rule index (generation {}): {}", generation, stats);
    }

    /// Load rules from a reader and swap them in.
    ///
    /// Returns the lines the loader skipped. On error the current index stays
    /// in place.
    pub fn reload_from_reader<R: Read>(
        &self,
        loader: &RuleLoader,
        reader: R,
    ) -> Result<Vec<Error>> {
        let LoadReport { index, skipped, .. } = loader.load(reader)?;
        self.reload(index);
        Ok(skipped)
    }

    /// Load rules from a file and swap them in.
    ///
    /// Returns the lines the loader skipped. On error the current index stays
    /// in place.
    pub fn reload_from_file(&self, loader: &RuleLoader, path: &Path) -> Result<Vec<Error>> {
        let LoadReport { index, skipped, .. } = loader.open(path)?;
        self.reload(index);
        Ok(skipped)
    }

    /// Decide whether a packet is permitted by the current index.
    pub fn accept(
        &self,
        direction: Direction,
        protocol: Protocol,
        port: u16,
        ip_text: &str,
    ) -> Result<bool> {
        self.inner.load().accept(direction, protocol, port, ip_text)
    }

    /// Textual variant of [`accept`](Self::accept).
    pub fn accept_packet(
        &self,
        direction: &str,
        protocol: &str,
        port: u16,
        ip_text: &str,
    ) -> Result<bool> {
        self.inner
            .load()
            .accept_packet(direction, protocol, port, ip_text)
    }

    /// Borrow the current index.
    ///
    /// The guard keeps that index alive even if a reload happens meanwhile.
    pub fn load(&self) -> Guard<Arc<RuleIndex>> {
        self.inner.load()
    }

    /// Take an owned handle to the current index.
    pub fn snapshot(&self) -> Arc<RuleIndex> {
        self.inner.load_full()
    }

    /// Number of reloads so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl Default for SharedRuleIndex {
    fn default() -> Self {
        Self::new(RuleIndex::empty())
    }
}
