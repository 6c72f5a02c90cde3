//! Global state and public API.

use once_cell::sync::Lazy;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::index::RuleIndex;
use crate::loader::RuleLoader;
use crate::shared::SharedRuleIndex;
use crate::{Error, Result};

/// Global rule index. Empty, and so denying everything, until the first reload.
static GLOBAL_INDEX: Lazy<SharedRuleIndex> = Lazy::new(SharedRuleIndex::default);

/// Check if the global index has been loaded at least once.
pub fn is_initialized() -> bool {
    GLOBAL_INDEX.generation() > 0
}

/// Number of reloads of the global index.
pub fn generation() -> u64 {
    GLOBAL_INDEX.generation()
}

/// Replace the global index.
pub fn reload_rules(index: RuleIndex) {
    GLOBAL_INDEX.reload(index);
}

/// Replace the global index with rules read from a reader.
///
/// Returns the lines the loader skipped. On error the global index is left
/// unchanged.
pub fn reload_rules_from_reader<R: Read>(loader: &RuleLoader, reader: R) -> Result<Vec<Error>> {
    GLOBAL_INDEX.reload_from_reader(loader, reader)
}

/// Replace the global index with rules read from a file.
pub fn reload_rules_from_file(loader: &RuleLoader, path: &Path) -> Result<Vec<Error>> {
    GLOBAL_INDEX.reload_from_file(loader, path)
}

/// Decide whether a packet is permitted by the global index.
///
/// # Examples
/// ```
/// use fwrule::{accept_packet, reload_rules, RuleIndex};
///
/// fn main() -> fwrule::Result<()> {
///     reload_rules(RuleIndex::build(["inbound,tcp,80,192.168.1.2"])?);
///     assert!(accept_packet("inbound", "tcp", 80, "192.168.1.2")?);
///     assert!(!accept_packet("inbound", "tcp", 81, "192.168.1.2")?);
///     Ok(())
/// }
/// ```
pub fn accept_packet(direction: &str, protocol: &str, port: u16, ip_text: &str) -> Result<bool> {
    GLOBAL_INDEX.accept_packet(direction, protocol, port, ip_text)
}

/// Snapshot of the current global index.
pub fn current_index() -> Arc<RuleIndex> {
    GLOBAL_INDEX.snapshot()
}
