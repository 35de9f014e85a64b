//! The capability set shared by every cost component.

use shardwise_core::design::Design;

use crate::error::Result;
use crate::state::State;

/// A cost component scores a design against the shared state and memoizes
/// per-collection sub-costs between calls.
///
/// Invariants:
/// - `get_cost` is a pure function of `(design, state)` and never negative.
/// - `invalidate_cache` for a collection with no entry is a no-op, so callers
///   may over-invalidate.
/// - `finish` only flushes diagnostics; it never changes future costs.
pub trait CostComponent {
    /// Stable component name for logs and diagnostics.
    fn name(&self) -> &'static str;

    fn get_cost(&mut self, state: &State, design: &Design) -> Result<f64>;

    /// Drop the memoized contribution of `collection`.
    fn invalidate_cache(&mut self, design: &Design, collection: &str);

    /// Mark every cached contribution stale without dropping entries.
    fn invalidate_all(&mut self);

    /// Drop the whole cache and zero local counters.
    fn reset(&mut self);

    /// Flush local hit/miss counters after a scoring pass.
    fn finish(&mut self);
}

/// Collections a component scores: every collection of the design except the
/// ones embedded in a parent (their cost is carried by the parent).
pub(crate) fn scored_collections(design: &Design) -> impl Iterator<Item = &str> {
    design
        .collections()
        .filter(move |name| !design.is_denormalized(name))
}
