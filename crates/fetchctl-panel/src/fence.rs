//! Generation tokens for async continuations.

use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier captured by an async flow when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowId(u64);

impl FlowId {
    /// Raw counter value, for logging.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for FlowId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Monotonic generation counter. A flow may mutate visible state only while its
/// captured [`FlowId`] is still current.
#[derive(Debug, Default)]
pub struct FlowFence {
    generation: AtomicU64,
}

impl FlowFence {
    /// Fence whose first flow will be `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
        }
    }

    /// Start a new flow, superseding every earlier one.
    pub fn begin(&self) -> FlowId {
        FlowId(self.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Most recently started flow.
    #[must_use]
    pub fn current(&self) -> FlowId {
        FlowId(self.generation.load(Ordering::Acquire))
    }

    /// Whether `flow` has not been superseded.
    #[must_use]
    pub fn is_current(&self, flow: FlowId) -> bool {
        self.current() == flow
    }
}
