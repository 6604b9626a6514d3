use std::sync::{Arc, Mutex};

use super::types::GpsFix;

/// Single-slot handoff between the telemetry producer and the control tick.
///
/// A newer fix overwrites one that has not been consumed yet. Taking the fix
/// clears the slot in the same critical section, so the consumer never sees
/// a partially written fix or the same fix twice.
#[derive(Debug, Clone, Default)]
pub struct FixSlot {
    inner: Arc<Mutex<Option<GpsFix>>>,
}

impl FixSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, fix: GpsFix) {
        let mut slot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(fix);
    }

    pub fn take(&self) -> Option<GpsFix> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}
