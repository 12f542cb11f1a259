//! Monotonic time source

/// Monotonic millisecond clock
///
/// Used by drivers that poll against a deadline (modem responses) and by
/// the polling loop for measurement timestamps.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed epoch (usually boot)
    fn now_ms(&self) -> u64;

    /// Milliseconds elapsed since `since_ms`
    ///
    /// Saturates at zero if `since_ms` lies in the future.
    fn elapsed_ms(&self, since_ms: u64) -> u64 {
        self.now_ms().saturating_sub(since_ms)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
