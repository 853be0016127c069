//! Power sampling traits.

use crate::error::ReadError;

/// A source of instantaneous total power readings.
///
/// Implementations must return a fresh reading on every call. The sampling
/// loop charges the time spent inside this call to the integration window,
/// so implementations should do blocking work only.
pub trait PowerSource {
    /// Current total power draw in milliwatts.
    fn instant_power_mw(&self) -> Result<f64, ReadError>;

    /// Number of physical channels contributing to each reading.
    fn channel_count(&self) -> usize;
}

impl<T: PowerSource + ?Sized> PowerSource for &T {
    fn instant_power_mw(&self) -> Result<f64, ReadError> {
        (**self).instant_power_mw()
    }

    fn channel_count(&self) -> usize {
        (**self).channel_count()
    }
}
