//! Temperature and distance sensor traits

/// Errors that can occur while reading a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// No device answered on the bus
    Disconnected,
    /// Data failed its checksum
    CrcMismatch,
    /// Reading outside the device's physical range
    OutOfRange,
    /// Device did not respond in time
    Timeout,
    /// Low-level bus fault
    Bus,
}

/// Trait for temperature probes
pub trait TemperatureSensor {
    /// Begin a conversion without waiting for it
    ///
    /// Lets a caller start several probes before reading any of them.
    /// Sensors that convert on demand keep the default no-op.
    fn start_conversion(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    /// Read the current temperature in degrees Celsius
    ///
    /// Waits for a conversion started by `start_conversion`, or runs a full
    /// conversion if none is pending. Takes `&mut self` because a
    /// conversion drives the bus.
    fn read_celsius(&mut self) -> Result<f32, SensorError>;
}

/// Trait for range finders
pub trait DistanceSensor {
    /// Measure the distance to the nearest reflecting surface in metres
    fn read_distance_m(&mut self) -> Result<f32, SensorError>;
}

impl<T: TemperatureSensor + ?Sized> TemperatureSensor for &mut T {
    fn start_conversion(&mut self) -> Result<(), SensorError> {
        (**self).start_conversion()
    }

    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        (**self).read_celsius()
    }
}

impl<D: DistanceSensor + ?Sized> DistanceSensor for &mut D {
    fn read_distance_m(&mut self) -> Result<f32, SensorError> {
        (**self).read_distance_m()
    }
}
