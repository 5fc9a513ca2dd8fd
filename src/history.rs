//! A bounded history of readings that can be shared between threads.
//!
//! A host program that serves readings (to a web page, say) while another thread
//! measures needs somewhere to keep recent samples. [`SharedHistory`] is a cloneable
//! handle to one such store; every clone sees the same samples.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::data::Readings;
use crate::error::ProtocolError;

/// The quantities kept from each measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Sample {
    /// Temperature in the unit chosen when the readings were taken.
    pub temperature: f32,
    /// Air pressure in Pa.
    pub pressure_pa: u32,
    /// Relative humidity in %.
    pub humidity_percent: f32,
    /// Air quality index, if measured and valid.
    pub aqi: Option<f32>,
    /// Breath VOC in ppm, if measured and valid.
    pub bvoc_ppm: Option<f32>,
    /// A-weighted sound pressure level in dBA.
    pub spl_dba: f32,
    /// Illuminance in lux.
    pub illuminance_lux: f32,
    /// Particle concentration, if a particle sensor is selected.
    pub particle_concentration: Option<f32>,
}

impl From<&Readings> for Sample {
    fn from(readings: &Readings) -> Self {
        let air_quality = readings.air_quality.filter(|aq| aq.is_valid());
        Self {
            temperature: readings.air.temperature(),
            pressure_pa: readings.air.pressure_pa,
            humidity_percent: readings.air.humidity_percent,
            aqi: air_quality.map(|aq| aq.aqi),
            bvoc_ppm: air_quality.map(|aq| aq.bvoc_ppm),
            spl_dba: readings.sound.spl_dba,
            illuminance_lux: readings.light.illuminance_lux,
            particle_concentration: readings.particle.map(|p| p.concentration),
        }
    }
}

/// Smallest, mean and largest value of one quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldSummary {
    /// Smallest value.
    pub min: f32,
    /// Arithmetic mean.
    pub mean: f32,
    /// Largest value.
    pub max: f32,
}

impl FieldSummary {
    /// Summarise `values`, or return `None` if there are none.
    fn of(values: impl Iterator<Item = f32>) -> Option<Self> {
        let (count, sum, min, max) = values.fold(
            (0usize, 0.0f64, f32::INFINITY, f32::NEG_INFINITY),
            |(count, sum, min, max), v| (count + 1, sum + f64::from(v), min.min(v), max.max(v)),
        );
        (count > 0).then(|| Self {
            min,
            mean: (sum / count as f64) as f32,
            max,
        })
    }
}

/// Summary of every sample in a history.
///
/// Optional quantities are summarised over the samples that have them, and are
/// `None` if no sample does.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HistorySummary {
    /// Number of samples summarised.
    pub samples: usize,
    /// Temperature.
    pub temperature: Option<FieldSummary>,
    /// Air pressure in Pa.
    pub pressure_pa: Option<FieldSummary>,
    /// Relative humidity in %.
    pub humidity_percent: Option<FieldSummary>,
    /// Air quality index.
    pub aqi: Option<FieldSummary>,
    /// Breath VOC in ppm.
    pub bvoc_ppm: Option<FieldSummary>,
    /// A-weighted sound pressure level in dBA.
    pub spl_dba: Option<FieldSummary>,
    /// Illuminance in lux.
    pub illuminance_lux: Option<FieldSummary>,
    /// Particle concentration.
    pub particle_concentration: Option<FieldSummary>,
}

#[derive(Debug)]
struct Ring {
    capacity: usize,
    samples: VecDeque<Sample>,
}

/// Fixed-capacity ring buffer of [`Sample`]s behind a mutex.
///
/// Once full, each push evicts the oldest sample.
#[derive(Debug, Clone)]
pub struct SharedHistory {
    inner: Arc<Mutex<Ring>>,
}

impl SharedHistory {
    /// Create an empty history holding at most `capacity` samples.
    ///
    /// A capacity of zero is rejected.
    pub fn new(capacity: usize) -> Result<Self, ProtocolError> {
        if capacity == 0 {
            return Err(ProtocolError::BelowMinimum {
                setting: "history capacity",
                value: 0.0,
                min: 1.0,
            });
        }
        Ok(Self {
            inner: Arc::new(Mutex::new(Ring {
                capacity,
                samples: VecDeque::with_capacity(capacity),
            })),
        })
    }

    /// A panic while holding the lock cannot leave the ring inconsistent, so a
    /// poisoned lock is simply taken over.
    fn lock(&self) -> MutexGuard<'_, Ring> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a sample, evicting the oldest if the history is full.
    pub fn push(&self, sample: Sample) {
        let mut ring = self.lock();
        if ring.samples.len() == ring.capacity {
            ring.samples.pop_front();
        }
        ring.samples.push_back(sample);
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.lock().samples.len()
    }

    /// True if no samples are held.
    pub fn is_empty(&self) -> bool {
        self.lock().samples.is_empty()
    }

    /// Largest number of samples held.
    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    /// Copy of all samples, oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.lock().samples.iter().copied().collect()
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<Sample> {
        self.lock().samples.back().copied()
    }

    /// Minimum, mean and maximum of each quantity over the held samples.
    pub fn summary(&self) -> HistorySummary {
        let ring = self.lock();
        let samples = &ring.samples;
        let field = |f: fn(&Sample) -> Option<f32>| FieldSummary::of(samples.iter().filter_map(f));
        HistorySummary {
            samples: samples.len(),
            temperature: field(|s| Some(s.temperature)),
            pressure_pa: field(|s| Some(s.pressure_pa as f32)),
            humidity_percent: field(|s| Some(s.humidity_percent)),
            aqi: field(|s| s.aqi),
            bvoc_ppm: field(|s| s.bvoc_ppm),
            spl_dba: field(|s| Some(s.spl_dba)),
            illuminance_lux: field(|s| Some(s.illuminance_lux)),
            particle_concentration: field(|s| s.particle_concentration),
        }
    }
}
