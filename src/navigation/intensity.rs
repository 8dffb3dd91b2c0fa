// src/navigation/intensity.rs
// Rolling average over the most recent light-intensity samples.

use std::collections::VecDeque;

/// Result of feeding one sample into the filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedIntensity {
    /// Mean of the window after this sample
    pub current: f64,
    /// Mean of the window after the previous sample, if there was one
    pub previous: Option<f64>,
}

impl SmoothedIntensity {
    /// True when the smoothed intensity went up since the previous sample.
    /// `None` until two samples have been seen.
    pub fn is_rising(&self) -> Option<bool> {
        self.previous.map(|previous| self.current > previous)
    }
}

/// Bounded FIFO window of raw samples with a recomputed mean
#[derive(Debug, Clone)]
pub struct IntensityFilter {
    window: VecDeque<f64>,
    capacity: usize,
    current: Option<f64>,
}

impl IntensityFilter {
    /// Creates an empty filter averaging over `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        IntensityFilter {
            window: VecDeque::with_capacity(capacity),
            capacity,
            current: None,
        }
    }

    /// Adds a raw reading and returns the new smoothed value.
    ///
    /// Negative readings are clamped to zero. Before the window fills, the mean covers only
    /// the samples seen so far.
    pub fn observe(&mut self, raw: f64) -> SmoothedIntensity {
        if self.window.len() >= self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(raw.max(0.0));

        let mean = self.window.iter().sum::<f64>() / self.window.len() as f64;
        let previous = self.current.replace(mean);

        SmoothedIntensity { current: mean, previous }
    }

    /// Latest smoothed value.
    pub fn current(&self) -> Option<f64> {
        self.current
    }

    /// Number of samples in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// True before the first sample.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Window capacity (K).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every sample.
    pub fn reset(&mut self) {
        self.window.clear();
        self.current = None;
    }
}
