//! Sample window filter.
//!
//! Fixed-capacity ring buffer of raw distance readings with a median
//! estimate. The backing array is always [`MAX_SAMPLE_WINDOW_SIZE`] long;
//! only the first `size` slots are in use.
//!
//! Invalid readings (0 or above the hardware maximum) are never stored as-is.
//! The last median is re-ingested instead, so a dropout holds the estimate
//! rather than dragging it towards the sensor's maximum range.

use crate::config::{MAX_SAMPLE_WINDOW_SIZE, clamp_window_size};

pub struct SampleWindow {
    ring: [u32; MAX_SAMPLE_WINDOW_SIZE],
    size: usize,
    head: usize,
    count: usize,
    filled: bool,
}

impl SampleWindow {
    pub fn new(size: u8) -> Self {
        Self {
            ring: [0; MAX_SAMPLE_WINDOW_SIZE],
            size: clamp_window_size(size) as usize,
            head: 0,
            count: 0,
            filled: false,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True once the window has seen `size` samples since the last reset.
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    /// Currently occupied slots, in storage order.
    pub fn samples(&self) -> &[u32] {
        &self.ring[..self.count]
    }

    /// Resize the window. A change discards every stored sample.
    /// Returns `true` if the size actually changed.
    pub fn resize(&mut self, size: u8) -> bool {
        let size = clamp_window_size(size) as usize;
        if size == self.size {
            return false;
        }
        self.size = size;
        self.clear();
        true
    }

    pub fn clear(&mut self) {
        self.ring = [0; MAX_SAMPLE_WINDOW_SIZE];
        self.head = 0;
        self.count = 0;
        self.filled = false;
    }

    /// Append a sample, overwriting the oldest once full.
    pub fn ingest(&mut self, distance_mm: u32) {
        self.ring[self.head] = distance_mm;
        self.head = (self.head + 1) % self.size;
        if self.count < self.size {
            self.count += 1;
        }
        if self.count >= self.size {
            self.filled = true;
        }
    }

    /// Fold a raw reading into the window, substituting invalid ones.
    ///
    /// Returns `true` when the raw value was ingested unchanged.
    pub fn ingest_reading(&mut self, raw: u32, max_distance_mm: u32) -> bool {
        if raw != 0 && raw <= max_distance_mm {
            self.ingest(raw);
            return true;
        }
        match self.median() {
            0 => self.ingest(max_distance_mm),
            held => self.ingest(held),
        }
        false
    }

    /// Fill the whole window with `distance_mm` and mark it filled.
    pub fn reset_with_value(&mut self, distance_mm: u32) {
        self.ring[..self.size].fill(distance_mm);
        self.head = 0;
        self.count = self.size;
        self.filled = true;
    }

    /// Median of the occupied slots; mean of the two middle values for an
    /// even count; 0 when empty.
    pub fn median(&self) -> u32 {
        if self.count == 0 {
            return 0;
        }
        let mut sorted = [0u32; MAX_SAMPLE_WINDOW_SIZE];
        sorted[..self.count].copy_from_slice(self.samples());
        let sorted = &mut sorted[..self.count];
        insertion_sort(sorted);

        let mid = self.count / 2;
        if self.count % 2 == 1 {
            sorted[mid]
        } else {
            ((u64::from(sorted[mid - 1]) + u64::from(sorted[mid])) / 2) as u32
        }
    }

    /// Max minus min of the occupied slots (0 when empty).
    pub fn spread(&self) -> u32 {
        let samples = self.samples();
        match (samples.iter().min(), samples.iter().max()) {
            (Some(lo), Some(hi)) => hi - lo,
            _ => 0,
        }
    }
}

/// In-place insertion sort. Windows hold at most a couple of dozen values.
pub(crate) fn insertion_sort<T: Copy + PartialOrd>(values: &mut [T]) {
    for i in 1..values.len() {
        let key = values[i];
        let mut j = i;
        while j > 0 && values[j - 1] > key {
            values[j] = values[j - 1];
            j -= 1;
        }
        values[j] = key;
    }
}
