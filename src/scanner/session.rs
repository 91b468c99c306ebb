// SPDX-License-Identifier: GPL-3.0-only

//! Per-run deduplication state

use crate::backends::audio::Beeper;
use crate::config::LabelMappings;
use crate::frame_processor::types::DecodedSymbol;
use std::collections::HashSet;
use tracing::debug;

/// Decoded texts already reported in this run
///
/// Only grows. A new run starts with an empty set.
#[derive(Debug, Default, Clone)]
pub struct SeenValues {
    values: HashSet<String>,
}

impl SeenValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value, returning `true` the first time it is seen
    pub fn insert(&mut self, text: &str) -> bool {
        if self.values.contains(text) {
            return false;
        }
        self.values.insert(text.to_owned())
    }

    pub fn contains(&self, text: &str) -> bool {
        self.values.contains(text)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

/// State owned by one scan run: seen values, labels and the optional beeper
pub struct ScanSession {
    seen: SeenValues,
    mappings: LabelMappings,
    beeper: Option<Box<dyn Beeper>>,
}

impl ScanSession {
    pub fn new(mappings: LabelMappings) -> Self {
        Self {
            seen: SeenValues::new(),
            mappings,
            beeper: None,
        }
    }

    /// Beep on every first sighting
    pub fn with_beeper(mut self, beeper: Option<Box<dyn Beeper>>) -> Self {
        self.beeper = beeper;
        self
    }

    pub fn beep_enabled(&self) -> bool {
        self.beeper.is_some()
    }

    pub fn seen(&self) -> &SeenValues {
        &self.seen
    }

    /// Console / overlay text: the mapped label, or `<TYPE>: <text>`
    pub fn label_for(&self, symbol: &DecodedSymbol) -> String {
        match self.mappings.label_for(&symbol.text) {
            Some(label) => label.to_owned(),
            None => symbol.label(),
        }
    }

    /// Record a sighting, returning `true` if its text is new this run
    pub fn record(&mut self, symbol: &DecodedSymbol) -> bool {
        self.seen.insert(&symbol.text)
    }

    /// Signal a first sighting; failures are dropped
    pub fn signal_new_value(&mut self) {
        if let Some(beeper) = self.beeper.as_mut()
            && let Err(e) = beeper.beep()
        {
            debug!(error = %e, "Beep failed");
        }
    }
}
