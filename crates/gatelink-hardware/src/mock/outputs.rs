//! Recording digital-output bank.

use crate::error::{HardwareError, Result};
use crate::traits::{DigitalOutput, PinLevel};

/// In-memory output bank that records current levels and the full write
/// history.
///
/// Outputs power up [`PinLevel::High`], which is the de-energized level of
/// the active-low relay drivers.
#[derive(Debug, Clone)]
pub struct MockOutputs {
    levels: Vec<PinLevel>,
    history: Vec<(usize, PinLevel)>,
}

impl MockOutputs {
    /// Bank with `channels` outputs, all initially high.
    pub fn new(channels: usize) -> Self {
        MockOutputs {
            levels: vec![PinLevel::High; channels],
            history: Vec::new(),
        }
    }

    /// Current level of a channel.
    pub fn level(&self, channel: usize) -> Option<PinLevel> {
        self.levels.get(channel).copied()
    }

    /// Whether the active-low load on a channel is currently energized.
    pub fn is_energized(&self, channel: usize) -> bool {
        self.level(channel) == Some(PinLevel::Low)
    }

    /// Every write performed, in order.
    pub fn history(&self) -> &[(usize, PinLevel)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl DigitalOutput for MockOutputs {
    fn write(&mut self, channel: usize, level: PinLevel) -> Result<()> {
        let slot = self
            .levels
            .get_mut(channel)
            .ok_or(HardwareError::UnknownChannel(channel))?;
        *slot = level;
        self.history.push((channel, level));
        Ok(())
    }
}
