//! Per-relay timer state machine.
//!
//! Each of the five relays runs a small state machine advanced once per
//! 100 ms tick, independent of bus traffic. Commands only change state
//! codes; the tick drives the physical outputs. The exceptions are
//! [`RelayBank::activate`] and [`RelayBank::deactivate`], which bypass the
//! timed path and drive the output immediately.
//!
//! | state | meaning | tick action |
//! |---|---|---|
//! | 0 | idle | none |
//! | 1 | latched on | none (driven at activation) |
//! | 2 | immediate off | drive inactive, go idle |
//! | 3 | begin pulse | drive active, load countdown, wait |
//! | 4 | pulsing | count down, drive inactive on expiry |
//! | 5 | begin hold | drive active, load countdown, wait |
//! | 6 | holding | count down, drive inactive on expiry |
//! | 7 | permanent on | drive active |
//! | 10/20/30/45 | legacy fixed hold | drive active, countdown = code x 10 |
//!
//! Starting a pulse with duration D seconds keeps the output active for
//! exactly `D * 10` ticks, counting the tick that begins the pulse.
//!
//! The relay drivers are active-low: an energized coil means the output pin
//! is driven low.

use gatelink_core::constants::{DEFAULT_RELAY_SECONDS, RELAY_COUNT, TICKS_PER_SECOND};
use gatelink_hardware::{DigitalOutput, PinLevel};
use tracing::warn;

/// Behavior mode of one relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Latched,
    ImmediateOff,
    PulseStart,
    PulseWait,
    HoldStart,
    HoldWait,
    PermanentOn,
    /// Legacy alias states 10/20/30/45: the code itself is the hold time in
    /// seconds. Resolves into [`HoldWait`](RelayState::HoldWait) on the next
    /// tick.
    LegacyFixed(u8),
}

impl RelayState {
    /// Numeric state code as exposed to façades.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            RelayState::Idle => 0,
            RelayState::Latched => 1,
            RelayState::ImmediateOff => 2,
            RelayState::PulseStart => 3,
            RelayState::PulseWait => 4,
            RelayState::HoldStart => 5,
            RelayState::HoldWait => 6,
            RelayState::PermanentOn => 7,
            RelayState::LegacyFixed(secs) => secs,
        }
    }

    /// Decode a numeric state code; legacy aliases accept only the four
    /// codes deployed masters use.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(RelayState::Idle),
            1 => Some(RelayState::Latched),
            2 => Some(RelayState::ImmediateOff),
            3 => Some(RelayState::PulseStart),
            4 => Some(RelayState::PulseWait),
            5 => Some(RelayState::HoldStart),
            6 => Some(RelayState::HoldWait),
            7 => Some(RelayState::PermanentOn),
            10 | 20 | 30 | 45 => Some(RelayState::LegacyFixed(code)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct RelayChannel {
    state: RelayState,
    /// Configured duration in seconds; persisted per relay.
    duration_secs: u8,
    /// Live countdown in ticks; never persisted.
    countdown: u16,
}

impl RelayChannel {
    fn new(duration_secs: u8) -> Self {
        RelayChannel {
            state: RelayState::Idle,
            duration_secs,
            countdown: 0,
        }
    }
}

/// The five relay channels and their shared tick logic.
#[derive(Debug, Clone)]
pub struct RelayBank {
    channels: [RelayChannel; RELAY_COUNT],
}

impl RelayBank {
    /// All relays idle with the default duration.
    pub fn new() -> Self {
        Self::with_durations([DEFAULT_RELAY_SECONDS; RELAY_COUNT])
    }

    /// All relays idle with per-relay durations (as loaded from the store).
    pub fn with_durations(durations: [u8; RELAY_COUNT]) -> Self {
        RelayBank {
            channels: durations.map(RelayChannel::new),
        }
    }

    fn channel(&self, relay: usize) -> Option<&RelayChannel> {
        (1..=RELAY_COUNT)
            .contains(&relay)
            .then(|| &self.channels[relay - 1])
    }

    fn channel_mut(&mut self, relay: usize) -> Option<&mut RelayChannel> {
        (1..=RELAY_COUNT)
            .contains(&relay)
            .then(|| &mut self.channels[relay - 1])
    }

    /// Drive one output, mapping energized to the active-low pin level.
    fn drive<O: DigitalOutput>(outputs: &mut O, index: usize, energized: bool) {
        let level = if energized {
            PinLevel::Low
        } else {
            PinLevel::High
        };
        if let Err(e) = outputs.write(index, level) {
            warn!(relay = index + 1, ?level, error = %e, "relay output write failed");
        }
    }

    /// Latch a relay on immediately, bypassing the timed path.
    ///
    /// Returns `false` (no state change) for relay numbers outside 1-5.
    pub fn activate<O: DigitalOutput>(&mut self, relay: usize, outputs: &mut O) -> bool {
        let Some(channel) = self.channel_mut(relay) else {
            return false;
        };
        channel.state = RelayState::Latched;
        Self::drive(outputs, relay - 1, true);
        true
    }

    /// Release a relay immediately, bypassing the timed path.
    pub fn deactivate<O: DigitalOutput>(&mut self, relay: usize, outputs: &mut O) -> bool {
        let Some(channel) = self.channel_mut(relay) else {
            return false;
        };
        channel.state = RelayState::Idle;
        Self::drive(outputs, relay - 1, false);
        true
    }

    /// Set a relay's state code without touching the output; the next tick
    /// applies it.
    pub fn set_state(&mut self, relay: usize, state: RelayState) -> bool {
        match self.channel_mut(relay) {
            Some(channel) => {
                channel.state = state;
                true
            }
            None => false,
        }
    }

    pub fn state(&self, relay: usize) -> Option<RelayState> {
        self.channel(relay).map(|c| c.state)
    }

    /// Update the live duration for a relay (persistence is the caller's
    /// concern).
    pub fn set_duration(&mut self, relay: usize, seconds: u8) -> bool {
        match self.channel_mut(relay) {
            Some(channel) => {
                channel.duration_secs = seconds;
                true
            }
            None => false,
        }
    }

    pub fn duration(&self, relay: usize) -> Option<u8> {
        self.channel(relay).map(|c| c.duration_secs)
    }

    /// Overwrite a relay's live countdown.
    pub fn set_countdown(&mut self, relay: usize, ticks: u16) -> bool {
        match self.channel_mut(relay) {
            Some(channel) => {
                channel.countdown = ticks;
                true
            }
            None => false,
        }
    }

    /// Advance every relay one 100 ms tick, driving outputs as needed.
    pub fn tick<O: DigitalOutput>(&mut self, outputs: &mut O) {
        for index in 0..RELAY_COUNT {
            let channel = &mut self.channels[index];
            match channel.state {
                // Idle and latched outputs were driven when commanded.
                RelayState::Idle | RelayState::Latched => {}

                RelayState::ImmediateOff => {
                    Self::drive(outputs, index, false);
                    channel.state = RelayState::Idle;
                }

                RelayState::PulseStart => {
                    Self::drive(outputs, index, true);
                    channel.countdown = channel.duration_secs as u16 * TICKS_PER_SECOND;
                    channel.state = RelayState::PulseWait;
                    Self::count_down(channel, outputs, index);
                }

                RelayState::PulseWait => Self::count_down(channel, outputs, index),

                RelayState::HoldStart => {
                    Self::drive(outputs, index, true);
                    channel.countdown = channel.duration_secs as u16 * TICKS_PER_SECOND;
                    channel.state = RelayState::HoldWait;
                    Self::count_down(channel, outputs, index);
                }

                RelayState::HoldWait => Self::count_down(channel, outputs, index),

                RelayState::PermanentOn => Self::drive(outputs, index, true),

                RelayState::LegacyFixed(secs) => {
                    Self::drive(outputs, index, true);
                    channel.countdown = secs as u16 * TICKS_PER_SECOND;
                    channel.state = RelayState::HoldWait;
                    Self::count_down(channel, outputs, index);
                }
            }
        }
    }

    /// Shared expiry logic of the waiting states. The begin states call
    /// this in their own tick, so a D-second pulse is active for exactly
    /// `D * 10` ticks including the tick that started it.
    fn count_down<O: DigitalOutput>(channel: &mut RelayChannel, outputs: &mut O, index: usize) {
        channel.countdown = channel.countdown.saturating_sub(1);
        if channel.countdown == 0 {
            Self::drive(outputs, index, false);
            channel.state = RelayState::Idle;
        }
    }
}

impl Default for RelayBank {
    fn default() -> Self {
        RelayBank::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatelink_hardware::MockOutputs;
    use rstest::rstest;

    fn bank_and_outputs() -> (RelayBank, MockOutputs) {
        (RelayBank::new(), MockOutputs::new(RELAY_COUNT))
    }

    #[test]
    fn activate_drives_immediately() {
        let (mut bank, mut outputs) = bank_and_outputs();
        assert!(bank.activate(1, &mut outputs));
        assert_eq!(bank.state(1), Some(RelayState::Latched));
        assert!(outputs.is_energized(0));
    }

    #[test]
    fn deactivate_releases_immediately() {
        let (mut bank, mut outputs) = bank_and_outputs();
        bank.activate(2, &mut outputs);
        assert!(bank.deactivate(2, &mut outputs));
        assert_eq!(bank.state(2), Some(RelayState::Idle));
        assert!(!outputs.is_energized(1));
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(99)]
    fn out_of_range_relay_is_silent_noop(#[case] relay: usize) {
        let (mut bank, mut outputs) = bank_and_outputs();
        assert!(!bank.activate(relay, &mut outputs));
        assert!(!bank.deactivate(relay, &mut outputs));
        assert!(!bank.set_state(relay, RelayState::PermanentOn));
        assert!(!bank.set_duration(relay, 9));
        assert!(bank.state(relay).is_none());
        assert!(outputs.history().is_empty());
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    fn pulse_expires_after_exactly_duration_times_ten_ticks(#[case] duration: u8) {
        let (mut bank, mut outputs) = bank_and_outputs();
        bank.set_duration(3, duration);
        bank.set_state(3, RelayState::PulseStart);

        let ticks = duration as u16 * TICKS_PER_SECOND;
        for elapsed in 1..ticks {
            bank.tick(&mut outputs);
            assert!(
                outputs.is_energized(2),
                "relay released early at tick {elapsed}"
            );
            assert_eq!(bank.state(3), Some(RelayState::PulseWait));
        }

        bank.tick(&mut outputs);
        assert!(!outputs.is_energized(2));
        assert_eq!(bank.state(3), Some(RelayState::Idle));
    }

    #[test]
    fn hold_behaves_like_pulse_with_hold_states() {
        let (mut bank, mut outputs) = bank_and_outputs();
        bank.set_duration(1, 1);
        bank.set_state(1, RelayState::HoldStart);

        bank.tick(&mut outputs);
        assert!(outputs.is_energized(0));
        assert_eq!(bank.state(1), Some(RelayState::HoldWait));

        for _ in 1..TICKS_PER_SECOND {
            bank.tick(&mut outputs);
        }
        assert!(!outputs.is_energized(0));
        assert_eq!(bank.state(1), Some(RelayState::Idle));
    }

    #[rstest]
    #[case(10)]
    #[case(20)]
    #[case(30)]
    #[case(45)]
    fn legacy_codes_hold_for_code_seconds(#[case] code: u8) {
        let (mut bank, mut outputs) = bank_and_outputs();
        bank.set_state(4, RelayState::LegacyFixed(code));

        bank.tick(&mut outputs);
        assert!(outputs.is_energized(3));
        assert_eq!(bank.state(4), Some(RelayState::HoldWait));

        let remaining = code as u16 * TICKS_PER_SECOND - 1;
        for _ in 0..remaining - 1 {
            bank.tick(&mut outputs);
            assert!(outputs.is_energized(3));
        }
        bank.tick(&mut outputs);
        assert!(!outputs.is_energized(3));
        assert_eq!(bank.state(4), Some(RelayState::Idle));
    }

    #[test]
    fn immediate_off_resolves_in_one_tick() {
        let (mut bank, mut outputs) = bank_and_outputs();
        bank.activate(2, &mut outputs);
        bank.set_state(2, RelayState::ImmediateOff);
        bank.tick(&mut outputs);
        assert!(!outputs.is_energized(1));
        assert_eq!(bank.state(2), Some(RelayState::Idle));
    }

    #[test]
    fn permanent_on_survives_ticks() {
        let (mut bank, mut outputs) = bank_and_outputs();
        bank.set_state(1, RelayState::PermanentOn);
        for _ in 0..100 {
            bank.tick(&mut outputs);
            assert!(outputs.is_energized(0));
            assert_eq!(bank.state(1), Some(RelayState::PermanentOn));
        }
    }

    #[test]
    fn tick_leaves_idle_relays_alone() {
        let (mut bank, mut outputs) = bank_and_outputs();
        bank.tick(&mut outputs);
        assert!(outputs.history().is_empty());
    }

    #[test]
    fn state_codes_round_trip() {
        for code in [0, 1, 2, 3, 4, 5, 6, 7, 10, 20, 30, 45] {
            assert_eq!(RelayState::from_code(code).unwrap().code(), code);
        }
        assert!(RelayState::from_code(8).is_none());
        assert!(RelayState::from_code(15).is_none());
    }
}
