//! Two-timer animation sequencer.
//!
//! The roll timer spins the disc without end. The tilt timer sweeps pitch and yaw
//! toward one of two limits and switches itself off when both axes arrive. Both are
//! evaluated once per tick in a fixed order: roll, then tilt.

use crate::config::AnimationConfig;
use crate::state::SpindleState;
use std::time::Duration;
use tracing::debug;

/// Host command. Parsing is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    /// Leaves the sweep direction alone but still restarts both timers.
    Unrecognized,
}

impl Command {
    pub fn parse(input: &str) -> Self {
        match input.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "stop" => Command::Stop,
            _ => Command::Unrecognized,
        }
    }
}

/// Which limit the tilt sweep is heading for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    ToStart,
    ToStop,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationParams {
    pub roll_step: f64,
    pub move_unit: f64,
    pub start_limit: f64,
    pub stop_limit: f64,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self::from(&AnimationConfig::default())
    }
}

impl From<&AnimationConfig> for AnimationParams {
    fn from(config: &AnimationConfig) -> Self {
        Self {
            roll_step: config.roll_step_deg,
            move_unit: config.move_unit,
            start_limit: config.start_limit_deg,
            stop_limit: config.stop_limit_deg,
        }
    }
}

/// On/off switch for one periodic callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    running: bool,
}

impl Timer {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Per-axis result of one tilt tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiltStep {
    pub pitch_at_limit: bool,
    pub yaw_at_limit: bool,
}

impl TiltStep {
    /// Both axes reached the target in this evaluation.
    pub fn is_complete(&self) -> bool {
        self.pitch_at_limit && self.yaw_at_limit
    }
}

/// What a completed sweep did to the timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Sweep to the start limit finished; the roll keeps spinning.
    TiltStopped,
    /// Sweep back to the stop limit finished; roll reset to zero and both timers off.
    SpunDown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub rolled: bool,
    pub tilt: Option<TiltStep>,
    pub transition: Option<Transition>,
}

/// Moves `value` one unit toward `limit`, snapping onto it when it would overshoot.
fn step_toward(value: f64, limit: f64, unit: f64, descending: bool) -> (f64, bool) {
    let next = if descending {
        if value > limit {
            (value - unit).max(limit)
        } else {
            limit
        }
    } else if value < limit {
        (value + unit).min(limit)
    } else {
        limit
    };
    (next, next == limit)
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    params: AnimationParams,
    sweep: Sweep,
    roll_timer: Timer,
    tilt_timer: Timer,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(AnimationParams::default())
    }
}

impl Sequencer {
    pub fn new(params: AnimationParams) -> Self {
        Self {
            params,
            sweep: Sweep::ToStart,
            roll_timer: Timer::default(),
            tilt_timer: Timer::default(),
        }
    }

    pub fn params(&self) -> &AnimationParams {
        &self.params
    }

    pub fn sweep(&self) -> Sweep {
        self.sweep
    }

    pub fn is_rolling(&self) -> bool {
        self.roll_timer.is_running()
    }

    pub fn is_tilting(&self) -> bool {
        self.tilt_timer.is_running()
    }

    pub fn is_idle(&self) -> bool {
        !self.is_rolling() && !self.is_tilting()
    }

    /// Handle a host command.
    ///
    /// The sweep continues from the current angles in the new direction.
    pub fn invoke(&mut self, command: &str) -> Command {
        self.tilt_timer.stop();
        let parsed = Command::parse(command);
        match parsed {
            Command::Start => self.sweep = Sweep::ToStart,
            Command::Stop => self.sweep = Sweep::ToStop,
            Command::Unrecognized => {}
        }
        self.roll_timer.start();
        self.tilt_timer.start();
        debug!(command, ?parsed, sweep = ?self.sweep, "sequencer invoked");
        parsed
    }

    /// Advance roll by one step, wrapping at 360.
    pub fn tick_roll(&self, state: &mut SpindleState) {
        let roll = (state.roll() + self.params.roll_step).rem_euclid(360.0);
        state.set_roll(roll);
    }

    /// Move pitch and yaw one unit toward the current sweep target.
    pub fn tick_tilt(&self, state: &mut SpindleState) -> TiltStep {
        let (limit, descending) = match self.sweep {
            Sweep::ToStart => (self.params.start_limit, true),
            Sweep::ToStop => (self.params.stop_limit, false),
        };
        let unit = self.params.move_unit;

        let (pitch, pitch_at_limit) = step_toward(state.pitch(), limit, unit, descending);
        state.set_pitch(pitch);
        let (yaw, yaw_at_limit) = step_toward(state.yaw(), limit, unit, descending);
        state.set_yaw(yaw);

        TiltStep {
            pitch_at_limit,
            yaw_at_limit,
        }
    }

    /// Apply the timer coupling for a finished sweep.
    pub fn complete_sweep(&mut self, state: &mut SpindleState) -> Transition {
        match self.sweep {
            Sweep::ToStart => {
                self.tilt_timer.stop();
                Transition::TiltStopped
            }
            Sweep::ToStop => {
                state.set_roll(0.0);
                self.roll_timer.stop();
                self.tilt_timer.stop();
                Transition::SpunDown
            }
        }
    }

    /// One scheduler tick: roll first, then tilt.
    pub fn tick(&mut self, state: &mut SpindleState) -> TickReport {
        let mut report = TickReport::default();

        if self.roll_timer.is_running() {
            self.tick_roll(state);
            report.rolled = true;
        }

        if self.tilt_timer.is_running() {
            let step = self.tick_tilt(state);
            report.tilt = Some(step);
            if step.is_complete() {
                let transition = self.complete_sweep(state);
                debug!(?transition, "sweep complete");
                report.transition = Some(transition);
            }
        }

        report
    }
}

/// Most ticks caught up in one `advance`; older backlog is dropped.
pub const MAX_BACKLOG_TICKS: u32 = 100;

/// Converts wall-clock time into whole ticks for a [`Sequencer`].
#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
    carry: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            carry: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next tick is due.
    pub fn until_next_tick(&self) -> Duration {
        self.interval.saturating_sub(self.carry)
    }

    /// Run every tick that fell due during `elapsed`, returning how many ran.
    ///
    /// After a stall only the last [`MAX_BACKLOG_TICKS`] intervals are replayed.
    pub fn advance(
        &mut self,
        elapsed: Duration,
        sequencer: &mut Sequencer,
        state: &mut SpindleState,
    ) -> usize {
        let backlog = self
            .interval
            .checked_mul(MAX_BACKLOG_TICKS)
            .unwrap_or(Duration::MAX);
        self.carry = self.carry.saturating_add(elapsed);
        if self.carry > backlog {
            debug!(dropped = ?(self.carry - backlog), "scheduler backlog trimmed");
            self.carry = backlog;
        }
        let mut ticks = 0;
        while self.carry >= self.interval {
            self.carry -= self.interval;
            if sequencer.is_idle() {
                continue;
            }
            sequencer.tick(state);
            ticks += 1;
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_parsing_ignores_case() {
        assert_eq!(Command::parse("start"), Command::Start);
        assert_eq!(Command::parse("START"), Command::Start);
        assert_eq!(Command::parse("Stop"), Command::Stop);
        assert_eq!(Command::parse("pause"), Command::Unrecognized);
        assert_eq!(Command::parse(""), Command::Unrecognized);
    }

    #[test]
    fn roll_wraps_at_full_turn() {
        let seq = Sequencer::default();
        let mut state = SpindleState::default();
        state.set_roll(358.0);
        seq.tick_roll(&mut state);
        assert_eq!(state.roll(), 2.0);
    }

    #[test]
    fn idle_until_invoked() {
        let mut seq = Sequencer::default();
        let mut state = SpindleState::default();
        assert!(seq.is_idle());
        assert_eq!(seq.tick(&mut state), TickReport::default());
        assert_eq!(state.roll(), 0.0);
    }

    #[test]
    fn sweep_to_start_takes_180_ticks() {
        let mut seq = Sequencer::default();
        let mut state = SpindleState::default();
        seq.invoke("start");

        for tick in 1..180 {
            let report = seq.tick(&mut state);
            assert!(
                !report.tilt.unwrap().is_complete(),
                "tick {tick} reported completion"
            );
            assert!(report.transition.is_none());
        }
        let report = seq.tick(&mut state);
        assert!(report.tilt.unwrap().is_complete());
        assert_eq!(report.transition, Some(Transition::TiltStopped));
        assert_eq!(state.pitch(), -90.0);
        assert_eq!(state.yaw(), -90.0);

        // roll keeps going, tilt is off
        assert!(seq.is_rolling());
        assert!(!seq.is_tilting());
        let report = seq.tick(&mut state);
        assert!(report.rolled);
        assert!(report.tilt.is_none());
    }

    #[test]
    fn completion_needs_both_axes() {
        let mut seq = Sequencer::default();
        let mut state = SpindleState::default();
        state.set_pitch(-45.0);
        seq.invoke("start");

        for _ in 0..90 {
            seq.tick(&mut state);
        }
        assert_eq!(state.pitch(), -90.0);
        assert_eq!(state.yaw(), -45.0);

        for tick in 91..180 {
            let step = seq.tick(&mut state).tilt.unwrap();
            assert!(step.pitch_at_limit);
            assert!(!step.yaw_at_limit, "tick {tick}");
            assert!(!step.is_complete());
        }
        assert_eq!(seq.tick(&mut state).transition, Some(Transition::TiltStopped));
    }

    #[test]
    fn sweep_to_stop_spins_down() {
        let mut seq = Sequencer::default();
        let mut state = SpindleState::default();
        state.set_pitch(-1.0);
        state.set_yaw(-1.0);
        state.set_roll(100.0);
        seq.invoke("stop");

        assert_eq!(seq.tick(&mut state).transition, None);
        let report = seq.tick(&mut state);
        assert_eq!(report.transition, Some(Transition::SpunDown));
        assert_eq!(state.roll(), 0.0);
        assert_eq!(state.pitch(), 0.0);
        assert_eq!(state.yaw(), 0.0);
        assert!(seq.is_idle());
    }

    #[test]
    fn invoke_reverses_mid_sweep_from_current_angle() {
        let mut seq = Sequencer::default();
        let mut state = SpindleState::default();
        seq.invoke("start");
        for _ in 0..20 {
            seq.tick(&mut state);
        }
        assert_eq!(state.pitch(), -10.0);

        seq.invoke("stop");
        seq.tick(&mut state);
        assert_eq!(state.pitch(), -9.5);
        assert_eq!(seq.sweep(), Sweep::ToStop);
    }

    #[test]
    fn mixed_case_stop_sets_direction() {
        let mut a = Sequencer::default();
        a.invoke("start");
        a.invoke("STOP");
        let mut b = Sequencer::default();
        b.invoke("stop");
        assert_eq!(a.sweep(), b.sweep());
        assert_eq!(a.sweep(), Sweep::ToStop);
    }

    #[test]
    fn unrecognized_command_restarts_timers() {
        let mut seq = Sequencer::default();
        seq.invoke("stop");
        let mut state = SpindleState::default();
        seq.tick(&mut state);
        assert!(seq.is_idle());

        assert_eq!(seq.invoke("spin"), Command::Unrecognized);
        assert_eq!(seq.sweep(), Sweep::ToStop);
        assert!(seq.is_rolling());
        assert!(seq.is_tilting());
    }

    #[test]
    fn scheduler_runs_whole_ticks_only() {
        let mut scheduler = Scheduler::new(Duration::from_millis(10));
        let mut seq = Sequencer::default();
        let mut state = SpindleState::default();
        seq.invoke("start");

        assert_eq!(scheduler.advance(Duration::from_millis(25), &mut seq, &mut state), 2);
        assert_eq!(state.roll(), 8.0);
        assert_eq!(scheduler.until_next_tick(), Duration::from_millis(5));
        assert_eq!(scheduler.advance(Duration::from_millis(5), &mut seq, &mut state), 1);
        assert_eq!(state.roll(), 12.0);
    }

    #[test]
    fn scheduler_caps_catch_up_after_stall() {
        let mut scheduler = Scheduler::new(Duration::from_millis(10));
        let mut seq = Sequencer::default();
        let mut state = SpindleState::default();
        seq.invoke("start");

        let ran = scheduler.advance(Duration::from_secs(30), &mut seq, &mut state);
        assert_eq!(ran, MAX_BACKLOG_TICKS as usize);
        assert_eq!(scheduler.until_next_tick(), Duration::from_millis(10));
        assert_eq!(scheduler.advance(Duration::from_millis(10), &mut seq, &mut state), 1);
    }

    #[test]
    fn scheduler_skips_while_idle() {
        let mut scheduler = Scheduler::new(Duration::from_millis(10));
        let mut seq = Sequencer::default();
        let mut state = SpindleState::default();
        assert_eq!(scheduler.advance(Duration::from_millis(100), &mut seq, &mut state), 0);
        assert!(!state.has_pending());
    }
}
