//! Pill drop state machine
//!
//! One session releases one pill from one module:
//!
//! ```text
//! Idle ─start─► CloseSlider ──250 ms──► CheckSensor ─present──────────► OpenSlider
//!                                          │    ▲                           │
//!                                   absent │    │ 700 ms                 250 ms
//!                             retries left ▼    │                           ▼
//!                                      VibrateRetry                       Finish ─► Idle
//! ```
//!
//! With no retries left an absent pill still proceeds to OpenSlider; the
//! failure is detected at Finish. Each phase boundary is measured from
//! the time the phase was entered, so irregular poll intervals delay a
//! step but never skip one.
//!
//! Transitions are pure: [`DropSession::step`] returns the next session
//! and the actuator commands to apply. The controller never touches the
//! hardware itself.

use heapless::Vec;
use pillex_hal::time::elapsed_ms;

use super::actuator::ActuatorCommand;
use super::module::ModuleId;
use crate::config::TimingConfig;

/// Actuator commands produced by one step
pub type Commands = Vec<ActuatorCommand, 4>;

/// Observable phase of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DropPhase {
    Idle,
    CloseSlider,
    CheckSensor,
    VibrateRetry,
    OpenSlider,
    Finish,
}

/// Last VibrateRetry sub-step already issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum VibrateStep {
    On,
    Off,
    Nudge,
    Settle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum SessionPhase {
    CloseSlider,
    CheckSensor,
    VibrateRetry(VibrateStep),
    OpenSlider,
    Finish,
}

/// Result of a finished session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DropOutcome {
    /// Pill was seen in the chamber and left it
    Dispensed(ModuleId),
    /// Pill could not be confirmed
    Stuck(ModuleId),
}

impl DropOutcome {
    pub fn module(self) -> ModuleId {
        match self {
            DropOutcome::Dispensed(m) | DropOutcome::Stuck(m) => m,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, DropOutcome::Dispensed(_))
    }
}

/// Effects of one controller step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropStep {
    /// Commands for the active module, in order
    pub commands: Commands,
    /// Set when the session reached its terminal step
    pub outcome: Option<DropOutcome>,
}

impl DropStep {
    fn command(mut self, command: ActuatorCommand) -> Self {
        // Capacity covers the longest catch-up sequence
        let _ = self.commands.push(command);
        self
    }
}

/// One in-flight drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DropSession {
    module: ModuleId,
    phase: SessionPhase,
    entered_at: u32,
    retry_count: u8,
    initial_sensor_present: bool,
}

impl DropSession {
    /// Begin a session: the slider starts closing immediately
    pub fn begin(module: ModuleId, now: u32) -> (Self, DropStep) {
        let session = Self {
            module,
            phase: SessionPhase::CloseSlider,
            entered_at: now,
            retry_count: 0,
            initial_sensor_present: false,
        };
        (session, DropStep::default().command(ActuatorCommand::SliderClose))
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    pub fn retry_count(&self) -> u8 {
        self.retry_count
    }

    pub fn initial_sensor_present(&self) -> bool {
        self.initial_sensor_present
    }

    pub fn phase(&self) -> DropPhase {
        match self.phase {
            SessionPhase::CloseSlider => DropPhase::CloseSlider,
            SessionPhase::CheckSensor => DropPhase::CheckSensor,
            SessionPhase::VibrateRetry(_) => DropPhase::VibrateRetry,
            SessionPhase::OpenSlider => DropPhase::OpenSlider,
            SessionPhase::Finish => DropPhase::Finish,
        }
    }

    /// True if the next step consumes a sensor reading
    pub fn needs_sensor(&self) -> bool {
        matches!(self.phase, SessionPhase::CheckSensor | SessionPhase::Finish)
    }

    fn enter(&mut self, phase: SessionPhase, now: u32) {
        self.phase = phase;
        self.entered_at = now;
    }

    /// Advance by at most one phase
    ///
    /// `pill_present` is the sensor reading for phases that need one
    /// (`None` reads as absent). Returns `None` as the next session once
    /// the terminal step has run.
    pub fn step(
        mut self,
        now: u32,
        pill_present: Option<bool>,
        timing: &TimingConfig,
    ) -> (Option<Self>, DropStep) {
        let elapsed = elapsed_ms(now, self.entered_at);
        let present = pill_present.unwrap_or(false);
        let mut out = DropStep::default();

        match self.phase {
            SessionPhase::CloseSlider => {
                if elapsed >= timing.slider_ms {
                    out = out.command(ActuatorCommand::SliderStop);
                    self.enter(SessionPhase::CheckSensor, now);
                }
            }
            SessionPhase::CheckSensor => {
                self.initial_sensor_present = present;
                if present || self.retry_count >= timing.max_retries {
                    out = out.command(ActuatorCommand::SliderOpen);
                    self.enter(SessionPhase::OpenSlider, now);
                } else {
                    out = out.command(ActuatorCommand::VibratorOn);
                    self.enter(SessionPhase::VibrateRetry(VibrateStep::On), now);
                }
            }
            SessionPhase::VibrateRetry(mut sub) => {
                if sub == VibrateStep::On && elapsed >= timing.vibrate_on_ms {
                    out = out.command(ActuatorCommand::VibratorOff);
                    sub = VibrateStep::Off;
                }
                if sub == VibrateStep::Off && elapsed >= timing.nudge_start_ms {
                    out = out.command(ActuatorCommand::SliderClose);
                    sub = VibrateStep::Nudge;
                }
                if sub == VibrateStep::Nudge && elapsed >= timing.nudge_stop_ms {
                    out = out.command(ActuatorCommand::SliderStop);
                    sub = VibrateStep::Settle;
                }
                if sub == VibrateStep::Settle && elapsed >= timing.vibrate_cycle_ms {
                    self.retry_count += 1;
                    self.enter(SessionPhase::CheckSensor, now);
                } else {
                    self.phase = SessionPhase::VibrateRetry(sub);
                }
            }
            SessionPhase::OpenSlider => {
                if elapsed >= timing.slider_ms {
                    out = out.command(ActuatorCommand::SliderStop);
                    self.enter(SessionPhase::Finish, now);
                }
            }
            SessionPhase::Finish => {
                out.outcome = Some(if self.initial_sensor_present && !present {
                    DropOutcome::Dispensed(self.module)
                } else {
                    DropOutcome::Stuck(self.module)
                });
                return (None, out);
            }
        }

        (Some(self), out)
    }
}

/// Owner of the single drop session
#[derive(Debug, Clone)]
pub struct DropController {
    timing: TimingConfig,
    session: Option<DropSession>,
    last_module: Option<ModuleId>,
}

impl DropController {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            timing,
            session: None,
            last_module: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_none()
    }

    pub fn phase(&self) -> DropPhase {
        self.session.map_or(DropPhase::Idle, |s| s.phase())
    }

    pub fn session(&self) -> Option<&DropSession> {
        self.session.as_ref()
    }

    /// Module of the most recently started session
    pub fn last_module(&self) -> Option<ModuleId> {
        self.last_module
    }

    /// Start a session; `None` if one is already in flight
    pub fn start(&mut self, module: ModuleId, now: u32) -> Option<DropStep> {
        if self.session.is_some() {
            return None;
        }
        let (session, step) = DropSession::begin(module, now);
        self.session = Some(session);
        self.last_module = Some(module);
        Some(step)
    }

    /// True if the next [`advance`](Self::advance) consumes a sensor reading
    pub fn needs_sensor(&self) -> bool {
        self.session.is_some_and(|s| s.needs_sensor())
    }

    /// Advance the active session by at most one phase
    pub fn advance(&mut self, now: u32, pill_present: Option<bool>) -> DropStep {
        match self.session.take() {
            Some(session) => {
                let (next, step) = session.step(now, pill_present, &self.timing);
                self.session = next;
                step
            }
            None => DropStep::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use ActuatorCommand::*;

    fn m(i: u8) -> ModuleId {
        ModuleId::new(i).unwrap()
    }

    fn controller() -> DropController {
        DropController::new(TimingConfig::default())
    }

    /// Poll until the phase changes, at `dt` ms spacing
    fn run_until_phase_change(
        ctl: &mut DropController,
        now: &mut u32,
        dt: u32,
        sensor: bool,
    ) -> Commands {
        let start = ctl.phase();
        let mut cmds = Commands::new();
        while ctl.phase() == start {
            *now += dt;
            let reading = ctl.needs_sensor().then_some(sensor);
            for c in ctl.advance(*now, reading).commands {
                cmds.push(c).unwrap();
            }
        }
        cmds
    }

    #[test]
    fn test_start_closes_slider() {
        let mut ctl = controller();
        let step = ctl.start(m(1), 0).unwrap();
        assert_eq!(step.commands.as_slice(), &[SliderClose]);
        assert_eq!(ctl.phase(), DropPhase::CloseSlider);
        assert_eq!(ctl.last_module(), Some(m(1)));
    }

    #[test]
    fn test_only_one_session() {
        let mut ctl = controller();
        ctl.start(m(0), 0).unwrap();
        assert!(ctl.start(m(1), 1).is_none());
        assert_eq!(ctl.session().unwrap().module(), m(0));
    }

    #[test]
    fn test_close_slider_duration() {
        let mut ctl = controller();
        ctl.start(m(0), 1000).unwrap();
        assert!(ctl.advance(1249, None).commands.is_empty());
        assert_eq!(ctl.phase(), DropPhase::CloseSlider);
        assert_eq!(ctl.advance(1250, None).commands.as_slice(), &[SliderStop]);
        assert_eq!(ctl.phase(), DropPhase::CheckSensor);
    }

    #[test]
    fn test_happy_path_dispenses() {
        let mut ctl = controller();
        ctl.start(m(2), 0).unwrap();
        ctl.advance(250, None);
        let step = ctl.advance(251, Some(true));
        assert_eq!(step.commands.as_slice(), &[SliderOpen]);
        assert!(ctl.session().unwrap().initial_sensor_present());
        ctl.advance(400, None);
        assert_eq!(ctl.phase(), DropPhase::OpenSlider);
        assert_eq!(ctl.advance(501, None).commands.as_slice(), &[SliderStop]);
        assert_eq!(ctl.phase(), DropPhase::Finish);
        let step = ctl.advance(502, Some(false));
        assert_eq!(step.outcome, Some(DropOutcome::Dispensed(m(2))));
        assert!(ctl.is_idle());
    }

    #[test]
    fn test_pill_still_present_at_finish_is_stuck() {
        let mut ctl = controller();
        ctl.start(m(0), 0).unwrap();
        ctl.advance(250, None);
        ctl.advance(251, Some(true));
        ctl.advance(501, None);
        let step = ctl.advance(502, Some(true));
        assert_eq!(step.outcome, Some(DropOutcome::Stuck(m(0))));
    }

    #[test]
    fn test_vibrate_sequence_timing() {
        let mut ctl = controller();
        ctl.start(m(0), 0).unwrap();
        ctl.advance(250, None);
        assert_eq!(ctl.advance(260, Some(false)).commands.as_slice(), &[VibratorOn]);
        assert_eq!(ctl.phase(), DropPhase::VibrateRetry);

        assert!(ctl.advance(659, None).commands.is_empty());
        assert_eq!(ctl.advance(660, None).commands.as_slice(), &[VibratorOff]);
        assert!(ctl.advance(700, None).commands.is_empty());
        assert_eq!(ctl.advance(760, None).commands.as_slice(), &[SliderClose]);
        assert_eq!(ctl.advance(860, None).commands.as_slice(), &[SliderStop]);
        assert_eq!(ctl.phase(), DropPhase::VibrateRetry);
        ctl.advance(960, None);
        assert_eq!(ctl.phase(), DropPhase::CheckSensor);
        assert_eq!(ctl.session().unwrap().retry_count(), 1);
    }

    #[test]
    fn test_late_poll_catches_up_in_order() {
        let mut ctl = controller();
        ctl.start(m(0), 0).unwrap();
        ctl.advance(250, None);
        ctl.advance(250, Some(false));
        let step = ctl.advance(250 + 2000, None);
        assert_eq!(
            step.commands.as_slice(),
            &[VibratorOff, SliderClose, SliderStop]
        );
        assert_eq!(ctl.phase(), DropPhase::CheckSensor);
    }

    #[test]
    fn test_retries_exhausted_opens_anyway() {
        let mut ctl = controller();
        let mut now = 0;
        ctl.start(m(3), now).unwrap();
        run_until_phase_change(&mut ctl, &mut now, 10, false);

        let mut vibrations = 0;
        while ctl.phase() != DropPhase::OpenSlider {
            let cmds = run_until_phase_change(&mut ctl, &mut now, 10, false);
            vibrations += cmds.iter().filter(|c| **c == VibratorOn).count();
        }
        assert_eq!(vibrations, 5);
        assert_eq!(ctl.session().unwrap().retry_count(), 5);

        run_until_phase_change(&mut ctl, &mut now, 10, false);
        let step = ctl.advance(now + 1, Some(false));
        assert_eq!(step.outcome, Some(DropOutcome::Stuck(m(3))));
    }

    #[test]
    fn test_retry_then_success() {
        let mut ctl = controller();
        ctl.start(m(1), 0).unwrap();
        ctl.advance(250, None);
        ctl.advance(250, Some(false));
        ctl.advance(950, None);
        assert_eq!(ctl.phase(), DropPhase::CheckSensor);
        ctl.advance(951, Some(true));
        assert_eq!(ctl.phase(), DropPhase::OpenSlider);
        ctl.advance(1201, None);
        let step = ctl.advance(1202, Some(false));
        assert_eq!(step.outcome, Some(DropOutcome::Dispensed(m(1))));
    }

    #[test]
    fn test_timestamps_wrap() {
        let mut ctl = controller();
        let start = u32::MAX - 100;
        ctl.start(m(0), start).unwrap();
        ctl.advance(start.wrapping_add(249), None);
        assert_eq!(ctl.phase(), DropPhase::CloseSlider);
        ctl.advance(start.wrapping_add(250), None);
        assert_eq!(ctl.phase(), DropPhase::CheckSensor);
    }

    #[test]
    fn test_idle_advance_is_noop() {
        let mut ctl = controller();
        assert_eq!(ctl.advance(1000, Some(true)), DropStep::default());
        assert!(!ctl.needs_sensor());
    }

    proptest! {
        #[test]
        fn prop_retry_bound_for_any_sensor_sequence(
            readings in proptest::collection::vec(any::<bool>(), 1..64),
            gaps in proptest::collection::vec(1u32..400, 1..64),
        ) {
            let mut ctl = controller();
            let mut now = 0u32;
            let mut vibrations = 0;
            let mut reads = 0usize;
            ctl.start(m(0), now).unwrap();

            for i in 0..10_000usize {
                now += gaps[i % gaps.len()];
                let reading = if ctl.needs_sensor() {
                    reads += 1;
                    Some(readings[reads % readings.len()])
                } else {
                    None
                };
                let step = ctl.advance(now, reading);
                vibrations += step.commands.iter().filter(|c| **c == VibratorOn).count();
                if let Some(session) = ctl.session() {
                    prop_assert!(session.retry_count() <= 5);
                }
                if step.outcome.is_some() {
                    break;
                }
            }
            prop_assert!(ctl.is_idle());
            prop_assert!(vibrations <= 5);
        }
    }
}
