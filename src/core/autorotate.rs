//! Autorotation driver
//!
//! Advances the rotation longitude by a fixed step on every animation frame
//! while running. Any interaction stops it; it only comes back through
//! `resume()` or, when configured, after an idle period.

use serde::Deserialize;
use tracing::debug;

use super::projection::Rotation;

/// What happens after an interaction stopped the rotation
#[derive(Clone, Copy, Debug, PartialEq, Default, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ResumePolicy {
    /// Stay manually controlled until `resume()` is called
    #[default]
    Never,
    /// Resume once the pointer has been idle for `seconds`
    AfterIdle { seconds: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum DriverState {
    Running,
    Stopped,
}

#[derive(Clone, Debug)]
pub struct AutorotationDriver {
    state: DriverState,
    step_degrees: f64,
    policy: ResumePolicy,
    /// Time of the last interaction, for `ResumePolicy::AfterIdle`
    last_interaction: Option<f64>,
    ticks: u64,
}

impl AutorotationDriver {
    pub fn new(enabled: bool, step_degrees: f64, policy: ResumePolicy) -> Self {
        Self {
            state: if enabled { DriverState::Running } else { DriverState::Stopped },
            step_degrees,
            policy,
            last_interaction: None,
            ticks: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    /// Number of frames that advanced the rotation since creation
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn step_degrees(&self) -> f64 {
        self.step_degrees
    }

    /// Stop rotating. Calling it again is a no-op.
    pub fn stop(&mut self) {
        if self.state == DriverState::Running {
            debug!(ticks = self.ticks, "Autorotation stopped");
            self.state = DriverState::Stopped;
        }
    }

    /// Explicit re-enable
    pub fn resume(&mut self) {
        if self.state == DriverState::Stopped {
            debug!("Autorotation resumed");
            self.state = DriverState::Running;
        }
        self.last_interaction = None;
    }

    /// Record user interaction at `now` (seconds). Stops the rotation.
    pub fn interrupt(&mut self, now: f64) {
        self.stop();
        self.last_interaction = Some(now);
    }

    /// Whether the shell must keep scheduling frames
    pub fn wants_frame(&self) -> bool {
        match (self.state, self.policy) {
            (DriverState::Running, _) => true,
            (DriverState::Stopped, ResumePolicy::AfterIdle { .. }) => self.last_interaction.is_some(),
            (DriverState::Stopped, ResumePolicy::Never) => false,
        }
    }

    /// Advance one animation frame.
    ///
    /// Returns the new rotation, or `None` when stopped or while dragging.
    pub fn tick(&mut self, rotation: Rotation, dragging: bool, now: f64) -> Option<Rotation> {
        if dragging {
            if self.last_interaction.is_some() {
                self.last_interaction = Some(now);
            }
            return None;
        }

        if self.state == DriverState::Stopped {
            match (self.policy, self.last_interaction) {
                (ResumePolicy::AfterIdle { seconds }, Some(since)) if now - since >= seconds => {
                    debug!(idle = now - since, "Autorotation resumed after idle");
                    self.state = DriverState::Running;
                    self.last_interaction = None;
                }
                _ => return None,
            }
        }

        self.ticks += 1;
        let lambda = (rotation.lambda + self.step_degrees).rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        let lambda = if lambda >= 360.0 { 0.0 } else { lambda };
        Some(Rotation { lambda, ..rotation })
    }
}
