//! Pure decay step for temporary effect instances.
//!
//! The core holds no timers. The shell runs a one-second repeating tick
//! and feeds the instance list through [`advance`]; instances that cross
//! zero this step come back in `expired` exactly once, so the shell can
//! fire its one-shot wear-off cue before they disappear.

use crate::effects::TemporaryEffect;

/// Outcome of one decay step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecayStep {
    /// Instances still running after the step.
    pub active: Vec<TemporaryEffect>,
    /// Instances whose remaining time reached zero during this step.
    pub expired: Vec<TemporaryEffect>,
}

impl DecayStep {
    pub fn any_expired(&self) -> bool {
        !self.expired.is_empty()
    }
}

/// Advance every instance by `delta_secs`, splitting survivors from
/// newly-expired instances.
///
/// Remaining time saturates at zero, so feeding an already-expired
/// instance through again neither underflows nor re-reports it — repeated
/// ticks are idempotent once an instance has hit zero.
pub fn advance(instances: Vec<TemporaryEffect>, delta_secs: u32) -> DecayStep {
    let mut step = DecayStep::default();

    for mut instance in instances {
        let was_running = instance.remaining_secs > 0;
        instance.remaining_secs = instance.remaining_secs.saturating_sub(delta_secs);

        if instance.remaining_secs > 0 {
            step.active.push(instance);
        } else if was_running {
            step.expired.push(instance);
        }
        // Already-zero instances are dropped silently; they were reported
        // on the step that expired them.
    }

    step
}
