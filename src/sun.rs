//! Time-of-day cycle driving the sun light.
//!
//! The sun sits in one of four phases. Within a phase its colour and
//! direction animate from the phase's initial values towards its
//! destination values over a fixed dwell window; once the window has
//! elapsed the last values are held until the phase is advanced.

use crate::three_d::mix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SunPhase {
    Morning,
    Midday,
    Evening,
    Night,
}

impl SunPhase {
    pub fn next(self) -> Self {
        match self {
            SunPhase::Morning => SunPhase::Midday,
            SunPhase::Midday => SunPhase::Evening,
            SunPhase::Evening => SunPhase::Night,
            SunPhase::Night => SunPhase::Morning,
        }
    }

    pub fn keyframe(self) -> PhaseKeyframe {
        match self {
            SunPhase::Morning => PhaseKeyframe {
                initial_color: glm::vec3(0.0, 0.0, 0.0),
                destination_color: glm::vec3(0.98, 0.81, 0.30),
                initial_direction: glm::vec3(0.0, 1.0, 0.0),
                destination_direction: glm::vec3(-1.0, 0.0, 0.0),
                easing: Easing::SunriseSnap,
            },
            SunPhase::Midday => PhaseKeyframe {
                initial_color: glm::vec3(0.98, 0.81, 0.30),
                destination_color: glm::vec3(0.98, 0.831, 0.25),
                initial_direction: glm::vec3(-1.0, 0.0, 0.0),
                destination_direction: glm::vec3(0.0, -1.0, 0.0),
                easing: Easing::Linear,
            },
            SunPhase::Evening => PhaseKeyframe {
                initial_color: glm::vec3(0.98, 0.81, 0.30),
                destination_color: glm::vec3(0.96, 0.27, 0.27),
                initial_direction: glm::vec3(0.0, -1.0, 0.0),
                destination_direction: glm::vec3(1.0, 0.0, 0.0),
                easing: Easing::QuadraticOut,
            },
            SunPhase::Night => PhaseKeyframe {
                initial_color: glm::vec3(0.96, 0.27, 0.27),
                destination_color: glm::vec3(0.0, 0.0, 0.0),
                initial_direction: glm::vec3(1.0, 0.0, 0.0),
                destination_direction: glm::vec3(0.0, 1.0, 0.0),
                easing: Easing::NightfallSnap,
            },
        }
    }
}

/// Colour curve owned by a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Holds the initial colour almost to the end of the window, then snaps.
    SunriseSnap,
    /// Decelerating quadratic.
    QuadraticOut,
    /// Reaches the destination within the first tenth of the window.
    NightfallSnap,
}

impl Easing {
    /// Weight of the destination value for a normalized time `alpha` in [0, 1].
    pub fn weight(self, alpha: f32) -> f32 {
        match self {
            Easing::Linear => alpha,
            Easing::SunriseSnap => (100.0 * alpha * alpha - 99.0).clamp(0.0, 1.0),
            Easing::QuadraticOut => 1.0 - (1.0 - alpha) * (1.0 - alpha),
            Easing::NightfallSnap => (100.0 * alpha * alpha).clamp(0.0, 1.0),
        }
    }

    pub fn blend(self, initial: glm::Vec3, destination: glm::Vec3, alpha: f32) -> glm::Vec3 {
        mix(initial, destination, self.weight(alpha))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PhaseKeyframe {
    pub initial_color: glm::Vec3,
    pub destination_color: glm::Vec3,
    pub initial_direction: glm::Vec3,
    pub destination_direction: glm::Vec3,
    pub easing: Easing,
}

impl PhaseKeyframe {
    pub fn color_at(&self, alpha: f32) -> glm::Vec3 {
        self.easing.blend(self.initial_color, self.destination_color, alpha)
    }

    pub fn direction_at(&self, alpha: f32) -> glm::Vec3 {
        mix(self.initial_direction, self.destination_direction, alpha)
    }
}

#[derive(Debug, Clone)]
pub struct SunCycle {
    phase: SunPhase,
    elapsed: f32,
    dwell: f32,
    color: glm::Vec3,
    direction: glm::Vec3,
}

impl SunCycle {
    /// Starts in the morning with the given colour and direction, which stay
    /// in place until the first `update`.
    pub fn new(dwell: f32, color: glm::Vec3, direction: glm::Vec3) -> Self {
        Self {
            phase: SunPhase::Morning,
            elapsed: 0.0,
            dwell,
            color,
            direction,
        }
    }

    pub fn phase(&self) -> SunPhase {
        self.phase
    }

    #[cfg(test)]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn color(&self) -> glm::Vec3 {
        self.color
    }

    pub fn direction(&self) -> glm::Vec3 {
        self.direction
    }

    pub fn can_advance(&self) -> bool {
        self.elapsed >= self.dwell
    }

    /// Moves the dwell timer forward and re-evaluates the phase's curves.
    /// Once the dwell window is over the last values are held.
    pub fn update(&mut self, delta_time: f32) {
        if self.elapsed >= self.dwell {
            return;
        }
        self.elapsed = (self.elapsed + delta_time.max(0.0)).clamp(0.0, self.dwell);

        let alpha = if self.dwell > 0.0 {
            self.elapsed / self.dwell
        } else {
            1.0
        };
        let keyframe = self.phase.keyframe();
        self.color = keyframe.color_at(alpha);
        self.direction = keyframe.direction_at(alpha);
    }

    /// Switches to the next phase if the dwell window is over. Colour and
    /// direction are left as they are; the next `update` picks up the new
    /// phase from the start of its curves.
    pub fn try_advance(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        self.phase = self.phase.next();
        self.elapsed = 0.0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHASES: [SunPhase; 4] = [
        SunPhase::Morning,
        SunPhase::Midday,
        SunPhase::Evening,
        SunPhase::Night,
    ];

    fn close(a: glm::Vec3, b: glm::Vec3) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5 && (a.z - b.z).abs() < 1e-5
    }

    fn settled_cycle() -> SunCycle {
        let mut sun = SunCycle::new(2.0, glm::vec3(1.0, 1.0, 1.0), glm::vec3(0.0, -1.0, 0.0));
        sun.update(2.0);
        sun
    }

    #[test]
    fn every_phase_curve_starts_and_ends_on_its_keyframes() {
        for phase in PHASES {
            let keyframe = phase.keyframe();
            assert_eq!(keyframe.color_at(0.0), keyframe.initial_color, "{phase:?}");
            assert_eq!(keyframe.color_at(1.0), keyframe.destination_color, "{phase:?}");
            assert_eq!(keyframe.direction_at(0.0), keyframe.initial_direction);
            assert_eq!(keyframe.direction_at(1.0), keyframe.destination_direction);
        }
    }

    #[test]
    fn easing_shapes_at_half_time() {
        assert_eq!(Easing::Linear.weight(0.5), 0.5);
        // Accelerating: nothing has happened yet halfway through.
        assert_eq!(Easing::SunriseSnap.weight(0.5), 0.0);
        assert!(Easing::SunriseSnap.weight(0.999) > 0.5);
        // Decelerating: well past the linear midpoint.
        assert!(Easing::QuadraticOut.weight(0.5) > 0.5);
        assert!((Easing::QuadraticOut.weight(0.5) - 0.75).abs() < 1e-6);
        assert_eq!(Easing::NightfallSnap.weight(0.5), 1.0);
    }

    #[test]
    fn easing_weights_never_decrease() {
        for easing in [
            Easing::Linear,
            Easing::SunriseSnap,
            Easing::QuadraticOut,
            Easing::NightfallSnap,
        ] {
            let mut last = 0.0;
            for step in 0..=100 {
                let w = easing.weight(step as f32 / 100.0);
                assert!(w >= last, "{easing:?} dropped at step {step}");
                last = w;
            }
        }
    }

    #[test]
    fn four_advances_close_the_cycle() {
        let mut phase = SunPhase::Morning;
        let mut seen = Vec::new();
        for _ in 0..4 {
            phase = phase.next();
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![
                SunPhase::Midday,
                SunPhase::Evening,
                SunPhase::Night,
                SunPhase::Morning
            ]
        );
    }

    #[test]
    fn advance_is_refused_inside_the_dwell_window() {
        let mut sun = SunCycle::new(2.0, glm::vec3(1.0, 1.0, 1.0), glm::vec3(0.0, -1.0, 0.0));
        sun.update(1.5);
        assert!(!sun.try_advance());
        assert_eq!(sun.phase(), SunPhase::Morning);
        assert_eq!(sun.elapsed(), 1.5);
    }

    #[test]
    fn advance_resets_timer_but_keeps_current_values() {
        let mut sun = settled_cycle();
        let color = sun.color();
        let direction = sun.direction();

        assert!(sun.try_advance());
        assert_eq!(sun.phase(), SunPhase::Midday);
        assert_eq!(sun.elapsed(), 0.0);
        assert_eq!(sun.color(), color);
        assert_eq!(sun.direction(), direction);
    }

    #[test]
    fn many_small_steps_still_unlock_the_advance() {
        let mut sun = SunCycle::new(2.0, glm::vec3(1.0, 1.0, 1.0), glm::vec3(0.0, -1.0, 0.0));
        for _ in 0..121 {
            sun.update(1.0 / 60.0);
        }
        assert!(sun.can_advance());
        assert!(sun.try_advance());
    }

    #[test]
    fn timer_is_clamped_to_the_dwell_duration() {
        let mut sun = SunCycle::new(2.0, glm::vec3(1.0, 1.0, 1.0), glm::vec3(0.0, -1.0, 0.0));
        sun.update(5.0);
        assert_eq!(sun.elapsed(), 2.0);
    }

    #[test]
    fn values_hold_after_the_window_closes() {
        let mut sun = settled_cycle();
        let keyframe = SunPhase::Morning.keyframe();
        assert_eq!(sun.color(), keyframe.destination_color);
        assert_eq!(sun.direction(), keyframe.destination_direction);

        sun.update(0.5);
        sun.update(3.0);
        assert_eq!(sun.color(), keyframe.destination_color);
        assert_eq!(sun.direction(), keyframe.destination_direction);
    }

    #[test]
    fn next_phase_starts_from_its_own_initial_values() {
        let mut sun = settled_cycle();
        assert!(sun.try_advance());
        sun.update(0.0);
        let midday = SunPhase::Midday.keyframe();
        assert!(close(sun.color(), midday.initial_color));
        assert!(close(sun.direction(), midday.initial_direction));

        sun.update(1.0);
        assert!(close(sun.direction(), glm::vec3(-0.5, -0.5, 0.0)));
    }

    #[test]
    fn negative_delta_does_not_rewind() {
        let mut sun = SunCycle::new(2.0, glm::vec3(1.0, 1.0, 1.0), glm::vec3(0.0, -1.0, 0.0));
        sun.update(1.0);
        sun.update(-0.5);
        assert_eq!(sun.elapsed(), 1.0);
    }
}
