// view.rs — 预设视角，以及视角之间带缓动的相机过渡

use crate::frame::{FrameScheduler, TickToken};
use crate::rig::CameraRig;
use std::f32::consts::{FRAC_PI_2, PI};
use std::time::{Duration, Instant};

pub const TRANSITION_DURATION: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Viewpoint {
    Front,
    Top,
    Bottom,
    Left,
    Right,
}

/// Camera orientation and distance a viewpoint snaps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPreset {
    pub azimuth: f32,
    pub polar: f32,
    pub distance: f32,
}

impl Viewpoint {
    pub const ALL: [Viewpoint; 5] = [
        Viewpoint::Front,
        Viewpoint::Top,
        Viewpoint::Bottom,
        Viewpoint::Left,
        Viewpoint::Right,
    ];

    pub const fn preset(self) -> ViewPreset {
        match self {
            Viewpoint::Front => ViewPreset { azimuth: 0.0, polar: FRAC_PI_2, distance: 5.0 },
            Viewpoint::Top => ViewPreset { azimuth: 0.0, polar: 0.0, distance: 6.0 },
            Viewpoint::Bottom => ViewPreset { azimuth: 0.0, polar: PI, distance: 3.5 },
            Viewpoint::Left => ViewPreset { azimuth: -FRAC_PI_2, polar: FRAC_PI_2, distance: 2.8 },
            Viewpoint::Right => ViewPreset { azimuth: FRAC_PI_2, polar: FRAC_PI_2, distance: 2.8 },
        }
    }

    /// i18n key of the button label.
    pub fn label_key(self) -> &'static str {
        match self {
            Viewpoint::Front => "view.front",
            Viewpoint::Top => "view.top",
            Viewpoint::Bottom => "view.bottom",
            Viewpoint::Left => "view.left",
            Viewpoint::Right => "view.right",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Viewpoint::Front => "👁",
            Viewpoint::Top => "⬆",
            Viewpoint::Bottom => "⬇",
            Viewpoint::Left => "⬅",
            Viewpoint::Right => "➡",
        }
    }
}

/// Cubic ease-out: fast start, gentle settle.
pub fn ease_out_cubic(progress: f32) -> f32 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Running,
    Completed,
    Superseded,
}

/// One eased distance animation. Orientation is not part of it.
#[derive(Debug, Clone)]
pub struct Transition {
    pub generation: u64,
    pub start_distance: f32,
    pub target_distance: f32,
    pub started_at: Instant,
    pub duration: Duration,
    state: TransitionState,
}

impl Transition {
    pub fn new(generation: u64, start_distance: f32, target_distance: f32, started_at: Instant) -> Self {
        Self {
            generation,
            start_distance,
            target_distance,
            started_at,
            duration: TRANSITION_DURATION,
            state: TransitionState::Running,
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// Linear progress in [0, 1]. A `now` earlier than the start counts as 0.
    pub fn progress(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.started_at);
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn distance_at(&self, now: Instant) -> f32 {
        let eased = ease_out_cubic(self.progress(now));
        self.start_distance + (self.target_distance - self.start_distance) * eased
    }

    fn supersede(&mut self) {
        if self.state == TransitionState::Running {
            self.state = TransitionState::Superseded;
        }
    }
}

/// Attached/detached state of the camera rig.
#[derive(Debug)]
pub enum RigSlot<R> {
    Detached,
    Attached(R),
}

impl<R> RigSlot<R> {
    pub fn get(&self) -> Option<&R> {
        match self {
            RigSlot::Attached(r) => Some(r),
            RigSlot::Detached => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut R> {
        match self {
            RigSlot::Attached(r) => Some(r),
            RigSlot::Detached => None,
        }
    }
}

/// Snaps the camera to a viewpoint and eases its distance there.
///
/// Every request bumps a generation counter. Ticks are scheduled with the
/// generation they belong to, so a tick left over from an older request
/// finds a mismatch and does nothing.
#[derive(Debug)]
pub struct ViewController<R> {
    rig: RigSlot<R>,
    active: Viewpoint,
    generation: u64,
    transition: Option<Transition>,
    previous: Option<Transition>,
}

impl<R: CameraRig> ViewController<R> {
    pub fn new() -> Self {
        Self {
            rig: RigSlot::Detached,
            active: Viewpoint::Front,
            generation: 0,
            transition: None,
            previous: None,
        }
    }

    pub fn attach(&mut self, rig: R) {
        self.rig = RigSlot::Attached(rig);
    }

    pub fn detach(&mut self) -> Option<R> {
        match std::mem::replace(&mut self.rig, RigSlot::Detached) {
            RigSlot::Attached(r) => Some(r),
            RigSlot::Detached => None,
        }
    }

    pub fn rig(&self) -> Option<&R> {
        self.rig.get()
    }

    pub fn rig_mut(&mut self) -> Option<&mut R> {
        self.rig.get_mut()
    }

    pub fn active_viewpoint(&self) -> Viewpoint {
        self.active
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// The transition the current one replaced, if any.
    pub fn previous_transition(&self) -> Option<&Transition> {
        self.previous.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.transition
            .as_ref()
            .is_some_and(|t| t.state() == TransitionState::Running)
    }

    pub fn request_view(&mut self, viewpoint: Viewpoint, now: Instant, scheduler: &mut impl FrameScheduler) {
        let Some(rig) = self.rig.get_mut() else {
            return;
        };

        self.active = viewpoint;
        let preset = viewpoint.preset();
        rig.set_azimuthal_angle(preset.azimuth);
        rig.set_polar_angle(preset.polar);

        // 从当前相机取起点距离，被打断的过渡不会跳变
        let start = rig.current_distance();

        if let Some(mut old) = self.transition.take() {
            old.supersede();
            self.previous = Some(old);
        }
        self.generation += 1;
        self.transition = Some(Transition::new(self.generation, start, preset.distance, now));

        log::debug!(
            "view {:?}: distance {:.3} -> {:.3} (gen {})",
            viewpoint,
            start,
            preset.distance,
            self.generation
        );

        let token = TickToken { generation: self.generation };
        self.tick(token, now, scheduler);

        if let Some(rig) = self.rig.get_mut() {
            rig.update();
        }
    }

    /// Advances the transition `token` belongs to.
    ///
    /// A token from an older request gets `Superseded` back and touches
    /// nothing. `None` means there is nothing to advance: unknown token,
    /// finished transition, or no rig.
    pub fn tick(
        &mut self,
        token: TickToken,
        now: Instant,
        scheduler: &mut impl FrameScheduler,
    ) -> Option<TransitionState> {
        if token.generation < self.generation {
            return Some(TransitionState::Superseded);
        }
        if token.generation != self.generation {
            return None;
        }
        let transition = self.transition.as_mut()?;
        if transition.state != TransitionState::Running {
            return None;
        }
        let rig = self.rig.get_mut()?;

        let progress = transition.progress(now);
        let distance = transition.distance_at(now);
        rig.set_min_distance(distance);
        rig.set_max_distance(distance);
        rig.update();

        if progress < 1.0 {
            scheduler.request_tick(token);
        } else {
            transition.state = TransitionState::Completed;
        }
        Some(transition.state)
    }
}

impl<R: CameraRig> Default for ViewController<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameQueue;

    #[derive(Debug, Default)]
    struct MockRig {
        distance: f32,
        azimuth: f32,
        polar: f32,
        min: f32,
        max: f32,
        commits: usize,
    }

    impl MockRig {
        fn at(distance: f32) -> Self {
            Self { distance, min: 0.0, max: f32::INFINITY, ..Default::default() }
        }
    }

    impl CameraRig for MockRig {
        fn current_distance(&self) -> f32 {
            self.distance
        }
        fn set_azimuthal_angle(&mut self, radians: f32) {
            self.azimuth = radians;
        }
        fn set_polar_angle(&mut self, radians: f32) {
            self.polar = radians;
        }
        fn set_min_distance(&mut self, distance: f32) {
            self.min = distance;
        }
        fn set_max_distance(&mut self, distance: f32) {
            self.max = distance;
        }
        fn update(&mut self) -> bool {
            self.commits += 1;
            let before = self.distance;
            self.distance = self.min.max(self.max.min(self.distance));
            before != self.distance
        }
    }

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    fn controller_at(distance: f32) -> ViewController<MockRig> {
        let mut c = ViewController::new();
        c.attach(MockRig::at(distance));
        c
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn ease_endpoints_and_monotonic() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = ease_out_cubic(i as f32 / 100.0);
            assert!(v >= prev, "ease dipped at step {i}");
            prev = v;
        }
        assert!(approx(ease_out_cubic(0.5), 0.875));
    }

    #[test]
    fn preset_distances() {
        assert_eq!(Viewpoint::Front.preset().distance, 5.0);
        assert_eq!(Viewpoint::Top.preset().distance, 6.0);
        assert_eq!(Viewpoint::Bottom.preset().distance, 3.5);
        assert_eq!(Viewpoint::Left.preset().distance, 2.8);
        assert_eq!(Viewpoint::Right.preset().distance, 2.8);
    }

    #[test]
    fn request_sets_active_view_synchronously() {
        let t0 = Instant::now();
        let mut q = FrameQueue::new();
        let mut c = controller_at(2.5);
        for v in Viewpoint::ALL {
            c.request_view(v, t0, &mut q);
            assert_eq!(c.active_viewpoint(), v);
            assert!(c.is_animating());
        }
    }

    #[test]
    fn orientation_snaps_immediately() {
        let t0 = Instant::now();
        let mut q = FrameQueue::new();
        let mut c = controller_at(2.5);
        c.request_view(Viewpoint::Left, t0, &mut q);
        let rig = c.rig().unwrap();
        assert_eq!(rig.azimuth, -FRAC_PI_2);
        assert_eq!(rig.polar, FRAC_PI_2);
        // distance has not moved yet: first tick runs at elapsed 0
        assert_eq!(rig.distance, 2.5);
    }

    #[test]
    fn top_view_interpolation_points() {
        let t0 = Instant::now();
        let mut q = FrameQueue::new();
        let mut c = controller_at(5.0);

        c.request_view(Viewpoint::Top, t0, &mut q);
        assert!(approx(c.rig().unwrap().distance, 5.0));

        let token = q.take_due()[0];
        assert_eq!(c.tick(token, ms(t0, 500), &mut q), Some(TransitionState::Running));
        assert!(approx(c.rig().unwrap().distance, 5.875));

        let token = q.take_due()[0];
        assert_eq!(c.tick(token, ms(t0, 1000), &mut q), Some(TransitionState::Completed));
        assert!(approx(c.rig().unwrap().distance, 6.0));
        assert!(q.is_empty(), "finished transition must not reschedule");
        assert!(!c.is_animating());
    }

    #[test]
    fn late_tick_lands_exactly_on_target() {
        let t0 = Instant::now();
        let mut q = FrameQueue::new();
        let mut c = controller_at(1.0);
        c.request_view(Viewpoint::Bottom, t0, &mut q);
        let token = q.take_due()[0];
        assert_eq!(c.tick(token, ms(t0, 4000), &mut q), Some(TransitionState::Completed));
        assert_eq!(c.rig().unwrap().distance, 3.5);
    }

    #[test]
    fn tick_chain_terminates() {
        let t0 = Instant::now();
        let mut q = FrameQueue::new();
        let mut c = controller_at(9.0);
        c.request_view(Viewpoint::Front, t0, &mut q);

        let mut frame = 0u64;
        while !q.is_empty() {
            frame += 1;
            assert!(frame < 1000, "tick chain never ended");
            for token in q.take_due() {
                c.tick(token, ms(t0, frame * 16), &mut q);
            }
        }
        assert_eq!(c.transition().unwrap().state(), TransitionState::Completed);
        assert!(approx(c.rig().unwrap().distance, 5.0));
    }

    #[test]
    fn stale_ticks_are_inert() {
        let t0 = Instant::now();
        let mut q = FrameQueue::new();
        let mut c = controller_at(2.5);

        c.request_view(Viewpoint::Top, t0, &mut q);
        let stale = q.take_due()[0];
        c.tick(stale, ms(t0, 300), &mut q);
        let stale = q.take_due()[0];

        c.request_view(Viewpoint::Left, ms(t0, 400), &mut q);
        let before = c.rig().unwrap().distance;
        let commits = c.rig().unwrap().commits;

        assert_eq!(c.tick(stale, ms(t0, 450), &mut q), Some(TransitionState::Superseded));
        let rig = c.rig().unwrap();
        assert_eq!(rig.distance, before);
        assert_eq!(rig.commits, commits);

        // only the new transition's tick is queued
        let due = q.take_due();
        assert_eq!(due.len(), 1);
        assert_ne!(due[0], stale);
    }

    #[test]
    fn replaced_transition_reports_superseded() {
        let t0 = Instant::now();
        let mut q = FrameQueue::new();
        let mut c = controller_at(2.5);

        c.request_view(Viewpoint::Top, t0, &mut q);
        let first = q.take_due()[0];
        assert!(c.previous_transition().is_none());

        c.request_view(Viewpoint::Right, ms(t0, 100), &mut q);
        let old = c.previous_transition().unwrap();
        assert_eq!(old.generation, first.generation);
        assert_eq!(old.state(), TransitionState::Superseded);
        assert_eq!(old.target_distance, 6.0);

        let current = c.transition().unwrap();
        assert_eq!(current.generation, first.generation + 1);
        assert_eq!(current.state(), TransitionState::Running);

        // the old chain stops here: superseded, nothing rescheduled for it
        let second = q.take_due()[0];
        assert_eq!(c.tick(first, ms(t0, 150), &mut q), Some(TransitionState::Superseded));
        assert!(q.is_empty());
        assert_eq!(c.tick(second, ms(t0, 150), &mut q), Some(TransitionState::Running));
        assert_eq!(q.take_due(), vec![second]);
    }

    #[test]
    fn completed_transition_stays_completed_when_replaced() {
        let t0 = Instant::now();
        let mut q = FrameQueue::new();
        let mut c = controller_at(2.5);

        c.request_view(Viewpoint::Left, t0, &mut q);
        let token = q.take_due()[0];
        c.tick(token, ms(t0, 1000), &mut q);

        c.request_view(Viewpoint::Front, ms(t0, 2000), &mut q);
        assert_eq!(c.previous_transition().unwrap().state(), TransitionState::Completed);
    }

    #[test]
    fn unknown_future_token_is_ignored() {
        let t0 = Instant::now();
        let mut q = FrameQueue::new();
        let mut c = controller_at(2.5);
        c.request_view(Viewpoint::Front, t0, &mut q);
        q.take_due();
        assert_eq!(c.tick(TickToken { generation: 99 }, ms(t0, 10), &mut q), None);
        assert!(q.is_empty());
    }

    #[test]
    fn repeat_request_restarts_from_live_distance() {
        let t0 = Instant::now();
        let mut q = FrameQueue::new();
        let mut c = controller_at(5.0);

        c.request_view(Viewpoint::Top, t0, &mut q);
        let token = q.take_due()[0];
        c.tick(token, ms(t0, 500), &mut q);
        let mid = c.rig().unwrap().distance;
        assert!(approx(mid, 5.875));

        c.request_view(Viewpoint::Top, ms(t0, 500), &mut q);
        assert_eq!(c.active_viewpoint(), Viewpoint::Top);
        let t = c.transition().unwrap();
        assert!(approx(t.start_distance, mid));
        assert_eq!(t.target_distance, 6.0);
        // no jump on restart
        assert!(approx(c.rig().unwrap().distance, mid));
    }

    #[test]
    fn detached_rig_is_a_no_op() {
        let t0 = Instant::now();
        let mut q = FrameQueue::new();
        let mut c: ViewController<MockRig> = ViewController::new();

        c.request_view(Viewpoint::Bottom, t0, &mut q);
        assert_eq!(c.active_viewpoint(), Viewpoint::Front);
        assert!(c.transition().is_none());
        assert!(q.is_empty());
        assert!(!c.is_animating());
    }

    #[test]
    fn detaching_mid_flight_stops_ticks() {
        let t0 = Instant::now();
        let mut q = FrameQueue::new();
        let mut c = controller_at(2.5);
        c.request_view(Viewpoint::Front, t0, &mut q);
        let token = q.take_due()[0];

        let rig = c.detach().unwrap();
        assert_eq!(c.tick(token, ms(t0, 200), &mut q), None);
        assert!(q.is_empty());
        assert_eq!(rig.distance, 2.5);
    }

    #[test]
    fn progress_ignores_clock_before_start() {
        let t0 = Instant::now();
        let t = Transition::new(1, 2.0, 4.0, ms(t0, 100));
        assert_eq!(t.progress(t0), 0.0);
        assert_eq!(t.distance_at(t0), 2.0);
    }
}
