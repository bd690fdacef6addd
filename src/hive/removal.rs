//! Per-member exit animations.
//!
//! Each removal is its own task: it waits out an optional delay, then moves the
//! member toward an outward offset while fading and shrinking it. Tasks never touch
//! the simulation directly; the owning container polls [`RemovalAnimator::tick`] for
//! finished ids and drops those members.

use bevy::math::Vec2;

use super::MemberId;

/// Presentation state of a member mid-exit. Position is hive-local.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemovalPose {
    pub position: Vec2,
    pub opacity: f32,
    pub scale: f32,
}

impl RemovalPose {
    pub fn at_rest(position: Vec2) -> Self {
        Self {
            position,
            opacity: 1.0,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemovalAnimation {
    member: MemberId,
    start: Vec2,
    end: Vec2,
    delay: f32,
    elapsed: f32,
    duration: f32,
    finished: bool,
}

impl RemovalAnimation {
    pub fn new(member: MemberId, start: Vec2, offset: Vec2, duration: f32) -> Self {
        Self {
            member,
            start,
            end: start + offset,
            delay: 0.0,
            elapsed: 0.0,
            duration: duration.max(0.0),
            finished: false,
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn member(&self) -> MemberId {
        self.member
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances by `dt`; returns true once the animation has reached its end.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.finished {
            return true;
        }
        let mut dt = dt.max(0.0);
        if self.delay > 0.0 {
            let waited = dt.min(self.delay);
            self.delay -= waited;
            dt -= waited;
            if self.delay > 0.0 {
                return false;
            }
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.finished = true;
        }
        self.finished
    }

    /// Jump to the final state (target vanished, or hive retiring).
    pub fn finish_now(&mut self) {
        self.delay = 0.0;
        self.elapsed = self.duration;
        self.finished = true;
    }

    fn progress(&self) -> f32 {
        if self.finished {
            1.0
        } else if self.duration <= f32::EPSILON {
            if self.delay > 0.0 { 0.0 } else { 1.0 }
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn pose(&self) -> RemovalPose {
        let t = self.progress();
        RemovalPose {
            position: self.start.lerp(self.end, t),
            opacity: 1.0 - t,
            scale: 1.0 - t,
        }
    }
}

/// Animation list owned by a container.
#[derive(Debug, Default, Clone)]
pub struct RemovalAnimator {
    tasks: Vec<RemovalAnimation>,
}

impl RemovalAnimator {
    pub fn animate(&mut self, animation: RemovalAnimation) {
        // A member is only ever latched into Removing once, so duplicates mean a bug upstream.
        debug_assert!(self.tasks.iter().all(|t| t.member != animation.member));
        self.tasks.push(animation);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pose(&self, member: MemberId) -> Option<RemovalPose> {
        self.tasks.iter().find(|t| t.member == member).map(|t| t.pose())
    }

    /// Advances every task; returns and forgets those that finished this tick.
    pub fn tick(&mut self, dt: f32) -> Vec<MemberId> {
        let mut done = Vec::new();
        for task in self.tasks.iter_mut() {
            if task.tick(dt) {
                done.push(task.member);
            }
        }
        self.tasks.retain(|t| !t.is_finished());
        done
    }

    /// Removes a single task as completed. Returns false if none was running.
    pub fn abort(&mut self, member: MemberId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.member != member);
        before != self.tasks.len()
    }

    /// Completes everything at once and returns the affected members.
    pub fn finish_all(&mut self) -> Vec<MemberId> {
        self.tasks.iter_mut().for_each(RemovalAnimation::finish_now);
        self.tasks.drain(..).map(|t| t.member).collect()
    }

    /// Drops all tasks without reporting completion.
    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_interpolates_move_fade_scale() {
        let mut a = RemovalAnimation::new(MemberId(1), Vec2::ZERO, Vec2::new(10.0, 0.0), 0.5);
        assert!(!a.tick(0.25));
        let pose = a.pose();
        assert!((pose.position.x - 5.0).abs() < 1e-4);
        assert!((pose.opacity - 0.5).abs() < 1e-4);
        assert!((pose.scale - 0.5).abs() < 1e-4);
        assert!(a.tick(0.3));
        assert_eq!(a.pose().opacity, 0.0);
        assert_eq!(a.pose().position, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn delay_holds_the_start_pose() {
        let mut a = RemovalAnimation::new(MemberId(1), Vec2::ONE, Vec2::X, 0.5).with_delay(0.2);
        assert!(!a.tick(0.15));
        assert_eq!(a.pose(), RemovalPose::at_rest(Vec2::ONE));
        // Leftover time past the delay feeds the animation.
        assert!(!a.tick(0.15));
        assert!(a.pose().opacity < 1.0);
    }

    #[test]
    fn zero_duration_finishes_on_first_tick() {
        let mut a = RemovalAnimation::new(MemberId(2), Vec2::ZERO, Vec2::Y, 0.0);
        assert!(a.tick(0.0));
    }

    #[test]
    fn animator_reports_each_member_once() {
        let mut anim = RemovalAnimator::default();
        anim.animate(RemovalAnimation::new(MemberId(1), Vec2::ZERO, Vec2::X, 0.1));
        anim.animate(RemovalAnimation::new(MemberId(2), Vec2::ZERO, Vec2::X, 0.3));
        assert_eq!(anim.tick(0.2), vec![MemberId(1)]);
        assert_eq!(anim.tick(0.2), vec![MemberId(2)]);
        assert!(anim.tick(0.2).is_empty());
        assert!(anim.is_empty());
    }

    #[test]
    fn cancel_and_abort() {
        let mut anim = RemovalAnimator::default();
        anim.animate(RemovalAnimation::new(MemberId(1), Vec2::ZERO, Vec2::X, 1.0));
        anim.animate(RemovalAnimation::new(MemberId(2), Vec2::ZERO, Vec2::X, 1.0));
        assert!(anim.abort(MemberId(1)));
        assert!(!anim.abort(MemberId(1)));
        anim.cancel_all();
        assert!(anim.tick(5.0).is_empty());
    }
}
