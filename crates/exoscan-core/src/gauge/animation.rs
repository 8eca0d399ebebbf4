use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::trace;

use super::{clamp_score, draw_gauge, GaugeFrame, GaugeSurface};

/// Delay between animation frames.
pub const TICK_INTERVAL: Duration = Duration::from_millis(20);
/// Frames per animation, so every run lasts about one second.
pub const ANIMATION_STEPS: u32 = 50;

/// Values drawn while sweeping from 0 up to `target`.
///
/// Each frame adds `target / 50`; the last frame lands exactly on the target.
/// A zero target yields a single frame.
pub fn animation_steps(target: f64) -> Vec<f64> {
    let target = clamp_score(target);
    if target <= 0.0 {
        return vec![0.0];
    }
    let increment = target / f64::from(ANIMATION_STEPS);
    (1..=ANIMATION_STEPS)
        .map(|tick| {
            if tick == ANIMATION_STEPS {
                target
            } else {
                (increment * f64::from(tick)).min(target)
            }
        })
        .collect()
}

struct Slot<S> {
    surface: S,
    generation: u64,
}

/// Owns the gauge surface and at most one running sweep.
///
/// Starting a sweep cancels the previous one. Each sweep carries a generation
/// number that is checked under the surface lock before drawing, so a task that
/// was aborted mid-tick can never paint over its successor.
pub struct GaugeAnimator<S: GaugeSurface + 'static> {
    slot: Arc<Mutex<Slot<S>>>,
    generation: u64,
    tick: Duration,
    task: Option<JoinHandle<()>>,
}

impl<S: GaugeSurface + 'static> GaugeAnimator<S> {
    /// Wrap `surface` and paint the empty meter.
    pub fn new(surface: S) -> Self {
        Self::with_tick(surface, TICK_INTERVAL)
    }

    pub fn with_tick(mut surface: S, tick: Duration) -> Self {
        draw_gauge(&mut surface, 0.0);
        Self {
            slot: Arc::new(Mutex::new(Slot {
                surface,
                generation: 0,
            })),
            generation: 0,
            tick,
            task: None,
        }
    }

    /// Cancel any sweep and paint `value` immediately.
    pub fn draw_now(&mut self, value: f64) -> GaugeFrame {
        self.cancel();
        let mut slot = lock(&self.slot);
        draw_gauge(&mut slot.surface, value)
    }

    /// Sweep from 0 to `target`. Must be called from within a tokio runtime.
    pub fn animate(&mut self, target: f64) {
        self.cancel();
        let steps = animation_steps(target);
        let generation = self.generation;
        let slot = Arc::clone(&self.slot);
        let tick = self.tick;
        trace!(target, generation, frames = steps.len(), "gauge sweep started");
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + tick, tick);
            for value in steps {
                ticker.tick().await;
                let mut guard = lock(&slot);
                if guard.generation != generation {
                    return;
                }
                draw_gauge(&mut guard.surface, value);
            }
        }));
    }

    /// Stop the running sweep, leaving the last painted frame in place.
    pub fn cancel(&mut self) {
        self.generation += 1;
        lock(&self.slot).generation = self.generation;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Wait for the running sweep, if any, to paint its last frame.
    pub async fn finished(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Inspect the surface, e.g. to read back what was drawn.
    pub fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&lock(&self.slot).surface)
    }
}

impl<S: GaugeSurface + 'static> Drop for GaugeAnimator<S> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gauge::testing::RecordingSurface;

    #[test]
    fn sweep_takes_fifty_frames_and_lands_on_target() {
        for target in [0.5, 7.0, 63.0, 100.0] {
            let steps = animation_steps(target);
            assert_eq!(steps.len(), 50, "target {target}");
            assert_eq!(*steps.last().unwrap(), target);
            assert!(steps.windows(2).all(|w| w[0] <= w[1]));
        }
        assert!((animation_steps(50.0)[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_and_out_of_range_targets() {
        assert_eq!(animation_steps(0.0), vec![0.0]);
        assert_eq!(animation_steps(-12.0), vec![0.0]);
        assert_eq!(*animation_steps(250.0).last().unwrap(), 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn animates_to_target() {
        let mut animator = GaugeAnimator::new(RecordingSurface::default());
        animator.animate(73.0);
        assert!(animator.is_running());
        animator.finished().await;
        assert!(!animator.is_running());

        let readouts = animator.with_surface(|s| s.readouts());
        // initial empty meter plus the sweep
        assert_eq!(readouts.len(), 51);
        assert_eq!(readouts[0], 0);
        assert_eq!(*readouts.last().unwrap(), 73);
    }

    #[tokio::test(start_paused = true)]
    async fn new_sweep_cancels_the_previous_one() {
        let mut animator = GaugeAnimator::new(RecordingSurface::default());
        animator.animate(100.0);
        tokio::time::sleep(TICK_INTERVAL * 5 + Duration::from_millis(1)).await;
        animator.animate(40.0);
        animator.finished().await;
        tokio::time::sleep(TICK_INTERVAL * 60).await;

        let readouts = animator.with_surface(|s| s.readouts());
        let first_sweep = readouts.len() - 1 - 50;
        assert!((1..50).contains(&first_sweep), "first sweep drew {first_sweep} frames");
        assert!(readouts[readouts.len() - 50..].iter().all(|v| *v <= 40));
        assert_eq!(*readouts.last().unwrap(), 40);
    }

    #[tokio::test(start_paused = true)]
    async fn draw_now_stops_running_sweep() {
        let mut animator = GaugeAnimator::new(RecordingSurface::default());
        animator.animate(90.0);
        let frame = animator.draw_now(12.0);
        assert_eq!(frame.readout, 12);
        tokio::time::sleep(TICK_INTERVAL * 60).await;
        let readouts = animator.with_surface(|s| s.readouts());
        assert_eq!(readouts, vec![0, 12]);
    }
}
