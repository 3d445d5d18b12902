//! Linear value animation ("tween") scheduler
//!
//! A tween interpolates a small bag of named numeric values over a fixed
//! duration. The scheduler owns every active tween and, once per frame, emits
//! update and completion events for the driver to apply. Completion side
//! effects travel as `TweenFinish` values rather than callbacks, so nothing
//! mutates pools or the scene while the scheduler is iterating.

use crate::scene::NodeId;

pub type Key = &'static str;

/// What an interpolated value bag drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenChannel {
    NodePosition(NodeId),
    NodeRotation(NodeId),
    NodeScale(NodeId),
    CameraPosition,
    CameraRotation,
    CameraFov,
    AmbientIntensity,
}

/// Deferred effect applied by the driver when a tween completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TweenFinish {
    #[default]
    None,
    /// Return the particle owning this node to its pool
    ReleaseParticle(NodeId),
    /// Pin the node's depth axis to exactly zero
    SnapDepth(NodeId),
}

/// Interpolated values for one tween on one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueBag {
    entries: Vec<(Key, f32)>,
}

impl ValueBag {
    pub fn set(&mut self, key: Key, value: f32) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: Key) -> Option<f32> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Key, f32)> + '_ {
        self.entries.iter().copied()
    }
}

/// A scheduled interpolation of named values over `duration_ms`
#[derive(Debug, Clone)]
pub struct Tween {
    channel: TweenChannel,
    keys: Vec<(Key, f32, f32)>,
    duration_ms: f32,
    elapsed_ms: f32,
    finish: TweenFinish,
    done: bool,
}

impl Tween {
    pub fn new(channel: TweenChannel, duration_ms: f32) -> Self {
        Self {
            channel,
            keys: Vec::new(),
            duration_ms,
            elapsed_ms: 0.0,
            finish: TweenFinish::None,
            done: false,
        }
    }

    /// Add one interpolated key, from `start` to `end`
    pub fn key(mut self, key: Key, start: f32, end: f32) -> Self {
        self.keys.push((key, start, end));
        self
    }

    /// Effect to emit when the tween completes
    pub fn finish(mut self, finish: TweenFinish) -> Self {
        self.finish = finish;
        self
    }

    pub fn channel(&self) -> TweenChannel {
        self.channel
    }
}

/// Event emitted by [`TweenScheduler::advance`]
#[derive(Debug, Clone, PartialEq)]
pub enum TweenEvent {
    Update {
        channel: TweenChannel,
        values: ValueBag,
    },
    Complete {
        channel: TweenChannel,
        finish: TweenFinish,
    },
}

/// Owns all active tweens; advanced once per frame with the frame delta
#[derive(Debug, Default)]
pub struct TweenScheduler {
    tweens: Vec<Tween>,
}

impl TweenScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, tween: Tween) {
        self.tweens.push(tween);
    }

    pub fn active(&self) -> usize {
        self.tweens.len()
    }

    /// Advance every tween by `delta_ms`, in insertion order.
    ///
    /// Each active tween emits one `Update` with its interpolated values; a
    /// tween reaching its duration also emits `Complete` exactly once and is
    /// dropped. A zero-duration tween resolves on its first advance.
    pub fn advance(&mut self, delta_ms: f32) -> Vec<TweenEvent> {
        let mut events = Vec::new();
        for tween in &mut self.tweens {
            tween.elapsed_ms += delta_ms;
            let f = if tween.duration_ms <= 0.0 {
                1.0
            } else {
                (tween.elapsed_ms / tween.duration_ms).clamp(0.0, 1.0)
            };

            let mut values = ValueBag::default();
            for (key, start, end) in &tween.keys {
                values.set(key, start + (end - start) * f);
            }
            events.push(TweenEvent::Update {
                channel: tween.channel,
                values,
            });

            if f >= 1.0 {
                tween.done = true;
                events.push(TweenEvent::Complete {
                    channel: tween.channel,
                    finish: tween.finish,
                });
            }
        }
        self.tweens.retain(|t| !t.done);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fov_tween(duration_ms: f32) -> Tween {
        Tween::new(TweenChannel::CameraFov, duration_ms).key("fov", 60.0, 80.0)
    }

    fn completions(events: &[TweenEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, TweenEvent::Complete { .. }))
            .count()
    }

    #[test]
    fn test_linear_interpolation_midpoint() {
        let mut scheduler = TweenScheduler::new();
        scheduler.schedule(fov_tween(100.0));

        let events = scheduler.advance(50.0);
        let TweenEvent::Update { values, .. } = &events[0] else {
            panic!("expected update");
        };
        assert!((values.get("fov").unwrap() - 70.0).abs() < 0.001);
        assert_eq!(completions(&events), 0);
    }

    #[test]
    fn test_completes_exactly_once_and_never_updates_after() {
        let mut scheduler = TweenScheduler::new();
        scheduler.schedule(fov_tween(100.0));

        let events = scheduler.advance(250.0);
        // Final update carries the clamped end value
        let TweenEvent::Update { values, .. } = &events[0] else {
            panic!("expected update");
        };
        assert_eq!(values.get("fov"), Some(80.0));
        assert_eq!(completions(&events), 1);

        // Nothing left afterwards
        assert_eq!(scheduler.active(), 0);
        assert!(scheduler.advance(100.0).is_empty());
    }

    #[test]
    fn test_zero_duration_resolves_on_first_advance() {
        let mut scheduler = TweenScheduler::new();
        scheduler.schedule(fov_tween(0.0));

        let events = scheduler.advance(0.0);
        let TweenEvent::Update { values, .. } = &events[0] else {
            panic!("expected update");
        };
        assert_eq!(values.get("fov"), Some(80.0));
        assert_eq!(completions(&events), 1);
        assert_eq!(scheduler.active(), 0);
    }

    #[test]
    fn test_same_key_race_last_scheduled_wins() {
        // Two tweens driving the same channel and key: events arrive in
        // insertion order, so the later schedule overwrites per frame.
        let mut scheduler = TweenScheduler::new();
        scheduler.schedule(Tween::new(TweenChannel::CameraFov, 100.0).key("fov", 60.0, 40.0));
        scheduler.schedule(Tween::new(TweenChannel::CameraFov, 100.0).key("fov", 60.0, 80.0));

        let events = scheduler.advance(100.0);
        let last_update = events
            .iter()
            .filter_map(|e| match e {
                TweenEvent::Update { values, .. } => values.get("fov"),
                _ => None,
            })
            .last();
        assert_eq!(last_update, Some(80.0));
    }

    #[test]
    fn test_finish_effect_carried_on_complete() {
        let mut scheduler = TweenScheduler::new();
        let node = {
            let mut scene = crate::scene::SceneGraph::new();
            scene.create_node(0)
        };
        scheduler.schedule(
            Tween::new(TweenChannel::NodePosition(node), 50.0)
                .key("x", 0.0, 10.0)
                .finish(TweenFinish::ReleaseParticle(node)),
        );

        let events = scheduler.advance(50.0);
        assert!(events.iter().any(|e| matches!(
            e,
            TweenEvent::Complete {
                finish: TweenFinish::ReleaseParticle(n),
                ..
            } if *n == node
        )));
    }
}
