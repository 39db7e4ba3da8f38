//! Timers and tweens keyed by widget and property.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use super::tween::Tween;
use crate::easing::EasingFunction;
use crate::types::ids::{PropertyKey, SessionId, WidgetId};

/// Handle for a pending one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Timer<E> {
    id: TimerId,
    owner: WidgetId,
    deadline: Duration,
    seq: u64,
    payload: E,
}

impl<E> fmt::Debug for Timer<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("deadline", &self.deadline)
            .finish()
    }
}

/// Cooperative timer and tween facility on simulated time.
///
/// * A property has at most one running tween; starting another on the same
///   key replaces it and drops the old completion payload.
/// * Cancelling never rolls a value back: the property keeps whatever was
///   last written.
/// * Payloads that become due in the same [`Scheduler::step_to`] are returned
///   ordered by due time, then by the order they were scheduled.
pub struct Scheduler<E> {
    now: Duration,
    seq: u64,
    timers: Vec<Timer<E>>,
    tweens: Vec<Tween<E>>,
    values: HashMap<PropertyKey, f32>,
    changes: Vec<(PropertyKey, f32)>,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Scheduler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("timer_count", &self.timers.len())
            .field("tween_count", &self.tweens.len())
            .field("property_count", &self.values.len())
            .finish()
    }
}

impl<E> Scheduler<E> {
    /// Empty scheduler at time zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            seq: 0,
            timers: Vec::new(),
            tweens: Vec::new(),
            values: HashMap::new(),
            changes: Vec::new(),
        }
    }

    /// Current simulated time.
    pub fn now(&self) -> Duration {
        self.now
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Last written value of a property.
    pub fn value(&self, key: PropertyKey) -> Option<f32> {
        self.values.get(&key).copied()
    }

    /// Write a property immediately, stopping any tween on it.
    pub fn set_value(&mut self, key: PropertyKey, value: f32) {
        self.tweens.retain(|tween| tween.key != key);
        self.write(key, value);
    }

    fn write(&mut self, key: PropertyKey, value: f32) {
        self.values.insert(key, value);
        self.changes.push((key, value));
    }

    /// Property writes since the last drain, in write order.
    pub fn drain_changes(&mut self) -> Vec<(PropertyKey, f32)> {
        std::mem::take(&mut self.changes)
    }

    /// Run `payload` once, `delay` from now.
    pub fn schedule_once(
        &mut self,
        owner: WidgetId,
        delay: Duration,
        payload: E,
    ) -> TimerId {
        let seq = self.next_seq();
        let id = TimerId(seq);
        self.timers.push(Timer {
            id,
            owner,
            deadline: self.now + delay,
            seq,
            payload,
        });
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        before != self.timers.len()
    }

    /// Tween `key` from its current value to `to`.
    ///
    /// `on_complete` is returned from the step in which the tween reaches
    /// its end.
    pub fn animate(
        &mut self,
        key: PropertyKey,
        to: f32,
        duration: Duration,
        easing: EasingFunction,
        on_complete: Option<E>,
    ) {
        let from = self.value(key).unwrap_or(0.0);
        self.tweens.retain(|tween| tween.key != key);
        let seq = self.next_seq();
        self.tweens.push(Tween {
            key,
            from,
            to,
            started_at: self.now,
            duration,
            easing,
            on_complete,
            seq,
        });
    }

    /// Whether a tween is running on `key`.
    pub fn is_animating(&self, key: PropertyKey) -> bool {
        self.tweens.iter().any(|tween| tween.key == key)
    }

    /// The running tween on `key`, if any.
    pub fn tween(&self, key: PropertyKey) -> Option<&Tween<E>> {
        self.tweens.iter().find(|tween| tween.key == key)
    }

    /// Drop every tween and timer owned by `owner`. Idempotent.
    pub fn cancel_owner(&mut self, owner: WidgetId) -> usize {
        let before = self.tweens.len() + self.timers.len();
        self.tweens.retain(|tween| tween.key.widget != owner);
        self.timers.retain(|timer| timer.owner != owner);
        before - (self.tweens.len() + self.timers.len())
    }

    /// Forget everything belonging to a session: tweens, timers, stored
    /// values and unflushed changes.
    pub fn purge_session(&mut self, session: SessionId) -> usize {
        let before = self.tweens.len() + self.timers.len();
        self.tweens.retain(|tween| tween.key.session() != session);
        self.timers.retain(|timer| timer.owner.session != session);
        self.values.retain(|key, _| key.session() != session);
        self.changes.retain(|(key, _)| key.session() != session);
        before - (self.tweens.len() + self.timers.len())
    }

    /// Pending timers plus running tweens owned by `session`.
    pub fn pending_for(&self, session: SessionId) -> usize {
        self.tweens
            .iter()
            .filter(|tween| tween.key.session() == session)
            .count()
            + self
                .timers
                .iter()
                .filter(|timer| timer.owner.session == session)
                .count()
    }

    /// No timers pending and no tweens running.
    pub fn is_idle(&self) -> bool {
        self.timers.is_empty() && self.tweens.is_empty()
    }

    /// Earliest instant at which a timer fires or a tween ends.
    pub fn next_deadline(&self) -> Option<Duration> {
        let timers = self.timers.iter().map(|timer| timer.deadline);
        let tweens = self.tweens.iter().map(Tween::ends_at);
        timers.chain(tweens).min()
    }

    /// Move the clock to `at`, write every tween's value and collect the
    /// payloads that became due. Time never moves backwards.
    pub fn step_to(&mut self, at: Duration) -> Vec<E> {
        let at = at.max(self.now);
        self.now = at;

        let mut due: Vec<(Duration, u64, E)> = Vec::new();

        let tweens = std::mem::take(&mut self.tweens);
        for mut tween in tweens {
            let value = tween.value_at(at);
            self.write(tween.key, value);
            if tween.is_finished_at(at) {
                if let Some(payload) = tween.on_complete.take() {
                    due.push((tween.ends_at(), tween.seq, payload));
                }
            } else {
                self.tweens.push(tween);
            }
        }

        let timers = std::mem::take(&mut self.timers);
        for timer in timers {
            if timer.deadline <= at {
                due.push((timer.deadline, timer.seq, timer.payload));
            } else {
                self.timers.push(timer);
            }
        }

        due.sort_by_key(|(when, seq, _)| (*when, *seq));
        due.into_iter().map(|(_, _, payload)| payload).collect()
    }
}
