//! Physics events (collision start/stop)

use crate::collider::ColliderHandle;
use rapier3d::prelude as rapier;

/// Type of collision event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEventType {
    /// Collision started
    Started,
    /// Collision ended
    Stopped,
}

/// A collision event between two colliders
#[derive(Debug, Clone)]
pub struct CollisionEvent {
    /// First collider
    pub collider1: ColliderHandle,
    /// Second collider
    pub collider2: ColliderHandle,
    /// Event type
    pub event_type: CollisionEventType,
    /// User data from collider 1
    pub user_data1: u128,
    /// User data from collider 2
    pub user_data2: u128,
}

impl CollisionEvent {
    /// Check if this is a start event
    pub fn is_started(&self) -> bool {
        self.event_type == CollisionEventType::Started
    }

    /// Whether the given collider takes part in this event
    pub fn involves(&self, collider: ColliderHandle) -> bool {
        self.collider1 == collider || self.collider2 == collider
    }
}

/// Collects the events of one `PhysicsWorld::step` call
#[derive(Default)]
pub(crate) struct EventCollector {
    pub(crate) collision_events: Vec<CollisionEvent>,
}

impl EventCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.collision_events.clear();
    }

    /// Resolve raw Rapier events against the collider set and store them
    pub(crate) fn drain_from(
        &mut self,
        receiver: &crossbeam_channel::Receiver<rapier::CollisionEvent>,
        colliders: &rapier::ColliderSet,
    ) {
        while let Ok(event) = receiver.try_recv() {
            let (h1, h2, started) = match event {
                rapier::CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                rapier::CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };

            let c1 = colliders.get(h1);
            let c2 = colliders.get(h2);

            self.collision_events.push(CollisionEvent {
                collider1: ColliderHandle(h1),
                collider2: ColliderHandle(h2),
                event_type: if started {
                    CollisionEventType::Started
                } else {
                    CollisionEventType::Stopped
                },
                user_data1: c1.map(|c| c.user_data).unwrap_or(0),
                user_data2: c2.map(|c| c.user_data).unwrap_or(0),
            });
        }
    }
}

/// Channel-based event sink handed to the Rapier pipeline
pub(crate) struct ChannelEventCollector {
    pub(crate) collision_events: crossbeam_channel::Sender<rapier::CollisionEvent>,
}

impl rapier::EventHandler for ChannelEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        event: rapier::CollisionEvent,
        _contact_pair: Option<&rapier::ContactPair>,
    ) {
        let _ = self.collision_events.send(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        _contact_pair: &rapier::ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}
