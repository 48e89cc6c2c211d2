use bevy_ecs::prelude::Entity;

/// A single successful vehicle-trip pairing produced by a dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub trip: Entity,
    pub vehicle: Entity,
    /// True when the chosen vehicle was already moving toward the trip's
    /// origin and would have reached it along its current path (the
    /// "forward dispatch" counter in the history schema).
    pub forward_dispatch: bool,
}
