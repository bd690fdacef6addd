//! Per-frame ordering of the hive simulation.
//! 1. Input    (pointer sampling, blocked flag sync)
//! 2. Contacts (brush hits against the active hive)
//! 3. Step     (HiveSession::tick: gestures, depletion, animations, conveyor)
//! 4. Publish  (progress snapshot, HiveEvent forwarding)
//! Rendering reads the session after Publish.
use bevy::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum HiveSimSet {
    Input,
    Contacts,
    Step,
    Publish,
}
