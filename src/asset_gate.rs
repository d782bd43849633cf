//! Readiness gate for the scene's asynchronous asset loads.
//!
//! The gate knows up front how many assets the scene needs (one environment
//! map, one starfield texture and one texture per planet). Loads complete in
//! any order; the gate opens exactly once, on the notification that settles
//! the last outstanding asset.

use std::fmt;
use std::time::Duration;

use log::{info, warn};

/// Identifies one of the scene's asset loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKey {
    Environment,
    Starfield,
    Planet(usize),
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Environment => f.write_str("environment map"),
            Self::Starfield => f.write_str("starfield texture"),
            Self::Planet(index) => write!(f, "planet texture #{index}"),
        }
    }
}

/// Lifecycle of the gate. `Ready` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Loading,
    Ready,
}

/// Result of feeding a notification into the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateTransition {
    /// Nothing changed, or the gate is still loading.
    None,
    /// The gate just opened. Returned once per gate.
    Opened,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Pending,
    Loaded,
    Failed,
}

/// Counts settled loads against the known total.
#[derive(Debug)]
pub struct AssetGate {
    planets: usize,
    slots: Vec<Slot>,
    completed: usize,
    state: GateState,
    failures: Vec<(AssetKey, String)>,
    timeout: Option<Duration>,
}

impl AssetGate {
    /// Creates a gate expecting the environment map, the starfield and
    /// `planets` planet textures.
    pub fn new(planets: usize) -> Self {
        Self {
            planets,
            slots: vec![Slot::Pending; planets + 2],
            completed: 0,
            state: GateState::Loading,
            failures: Vec::new(),
            timeout: None,
        }
    }

    /// Forces the gate open once it has been loading for `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn total(&self) -> usize {
        self.slots.len()
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == GateState::Ready
    }

    /// Assets that settled with an error, in arrival order.
    pub fn failures(&self) -> &[(AssetKey, String)] {
        &self.failures
    }

    /// Assets that have not reported yet.
    pub fn pending(&self) -> Vec<AssetKey> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| **slot == Slot::Pending)
            .filter_map(|(index, _)| self.key_for(index))
            .collect()
    }

    /// Records a successful load.
    pub fn record_asset_loaded(&mut self, asset: AssetKey) -> GateTransition {
        self.settle(asset, Slot::Loaded)
    }

    /// Records a failed load. The asset still counts as settled so the scene
    /// can come up with a placeholder in its place.
    pub fn record_asset_failed(&mut self, asset: AssetKey, error: impl Into<String>) -> GateTransition {
        let error = error.into();
        let pending = self
            .slot_of(asset)
            .is_some_and(|index| self.slots[index] == Slot::Pending);
        if pending {
            warn!("{asset} failed to load: {error}");
            self.failures.push((asset, error));
        }
        self.settle(asset, Slot::Failed)
    }

    /// Opens the gate if it has been loading for longer than the timeout.
    pub fn expire(&mut self, elapsed: Duration) -> GateTransition {
        let Some(timeout) = self.timeout else {
            return GateTransition::None;
        };
        if self.is_ready() || elapsed < timeout {
            return GateTransition::None;
        }
        let pending = self.pending();
        warn!(
            "asset loading timed out after {:.1}s; still waiting on {} asset(s): {}",
            elapsed.as_secs_f32(),
            pending.len(),
            pending
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.open()
    }

    fn settle(&mut self, asset: AssetKey, outcome: Slot) -> GateTransition {
        let Some(index) = self.slot_of(asset) else {
            warn!("ignoring completion for unknown asset {asset}");
            return GateTransition::None;
        };
        if self.slots[index] != Slot::Pending {
            warn!("ignoring duplicate completion for {asset}");
            return GateTransition::None;
        }
        self.slots[index] = outcome;
        self.completed += 1;
        info!("{asset} settled ({}/{})", self.completed, self.total());

        if self.completed == self.total() && !self.is_ready() {
            self.open()
        } else {
            GateTransition::None
        }
    }

    fn open(&mut self) -> GateTransition {
        if self.is_ready() {
            return GateTransition::None;
        }
        self.state = GateState::Ready;
        info!("all assets settled; scene ready");
        GateTransition::Opened
    }

    fn slot_of(&self, asset: AssetKey) -> Option<usize> {
        match asset {
            AssetKey::Environment => Some(0),
            AssetKey::Starfield => Some(1),
            AssetKey::Planet(index) if index < self.planets => Some(index + 2),
            AssetKey::Planet(_) => None,
        }
    }

    fn key_for(&self, index: usize) -> Option<AssetKey> {
        match index {
            0 => Some(AssetKey::Environment),
            1 => Some(AssetKey::Starfield),
            i if i - 2 < self.planets => Some(AssetKey::Planet(i - 2)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_keys(planets: usize) -> Vec<AssetKey> {
        let mut keys = vec![AssetKey::Environment, AssetKey::Starfield];
        keys.extend((0..planets).map(AssetKey::Planet));
        keys
    }

    #[test]
    fn total_counts_environment_starfield_and_planets() {
        assert_eq!(AssetGate::new(4).total(), 6);
        assert_eq!(AssetGate::new(1).total(), 3);
    }

    #[test]
    fn shuffled_completions_open_only_on_the_last_one() {
        let mut gate = AssetGate::new(4);
        let order = [
            AssetKey::Planet(2),
            AssetKey::Starfield,
            AssetKey::Planet(0),
            AssetKey::Environment,
            AssetKey::Planet(3),
        ];
        for key in order {
            assert_eq!(gate.record_asset_loaded(key), GateTransition::None);
            assert_eq!(gate.state(), GateState::Loading);
        }
        assert_eq!(gate.record_asset_loaded(AssetKey::Planet(1)), GateTransition::Opened);
        assert!(gate.is_ready());
        assert_eq!(gate.completed(), 6);
    }

    #[test]
    fn every_rotation_of_the_order_opens_exactly_once() {
        let keys = all_keys(4);
        for shift in 0..keys.len() {
            let mut gate = AssetGate::new(4);
            let mut opened = 0;
            for step in 0..keys.len() {
                let key = keys[(step + shift) % keys.len()];
                if gate.record_asset_loaded(key) == GateTransition::Opened {
                    opened += 1;
                    assert_eq!(step, keys.len() - 1);
                }
            }
            assert_eq!(opened, 1);
        }
    }

    #[test]
    fn duplicates_and_unknown_assets_are_ignored() {
        let mut gate = AssetGate::new(2);
        gate.record_asset_loaded(AssetKey::Environment);
        gate.record_asset_loaded(AssetKey::Environment);
        gate.record_asset_loaded(AssetKey::Planet(7));
        assert_eq!(gate.completed(), 1);
        assert!(gate.completed() <= gate.total());
        assert_eq!(gate.pending().len(), 3);
    }

    #[test]
    fn gate_never_reopens() {
        let mut gate = AssetGate::new(1);
        for key in all_keys(1) {
            gate.record_asset_loaded(key);
        }
        assert!(gate.is_ready());
        for key in all_keys(1) {
            assert_eq!(gate.record_asset_loaded(key), GateTransition::None);
        }
        assert_eq!(gate.completed(), gate.total());
    }

    #[test]
    fn failures_settle_their_slot() {
        let mut gate = AssetGate::new(1);
        gate.record_asset_loaded(AssetKey::Environment);
        gate.record_asset_failed(AssetKey::Planet(0), "no such file");
        assert_eq!(
            gate.record_asset_loaded(AssetKey::Starfield),
            GateTransition::Opened
        );
        assert_eq!(gate.failures().len(), 1);
        assert_eq!(gate.failures()[0].0, AssetKey::Planet(0));
    }

    #[test]
    fn timeout_opens_a_stalled_gate_once() {
        let mut gate = AssetGate::new(4).with_timeout(Duration::from_secs(5));
        gate.record_asset_loaded(AssetKey::Starfield);
        assert_eq!(gate.expire(Duration::from_secs(4)), GateTransition::None);
        assert_eq!(gate.expire(Duration::from_secs(5)), GateTransition::Opened);
        assert_eq!(gate.expire(Duration::from_secs(6)), GateTransition::None);
        assert_eq!(gate.record_asset_loaded(AssetKey::Environment), GateTransition::None);
    }

    #[test]
    fn without_timeout_expire_is_a_no_op() {
        let mut gate = AssetGate::new(4);
        assert_eq!(gate.expire(Duration::from_secs(3600)), GateTransition::None);
        assert!(!gate.is_ready());
    }
}
