//! Match rooms and the registry of active matches

use std::collections::HashMap;

use uuid::Uuid;

use crate::ws::protocol::ConnectionId;

use super::physics::GameConfig;
use super::simulation::Simulation;
use super::state::{Direction, Side};

pub type MatchId = Uuid;

/// Per-side value holder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SideMap<T> {
    pub left: T,
    pub right: T,
}

impl<T> SideMap<T> {
    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// One two-player match: its simulation, who plays which side, and the
/// latest movement intent per side
pub struct GameMatch {
    pub id: MatchId,
    pub sim: Simulation,
    pub players: SideMap<Option<ConnectionId>>,
    pub intents: SideMap<Direction>,
}

impl GameMatch {
    pub fn new(id: MatchId, left: ConnectionId, right: ConnectionId, config: GameConfig, seed: u64) -> Self {
        Self {
            id,
            sim: Simulation::new(config, seed),
            players: SideMap {
                left: Some(left),
                right: Some(right),
            },
            intents: SideMap::default(),
        }
    }

    /// Bound connections, left first
    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        [self.players.left, self.players.right].into_iter().flatten()
    }

    /// Move each paddle according to its side's held intent
    pub fn apply_intents(&mut self, dt: f32) {
        for side in [Side::Left, Side::Right] {
            if self.players.get(side).is_some() {
                let direction = *self.intents.get(side);
                self.sim.move_paddle(side, direction, dt);
            }
        }
    }
}

/// Where a connection is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub match_id: MatchId,
    pub side: Side,
}

/// All active matches plus the connection -> (match, side) index.
///
/// Matches and bindings are only changed together, so a connection is bound
/// exactly when it is listed as a player in a registered match.
#[derive(Default)]
pub struct MatchRegistry {
    matches: HashMap<MatchId, GameMatch>,
    bindings: HashMap<ConnectionId, Binding>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &MatchId) -> Option<&GameMatch> {
        self.matches.get(id)
    }

    #[cfg(test)]
    pub fn get_mut(&mut self, id: &MatchId) -> Option<&mut GameMatch> {
        self.matches.get_mut(id)
    }

    /// Register a match and bind its players
    pub fn insert(&mut self, game_match: GameMatch) {
        for side in [Side::Left, Side::Right] {
            if let Some(conn) = *game_match.players.get(side) {
                self.bindings.insert(
                    conn,
                    Binding {
                        match_id: game_match.id,
                        side,
                    },
                );
            }
        }
        self.matches.insert(game_match.id, game_match);
    }

    /// Remove a match and unbind everyone in it
    pub fn remove(&mut self, id: &MatchId) -> Option<GameMatch> {
        let game_match = self.matches.remove(id)?;
        for conn in game_match.connections() {
            self.bindings.remove(&conn);
        }
        Some(game_match)
    }

    pub fn binding(&self, conn: &ConnectionId) -> Option<Binding> {
        self.bindings.get(conn).copied()
    }

    pub fn is_bound(&self, conn: &ConnectionId) -> bool {
        self.bindings.contains_key(conn)
    }

    /// Record a movement intent for a bound connection
    pub fn set_intent(&mut self, binding: Binding, direction: Direction) -> bool {
        match self.matches.get_mut(&binding.match_id) {
            Some(game_match) => {
                *game_match.intents.get_mut(binding.side) = direction;
                true
            }
            None => false,
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GameMatch> {
        self.matches.values_mut()
    }

    pub fn active_matches(&self) -> usize {
        self.matches.len()
    }

    pub fn bound_connections(&self) -> usize {
        self.bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn new_match() -> (GameMatch, ConnectionId, ConnectionId) {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let m = GameMatch::new(Uuid::new_v4(), a, b, GameConfig::default(), 3);
        (m, a, b)
    }

    #[test]
    fn test_insert_binds_both_sides() {
        let mut registry = MatchRegistry::new();
        let (m, a, b) = new_match();
        let id = m.id;
        registry.insert(m);

        assert_eq!(registry.active_matches(), 1);
        assert_eq!(registry.binding(&a), Some(Binding { match_id: id, side: Side::Left }));
        assert_eq!(registry.binding(&b), Some(Binding { match_id: id, side: Side::Right }));
    }

    #[test]
    fn test_remove_unbinds_everyone() {
        let mut registry = MatchRegistry::new();
        let (m, a, b) = new_match();
        let id = m.id;
        registry.insert(m);

        assert!(registry.remove(&id).is_some());
        assert!(!registry.is_bound(&a));
        assert!(!registry.is_bound(&b));
        assert_eq!(registry.active_matches(), 0);
        assert_eq!(registry.bound_connections(), 0);
        assert!(registry.remove(&id).is_none());
    }

    #[test]
    fn test_intent_is_held_across_ticks() {
        let mut registry = MatchRegistry::new();
        let (mut m, a, _) = new_match();
        m.sim.start();
        let id = m.id;
        registry.insert(m);

        let binding = registry.binding(&a).unwrap();
        assert!(registry.set_intent(binding, Direction::Down));

        let game_match = registry.get_mut(&id).unwrap();
        for _ in 0..3 {
            game_match.apply_intents(1.0 / 60.0);
        }
        assert_eq!(game_match.intents.left, Direction::Down);
        assert_eq!(game_match.intents.right, Direction::Idle);
        assert_approx_eq!(game_match.sim.snapshot().paddles.left.y, 275.0, 1e-3);
        assert_eq!(game_match.sim.snapshot().paddles.right.y, 260.0);
    }
}
