use crate::prediction::LocalPredictor;
use log::debug;
use shared::GameSnapshot;

/// Holds the latest authoritative snapshot and re-anchors local prediction from it
#[derive(Debug, Default)]
pub struct SnapshotReceiver {
    latest: Option<GameSnapshot>,
}

impl SnapshotReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&GameSnapshot> {
        self.latest.as_ref()
    }

    /// Replaces the cached snapshot and snaps the local player to the
    /// server's position. Coordinates are trusted as received.
    pub fn apply_snapshot(
        &mut self,
        snapshot: GameSnapshot,
        local_id: &str,
        predictor: &mut LocalPredictor,
    ) {
        let anchor = snapshot.player(local_id).map(|player| player.position());
        if anchor.is_none() {
            debug!("Snapshot has no entry for local player {}", local_id);
        }

        predictor.reanchor(anchor);
        self.latest = Some(snapshot);
    }

    pub fn clear(&mut self) {
        self.latest = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Direction, PressedSet};
    use shared::{PlayerState, Position, PLAYER_SPEED};

    fn snapshot_with(players: &[(&str, f32, f32)]) -> GameSnapshot {
        let mut snapshot = GameSnapshot {
            ball: Some(Position::new(150.0, 225.0)),
            ..Default::default()
        };
        for (id, x, y) in players {
            snapshot.players.insert(
                id.to_string(),
                PlayerState {
                    x: *x,
                    y: *y,
                    team: Some(0),
                },
            );
        }
        snapshot
    }

    #[test]
    fn test_apply_anchors_local_player() {
        let mut receiver = SnapshotReceiver::new();
        let mut predictor = LocalPredictor::new(PLAYER_SPEED);

        receiver.apply_snapshot(snapshot_with(&[("abc", 150.0, 400.0)]), "abc", &mut predictor);

        assert_eq!(predictor.position(), Some(Position::new(150.0, 400.0)));
        assert!(receiver.latest().is_some());
    }

    #[test]
    fn test_apply_overwrites_predicted_drift() {
        let mut receiver = SnapshotReceiver::new();
        let mut predictor = LocalPredictor::new(PLAYER_SPEED);
        receiver.apply_snapshot(snapshot_with(&[("abc", 150.0, 400.0)]), "abc", &mut predictor);

        for _ in 0..20 {
            predictor.tick(&PressedSet::new().with(Direction::Right));
        }
        receiver.apply_snapshot(snapshot_with(&[("abc", 151.0, 400.0)]), "abc", &mut predictor);

        assert_eq!(predictor.position(), Some(Position::new(151.0, 400.0)));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut receiver = SnapshotReceiver::new();
        let mut predictor = LocalPredictor::new(PLAYER_SPEED);
        let snapshot = snapshot_with(&[("abc", 150.0, 400.0), ("def", 20.0, 30.0)]);

        receiver.apply_snapshot(snapshot.clone(), "abc", &mut predictor);
        let first = (receiver.latest().cloned(), predictor.position());
        receiver.apply_snapshot(snapshot, "abc", &mut predictor);
        let second = (receiver.latest().cloned(), predictor.position());

        assert_eq!(first, second);
    }

    #[test]
    fn test_absent_local_player_unsets_position() {
        let mut receiver = SnapshotReceiver::new();
        let mut predictor = LocalPredictor::new(PLAYER_SPEED);
        receiver.apply_snapshot(snapshot_with(&[("abc", 150.0, 400.0)]), "abc", &mut predictor);
        receiver.apply_snapshot(snapshot_with(&[("def", 20.0, 30.0)]), "abc", &mut predictor);

        assert_eq!(predictor.position(), None);
        assert_eq!(predictor.tick(&PressedSet::new().with(Direction::Up)), None);
        assert_eq!(predictor.tick(&PressedSet::new()), None);
    }

    #[test]
    fn test_snapshot_is_replaced_not_merged() {
        let mut receiver = SnapshotReceiver::new();
        let mut predictor = LocalPredictor::new(PLAYER_SPEED);
        receiver.apply_snapshot(
            snapshot_with(&[("abc", 150.0, 400.0), ("def", 20.0, 30.0)]),
            "abc",
            &mut predictor,
        );
        receiver.apply_snapshot(snapshot_with(&[("abc", 150.0, 400.0)]), "abc", &mut predictor);

        let latest = receiver.latest().unwrap();
        assert_eq!(latest.players.len(), 1);
        assert!(latest.player("def").is_none());
    }

    #[test]
    fn test_out_of_range_coordinates_are_trusted() {
        // No range validation on authoritative input
        let mut receiver = SnapshotReceiver::new();
        let mut predictor = LocalPredictor::new(PLAYER_SPEED);
        receiver.apply_snapshot(
            snapshot_with(&[("abc", -5000.0, f32::MAX)]),
            "abc",
            &mut predictor,
        );
        assert_eq!(predictor.position(), Some(Position::new(-5000.0, f32::MAX)));
    }
}
