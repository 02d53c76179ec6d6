// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


//! A deterministic stand-in for a game world, serialized once per tick.

use beacon_core::StateSource;
use serde::Serialize;

const ARENA_HALF_EXTENT: f32 = 256.0;

#[derive(Debug, Clone, Serialize)]
struct PlayerState {
    id: u32,
    position: [f32; 3],
    velocity: [f32; 3],
    health: u32,
    alive: bool,
}

#[derive(Debug, Serialize)]
struct WorldSnapshot<'a> {
    tick: u64,
    players: &'a [PlayerState],
}

/// Players bouncing around a square arena, taking periodic damage.
#[derive(Debug)]
pub struct SyntheticWorld {
    tick: u64,
    players: Vec<PlayerState>,
}

impl SyntheticWorld {
    /// Creates a world with `player_count` players spread over the arena.
    pub fn new(player_count: u32) -> Self {
        let players = (0..player_count)
            .map(|id| {
                let angle = id as f32 * 0.7;
                PlayerState {
                    id,
                    position: [angle.cos() * 100.0, 0.0, angle.sin() * 100.0],
                    velocity: [angle.sin() * 3.0, 0.0, angle.cos() * -3.0],
                    health: 100,
                    alive: true,
                }
            })
            .collect();
        Self { tick: 0, players }
    }

    fn step(&mut self) {
        self.tick += 1;
        for player in &mut self.players {
            for axis in [0, 2] {
                player.position[axis] += player.velocity[axis];
                if player.position[axis].abs() > ARENA_HALF_EXTENT {
                    player.velocity[axis] = -player.velocity[axis];
                }
            }

            if (self.tick + u64::from(player.id)) % 90 == 0 {
                player.health = player.health.saturating_sub(15);
            }
            if player.health == 0 {
                // Respawn at full health on the next pass.
                player.alive = !player.alive;
                if player.alive {
                    player.health = 100;
                }
            }
        }
    }
}

impl StateSource for SyntheticWorld {
    fn capture(&mut self) -> anyhow::Result<Vec<u8>> {
        self.step();
        let snapshot = WorldSnapshot {
            tick: self.tick,
            players: &self.players,
        };
        Ok(serde_json::to_vec(&snapshot)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_is_valid_json() {
        let mut world = SyntheticWorld::new(4);
        let bytes = world.capture().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["tick"], 1);
        assert_eq!(value["players"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_players_stay_near_arena() {
        let mut world = SyntheticWorld::new(8);
        for _ in 0..10_000 {
            world.capture().unwrap();
        }
        for player in &world.players {
            assert!(player.position[0].abs() <= ARENA_HALF_EXTENT + 3.0);
            assert!(player.position[2].abs() <= ARENA_HALF_EXTENT + 3.0);
        }
    }

    #[test]
    fn test_empty_world_still_serializes() {
        let mut world = SyntheticWorld::new(0);
        assert!(!world.capture().unwrap().is_empty());
    }
}
