//! Data-driven level layouts
//!
//! Layouts are described in JSON (boxes as `[x, y, w, h]` with `x, y` the
//! centre) and converted once into validated geometry.

use glam::Vec2;
use serde::Deserialize;

use super::collision::CollisionField;
use super::geometry::AxisBox;
use super::patrol::build_patrol_path;
use crate::consts::{ENEMY_SPEED, KEYS_PER_LEVEL, NUM_LEVELS, PATROL_WAYPOINTS};
use crate::error::SimError;

/// Built-in level table
const BUILTIN_LEVELS: &str = include_str!("../../data/levels.json");

type RawBox = [f32; 4];

#[derive(Deserialize)]
struct RawLevel {
    level: u8,
    enemy_count: usize,
    speed_multiplier: f32,
    walls: Vec<RawBox>,
    platforms: Vec<RawBox>,
    stations: Vec<Vec2>,
    enemy_spawns: Vec<Vec2>,
    patrol_path: Vec<Vec2>,
}

#[derive(Deserialize)]
struct RawTable {
    boundary_walls: Vec<RawBox>,
    door: Vec2,
    player_spawn: Vec2,
    levels: Vec<RawLevel>,
}

/// One level's static layout and difficulty
#[derive(Debug, Clone)]
pub struct LevelDef {
    pub level: u8,
    /// Boundary walls followed by the level's own walls
    pub walls: Vec<AxisBox>,
    pub platforms: Vec<AxisBox>,
    pub stations: Vec<Vec2>,
    pub door: Vec2,
    pub player_spawn: Vec2,
    /// Spawn points actually used (already capped to the enemy count)
    pub enemy_spawns: Vec<Vec2>,
    pub enemy_speed: f32,
    /// Shared patrol loop, clamped into the patrol margin
    pub patrol_path: Vec<Vec2>,
}

impl LevelDef {
    pub fn collision_field(&self) -> CollisionField {
        CollisionField::new(self.walls.clone(), self.platforms.clone())
    }

    pub fn enemy_count(&self) -> usize {
        self.enemy_spawns.len()
    }
}

fn to_box(raw: &RawBox) -> Result<AxisBox, SimError> {
    let [x, y, w, h] = *raw;
    AxisBox::from_size(Vec2::new(x, y), w, h)
}

fn to_boxes(raw: &[RawBox]) -> Result<Vec<AxisBox>, SimError> {
    raw.iter().map(to_box).collect()
}

/// All level layouts, indexed by level number
#[derive(Debug, Clone)]
pub struct LevelTable {
    levels: Vec<LevelDef>,
}

impl LevelTable {
    /// Parse and validate a level table document
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let raw: RawTable = serde_json::from_str(json)?;
        let boundary = to_boxes(&raw.boundary_walls)?;

        let mut levels = Vec::with_capacity(raw.levels.len());
        for lvl in raw.levels {
            let invalid = |reason: &str| SimError::InvalidLevel {
                level: lvl.level,
                reason: reason.to_string(),
            };
            if lvl.level == 0 {
                return Err(invalid("levels are numbered from 1"));
            }
            if lvl.stations.len() != KEYS_PER_LEVEL as usize {
                return Err(invalid("wrong number of key stations"));
            }
            if lvl.enemy_count > 0 && !PATROL_WAYPOINTS.contains(&lvl.patrol_path.len()) {
                return Err(invalid("patrol path needs 4 to 8 waypoints"));
            }
            if !(lvl.speed_multiplier.is_finite() && lvl.speed_multiplier > 0.0) {
                return Err(invalid("speed multiplier must be positive"));
            }

            let mut walls = boundary.clone();
            walls.extend(to_boxes(&lvl.walls)?);

            let count = lvl.enemy_count.min(lvl.enemy_spawns.len());
            if count < lvl.enemy_count {
                log::warn!(
                    "Level {} asks for {} enemies but has {} spawns",
                    lvl.level,
                    lvl.enemy_count,
                    lvl.enemy_spawns.len()
                );
            }

            levels.push(LevelDef {
                level: lvl.level,
                walls,
                platforms: to_boxes(&lvl.platforms)?,
                stations: lvl.stations,
                door: raw.door,
                player_spawn: raw.player_spawn,
                enemy_spawns: lvl.enemy_spawns[..count].to_vec(),
                enemy_speed: ENEMY_SPEED * lvl.speed_multiplier,
                patrol_path: build_patrol_path(&lvl.patrol_path),
            });
        }

        levels.sort_by_key(|l| l.level);
        if levels.windows(2).any(|w| w[0].level == w[1].level) {
            return Err(SimError::InvalidLevel {
                level: 0,
                reason: "duplicate level number".to_string(),
            });
        }

        log::info!("Loaded {} level layouts", levels.len());
        Ok(Self { levels })
    }

    /// The layouts shipped with the game
    pub fn builtin() -> Result<Self, SimError> {
        Self::from_json(BUILTIN_LEVELS)
    }

    pub fn get(&self, level: u8) -> Result<&LevelDef, SimError> {
        self.levels
            .iter()
            .find(|l| l.level == level)
            .ok_or(SimError::UnknownLevel(level))
    }

    /// Highest level in the table (the campaign's last level)
    pub fn last_level(&self) -> u8 {
        self.levels.last().map_or(0, |l| l.level)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// True if the table covers every campaign level
    pub fn is_complete(&self) -> bool {
        (1..=NUM_LEVELS).all(|n| self.get(n).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::motion::floor_y;

    #[test]
    fn test_builtin_table() {
        let table = LevelTable::builtin().unwrap();
        assert_eq!(table.len(), 5);
        assert!(table.is_complete());
        assert_eq!(table.last_level(), NUM_LEVELS);
        assert!(matches!(table.get(6), Err(SimError::UnknownLevel(6))));
    }

    #[test]
    fn test_difficulty_scales_with_level() {
        let table = LevelTable::builtin().unwrap();
        let counts: Vec<usize> = (1..=5).map(|n| table.get(n).unwrap().enemy_count()).collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 5]);

        let l1 = table.get(1).unwrap();
        let l5 = table.get(5).unwrap();
        assert!((l1.enemy_speed - 120.0).abs() < 1e-4);
        assert!((l5.enemy_speed - 216.0).abs() < 1e-3);
    }

    #[test]
    fn test_walls_include_boundary() {
        let table = LevelTable::builtin().unwrap();
        let l1 = table.get(1).unwrap();
        assert_eq!(l1.walls.len(), 3 + 3);
        let top = l1.walls[0];
        assert_eq!(top.bottom(), 690.0);
        assert_eq!(l1.door, Vec2::new(900.0, 100.0));
        assert_eq!(l1.player_spawn, Vec2::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1));
    }

    #[test]
    fn test_patrol_paths_inside_margin() {
        let table = LevelTable::builtin().unwrap();
        for n in 1..=5 {
            let def = table.get(n).unwrap();
            assert!((4..=8).contains(&def.patrol_path.len()));
            for p in &def.patrol_path {
                assert!(p.x >= PATROL_MARGIN && p.x <= SCREEN_WIDTH - PATROL_MARGIN);
                assert!(p.y >= PATROL_MARGIN && p.y <= SCREEN_HEIGHT - PATROL_MARGIN);
            }
        }
    }

    #[test]
    fn test_spawn_is_clear_of_walls() {
        let table = LevelTable::builtin().unwrap();
        for n in 1..=5 {
            let def = table.get(n).unwrap();
            let field = def.collision_field();
            assert!(!field.blocked(&AxisBox::player_at(def.player_spawn)));
            assert!(!field.blocked(&AxisBox::player_at(Vec2::new(def.door.x, floor_y()))));
        }
    }

    #[test]
    fn test_rejects_degenerate_wall() {
        let json = r#"{"boundary_walls":[[0,0,0,10]],"door":[1,1],"player_spawn":[1,1],"levels":[]}"#;
        assert!(matches!(
            LevelTable::from_json(json),
            Err(SimError::DegenerateBox { .. })
        ));
    }

    #[test]
    fn test_rejects_wrong_station_count() {
        let json = r#"{"boundary_walls":[],"door":[1,1],"player_spawn":[1,1],"levels":[
            {"level":1,"enemy_count":0,"speed_multiplier":1.0,"walls":[],"platforms":[],
             "stations":[[1,1]],"enemy_spawns":[],"patrol_path":[]}]}"#;
        assert!(matches!(
            LevelTable::from_json(json),
            Err(SimError::InvalidLevel { level: 1, .. })
        ));
    }

    #[test]
    fn test_enemy_count_capped_by_spawns() {
        let json = r#"{"boundary_walls":[],"door":[1,1],"player_spawn":[1,1],"levels":[
            {"level":1,"enemy_count":4,"speed_multiplier":1.0,"walls":[],"platforms":[],
             "stations":[[1,1],[2,2],[3,3],[4,4],[5,5]],"enemy_spawns":[[100,100]],
             "patrol_path":[[100,100],[200,100],[200,200],[100,200]]}]}"#;
        let table = LevelTable::from_json(json).unwrap();
        assert_eq!(table.get(1).unwrap().enemy_count(), 1);
        assert!(!table.is_complete());
    }

    #[test]
    fn test_rejects_patrol_path_outside_waypoint_range() {
        let path = |n: usize| {
            let points: Vec<String> = (0..n).map(|i| format!("[{},100]", 100 + i * 50)).collect();
            points.join(",")
        };
        let table = |enemies: usize, n: usize| {
            LevelTable::from_json(&format!(
                r#"{{"boundary_walls":[],"door":[1,1],"player_spawn":[1,1],"levels":[
                {{"level":1,"enemy_count":{enemies},"speed_multiplier":1.0,"walls":[],"platforms":[],
                 "stations":[[1,1],[2,2],[3,3],[4,4],[5,5]],"enemy_spawns":[[100,100]],
                 "patrol_path":[{}]}}]}}"#,
                path(n)
            ))
        };

        for n in [0, 1, 3, 9] {
            assert!(matches!(
                table(1, n),
                Err(SimError::InvalidLevel { level: 1, .. })
            ));
        }
        for n in [4, 8] {
            assert!(table(1, n).is_ok());
        }
        // Enemy-free levels don't need a path
        assert!(table(0, 0).is_ok());
    }
}
