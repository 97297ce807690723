//! Encounter configuration.
//!
//! Every tunable of a run lives here, with defaults matching the shipped game.
//! Files may be RON (`.ron`) or JSON (`.json`); missing fields fall back to
//! their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::combat::attack::AttackKind;
use crate::combat::selection::SelectionPolicy;
use crate::constants::*;
use crate::traits::TraitType;

pub const DEFAULT_CONFIG_PATH: &str = "config/encounter.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialize error: {0}")]
    RonSerialize(#[from] ron::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    pub seed: u64,
    pub grid: GridConfig,
    pub player: PlayerConfig,
    pub boss: BossConfig,
    pub damage: DamageConfig,
    pub timing: TimingConfig,
    pub projectile: ProjectileConfig,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            grid: GridConfig::default(),
            player: PlayerConfig::default(),
            boss: BossConfig::default(),
            damage: DamageConfig::default(),
            timing: TimingConfig::default(),
            projectile: ProjectileConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cols: usize,
    pub rows: usize,
    pub spacing: f32,
    /// Fixed anchor; takes precedence over the arena marker and the defender
    pub anchor: Option<[f32; 2]>,
    pub swipe_columns: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: GRID_COLS,
            rows: GRID_ROWS,
            spacing: GRID_SPACING,
            anchor: None,
            swipe_columns: SWIPE_COLUMNS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub base_health: i32,
    pub base_attack: i32,
    pub max_charge_stacks: u32,
    pub counter_streak_threshold: u32,
    /// Horizontal dodge offset; the grid spacing when unset
    pub dodge_distance: Option<f32>,
    pub home: [f32; 2],
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_health: PLAYER_BASE_HEALTH,
            base_attack: PLAYER_BASE_ATTACK,
            max_charge_stacks: MAX_CHARGE_STACKS,
            counter_streak_threshold: COUNTER_STREAK_THRESHOLD,
            dodge_distance: None,
            home: DEFAULT_GRID_ANCHOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub max_health: i32,
    pub attack_power: i32,
    pub weakness_count: usize,
    /// Overrides the `weakness_count + 1` generation budget
    pub max_generations: Option<u32>,
    pub trait_offer_count: usize,
    pub enrage_health_fraction: f32,
    pub enrage_attack_bonus: i32,
    pub position: [f32; 2],
    pub attacks: Vec<AttackKind>,
    pub selection: SelectionPolicy,
    /// Pin weaknesses instead of sampling them
    pub fixed_weaknesses: Option<Vec<TraitType>>,
    /// Pin the hidden critical trait instead of sampling it
    pub fixed_critical: Option<TraitType>,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            max_health: BOSS_MAX_HEALTH,
            attack_power: BOSS_ATTACK_POWER,
            weakness_count: BOSS_WEAKNESS_COUNT,
            max_generations: None,
            trait_offer_count: TRAIT_OFFER_COUNT,
            enrage_health_fraction: ENRAGE_HEALTH_FRACTION,
            enrage_attack_bonus: ENRAGE_ATTACK_BONUS,
            position: [0.0, 2.0],
            attacks: AttackKind::ALL.to_vec(),
            selection: SelectionPolicy::Random,
            fixed_weaknesses: None,
            fixed_critical: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    pub weakness_bonus: f32,
    pub critical_multiplier: f32,
    pub special_damage_factor: f32,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            weakness_bonus: WEAKNESS_BONUS,
            critical_multiplier: CRITICAL_TRAIT_MULTIPLIER,
            special_damage_factor: SPECIAL_DAMAGE_FACTOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub turn_delay: f32,
    pub telegraph: f32,
    pub attack_animation: f32,
    pub special_animation: f32,
    pub swipe_lead_in: f32,
    pub triple_swipe_interval: f32,
    pub triple_swipe_tail: f32,
    pub attack_recovery: f32,
    pub triple_attack_recovery: f32,
    pub death_delay: f32,
    pub dodge_window: f32,
    pub dodge_return: f32,
    pub dodge_cooldown: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            turn_delay: TURN_DELAY,
            telegraph: TELEGRAPH_DURATION,
            attack_animation: ATTACK_ANIMATION_DURATION,
            special_animation: SPECIAL_ANIMATION_DURATION,
            swipe_lead_in: SWIPE_LEAD_IN,
            triple_swipe_interval: TRIPLE_SWIPE_INTERVAL,
            triple_swipe_tail: TRIPLE_SWIPE_TAIL,
            attack_recovery: ATTACK_RECOVERY,
            triple_attack_recovery: TRIPLE_ATTACK_RECOVERY,
            death_delay: DEATH_DELAY,
            dodge_window: DODGE_WINDOW,
            dodge_return: DODGE_RETURN,
            dodge_cooldown: DODGE_COOLDOWN,
        }
    }
}

impl TimingConfig {
    fn durations(&self) -> [(&'static str, f32); 13] {
        [
            ("turn_delay", self.turn_delay),
            ("telegraph", self.telegraph),
            ("attack_animation", self.attack_animation),
            ("special_animation", self.special_animation),
            ("swipe_lead_in", self.swipe_lead_in),
            ("triple_swipe_interval", self.triple_swipe_interval),
            ("triple_swipe_tail", self.triple_swipe_tail),
            ("attack_recovery", self.attack_recovery),
            ("triple_attack_recovery", self.triple_attack_recovery),
            ("death_delay", self.death_delay),
            ("dodge_window", self.dodge_window),
            ("dodge_return", self.dodge_return),
            ("dodge_cooldown", self.dodge_cooldown),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub speed: f32,
    pub lifetime: f32,
    pub damage: i32,
    pub hit_radius: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: PROJECTILE_SPEED,
            lifetime: PROJECTILE_LIFETIME,
            damage: PROJECTILE_DAMAGE,
            hit_radius: PROJECTILE_HIT_RADIUS,
        }
    }
}

impl EncounterConfig {
    /// Load from disk, picking the format by extension, then validate
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => Self::from_ron_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject values no encounter can run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.grid.cols == 0 || self.grid.rows == 0 {
            return invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.cols, self.grid.rows
            ));
        }
        if !(self.grid.spacing > 0.0) {
            return invalid(format!("grid spacing must be positive, got {}", self.grid.spacing));
        }
        if self.boss.weakness_count > TraitType::ALL.len() {
            return invalid(format!(
                "weakness_count {} exceeds the {} trait types",
                self.boss.weakness_count,
                TraitType::ALL.len()
            ));
        }
        if let Some(fixed) = &self.boss.fixed_weaknesses {
            let mut sorted = fixed.clone();
            sorted.sort();
            sorted.dedup();
            if sorted.len() != fixed.len() {
                return invalid("fixed_weaknesses contains duplicates".to_string());
            }
        }
        if self.boss.attacks.is_empty() {
            return invalid("boss attack list is empty".to_string());
        }
        if self.boss.max_health <= 0 || self.player.base_health <= 0 {
            return invalid("max health must be positive".to_string());
        }
        if !(self.boss.enrage_health_fraction > 0.0 && self.boss.enrage_health_fraction <= 1.0) {
            return invalid(format!(
                "enrage_health_fraction must be in (0, 1], got {}",
                self.boss.enrage_health_fraction
            ));
        }
        if self.player.counter_streak_threshold == 0 {
            return invalid("counter_streak_threshold must be at least 1".to_string());
        }
        if let Some(distance) = self.player.dodge_distance {
            if distance < 0.0 {
                return invalid(format!("dodge_distance must not be negative, got {distance}"));
            }
        }
        for (name, value) in self.timing.durations() {
            if !(value >= 0.0) {
                return invalid(format!("{name} must not be negative, got {value}"));
            }
        }
        if !(self.projectile.speed >= 0.0)
            || !(self.projectile.lifetime >= 0.0)
            || !(self.projectile.hit_radius >= 0.0)
        {
            return invalid("projectile speed, lifetime and radius must not be negative".to_string());
        }
        Ok(())
    }

    /// Dodge offset, defaulting to one grid cell
    pub fn dodge_distance(&self) -> f32 {
        self.player.dodge_distance.unwrap_or(self.grid.spacing)
    }

    /// Generation budget for a run
    pub fn max_generations(&self) -> u32 {
        self.boss
            .max_generations
            .unwrap_or_else(|| crate::lineage::LineageState::max_generations_for(self.boss.weakness_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_default_is_valid() {
        let config = EncounterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_generations(), 5);
        assert_eq!(config.dodge_distance(), GRID_SPACING);
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = EncounterConfig::default();
        let text = config.to_ron_string().unwrap();
        let restored = EncounterConfig::from_ron_str(&text).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EncounterConfig::from_json_str(r#"{"seed": 7, "boss": {"max_health": 300}}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.boss.max_health, 300);
        assert_eq!(config.boss.attack_power, BOSS_ATTACK_POWER);
        assert_eq!(config.grid.cols, GRID_COLS);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EncounterConfig::default();
        config.grid.cols = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = EncounterConfig::default();
        config.grid.spacing = 0.0;
        assert!(config.validate().is_err());

        let mut config = EncounterConfig::default();
        config.boss.weakness_count = 11;
        assert!(config.validate().is_err());

        let mut config = EncounterConfig::default();
        config.boss.attacks.clear();
        assert!(config.validate().is_err());

        let mut config = EncounterConfig::default();
        config.timing.telegraph = -1.0;
        assert!(config.validate().is_err());

        let mut config = EncounterConfig::default();
        config.boss.enrage_health_fraction = 1.5;
        assert!(config.validate().is_err());

        let mut config = EncounterConfig::default();
        config.boss.fixed_weaknesses = Some(vec![TraitType::Fire, TraitType::Fire]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_by_extension() {
        let mut ron_file = Builder::new().suffix(".ron").tempfile().unwrap();
        write!(ron_file, "(seed: 9, grid: (cols: 4))").unwrap();
        let config = EncounterConfig::load(ron_file.path()).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.grid.cols, 4);

        let mut json_file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(json_file, r#"{{"seed": 3}}"#).unwrap();
        assert_eq!(EncounterConfig::load(json_file.path()).unwrap().seed, 3);

        let toml_file = Builder::new().suffix(".toml").tempfile().unwrap();
        assert!(matches!(
            EncounterConfig::load(toml_file.path()),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"grid": {{"rows": 0}}}}"#).unwrap();
        assert!(matches!(
            EncounterConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = EncounterConfig::load(Path::new("does/not/exist.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
