//! Centralized game constants for the lineage combat core.
//!
//! These are the shipped defaults. Every tunable here is mirrored by a field
//! in `config::EncounterConfig`; the config is the single source at runtime.

// =====================================================
// Damage
// =====================================================

/// Additive multiplier per attacker trait that matches a boss weakness
pub const WEAKNESS_BONUS: f32 = 0.5;

/// Multiplicative bonus when the attacker carries the hidden "Only One" trait
pub const CRITICAL_TRAIT_MULTIPLIER: f32 = 5.0;

/// Boss health fraction at or below which its attack power escalates
pub const ENRAGE_HEALTH_FRACTION: f32 = 0.25;

/// Flat attack power gained by the boss when it enrages (one-shot)
pub const ENRAGE_ATTACK_BONUS: i32 = 15;

/// Damage factor of the full-grid special attack
pub const SPECIAL_DAMAGE_FACTOR: f32 = 2.0;

// =====================================================
// Combatants
// =====================================================

pub const PLAYER_BASE_HEALTH: i32 = 100;
pub const PLAYER_BASE_ATTACK: i32 = 10;

/// Extra max health granted by the Earth trait
pub const EARTH_HEALTH_BONUS: i32 = 25;

/// Flat attack granted by the Steel trait (on top of its multiplier)
pub const STEEL_ATTACK_BONUS: i32 = 5;

pub const MAX_CHARGE_STACKS: u32 = 3;

pub const BOSS_MAX_HEALTH: i32 = 200;
pub const BOSS_ATTACK_POWER: i32 = 15;

/// Number of distinct weaknesses sampled for the boss each run
pub const BOSS_WEAKNESS_COUNT: usize = 4;

/// Traits offered to the player per selection screen
pub const TRAIT_OFFER_COUNT: usize = 3;

/// Successful dodges needed before the banked streak fires a counter-attack
pub const COUNTER_STREAK_THRESHOLD: u32 = 3;

// =====================================================
// Grid
// =====================================================

pub const GRID_COLS: usize = 3;
pub const GRID_ROWS: usize = 3;
pub const GRID_SPACING: f32 = 1.5;

/// Anchor used when neither a fixed anchor, arena marker, nor defender exists
pub const DEFAULT_GRID_ANCHOR: [f32; 2] = [0.0, -2.0];

/// Columns covered by a single swipe, counted from the swiped side
pub const SWIPE_COLUMNS: usize = 2;

// =====================================================
// Timing (seconds)
// =====================================================

/// Pause inserted before every turn hand-over
pub const TURN_DELAY: f32 = 1.0;

/// Attack indicator shown before the boss commits to an attack
pub const TELEGRAPH_DURATION: f32 = 1.5;

pub const ATTACK_ANIMATION_DURATION: f32 = 1.0;
pub const SPECIAL_ANIMATION_DURATION: f32 = 0.8;

/// Lead-in between a swipe animation starting and its warning volley
pub const SWIPE_LEAD_IN: f32 = 1.0;

/// Gap between repetitions of a triple swipe
pub const TRIPLE_SWIPE_INTERVAL: f32 = 1.0;

/// Extra wind-down after the last triple-swipe hit, on top of one animation
pub const TRIPLE_SWIPE_TAIL: f32 = 1.75;

/// Fraction of the animation at which a swipe or projectile connects
pub const SWIPE_HIT_FRACTION: f32 = 0.5;

/// Fraction of the special animation at which the full-grid hit lands
pub const SPECIAL_HIT_FRACTION: f32 = 0.6;

pub const ATTACK_RECOVERY: f32 = 0.5;
pub const TRIPLE_ATTACK_RECOVERY: f32 = 2.0;

/// Boss death animation length before victory is announced
pub const DEATH_DELAY: f32 = 1.5;

// =====================================================
// Dodge
// =====================================================

/// Invulnerability window (before trait bonuses)
pub const DODGE_WINDOW: f32 = 0.2;
pub const DODGE_RETURN: f32 = 0.15;
pub const DODGE_COOLDOWN: f32 = 0.5;

// =====================================================
// Projectile
// =====================================================

pub const PROJECTILE_SPEED: f32 = 7.0;
pub const PROJECTILE_LIFETIME: f32 = 5.0;
pub const PROJECTILE_DAMAGE: i32 = 10;
pub const PROJECTILE_HIT_RADIUS: f32 = 0.5;
