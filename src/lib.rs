//! Lineage Combat Core
//!
//! Deterministic combat logic for a lineage boss-battle roguelike:
//! - Elemental trait catalog and generation tracker
//! - Grid-based boss attack patterns with telegraphs
//! - Timed directional dodges and streak counter-attacks
//! - Weakness / hidden critical damage multipliers
//! - Turn state machine driven by a single scheduler clock
//! - Bevy plugin, config hot-reload, structured logging

pub mod combat;
pub mod config;
pub mod constants;
pub mod encounter;
pub mod grid;
pub mod hotreload;
pub mod lineage;
pub mod logging;
pub mod scheduler;
pub mod seed;
pub mod traits;

pub use config::EncounterConfig;
pub use encounter::notice::CombatNotice;
pub use encounter::{Encounter, RunStatus, SelectionError};
pub use traits::{TraitCatalog, TraitType};
