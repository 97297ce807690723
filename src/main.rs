//! Headless autopilot run of one lineage encounter.
//!
//! Environment:
//! - `LINEAGE_CONFIG`: config path (default `config/encounter.ron`)
//! - `LINEAGE_WATCH=1`: hot-reload the config file between runs
//! - `LINEAGE_LOG`: base log level (`RUST_LOG` still wins)

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use bevy::app::{AppExit, ScheduleRunnerPlugin};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::Rng;
use rand_xoshiro::Xoshiro256PlusPlus;

use lineage_core::combat::AttackDirection;
use lineage_core::combat::DodgeDirection;
use lineage_core::config::{EncounterConfig, DEFAULT_CONFIG_PATH};
use lineage_core::encounter::notice::{CombatNotice, EffectKind};
use lineage_core::encounter::plugin::{
    CombatNoticeEvent, EncounterPlugin, EncounterResource, PlayerCommand,
};
use lineage_core::encounter::turn::TurnState;
use lineage_core::hotreload::HotReloadPlugin;
use lineage_core::logging::{LogLevel, LoggingPlugin, TracingConfig};
use lineage_core::seed::{RunSeed, STREAM_AUTOPILOT};

const FRAME: Duration = Duration::from_micros(16_667);

/// Lightning lands at the swipe lead-in; the hit follows half an animation later
const LIGHTNING_DODGE_DELAY: f32 = 0.35;
const PROJECTILE_DODGE_DELAY: f32 = 0.4;
/// Share of dodges the autopilot deliberately fumbles
const FUMBLE_CHANCE: f64 = 0.15;
const CHARGE_CHANCE: f64 = 0.3;
/// Hard stop in simulated seconds
const MAX_SIM_SECONDS: f32 = 3600.0;

#[derive(Resource)]
struct Autopilot {
    rng: Xoshiro256PlusPlus,
    pending_dodge: Option<f32>,
    elapsed: f32,
}

fn main() -> anyhow::Result<()> {
    let level = std::env::var("LINEAGE_LOG")
        .ok()
        .map(|s| s.parse::<LogLevel>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or(LogLevel::Info);

    let path = std::env::var("LINEAGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = if path.exists() {
        EncounterConfig::load(&path)
            .with_context(|| format!("loading encounter config {}", path.display()))?
    } else {
        EncounterConfig::default()
    };
    let watch = std::env::var("LINEAGE_WATCH").is_ok_and(|v| v == "1");

    let autopilot = Autopilot {
        rng: RunSeed::new(config.seed).rng(STREAM_AUTOPILOT),
        pending_dodge: None,
        elapsed: 0.0,
    };

    let mut app = App::new();
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)))
        .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
        .add_plugins(LoggingPlugin {
            config: TracingConfig::default().with_level(level),
        })
        .add_plugins(EncounterPlugin {
            config,
            auto_start: true,
        })
        .insert_resource(autopilot)
        .add_systems(PostUpdate, drive_autopilot);

    if watch && path.exists() {
        app.add_plugins(HotReloadPlugin { path: path.clone() });
    }

    tracing::info!(config = %path.display(), watch, "lineage simulation starting");

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("simulation exited with code {code}"),
    }
}

fn drive_autopilot(
    time: Res<Time>,
    mut pilot: ResMut<Autopilot>,
    mut notices: EventReader<CombatNoticeEvent>,
    encounter: Res<EncounterResource>,
    mut commands: EventWriter<PlayerCommand>,
    mut exit: EventWriter<AppExit>,
) {
    let dt = time.delta_secs();
    pilot.elapsed += dt;

    for CombatNoticeEvent(notice) in notices.read() {
        match notice {
            CombatNotice::ShowTraitSelection { options } => {
                let pick = options[pilot.rng.gen_range(0..options.len())];
                tracing::info!(trait_type = pick.as_str(), "autopilot picks trait");
                commands.send(PlayerCommand::SelectTrait(pick));
            }
            CombatNotice::TurnChanged {
                to: TurnState::PlayerTurn,
                ..
            } => {
                let player = encounter.0.player();
                let can_charge =
                    player.charge_stacks < encounter.0.config().player.max_charge_stacks;
                if can_charge && pilot.rng.gen_bool(CHARGE_CHANCE) {
                    commands.send(PlayerCommand::Charge);
                } else {
                    commands.send(PlayerCommand::Attack);
                }
            }
            CombatNotice::SpawnEffect {
                effect: EffectKind::Lightning(_),
                ..
            } => {
                // A Both volley emits two effects; one dodge is enough
                pilot.pending_dodge.get_or_insert(LIGHTNING_DODGE_DELAY);
            }
            CombatNotice::SpawnEffect {
                effect: EffectKind::ProjectileLaunch,
                ..
            } => {
                pilot.pending_dodge.get_or_insert(PROJECTILE_DODGE_DELAY);
            }
            CombatNotice::ShowGameOver { victory } => {
                let hud = encounter.0.hud();
                tracing::info!(
                    victory,
                    generation = hud.generation,
                    player_health = hud.player_health,
                    boss_health = hud.boss_health,
                    elapsed = pilot.elapsed,
                    "simulation finished"
                );
                exit.send(AppExit::Success);
            }
            _ => {}
        }
    }

    if let Some(delay) = pilot.pending_dodge.as_mut() {
        *delay -= dt;
        if *delay <= 0.0 {
            pilot.pending_dodge = None;
            let direction = choose_dodge(&mut pilot.rng, encounter.0.current_attack_direction());
            commands.send(PlayerCommand::Dodge(direction));
        }
    }

    if pilot.elapsed > MAX_SIM_SECONDS {
        tracing::warn!(elapsed = pilot.elapsed, "simulation time limit reached");
        exit.send(AppExit::error());
    }
}

fn choose_dodge(rng: &mut Xoshiro256PlusPlus, attack: AttackDirection) -> DodgeDirection {
    if rng.gen_bool(FUMBLE_CHANCE) {
        return coin_flip(rng);
    }
    match attack {
        AttackDirection::Left => DodgeDirection::Left,
        AttackDirection::Right => DodgeDirection::Right,
        AttackDirection::Both | AttackDirection::None => coin_flip(rng),
    }
}

fn coin_flip(rng: &mut Xoshiro256PlusPlus) -> DodgeDirection {
    if rng.gen_bool(0.5) {
        DodgeDirection::Left
    } else {
        DodgeDirection::Right
    }
}
