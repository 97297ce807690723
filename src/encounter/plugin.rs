//! Bevy integration for the encounter.
//!
//! The encounter lives in a single resource mutated by one chained system set:
//! commands in, clock tick, notices out.

use bevy::prelude::*;

use super::notice::CombatNotice;
use super::Encounter;
use crate::combat::DodgeDirection;
use crate::config::EncounterConfig;
use crate::hotreload::ConfigReloadEvent;
use crate::traits::{TraitCatalog, TraitType};

pub struct EncounterPlugin {
    pub config: EncounterConfig,
    /// Call `start_new_game` on startup
    pub auto_start: bool,
}

impl Default for EncounterPlugin {
    fn default() -> Self {
        Self {
            config: EncounterConfig::default(),
            auto_start: true,
        }
    }
}

impl Plugin for EncounterPlugin {
    fn build(&self, app: &mut App) {
        let encounter = Encounter::new(self.config.clone(), TraitCatalog::standard());

        app.insert_resource(EncounterResource(encounter))
            .init_resource::<ArenaCenter>()
            .add_event::<PlayerCommand>()
            .add_event::<CombatNoticeEvent>()
            .add_event::<ConfigReloadEvent>()
            .add_systems(
                Update,
                (
                    stage_reloaded_config,
                    apply_player_commands,
                    tick_encounter,
                    forward_notices,
                )
                    .chain(),
            );

        if self.auto_start {
            app.add_systems(Startup, start_encounter);
        }
    }
}

#[derive(Resource)]
pub struct EncounterResource(pub Encounter);

/// Optional arena-centre marker position, read live as the grid anchor
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct ArenaCenter(pub Option<Vec2>);

/// Incoming player commands
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Attack,
    Charge,
    Dodge(DodgeDirection),
    SelectTrait(TraitType),
    Restart,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub struct CombatNoticeEvent(pub CombatNotice);

fn start_encounter(arena: Res<ArenaCenter>, mut encounter: ResMut<EncounterResource>) {
    // The anchor source is fixed when a game starts
    encounter.0.set_arena_center(arena.0);
    encounter.0.start_new_game();
}

fn stage_reloaded_config(
    mut reloads: EventReader<ConfigReloadEvent>,
    mut encounter: ResMut<EncounterResource>,
) {
    for event in reloads.read() {
        let Some(config) = event.config.as_ref().filter(|_| event.success) else {
            continue;
        };
        if let Err(e) = encounter.0.apply_config(config.clone()) {
            tracing::warn!(error = %e, "reloaded config rejected");
        }
    }
}

fn apply_player_commands(
    mut commands: EventReader<PlayerCommand>,
    arena: Res<ArenaCenter>,
    mut encounter: ResMut<EncounterResource>,
) {
    for command in commands.read() {
        let encounter = &mut encounter.0;
        let accepted = match *command {
            PlayerCommand::Attack => encounter.player_attack(),
            PlayerCommand::Charge => encounter.player_charge(),
            PlayerCommand::Dodge(direction) => encounter.dodge_input(direction),
            PlayerCommand::SelectTrait(trait_type) => encounter.select_trait(trait_type).is_ok(),
            PlayerCommand::Restart => {
                encounter.set_arena_center(arena.0);
                encounter.start_new_game();
                true
            }
        };
        tracing::debug!(?command, accepted, "player command");
    }
}

fn tick_encounter(
    time: Res<Time>,
    arena: Res<ArenaCenter>,
    mut encounter: ResMut<EncounterResource>,
) {
    encounter.0.set_arena_center(arena.0);
    encounter.0.tick(time.delta_secs());
}

fn forward_notices(
    mut encounter: ResMut<EncounterResource>,
    mut notices: EventWriter<CombatNoticeEvent>,
) {
    for notice in encounter.0.drain_notices() {
        notices.send(CombatNoticeEvent(notice));
    }
}
