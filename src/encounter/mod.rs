//! Encounter: one run of the lineage boss fight.
//!
//! Owns every piece of combat state and a single scheduler clock. The driver
//! calls [`Encounter::tick`] once per frame; commands come in through the
//! player action methods and results go out as [`CombatNotice`]s.

pub mod combatant;
pub mod notice;
pub mod plugin;
pub mod turn;

use bevy::math::Vec2;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::combat::attack::{
    Animation, AttackAction, AttackDefinition, AttackKind, HitArea, VolleySide,
};
use crate::combat::damage::{resolve_damage, RevealTracker};
use crate::combat::dodge::{DodgeEngine, DodgeEvent, DodgeTiming};
use crate::combat::projectile::{Projectile, ProjectileStatus};
use crate::combat::selection::AttackSelector;
use crate::combat::{AttackDirection, DodgeDirection};
use crate::config::{ConfigError, EncounterConfig};
use crate::grid::{AnchorInputs, AnchorSource, GridModel};
use crate::lineage::{Advance, LineageError, LineageState};
use crate::scheduler::Scheduler;
use crate::seed::{RunSeed, RunStreams};
use crate::traits::{TraitCatalog, TraitColor, TraitType};

use combatant::{Boss, Player};
use notice::{Actor, CombatNotice, DamageSource, EffectKind, HudSnapshot};
use turn::{Transition, TurnMachine, TurnState};

/// Lifecycle of a run around its battles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    NotStarted,
    AwaitingTraitSelection,
    InBattle,
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("no trait selection is pending")]
    NotPending,
    #[error("trait {0:?} was not offered")]
    NotOffered(TraitType),
    #[error("trait {0:?} is already inherited")]
    AlreadyInherited(TraitType),
    #[error(transparent)]
    Lineage(#[from] LineageError),
}

/// Work queued on the encounter clock
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scheduled {
    TurnChange(TurnState),
    BeginEnemyAttack,
    AttackStep { attack_id: u64, action: AttackAction },
    EnemyTurnComplete,
    DeclareOutcome { victory: bool },
}

#[derive(Debug, Clone)]
struct ActiveAttack {
    id: u64,
    definition: AttackDefinition,
}

/// Upper bound on scheduler passes per tick
const MAX_STEPS_PER_TICK: usize = 1024;

pub struct Encounter {
    config: EncounterConfig,
    next_config: Option<EncounterConfig>,
    catalog: TraitCatalog,
    seed: RunSeed,
    runs_started: u32,
    streams: RunStreams,
    lineage: LineageState,
    weaknesses: Vec<TraitType>,
    hidden_critical: Option<TraitType>,
    reveals: RevealTracker,
    player: Player,
    boss: Boss,
    turn: TurnMachine,
    status: RunStatus,
    selector: AttackSelector,
    scheduler: Scheduler<Scheduled>,
    /// Bumped whenever pending work is discarded
    epoch: u64,
    dodge: DodgeEngine,
    active_attack: Option<ActiveAttack>,
    next_attack_id: u64,
    projectiles: Vec<Projectile>,
    next_projectile_id: u64,
    pending_offer: Option<Vec<TraitType>>,
    anchor: AnchorSource,
    arena_center: Option<Vec2>,
    notices: Vec<CombatNotice>,
}

impl Encounter {
    pub fn new(config: EncounterConfig, catalog: TraitCatalog) -> Self {
        let seed = RunSeed::new(config.seed);
        let dodge_timing = DodgeTiming::from_config(&config.timing, config.dodge_distance());
        Self {
            next_config: None,
            streams: RunStreams::from_seed(&seed),
            seed,
            runs_started: 0,
            lineage: LineageState::new(config.max_generations()),
            weaknesses: Vec::new(),
            hidden_critical: None,
            reveals: RevealTracker::default(),
            player: Player::from_traits(&catalog, &config.player, &[]),
            boss: Boss::new(&config.boss),
            turn: TurnMachine::new(),
            status: RunStatus::NotStarted,
            selector: AttackSelector::new(config.boss.selection),
            scheduler: Scheduler::new(),
            epoch: 0,
            dodge: DodgeEngine::new(dodge_timing),
            active_attack: None,
            next_attack_id: 0,
            projectiles: Vec::new(),
            next_projectile_id: 0,
            pending_offer: None,
            anchor: AnchorSource::Default,
            arena_center: None,
            notices: Vec::new(),
            catalog,
            config,
        }
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    pub fn config(&self) -> &EncounterConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TraitCatalog {
        &self.catalog
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn turn_state(&self) -> TurnState {
        self.turn.state()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn boss(&self) -> &Boss {
        &self.boss
    }

    pub fn lineage(&self) -> &LineageState {
        &self.lineage
    }

    pub fn weaknesses(&self) -> &[TraitType] {
        &self.weaknesses
    }

    pub fn hidden_critical(&self) -> Option<TraitType> {
        self.hidden_critical
    }

    pub fn pending_offer(&self) -> Option<&[TraitType]> {
        self.pending_offer.as_deref()
    }

    pub fn current_attack_direction(&self) -> AttackDirection {
        self.boss.current_direction
    }

    pub fn current_attack_kind(&self) -> Option<AttackKind> {
        self.boss.current_kind
    }

    pub fn dodge(&self) -> &DodgeEngine {
        &self.dodge
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn anchor_source(&self) -> AnchorSource {
        self.anchor
    }

    /// Display colour of the hidden critical trait
    pub fn critical_trait_hint(&self) -> Option<TraitColor> {
        self.hidden_critical
            .and_then(|t| self.catalog.get(t))
            .map(|t| t.color)
    }

    /// Live player position: home plus any dodge offset
    pub fn player_position(&self) -> Vec2 {
        self.player.home + Vec2::new(self.dodge.offset(), 0.0)
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            player_health: self.player.health.current,
            player_max_health: self.player.health.max,
            boss_health: self.boss.health.current,
            boss_max_health: self.boss.health.max,
            generation: self.lineage.current_generation(),
            max_generations: self.lineage.max_generations(),
            charge_stacks: self.player.charge_stacks,
            dodge_streak: self.player.streak.count(),
            turn: self.turn.state(),
            revealed_weaknesses: self
                .weaknesses
                .iter()
                .filter(|t| self.reveals.is_weakness_revealed(**t))
                .count() as u32,
            critical_revealed: self.reveals.is_critical_revealed(),
        }
    }

    pub fn drain_notices(&mut self) -> Vec<CombatNotice> {
        std::mem::take(&mut self.notices)
    }

    // -----------------------------------------------------------------
    // Environment inputs
    // -----------------------------------------------------------------

    /// Arena-centre marker used as grid anchor when no fixed anchor is set
    pub fn set_arena_center(&mut self, center: Option<Vec2>) {
        self.arena_center = center;
    }

    /// Stage a new config; it takes effect at the next `start_new_game`
    pub fn apply_config(&mut self, config: EncounterConfig) -> Result<(), ConfigError> {
        config.validate()?;
        info!(seed = config.seed, "config staged for next run");
        self.next_config = Some(config);
        Ok(())
    }

    fn anchor_inputs(&self) -> AnchorInputs {
        AnchorInputs {
            arena_center: self.arena_center,
            defender: Some(self.player.home),
        }
    }

    // -----------------------------------------------------------------
    // Run lifecycle
    // -----------------------------------------------------------------

    /// Begin a fresh run: new weaknesses, new lineage, full-health boss
    pub fn start_new_game(&mut self) {
        if let Some(config) = self.next_config.take() {
            if config.seed != self.config.seed {
                self.seed = RunSeed::new(config.seed);
                self.runs_started = 0;
            }
            self.selector = AttackSelector::new(config.boss.selection);
            self.config = config;
        }
        self.seed.run_index = self.runs_started;
        self.runs_started = self.runs_started.wrapping_add(1);
        self.streams = RunStreams::from_seed(&self.seed);

        self.weaknesses = match &self.config.boss.fixed_weaknesses {
            Some(fixed) => fixed.clone(),
            None => self
                .catalog
                .sample(self.config.boss.weakness_count, &mut self.streams.weaknesses),
        };
        self.hidden_critical = self.config.boss.fixed_critical.or_else(|| {
            let all: Vec<TraitType> = self.catalog.types().collect();
            all.choose(&mut self.streams.critical).copied()
        });
        self.reveals.reset();

        // No side acts until a trait is picked and the battle starts
        if let Some(transition) = self.turn.game_over() {
            self.push_transition(transition);
        }
        self.lineage.start_new_game(self.config.max_generations());
        self.boss = Boss::new(&self.config.boss);
        self.player = Player::from_traits(&self.catalog, &self.config.player, &[]);
        self.dodge = DodgeEngine::new(DodgeTiming::from_config(
            &self.config.timing,
            self.config.dodge_distance(),
        ));
        self.clear_battle_state();
        self.anchor = AnchorSource::resolve(self.config.grid.anchor, &self.anchor_inputs());

        info!(
            seed = self.seed.seed,
            run = self.seed.run_index,
            weaknesses = ?self.weaknesses,
            max_generations = self.lineage.max_generations(),
            "new game started"
        );
        debug!(critical = ?self.hidden_critical, "hidden critical trait chosen");

        self.notices.push(CombatNotice::GenerationChanged {
            generation: self.lineage.current_generation(),
            traits: Vec::new(),
        });
        self.offer_traits();
    }

    fn offer_traits(&mut self) {
        let offer = self.catalog.offer(
            self.lineage.inherited_traits(),
            self.config.boss.trait_offer_count,
            &mut self.streams.offers,
        );
        if offer.is_empty() {
            warn!(
                generation = self.lineage.current_generation(),
                "trait pool exhausted, starting battle without a new trait"
            );
            self.pending_offer = None;
            self.start_battle();
            return;
        }
        debug!(options = ?offer, "trait selection offered");
        self.status = RunStatus::AwaitingTraitSelection;
        self.notices.push(CombatNotice::ShowTraitSelection {
            options: offer.clone(),
        });
        self.pending_offer = Some(offer);
    }

    /// Pick one of the offered traits and start the next battle
    pub fn select_trait(&mut self, trait_type: TraitType) -> Result<(), SelectionError> {
        let result = self.check_selection(trait_type);
        if let Err(err) = &result {
            warn!(trait_type = trait_type.as_str(), error = %err, "trait selection rejected");
            return result;
        }
        self.lineage.add_trait(trait_type)?;
        self.pending_offer = None;
        self.notices.push(CombatNotice::GenerationChanged {
            generation: self.lineage.current_generation(),
            traits: self.lineage.inherited_traits().to_vec(),
        });
        self.start_battle();
        Ok(())
    }

    fn check_selection(&self, trait_type: TraitType) -> Result<(), SelectionError> {
        let offer = self
            .pending_offer
            .as_ref()
            .filter(|_| self.status == RunStatus::AwaitingTraitSelection)
            .ok_or(SelectionError::NotPending)?;
        if self.lineage.has_trait(trait_type) {
            return Err(SelectionError::AlreadyInherited(trait_type));
        }
        if !offer.contains(&trait_type) {
            return Err(SelectionError::NotOffered(trait_type));
        }
        Ok(())
    }

    fn clear_battle_state(&mut self) {
        self.scheduler.clear();
        self.epoch = self.epoch.wrapping_add(1);
        self.dodge.reset();
        self.active_attack = None;
        self.projectiles.clear();
        self.boss.stand_down();
    }

    fn start_battle(&mut self) {
        self.player = Player::from_traits(
            &self.catalog,
            &self.config.player,
            self.lineage.inherited_traits(),
        );
        self.clear_battle_state();
        let transition = self.turn.reset();
        self.status = RunStatus::InBattle;
        info!(
            generation = self.lineage.current_generation(),
            player_health = self.player.health.max,
            player_attack = self.player.attack_power,
            boss_health = self.boss.health.current,
            "battle started"
        );
        self.push_transition(transition);
        self.push_hud();
    }

    // -----------------------------------------------------------------
    // Player commands
    // -----------------------------------------------------------------

    fn can_act(&self) -> bool {
        self.status == RunStatus::InBattle
            && self.turn.state() == TurnState::PlayerTurn
            && !self.turn.has_pending()
    }

    /// Strike the boss with charged attack power and end the turn
    pub fn player_attack(&mut self) -> bool {
        if !self.can_act() {
            debug!(turn = self.turn.state().as_str(), "attack ignored");
            return false;
        }
        let base = self.player.take_charged_attack();
        let outcome = resolve_damage(
            base,
            self.lineage.inherited_traits(),
            &self.weaknesses,
            self.hidden_critical,
            &self.config.damage,
        );
        let reveals = self.reveals.observe(&outcome, self.hidden_critical);
        for weakness in reveals.weaknesses {
            info!(trait_type = weakness.as_str(), "weakness revealed");
            self.notices.push(CombatNotice::WeaknessRevealed(weakness));
        }
        if let Some(critical) = reveals.critical {
            info!(trait_type = critical.as_str(), "critical trait revealed");
            self.notices.push(CombatNotice::CriticalTraitRevealed(critical));
        }

        self.notices.push(CombatNotice::PlayAnimation {
            actor: Actor::Player,
            animation: Animation::Attack,
        });
        self.notices.push(CombatNotice::SpawnEffect {
            effect: EffectKind::Slash,
            position: self.boss.position,
        });
        debug!(
            base,
            damage = outcome.final_damage,
            multiplier = outcome.multiplier,
            critical = outcome.critical,
            "player attack"
        );

        let killed = self.damage_boss(
            outcome.final_damage,
            DamageSource::PlayerAttack,
            outcome.multiplier,
            outcome.critical,
        );
        if !killed {
            self.end_player_turn();
        }
        self.push_hud();
        true
    }

    /// Bank a charge stack and end the turn
    pub fn player_charge(&mut self) -> bool {
        if !self.can_act() {
            debug!(turn = self.turn.state().as_str(), "charge ignored");
            return false;
        }
        let stacks = self.player.add_charge(self.config.player.max_charge_stacks);
        debug!(stacks, "player charged");
        self.end_player_turn();
        self.push_hud();
        true
    }

    /// Dodge toward `direction`. Only accepted during the enemy's turn.
    pub fn dodge_input(&mut self, direction: DodgeDirection) -> bool {
        if self.status != RunStatus::InBattle {
            return false;
        }
        let bonus = self.catalog.dodge_time_bonus(self.lineage.inherited_traits());
        if !self
            .dodge
            .try_start(direction, self.turn.state().is_enemy_phase(), bonus)
        {
            return false;
        }
        if let Some(transition) = self.turn.enter_dodging() {
            self.push_transition(transition);
        }
        self.notices.push(CombatNotice::PlayAnimation {
            actor: Actor::Player,
            animation: Animation::Dodge,
        });
        true
    }

    /// Ask to hand the turn to the enemy. Ignored unless it is the player's turn.
    pub fn end_player_turn(&mut self) -> bool {
        if self.status != RunStatus::InBattle {
            debug!(status = ?self.status, "end of player turn ignored outside battle");
            return false;
        }
        if !self.turn.request(TurnState::EnemyTurn) {
            return false;
        }
        self.scheduler.schedule_in(
            self.config.timing.turn_delay,
            Scheduled::TurnChange(TurnState::EnemyTurn),
        );
        true
    }

    /// Ask to hand the turn back to the player. Ignored outside the enemy phase.
    pub fn end_enemy_turn(&mut self) -> bool {
        if self.status != RunStatus::InBattle {
            debug!(status = ?self.status, "end of enemy turn ignored outside battle");
            return false;
        }
        if !self.turn.request(TurnState::PlayerTurn) {
            return false;
        }
        self.scheduler.schedule_in(
            self.config.timing.turn_delay,
            Scheduled::TurnChange(TurnState::PlayerTurn),
        );
        true
    }

    // -----------------------------------------------------------------
    // Clock
    // -----------------------------------------------------------------

    /// Advance the encounter by `dt` seconds.
    ///
    /// The step is split at every scheduler deadline so dodge windows and
    /// projectiles are exactly where they should be when a hit lands.
    pub fn tick(&mut self, dt: f32) {
        let mut remaining = f64::from(dt.max(0.0));
        for _ in 0..MAX_STEPS_PER_TICK {
            let step = self
                .scheduler
                .next_deadline_in()
                .filter(|d| *d <= remaining)
                .unwrap_or(remaining);

            self.advance_dodge(step as f32);
            self.advance_projectiles(step as f32);
            self.scheduler.advance(step);
            remaining -= step;

            let epoch = self.epoch;
            for entry in self.scheduler.pop_due() {
                // A battle reset mid-batch makes the rest stale
                if self.epoch != epoch {
                    break;
                }
                self.handle(entry);
            }
            if remaining <= 0.0 && self.scheduler.next_deadline_in() != Some(0.0) {
                return;
            }
        }
        warn!("tick step limit reached");
    }

    fn advance_dodge(&mut self, dt: f32) {
        for event in self.dodge.tick(dt) {
            if event == DodgeEvent::WindowEnded {
                if let Some(transition) = self.turn.leave_dodging() {
                    self.push_transition(transition);
                }
            }
        }
    }

    fn advance_projectiles(&mut self, dt: f32) {
        if self.projectiles.is_empty() || dt <= 0.0 {
            return;
        }
        let epoch = self.epoch;
        let mut projectiles = std::mem::take(&mut self.projectiles);
        projectiles.retain_mut(|p| {
            if self.epoch != epoch {
                return false;
            }
            let target = self.player_position();
            match p.advance(dt, target) {
                ProjectileStatus::Flying => true,
                ProjectileStatus::Expired => {
                    debug!(id = p.id, "projectile expired");
                    false
                }
                ProjectileStatus::Contact => self.projectile_contact(p),
            }
        });
        if self.epoch == epoch {
            projectiles.append(&mut self.projectiles);
            self.projectiles = projectiles;
        }
    }

    /// Returns whether the projectile keeps flying
    fn projectile_contact(&mut self, projectile: &mut Projectile) -> bool {
        if self.turn.state() == TurnState::GameOver {
            return false;
        }
        if let Some(judgement) = self.dodge.judge(projectile.direction) {
            if judgement.first {
                self.record_dodge(judgement.correct);
            }
            if judgement.correct {
                debug!(id = projectile.id, "projectile passed through dodge");
                projectile.pass_through();
                return true;
            }
        }
        self.notices.push(CombatNotice::SpawnEffect {
            effect: EffectKind::ProjectileImpact,
            position: projectile.position,
        });
        self.damage_player(projectile.damage, DamageSource::Projectile);
        false
    }

    fn handle(&mut self, entry: Scheduled) {
        match entry {
            Scheduled::TurnChange(target) => {
                if let Some(transition) = self.turn.commit(target) {
                    self.push_transition(transition);
                    match transition.to {
                        TurnState::EnemyTurn => self.begin_enemy_turn(),
                        TurnState::PlayerTurn => self.push_hud(),
                        _ => {}
                    }
                }
            }
            Scheduled::BeginEnemyAttack => self.begin_enemy_attack(),
            Scheduled::AttackStep { attack_id, action } => self.run_attack_step(attack_id, action),
            Scheduled::EnemyTurnComplete => self.complete_enemy_turn(),
            Scheduled::DeclareOutcome { victory } => self.declare_outcome(victory),
        }
    }

    // -----------------------------------------------------------------
    // Enemy turn
    // -----------------------------------------------------------------

    fn begin_enemy_turn(&mut self) {
        self.notices.push(CombatNotice::AttackIndicator { visible: true });
        self.scheduler
            .schedule_in(self.config.timing.telegraph, Scheduled::BeginEnemyAttack);
    }

    fn begin_enemy_attack(&mut self) {
        if !self.turn.state().is_enemy_phase() {
            return;
        }
        self.notices.push(CombatNotice::AttackIndicator { visible: false });
        let selected = self
            .selector
            .select_next_attack(&self.config.boss.attacks, &mut self.streams.attacks);
        debug!(policy = ?self.selector.policy(), selected = ?selected, "boss attack selected");
        let started = match selected {
            Some(kind) => self.execute_attack(kind),
            None => false,
        };
        if !started {
            warn!("boss could not start an attack, ending its turn");
            self.scheduler.schedule_in(0.0, Scheduled::EnemyTurnComplete);
        }
    }

    /// Queue every step of `kind`. Refused while another attack is running.
    pub fn execute_attack(&mut self, kind: AttackKind) -> bool {
        if self.boss.busy {
            debug!(kind = kind.as_str(), "attack refused, boss busy");
            return false;
        }
        if self.status != RunStatus::InBattle || self.turn.state() == TurnState::GameOver {
            debug!(kind = kind.as_str(), status = ?self.status, "attack refused outside battle");
            return false;
        }
        let definition = AttackDefinition::build(
            kind,
            &self.config.timing,
            &self.config.damage,
            self.config.grid.swipe_columns,
        );
        let id = self.next_attack_id;
        self.next_attack_id += 1;
        for step in &definition.steps {
            self.scheduler.schedule_in(
                step.at,
                Scheduled::AttackStep {
                    attack_id: id,
                    action: step.action,
                },
            );
        }
        info!(
            kind = kind.as_str(),
            direction = definition.direction.as_str(),
            duration = definition.duration(),
            at = self.scheduler.now(),
            "boss attack"
        );
        self.boss.busy = true;
        self.boss.current_kind = Some(kind);
        self.active_attack = Some(ActiveAttack { id, definition });
        true
    }

    fn run_attack_step(&mut self, attack_id: u64, action: AttackAction) {
        let Some(active) = self.active_attack.as_ref().filter(|a| a.id == attack_id) else {
            debug!(attack_id, "stale attack step dropped");
            return;
        };
        let direction = active.definition.direction;
        let animation = active.definition.animation;
        let recovery = active.definition.recovery;

        match action {
            AttackAction::Begin => {
                self.boss.current_direction = direction;
                self.notices.push(CombatNotice::PlayAnimation {
                    actor: Actor::Boss,
                    animation,
                });
            }
            AttackAction::LightningVolley(side) => self.spawn_lightning(side),
            AttackAction::Hit { repetition } => {
                debug!(repetition, "attack repetition");
                self.evaluate_hit();
            }
            AttackAction::LaunchProjectile => self.launch_projectile(),
            AttackAction::Finish => {
                self.boss.stand_down();
                self.active_attack = None;
                self.notices.push(CombatNotice::PlayAnimation {
                    actor: Actor::Boss,
                    animation: Animation::Idle,
                });
                self.scheduler
                    .schedule_in(recovery, Scheduled::EnemyTurnComplete);
            }
        }
    }

    fn spawn_lightning(&mut self, side: VolleySide) {
        let anchor = self.anchor.position(&self.anchor_inputs());
        let offset = self.config.grid.spacing;
        let sides: &[(VolleySide, f32)] = match side {
            VolleySide::Left => &[(VolleySide::Left, -1.0)],
            VolleySide::Right => &[(VolleySide::Right, 1.0)],
            VolleySide::Both => &[(VolleySide::Left, -1.0), (VolleySide::Right, 1.0)],
        };
        for (side, sign) in sides {
            self.notices.push(CombatNotice::SpawnEffect {
                effect: EffectKind::Lightning(*side),
                position: anchor + Vec2::new(sign * offset, 0.0),
            });
        }
    }

    fn launch_projectile(&mut self) {
        let id = self.next_projectile_id;
        self.next_projectile_id += 1;
        let projectile = Projectile::launch(
            id,
            self.boss.position,
            self.player_position(),
            &self.config.projectile,
        );
        self.notices.push(CombatNotice::SpawnEffect {
            effect: EffectKind::ProjectileLaunch,
            position: self.boss.position,
        });
        debug!(id, "projectile launched");
        self.projectiles.push(projectile);
    }

    /// Animation-event hook: evaluate the running attack's hit area now
    pub fn on_attack_frame(&mut self) -> bool {
        let has_area = self
            .active_attack
            .as_ref()
            .is_some_and(|a| a.definition.hit_area != HitArea::None);
        if !has_area {
            debug!("attack frame with no grid attack in progress");
            return false;
        }
        self.evaluate_hit();
        true
    }

    /// One repetition: sample the defender once, test every cell, apply at
    /// most one damage
    fn evaluate_hit(&mut self) {
        let Some(active) = self.active_attack.as_ref() else {
            return;
        };
        let kind = active.definition.kind;
        let area = active.definition.hit_area;
        let factor = active.definition.damage_factor;

        let grid = GridModel {
            cols: self.config.grid.cols,
            rows: self.config.grid.rows,
            spacing: self.config.grid.spacing,
        }
        .cells(self.anchor.position(&self.anchor_inputs()));
        let cells = area.cells(&grid);

        let impact = if area == HitArea::All {
            EffectKind::SpecialImpact
        } else {
            EffectKind::SwipeImpact
        };
        for cell in &cells {
            if let Some(position) = grid.center(cell.col, cell.row) {
                self.notices.push(CombatNotice::SpawnEffect {
                    effect: impact,
                    position,
                });
            }
        }

        let position = self.player_position();
        let occupying = grid.occupies_any(&cells, position);
        let direction = self.boss.current_direction;

        let takes_hit = match self.dodge.judge(direction) {
            Some(judgement) => {
                if judgement.first {
                    self.record_dodge(judgement.correct);
                }
                !judgement.correct && occupying
            }
            None => occupying,
        };
        debug!(
            kind = kind.as_str(),
            occupying,
            takes_hit,
            x = position.x,
            y = position.y,
            "hit evaluated"
        );
        if takes_hit {
            let base = (self.boss.attack_power as f32 * factor).round() as i32;
            self.damage_player(base, DamageSource::BossAttack(kind));
        }
    }

    fn record_dodge(&mut self, correct: bool) {
        let Some(direction) = self.dodge.direction() else {
            return;
        };
        let streak = if correct {
            self.player.streak.record_success()
        } else {
            self.player.streak.reset();
            0
        };
        debug!(direction = direction.as_str(), correct, streak, "dodge judged");
        self.notices.push(CombatNotice::DodgeResolved {
            direction,
            success: correct,
            streak,
        });
    }

    fn complete_enemy_turn(&mut self) {
        if !self.turn.state().is_enemy_phase() {
            return;
        }
        let threshold = self.config.player.counter_streak_threshold;
        if let Some((bonus, streak)) = self.player.streak.spend(self.player.attack_power, threshold) {
            info!(streak, damage = bonus, "counter-attack");
            self.notices.push(CombatNotice::CounterAttack {
                streak,
                damage: bonus,
            });
            self.notices.push(CombatNotice::PlayAnimation {
                actor: Actor::Player,
                animation: Animation::Attack,
            });
            if self.damage_boss(bonus, DamageSource::CounterAttack, 1.0, false) {
                return;
            }
        }
        self.end_enemy_turn();
    }

    // -----------------------------------------------------------------
    // Damage and death
    // -----------------------------------------------------------------

    /// Returns true when the boss died
    fn damage_boss(&mut self, amount: i32, source: DamageSource, multiplier: f32, critical: bool) -> bool {
        let hit = self.boss.apply_damage(amount, &self.config.boss);
        self.notices.push(CombatNotice::DamageDealt {
            target: Actor::Boss,
            source,
            amount: hit.dealt,
            multiplier,
            critical,
        });
        if hit.enraged {
            info!(attack_power = self.boss.attack_power, "boss enraged");
            self.notices.push(CombatNotice::BossEnraged {
                attack_power: self.boss.attack_power,
            });
        }
        if hit.killed {
            self.boss_defeated();
        }
        hit.killed
    }

    fn damage_player(&mut self, base: i32, source: DamageSource) {
        if self.status != RunStatus::InBattle {
            return;
        }
        let outcome = resolve_damage(base, &[], &[], None, &self.config.damage);
        let dealt = self.player.health.take_damage(outcome.final_damage);
        self.player.streak.reset();
        self.notices.push(CombatNotice::DamageDealt {
            target: Actor::Player,
            source,
            amount: dealt,
            multiplier: outcome.multiplier,
            critical: false,
        });
        self.notices.push(CombatNotice::PlayAnimation {
            actor: Actor::Player,
            animation: Animation::Hurt,
        });
        debug!(damage = dealt, health = self.player.health.current, "player hit");
        self.push_hud();
        if !self.player.health.is_alive() {
            self.player_defeated();
        }
    }

    fn player_defeated(&mut self) {
        info!(generation = self.lineage.current_generation(), "player died");
        if let Some(transition) = self.turn.game_over() {
            self.push_transition(transition);
        }
        self.clear_battle_state();
        match self.lineage.advance_generation() {
            Advance::Next(generation) => {
                self.notices.push(CombatNotice::GenerationChanged {
                    generation,
                    traits: self.lineage.inherited_traits().to_vec(),
                });
                self.offer_traits();
            }
            Advance::Exhausted => {
                info!("lineage exhausted, run lost");
                self.status = RunStatus::Defeat;
                self.notices.push(CombatNotice::ShowGameOver { victory: false });
            }
            Advance::AlreadyExhausted => {}
        }
    }

    fn boss_defeated(&mut self) {
        info!(generation = self.lineage.current_generation(), "boss defeated");
        if let Some(transition) = self.turn.game_over() {
            self.push_transition(transition);
        }
        self.clear_battle_state();
        self.notices.push(CombatNotice::PlayAnimation {
            actor: Actor::Boss,
            animation: Animation::Death,
        });
        self.scheduler.schedule_in(
            self.config.timing.death_delay,
            Scheduled::DeclareOutcome { victory: true },
        );
    }

    fn declare_outcome(&mut self, victory: bool) {
        self.status = if victory {
            RunStatus::Victory
        } else {
            RunStatus::Defeat
        };
        info!(victory, "run finished");
        self.notices.push(CombatNotice::ShowGameOver { victory });
    }

    fn push_transition(&mut self, transition: Transition) {
        debug!(
            from = transition.from.as_str(),
            to = transition.to.as_str(),
            "turn changed"
        );
        self.notices.push(CombatNotice::TurnChanged {
            from: transition.from,
            to: transition.to,
        });
    }

    fn push_hud(&mut self) {
        let hud = self.hud();
        self.notices.push(CombatNotice::UpdateHud(hud));
    }
}
