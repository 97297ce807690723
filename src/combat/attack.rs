//! Boss attack definitions and their timed schedules.
//!
//! An attack is a list of steps at fixed offsets from its start. The encounter
//! queues every step on its scheduler when the attack begins, so one attack is
//! always played out in full.

use serde::{Deserialize, Serialize};

use super::AttackDirection;
use crate::config::{DamageConfig, TimingConfig};
use crate::grid::{Cell, CellGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    Projectile,
    LeftSwipe,
    RightSwipe,
    SpecialAttack,
    TripleLeftSwipe,
    TripleRightSwipe,
}

impl AttackKind {
    pub const ALL: [AttackKind; 6] = [
        AttackKind::Projectile,
        AttackKind::LeftSwipe,
        AttackKind::RightSwipe,
        AttackKind::SpecialAttack,
        AttackKind::TripleLeftSwipe,
        AttackKind::TripleRightSwipe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Projectile => "projectile",
            Self::LeftSwipe => "left_swipe",
            Self::RightSwipe => "right_swipe",
            Self::SpecialAttack => "special_attack",
            Self::TripleLeftSwipe => "triple_left_swipe",
            Self::TripleRightSwipe => "triple_right_swipe",
        }
    }

    pub fn is_triple(&self) -> bool {
        matches!(self, Self::TripleLeftSwipe | Self::TripleRightSwipe)
    }

    /// Escape side published while this attack runs
    pub fn direction(&self) -> AttackDirection {
        match self {
            Self::LeftSwipe | Self::TripleLeftSwipe => AttackDirection::Right,
            Self::RightSwipe | Self::TripleRightSwipe => AttackDirection::Left,
            Self::Projectile | Self::SpecialAttack => AttackDirection::Both,
        }
    }

    pub fn animation(&self) -> Animation {
        match self {
            Self::Projectile => Animation::Attack,
            Self::LeftSwipe => Animation::LeftSwipe,
            Self::RightSwipe => Animation::RightSwipe,
            Self::SpecialAttack => Animation::SpecialAttack,
            Self::TripleLeftSwipe => Animation::TripleLeftSwipe,
            Self::TripleRightSwipe => Animation::TripleRightSwipe,
        }
    }
}

/// Animation clips the core asks the presentation layer to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Animation {
    Idle,
    Attack,
    LeftSwipe,
    RightSwipe,
    TripleLeftSwipe,
    TripleRightSwipe,
    SpecialAttack,
    Dodge,
    Hurt,
    Death,
}

/// Side of the arena a lightning volley lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolleySide {
    Left,
    Right,
    Both,
}

/// Cells an attack covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitArea {
    None,
    LeftColumns(usize),
    RightColumns(usize),
    All,
}

impl HitArea {
    pub fn cells(&self, grid: &CellGrid) -> Vec<Cell> {
        match self {
            Self::None => Vec::new(),
            Self::LeftColumns(n) => grid.left_columns(*n),
            Self::RightColumns(n) => grid.right_columns(*n),
            Self::All => grid.all_cells(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackAction {
    /// Publish the direction and start the animation
    Begin,
    /// Warning lightning ahead of a hit
    LightningVolley(VolleySide),
    /// Evaluate the hit area once
    Hit { repetition: u32 },
    LaunchProjectile,
    /// Clear the direction and return to idle
    Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackStep {
    pub at: f32,
    pub action: AttackAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackDefinition {
    pub kind: AttackKind,
    pub direction: AttackDirection,
    pub animation: Animation,
    pub hit_area: HitArea,
    pub steps: Vec<AttackStep>,
    /// Wait after `Finish` before the enemy turn ends
    pub recovery: f32,
    pub damage_factor: f32,
}

impl AttackDefinition {
    pub fn build(
        kind: AttackKind,
        timing: &TimingConfig,
        damage: &DamageConfig,
        swipe_columns: usize,
    ) -> Self {
        let step = |at: f32, action: AttackAction| AttackStep { at, action };
        let lead = timing.swipe_lead_in;
        let anim = timing.attack_animation;
        let swipe_hit = lead + anim * crate::constants::SWIPE_HIT_FRACTION;

        let (hit_area, steps, damage_factor) = match kind {
            AttackKind::LeftSwipe | AttackKind::RightSwipe => {
                let (area, side) = swipe_area(kind, swipe_columns);
                (
                    area,
                    vec![
                        step(0.0, AttackAction::Begin),
                        step(lead, AttackAction::LightningVolley(side)),
                        step(swipe_hit, AttackAction::Hit { repetition: 0 }),
                        step(lead + anim, AttackAction::Finish),
                    ],
                    1.0,
                )
            }
            AttackKind::TripleLeftSwipe | AttackKind::TripleRightSwipe => {
                let (area, side) = swipe_area(kind, swipe_columns);
                let interval = timing.triple_swipe_interval;
                let mut steps = vec![step(0.0, AttackAction::Begin)];
                for i in 0..3u32 {
                    let offset = interval * i as f32;
                    steps.push(step(lead + offset, AttackAction::LightningVolley(side)));
                    steps.push(step(swipe_hit + offset, AttackAction::Hit { repetition: i }));
                }
                let last_hit = swipe_hit + interval * 2.0;
                steps.push(step(
                    last_hit + anim + timing.triple_swipe_tail,
                    AttackAction::Finish,
                ));
                steps.sort_by(|a, b| a.at.total_cmp(&b.at));
                (area, steps, 1.0)
            }
            AttackKind::Projectile => (
                HitArea::None,
                vec![
                    step(0.0, AttackAction::Begin),
                    step(
                        anim * crate::constants::SWIPE_HIT_FRACTION,
                        AttackAction::LaunchProjectile,
                    ),
                    step(anim, AttackAction::Finish),
                ],
                1.0,
            ),
            AttackKind::SpecialAttack => {
                let special = timing.special_animation;
                (
                    HitArea::All,
                    vec![
                        step(0.0, AttackAction::Begin),
                        step(lead, AttackAction::LightningVolley(VolleySide::Both)),
                        step(
                            lead + special * crate::constants::SPECIAL_HIT_FRACTION,
                            AttackAction::Hit { repetition: 0 },
                        ),
                        step(lead + special, AttackAction::Finish),
                    ],
                    damage.special_damage_factor,
                )
            }
        };

        let recovery = if kind.is_triple() {
            timing.triple_attack_recovery
        } else {
            timing.attack_recovery
        };

        Self {
            kind,
            direction: kind.direction(),
            animation: kind.animation(),
            hit_area,
            steps,
            recovery,
            damage_factor,
        }
    }

    /// Offset of the `Finish` step
    pub fn duration(&self) -> f32 {
        self.steps
            .iter()
            .filter(|s| s.action == AttackAction::Finish)
            .map(|s| s.at)
            .fold(0.0, f32::max)
    }

    pub fn hit_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.action, AttackAction::Hit { .. }))
            .count()
    }
}

/// A left swipe covers the left columns and lightning lands on the left
fn swipe_area(kind: AttackKind, columns: usize) -> (HitArea, VolleySide) {
    match kind {
        AttackKind::LeftSwipe | AttackKind::TripleLeftSwipe => {
            (HitArea::LeftColumns(columns), VolleySide::Left)
        }
        _ => (HitArea::RightColumns(columns), VolleySide::Right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridModel;
    use bevy::math::Vec2;

    fn build(kind: AttackKind) -> AttackDefinition {
        AttackDefinition::build(kind, &TimingConfig::default(), &DamageConfig::default(), 2)
    }

    fn times(def: &AttackDefinition, pred: impl Fn(&AttackAction) -> bool) -> Vec<f32> {
        def.steps
            .iter()
            .filter(|s| pred(&s.action))
            .map(|s| s.at)
            .collect()
    }

    fn approx(a: &[f32], b: &[f32]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_direction_is_escape_side() {
        assert_eq!(AttackKind::LeftSwipe.direction(), AttackDirection::Right);
        assert_eq!(AttackKind::TripleLeftSwipe.direction(), AttackDirection::Right);
        assert_eq!(AttackKind::RightSwipe.direction(), AttackDirection::Left);
        assert_eq!(AttackKind::TripleRightSwipe.direction(), AttackDirection::Left);
        assert_eq!(AttackKind::Projectile.direction(), AttackDirection::Both);
        assert_eq!(AttackKind::SpecialAttack.direction(), AttackDirection::Both);
    }

    #[test]
    fn test_left_swipe_schedule() {
        let def = build(AttackKind::LeftSwipe);
        assert_eq!(def.hit_area, HitArea::LeftColumns(2));
        assert!(approx(&times(&def, |a| matches!(a, AttackAction::LightningVolley(_))), &[1.0]));
        assert!(approx(&times(&def, |a| matches!(a, AttackAction::Hit { .. })), &[1.5]));
        assert!((def.duration() - 2.0).abs() < 1e-5);
        assert!((def.recovery - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_triple_swipe_schedule() {
        for kind in [AttackKind::TripleLeftSwipe, AttackKind::TripleRightSwipe] {
            let def = build(kind);
            assert!(approx(
                &times(&def, |a| matches!(a, AttackAction::LightningVolley(_))),
                &[1.0, 2.0, 3.0]
            ));
            assert!(approx(
                &times(&def, |a| matches!(a, AttackAction::Hit { .. })),
                &[1.5, 2.5, 3.5]
            ));
            assert!((def.duration() - 6.25).abs() < 1e-5);
            assert!((def.recovery - 2.0).abs() < 1e-5);
            assert_eq!(def.hit_count(), 3);
        }
    }

    #[test]
    fn test_projectile_schedule() {
        let def = build(AttackKind::Projectile);
        assert!(approx(&times(&def, |a| *a == AttackAction::LaunchProjectile), &[0.5]));
        assert!((def.duration() - 1.0).abs() < 1e-5);
        assert_eq!(def.hit_count(), 0);
    }

    #[test]
    fn test_special_schedule() {
        let def = build(AttackKind::SpecialAttack);
        assert_eq!(def.hit_area, HitArea::All);
        assert!(approx(&times(&def, |a| matches!(a, AttackAction::Hit { .. })), &[1.48]));
        assert!((def.duration() - 1.8).abs() < 1e-5);
        assert!((def.damage_factor - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_hit_areas_mirror() {
        let grid = GridModel::default().cells(Vec2::ZERO);
        let left = build(AttackKind::LeftSwipe).hit_area.cells(&grid);
        let right = build(AttackKind::RightSwipe).hit_area.cells(&grid);
        assert_eq!(left.len(), right.len());
        for cell in &left {
            let mirrored = crate::grid::Cell {
                col: grid.cols() - 1 - cell.col,
                row: cell.row,
            };
            assert!(right.contains(&mirrored));
        }
    }
}
