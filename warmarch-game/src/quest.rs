//! Rotating three-quest sets that gate progression.
//!
//! Each set holds one resource, one monster and one troop quest. Targets and
//! rewards scale with `base_amount = 5 * 2^(set_number - 1)`; when all three
//! are complete the whole set is discarded and a harder one generated.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::constants::QUEST_BASE_AMOUNT;
use crate::economy::{Economy, ResourceKind, ResourceStock, TroopKind};
use crate::event::DomainEvent;
use crate::numbers::half_ceil;
use crate::rng::pick;

/// Quests completed by a single event; at most one per category.
pub type CompletedQuests = SmallVec<[Quest; 3]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestId(pub u32);

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quest#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestCategory {
    Resource,
    Monster,
    Troop,
}

/// Category plus the discriminator a matching event must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "category", content = "target", rename_all = "lowercase")]
pub enum QuestObjective {
    Resource(ResourceKind),
    Monster,
    Troop(TroopKind),
}

impl QuestObjective {
    #[must_use]
    pub const fn category(self) -> QuestCategory {
        match self {
            Self::Resource(_) => QuestCategory::Resource,
            Self::Monster => QuestCategory::Monster,
            Self::Troop(_) => QuestCategory::Troop,
        }
    }

    /// True when `event` advances this objective.
    #[must_use]
    pub fn matches(self, event: &DomainEvent) -> bool {
        match (self, *event) {
            (Self::Resource(want), DomainEvent::ResourceCollected { resource }) => want == resource,
            (Self::Monster, DomainEvent::MonsterDefeated { .. }) => true,
            (Self::Troop(want), DomainEvent::TroopBuilt { troop }) => want == troop,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub objective: QuestObjective,
    pub description: String,
    pub target: u32,
    pub progress: u32,
    pub completed: bool,
    pub reward: ResourceStock,
}

impl Quest {
    fn new(
        id: QuestId,
        objective: QuestObjective,
        description: String,
        target: u32,
        reward: ResourceStock,
    ) -> Self {
        Self {
            id,
            objective,
            description,
            target,
            progress: 0,
            completed: false,
            reward,
        }
    }

    #[must_use]
    pub const fn category(&self) -> QuestCategory {
        self.objective.category()
    }
}

/// `5 * 2^(set_number - 1)`, saturating for very deep sets.
#[must_use]
pub fn base_amount(set_number: u32) -> u32 {
    let factor = 1_u32
        .checked_shl(set_number.saturating_sub(1))
        .unwrap_or(u32::MAX);
    QUEST_BASE_AMOUNT.saturating_mul(factor)
}

/// What a single event did to the active set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestUpdate {
    /// True when any quest's progress moved or the set rotated.
    pub changed: bool,
    pub completed: CompletedQuests,
    /// Sum of rewards credited to the economy.
    pub rewards: ResourceStock,
    /// New set number when the set rotated.
    pub rotated_to: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestBook {
    set_number: u32,
    quests: Vec<Quest>,
    next_id: u32,
}

impl QuestBook {
    /// First quest set.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::starting_at(1, rng)
    }

    /// Start directly at a given difficulty.
    pub fn starting_at<R: Rng + ?Sized>(set_number: u32, rng: &mut R) -> Self {
        let mut book = Self {
            set_number: set_number.max(1),
            quests: Vec::with_capacity(3),
            next_id: 1,
        };
        book.regenerate(rng);
        book
    }

    #[must_use]
    pub const fn set_number(&self) -> u32 {
        self.set_number
    }

    #[must_use]
    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    #[must_use]
    pub fn all_completed(&self) -> bool {
        self.quests.iter().all(|q| q.completed)
    }

    fn next_quest_id(&mut self) -> QuestId {
        let id = QuestId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Discard the current set and build a fresh one for `set_number`.
    fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let base = base_amount(self.set_number);
        let half = half_ceil(base);
        let resource = pick(rng, &ResourceKind::ALL).unwrap_or(ResourceKind::Wood);
        let troop = pick(rng, &TroopKind::ALL).unwrap_or(TroopKind::Infantry);

        let resource_id = self.next_quest_id();
        let monster_id = self.next_quest_id();
        let troop_id = self.next_quest_id();
        self.quests = vec![
            Quest::new(
                resource_id,
                QuestObjective::Resource(resource),
                format!("Collect {base} {resource}"),
                base,
                ResourceStock::new(0, 0, base),
            ),
            Quest::new(
                monster_id,
                QuestObjective::Monster,
                format!("Defeat {half} Monsters"),
                half,
                ResourceStock::new(0, base, half),
            ),
            Quest::new(
                troop_id,
                QuestObjective::Troop(troop),
                format!("Build {base} {} Units", troop.title()),
                base,
                ResourceStock::new(base, base, 0),
            ),
        ];
    }

    /// Advance every matching incomplete quest, paying rewards into `economy`
    /// and rotating the set once all three are complete.
    pub fn on_event<R: Rng + ?Sized>(
        &mut self,
        event: &DomainEvent,
        economy: &mut Economy,
        rng: &mut R,
    ) -> QuestUpdate {
        let mut update = QuestUpdate::default();
        for quest in self.quests.iter_mut().filter(|q| !q.completed) {
            if !quest.objective.matches(event) {
                continue;
            }
            quest.progress = quest.progress.saturating_add(1).min(quest.target);
            update.changed = true;
            if quest.progress >= quest.target {
                quest.completed = true;
                economy.apply_delta(&quest.reward);
                update.rewards.add(&quest.reward);
                update.completed.push(quest.clone());
            }
        }

        if self.all_completed() {
            self.set_number = self.set_number.saturating_add(1);
            self.regenerate(rng);
            update.changed = true;
            update.rotated_to = Some(self.set_number);
            debug!("quest set rotated to {}", self.set_number);
        }
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn book() -> (QuestBook, ChaCha20Rng) {
        let mut rng = ChaCha20Rng::seed_from_u64(77);
        (QuestBook::new(&mut rng), rng)
    }

    fn resource_of(book: &QuestBook) -> ResourceKind {
        match book.quests()[0].objective {
            QuestObjective::Resource(kind) => kind,
            other => panic!("first quest should be a resource quest, got {other:?}"),
        }
    }

    fn troop_of(book: &QuestBook) -> TroopKind {
        match book.quests()[2].objective {
            QuestObjective::Troop(kind) => kind,
            other => panic!("third quest should be a troop quest, got {other:?}"),
        }
    }

    #[test]
    fn base_amount_doubles_per_set() {
        assert_eq!(base_amount(1), 5);
        assert_eq!(base_amount(2), 10);
        assert_eq!(base_amount(4), 40);
        assert_eq!(base_amount(0), 5);
        assert_eq!(base_amount(40), u32::MAX);
    }

    #[test]
    fn first_set_has_one_quest_per_category() {
        let (book, _) = book();
        let categories: Vec<QuestCategory> = book.quests().iter().map(Quest::category).collect();
        assert_eq!(
            categories,
            vec![
                QuestCategory::Resource,
                QuestCategory::Monster,
                QuestCategory::Troop
            ]
        );
        let targets: Vec<u32> = book.quests().iter().map(|q| q.target).collect();
        assert_eq!(targets, vec![5, 3, 5]);
        assert_eq!(book.quests()[0].reward, ResourceStock::new(0, 0, 5));
        assert_eq!(book.quests()[1].reward, ResourceStock::new(0, 5, 3));
        assert_eq!(book.quests()[2].reward, ResourceStock::new(5, 5, 0));
        assert_eq!(book.quests()[1].description, "Defeat 3 Monsters");
    }

    #[test]
    fn only_matching_discriminator_progresses() {
        let (mut book, mut rng) = book();
        let mut economy = Economy::new();
        let wanted = resource_of(&book);
        let other = ResourceKind::ALL
            .into_iter()
            .find(|k| *k != wanted)
            .unwrap();

        let update = book.on_event(
            &DomainEvent::ResourceCollected { resource: other },
            &mut economy,
            &mut rng,
        );
        assert!(!update.changed);
        assert_eq!(book.quests()[0].progress, 0);

        for _ in 0..4 {
            book.on_event(
                &DomainEvent::ResourceCollected { resource: wanted },
                &mut economy,
                &mut rng,
            );
        }
        assert_eq!(book.quests()[0].progress, 4);
        let update = book.on_event(
            &DomainEvent::ResourceCollected { resource: wanted },
            &mut economy,
            &mut rng,
        );
        assert_eq!(update.completed.len(), 1);
        assert!(book.quests()[0].completed);
        assert_eq!(economy.resources.gold, 5);
        assert_eq!(book.quests()[1].progress, 0);
        assert_eq!(book.quests()[2].progress, 0);

        // completed quests never pay twice
        book.on_event(
            &DomainEvent::ResourceCollected { resource: wanted },
            &mut economy,
            &mut rng,
        );
        assert_eq!(book.quests()[0].progress, 5);
        assert_eq!(economy.resources.gold, 5);
    }

    #[test]
    fn finishing_all_three_rotates_to_harder_set() {
        let (mut book, mut rng) = book();
        let mut economy = Economy::new();
        let resource = resource_of(&book);
        let troop = troop_of(&book);
        for _ in 0..5 {
            book.on_event(
                &DomainEvent::ResourceCollected { resource },
                &mut economy,
                &mut rng,
            );
            book.on_event(&DomainEvent::TroopBuilt { troop }, &mut economy, &mut rng);
        }
        for _ in 0..2 {
            book.on_event(
                &DomainEvent::MonsterDefeated { level: 4 },
                &mut economy,
                &mut rng,
            );
        }
        assert_eq!(book.set_number(), 1);
        let update = book.on_event(
            &DomainEvent::MonsterDefeated { level: 9 },
            &mut economy,
            &mut rng,
        );
        assert_eq!(update.rotated_to, Some(2));
        assert_eq!(book.set_number(), 2);
        assert!(book.quests().iter().all(|q| !q.completed && q.progress == 0));
        let targets: Vec<u32> = book.quests().iter().map(|q| q.target).collect();
        assert_eq!(targets, vec![10, 5, 10]);
        let ids: Vec<u32> = book.quests().iter().map(|q| q.id.0).collect();
        assert_eq!(ids, vec![4, 5, 6]);
        assert_eq!(economy.resources, ResourceStock::new(5, 10, 8));
    }

    #[test]
    fn objective_serializes_with_category_and_target() {
        let json = serde_json::to_value(QuestObjective::Troop(TroopKind::Cavalry)).unwrap();
        assert_eq!(json["category"], "troop");
        assert_eq!(json["target"], "cavalry");
    }
}
