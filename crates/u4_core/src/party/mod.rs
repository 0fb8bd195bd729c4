//! Live party rules layered over a [`SaveState`].
//!
//! A [`Party`] borrows the save exclusively for its lifetime. Every mutation
//! lands in the save first; subscribers are told afterwards.

pub mod error;
pub mod event;
pub mod member;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::karma::{self, KarmaAction};
use crate::save::{CharacterRecord, SaveState};
use crate::types::{
    AVATAR_KARMA, AVATAR_TILE, LocationContext, MAX_FOOD, MAX_GOLD, MAX_KARMA, MAX_REAGENT,
    MAX_SHIP_HULL, PARTY_SLOTS, Reagent, SHIP_HULL_REPAIR_LIMIT, Status, TileEffect, Transport,
    Virtue,
};
pub use error::{DonateError, HealError, JoinError, TorchError};
pub use event::{Coords, CorpseMarker, Operation, PartyEvent, PartyObserver};
pub use member::{HealKind, MemberMut, PartyMember};

/// Karma needed in a class's virtue before a character will follow the Avatar.
const JOIN_KARMA_THRESHOLD: u16 = 40;
const REVIVE_FOOD: u32 = 20_099;
const REVIVE_GOLD: u16 = 200;
/// Turns a torch burns when lit with the default duration.
pub const DEFAULT_TORCH_DURATION: u16 = 100;

pub struct Party<'a> {
    save: &'a mut SaveState,
    members: Vec<PartyMember>,
    context: LocationContext,
    transport: Transport,
    torch_duration: u16,
    rng: ChaCha20Rng,
    observers: Vec<Box<dyn PartyObserver + 'a>>,
}

impl<'a> Party<'a> {
    pub fn new(save: &'a mut SaveState, context: LocationContext) -> Self {
        Self::with_rng(save, context, ChaCha20Rng::from_entropy())
    }

    /// Same as [`Party::new`] with reproducible dice.
    pub fn with_seed(save: &'a mut SaveState, context: LocationContext, seed: u64) -> Self {
        Self::with_rng(save, context, ChaCha20Rng::seed_from_u64(seed))
    }

    fn with_rng(save: &'a mut SaveState, context: LocationContext, rng: ChaCha20Rng) -> Self {
        let count = usize::from(save.members).clamp(1, PARTY_SLOTS);
        let members = save.players[..count]
            .iter()
            .map(PartyMember::from_record)
            .collect();
        let transport = Transport::from_tile(save.transport);
        let torch_duration = save.torch_duration;

        Self {
            save,
            members,
            context,
            transport,
            torch_duration,
            rng,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: impl PartyObserver + 'a) {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: PartyEvent) {
        for observer in &mut self.observers {
            observer.notify(&event);
        }
    }

    fn changed(&mut self, operation: Operation) {
        self.emit(PartyEvent::Changed(operation));
    }

    pub fn save(&self) -> &SaveState {
        &*self.save
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn context(&self) -> LocationContext {
        self.context
    }

    pub fn set_context(&mut self, context: LocationContext) {
        self.context = context;
    }

    pub fn member(&self, slot: usize) -> Option<&PartyMember> {
        self.members.get(slot)
    }

    pub fn member_mut(&mut self, slot: usize) -> Option<MemberMut<'_, 'a>> {
        if slot < self.members.len() {
            Some(MemberMut::new(self, slot))
        } else {
            None
        }
    }

    /// Saved record of an active member.
    pub fn record(&self, slot: usize) -> Option<&CharacterRecord> {
        self.save.players[..self.size()].get(slot)
    }

    pub fn food(&self) -> u32 {
        self.save.food
    }

    pub fn gold(&self) -> u16 {
        self.save.gold
    }

    pub fn karma(&self, virtue: Virtue) -> u16 {
        self.save.karma[virtue.index()]
    }

    pub fn reagents(&self, reagent: Reagent) -> u16 {
        self.save.reagents[reagent.index()]
    }

    pub fn ship_hull(&self) -> u16 {
        self.save.ship_hull
    }

    pub fn torch_duration(&self) -> u16 {
        self.torch_duration
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    /// Food is kept in hundredths; subscribers only hear about whole units.
    pub fn adjust_food(&mut self, delta: i64) {
        let old = self.save.food;
        self.save.food = (i64::from(old) + delta).clamp(0, i64::from(MAX_FOOD)) as u32;
        if self.save.food / 100 != old / 100 {
            self.changed(Operation::AdjustFood);
        }
    }

    pub fn adjust_gold(&mut self, delta: i32) {
        let old = self.save.gold;
        self.save.gold = (i32::from(old) + delta).clamp(0, i32::from(MAX_GOLD)) as u16;
        if self.save.gold != old {
            self.changed(Operation::AdjustGold);
        }
    }

    pub fn adjust_reagent(&mut self, reagent: Reagent, delta: i32) {
        let slot = &mut self.save.reagents[reagent.index()];
        let old = *slot;
        *slot = (i32::from(old) + delta).clamp(0, i32::from(MAX_REAGENT)) as u16;
        if *slot != old {
            self.changed(Operation::AdjustReagent);
        }
    }

    /// Applies a karma action. Returns false if a time-limited action was
    /// already rewarded in the current 16-move window.
    pub fn adjust_karma(&mut self, action: KarmaAction) -> bool {
        let Some(outcome) = karma::adjust_karma(
            action,
            &self.save.karma,
            self.save.moves,
            self.save.last_virtue,
            &mut self.rng,
        ) else {
            return false;
        };

        self.save.karma = outcome.karma;
        self.save.last_virtue = outcome.last_virtue;
        for virtue in outcome.lost_eighths {
            self.emit(PartyEvent::EighthLost(virtue));
        }
        self.changed(Operation::AdjustKarma(action));
        true
    }

    /// A virtue at 99 becomes attained.
    pub fn attempt_elevation(&mut self, virtue: Virtue) -> bool {
        if self.save.karma[virtue.index()] != MAX_KARMA {
            return false;
        }
        self.save.karma[virtue.index()] = AVATAR_KARMA;
        self.changed(Operation::AttemptElevation);
        true
    }

    pub fn can_enter_shrine(&self, virtue: Virtue) -> bool {
        self.save.runes & virtue.mask() != 0
    }

    pub fn damage_ship(&mut self, points: u16) {
        let old = self.save.ship_hull;
        self.save.ship_hull = old.saturating_sub(points);
        if self.save.ship_hull != old {
            self.changed(Operation::DamageShip);
        }
    }

    /// Repairs up to the self-repair limit. A hull already above it is left alone.
    pub fn heal_ship(&mut self, points: u16) {
        let old = self.save.ship_hull;
        if old >= SHIP_HULL_REPAIR_LIMIT {
            return;
        }
        self.save.ship_hull = old.saturating_add(points).min(SHIP_HULL_REPAIR_LIMIT);
        if self.save.ship_hull != old {
            self.changed(Operation::HealShip);
        }
    }

    pub fn set_ship_hull(&mut self, hull: i32) {
        let hull = hull.clamp(0, i32::from(MAX_SHIP_HULL)) as u16;
        if self.save.ship_hull != hull {
            self.save.ship_hull = hull;
            self.changed(Operation::SetShipHull);
        }
    }

    /// Lights a torch for `duration` turns, optionally using one from the pack.
    pub fn light_torch(&mut self, duration: u16, consume: bool) -> Result<(), TorchError> {
        if consume {
            if self.save.torches == 0 {
                return Err(TorchError::NoneLeft);
            }
            self.save.torches -= 1;
        }

        let old = self.torch_duration;
        self.torch_duration = old.saturating_add(duration);
        self.save.torch_duration = self.torch_duration;
        if consume || self.torch_duration != old {
            self.changed(Operation::LightTorch);
        }
        Ok(())
    }

    pub fn burn_torch(&mut self, turns: u16) {
        let old = self.torch_duration;
        self.torch_duration = old.saturating_sub(turns);
        self.save.torch_duration = self.torch_duration;
        if self.torch_duration != old {
            self.changed(Operation::BurnTorch);
        }
    }

    pub fn quench_torch(&mut self) {
        if self.torch_duration == 0 {
            return;
        }
        self.torch_duration = 0;
        self.save.torch_duration = 0;
        self.changed(Operation::QuenchTorch);
    }

    pub fn set_transport(&mut self, tile: u16) {
        if self.save.transport == tile {
            return;
        }
        self.save.transport = tile;
        self.transport = Transport::from_tile(tile);
        self.changed(Operation::SetTransport);
    }

    /// Advances one move and applies per-turn upkeep.
    ///
    /// Members tick in slot order. Starvation and ship repair are checked
    /// after every member has been handled.
    pub fn end_turn(&mut self) {
        self.save.moves = self.save.moves.wrapping_add(1);
        let non_combat = self.context.is_non_combat();

        for slot in 0..self.size() {
            if non_combat {
                if !self.members[slot].is_dead() {
                    self.adjust_food(-1);
                }

                match self.members[slot].status() {
                    Status::Sleeping => {
                        if self.rng.gen_ratio(1, 5) {
                            log::trace!("slot {slot} wakes up");
                            if let Some(mut member) = self.member_mut(slot) {
                                member.wake_up();
                            }
                        }
                    }
                    Status::Poisoned => {
                        log::trace!("slot {slot} suffers from poison");
                        if let Some(mut member) = self.member_mut(slot) {
                            member.apply_damage(2);
                        }
                    }
                    Status::Good | Status::Dead => {}
                }
            }

            let record = &mut self.save.players[slot];
            if !self.members[slot].is_disabled() && record.mp < record.max_mp() {
                record.mp += 1;
            }
        }

        if self.save.food == 0 && non_combat {
            log::debug!("the party is starving");
            self.emit(PartyEvent::Starving);
        }

        if self.context == LocationContext::WorldMap
            && self.save.ship_hull < SHIP_HULL_REPAIR_LIMIT
            && self.rng.gen_ratio(1, 4)
        {
            self.heal_ship(1);
        }

        self.changed(Operation::EndTurn);
    }

    /// Virtue of the character named `name` if one is waiting outside the party.
    pub fn can_person_join(&self, name: &str) -> Option<Virtue> {
        if name.is_empty() {
            return None;
        }
        self.save.players[1..]
            .iter()
            .find(|record| record.name() == name)
            .map(|record| record.class.virtue())
    }

    pub fn is_person_joined(&self, name: &str) -> bool {
        !name.is_empty()
            && self.save.players[1..self.size()]
                .iter()
                .any(|record| record.name() == name)
    }

    /// Moves the named character into the next party slot.
    pub fn join(&mut self, name: &str) -> Result<(), JoinError> {
        let next = self.size();
        let candidate = (next..PARTY_SLOTS)
            .find(|&slot| !name.is_empty() && self.save.players[slot].name() == name)
            .ok_or(JoinError::NotFound)?;

        let party_limit = usize::from(self.save.players[0].level());
        if next + 1 > party_limit {
            return Err(JoinError::NotExperienced);
        }

        let virtue = self.save.players[candidate].class.virtue();
        let karma = self.save.karma[virtue.index()];
        if karma != AVATAR_KARMA && karma < JOIN_KARMA_THRESHOLD {
            return Err(JoinError::NotVirtuous);
        }

        self.save.players.swap(next, candidate);
        self.save.members += 1;
        self.members
            .push(PartyMember::from_record(&self.save.players[next]));

        log::debug!("{name} joined the party in slot {next}");
        self.changed(Operation::Join);
        Ok(())
    }

    /// Gives gold to a beggar.
    pub fn donate(&mut self, quantity: u16) -> Result<(), DonateError> {
        if quantity > self.save.gold {
            return Err(DonateError::InsufficientGold);
        }
        self.adjust_gold(-i32::from(quantity));
        self.adjust_karma(KarmaAction::GaveToBeggar);
        Ok(())
    }

    /// Awards a chest of gold and returns how much it held.
    pub fn get_chest(&mut self) -> u16 {
        let gold = self.rng.gen_range(0..50) + self.rng.gen_range(0..8) + 10;
        self.adjust_gold(i32::from(gold));
        gold
    }

    /// Applies a tile effect to each member, each rolling separately.
    pub fn apply_effect(&mut self, effect: TileEffect) {
        for slot in 0..self.size() {
            let hit = match effect {
                TileEffect::None | TileEffect::Electricity => true,
                TileEffect::Fire | TileEffect::Lava | TileEffect::Sleep => self.rng.gen_ratio(1, 2),
                TileEffect::Poison | TileEffect::PoisonField => self.rng.gen_ratio(1, 5),
            };
            if hit {
                if let Some(mut member) = self.member_mut(slot) {
                    member.apply_effect(effect);
                }
            }
        }
    }

    /// True when no member can act.
    pub fn is_immobilized(&self) -> bool {
        self.members.iter().all(PartyMember::is_disabled)
    }

    pub fn is_dead(&self) -> bool {
        self.members.iter().all(PartyMember::is_dead)
    }

    /// Brings everyone back after a total party kill.
    pub fn revive_party(&mut self) {
        for slot in 0..self.size() {
            if let Some(mut member) = self.member_mut(slot) {
                member.set_status(Status::Good);
            }
            let record = &mut self.save.players[slot];
            record.hp = record.hp_max;
        }

        self.save.food = REVIVE_FOOD;
        self.save.gold = REVIVE_GOLD;
        self.set_transport(AVATAR_TILE);
        self.changed(Operation::ReviveParty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sex::Sex;
    use crate::types::ClassType;

    fn save() -> SaveState {
        SaveState::init(CharacterRecord::new("Avatar", Sex::Male, ClassType::Fighter))
    }

    #[test]
    fn runtime_members_follow_the_member_count() {
        let mut save = save();
        save.members = 3;
        let party = Party::with_seed(&mut save, LocationContext::Town, 1);
        assert_eq!(party.size(), 3);
        assert!(party.record(2).is_some());
        assert!(party.record(3).is_none());
    }

    #[test]
    fn avatar_is_always_in_the_party() {
        let mut save = save();
        save.members = 0;
        let party = Party::with_seed(&mut save, LocationContext::Town, 1);
        assert_eq!(party.size(), 1);
        assert!(!party.is_dead());
    }

    #[test]
    fn torch_duration_is_mirrored_into_the_save() {
        let mut save = save();
        save.torches = 1;
        {
            let mut party = Party::with_seed(&mut save, LocationContext::Dungeon, 1);
            party.light_torch(DEFAULT_TORCH_DURATION, true).unwrap();
            assert_eq!(
                party.light_torch(DEFAULT_TORCH_DURATION, true),
                Err(TorchError::NoneLeft)
            );
            party.burn_torch(30);
            assert_eq!(party.torch_duration(), 70);
        }
        assert_eq!(save.torch_duration, 70);
        assert_eq!(save.torches, 0);
    }

    #[test]
    fn ship_repair_stops_at_the_limit() {
        let mut save = save();
        save.ship_hull = 48;
        let mut party = Party::with_seed(&mut save, LocationContext::WorldMap, 1);
        party.heal_ship(10);
        assert_eq!(party.ship_hull(), SHIP_HULL_REPAIR_LIMIT);

        party.set_ship_hull(120);
        assert_eq!(party.ship_hull(), MAX_SHIP_HULL);
        party.heal_ship(1);
        assert_eq!(party.ship_hull(), MAX_SHIP_HULL);
    }

    #[test]
    fn elevation_needs_full_karma() {
        let mut save = save();
        save.karma[Virtue::Valor.index()] = 99;
        let mut party = Party::with_seed(&mut save, LocationContext::Altar, 1);
        assert!(party.attempt_elevation(Virtue::Valor));
        assert_eq!(party.karma(Virtue::Valor), AVATAR_KARMA);
        assert!(!party.attempt_elevation(Virtue::Honor));
    }

    #[test]
    fn shrine_entry_checks_the_rune_mask() {
        let mut save = save();
        save.runes = Virtue::Spirituality.mask();
        let party = Party::with_seed(&mut save, LocationContext::WorldMap, 1);
        assert!(party.can_enter_shrine(Virtue::Spirituality));
        assert!(!party.can_enter_shrine(Virtue::Honesty));
    }

    #[test]
    fn chest_gold_is_within_range() {
        let mut save = save();
        let mut party = Party::with_seed(&mut save, LocationContext::Dungeon, 9);
        let gold = party.get_chest();
        assert!((10..=66).contains(&gold));
        assert_eq!(party.gold(), gold);
    }
}
