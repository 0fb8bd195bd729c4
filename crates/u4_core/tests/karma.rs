use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use u4_core::karma::{KarmaAction, adjust_karma};
use u4_core::party::{Operation, Party, PartyEvent};
use u4_core::save::{CharacterRecord, SaveState};
use u4_core::sex::Sex;
use u4_core::types::{AVATAR_KARMA, ClassType, LocationContext, MAX_KARMA, Virtue};

fn stored_value_is_valid(value: u16) -> bool {
    value == AVATAR_KARMA || (1..=MAX_KARMA).contains(&value)
}

fn arb_karma() -> impl Strategy<Value = [u16; 8]> {
    prop::array::uniform8(prop_oneof![Just(AVATAR_KARMA), 1u16..=MAX_KARMA])
}

proptest! {
    #[test]
    fn stored_karma_stays_in_bounds(
        start in arb_karma(),
        actions in prop::collection::vec(prop::sample::select(KarmaAction::ALL.to_vec()), 0..64),
        step in 0u32..40,
        seed in any::<u64>()
    ) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut karma = start;
        let mut last_virtue = 0;
        let mut moves = 0u32;

        for action in actions {
            moves = moves.wrapping_add(step);
            if let Some(outcome) = adjust_karma(action, &karma, moves, last_virtue, &mut rng) {
                karma = outcome.karma;
                last_virtue = outcome.last_virtue;
            }
            for value in karma {
                prop_assert!(stored_value_is_valid(value), "{action}: stored {value}");
            }
        }
    }

    #[test]
    fn any_penalty_on_an_attained_virtue_loses_exactly_that_eighth(
        virtue_index in 0usize..8
    ) {
        let virtue = Virtue::ALL[virtue_index];
        let mut karma = [50u16; 8];
        karma[virtue_index] = AVATAR_KARMA;

        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let outcome = adjust_karma(KarmaAction::UsedSkull, &karma, 0, 0, &mut rng).unwrap();

        prop_assert_eq!(outcome.lost_eighths, vec![virtue]);
        prop_assert!((1..=MAX_KARMA).contains(&outcome.karma[virtue_index]));
    }
}

#[test]
fn party_reports_one_eighth_lost_after_committing() {
    let mut save = SaveState::init(CharacterRecord::new("Avatar", Sex::Female, ClassType::Bard));
    save.karma[Virtue::Compassion.index()] = AVATAR_KARMA;

    let events = Rc::new(RefCell::new(Vec::new()));
    {
        let mut party = Party::with_seed(&mut save, LocationContext::Town, 3);
        let sink = Rc::clone(&events);
        party.subscribe(move |event: &PartyEvent| sink.borrow_mut().push(event.clone()));

        assert!(party.adjust_karma(KarmaAction::AttackedGood));
        assert_eq!(party.karma(Virtue::Compassion), 95);
    }

    let events = events.borrow();
    let lost: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, PartyEvent::EighthLost(_)))
        .collect();
    assert_eq!(lost, vec![&PartyEvent::EighthLost(Virtue::Compassion)]);
    assert_eq!(
        events.last(),
        Some(&PartyEvent::Changed(Operation::AdjustKarma(
            KarmaAction::AttackedGood
        )))
    );
    assert_eq!(save.karma[Virtue::Justice.index()], 15);
}

#[test]
fn repeated_time_limited_action_is_silent() {
    let mut save = SaveState::init(CharacterRecord::new("Avatar", Sex::Male, ClassType::Shepherd));
    save.moves = 160;
    save.last_virtue = 10;

    let count = Rc::new(RefCell::new(0));
    let mut party = Party::with_seed(&mut save, LocationContext::Town, 3);
    let sink = Rc::clone(&count);
    party.subscribe(move |_: &PartyEvent| *sink.borrow_mut() += 1);

    assert!(!party.adjust_karma(KarmaAction::Humble));
    assert_eq!(party.karma(Virtue::Humility), 20);
    assert_eq!(*count.borrow(), 0);
}
