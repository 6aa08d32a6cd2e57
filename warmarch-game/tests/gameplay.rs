use warmarch_game::{
    BattleOutcome, GameError, GameEvent, GameSession, Interaction, Position, QuestObjective,
    ResourceKind, ResourceStock, RespawnOutcome, SpotId, SpotKind, TroopKind, TroopRoster,
    WorldConfig, WorldGrid,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn crowded_config() -> WorldConfig {
    WorldConfig {
        map_width: 1_200.0,
        map_height: 900.0,
        initial_spots: 120,
        ..WorldConfig::default()
    }
}

fn assert_min_distance(world: &WorldGrid, min_distance: f64) {
    let spots: Vec<_> = world.iter().collect();
    for (i, a) in spots.iter().enumerate() {
        for b in &spots[i + 1..] {
            let d = a.position.distance_to(b.position);
            assert!(
                d >= min_distance,
                "{} and {} are only {d:.2} apart",
                a.id,
                b.id
            );
        }
    }
}

fn session_with_monster(level: u8, roster: TroopRoster) -> (GameSession, SpotId) {
    let mut session = GameSession::new(2024, WorldConfig::default());
    session.set_view_center(Position::new(1_000.0, 1_000.0));
    let id = session
        .state_mut()
        .world
        .place(Position::new(1_300.0, 1_000.0), SpotKind::Monster, level);
    session.state_mut().economy.troops = roster;
    (session, id)
}

fn resolved_outcome(session: &mut GameSession) -> BattleOutcome {
    session
        .drain_events()
        .into_iter()
        .find_map(|event| match event.payload {
            GameEvent::MarchResolved { outcome, .. } => Some(outcome),
            _ => None,
        })
        .expect("march should resolve")
}

#[test]
fn generated_spots_respect_min_distance() {
    for seed in [1_u64, 17, 404, 9_999] {
        let config = crowded_config();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let mut world = WorldGrid::new();
        let report = world.generate(config.initial_spots, &config, &mut rng);
        assert_eq!(report.placed.len(), world.len());
        assert!(report.attempts <= config.initial_spots * config.generation_attempt_factor);
        assert_min_distance(&world, config.min_distance);
        for spot in world.iter() {
            assert!((0.0..=config.map_width).contains(&spot.position.x));
            assert!((0.0..=config.map_height).contains(&spot.position.y));
            assert!((1..=30).contains(&spot.level));
        }
    }
}

#[test]
fn saturated_map_degrades_instead_of_failing() {
    let config = WorldConfig {
        map_width: 200.0,
        map_height: 200.0,
        ..WorldConfig::default()
    };
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let mut world = WorldGrid::new();
    let report = world.generate(500, &config, &mut rng);
    assert!(report.exhausted(world.len()));
    assert!(world.len() < 500);
    assert_eq!(report.attempts, 5_000);
    assert_min_distance(&world, config.min_distance);

    let mut outcome = RespawnOutcome::Exhausted;
    for _ in 0..200 {
        outcome = world.respawn(&config, &mut rng);
        if outcome == RespawnOutcome::Exhausted {
            break;
        }
    }
    assert_eq!(outcome, RespawnOutcome::Exhausted);
    assert_min_distance(&world, config.min_distance);
}

#[test]
fn respawns_keep_min_distance_over_a_long_session() {
    let config = crowded_config();
    let min_distance = config.min_distance;
    let mut session = GameSession::bootstrap(77, config);
    for _ in 0..20 {
        let resources: Vec<SpotId> = session
            .state()
            .world
            .iter()
            .filter(|s| !s.collected && !s.is_monster())
            .take(5)
            .map(|s| s.id)
            .collect();
        for id in resources {
            session.interact(id).unwrap();
        }
        session.advance(31);
        assert_min_distance(&session.state().world, min_distance);
    }
    assert!(session.state().cooldowns.is_empty());
}

#[test]
fn collect_is_idempotent() {
    let mut session = GameSession::bootstrap(5, crowded_config());
    let id = session
        .state()
        .world
        .iter()
        .find(|s| s.kind == SpotKind::Gold)
        .map(|s| s.id)
        .expect("a gold spot");
    session.drain_events();

    assert_eq!(
        session.interact(id).unwrap(),
        Interaction::Collected {
            resource: ResourceKind::Gold,
            value: 1
        }
    );
    let first = session.drain_events();
    assert!(!first.is_empty());

    let before = session.state().clone();
    assert_eq!(session.interact(id).unwrap(), Interaction::Ignored);
    assert_eq!(session.state(), &before);
    assert!(session.drain_events().is_empty());
}

#[test]
fn builds_are_all_or_nothing() {
    let mut session = GameSession::new(8, WorldConfig::default());
    session.state_mut().economy.resources = ResourceStock::new(3, 4, 4);

    session.build_troop(TroopKind::Cavalry).unwrap();
    assert_eq!(*session.state().resources(), ResourceStock::new(3, 1, 1));

    let before = session.state().clone();
    for kind in [TroopKind::Cavalry, TroopKind::Archer] {
        let err = session.build_troop(kind).unwrap_err();
        assert!(matches!(err, GameError::InsufficientResources { troop, .. } if troop == kind));
        assert_eq!(session.state(), &before);
    }

    session.build_troop(TroopKind::Infantry).unwrap();
    assert_eq!(*session.state().resources(), ResourceStock::new(1, 0, 1));
    assert_eq!(*session.state().troops(), TroopRoster::new(1, 0, 1));
}

#[test]
fn only_one_march_at_a_time() {
    let (mut session, far) = session_with_monster(1, TroopRoster::new(2, 0, 0));
    let near = session
        .state_mut()
        .world
        .place(Position::new(1_000.0, 1_100.0), SpotKind::Monster, 1);
    let march = session.start_march(far).unwrap();
    assert_eq!(march.eta_secs, 1);

    let before = session.state().clone();
    let err = session.interact(near).unwrap_err();
    assert_eq!(
        err,
        GameError::MarchAlreadyInProgress {
            target: far,
            remaining_secs: 1
        }
    );
    assert_eq!(session.state(), &before);
}

#[test]
fn marching_without_troops_is_rejected() {
    let (mut session, id) = session_with_monster(1, TroopRoster::default());
    assert_eq!(session.interact(id), Err(GameError::NoTroopsAvailable));
    assert!(!session.state().march.is_marching());
}

#[test]
fn cavalry_beats_level_ten_monster() {
    let (mut session, id) = session_with_monster(10, TroopRoster::new(0, 0, 10));
    session.interact(id).unwrap();
    session.drain_events();
    session.advance(1);

    let BattleOutcome::Victory {
        gold,
        bonus,
        player_power,
        monster_power,
        ..
    } = resolved_outcome(&mut session)
    else {
        panic!("expected a victory");
    };
    assert_eq!((player_power, monster_power), (60, 50));
    assert!((2..=6).contains(&gold));
    assert_eq!(bonus, 1);
    assert_eq!(
        *session.state().resources(),
        ResourceStock::new(1, 1, gold + 1)
    );
    assert_eq!(*session.state().troops(), TroopRoster::new(0, 0, 10));
    assert!(session.state().world.get(id).is_some_and(|s| s.collected));
}

#[test]
fn lone_infantry_loses_to_level_thirty_monster() {
    let (mut session, id) = session_with_monster(30, TroopRoster::new(1, 0, 0));
    session.interact(id).unwrap();
    session.advance(1);

    assert_eq!(
        resolved_outcome(&mut session),
        BattleOutcome::Defeat {
            player_power: 3,
            monster_power: 150
        }
    );
    assert_eq!(*session.state().troops(), TroopRoster::new(0, 0, 0));
    assert!(session.state().world.get(id).is_some_and(|s| !s.collected));
    assert!(session.state().resources().is_empty());
    assert!(!session.state().cooldowns.is_pending(id));
}

#[test]
fn march_on_removed_monster_resolves_stale() {
    let (mut session, id) = session_with_monster(6, TroopRoster::new(4, 0, 0));
    session.interact(id).unwrap();
    session.state_mut().world.remove(id);
    session.advance(1);
    assert_eq!(
        resolved_outcome(&mut session),
        BattleOutcome::Stale { level: 6 }
    );
    assert_eq!(*session.state().troops(), TroopRoster::new(4, 0, 0));
}

#[test]
fn resource_quest_completes_alone() {
    let mut session = GameSession::new(31, WorldConfig::default());
    let QuestObjective::Resource(wanted) = session.state().quests.quests()[0].objective else {
        panic!("first quest should be a resource quest");
    };
    assert_eq!(session.state().quests.quests()[0].target, 5);
    let kind = SpotKind::ALL
        .into_iter()
        .find(|k| k.resource() == Some(wanted))
        .expect("a spot kind for every resource");

    for i in 0..5_u32 {
        let id = session
            .state_mut()
            .world
            .place(Position::new(100.0 * f64::from(i), 50.0), kind, 1);
        session.interact(id).unwrap();
    }
    let quests = session.state().quests.quests();
    assert!(quests[0].completed);
    assert_eq!(quests[0].progress, 5);
    assert_eq!((quests[1].progress, quests[2].progress), (0, 0));
    assert_eq!(session.state().quest_set_number(), 1);
}

#[test]
fn finishing_a_set_rotates_to_doubled_targets() {
    let mut session = GameSession::new(12, WorldConfig::default());
    session.set_view_center(Position::new(0.0, 0.0));
    let quests = session.state().quests.quests().to_vec();
    let QuestObjective::Resource(resource) = quests[0].objective else {
        panic!("resource quest first");
    };
    let QuestObjective::Troop(troop) = quests[2].objective else {
        panic!("troop quest last");
    };
    let resource_spot = SpotKind::ALL
        .into_iter()
        .find(|k| k.resource() == Some(resource))
        .expect("resource spot kind");

    session.state_mut().economy.resources = ResourceStock::uniform(100);
    for _ in 0..5 {
        session.build_troop(troop).unwrap();
    }
    for i in 0..5_u32 {
        let id = session.state_mut().world.place(
            Position::new(100.0 * f64::from(i), 5_000.0),
            resource_spot,
            1,
        );
        session.interact(id).unwrap();
    }
    for i in 0..3_u32 {
        let id = session.state_mut().world.place(
            Position::new(100.0 * f64::from(i), 10.0),
            SpotKind::Monster,
            1,
        );
        session.interact(id).unwrap();
        session.advance(1);
    }

    assert_eq!(session.state().quest_set_number(), 2);
    let fresh = session.state().quests.quests();
    assert_eq!(fresh.len(), 3);
    assert!(fresh.iter().all(|q| !q.completed && q.progress == 0));
    let targets: Vec<u32> = fresh.iter().map(|q| q.target).collect();
    assert_eq!(targets, vec![10, 5, 10]);
    assert!(
        session
            .state()
            .log
            .iter()
            .any(|entry| entry.message == "🌟 New Quest Set Unlocked! Difficulty Increased.")
    );
}
