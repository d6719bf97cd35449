//! Games played on real rapier2d physics.

use proptest::prelude::*;
use suika_engine::prelude::*;

fn session_with(config: GameConfig) -> Session<RecordingUi> {
    Session::new(config, RecordingUi::default()).unwrap()
}

fn seeded(seed: u64) -> Session<RecordingUi> {
    session_with(GameConfig {
        seed: Some(seed),
        ..Default::default()
    })
}

/// Drop two fruits of `rank` on top of each other at `x`.
fn stack_pair(session: &mut Session<RecordingUi>, rank: usize, x: f32) -> (BodyId, BodyId) {
    let game = session.game_mut();
    let fruit = game.registry().fruit(rank).unwrap();
    let upper = game.spawn(x, 50.0, fruit).unwrap();
    let lower = game.spawn(x, 120.0, fruit).unwrap();
    (upper, lower)
}

#[test]
fn two_equal_fruits_dropped_together_merge() {
    let mut session = seeded(1);
    let (upper, lower) = stack_pair(&mut session, 0, 200.0);

    let transitions = session.run_ticks(300);
    let merges: Vec<_> = transitions
        .iter()
        .filter_map(|t| match t {
            Transition::Merged(outcome) => Some(*outcome),
            _ => None,
        })
        .collect();
    assert_eq!(merges.len(), 1, "expected one merge, got {transitions:?}");
    let mut removed = merges[0].removed;
    removed.sort();
    assert_eq!(removed, [upper, lower]);

    let game = session.game();
    let fruits = game.fruit_bodies();
    assert_eq!(fruits.len(), 1);
    assert_eq!(
        fruits[0].label,
        BodyLabel::Fruit(game.registry().fruit(1).unwrap())
    );
    assert_eq!(game.score(), 10);
    assert_eq!(game.ui().last_score(), Some(10));
}

#[test]
fn different_fruits_rest_side_by_side() {
    let mut session = seeded(2);
    let game = session.game_mut();
    let zero = game.registry().fruit(0).unwrap();
    let one = game.registry().fruit(1).unwrap();
    game.spawn(200.0, 50.0, zero).unwrap();
    game.spawn(200.0, 130.0, one).unwrap();

    let transitions = session.run_ticks(300);
    assert!(transitions
        .iter()
        .all(|t| !matches!(t, Transition::Merged(_))));
    assert_eq!(session.game().fruit_bodies().len(), 2);
    assert_eq!(session.game().score(), 0);
}

#[test]
fn fruit_stays_inside_the_container() {
    let mut session = seeded(3);
    let mut player = Autoplayer::new(3, 25);
    player.run(&mut session, 900);

    let config = session.game().config().clone();
    let half = config.wall_thickness / 2.0;
    for body in session.game().fruit_bodies() {
        let p = body.position;
        assert!(
            p.x > half && p.x < config.canvas_width - half,
            "{} escaped sideways: {p:?}",
            body.id
        );
        assert!(
            p.y < config.canvas_height - half,
            "{} fell through the floor: {p:?}",
            body.id
        );
    }
}

#[test]
fn smallest_to_largest_wins_on_rapier() {
    let config = GameConfig {
        fruit_types: 2,
        initial_types: 1,
        seed: Some(4),
        ..Default::default()
    };
    let mut session = session_with(config);
    let delay = session.game().config().win_delay_ticks();
    stack_pair(&mut session, 0, 200.0);

    let mut merged_at = None;
    let mut won_at = None;
    for tick in 0..300u64 {
        for t in session.tick() {
            match t {
                Transition::Merged(outcome) => {
                    assert!(outcome.reached_max);
                    merged_at = Some(tick);
                }
                Transition::WinAnnounced => won_at = Some(tick),
                _ => {}
            }
        }
    }
    let (merged_at, won_at) = (merged_at.unwrap(), won_at.unwrap());
    // Scheduled at the merging tick's starting count, fired once the
    // counter has advanced `delay` past it.
    assert_eq!(won_at + 1 - merged_at, delay);

    assert!(!session.game().is_active());
    assert!(session.game().ui().reset_visible());
    assert_eq!(
        session.game().ui().updates().last(),
        Some(&UiUpdate::ResetVisible(true))
    );

    let bodies = session.game().physics().body_count();
    assert_eq!(
        session.click(200.0),
        Transition::Ignored(IgnoreReason::Inactive)
    );
    assert_eq!(session.game().physics().body_count(), bodies);
}

#[test]
fn reset_clears_the_rapier_world() {
    let mut session = seeded(5);
    let mut player = Autoplayer::new(5, 15);
    player.run(&mut session, 240);
    assert!(!session.game().fruit_bodies().is_empty());

    let transition = session.reset();
    assert!(matches!(transition, Transition::Reset { cleared, .. } if cleared > 0));
    assert_eq!(session.game().physics().body_count(), 3);
    assert_eq!(session.game().score(), 0);
    assert!(session.game().is_active());

    // Play resumes normally on the same world.
    stack_pair(&mut session, 0, 200.0);
    session.run_ticks(300);
    assert_eq!(session.game().score(), 10);
}

#[test]
fn autoplay_session_replays_exactly() {
    let mut session = seeded(6);
    let mut player = Autoplayer::new(6, 20);
    player.run(&mut session, 400);
    session.reset();
    player.run(&mut session, 200);

    let log = session.log();
    let json = serde_json::to_string(&log).unwrap();
    let restored: SessionLog = serde_json::from_str(&json).unwrap();

    let result = replay(&restored, RecordingUi::default()).unwrap();
    assert!(result.matches, "replay diverged");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn same_seed_same_hash(seed in any::<u64>(), interval in 10u64..40) {
        let run = || {
            let mut session = seeded(seed);
            let mut player = Autoplayer::new(seed, interval);
            let transitions = player.run(&mut session, 300);
            (transitions, session.state_hash())
        };
        let (ta, ha) = run();
        let (tb, hb) = run();
        prop_assert_eq!(ta, tb);
        prop_assert_eq!(ha, hb);
    }
}
