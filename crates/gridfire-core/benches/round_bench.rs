use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use gridfire_core::command::{Action, Aim, Direction, SenseParams};
use gridfire_core::config::MatchConfig;
use gridfire_core::coordinator::Match;
use gridfire_core::EntityId;

const PLAYERS: u64 = 8;

fn populated_match() -> Match {
    let config = MatchConfig {
        seed: 1234,
        ..MatchConfig::default()
    };
    let mut game = Match::new(&config).unwrap();
    for n in 1..=PLAYERS {
        game.add_participant(EntityId::new(n), &config.robot).unwrap();
    }
    game
}

fn mixed_action(n: u64) -> Action {
    let direction = Direction::ALL[(n % 4) as usize];
    match n % 4 {
        0 => Action::Move(direction),
        1 => Action::Fire {
            weapon: 0,
            aim: Aim::Line(direction),
        },
        2 => Action::Sense {
            sensor: 2,
            params: SenseParams::None,
        },
        _ => Action::Fire {
            weapon: 1,
            aim: Aim::Lob { direction, range: 4 },
        },
    }
}

fn bench_full_round(c: &mut Criterion) {
    c.bench_function("resolve_round_8_players", |b| {
        b.iter_batched(
            || {
                let mut game = populated_match();
                for n in 1..=PLAYERS {
                    game.submit_action(EntityId::new(n), mixed_action(n)).unwrap();
                }
                game
            },
            |mut game| black_box(game.resolve_round()),
            BatchSize::SmallInput,
        );
    });
}

fn bench_vision_refresh(c: &mut Criterion) {
    let mut game = populated_match();

    c.bench_function("refresh_vision_r2", |b| {
        b.iter(|| game.world_mut().refresh_vision(black_box(2)));
    });
}

criterion_group!(benches, bench_full_round, bench_vision_refresh);
criterion_main!(benches);
