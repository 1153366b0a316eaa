use criterion::{black_box, BatchSize, criterion_group, criterion_main, Criterion};
use omalg::{prelude::*, random};

const SEED: u64 = 1337;
const BENCH_SIZE: usize = 4;
const AUTOMATA: usize = 8;

fn data() -> Vec<OmegaAutomaton> {
    fastrand::seed(SEED);
    (0..AUTOMATA)
        .flat_map(|_| {
            [
                random::generate_random_dba(2, BENCH_SIZE),
                random::generate_random_dpa(2, BENCH_SIZE, 4),
            ]
        })
        .collect()
}

fn to_semigroups(automata: &[OmegaAutomaton]) -> Vec<OmegaSemigroup> {
    automata.iter().map(|aut| aut.to_omega_semigroup()).collect()
}

fn to_parity(semigroups: &[OmegaSemigroup]) {
    for os in semigroups {
        os.to_parity();
    }
}

fn classification(semigroups: &[OmegaSemigroup]) {
    for os in semigroups {
        os.classify();
    }
}

fn benchings(c: &mut Criterion) {
    let automata = data();
    let semigroups = to_semigroups(&automata);

    c.bench_function("automaton to omega-semigroup", |b| {
        b.iter(|| to_semigroups(black_box(&automata)))
    });
    c.bench_function("omega-semigroup to parity", |b| {
        b.iter(|| to_parity(black_box(&semigroups)))
    });
    c.bench_function("classification", |b| {
        b.iter_batched(
            || to_semigroups(&automata),
            |fresh| classification(black_box(&fresh)),
            BatchSize::SmallInput,
        )
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = benchings
}
criterion_main!(benches);
