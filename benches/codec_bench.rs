//! Build, verify, read and mutate costs for the character message.
//!
//! Inventory sizes cover the small demo payload up to a large byte vector,
//! so the verifier's linear walk shows up against the constant-time reads.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flatcheck::testing::{hero_buffer, hero_schema};
use flatcheck::{
    reflect, root_as_character, root_as_character_mut, verify_character_buffer, Builder,
    CharacterT, CharacterType, Verifier,
};

/// Inventory lengths to benchmark.
const INVENTORY_SIZES: &[usize] = &[5, 256, 16 * 1024];

fn character(inventory: usize) -> CharacterT {
    CharacterT {
        mana: 300,
        hp: 200,
        name: Some("UnrealMonster_Basic".to_string()),
        inventory: Some((0..inventory).map(|i| i as u8).collect()),
        chtype: CharacterType::PLAYER,
    }
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &size in INVENTORY_SIZES {
        let input = character(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| {
                let mut builder = Builder::with_capacity(size + 64);
                let root = input.pack(&mut builder).unwrap();
                black_box(builder.finish(root).unwrap().len())
            })
        });
    }
    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify");
    for &size in INVENTORY_SIZES {
        let buf = character(size).to_buffer().unwrap();
        group.throughput(Throughput::Bytes(buf.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &buf, |b, buf| {
            b.iter(|| black_box(verify_character_buffer(buf)))
        });
    }
    let schema = hero_schema();
    let hero = hero_buffer();
    group.bench_function("nested", |b| {
        b.iter(|| black_box(Verifier::new(&schema).verify_root(&hero).is_ok()))
    });
    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let buf = character(256).to_buffer().unwrap();
    let character = root_as_character(&buf).unwrap();
    c.bench_function("read/scalars", |b| {
        b.iter(|| black_box(character.mana()) + black_box(character.hp()))
    });
    c.bench_function("read/inventory_sum", |b| {
        b.iter(|| {
            character
                .inventory()
                .map_or(0u32, |v| v.iter().map(u32::from).sum())
        })
    });
    c.bench_function("read/unpack", |b| b.iter(|| black_box(character.unpack())));

    let schema = hero_schema();
    let hero = hero_buffer();
    let verified = Verifier::new(&schema).verify_buffer(&hero).unwrap();
    c.bench_function("read/to_json", |b| {
        b.iter(|| black_box(reflect::buffer_to_json(&verified)))
    });
}

fn bench_mutate(c: &mut Criterion) {
    let mut buf = character(256).to_buffer().unwrap();
    let mut hp = 0i32;
    c.bench_function("mutate/hp", |b| {
        let mut character = root_as_character_mut(&mut buf).unwrap();
        b.iter(|| {
            hp = hp.wrapping_add(1);
            black_box(character.mutate_hp(hp))
        })
    });
}

criterion_group!(benches, bench_build, bench_verify, bench_read, bench_mutate);

criterion_main!(benches);
