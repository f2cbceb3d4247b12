//! Performance benchmarks for player statistics
//!
//! Targets:
//! - fold(1000 games) → <10ms
//! - aggregate(500 artifacts on disk) → <100ms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use replaydeck_core::analytics::StatsAggregator;
use replaydeck_core::cache::ArtifactLayout;
use replaydeck_core::models::{AnalysisArtifact, StatsReport};
use replaydeck_core::NameAliases;

const RACES: [&str; 4] = ["Human", "Orc", "NightElf", "Undead"];
const HEROES: [&str; 4] = ["Archmage", "Blademaster", "DemonHunter", "DeathKnight"];

/// 1v1 game between two of `pool` players
fn game_json(i: usize, pool: usize) -> String {
    let a = i % pool;
    let b = (i + 1 + i / pool) % pool;
    format!(
        r#"{{"game": {{"player_count": 2, "map": "Maps\\(2)EchoIsles.w3x", "winner_team": {winner}}},
            "header": {{"length": 900000}},
            "teams": [
                {{"1": {{"name": "Player{a}", "race": "{ra}", "team": 0, "actions": 1200,
                        "heroes": {{"{ha}": {{"level": 5}}, "order": ["{ha}"]}}}}}},
                {{"2": {{"name": "Player{b}", "race": "{rb}", "team": 1, "actions": 1100,
                        "heroes": {{"{hb}": {{"level": 4}}, "order": ["{hb}"]}}}}}}
            ]}}"#,
        winner = i % 2,
        a = a,
        b = b,
        ra = RACES[a % 4],
        rb = RACES[b % 4],
        ha = HEROES[a % 4],
        hb = HEROES[b % 4],
    )
}

fn generate_games(count: usize) -> Vec<AnalysisArtifact> {
    (0..count)
        .map(|i| serde_json::from_str(&game_json(i, 40)).unwrap())
        .collect()
}

/// Benchmark 1: in-memory fold with varying game counts
fn fold_benchmark(c: &mut Criterion) {
    let layout = ArtifactLayout::default();
    let names = NameAliases::from_pairs([("Player0", "Captain")]);
    let aggregator = StatsAggregator::new(&layout, &names);
    let mut group = c.benchmark_group("fold");

    for count in [10, 100, 1000] {
        let games = generate_games(count);
        group.bench_with_input(BenchmarkId::new("games", count), &games, |b, games| {
            b.iter(|| {
                let mut report = StatsReport::default();
                for game in games {
                    aggregator.fold(&mut report, game);
                }
                black_box(report)
            });
        });
    }

    group.finish();
}

/// Benchmark 2: full aggregation over a tree of artifacts
fn aggregate_benchmark(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..500 {
        let folder = dir.path().join(format!("season{}", i % 5));
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join(format!("game{i}.json")), game_json(i, 40)).unwrap();
    }

    let layout = ArtifactLayout::default();
    let names = NameAliases::new();
    let aggregator = StatsAggregator::new(&layout, &names);

    c.bench_function("aggregate_500_artifacts", |b| {
        b.iter(|| black_box(aggregator.aggregate(dir.path()).unwrap()));
    });
}

criterion_group!(benches, fold_benchmark, aggregate_benchmark);
criterion_main!(benches);
