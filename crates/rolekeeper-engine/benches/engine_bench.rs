//! Criterion microbenchmarks for rolekeeper-engine hot paths.
//!
//! Run with:
//!   cargo bench -p rolekeeper-engine
//!
//! HTML reports are written to `target/criterion/`.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rolekeeper_common::models::{GuildId, RoleDependency, RoleId};
use rolekeeper_common::nickname::format_nickname;
use rolekeeper_engine::DependencyGraph;

const GUILD: GuildId = GuildId(1);

fn edge(role: i64, requires: i64) -> RoleDependency {
    RoleDependency {
        guild_id: GUILD,
        role_id: RoleId(role),
        required_role_id: RoleId(requires),
    }
}

// ── Dependency resolution ─────────────────────────────────────────────────────

/// Closure over a straight chain `0 -> 1 -> ... -> n`.
fn bench_chain_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("dependencies/chain");

    for len in [8i64, 64, 512] {
        let graph = DependencyGraph::from_edges((0..len).map(|i| edge(i, i + 1)));
        group.bench_with_input(BenchmarkId::from_parameter(len), &graph, |b, g| {
            b.iter(|| g.resolve_full_hierarchy(black_box(RoleId(0))))
        });
    }

    group.finish();
}

/// Closure over a fully connected cycle, the worst case for the visited set.
fn bench_cycle_closure(c: &mut Criterion) {
    let roles = 64i64;
    let graph = DependencyGraph::from_edges(
        (0..roles).flat_map(|a| (0..roles).filter(move |b| *b != a).map(move |b| edge(a, b))),
    );

    c.bench_function("dependencies/dense_cycle", |b| {
        b.iter(|| graph.resolve_dependencies(black_box(RoleId(0))))
    });
}

// ── Nickname formatting ───────────────────────────────────────────────────────

fn bench_format_nickname(c: &mut Criterion) {
    c.bench_function("nickname/format_tagged", |b| {
        b.iter(|| {
            format_nickname(
                black_box("[MOD] {display_name} ({username})"),
                black_box("someone"),
                black_box("[OLD] Some Display Name"),
            )
        })
    });
}

// ── criterion entrypoints ─────────────────────────────────────────────────────

criterion_group!(dependencies, bench_chain_closure, bench_cycle_closure);
criterion_group!(nickname, bench_format_nickname);
criterion_main!(dependencies, nickname);
