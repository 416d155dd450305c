use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use css_core::classdb::{AddFlags, ClassDb};
use css_core::combinator::Combinator;
use css_core::ruledb::RuleDb;
use css_core::test_util::FixtureClass;
use css_search::queue::WorkQueue;
use css_tree::counting::compositions;
use css_tree::prune::prune;
use css_tree::rule_dict::{RewrittenRule, RewrittenRuleDict};

// ---------------------------------------------------------------------------
// ClassDb::add
// ---------------------------------------------------------------------------

fn bench_classdb_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("classdb_add");
    for &n in &[100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut db: ClassDb<FixtureClass> = ClassDb::new();
                for i in 0..n {
                    black_box(db.add(FixtureClass::leaf(format!("c{i}")), AddFlags::default()));
                }
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// WorkQueue push/pop
// ---------------------------------------------------------------------------

fn bench_queue_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_push_pop");
    for &n in &[100u32, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut queue = WorkQueue::new();
                for i in 0..n {
                    queue.add_next(css_core::label::Label::from_raw(i));
                }
                while let Some(label) = queue.pop() {
                    black_box(label);
                }
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// prune over a linear equivalence chain
// ---------------------------------------------------------------------------

fn chain_rule_dict(n: u32) -> RewrittenRuleDict {
    let mut dict = RewrittenRuleDict::new();
    for i in 0..n {
        let label = css_core::label::Label::from_raw(i);
        let children = if i + 1 < n {
            vec![css_core::label::Label::from_raw(i + 1)]
        } else {
            Vec::new()
        };
        dict.insert(
            label,
            vec![RewrittenRule {
                original_parent: label,
                original_children: children.clone(),
                children,
                formal_step: "step".to_string(),
                combinator: Combinator::Disjoint,
            }],
        );
    }
    dict
}

fn bench_prune_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("prune_chain");
    for &n in &[10u32, 100, 1_000] {
        let dict = chain_rule_dict(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &dict, |b, dict| {
            b.iter(|| black_box(prune(dict)));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// compositions(n, k)
// ---------------------------------------------------------------------------

fn bench_compositions(c: &mut Criterion) {
    let mut group = c.benchmark_group("compositions");
    for &(n, k) in &[(10usize, 2usize), (14, 3), (18, 4)] {
        group.bench_with_input(BenchmarkId::new(format!("k={k}"), n), &(n, k), |b, &(n, k)| {
            b.iter(|| black_box(compositions(n, k)));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// RuleDb::add churn
// ---------------------------------------------------------------------------

fn bench_ruledb_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("ruledb_add");
    for &n in &[100u32, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut ruledb = RuleDb::new();
                for i in 0..n {
                    let parent = css_core::label::Label::from_raw(i);
                    let child = css_core::label::Label::from_raw(i + 1);
                    ruledb.add(parent, vec![child], "split", Combinator::Disjoint);
                }
                black_box(&ruledb);
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_classdb_add,
    bench_queue_push_pop,
    bench_prune_chain,
    bench_compositions,
    bench_ruledb_add,
);
criterion_main!(benches);
