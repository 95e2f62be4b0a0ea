//! Criterion benchmarks for the quiver fusion pipeline.
//!
//! Covers the hot, collaborator-free paths: evidence fusion (merge +
//! dedup), re-rank reordering, and query plan flattening.

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use quiver::document::Document;
use quiver::fusion::{EvidenceSet, PlanUnit, QueryPlan};
use quiver::query::Query;

/// Generate retrieval result lists with a configurable duplication rate.
fn generate_result_lists(lists: usize, per_list: usize, distinct: usize) -> Vec<Vec<Document>> {
    (0..lists)
        .map(|list| {
            (0..per_list)
                .map(|i| {
                    let id = (list * per_list + i) % distinct;
                    Document::new(
                        format!("doc:{id}"),
                        format!("content for document {id}"),
                        1.0 - (i as f32 / per_list as f32),
                    )
                })
                .collect()
        })
        .collect()
}

fn bench_evidence_fusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("evidence_fusion");

    for &(lists, per_list, distinct) in &[(4, 5, 12), (16, 10, 40), (16, 10, 160)] {
        let results = generate_result_lists(lists, per_list, distinct);
        group.throughput(Throughput::Elements((lists * per_list) as u64));
        group.bench_function(format!("merge_{lists}x{per_list}_distinct{distinct}"), |b| {
            b.iter(|| {
                let mut evidence = EvidenceSet::new();
                for list in &results {
                    evidence.extend(list.iter().cloned());
                }
                black_box(evidence.len())
            })
        });
    }

    group.finish();
}

fn bench_rerank_reorder(c: &mut Criterion) {
    let mut evidence = EvidenceSet::new();
    for list in generate_result_lists(16, 10, 160) {
        evidence.extend(list);
    }
    let mut ranked: Vec<Document> = evidence.documents().to_vec();
    ranked.reverse();

    c.bench_function("rerank_reorder_160", |b| {
        b.iter(|| black_box(evidence.reordered(ranked.clone()).len()))
    });
}

fn bench_plan_flatten(c: &mut Criterion) {
    let original = Query::user("compare several things across several dimensions");
    let mut plan = QueryPlan::new();
    for unit_index in 0..5 {
        let unit = Query::sub_query(format!("sub-question {unit_index}"), &original);
        let mut plan_unit = PlanUnit::new(unit.clone());
        plan_unit.push(Query::step_back(format!("broader {unit_index}"), &unit));
        for variation in 0..3 {
            plan_unit.push(Query::paraphrase(
                format!("variation {unit_index}-{variation}"),
                &unit,
            ));
        }
        plan.push_unit(plan_unit);
    }

    c.bench_function("plan_flatten_5x5", |b| {
        b.iter(|| black_box(plan.to_queries().len()))
    });
}

criterion_group!(
    benches,
    bench_evidence_fusion,
    bench_rerank_reorder,
    bench_plan_flatten
);
criterion_main!(benches);
