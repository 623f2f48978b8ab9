//! Layout engine micro-benchmarks
//!
//! Measures a full layout pass (styles, numbering, sections, measurement,
//! pagination) for documents of growing size.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use folio::{DocumentVersion, FlowDocument, LayoutSession};
use serde_json::{Value, json};

fn paragraph(id: usize, words: usize) -> Value {
    let text = (0..words)
        .map(|w| format!("word{}", w % 17))
        .collect::<Vec<_>>()
        .join(" ");
    json!({
        "kind": "paragraph",
        "id": format!("p{}", id),
        "runs": [{ "kind": "text", "text": text, "srcStart": id * 1000 }]
    })
}

fn numbered(id: usize) -> Value {
    let mut p = paragraph(id, 12);
    p["attrs"] = json!({ "numbering": { "numId": 1, "level": (id % 2) } });
    p
}

fn styles() -> Value {
    json!({
        "numbering": {
            "1": {
                "levels": [
                    { "format": "decimal", "text": "%1." },
                    { "format": "lowerLetter", "text": "%1.%2." }
                ]
            }
        }
    })
}

fn document(blocks: Vec<Value>) -> FlowDocument {
    serde_json::from_value(json!({ "blocks": blocks })).expect("Failed to build document")
}

fn session() -> LayoutSession {
    let styles = serde_json::from_value(styles()).expect("Failed to parse styles");
    LayoutSession::new(
        Default::default(),
        styles,
        std::sync::Arc::new(folio::FixedAdvanceMeasurer::default()),
    )
}

fn benchmark_layout_simple_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_simple_text");

    for word_count in [10, 100, 1000] {
        let doc = document(vec![paragraph(0, word_count)]);
        let mut session = session();

        group.bench_with_input(BenchmarkId::new("words", word_count), &word_count, |b, _| {
            b.iter(|| {
                session
                    .layout(&doc, DocumentVersion::default())
                    .expect("Failed to lay out document")
            });
        });
    }

    group.finish();
}

fn benchmark_layout_many_paragraphs(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_many_paragraphs");

    for paragraph_count in [10, 100, 500] {
        let doc = document((0..paragraph_count).map(|i| paragraph(i, 40)).collect());
        let mut session = session();

        group.bench_with_input(
            BenchmarkId::new("paragraphs", paragraph_count),
            &paragraph_count,
            |b, _| {
                b.iter(|| {
                    session
                        .layout(&doc, DocumentVersion::default())
                        .expect("Failed to lay out document")
                });
            },
        );
    }

    group.finish();
}

fn benchmark_layout_numbered_lists(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_numbered_lists");

    for item_count in [10, 100, 500] {
        let doc = document((0..item_count).map(numbered).collect());
        let mut session = session();

        group.bench_with_input(BenchmarkId::new("items", item_count), &item_count, |b, _| {
            b.iter(|| {
                session
                    .layout(&doc, DocumentVersion::default())
                    .expect("Failed to lay out document")
            });
        });
    }

    group.finish();
}

fn benchmark_cold_caches(c: &mut Criterion) {
    let doc = document((0..100).map(|i| paragraph(i, 40)).collect());
    let mut session = session();

    c.bench_function("layout_cold_caches", |b| {
        b.iter(|| {
            session.clear_font_caches();
            session
                .layout(&doc, DocumentVersion::default())
                .expect("Failed to lay out document")
        });
    });
}

criterion_group!(
    benches,
    benchmark_layout_simple_text,
    benchmark_layout_many_paragraphs,
    benchmark_layout_numbered_lists,
    benchmark_cold_caches
);
criterion_main!(benches);
