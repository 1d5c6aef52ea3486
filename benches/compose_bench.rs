//! Benchmarks for text extraction and composition at varying content sizes.
//!
//! Run with: `cargo bench --bench compose_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use crosspost::compose::compose_post;
use crosspost::content::extract_text;
use crosspost::facets::derive_link_facets;
use crosspost::Content;

const PERMALINK: &str = "https://me.example/notes/2024/05/a-post";

/// Generate an HTML post body of approximately `target_bytes`.
fn generate_html(target_bytes: usize) -> String {
    let paragraph = "<p>Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
        Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.</p>\n";
    let link_block =
        r#"<p>See <a href="https://example.com/article">this article</a> for more details.</p>"#;

    let mut html = String::with_capacity(target_bytes + 256);
    let mut i = 0;
    while html.len() < target_bytes {
        html.push_str(if i % 3 == 2 { link_block } else { paragraph });
        i += 1;
    }
    html
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_text");
    for size in [512, 4 * 1024, 64 * 1024] {
        let content = Content::html(generate_html(size));
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &content, |b, content| {
            b.iter(|| extract_text(black_box(content)));
        });
    }
    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose_post");
    for size in [100, 300, 4 * 1024] {
        let text: String = "word ".repeat(size / 5);
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| compose_post(None, black_box(text), Some(PERMALINK), true));
        });
    }
    group.finish();
}

fn bench_link_facets(c: &mut Criterion) {
    let html = generate_html(4 * 1024);
    let text = extract_text(&Content::html(html.clone()));
    c.bench_function("derive_link_facets/4096", |b| {
        b.iter(|| derive_link_facets(black_box(&html), black_box(&text)));
    });
}

criterion_group!(benches, bench_extract, bench_compose, bench_link_facets);
criterion_main!(benches);
