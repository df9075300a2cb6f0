use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use mdpick_core::{Document, FilterConfig, Pipeline, postprocess_markdown, sanitize_element};

/// A page with `sections` article sections, each carrying removable noise.
fn synthetic_page(sections: usize) -> String {
    let mut html = String::from("<html><head><title>Bench</title></head><body><main id=\"main\">");
    for i in 0..sections {
        html.push_str(&format!(
            r#"<section class="post" data-index="{i}" style="margin: 0">
                <h2>Section {i}</h2>
                <p>Paragraph with <a href="/s/{i}" target="_blank" onclick="go()">a link</a> and <em>emphasis</em>.</p>
                <script>track({i});</script>
                <ul><li>one</li><li>two</li></ul>
                <img src="/img/{i}.png" alt="Image {i}" style="width: 100%">
                <form><input name="q{i}"></form>
            </section>"#
        ));
    }
    html.push_str("</main></body></html>");
    html
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for sections in [10, 100, 1000] {
        let html = synthetic_page(sections);
        group.bench_with_input(BenchmarkId::from_parameter(sections), &html, |b, html| {
            b.iter(|| Document::parse(black_box(html)))
        });
    }

    group.finish();
}

fn bench_sanitize(c: &mut Criterion) {
    let config = FilterConfig::default();
    let mut group = c.benchmark_group("sanitize");

    for sections in [10, 100, 1000] {
        let doc = Document::parse(&synthetic_page(sections)).unwrap();
        let main = doc.select_first("#main").unwrap().unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(sections), &main, |b, main| {
            b.iter(|| sanitize_element(&doc, black_box(*main), &config))
        });
    }

    group.finish();
}

fn bench_convert_selection(c: &mut Criterion) {
    let doc = Document::parse(&synthetic_page(100)).unwrap();
    let main = doc.select_first("#main").unwrap().unwrap();
    let pipeline = Pipeline::default();

    c.bench_function("convert_selection", |b| {
        b.iter(|| pipeline.convert_selection(&doc, black_box(main)))
    });
}

fn bench_postprocess(c: &mut Criterion) {
    let markdown = "# Title\n\n[]()\n\n\n\n[text]() and [](#) and [ok](/x)\n\n\n".repeat(500);

    c.bench_function("postprocess", |b| b.iter(|| postprocess_markdown(black_box(&markdown))));
}

criterion_group!(benches, bench_parse, bench_sanitize, bench_convert_selection, bench_postprocess);
criterion_main!(benches);
