use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kairos_core::parser::Grammar;
use kairos_core::{Extractor, ExtractorConfig};

fn bench_extract(c: &mut Criterion) {
    let now = NaiveDate::from_ymd_opt(2010, 10, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let extractor = Extractor::default();
    let grammar_only = Extractor::new(ExtractorConfig::new().with_external(false)).unwrap();

    let inputs = vec![
        "Thu, 12/02/10 8:00 PM PST (7:00 PM DOORS)",
        "10.30 Doors Open 09:30, Show Starts 11pm",
        "Oct 29, 2010, 9:00 PM",
        "10/24/2010 21:30",
        "Show 9:00 pm 1.8",
    ];

    c.bench_function("grammar_tokenize_single", |b| {
        let grammar = Grammar::new();
        b.iter(|| grammar.tokenize(black_box(inputs[0])).unwrap());
    });

    c.bench_function("extract_single", |b| {
        b.iter(|| extractor.extract_at(black_box(inputs[0]), now).unwrap());
    });

    c.bench_function("extract_batch_5", |b| {
        b.iter(|| {
            for input in &inputs {
                let _ = extractor.extract_at(black_box(input), now).unwrap();
            }
        });
    });

    c.bench_function("extract_batch_5_grammar_only", |b| {
        b.iter(|| {
            for input in &inputs {
                let _ = grammar_only.extract_at(black_box(input), now).unwrap();
            }
        });
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
