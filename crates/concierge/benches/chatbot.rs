use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use concierge::chatbot::{check_phone_number, get_url, nice_to_meet_you, remove_emoji};

const MESSAGE: &str = "emoji12 Hi! I found exercism.org and rust-lang.org emoji7 really useful \
                       emoji3465 my number is (+34) 659-771-594 and my name is Sanz, Pablo";

fn bench_chatbot(c: &mut Criterion) {
    let mut group = c.benchmark_group("chatbot");

    group.bench_function("remove_emoji", |b| b.iter(|| remove_emoji(black_box(MESSAGE))));
    group.bench_function("check_phone_number", |b| {
        b.iter(|| check_phone_number(black_box(MESSAGE)))
    });
    group.bench_function("get_url", |b| b.iter(|| get_url(black_box(MESSAGE))));
    group.bench_function("nice_to_meet_you", |b| {
        b.iter(|| nice_to_meet_you(black_box(MESSAGE)))
    });

    group.finish();
}

criterion_group!(benches, bench_chatbot);
criterion_main!(benches);
