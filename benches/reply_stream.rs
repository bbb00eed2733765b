use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use slangit::core::reply_stream::ReplyAccumulator;

/// A stream where every line repeats the reply so far, grown word by word.
fn make_stream(words: usize) -> Vec<u8> {
    let base = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod";
    let vocabulary: Vec<&str> = base.split(' ').collect();
    let mut reply = String::new();
    let mut stream = String::new();
    for i in 0..words {
        if !reply.is_empty() {
            reply.push(' ');
        }
        reply.push_str(vocabulary[i % vocabulary.len()]);
        let line = serde_json::json!({ "messageText": reply });
        stream.push_str("data: ");
        stream.push_str(&line.to_string());
        stream.push('\n');
    }
    stream.into_bytes()
}

fn bench_reply_stream(c: &mut Criterion) {
    for &words in &[50usize, 400usize] {
        let stream = make_stream(words);
        let mut group = c.benchmark_group(format!("reply_stream_words{words}"));
        group.throughput(Throughput::Bytes(stream.len() as u64));

        for &chunk_size in &[64usize, 4096usize] {
            group.bench_with_input(
                BenchmarkId::new("chunked", chunk_size),
                &chunk_size,
                |b, &chunk_size| {
                    b.iter(|| {
                        let mut accumulator = ReplyAccumulator::new();
                        for chunk in stream.chunks(chunk_size) {
                            accumulator.push(chunk);
                        }
                        accumulator.finish()
                    })
                },
            );
        }
        group.finish();
    }
}

criterion_group!(benches, bench_reply_stream);
criterion_main!(benches);
