use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use s3stream::{ByteStream, PollingStream, StreamConfig, StreamingDownload, StreamingUpload};
use std::sync::Arc;
use std::thread;

const TOTAL: usize = 4 * 1024 * 1024;
const CHUNK: usize = 64 * 1024;

fn pump<S: ByteStream + 'static>(stream: Arc<S>, data: Arc<Vec<u8>>, prune_after_read: bool) -> usize {
    let producer = {
        let stream = Arc::clone(&stream);
        thread::spawn(move || {
            for chunk in data.chunks(CHUNK) {
                stream.write(chunk);
            }
        })
    };

    let mut moved = 0;
    loop {
        let chunk = stream.read(CHUNK);
        if chunk.is_empty() {
            break;
        }
        moved += chunk.len();
        if prune_after_read {
            stream.prune(chunk.len());
        }
    }
    producer.join().unwrap();
    moved
}

fn bench_variants(c: &mut Criterion) {
    let data = Arc::new(vec![0xA5u8; TOTAL]);
    let cfg = StreamConfig {
        buffer_size: 512 * 1024,
        poll_initial_delay_ms: 0,
        poll_step_ms: 1,
        poll_max_delay_ms: 2,
    };

    let mut group = c.benchmark_group("stream_throughput");
    group.throughput(Throughput::Bytes(TOTAL as u64));

    group.bench_function("download", |b| {
        b.iter(|| {
            let s = Arc::new(StreamingDownload::with_config(TOTAL as u64, &cfg).unwrap());
            pump(s, Arc::clone(&data), false)
        })
    });

    group.bench_function("upload", |b| {
        b.iter(|| {
            let s = Arc::new(StreamingUpload::with_config(TOTAL as u64, &cfg).unwrap());
            pump(s, Arc::clone(&data), true)
        })
    });

    group.bench_function("polling", |b| {
        b.iter(|| {
            let s = Arc::new(PollingStream::with_config(TOTAL as u64, &cfg).unwrap());
            pump(s, Arc::clone(&data), false)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_variants);
criterion_main!(benches);
