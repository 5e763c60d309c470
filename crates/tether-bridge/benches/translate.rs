use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tether_bridge::{bootstrap, context_to_dict, dict_to_context, AcquireLock, Bridge};
use tether_host::EmbeddedHost;
use tether_rpc::{
    Context, Identity, LocalException, LocalKind, RequestFailedKind, RpcException,
    RuntimeException,
};

fn bench_to_host(c: &mut Criterion) {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();

    let mut group = c.benchmark_group("to_host");
    let cases: Vec<(&str, RpcException)> = vec![
        ("plain", LocalException::new(LocalKind::Timeout).into()),
        (
            "request_failed",
            LocalException::request_failed(
                RequestFailedKind::ObjectNotExist,
                Identity::new("foo", "bar"),
                "f",
                "op",
            )
            .into(),
        ),
        ("fallback", RuntimeException::new("::X", "unmapped").into()),
    ];
    for (name, ex) in &cases {
        group.bench_with_input(BenchmarkId::new("convert", name), ex, |b, ex| {
            b.iter(|| bridge.convert_exception(py, black_box(ex)).unwrap());
        });
    }
    group.finish();
}

fn bench_round_trip(c: &mut Criterion) {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();
    bootstrap::install(py).unwrap();
    let bridge = Bridge::default();

    let ex: RpcException = LocalException::new(LocalKind::UnsupportedEncoding).into();
    c.bench_function("round_trip_version_mismatch", |b| {
        b.iter(|| {
            let instance = bridge.convert_exception(py, black_box(&ex)).unwrap();
            bridge.to_native_exception(py, Some(&instance))
        });
    });
}

fn bench_context(c: &mut Criterion) {
    let host = EmbeddedHost::new();
    let guard = AcquireLock::new(&host);
    let py = guard.token();

    let mut group = c.benchmark_group("context");
    for size in [4usize, 64] {
        let ctx: Context = (0..size)
            .map(|i| (format!("key{}", i), format!("value{}", i)))
            .collect();
        group.bench_with_input(BenchmarkId::new("round_trip", size), &ctx, |b, ctx| {
            b.iter(|| {
                let dict = context_to_dict(py, black_box(ctx)).unwrap();
                let back = dict_to_context(py, &dict).unwrap();
                back
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_to_host, bench_round_trip, bench_context);
criterion_main!(benches);
