use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use totp_engine::{Secret, TotpClock, Verifier, base32, hotp};

const SECRET: &[u8] = b"12345678901234567890";

fn hotp_benchmark(c: &mut Criterion) {
    c.bench_function("hotp 6 digits", |b| {
        b.iter(|| hotp::generate(SECRET, 1, 6))
    });
}

fn verify_benchmark(c: &mut Criterion) {
    let secret = Secret::from_bytes(SECRET.to_vec());
    let verifier = Verifier::default();
    let code = TotpClock::default()
        .current_code(&secret, 1_700_000_000)
        .unwrap_or_else(|err| panic!("{err}"));

    c.bench_function("verify window 1", |b| {
        b.iter(|| verifier.check(code.as_str(), &secret, 1_700_000_000))
    });
    c.bench_function("verify miss window 1", |b| {
        b.iter(|| verifier.check("000000", &secret, 1_700_000_000))
    });
}

fn base32_benchmark(c: &mut Criterion) {
    let text = base32::encode(&[0xa5u8; 200]);

    let mut group = c.benchmark_group("throughput");
    group.throughput(Throughput::Bytes(200));
    group.bench_function("base32 decode 200", |b| b.iter(|| base32::decode(&text)));
    group.finish();
}

criterion_group!(benches, hotp_benchmark, verify_benchmark, base32_benchmark);
criterion_main!(benches);
