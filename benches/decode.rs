use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scopetrace::alb::AlbDecoder;
use scopetrace::isf::{decode_group, ChannelInput, IsfDecoder};

fn isf_capture(points: usize) -> Vec<u8> {
    let payload: Vec<u8> = (0..points)
        .flat_map(|i| ((i % 4096) as i16 - 2048).to_be_bytes())
        .collect();
    let len = payload.len().to_string();
    let mut bytes = format!(
        ":WFMPRE:BYT_NR 2;BIT_NR 16;ENCDG BIN;BN_FMT RI;BYT_OR MSB;NR_PT {};\
         XINCR 4.0E-9;YMULT 80.0E-3;YOFF 0.0E0;:CURVE #{}{}",
        points,
        len.len(),
        len
    )
    .into_bytes();
    bytes.extend_from_slice(&payload);
    bytes
}

fn alb_capture(channels: usize, rows: usize) -> Vec<u8> {
    let mut header = String::new();
    for ch in 1..=channels {
        header.push_str(&format!(
            "TABLE_BEGIN \"Analog CH{}\"\nCOLUMN \"Voltage\" VALUE_BYTES=2 WIDTH_BITS=16\n\
             NUM_ROWS={}\nX_INC=1E-06\nY_INC=0.000244\nY_ORG=0.0\nTABLE_END\n",
            ch, rows
        ));
    }
    header.push_str("HEADER_END\n");
    let mut bytes = header.into_bytes();
    for _ in 0..channels {
        bytes.extend((0..rows).flat_map(|i| ((i % 1000) as i16).to_be_bytes()));
    }
    bytes
}

/// Benchmark single-channel ISF decoding
fn bench_isf(c: &mut Criterion) {
    let mut group = c.benchmark_group("isf_decode");

    for points in [10_000, 100_000, 1_000_000] {
        let bytes = isf_capture(points);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(points), &bytes, |b, bytes| {
            b.iter(|| black_box(IsfDecoder::decode_bytes(bytes).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark four-channel group assembly from in-memory captures
fn bench_isf_group(c: &mut Criterion) {
    let bytes = isf_capture(250_000);
    c.bench_function("isf_group_4ch", |b| {
        b.iter(|| {
            let inputs = (1..=4)
                .map(|n| ChannelInput::from_bytes(format!("CH{}", n), bytes.clone()))
                .collect();
            black_box(decode_group(inputs).unwrap())
        });
    });
}

/// Benchmark ALB decoding
fn bench_alb(c: &mut Criterion) {
    let mut group = c.benchmark_group("alb_decode");
    let decoder = AlbDecoder::default();

    for rows in [10_000, 100_000] {
        let bytes = alb_capture(4, rows);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &bytes, |b, bytes| {
            b.iter(|| black_box(decoder.decode_parts(bytes, None).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_isf, bench_isf_group, bench_alb);
criterion_main!(benches);
