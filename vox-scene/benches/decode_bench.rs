use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};

use vox_scene::{DecodeOptions, decode};

criterion_group!(benches, decode_bench);
criterion_main!(benches);

fn decode_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for (name, bytes) in [
        ("dense 64", vox_file(64, 64 * 64 * 64)),
        ("sparse 256", vox_file(256, 10_000)),
    ] {
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| decode(black_box(&bytes), &DecodeOptions::default()).unwrap());
        });
        group.bench_function(format!("{name} checked with log"), |b| {
            let options = DecodeOptions {
                write_diagnostic_log: true,
                run_integrity_checks: true,
                ..DecodeOptions::default()
            };
            b.iter(|| decode(black_box(&bytes), &options).unwrap());
        });
    }

    group.finish();
}

/// Builds a file with one cubical model of the given size, filled with `count` voxels,
/// and a minimal scene graph placing it.
fn vox_file(size: u16, count: usize) -> Vec<u8> {
    fn chunk(tag: &[u8; 4], content: &[u8], children: &[u8]) -> Vec<u8> {
        let mut bytes = tag.to_vec();
        bytes.extend(u32::try_from(content.len()).unwrap().to_le_bytes());
        bytes.extend(u32::try_from(children.len()).unwrap().to_le_bytes());
        bytes.extend(content);
        bytes.extend(children);
        bytes
    }
    fn ints(values: &[i32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    let side = i32::from(size);
    let mut voxels = ints(&[i32::try_from(count).unwrap()]);
    let extent = usize::from(size);
    for i in 0..count {
        let x = i % extent;
        let y = (i / extent) % extent;
        let z = (i / extent / extent) % extent;
        voxels.extend([x as u8, y as u8, z as u8, (i % 255) as u8 + 1]);
    }

    let children = [
        chunk(b"SIZE", &ints(&[side, side, side]), &[]),
        chunk(b"XYZI", &voxels, &[]),
        // transform 0 -> group 1 -> transform 2 -> shape 3
        chunk(b"nTRN", &ints(&[0, 0, 1, -1, 0, 1, 0]), &[]),
        chunk(b"nGRP", &ints(&[1, 0, 1, 2]), &[]),
        chunk(b"nTRN", &ints(&[2, 0, 3, -1, 0, 1, 0]), &[]),
        chunk(b"nSHP", &ints(&[3, 0, 1, 0, 0]), &[]),
    ]
    .concat();

    let mut file = b"VOX ".to_vec();
    file.extend(150i32.to_le_bytes());
    file.extend(chunk(b"MAIN", &[], &children));
    file
}
