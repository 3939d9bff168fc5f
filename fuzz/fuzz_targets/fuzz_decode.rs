#![no_main]

use vox_scene::{DecodeOptions, DecodeOutcome};

#[derive(Debug, arbitrary::Arbitrary)]
struct Input<'a> {
    options: DecodeOptions,
    bytes: &'a [u8],
}

libfuzzer_sys::fuzz_target!(|input: Input<'_>| test(input));

fn test(Input { options, bytes }: Input<'_>) {
    let Ok(DecodeOutcome::Decoded { model, report }) = vox_scene::decode(bytes, &options) else {
        return;
    };

    // Every chunk logged was within the input.
    for entry in &report.chunk_log {
        assert!(entry.content_size + entry.children_size <= bytes.len());
    }
    for frame in &model.frames {
        assert!(frame.voxel_count() <= frame.size().to_usize().volume());
    }

    // Interpreting the scene graph may fail, but must not panic.
    let _ = model.scene_graph().instances();

    if options.write_diagnostic_log {
        report.write_chunk_log(std::io::sink()).unwrap();
    }
}
