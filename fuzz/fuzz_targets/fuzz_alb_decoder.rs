#![no_main]

use libfuzzer_sys::fuzz_target;

use scopetrace::alb::AlbDecoder;

fuzz_target!(|data: &[u8]| {
    let decoder = AlbDecoder::default();
    if let Ok(capture) = decoder.decode_parts(data, None) {
        for (_, trace) in capture.traces.iter() {
            assert_eq!(trace.len(), capture.traces.time().len());
        }
    }
});
