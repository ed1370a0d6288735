#![no_main]

use libfuzzer_sys::fuzz_target;

use scopetrace::isf::IsfDecoder;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail with an error, never panic
    if let Ok(waveform) = IsfDecoder::decode_bytes(data) {
        if let Ok(axis) = waveform.time_axis() {
            assert_eq!(axis.len(), waveform.samples.len());
        }
    }
});
