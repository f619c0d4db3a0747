#![no_main]
use der_codec::ber::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = BerDecoder::new(data);
    while let Ok(Some(obj)) = decoder.next_object() {
        let _ = ber_check_nested(&obj, 0);
        let _ = obj.to_vec();
    }
});
