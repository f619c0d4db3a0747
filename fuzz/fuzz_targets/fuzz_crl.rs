#![no_main]
use der_codec::config::Context;
use der_codec::crl::X509Crl;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let ctx = Context::default();
    if let Ok(crl) = X509Crl::from_der(data, &ctx) {
        // whatever decodes must encode again
        let _ = crl.tbs_der(&ctx).expect("re-encoding failed");
    }
});
