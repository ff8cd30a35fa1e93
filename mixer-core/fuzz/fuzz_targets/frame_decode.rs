#![no_main]

use libfuzzer_sys::fuzz_target;
use mixer_core::infrastructure::transport::encoding::{decode_message, encode_message};

fuzz_target!(|data: &[u8]| {
    if let Ok(message) = decode_message(data) {
        let reencoded = encode_message(&message).expect("decoded message re-encodes");
        assert_eq!(decode_message(&reencoded).ok(), Some(message));
    }
});
