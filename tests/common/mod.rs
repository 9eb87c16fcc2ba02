#![allow(dead_code)]
//! Shared integration test utilities.

use bytes::{Bytes, BytesMut};
use hq_framer::hq::{decode_frame_header, FrameHeader};
use proptest::prelude::ProptestConfig;
use proptest::test_runner::RngSeed;
use std::sync::Once;

static INIT_LOGGING: Once = Once::new();

/// Seed for property tests when running under CI.
pub const DEFAULT_PROPTEST_SEED: u64 = 0x5EED5EED;

const PROPTEST_SEED_ENV: &str = "HQ_FRAMER_PROPTEST_SEED";

/// Initialize tracing output for tests; only the first call has an effect.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_target(true)
            .with_ansi(false)
            .try_init();
    });
}

/// ProptestConfig with a fixed seed under CI or when the seed env var is set.
pub fn test_proptest_config(cases: u32) -> ProptestConfig {
    let mut config = ProptestConfig::with_cases(cases);
    if matches!(config.rng_seed, RngSeed::Random) {
        if let Some(seed) = read_proptest_seed() {
            config.rng_seed = RngSeed::Fixed(seed);
        }
    }
    config
}

fn read_proptest_seed() -> Option<u64> {
    if let Ok(value) = std::env::var(PROPTEST_SEED_ENV) {
        return value.parse::<u64>().ok();
    }
    std::env::var("CI").ok().map(|_| DEFAULT_PROPTEST_SEED)
}

/// Encode with `write`, then decode the frame header, returning it and the
/// remaining payload cursor.
pub fn encode_then_header<F>(write: F) -> (FrameHeader, Bytes)
where
    F: FnOnce(&mut BytesMut) -> hq_framer::hq::WriteResult,
{
    let mut buf = BytesMut::new();
    write(&mut buf).expect("write should succeed");
    let mut cursor = buf.freeze();
    let header = decode_frame_header(&mut cursor)
        .complete()
        .expect("header should decode");
    (header, cursor)
}

/// Deterministic payload of `len` bytes.
pub fn make_buf(len: usize) -> Bytes {
    (0..len).map(|i| (i % 251) as u8).collect::<Vec<u8>>().into()
}
