//! hq-framer - HTTP/3 (HQ) frame codec
//!
//! This crate turns HTTP/3 frame headers and type-specific payloads carried
//! on QUIC streams into typed values and back. It is stateless: every parse
//! works on a caller-owned byte cursor and every write on a caller-owned sink.

pub mod hq;
