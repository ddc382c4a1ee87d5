//! Canonical submission payloads
//!
//! Turns declarative test cases into the request body understood by the
//! remote claims API.

pub mod builder;

pub use builder::{
    build, build_with_total, BuiltPayload, SubmissionPayload, SubmittedLineItem, WireDateRange,
    WirePeriod,
};
