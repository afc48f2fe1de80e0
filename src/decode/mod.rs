//! Response decoder module
//!
//! The activity endpoint answers with a JSON envelope; the decoder pulls the
//! event rows out of it by a dot-notation record path.

mod decoders;
mod types;

pub use decoders::JsonDecoder;
pub use types::RecordDecoder;
