//! # Line Codec
//!
//! Defines the on-disk format of a collection: UTF-8 text, one JSON object per line,
//! every record terminated by exactly one `\n`. No header, footer or file metadata.
//!
//! - [`decode_line`] / [`encode_line`]: one record to and from one line.
//! - [`CollectionReader`]: forward-only reading with an explicit end of stream.
//! - [`append_record`]: the durable, line-atomic append used by the collection actor.
//!
//! Numbers always decode as `f64`. A record appended with `{"a": 1}` reads back as
//! `{"a": 1.0}`; existing files depend on this, so it is kept as is. NaN and the infinities
//! have no JSON form and fail with [`CodecError::EncodeFailure`] instead of becoming `null`.

pub mod error;
pub(crate) mod finite;
pub mod line;
pub mod reader;
pub mod writer;

pub use error::CodecError;
pub use line::{decode_line, encode_line};
pub use reader::{read_collection, CollectionReader};
pub use writer::{append_record, AppendOptions};
