//! Serializer Adapters
//!
//! Implementations of the `RecordSerializer` trait.

mod bincode;

pub use self::bincode::BincodeRecordSerializer;
