use crate::domain::entities::{CommitteeSnapshot, ValidatorRecord};
use crate::domain::errors::SerializationError;
use crate::ports::outbound::RecordSerializer;

/// Default record serializer using bincode.
///
/// Fixed-width little-endian integers and no maps in the persisted types, so
/// the encoding is identical on every replica.
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeRecordSerializer;

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    bincode::serialize(value).map_err(|e| SerializationError {
        message: e.to_string(),
    })
}

fn decode<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, SerializationError> {
    bincode::deserialize(data).map_err(|e| SerializationError {
        message: e.to_string(),
    })
}

impl RecordSerializer for BincodeRecordSerializer {
    fn serialize_record(&self, record: &ValidatorRecord) -> Result<Vec<u8>, SerializationError> {
        encode(record)
    }

    fn deserialize_record(&self, data: &[u8]) -> Result<ValidatorRecord, SerializationError> {
        decode(data)
    }

    fn serialize_snapshot(
        &self,
        snapshot: &CommitteeSnapshot,
    ) -> Result<Vec<u8>, SerializationError> {
        encode(snapshot)
    }

    fn deserialize_snapshot(&self, data: &[u8]) -> Result<CommitteeSnapshot, SerializationError> {
        decode(data)
    }
}
