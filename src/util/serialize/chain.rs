use {
    crate::domain::eth,
    serde::{Deserialize, Deserializer, Serializer, de},
    serde_with::{DeserializeAs, SerializeAs},
};

/// Serialize and deserialize [`eth::ChainId`] as its numeric value.
#[derive(Debug)]
pub struct ChainId;

impl<'de> DeserializeAs<'de, eth::ChainId> for ChainId {
    fn deserialize_as<D: Deserializer<'de>>(deserializer: D) -> Result<eth::ChainId, D::Error> {
        let value = u64::deserialize(deserializer)?;
        eth::ChainId::new(value).map_err(de::Error::custom)
    }
}

impl SerializeAs<eth::ChainId> for ChainId {
    fn serialize_as<S: Serializer>(
        value: &eth::ChainId,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.value())
    }
}
