use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

use crate::bson::Bson;

pub(crate) fn serialize_duration_option_as_int_millis<S: Serializer>(
    val: &Option<Duration>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match val {
        Some(duration) if duration.as_millis() > i32::MAX as u128 => {
            serializer.serialize_i64(duration.as_millis() as i64)
        }
        Some(duration) => serializer.serialize_i32(duration.as_millis() as i32),
        None => serializer.serialize_none(),
    }
}

pub(crate) fn deserialize_duration_option_from_u64_millis<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = Option::<u64>::deserialize(deserializer)?;
    Ok(millis.map(Duration::from_millis))
}

/// Converts a duration to the integer BSON value used for time-limit command fields, widening
/// to an `Int64` only when the value does not fit in an `Int32`.
pub(crate) fn duration_as_int_millis(duration: Duration) -> Bson {
    if duration.as_millis() > i32::MAX as u128 {
        Bson::Int64(duration.as_millis() as i64)
    } else {
        Bson::Int32(duration.as_millis() as i32)
    }
}
