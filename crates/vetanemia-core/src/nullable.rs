//! Field deserializer for backend values that may arrive as `null`.

use serde::{Deserialize, Deserializer};

/// Reads `null` as the field's default instead of failing the whole record.
/// Missing fields still need `#[serde(default)]` on the field or container.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
