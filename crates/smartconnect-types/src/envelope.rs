//! SmartAPI response envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiError, Result};

/// Uniform wrapper around every SmartAPI response.
///
/// The payload is kept as raw JSON until the status flag has been checked:
/// failed responses often carry `"data": ""` or `null`, which would not
/// decode into the success payload type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    /// Whether the call succeeded.
    #[serde(default)]
    pub status: bool,
    /// Human readable message.
    #[serde(default)]
    pub message: String,
    /// Machine error code, empty on success.
    #[serde(rename = "errorcode", default)]
    pub error_code: String,
    /// Payload.
    #[serde(default)]
    pub data: T,
}

impl Envelope<Value> {
    /// Converts the envelope into its typed payload.
    ///
    /// A `status: false` envelope becomes an [`ApiError`]. A successful
    /// envelope with a `null` payload yields `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SmartConnectError::Api`] if the status flag is false,
    /// or [`crate::SmartConnectError::Json`] if the payload does not match `T`.
    pub fn into_result<T>(self) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        if !self.status {
            return Err(ApiError::new(self.message, self.error_code).into());
        }

        match self.data {
            Value::Null => Ok(T::default()),
            data => Ok(serde_json::from_value(data)?),
        }
    }
}

impl<T> Envelope<T> {
    /// Returns the envelope's error, if the status flag is false.
    #[must_use]
    pub fn error(&self) -> Option<ApiError> {
        (!self.status).then(|| ApiError::new(self.message.clone(), self.error_code.clone()))
    }
}
