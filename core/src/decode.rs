//! JSON decoding and encoding for TMDB payloads.
//!
//! Field mapping lives on each type in `types` as serde attributes; this
//! module only decides how failures are reported. A buffer either decodes in
//! full or the call fails, so callers never see a half-populated value.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|e| ApiError::Decoding(e.to_string()))
}

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(value).map_err(|e| ApiError::Encoding(e.to_string()))
}
