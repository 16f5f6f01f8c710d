//! Decoder for the structured API format

use log::debug;

use crate::constants::{
    STATE_AUTH_NEEDED, STATE_BAD_REQUEST, STATE_GENERAL_ERROR, STATE_IMPOSSIBLE_ACTION, STATE_OK,
};
use crate::error::{OmogenError, Result};
use crate::value::Value;

/// Decoded API payload
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Status code, normalized to text
    pub code: Option<String>,
    /// Human readable status text
    pub text: Option<String>,
    /// Raw object collection of a read
    pub object: Option<Value>,
    /// The full payload as received
    pub raw: serde_json::Value,
}

impl ApiResponse {
    /// Parse a payload and fail on known error codes
    ///
    /// Unknown or absent codes pass through as success.
    pub fn decode(body: &str) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_str(body)?;
        Self::from_json(raw)
    }

    pub fn from_json(raw: serde_json::Value) -> Result<Self> {
        let code = raw.get("code").and_then(|code| match code {
            serde_json::Value::String(s) => Some(s.trim().to_string()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        let text = raw
            .get("text")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);

        if let Some(code) = code.as_deref() {
            let message = || text.clone().unwrap_or_default();
            match code {
                STATE_AUTH_NEEDED => {
                    return Err(OmogenError::AuthNeeded(
                        format!("{} {}", code, message()).trim_end().to_string(),
                    ));
                }
                // A general error on a read is reported as a rejected request
                STATE_BAD_REQUEST | STATE_GENERAL_ERROR => {
                    return Err(OmogenError::BadRequest(message()));
                }
                STATE_IMPOSSIBLE_ACTION => return Err(OmogenError::ImpossibleAction(message())),
                _ => debug!("API response code {}", code),
            }
        }

        let object = raw.get("object").map(Value::from_json);

        Ok(Self {
            code,
            text,
            object,
            raw,
        })
    }

    /// Whether the payload carries the success code, or no code at all
    pub fn is_success(&self) -> bool {
        self.code.as_deref().is_none_or(|code| code == STATE_OK)
    }

    /// Ensure a read produced an object collection
    ///
    /// A success payload without one is an empty read; anything else is
    /// reported with the remote code and text.
    pub fn require_object(self) -> Result<Self> {
        if self.object.is_some() || self.is_success() {
            return Ok(self);
        }
        Err(OmogenError::Remote {
            code: self.code.unwrap_or_default(),
            text: self.text.unwrap_or_default(),
        })
    }

    /// Records of the first collection under `object`, keyed by ordinal remotely
    pub fn records(&self) -> Vec<&Value> {
        let first = match &self.object {
            Some(Value::Record(collections)) => collections.values().next(),
            Some(Value::List(collections)) => collections.first(),
            _ => None,
        };

        match first {
            Some(Value::Record(records)) => records.values().collect(),
            Some(Value::List(records)) => records.iter().collect(),
            _ => Vec::new(),
        }
    }
}
