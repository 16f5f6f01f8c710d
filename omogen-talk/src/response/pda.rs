//! Decoder for the positional PDA format
//!
//! Line 0 carries the status code; the meaning of the other lines depends
//! on it. On success: line 1 is the identifier, line 2 is blank and lines 3
//! up to (not including) the last one list the fields the store ignored.

use log::debug;

use crate::constants::{
    ID_DELIMITER, MAX_ID_LENGTH, STATE_AUTH_NEEDED, STATE_AUTH_REQUESTED, STATE_GENERAL_ERROR,
    STATE_IMPOSSIBLE_ACTION, STATE_OK,
};
use crate::error::{OmogenError, Result};

/// Status classification of a PDA response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdaStatus {
    Ok,
    AuthNeeded,
    GeneralError,
    ImpossibleAction,
    AuthRequested,
}

impl PdaStatus {
    /// Detect the status from the first line
    ///
    /// The store may pad the code, so containment is checked rather than
    /// equality, in a fixed order.
    pub fn detect(line: &str) -> Option<Self> {
        [
            (STATE_OK, Self::Ok),
            (STATE_AUTH_NEEDED, Self::AuthNeeded),
            (STATE_GENERAL_ERROR, Self::GeneralError),
            (STATE_IMPOSSIBLE_ACTION, Self::ImpossibleAction),
            (STATE_AUTH_REQUESTED, Self::AuthRequested),
        ]
        .into_iter()
        .find(|(code, _)| line.contains(code))
        .map(|(_, status)| status)
    }

    /// HTTP-equivalent status
    pub fn http_status(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::AuthNeeded | Self::AuthRequested => 403,
            Self::GeneralError => 500,
            Self::ImpossibleAction => 400,
        }
    }
}

/// Decoded PDA payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdaResponse {
    /// Missing when no known code was found: the outcome is indeterminate
    pub status: Option<PdaStatus>,
    pub id: Option<String>,
    /// Fields the store declined to persist
    pub ignored_fields: Vec<String>,
    pub message: Option<String>,
    pub raw: String,
}

impl PdaResponse {
    pub fn decode(text: &str) -> Self {
        let lines: Vec<&str> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect();
        let line = |index: usize| lines.get(index).copied().unwrap_or_default();

        let mut response = Self {
            raw: text.to_string(),
            ..Self::default()
        };
        response.status = PdaStatus::detect(line(0));

        match response.status {
            Some(PdaStatus::Ok) => {
                response.id = Some(extract_id(line(1)).to_string());
                let last = lines.len().saturating_sub(1);
                response.ignored_fields = lines
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| *index >= 3 && *index < last)
                    .map(|(_, line)| line.to_string())
                    .collect();
            }
            Some(PdaStatus::ImpossibleAction) => {
                let message = if line(3).is_empty() { line(1) } else { line(3) };
                response.message = Some(message.to_string());
            }
            Some(PdaStatus::AuthRequested) => {
                response.message = Some(text.to_string());
            }
            Some(_) => {}
            None => debug!("PDA response without known status: {:?}", line(0)),
        }

        response
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status.map(PdaStatus::http_status)
    }

    pub fn is_success(&self) -> bool {
        self.status == Some(PdaStatus::Ok)
    }

    /// Turn a non-success status into the matching error
    pub fn into_result(self) -> Result<Self> {
        let Some(status) = self.status else {
            return Err(OmogenError::Indeterminate(self.raw));
        };
        if status == PdaStatus::Ok {
            return Ok(self);
        }

        let message = self
            .message
            .unwrap_or_else(|| self.raw.trim().to_string());
        Err(match status {
            PdaStatus::AuthNeeded => OmogenError::AuthNeeded(message),
            PdaStatus::AuthRequested => OmogenError::AuthRequested(message),
            PdaStatus::ImpossibleAction => OmogenError::ImpossibleAction(message),
            _ => OmogenError::GeneralError(message),
        })
    }
}

/// Identifier line, cut at the delimiter when the prefix is short enough (in bytes)
fn extract_id(line: &str) -> &str {
    let head = line.split(ID_DELIMITER).next().unwrap_or(line);
    if head.len() <= MAX_ID_LENGTH {
        head
    } else {
        line
    }
}
