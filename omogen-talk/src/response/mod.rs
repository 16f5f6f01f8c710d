//! Response decoders
//!
//! Reads come back in the structured API format, writes in the positional
//! PDA format. Both decoders fail early on error codes so that no
//! materialization happens on an error payload.

pub mod api;
pub mod pda;

pub use api::ApiResponse;
pub use pda::{PdaResponse, PdaStatus};
