//! Handshake-step data (§4.G steps 1-7): version exchange, auth request
//! and the status codes the server replies with.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PasswordScheme {
    Plaintext,
    None,
}

/// Status codes sent back on a `Status` message (§4.G step 5-7).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum StatusCode {
    Ok = 0,
    NicknameInUse = 1,
    IncompatibleVersion = 2,
    AuthFailed = 3,
    GameNotFound = 4,
    GameFull = 5,
    SeatTaken = 6,
}

/// Reasons a connection is refused outright before any game-specific
/// status can be sent (§4.G "REJECTCONNECTION").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("client version {client} is older than the minimum {required} this server accepts")]
    VersionTooOld { client: u32, required: u32 },
    #[error("nickname '{0}' is already connected")]
    NicknameInUse(String),
    #[error("server is at capacity")]
    ServerFull,
}

/// The server's minimum accepted client version (§4.G step 2).
pub const MIN_ACCEPTED_VERSION: u32 = 1107;

pub fn check_version(client_version: u32) -> Result<(), RejectReason> {
    if client_version < MIN_ACCEPTED_VERSION {
        Err(RejectReason::VersionTooOld {
            client: client_version,
            required: MIN_ACCEPTED_VERSION,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_below_minimum_is_rejected() {
        let err = check_version(MIN_ACCEPTED_VERSION - 1).unwrap_err();
        assert!(matches!(err, RejectReason::VersionTooOld { .. }));
    }

    #[test]
    fn version_at_minimum_is_accepted() {
        assert!(check_version(MIN_ACCEPTED_VERSION).is_ok());
    }
}
