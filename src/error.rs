use std::ffi::NulError;

use thiserror::Error;

use crate::native::{ResourceKind, native_enum};

#[derive(Debug, Error)]
pub enum Error {
    #[error("operation requires an initialized session")]
    SessionRequired,

    #[error("native error: {0}")]
    Native(ErrorType),

    #[error("text cannot be passed to the native layer: {0}")]
    InvalidText(#[from] NulError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("native layer returned no {0} resource")]
    NullResource(ResourceKind),

    #[error("invalid link: {0}")]
    InvalidLink(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

native_enum! {
    /// Error codes reported by the native layer.
    pub enum ErrorType: "SP_ERROR_" {
        Ok = 0,
        BadApiVersion = 1,
        ApiInitializationFailed = 2,
        TrackNotPlayable = 3,
        BadApplicationKey = 5,
        BadUsernameOrPassword = 6,
        UserBanned = 7,
        UnableToContactServer = 8,
        ClientTooOld = 9,
        OtherPermanent = 10,
        BadUserAgent = 11,
        MissingCallback = 12,
        InvalidIndata = 13,
        IndexOutOfRange = 14,
        UserNeedsPremium = 15,
        OtherTransient = 16,
        IsLoading = 17,
        NoStreamAvailable = 18,
        PermissionDenied = 19,
        InboxIsFull = 20,
        NoCache = 21,
        NoSuchUser = 22,
        NoCredentials = 23,
        NetworkDisabled = 24,
        InvalidDeviceId = 25,
        CantOpenTraceFile = 26,
        ApplicationBanned = 27,
        OfflineTooManyTracks = 31,
        OfflineDiskCache = 32,
        OfflineExpired = 33,
        OfflineNotAllowed = 34,
        OfflineLicenseLost = 35,
        OfflineLicenseError = 36,
        LastfmAuthError = 39,
        InvalidArgument = 40,
        SystemFailure = 41,
    }
}

impl ErrorType {
    /// Turns the code into a `Result`, failing on anything but `OK`.
    pub fn check(self) -> Result<()> {
        match self {
            ErrorType::Ok => Ok(()),
            other => Err(Error::Native(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn only_ok_passes_the_check() {
        assert!(ErrorType::Ok.check().is_ok());

        for code in ErrorType::iter().filter(|c| *c != ErrorType::Ok) {
            let err = code.check().unwrap_err();
            assert!(matches!(err, Error::Native(c) if c == code));
        }

        assert!(matches!(
            ErrorType::from_raw(99).check(),
            Err(Error::Native(ErrorType::Unrecognized(99)))
        ));
    }

    #[test]
    fn codes_parse_from_native_names() {
        assert_eq!(
            ErrorType::from_native_name("SP_ERROR_IS_LOADING"),
            Some(ErrorType::IsLoading)
        );
        assert_eq!(
            ErrorType::LastfmAuthError.native_name().as_deref(),
            Some("SP_ERROR_LASTFM_AUTH_ERROR")
        );
        assert_eq!(ErrorType::iter().count(), 36);
        for code in ErrorType::iter() {
            let native = code.native_name().unwrap();
            assert_eq!(ErrorType::from_native_name(&native), Some(code));
        }
    }

    #[test]
    fn session_fault_message() {
        assert_eq!(
            Error::SessionRequired.to_string(),
            "operation requires an initialized session"
        );
        assert_eq!(
            Error::Native(ErrorType::OtherPermanent).to_string(),
            "native error: OTHER_PERMANENT"
        );
    }
}
