use serde::{Serialize, Serializer};

/// Outcome of an API operation. The numeric values are part of the public
/// API: clients receive them alongside the user-facing error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResultCode {
    Success = 0,
    DbFailure = 1,
    InsufficientPermissions = 2,
    UsernameTooShort = 3,
    UsernameTooLong = 4,
    PasswordTooShort = 5,
    UsernameTaken = 6,
    RegistrationFailure = 7,
    BadCredentials = 8,
    InvalidToken = 9,
    NotFound = 10,
    AlreadyInQueue = 11,
    AlreadyWon = 12,
    QueueIsFull = 13,
    TooManyChallenges = 14,
    NotInQueue = 15,
    QueueIsClosed = 16,
    NotEnoughBadges = 17,
    NotEnoughEmblems = 18,
    UnsupportedDifficulty = 19,
    UnsupportedFormat = 20,
    QueueAlreadyOpen = 21,
    QueueAlreadyClosed = 22,
    QueueStateNotSupported = 23,
}

impl ResultCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl Serialize for ResultCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_its_number() {
        assert_eq!(serde_json::to_string(&ResultCode::Success).unwrap(), "0");
        assert_eq!(serde_json::to_string(&ResultCode::NotFound).unwrap(), "10");
        assert_eq!(
            serde_json::to_string(&ResultCode::QueueStateNotSupported).unwrap(),
            "23"
        );
    }
}
