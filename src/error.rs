use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidOption,
    Decode,
    Serialize,
    Deserialize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn invalid_option(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidOption,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Decode,
            message: message.into(),
        }
    }

    pub fn serialize(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Serialize,
            message: message.into(),
        }
    }

    pub fn deserialize(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Deserialize,
            message: message.into(),
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::serialize(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::deserialize(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[rstest::rstest]
    fn test_constructors_set_kind() {
        assert_eq!(Error::invalid_option("x").kind, ErrorKind::InvalidOption);
        assert_eq!(Error::decode("x").kind, ErrorKind::Decode);
        assert_eq!(Error::serialize("x").kind, ErrorKind::Serialize);
        assert_eq!(Error::deserialize("x").kind, ErrorKind::Deserialize);
    }

    #[rstest::rstest]
    fn test_display_is_message() {
        let err = Error::decode("invalid utf-8");
        assert_eq!(err.to_string(), "invalid utf-8");
    }

    #[rstest::rstest]
    fn test_serde_custom_errors() {
        let ser: Error = serde::ser::Error::custom("bad key");
        assert_eq!(ser.kind, ErrorKind::Serialize);
        let de: Error = serde::de::Error::custom("missing field");
        assert_eq!(de.kind, ErrorKind::Deserialize);
        assert_eq!(de.message, "missing field");
    }
}
