use std::{error::Error, fmt::Display};

#[derive(Debug)]
pub enum MirrorError {
    Request(reqwest::Error),
    Status(u16),
    Body,
    BadUrl,
}

impl Display for MirrorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Request(e) => write!(f, "Error: mirror request failed: {}", e),
            Self::Status(code) => write!(f, "Error: mirror responded with status {}", code),
            Self::Body => write!(f, "Error: could not read mirror response"),
            Self::BadUrl => write!(f, "Error: mirror returned an invalid url"),
        }
    }
}

impl Error for MirrorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Request(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for MirrorError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e)
    }
}
