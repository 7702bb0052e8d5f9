//! Defines the general error type for the crate and various conversions into it
use std::convert;
use std::fmt;

/// General error type for the crate
#[derive(Debug)]
pub enum Error {
    InvalidConfigurationValue(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    Other(String),
    RequestError(reqwest::StatusCode, String),
    UnknownServiceHandler(String),
    Yaml(serde_yaml::Error),
}

impl convert::From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl convert::From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl convert::From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Error {
        Error::Yaml(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfigurationValue(msg) => write!(f, "{}", msg),
            Error::Io(e) => write!(f, "{}", e),
            Error::Json(e) => write!(f, "could not read track data: {}", e),
            Error::Other(msg) => write!(f, "{}", msg),
            Error::RequestError(code, msg) => {
                write!(f, "Request failed with code: {} - {}", code, msg)
            }
            Error::UnknownServiceHandler(msg) => write!(f, "{}", msg),
            Error::Yaml(e) => write!(f, "could not read configuration: {}", e),
        }
    }
}

impl std::error::Error for Error {}
