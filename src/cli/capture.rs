use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::decoder::DecodeError;
use crate::protocol::{Direction, Frame, FramePayload};
use crate::session::SessionConfig;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid hex frame: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("undecodable frame: {0}")]
    Decode(#[from] DecodeError),
    #[error("message {index} carries neither data nor hex")]
    EmptyMessage { index: usize },
}

/// One recorded frame. `data` is an already decoded frame, `hex` a raw
/// binary one; `data` wins when both are present.
#[derive(Debug, Clone, Deserialize)]
pub struct CapturedMessage {
    #[serde(default)]
    pub direction: Direction,
    pub data: Option<serde_json::Value>,
    pub hex: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Capture {
    #[serde(default)]
    pub messages: Vec<CapturedMessage>,
}

impl Capture {
    pub fn from_json(text: &str) -> Result<Self, CaptureError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Converts every message into a transport frame, in capture order.
    pub fn frames(&self) -> Result<Vec<Frame>, CaptureError> {
        self.messages
            .iter()
            .enumerate()
            .map(|(index, message)| message.to_frame(index))
            .collect()
    }
}

impl CapturedMessage {
    fn to_frame(&self, index: usize) -> Result<Frame, CaptureError> {
        let payload = match (&self.data, &self.hex) {
            (Some(data), _) => FramePayload::Text(data.to_string()),
            (None, Some(hex)) => FramePayload::Binary(parse_hex(hex)?),
            (None, None) => return Err(CaptureError::EmptyMessage { index }),
        };
        Ok(Frame {
            direction: self.direction,
            payload,
        })
    }
}

/// Accepts `"81a1..."` as well as space separated `"81 a1 ..."`.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, CaptureError> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = digits.strip_prefix("0x").unwrap_or(&digits);
    Ok(hex::decode(digits)?)
}

pub fn load_capture(path: &Path) -> Result<Capture, CaptureError> {
    Capture::from_json(&read(path)?)
}

pub fn load_config(path: &Path) -> Result<SessionConfig, CaptureError> {
    Ok(serde_json::from_str(&read(path)?)?)
}

fn read(path: &Path) -> Result<String, CaptureError> {
    fs::read_to_string(path).map_err(|source| CaptureError::Io {
        path: path.to_path_buf(),
        source,
    })
}
