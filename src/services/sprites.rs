//! Sprite download and decoding
//!
//! Sprites are fetched after the record they belong to is displayed. Decoding
//! happens off the UI thread; only the raw RGBA buffer crosses into the Slint
//! event loop, where it is wrapped in an `Image`.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while loading a sprite
#[derive(Error, Debug)]
pub enum SpriteError {
    #[error("Sprite request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sprite server answered {0}")]
    Status(StatusCode),

    #[error("Sprite could not be decoded: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decoded sprite pixels in RGBA8 row-major order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decode PNG bytes into RGBA pixels
pub fn decode_sprite(bytes: &[u8]) -> Result<SpriteData, SpriteError> {
    let img = image::load_from_memory(bytes)?.into_rgba8();
    let (width, height) = img.dimensions();

    Ok(SpriteData {
        width,
        height,
        rgba: img.into_raw(),
    })
}

/// Downloads and decodes sprite images
#[derive(Debug, Clone)]
pub struct SpriteLoader {
    client: reqwest::Client,
}

impl SpriteLoader {
    /// Create a loader sharing `client`'s connection pool
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn load(&self, url: &str) -> Result<SpriteData, SpriteError> {
        tracing::debug!("Loading sprite {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SpriteError::Status(status));
        }

        let bytes = response.bytes().await?;
        decode_sprite(&bytes)
    }
}
