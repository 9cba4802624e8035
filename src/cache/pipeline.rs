//! Value Pipeline Module
//!
//! Translates between in-memory [`Envelope`]s and the raw representation a
//! backend persists. The two halves can be swapped independently; keeping them
//! symmetric is the caller's job.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::Envelope;
use crate::error::{CacheError, Result};

// == Raw Value ==
/// What a backend actually stores under a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    /// Text-serialized data (JSON, or ciphertext)
    Text(String),
    /// An envelope kept as a structure, for backends that need no serialization
    Structured(Envelope),
}

impl RawValue {
    /// Returns the text form, or `None` for a structured value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(text) => Some(text),
            RawValue::Structured(_) => None,
        }
    }
}

impl From<String> for RawValue {
    fn from(text: String) -> Self {
        RawValue::Text(text)
    }
}

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        RawValue::Text(text.to_string())
    }
}

/// Encodes an envelope for storage.
pub type ConvertFn = Arc<dyn Fn(&Envelope) -> Result<RawValue> + Send + Sync>;

/// Decodes a stored value. Must return [`CacheError::Parse`] on malformed input.
pub type ParseFn = Arc<dyn Fn(&RawValue) -> Result<Envelope> + Send + Sync>;

/// A text transform used to encrypt or decrypt serialized envelopes.
pub type CipherFn = Arc<dyn Fn(&str) -> anyhow::Result<String> + Send + Sync>;

// == Encryption Hooks ==
/// An `encrypt`/`decrypt` pair supplied by configuration.
#[derive(Clone)]
pub struct Encryption {
    pub encrypt: CipherFn,
    pub decrypt: CipherFn,
}

impl Encryption {
    pub fn new<E, D>(encrypt: E, decrypt: D) -> Self
    where
        E: Fn(&str) -> anyhow::Result<String> + Send + Sync + 'static,
        D: Fn(&str) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        Self {
            encrypt: Arc::new(encrypt),
            decrypt: Arc::new(decrypt),
        }
    }
}

impl fmt::Debug for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encryption").finish_non_exhaustive()
    }
}

// == Pipeline ==
/// A `convert`/`parse` pair.
#[derive(Clone)]
pub struct Pipeline {
    convert: ConvertFn,
    parse: ParseFn,
}

impl Pipeline {
    /// Builds a pipeline from arbitrary closures.
    pub fn new<C, P>(convert: C, parse: P) -> Self
    where
        C: Fn(&Envelope) -> Result<RawValue> + Send + Sync + 'static,
        P: Fn(&RawValue) -> Result<Envelope> + Send + Sync + 'static,
    {
        Self {
            convert: Arc::new(convert),
            parse: Arc::new(parse),
        }
    }

    /// JSON text serialization. This is the default.
    pub fn json() -> Self {
        Self::new(json_convert, json_parse)
    }

    /// Stores envelopes as structures, for in-process backends.
    pub fn identity() -> Self {
        Self::new(
            |envelope| Ok(RawValue::Structured(envelope.clone())),
            |raw| match raw {
                RawValue::Structured(envelope) => Ok(envelope.clone()),
                RawValue::Text(_) => Err(CacheError::Parse(
                    "expected a structured entry, found text".to_string(),
                )),
            },
        )
    }

    /// JSON serialization wrapped in the given encryption hooks.
    ///
    /// A failed decrypt is reported as a parse failure so the engine heals
    /// the entry instead of surfacing it.
    pub fn encrypted(encryption: Encryption) -> Self {
        let Encryption { encrypt, decrypt } = encryption;

        Self::new(
            move |envelope| {
                let plain = serde_json::to_string(envelope)?;
                let cipher = encrypt(&plain).map_err(CacheError::Encryption)?;
                Ok(RawValue::Text(cipher))
            },
            move |raw| {
                let cipher = raw.as_text().ok_or_else(|| {
                    CacheError::Parse("expected ciphertext, found a structured entry".to_string())
                })?;
                let plain = decrypt(cipher)
                    .map_err(|err| CacheError::Parse(format!("decryption failed: {err}")))?;
                parse_json_text(&plain)
            },
        )
    }

    // == Conversion ==
    /// Turns an envelope into its stored form.
    pub fn convert(&self, envelope: &Envelope) -> Result<RawValue> {
        (self.convert)(envelope)
    }

    /// Reads an envelope back from its stored form.
    pub fn parse(&self, raw: &RawValue) -> Result<Envelope> {
        (self.parse)(raw)
    }

    // == Replacement ==
    pub fn set_convert(&mut self, convert: ConvertFn) {
        self.convert = convert;
    }

    pub fn set_parse(&mut self, parse: ParseFn) {
        self.parse = parse;
    }

    /// Shares the converter, e.g. to install it on another driver.
    pub fn convert_fn(&self) -> ConvertFn {
        Arc::clone(&self.convert)
    }

    /// Shares the parser, e.g. to install it on another driver.
    pub fn parse_fn(&self) -> ParseFn {
        Arc::clone(&self.parse)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::json()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").finish_non_exhaustive()
    }
}

fn json_convert(envelope: &Envelope) -> Result<RawValue> {
    Ok(RawValue::Text(serde_json::to_string(envelope)?))
}

fn json_parse(raw: &RawValue) -> Result<Envelope> {
    match raw {
        RawValue::Text(text) => parse_json_text(text),
        RawValue::Structured(envelope) => Ok(envelope.clone()),
    }
}

fn parse_json_text(text: &str) -> Result<Envelope> {
    serde_json::from_str(text).map_err(|err| CacheError::Parse(err.to_string()))
}
