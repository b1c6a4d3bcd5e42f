use std::{borrow::Cow, fmt, iter::Enumerate, path::Path, slice::Windows};

use itertools::Itertools;

/// Number of bytes shown after a match.
pub const EXCERPT_LEN: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    #[error("Io error {0}")]
    Io(#[from] std::io::Error),

    #[error("Signature must contain at least one byte")]
    EmptySignature,

    #[error("Odd number of hex digits {0}")]
    OddHexLength(usize),

    #[error("Invalid hex digit {0:?}")]
    InvalidHexDigit(char),
}

/// An exact, non-empty byte sequence to search for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    bytes: Cow<'static, [u8]>,
}

impl Signature {
    /// Marker preceding the encrypted blob in the harbor binary.
    pub const ENCRYPTED_DATA: Signature = Signature {
        bytes: Cow::Borrowed(&[0x58, 0xFF, 0xBA, 0x35, 0x49, 0x41]),
    };

    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, LocatorError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(LocatorError::EmptySignature);
        }
        Ok(Self {
            bytes: Cow::Owned(bytes),
        })
    }

    /// Parses `"58 FF BA 35"` or `"58ffba35"`. Whitespace is ignored.
    pub fn from_hex(str: &str) -> Result<Self, LocatorError> {
        let nibbles = str
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| {
                c.to_digit(16)
                    .map(|d| d as u8)
                    .ok_or(LocatorError::InvalidHexDigit(c))
            })
            .collect::<Result<Vec<u8>, _>>()?;

        if nibbles.len() % 2 != 0 {
            return Err(LocatorError::OddHexLength(nibbles.len()));
        }

        let bytes = nibbles
            .into_iter()
            .tuples::<(u8, u8)>()
            .map(|(hi, lo)| (hi << 4) | lo)
            .collect::<Vec<u8>>();

        Self::new(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn scan<'a>(&'a self, bytes: &'a [u8]) -> Scanner<'a> {
        Scanner::new(self, bytes)
    }

    pub fn is_matching(&self, bytes: &[u8]) -> bool {
        bytes == self.as_bytes()
    }
}

/// Every occurrence of a signature in a buffer, lowest offset first.
pub struct Scanner<'a> {
    it: Enumerate<Windows<'a, u8>>,
    signature: &'a Signature,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(signature: &'a Signature, bytes: &'a [u8]) -> Self {
        Self {
            it: bytes.windows(signature.len()).enumerate(),
            signature,
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = (usize, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let signature = self.signature;
        self.it
            .find_map(|(pos, view)| signature.is_matching(view).then_some((pos, view)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchResult {
    NotFound,
    FoundAt(usize),
}

impl MatchResult {
    pub fn offset(&self) -> Option<usize> {
        match self {
            MatchResult::FoundAt(offset) => Some(*offset),
            MatchResult::NotFound => None,
        }
    }
}

// NotFound renders as -1.
impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchResult::FoundAt(offset) => write!(f, "{}", offset),
            MatchResult::NotFound => write!(f, "-1"),
        }
    }
}

pub fn locate(bytes: &[u8], signature: &Signature) -> MatchResult {
    signature
        .scan(bytes)
        .next()
        .map_or(MatchResult::NotFound, |(pos, _)| MatchResult::FoundAt(pos))
}

/// Up to `len` bytes starting at `offset`, clipped to the end of `bytes`.
pub fn excerpt(bytes: &[u8], offset: usize, len: usize) -> &[u8] {
    let start = offset.min(bytes.len());
    let end = offset.saturating_add(len).min(bytes.len());
    &bytes[start..end]
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).join("")
}

/// Reads the whole file into memory. The handle is closed before returning.
pub fn read_input(path: impl AsRef<Path>) -> Result<Vec<u8>, LocatorError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    tracing::debug!(path = %path.display(), len = bytes.len(), "read input");
    Ok(bytes)
}

/// Outcome of one search, printable as the tool's stdout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report<'a> {
    pub result: MatchResult,
    pub excerpt: Option<&'a [u8]>,
}

impl<'a> Report<'a> {
    pub fn new(bytes: &'a [u8], signature: &Signature) -> Self {
        let result = locate(bytes, signature);
        tracing::debug!(len = bytes.len(), %result, "scanned buffer");
        Self {
            result,
            excerpt: result
                .offset()
                .map(|offset| excerpt(bytes, offset, EXCERPT_LEN)),
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Encrypted data found at offset: {}", self.result)?;
        if let Some(bytes) = self.excerpt {
            write!(f, "\nBytes at offset: {}", to_hex(bytes))?;
        }
        Ok(())
    }
}
