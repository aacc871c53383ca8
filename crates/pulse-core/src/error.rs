/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use thiserror::Error;

/// The main error type for pulse-* crates
#[derive(Error, Debug)]
pub enum Error {
  /// Environment variable error
  #[error("Environment variable error: {0}")]
  EnvVar(#[from] std::env::VarError),

  /// Configuration error
  #[error("Configuration error: {0}")]
  Config(String),

  /// Serialization/Deserialization error
  #[error("Serialization error: {0}")]
  Serde(#[from] serde_json::Error),

  /// Filesystem error
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  /// The request did not finish inside its bounded wait
  #[error("Timed out after {0} ms")]
  Timeout(u64),

  /// Transport failure (DNS, connect, reset, body read)
  #[error("Network error: {0}")]
  Network(String),

  /// The source answered, but not with something usable: a non-success
  /// status, an empty resource or a body that does not decode
  #[error("Protocol error: {0}")]
  Protocol(String),

  /// Parse error for local data (layouts, backups, timestamps)
  #[error("Parse error: {0}")]
  Parse(String),
}

impl Error {
  /// True for the three kinds a remote source can surface
  pub fn is_source_failure(&self) -> bool {
    matches!(self, Error::Timeout(_) | Error::Network(_) | Error::Protocol(_))
  }
}

/// Result type alias for pulse-* crates
pub type Result<T> = std::result::Result<T, Error>;
