// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Payload encoders used to finalize captured state before it is measured.

use crate::error::CodecError;
use beacon_core::PayloadEncoder;

/// LZ4 block compression with a little-endian `u32` length prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4Encoder;

impl Lz4Encoder {
    /// Largest payload the length prefix can describe.
    pub const MAX_PAYLOAD: usize = u32::MAX as usize;
}

impl PayloadEncoder for Lz4Encoder {
    fn name(&self) -> &'static str {
        "lz4"
    }

    fn encode(&self, payload: &[u8]) -> anyhow::Result<Vec<u8>> {
        if payload.len() > Self::MAX_PAYLOAD {
            return Err(CodecError::PayloadTooLarge {
                codec: self.name(),
                len: payload.len(),
                limit: Self::MAX_PAYLOAD,
            }
            .into());
        }
        Ok(lz4_flex::block::compress_prepend_size(payload))
    }
}

/// Passes payloads through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityEncoder;

impl PayloadEncoder for IdentityEncoder {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn encode(&self, payload: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(payload.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lz4_shrinks_repetitive_state() {
        let state = br#"{"x":1.0,"y":64.0,"z":-3.5}"#.repeat(200);
        let encoded = Lz4Encoder.encode(&state).unwrap();

        assert!(encoded.len() < state.len() / 4);
        let decoded = lz4_flex::block::decompress_size_prepended(&encoded).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_lz4_empty_payload_is_just_the_prefix() {
        let encoded = Lz4Encoder.encode(&[]).unwrap();
        assert_eq!(&encoded[..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_identity_keeps_length() {
        let encoded = IdentityEncoder.encode(b"twelve bytes").unwrap();
        assert_eq!(encoded.len(), 12);
    }
}
