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

//! Contracts for the host-side collaborators feeding the tick pipeline.

/// Produces the serialized state that is shipped once per tick.
///
/// Implemented by the host application. Only the byte length of the returned
/// payload matters to the telemetry core; its shape is the host's business.
pub trait StateSource: Send + 'static {
    /// Captures the current state as bytes.
    fn capture(&mut self) -> anyhow::Result<Vec<u8>>;
}

/// Finalizes a captured payload into the form that would go on the wire.
pub trait PayloadEncoder: Send + Sync + 'static {
    /// A short, human-readable codec name used in log output.
    fn name(&self) -> &'static str;

    /// Encodes `payload`, returning the finalized bytes.
    fn encode(&self, payload: &[u8]) -> anyhow::Result<Vec<u8>>;
}

impl<F> StateSource for F
where
    F: FnMut() -> anyhow::Result<Vec<u8>> + Send + 'static,
{
    fn capture(&mut self) -> anyhow::Result<Vec<u8>> {
        self()
    }
}
