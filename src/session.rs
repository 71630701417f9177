//! Running one request/response exchange at a time over a [`Transport`].
//!
//! Serial replies arrive asynchronously relative to the write and host drivers buffer
//! or fragment them unpredictably. A [`Session`] copes with this with one of two read
//! strategies, picked by the transport's [`DeliveryMode`]:
//!
//! * __Chunked__ - a few reads; the first one longer than [`CHUNK_THRESHOLD`] bytes is
//!   taken as the whole reply.
//! * __Streaming__ - more reads; bytes are skipped until the slave address shows up
//!   (dropping leftovers from an earlier exchange), then collected across reads until
//!   the expected size is reached.
//!
//! Neither strategy guarantees a complete reply. Short or garbled replies are left for
//! [`frame::classify`] to reject.

use embedded_io::{Error as _, ErrorKind};
use fugit::MillisDurationU32;
use tracing::{debug, trace, warn};

use crate::{
    error::{Error, FrameError, Result},
    frame::{self, Frame, Reply},
    transport::{DeliveryMode, Transport},
};

/// Default response buffer capacity, the largest possible RTU frame.
pub const DEFAULT_CAPACITY: usize = frame::MAX_FRAME_LEN;

/// A chunked read must return more than this many bytes to count as the reply.
pub const CHUNK_THRESHOLD: usize = 5;

/// Bounds on how many reads an exchange may spend waiting for a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPolicy {
    pub chunked_attempts: usize,
    pub streaming_attempts: usize,
}

impl Default for ReadPolicy {
    fn default() -> Self {
        Self {
            chunked_attempts: 3,
            streaming_attempts: 5,
        }
    }
}

impl ReadPolicy {
    /// Stretch the streaming attempt count so that `patience` worth of read timeouts
    /// fit in it. Never drops below the current count.
    pub fn with_patience(self, patience: MillisDurationU32, read_timeout: MillisDurationU32) -> Self {
        let per_read = read_timeout.to_millis();
        if per_read == 0 {
            return self;
        }

        let needed = patience.to_millis().div_ceil(per_read) as usize;
        Self {
            streaming_attempts: self.streaming_attempts.max(needed),
            ..self
        }
    }
}

/// Everything known about a finished exchange.
#[derive(Debug)]
pub struct Outcome<'a> {
    /// The frame as transmitted, checksum included.
    pub request: Frame,
    /// The reply size derived from the request.
    pub expected_len: usize,
    /// The first `expected_len` bytes of the response buffer.
    pub response: &'a [u8],
    /// How many of those bytes actually came off the wire.
    pub received: usize,
    pub reply: Reply,
}

/// Owns a transport and the buffer replies are collected in.
///
/// `L` is the response buffer capacity. Bytes beyond it are dropped.
pub struct Session<T: Transport, const L: usize = DEFAULT_CAPACITY> {
    transport: T,
    policy: ReadPolicy,
    buffer: [u8; L],
    scratch: [u8; L],
    received: usize,
}

/// Reads that ended without data but with no fault either.
fn is_idle(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::TimedOut | ErrorKind::Interrupted)
}

impl<T: Transport, const L: usize> Session<T, L> {
    pub fn new(transport: T) -> Self {
        Self::with_policy(transport, ReadPolicy::default())
    }

    pub fn with_policy(transport: T, policy: ReadPolicy) -> Self {
        Self {
            transport,
            policy,
            buffer: [0; L],
            scratch: [0; L],
            received: 0,
        }
    }

    pub fn policy(&self) -> ReadPolicy {
        self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Bytes captured by the most recent exchange.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Encode `payload`, run the exchange and classify what came back.
    ///
    /// Function codes with no known reply size fall back to
    /// [`DEFAULT_RESPONSE_LEN`](frame::DEFAULT_RESPONSE_LEN).
    pub fn submit(&mut self, payload: &[u8]) -> Result<Outcome<'_>, T::Error> {
        let request = frame::encode(payload)?;
        let expected_len = frame::expected_response_len(payload).unwrap_or_else(|| {
            warn!(
                function = payload[1],
                "can't size the reply, assuming {} bytes",
                frame::DEFAULT_RESPONSE_LEN
            );
            frame::DEFAULT_RESPONSE_LEN
        });

        self.exchange(&request, expected_len)?;

        let response = &self.buffer[..expected_len.min(L)];
        let reply = frame::classify(&request, response, expected_len);
        debug!(?reply, received = self.received, expected_len, "exchange finished");

        Ok(Outcome {
            request,
            expected_len,
            response,
            received: self.received,
            reply,
        })
    }

    /// Transmit `request` and collect up to `expected_len` bytes of reply.
    ///
    /// The returned slice is always `min(expected_len, L)` long; positions nothing was
    /// received for are zero. Fails only if the write fails, or a read faults before any
    /// usable byte arrived.
    pub fn exchange(&mut self, request: &[u8], expected_len: usize) -> Result<&[u8], T::Error> {
        let address = *request.first().ok_or(FrameError::TooShort(0))?;

        // Nothing from the previous exchange may survive into this one.
        self.buffer.fill(0);
        self.received = 0;

        self.transport
            .write_all(request)
            .map_err(Error::SerialError)?;
        trace!(?request, "request transmitted");

        let target = expected_len.min(L);
        self.received = match self.transport.delivery_mode() {
            DeliveryMode::Chunked => self.read_chunked()?,
            DeliveryMode::Streaming => self.read_streaming(address, target)?,
        };

        if self.received < target {
            debug!(received = self.received, target, "reply shorter than expected");
        }

        Ok(&self.buffer[..target])
    }

    fn read_chunked(&mut self) -> Result<usize, T::Error> {
        for attempt in 1..=self.policy.chunked_attempts {
            match self.transport.read(&mut self.scratch) {
                Ok(count) if count > CHUNK_THRESHOLD => {
                    let count = count.min(L);
                    self.buffer[..count].copy_from_slice(&self.scratch[..count]);
                    trace!(attempt, response = ?&self.buffer[..count], "chunk received");
                    return Ok(count);
                }
                Ok(count) => debug!(attempt, count, "short chunk discarded"),
                Err(e) if is_idle(e.kind()) => debug!(attempt, "read timed out"),
                Err(e) => {
                    warn!(attempt, error = ?e, "read failed");
                    return Err(Error::SerialError(e));
                }
            }
        }

        Ok(0)
    }

    fn read_streaming(&mut self, address: u8, target: usize) -> Result<usize, T::Error> {
        let mut filled = 0;

        for attempt in 1..=self.policy.streaming_attempts {
            if filled >= target {
                break;
            }

            match self.transport.read(&mut self.scratch) {
                Ok(0) => debug!(attempt, "nothing received yet"),
                Ok(count) => {
                    for &byte in &self.scratch[..count] {
                        if filled == 0 && byte != address {
                            trace!(byte, "stale byte skipped");
                            continue;
                        }
                        self.buffer[filled] = byte;
                        filled += 1;
                        if filled >= target {
                            break;
                        }
                    }
                    debug!(attempt, count, filled, "chunk received");
                }
                Err(e) if is_idle(e.kind()) => debug!(attempt, "read timed out"),
                // The tail of this reply will show up as stale bytes next time.
                Err(e) if filled > 0 => {
                    warn!(attempt, filled, error = ?e, "read failed, keeping partial reply");
                    break;
                }
                Err(e) => {
                    warn!(attempt, error = ?e, "read failed");
                    return Err(Error::SerialError(e));
                }
            }
        }

        Ok(filled)
    }
}
