use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{Local, TimeZone};

use crate::core::{
    AddressHints, CandidateAddress, CanonicalTimestamp, Error, Logger, ProtocolKind, Result,
    RetryPolicy,
};
use crate::network::{Resolve, Session, Transport};
use crate::protocol::TimeProtocol;

/// Successful exchange with one server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquisition {
    /// Time reported by the server
    pub timestamp: CanonicalTimestamp,
    /// Server that answered
    pub server: SocketAddr,
    /// Attempts made across all candidates, including the successful one
    pub attempts: u32,
}

/// Drives one protocol across resolved candidates and retries
///
/// Candidates are tried in resolver order. NTP and daytime make one attempt
/// per candidate; the time protocol repeats open, send and receive on the
/// same candidate up to the retry count before moving on. The first
/// successful decode ends the run.
pub struct Orchestrator<R, T> {
    protocol: ProtocolKind,
    host: String,
    policy: RetryPolicy,
    resolver: R,
    transport: T,
    log: Arc<dyn Logger>,
}

impl<R: Resolve, T: Transport> Orchestrator<R, T> {
    /// Creates an orchestrator for `protocol` against `host`
    pub fn new(
        protocol: ProtocolKind,
        host: impl Into<String>,
        policy: RetryPolicy,
        resolver: R,
        transport: T,
        log: Arc<dyn Logger>,
    ) -> Self {
        Orchestrator {
            protocol,
            host: host.into(),
            policy,
            resolver,
            transport,
            log,
        }
    }

    /// Runs the exchange, returning the failure sentinel when nothing answered
    pub async fn acquire(&self) -> CanonicalTimestamp {
        match self.try_acquire().await {
            Ok(acquisition) => {
                let ts = acquisition.timestamp;
                if let Some(local) = Local.timestamp_opt(ts.secs(), 0).single() {
                    self.log.debug(format_args!(
                        "internet time is {} (from {} after {} attempts)",
                        local.to_rfc2822(),
                        acquisition.server,
                        acquisition.attempts
                    ));
                }
                ts
            }
            Err(e) => {
                self.log.error(format_args!("failed to get the time: {}", e));
                CanonicalTimestamp::FAILED
            }
        }
    }

    /// Runs the exchange, reporting which server answered
    pub async fn try_acquire(&self) -> Result<Acquisition> {
        let hints = AddressHints::inet(self.protocol.transport_kind());
        let candidates = self.resolver.resolve(&self.host, hints, &*self.log).await;
        self.log.debug(format_args!("fetched {} options", candidates.len()));

        if candidates.is_empty() {
            return Err(Error::ResolutionEmpty {
                host: self.host.clone(),
            });
        }

        let per_candidate = self.protocol.attempts_per_candidate(self.policy.count());
        let mut attempts = 0;

        for candidate in &candidates {
            self.log.debug(format_args!(
                "Address info {:?} {:?} {:?}",
                candidate.family, candidate.socket_type, candidate.protocol
            ));

            for attempt in 1..=per_candidate {
                attempts += 1;
                match self.attempt(candidate).await {
                    Ok(secs) => {
                        return Ok(Acquisition {
                            timestamp: CanonicalTimestamp(secs),
                            server: candidate.socket_addr(self.protocol.port()),
                            attempts,
                        })
                    }
                    Err(e) => self.log.error(format_args!(
                        "attempt {}/{} on {} failed: {}",
                        attempt,
                        per_candidate,
                        candidate.socket_addr(self.protocol.port()),
                        e
                    )),
                }
            }
        }

        Err(Error::AllCandidatesExhausted {
            host: self.host.clone(),
            candidates: candidates.len(),
        })
    }

    /// One open, send, receive and decode cycle; the session is always closed
    async fn attempt(&self, candidate: &CandidateAddress) -> Result<i64> {
        let mut session = self
            .transport
            .open(candidate, self.protocol.port(), self.policy.timeout())
            .await?;
        let result = self.exchange(&mut session).await;
        session.close();
        result
    }

    async fn exchange<S: Session>(&self, session: &mut S) -> Result<i64> {
        let request = self.protocol.build_request();
        self.log.debug(format_args!(
            "write {} bytes on port {}",
            request.len(),
            session.peer().port()
        ));

        let written = session.send(&request).await?;
        if written != request.len() {
            return Err(Error::PartialWrite {
                written,
                expected: request.len(),
            });
        }

        self.log.debug(format_args!("read"));
        let expected = self.protocol.response_size();
        let response = session.receive(expected, self.policy.timeout()).await?;

        let complete = if self.protocol.accepts_partial() {
            !response.is_empty()
        } else {
            response.len() == expected
        };
        if !complete {
            return Err(Error::incomplete(expected, response.len()));
        }

        self.protocol.describe_response(&response, &*self.log);

        Ok(self.protocol.parse_response(&response)?)
    }
}
