use std::sync::Arc;

use crate::core::{CanonicalTimestamp, Config, Error, Logger, ProtocolKind, Result};
use crate::network::{Resolve, Transport};

use super::acquire::Orchestrator;

/// Runs the orchestrator for the selected protocol
///
/// The result is passed through unchanged. A missing selection is the only
/// error; acquisition failures come back as [`CanonicalTimestamp::FAILED`].
pub async fn acquire_time<R: Resolve, T: Transport>(
    selection: Option<ProtocolKind>,
    config: &Config,
    resolver: R,
    transport: T,
    log: Arc<dyn Logger>,
) -> Result<CanonicalTimestamp> {
    let protocol = selection.ok_or(Error::Unselected)?;
    log.info(format_args!("using {}", protocol));

    let orchestrator = Orchestrator::new(
        protocol,
        config.host_for(protocol),
        config.retry_policy(protocol),
        resolver,
        transport,
        log,
    );
    Ok(orchestrator.acquire().await)
}
