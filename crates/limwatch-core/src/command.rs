//! Operator command flows: block, unblock, update config.
//!
//! Each flow validates locally first, issues a single write, and leaves
//! state reconciliation to the caller. Writes are single-attempt; a
//! failure is returned for the operator to retry by hand. Nothing here
//! mutates view state before the limiter confirms.

use limwatch_api::LimiterClient;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::LimiterConfig;
use crate::validate::validate_ipv4;
use crate::view::BlockedList;

/// Local checks before a block is offered for confirmation. No network
/// traffic: a malformed or already-blocked address is rejected here.
pub fn prepare_block(ip: &str, blocked: &BlockedList) -> Result<(), CoreError> {
    if !validate_ipv4(ip) {
        return Err(CoreError::InvalidIp {
            input: ip.to_owned(),
        });
    }
    if blocked.contains(ip) {
        return Err(CoreError::AlreadyBlocked { ip: ip.to_owned() });
    }
    Ok(())
}

/// Ask the limiter to block `ip`. The caller applies the confirmed
/// result to its [`BlockedList`] on `Ok`.
pub async fn submit_block(client: &LimiterClient, ip: &str) -> Result<(), CoreError> {
    debug!(ip, "submitting block");
    client.block_ip(ip).await?;
    info!(ip, "block confirmed");
    Ok(())
}

/// Ask the limiter to unblock `ip`.
pub async fn submit_unblock(client: &LimiterClient, ip: &str) -> Result<(), CoreError> {
    debug!(ip, "submitting unblock");
    client.unblock_ip(ip).await?;
    info!(ip, "unblock confirmed");
    Ok(())
}

/// Push a full configuration draft to the limiter. All three numeric
/// fields are always sent so the limiter never falls back to stale
/// values for an omitted one.
pub async fn submit_config(client: &LimiterClient, draft: &LimiterConfig) -> Result<(), CoreError> {
    debug!(
        threshold = draft.threshold,
        time_window = draft.time_window,
        block_duration = draft.block_duration,
        "submitting config update"
    );
    client
        .update_config(draft.threshold, draft.time_window, draft.block_duration)
        .await?;
    info!("config update confirmed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockedEntry;

    fn list_with(ip: &str) -> BlockedList {
        let mut list = BlockedList::default();
        list.replace(vec![BlockedEntry {
            ip: ip.to_owned(),
            date: "2025-05-02".into(),
            time: "00:00:00".into(),
        }]);
        list
    }

    #[test]
    fn rejects_malformed_ip_locally() {
        let err = prepare_block("999.1.1.1", &BlockedList::default());
        assert!(matches!(err, Err(CoreError::InvalidIp { .. })));
    }

    #[test]
    fn rejects_duplicate_ip_locally() {
        let err = prepare_block("10.0.0.1", &list_with("10.0.0.1"));
        assert!(matches!(err, Err(CoreError::AlreadyBlocked { .. })));
    }

    #[test]
    fn accepts_new_valid_ip() {
        assert!(prepare_block("10.0.0.2", &list_with("10.0.0.1")).is_ok());
    }
}
