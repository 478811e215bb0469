//! Fetching the scan document from the target device.
//!
//! Management firmware exposes the list of visible wireless networks at a
//! fixed well-known path. The endpoint usually sits behind TLS with a
//! self-signed certificate, so certificate validation is off for this one
//! client; devices with TLS disabled entirely get a single plain-HTTP
//! fallback attempt.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use crate::error::LocateError;

/// Well-known path of the wireless scan document on the device.
pub const SCAN_PATH: &str = "/IoMgmt/Adapters/Wifi0/WifiNetworks";

/// Matches the device firmware's own request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fetches the raw scan document from the device.
///
/// Tries `https://` first; if no connection can be established, falls
/// back exactly once to `http://`. A device that answers with anything
/// other than a success status is reported as [`LocateError::DeviceRefused`],
/// distinct from a device that never answered.
///
/// # Arguments
/// * `host` - IP address or hostname of the target
/// * `timeout` - Bound on each connection attempt
pub fn fetch_scan(host: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .danger_accept_invalid_certs(true)
        .timeout(timeout)
        .build()
        .map_err(|err| LocateError::DeviceUnreachable(err.to_string()))?;

    let secure_url = format!("https://{}{}", host, SCAN_PATH);
    debug!(url = %secure_url, "requesting scan document");

    let response = match client.get(&secure_url).send() {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "TLS connection failed, attempting non-TLS connection");
            let plain_url = format!("http://{}{}", host, SCAN_PATH);
            client
                .get(&plain_url)
                .send()
                .map_err(|err| LocateError::DeviceUnreachable(err.to_string()))?
        }
    };

    let status = response.status();
    if !status.is_success() {
        return Err(LocateError::DeviceRefused(status.as_u16()).into());
    }

    response
        .text()
        .map_err(|err| LocateError::DeviceUnreachable(err.to_string()).into())
}
