//! The probe-and-lookup pipeline.
//!
//! One stateless pass: check that enough networks were extracted, build
//! the lookup request, hand it to the transport, classify the answer.
//! The transport is injected as a closure so the pipeline itself never
//! opens a connection and callers decide how the request travels.

use anyhow::Result;

use crate::error::LocateError;
use crate::geolocate::{self, LocationEstimate, LocationRequest};
use crate::scan::AccessPoint;

/// The lookup service cannot triangulate from a single access point.
pub const MIN_NETWORKS: usize = 2;

/// Runs the lookup stage of the pipeline over already-extracted networks.
///
/// Short-circuits with [`LocateError::TooFewNetworks`] before any request
/// is built when fewer than [`MIN_NETWORKS`] networks are available; the
/// transport is never invoked in that case.
///
/// # Arguments
/// * `networks` - Access points extracted from the device's scan document
/// * `send` - Transport that delivers the request and returns the raw
///   `(status, body)` answer
pub fn run<F>(networks: &[AccessPoint], send: F) -> Result<LocationEstimate>
where
    F: FnOnce(&LocationRequest) -> Result<(u16, String)>,
{
    if networks.len() < MIN_NETWORKS {
        return Err(LocateError::TooFewNetworks(networks.len()).into());
    }

    let request = geolocate::build_request(networks);
    let (status, body) = send(&request)?;

    geolocate::interpret_response(status, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn network(mac: &str) -> AccessPoint {
        AccessPoint {
            mac_address: mac.to_string(),
            signal_strength: "-43".to_string(),
            channel: "11".to_string(),
            age: 0,
            ssid: None,
        }
    }

    #[test]
    fn single_network_short_circuits_without_sending() {
        let sent = Cell::new(false);
        let networks = [network("aa:bb:cc:dd:ee:ff")];

        let err = run(&networks, |_| {
            sent.set(true);
            Ok((200, String::new()))
        })
        .unwrap_err();

        assert!(!sent.get());
        assert!(matches!(
            err.downcast_ref::<LocateError>(),
            Some(LocateError::TooFewNetworks(1))
        ));
    }

    #[test]
    fn no_networks_short_circuits_too() {
        let err = run(&[], |_| panic!("transport must not be invoked")).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LocateError>(),
            Some(LocateError::TooFewNetworks(0))
        ));
    }

    #[test]
    fn two_networks_run_the_full_pipeline() {
        let networks = [network("aa:bb:cc:dd:ee:ff"), network("aa:bb:cc:dd:ee:f0")];

        let estimate = run(&networks, |request| {
            assert!(!request.consider_ip);
            assert_eq!(request.wifi_access_points.len(), 2);
            Ok((
                200,
                r#"{"location":{"lat":37.42,"lng":-122.08},"accuracy":20}"#.to_string(),
            ))
        })
        .unwrap();

        assert_eq!(estimate.latitude, 37.42);
        assert_eq!(estimate.longitude, -122.08);
        assert_eq!(estimate.accuracy, 20.0);
    }

    #[test]
    fn transport_failure_propagates() {
        let networks = [network("aa:bb:cc:dd:ee:ff"), network("aa:bb:cc:dd:ee:f0")];

        let err = run(&networks, |_| {
            Err(LocateError::ServiceUnreachable("connection refused".to_string()).into())
        })
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LocateError>(),
            Some(LocateError::ServiceUnreachable(_))
        ));
    }

    #[test]
    fn service_rejection_propagates_classified() {
        let networks = [network("aa:bb:cc:dd:ee:ff"), network("aa:bb:cc:dd:ee:f0")];

        let err = run(&networks, |_| Ok((400, "keyInvalid".to_string()))).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LocateError>(),
            Some(LocateError::KeyRejected)
        ));
    }
}
