//! Geolocation lookup: request construction and response interpretation.
//!
//! The lookup service estimates a position from a set of observed access
//! points. Request building and response interpretation are pure functions
//! so they can be exercised without a network; [`send_request`] is the one
//! piece that talks to the service.
//!
//! # Response Classification
//!
//! The status code alone does not identify the outcome: a rejected API key
//! arrives as a generic client error whose body carries a marker string,
//! and a success status may still carry a body without a usable location.
//! [`interpret_response`] resolves the combination into exactly one result.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LocateError;
use crate::scan::AccessPoint;

/// Endpoint of the geolocation lookup; the API key is the only query
/// parameter.
pub const GEOLOCATION_URL: &str = "https://www.googleapis.com/geolocation/v1/geolocate";

/// Marker the service embeds in a client-error body when the key itself
/// was the problem.
const INVALID_KEY_MARKER: &str = "keyInvalid";

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows; U; Windows NT 5.1; en-US) AppleWebKit/533.4 (KHTML, like Gecko)";

/// Request body for the lookup call.
///
/// `consider_ip` is always off: the estimate must come from the target's
/// radio environment, never from the address this tool happens to call
/// the service from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    pub consider_ip: bool,
    pub wifi_access_points: Vec<AccessPoint>,
}

/// A position estimate returned by the lookup service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationEstimate {
    /// Degrees latitude.
    pub latitude: f64,
    /// Degrees longitude.
    pub longitude: f64,
    /// Radius of uncertainty around the point, in meters.
    pub accuracy: f64,
}

impl LocationEstimate {
    /// Map link for the estimate, for pasting into a browser.
    pub fn maps_url(&self) -> String {
        format!("https://maps.google.com/?q={},{}", self.latitude, self.longitude)
    }
}

// Wire shape of the service's success body. Both fields stay optional so
// a structurally valid body with missing keys is detected here rather
// than as a decode failure.
#[derive(Debug, Deserialize)]
struct LookupBody {
    location: Option<Coordinates>,
    accuracy: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Coordinates {
    lat: f64,
    lng: f64,
}

/// Builds the lookup request body for a set of observed networks.
///
/// The serialized form carries `considerIp: false` and the access point
/// list; nothing else is ever added.
pub fn build_request(networks: &[AccessPoint]) -> LocationRequest {
    LocationRequest {
        consider_ip: false,
        wifi_access_points: networks.to_vec(),
    }
}

/// Classifies the service's answer into a location estimate or a failure.
///
/// # Arguments
/// * `status` - HTTP status code of the lookup call
/// * `body` - Raw response body, unmodified
///
/// # Returns
/// - `Ok(LocationEstimate)` when the body holds a location object with
///   numeric coordinates and a non-negative accuracy
/// - [`LocateError::KeyRejected`] for a client error naming the key
/// - [`LocateError::LookupFailed`] for any other error status, with the
///   status and body surfaced verbatim
/// - [`LocateError::MalformedLocation`] for a success status whose body
///   has no recognizable location
pub fn interpret_response(status: u16, body: &str) -> Result<LocationEstimate> {
    if (400..500).contains(&status) && body.contains(INVALID_KEY_MARKER) {
        return Err(LocateError::KeyRejected.into());
    }

    if status >= 400 {
        return Err(LocateError::LookupFailed {
            status,
            body: body.to_string(),
        }
        .into());
    }

    let decoded: LookupBody = serde_json::from_str(body)
        .map_err(|_| LocateError::MalformedLocation(body.to_string()))?;

    match (decoded.location, decoded.accuracy) {
        (Some(location), Some(accuracy)) if accuracy >= 0.0 => Ok(LocationEstimate {
            latitude: location.lat,
            longitude: location.lng,
            accuracy,
        }),
        _ => Err(LocateError::MalformedLocation(body.to_string()).into()),
    }
}

/// Posts the lookup request and returns the raw status and body.
///
/// Error statuses are returned as data, not as errors: classification of
/// everything the service actually said belongs to [`interpret_response`].
/// Only a transport failure (no HTTP answer at all) is an error here.
pub fn send_request(
    api_key: &str,
    request: &LocationRequest,
    timeout: Duration,
) -> Result<(u16, String)> {
    let url = format!("{}?key={}", GEOLOCATION_URL, api_key);
    debug!(endpoint = GEOLOCATION_URL, "sending location query");

    let agent = ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build();

    match agent.post(&url).send_json(request) {
        Ok(response) => {
            let status = response.status();
            let body = response.into_string()?;
            Ok((status, body))
        }
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().unwrap_or_default();
            Ok((status, body))
        }
        Err(ureq::Error::Transport(err)) => {
            Err(LocateError::ServiceUnreachable(err.to_string()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(mac: &str, dbm: &str) -> AccessPoint {
        AccessPoint {
            mac_address: mac.to_string(),
            signal_strength: dbm.to_string(),
            channel: "11".to_string(),
            age: 0,
            ssid: Some("CorpNet".to_string()),
        }
    }

    #[test]
    fn request_serializes_to_the_documented_shape() {
        let request = build_request(&[
            network("00:25:9c:cf:1c:ac", "-43"),
            network("00:25:9c:cf:1c:ad", "-55"),
        ]);

        let value = serde_json::to_value(&request).unwrap();
        let fields = value.as_object().unwrap();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields["considerIp"], false);

        let points = fields["wifiAccessPoints"].as_array().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0]["macAddress"], "00:25:9c:cf:1c:ac");
        assert_eq!(points[0]["signalStrength"], "-43");
        assert_eq!(points[0]["age"], 0);
    }

    #[test]
    fn success_body_yields_an_estimate() {
        let body = r#"{"location":{"lat":37.42,"lng":-122.08},"accuracy":20}"#;

        let estimate = interpret_response(200, body).unwrap();

        assert_eq!(estimate.latitude, 37.42);
        assert_eq!(estimate.longitude, -122.08);
        assert_eq!(estimate.accuracy, 20.0);
    }

    #[test]
    fn client_error_with_marker_is_a_key_rejection() {
        let body = r#"{"error":{"errors":[{"reason":"keyInvalid"}],"code":400}}"#;

        let err = interpret_response(400, body).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LocateError>(),
            Some(LocateError::KeyRejected)
        ));
    }

    #[test]
    fn client_error_without_marker_surfaces_status_and_body() {
        let err = interpret_response(400, "quota exceeded").unwrap_err();

        match err.downcast_ref::<LocateError>() {
            Some(LocateError::LookupFailed { status, body }) => {
                assert_eq!(*status, 400);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn server_error_is_a_lookup_failure() {
        let err = interpret_response(503, "unavailable").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LocateError>(),
            Some(LocateError::LookupFailed { status: 503, .. })
        ));
    }

    #[test]
    fn empty_object_on_success_status_is_malformed() {
        let err = interpret_response(200, "{}").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LocateError>(),
            Some(LocateError::MalformedLocation(body)) if body == "{}"
        ));
    }

    #[test]
    fn non_json_on_success_status_is_malformed() {
        let err = interpret_response(200, "<html>oops</html>").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LocateError>(),
            Some(LocateError::MalformedLocation(_))
        ));
    }

    #[test]
    fn missing_accuracy_is_malformed() {
        let body = r#"{"location":{"lat":37.42,"lng":-122.08}}"#;

        let err = interpret_response(200, body).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LocateError>(),
            Some(LocateError::MalformedLocation(_))
        ));
    }

    #[test]
    fn negative_accuracy_is_malformed() {
        let body = r#"{"location":{"lat":37.42,"lng":-122.08},"accuracy":-5}"#;

        let err = interpret_response(200, body).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LocateError>(),
            Some(LocateError::MalformedLocation(_))
        ));
    }

    #[test]
    fn maps_url_embeds_the_coordinates() {
        let estimate = LocationEstimate {
            latitude: 37.42,
            longitude: -122.08,
            accuracy: 20.0,
        };

        assert_eq!(estimate.maps_url(), "https://maps.google.com/?q=37.42,-122.08");
    }
}
