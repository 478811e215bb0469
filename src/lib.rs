//! Locate a networked printer from the wireless networks it can see.
//!
//! A printer's management endpoint will happily report every access point
//! its radio hears, along with hardware addresses and signal strengths.
//! That is exactly the input a wifi geolocation service needs to estimate
//! a physical position. This library wires the two together: probe the
//! device, extract the networks, submit them for a position fix.
//!
//! # Modules
//!
//! - [`config`] - Persisted API key and timeout settings
//! - [`error`] - Failure taxonomy for the whole pipeline
//! - [`geolocate`] - Lookup request building and response interpretation
//! - [`locate`] - The probe-and-lookup pipeline
//! - [`probe`] - Fetching the scan document from the device
//! - [`scan`] - Extracting access point records from the scan document
//!
//! # Example Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use wifi_locate::{geolocate, locate, probe, scan};
//!
//! let timeout = Duration::from_secs(probe::DEFAULT_TIMEOUT_SECS);
//! let raw = probe::fetch_scan("192.0.2.10", timeout).expect("probe failed");
//! let networks = scan::parse_networks(&raw);
//!
//! let estimate = locate::run(&networks, |request| {
//!     geolocate::send_request("my-api-key", request, timeout)
//! })
//! .expect("lookup failed");
//!
//! println!("{}", estimate.maps_url());
//! ```

/// Configuration module for the saved API key and timeout.
pub mod config;

/// Error module defining the pipeline's failure kinds.
pub mod error;

/// Geolocation module: request shape, response classification, transport.
pub mod geolocate;

/// Pipeline module sequencing extraction, precondition and lookup.
pub mod locate;

/// Probe module that retrieves the scan document from the device.
pub mod probe;

/// Scan module extracting typed records from the device's tag stream.
pub mod scan;

// Re-export the types most callers touch.
pub use error::LocateError;
pub use geolocate::{LocationEstimate, LocationRequest};
pub use scan::{parse_networks, AccessPoint};
