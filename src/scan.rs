//! Wireless network extraction from the printer's scan document.
//!
//! Management firmware reports the networks its radio can see as a flat
//! stream of `<wifi:...>` attribute tags rather than a strictly nested
//! document. This module pulls typed [`AccessPoint`] records out of that
//! stream and renders them as a table.
//!
//! # Extraction Process
//!
//! 1. Scan the raw text with a single multi-group pattern per entry
//! 2. An entry is a contiguous run of SSID, BSSID, Channel and dBm tags,
//!    in that order, with arbitrary unrelated markup in between
//! 3. Regroup the bare 12-digit BSSID into colon-separated octets
//! 4. Decode the hex SSID into display text (the geolocation payload
//!    never includes it)
//!
//! Records come out in the order the device listed them.
//!
//! # Example
//!
//! ```no_run
//! use wifi_locate::scan::{parse_networks, display_networks};
//!
//! let raw = std::fs::read_to_string("scan.xml").expect("read failed");
//! let networks = parse_networks(&raw);
//! display_networks(&networks);
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    // One match per network entry. Non-greedy gaps keep each match scoped
    // to the minimal span holding the four tags, so one entry's fields
    // cannot swallow the next entry's.
    static ref ENTRY_RE: Regex = Regex::new(
        r"(?s)<wifi:SSID>([0-9A-Fa-f]+)</wifi:SSID>.+?<wifi:BSSID>([0-9A-Fa-f]{12})</wifi:BSSID>.+?<wifi:Channel>([0-9]{1,2})</wifi:Channel>.+?<wifi:dBm>(-?[0-9]{0,3})</wifi:dBm>"
    )
    .unwrap();
}

/// One wireless network observed by the target's radio.
///
/// Serializes to the shape the geolocation API expects for a single
/// access point. Channel and signal strength carry the device's literal
/// text; the API accepts numbers in string form and this guarantees the
/// reported values are forwarded without reformatting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPoint {
    /// Hardware address as six colon-separated octets (e.g. "aa:bb:cc:dd:ee:ff").
    pub mac_address: String,

    /// Received signal strength in dBm, as reported (e.g. "-43").
    pub signal_strength: String,

    /// 802.11 channel number, as reported.
    pub channel: String,

    /// Always 0: the record describes the scan just taken, not a cached one.
    pub age: u32,

    /// Network name decoded from the hex SSID, for display only.
    /// None when the device reported a name that is not valid UTF-8.
    #[serde(skip)]
    pub ssid: Option<String>,
}

impl AccessPoint {
    /// Name to show for this network, with a placeholder for names that
    /// could not be decoded.
    pub fn display_name(&self) -> &str {
        self.ssid.as_deref().unwrap_or("(undecodable)")
    }
}

/// Extracts all complete network entries from the printer's scan document.
///
/// Only contiguous SSID/BSSID/Channel/dBm groups produce a record;
/// partial entries are ignored. A name that fails hex or UTF-8 decoding
/// blanks that entry's display name without dropping the entry or any
/// of its neighbours.
///
/// # Arguments
/// * `raw` - The scan document text exactly as the device returned it
///
/// # Returns
/// The extracted records, in order of appearance.
pub fn parse_networks(raw: &str) -> Vec<AccessPoint> {
    ENTRY_RE
        .captures_iter(raw)
        .map(|entry| AccessPoint {
            mac_address: format_mac(&entry[2]),
            signal_strength: entry[4].to_string(),
            channel: entry[3].to_string(),
            age: 0,
            ssid: decode_ssid(&entry[1]),
        })
        .collect()
}

/// Regroups a bare 12-digit BSSID into typical MAC address notation.
///
/// Character case is preserved as reported. Input that already contains
/// separators is returned unchanged, so the formatting is idempotent.
pub fn format_mac(bssid: &str) -> String {
    if bssid.contains(':') {
        return bssid.to_string();
    }

    bssid
        .as_bytes()
        .chunks(2)
        .map(|octet| octet.iter().map(|&b| b as char).collect::<String>())
        .collect::<Vec<_>>()
        .join(":")
}

/// Decodes a hex-encoded SSID into readable text.
///
/// Returns None for odd-length hex or names that are not valid UTF-8;
/// the caller substitutes a placeholder for display.
fn decode_ssid(ssid_hex: &str) -> Option<String> {
    let bytes = hex::decode(ssid_hex).ok()?;
    String::from_utf8(bytes).ok()
}

/// Displays the extracted networks in a formatted table.
///
/// # Output Format
/// ```text
/// SSID                                BSSID                  Channel  Strength
/// ----------------------------------------------------------------------------
/// CorpNet                             aa:bb:cc:dd:ee:ff           11       -43
/// GuestNet                            aa:bb:cc:dd:ee:f0            6       -67
/// ```
pub fn display_networks(networks: &[AccessPoint]) {
    if networks.is_empty() {
        println!("No wireless networks reported.");
        return;
    }

    println!("{:<36}{:<20}{:>10}{:>10}", "SSID", "BSSID", "Channel", "Strength");
    println!("{}", "-".repeat(76));

    for network in networks {
        println!(
            "{:<36}{:<20}{:>10}{:>10}",
            truncate_name(network.display_name(), 34),
            network.mac_address,
            network.channel,
            network.signal_strength
        );
    }
}

/// Truncates a network name so it cannot overflow its table column.
fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() > max_len {
        let cut: String = name.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    } else {
        name.to_string()
    }
}
