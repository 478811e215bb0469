use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocateError {
    #[error("No API key configured; pass --key or save one with `wifi-locate set-key`")]
    MissingApiKey,

    #[error("Error communicating with the target: {0}")]
    DeviceUnreachable(String),

    #[error("The target answered with HTTP {0} instead of a scan document")]
    DeviceRefused(u16),

    #[error("Only {0} wireless network(s) visible to the target; at least 2 are needed for a position fix")]
    TooFewNetworks(usize),

    #[error("The geolocation service rejected the API key")]
    KeyRejected,

    #[error("Geolocation request failed with HTTP {status}: {body}")]
    LookupFailed { status: u16, body: String },

    #[error("Error communicating with the geolocation service: {0}")]
    ServiceUnreachable(String),

    #[error("Unable to parse the geolocation response. The raw data is: {0}")]
    MalformedLocation(String),
}
