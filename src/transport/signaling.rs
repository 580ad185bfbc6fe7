use url::Url;
use crate::{Error, Result};
use crate::negotiation::StreamTarget;

/// Schemes accepted for the signaling endpoint
const SUPPORTED_SCHEMES: [&str; 3] = ["http", "https", "webrtc"];

/// Parse and validate the signaling base endpoint
pub fn parse_signaling_base(base: &str) -> Result<Url> {
    let url = Url::parse(base)?;

    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
        return Err(Error::config(format!("Unsupported signaling scheme: {}", url.scheme())));
    }

    if url.host_str().is_none() {
        return Err(Error::config("Missing host in signaling URL"));
    }

    Ok(url)
}

/// Build the play URL for one candidate: `?app=<namespace>&stream=<id>&type=play`
pub fn build_signaling_url(base: &Url, target: &StreamTarget) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("app", &target.namespace)
        .append_pair("stream", &target.stream_id)
        .append_pair("type", "play");
    url
}
