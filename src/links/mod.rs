// src/links/mod.rs
// =============================================================================
// Link handling for the broken-link check.
//
// Submodules:
// - extract: pulls same-origin candidate links out of the parsed HTML
// - probe: the LinkProber seam and its reqwest implementation
// - validator: probes a bounded set of links with a bounded worker pool
// =============================================================================

mod extract;
mod probe;
mod validator;

pub use extract::extract_same_origin_links;
pub use probe::{HttpLinkProber, LinkProber, LinkStatus};
pub use validator::{LinkProbeOutcome, LinkValidator};
