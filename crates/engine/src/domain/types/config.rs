/// Centralized defaults for the trust engine.
pub struct TrustDefaults;

impl TrustDefaults {
    /// Anchors augment the system roots until configured otherwise.
    pub const ANCHORS_ONLY: bool = false;
    /// Whether the self-signed acceptance path was compiled in.
    pub const SELF_SIGNED_CAPABILITY: bool = cfg!(feature = "enterprise");
    /// Whether a default webpki-backed chain oracle is available.
    pub const HAS_DEFAULT_ORACLE: bool = cfg!(feature = "webpki");
}
