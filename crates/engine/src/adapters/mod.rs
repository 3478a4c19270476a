// Concrete backends for the domain traits, each behind its cargo feature.

#[cfg(feature = "webpki")]
pub mod webpki;

#[cfg(feature = "rustls")]
pub mod rustls;
