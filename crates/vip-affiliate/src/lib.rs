//! # vip-affiliate
//!
//! Affiliate API layer: the signed request client talking to the upstream
//! affiliate service, and the TTL cache decorator that bounds call volume.

pub mod cache;
pub mod client;

pub use cache::CachedLookup;
pub use client::{AffiliateClient, AffiliateClientConfig};
