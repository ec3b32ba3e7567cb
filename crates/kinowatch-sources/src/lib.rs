//! Listing-site adapters: one fetcher per source.
//!
//! Each adapter implements the core `SourceFetcher` port with a quick HTTP
//! strategy, escalating to the browser renderer where the site calls for it.

pub mod html;
pub mod http;
pub mod karo;
pub mod kinoformat;
pub mod prada;

pub use karo::KaroFetcher;
pub use kinoformat::KinoformatFetcher;
pub use prada::PradaFetcher;
