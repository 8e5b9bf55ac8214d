//! Agent store response normalization.
//!
//! [`normalize`] holds the pure pipeline stages: shape detection, intro splitting, label
//! stripping, feature normalization, trend parsing, mention linking and title id parsing.
//! [`core`] holds the surrounding pieces: agent records, payload and catalog loading,
//! configuration and terminal rendering.

pub mod core;
pub mod normalize;
