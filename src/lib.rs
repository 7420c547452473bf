//! SafeHorizon - AI-Powered Localization Server
//!
//! An HTTP server that translates text, localizes audio (speech-to-text,
//! translation, text-to-speech) and localizes video (multimodal
//! transcribe-and-translate) by relaying content to external AI providers.

pub mod cli;
pub mod config;
pub mod error;
pub mod multimodal;
pub mod server;
pub mod storage;
pub mod synthesize;
pub mod transcribe;
pub mod translate;
pub mod workflow;
