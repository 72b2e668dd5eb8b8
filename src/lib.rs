//! feynman-coach: a terminal client for the Mr. Feynman explanation-feedback
//! service. Collects a typed or spoken explanation of a concept, optionally
//! grounded in an uploaded reference document, submits it for analysis, and
//! renders the structured feedback — including the multi-turn interview mode
//! driven by the backend's follow-up questions.

pub mod api;
pub mod app;
pub mod cli;
pub mod client;
pub mod compose;
pub mod config;
pub mod error;
pub mod fallback;
pub mod history;
pub mod render;
pub mod session;
pub mod source;
pub mod speech;
