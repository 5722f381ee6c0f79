//! HTTP side of event streaming.
//!
//! This module only turns an [`sse::EventStream`] into an HTTP response. The
//! session state machine, framing and disconnect handling live in the `sse`
//! crate.

pub(crate) mod handler;
pub(crate) mod headers;
