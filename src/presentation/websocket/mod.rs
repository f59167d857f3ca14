//! WebSocket Chat Core
//!
//! Room-based real-time messaging: connection lifecycle, session
//! registry, the per-message moderation pipeline and room broadcast.

pub mod broadcast;
pub mod frames;
pub mod handler;
pub mod pipeline;
pub mod registry;

pub use broadcast::Broadcaster;
pub use frames::{BroadcastFrame, ErrorFrame, InboundMessage};
pub use handler::ws_handler;
pub use pipeline::{MessagePipeline, PipelineError};
pub use registry::{ChatSession, SessionRegistry};
