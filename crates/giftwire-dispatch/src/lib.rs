//! Notification dispatch for the Giftwire pipeline.
//!
//! Renders the announcement template for each resolved assignment, splits it
//! into transmission-safe chunks, and delivers the chunks over the DM
//! transport one recipient at a time with pacing delays and per-recipient
//! failure isolation.

pub mod dispatch_outbound;
pub mod dispatch_run;
pub mod message_template;

pub use dispatch_outbound::{
    DiscordDmClient, DiscordDmConfig, DmSendError, DmSendErrorKind, DmTransport,
};
pub use dispatch_run::{
    DeliveryOutcome, DeliveryStatus, DispatchRunConfig, DispatchRunReport, DispatchRunner,
};
pub use message_template::render_announcement;
