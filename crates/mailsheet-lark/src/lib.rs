//! Mailsheet Lark Client
//!
//! Talks to the Lark open platform: tenant token, file upload, message send
//! and bot lookup. The [`Delivery`] trait is the seam the webhook server
//! uses to post results back into a chat.
//!
//! # Example
//!
//! ```no_run
//! use mailsheet_lark::{Delivery, LarkClient, LarkConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LarkClient::new(LarkConfig {
//!     app_id: "cli_xxx".to_string(),
//!     app_secret: "secret".to_string(),
//!     ..LarkConfig::default()
//! })?;
//! let workbook = std::fs::read("output.xlsx")?;
//! client.deliver_file("oc_123", "output.xlsx", workbook).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod config;
mod delivery;
mod error;

pub use client::{BotInfo, LarkClient};
pub use config::LarkConfig;
pub use delivery::{Delivered, Delivery, RecordingDelivery};
pub use error::LarkError;
