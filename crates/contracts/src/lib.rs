//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Data Flow
//! - Raw envelope JSON is validated into an [`Envelope`]
//! - Each recipient yields exactly one [`DispatchResult`]
//! - Results fold into an [`AggregateOutcome`] the host routes on

mod blueprint;
mod envelope;
mod error;
mod gateway;
mod outcome;
mod recipient_id;

pub use blueprint::*;
pub use envelope::Envelope;
pub use error::*;
pub use gateway::{GatewayClient, LocalGatewayClient};
pub use outcome::*;
pub use recipient_id::RecipientId;
