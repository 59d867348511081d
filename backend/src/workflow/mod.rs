//! # Application Workflow
//!
//! The status state machine of a franchise application and everything that happens
//! when it moves:
//!
//! ```text
//! pending --approve--> approved --agreement--> agreement --one-time-fee--> one-time-fee
//!    \                    |                        |
//!     +------------------ reject ------------------+--> rejected
//! ```
//!
//! - `state`: which transitions are legal from which status, and the messages for
//!   the ones that are not.
//! - `credentials`: customer id and password generation for the approval step.
//! - `engine`: `WorkflowEngine`, the operations the HTTP layer calls.

pub mod credentials;
pub mod engine;
pub mod state;
