//! Data model shared between the franchise backend and its API consumers.
//!
//! - `model`: persisted entities (applications, customers, agents, bank records,
//!   outbound notifications).
//! - `requests`: JSON payloads accepted by the backend routes.
//! - `outcome`: the `{ ok, data | kind, message }` envelope every route answers with.

pub mod model;
pub mod outcome;
pub mod requests;
