// SPDX-License-Identifier: Apache-2.0

//! Channel used to deliver control messages to a node.
//!
//! Each node in the pipeline owns a dedicated OS thread driving its own
//! current-thread Tokio runtime; the pipeline's driver thread holds the
//! [`mpsc::Sender`] half and reaches across that thread boundary to
//! deliver pause/resume/terminate messages, so both channel halves are
//! `Send`.

pub mod error;
pub mod mpsc;
