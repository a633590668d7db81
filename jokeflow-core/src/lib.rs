// Copyright 2025 Jokeflow Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Jokeflow Core
//!
//! Domain types for the interruptible joke-generation workflow: the
//! per-thread checkpoint record, its status lifecycle, and the error
//! kinds surfaced by every layer above.

pub mod error;
pub mod thread;

pub use error::{Result, WorkflowError};
pub use thread::{ThreadState, ThreadStatus, NODE_GENERATE_EXPLANATION, NODE_GENERATE_JOKE};
