//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionManager`: sign-in/sign-out/validate flows and the in-memory
//!   current user
//! - `SignInRequest` / `SignInResponse`: the login endpoint wire types
//!
//! Issued credentials live in two cookies shared with the token injector.

pub mod session;

pub use session::{SessionManager, SignInRequest, SignInResponse};
