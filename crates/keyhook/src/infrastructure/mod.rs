//! Infrastructure layer of keyhook.
//!
//! Contains the OS-facing adapters: the low-level hook backends and message
//! pump, the process exit hook, and config file storage.
//!
//! **Dependency rule**: this layer may depend on `keyhook_core` and on the
//! plain data types of `application` (bindings). It must not call into
//! application use cases.

pub mod hook;
pub mod lifecycle;
pub mod storage;
