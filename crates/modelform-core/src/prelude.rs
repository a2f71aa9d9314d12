// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Convenient re-exports for common usage.
//!
//! # Usage
//!
//! ```rust
//! use modelform_core::prelude::*;
//!
//! let registry = Registry::new();
//! let gateway = MemoryGateway::new();
//! let engine = FormEngine::new(&registry, &gateway);
//! assert_eq!(engine.config().clear_sentinel, "-");
//! ```

pub use crate::{
    Actor, ActorRole, Blob, FieldSpec, Form, FormAction, FormConfig, FormEngine, FormEntity,
    FormError, FormValue, Identifier, MemoryGateway, MergePolicy, Ref, Registry, StorageGateway,
    Submission, Timestamps, TypeShape, UploadedFile, Value, ValueError, value::assign
};
