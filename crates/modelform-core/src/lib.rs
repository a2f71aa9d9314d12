// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Runtime form engine for modelform.
//!
//! Turns entity types into editable forms and turns posted submissions back
//! into entities. This crate holds everything the `#[derive(Form)]` macro
//! generates code against; it can also be used with hand-written
//! [`FormEntity`] impls.
//!
//! # Overview
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`registry`] | Per-type descriptor cache |
//! | [`kind`] | Field kind inference |
//! | [`directive`] | Per-field directive tables |
//! | [`resolve`] | Reference options and association partitions |
//! | [`form`] | Presentation model assembly |
//! | [`engine`] | Submission parsing, coercion and saving |
//! | [`diff`] | Change detection on update |
//!
//! # Flow
//!
//! ```text
//! FormEngine::build(entity) ──► Form<T> ──► render
//!                                  │
//! posted pairs ──► Submission ──► FormEngine::parse ──► Parsed<T>
//!                                                          │
//!                                  FormEngine::save ◄──────┘
//!                                        │
//!                                        ▼
//!                              AuditRecord (changed fields)
//! ```
//!
//! # Storage
//!
//! Persistence goes through [`StorageGateway`]. [`MemoryGateway`] keeps
//! everything in process and is what the tests run against.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod audit;
pub mod coerce;
pub mod config;
pub mod descriptor;
pub mod diff;
pub mod directive;
pub mod engine;
pub mod entity;
pub mod error;
pub mod form;
pub mod gateway;
pub mod kind;
pub mod memory;
pub mod prelude;
pub mod registry;
pub mod resolve;
pub mod submit;
pub mod value;

#[cfg(test)]
mod testing;

pub use audit::{AuditEvent, AuditRecord};
pub use config::{FormConfig, MergePolicy};
pub use descriptor::{
    FieldDescriptor, FieldHooks, FieldSpec, OptionProvider, ParseHook, SelectOption, ValidateHook,
    parse_hook
};
pub use directive::{DirectiveTable, FieldFlags};
pub use engine::FormEngine;
pub use entity::{Actor, ActorRole, EntityRecord, EntityType, FormEntity};
pub use error::{ConfigError, FieldError, FormError, GatewayError, ValueError};
pub use form::{Form, FormAction, PresentationField};
pub use gateway::{Association, Record, StorageGateway, StoredBlob};
pub use kind::{FieldKind, RelationTarget, TypeShape, infer_kind};
pub use memory::MemoryGateway;
pub use registry::Registry;
pub use resolve::Partition;
pub use submit::{AssociationOp, Parsed, Submission, SubmissionValue, UploadedFile};
pub use value::{Blob, FormValue, Identifier, Ref, StringParsable, Timestamps, Value};
