// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Model-driven forms for administrative interfaces.
//!
//! Derive [`Form`] on an entity struct, then let [`FormEngine`] build its
//! form, parse posted submissions back into the entity and report which
//! fields an update changed.
//!
//! ```rust,ignore
//! use modelform::prelude::*;
//! use modelform::Form;
//!
//! #[derive(Debug, Clone, Default, Form)]
//! #[form(label = "name")]
//! pub struct Category {
//!     #[id]
//!     pub id: i64,
//!
//!     #[field(required)]
//!     pub name: String,
//! }
//!
//! let registry = Registry::new();
//! let gateway = MemoryGateway::new();
//! let engine = FormEngine::new(&registry, &gateway);
//!
//! let mut form = engine.build(Category::default(), FormAction::Create, &ActorRole::Standard)?;
//! let submission = engine.submission([("name", "Books")]);
//! engine.submit(&mut form, &submission, &ActorRole::Standard)?;
//! assert_eq!(form.entity().id, 1);
//! ```
//!
//! Generated code refers to `modelform_core` by its crate name, so the
//! runtime crate must be a direct dependency next to this one.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

pub use modelform_core::*;
pub use modelform_derive::Form;
