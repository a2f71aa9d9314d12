// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Audit data produced after a save.

use serde::Serialize;

use crate::value::Identifier;

/// Kind of write recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEvent {
    /// Entity was created.
    Created,
    /// Entity was updated.
    Updated
}

/// What a form submission changed, for the host's audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    /// Entity type name.
    pub entity: &'static str,

    /// Entity identifier, `None` before the first save.
    pub id: Option<Identifier>,

    /// Kind of write.
    pub event: AuditEvent,

    /// Changed fields; always empty for [`AuditEvent::Created`].
    pub changed_fields: Vec<&'static str>
}

impl AuditRecord {
    /// Check if an update changed nothing.
    pub fn is_noop(&self) -> bool {
        self.event == AuditEvent::Updated && self.changed_fields.is_empty()
    }
}
