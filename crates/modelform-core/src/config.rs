// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Engine configuration.
//!
//! [`FormConfig`] deserializes from any serde format; missing keys take
//! their defaults.
//!
//! ```toml
//! field_prefix = "QorResource."
//! clear_sentinel = "-"
//! bcrypt_cost = 10
//! none_label = "None"
//! merge_policy = "keep_submitted"
//! ```

use serde::{Deserialize, Serialize};

/// How the diff pass treats changed fields on update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Record the field as changed and restore the previously stored value
    /// in the working copy.
    #[default]
    RevertChanged,

    /// Record the field as changed and keep the submitted value.
    KeepSubmitted
}

/// Form engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Transport prefix stripped from submitted keys.
    pub field_prefix: String,

    /// Single many-reference value that clears the relation on update.
    pub clear_sentinel: String,

    /// bcrypt work factor.
    pub bcrypt_cost: u32,

    /// Label of the "nothing selected" reference option.
    pub none_label: String,

    /// Diff behavior on update.
    pub merge_policy: MergePolicy
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            field_prefix:   String::new(),
            clear_sentinel: "-".to_string(),
            bcrypt_cost:    bcrypt::DEFAULT_COST,
            none_label:     "None".to_string(),
            merge_policy:   MergePolicy::default()
        }
    }
}
