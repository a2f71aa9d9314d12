// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use modelform_derive::Form;

#[derive(Form)]
pub struct Plan {
    #[id]
    pub id: i64,

    #[field(options_from = "tiers")]
    pub tier: String
}

fn main() {}
