// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use modelform_derive::Form;

#[derive(Form)]
pub struct Pair(i64, String);

fn main() {}
