// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use chrono::NaiveDateTime;
use modelform_core::{FieldKind, FormEntity, Registry, SelectOption, Value};
use modelform_derive::Form;

fn tiers() -> Vec<SelectOption> {
    vec![SelectOption::new("gold", "Gold"), SelectOption::new("silver", "Silver")]
}

fn colors() -> Vec<SelectOption> {
    vec![SelectOption::plain("red")]
}

fn parse_cents(raw: &str) -> Result<Value, String> {
    let euros: f64 = raw.trim().parse().map_err(|_| format!("`{raw}` is not an amount"))?;
    Ok(Value::Int((euros * 100.0).round() as i64))
}

fn positive(value: &Value) -> Result<(), String> {
    match value {
        Value::Int(cents) if *cents < 0 => Err("must be positive".into()),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, Form)]
#[form(source(name = "tiers", with = "tiers"))]
pub struct Plan {
    #[id]
    pub id: i64,

    #[field(options_from = "tiers")]
    pub tier: String,

    #[field(options_with = "colors")]
    pub color: String,

    #[field(parse = "parse_cents", validate = "positive")]
    pub price: i64,

    #[field(directives = "readonlyfull")]
    pub launched: Option<NaiveDateTime>,
}

fn main() {
    assert_eq!(Plan::option_sources().len(), 1);

    let registry = Registry::new();
    let descriptors = registry.register::<Plan>().unwrap();
    assert_eq!(descriptors[0].kind, FieldKind::Select);
    assert_eq!(descriptors[0].static_options().len(), 2);
    assert_eq!(descriptors[1].kind, FieldKind::Select);
    assert_eq!(descriptors[1].static_options().len(), 1);

    let price = &descriptors[2];
    let parse = price.hooks.parse.unwrap();
    assert_eq!(parse("12.5"), Ok(Value::Int(1250)));
    let validate = price.hooks.validate.unwrap();
    assert!(validate(&Value::Int(-1)).is_err());

    assert!(descriptors[3].flags.has_full_override());
}
