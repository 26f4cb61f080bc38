//! Conversion between client values and the server's JSON shapes.
//!
//! The server uses snake_case for some fields (`acc_type`, `movements_specs`)
//! and nests money inside movements; forms keep things flat and camelCase.

use pacsweb_core::forms::{
    AccountSpec, BalanceEvolutionQuery, FlowEvolutionQuery, TransactionRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Renames for account form values going to the server
pub const ACCOUNT_SPEC_KEYS: &[(&str, &str)] = &[("accType", "acc_type")];

/// Renames the keys of a JSON object according to `mapping`.
///
/// Keys absent from the mapping are kept, mapping entries absent from the
/// object are ignored, and non object values are returned unchanged.
pub fn remap_keys(mapping: &[(&str, &str)], value: Value) -> Value {
    match value {
        Value::Object(object) => {
            let remapped: Map<String, Value> = object
                .into_iter()
                .map(|(key, v)| {
                    let new_key = mapping
                        .iter()
                        .find(|(from, _)| *from == key)
                        .map(|(_, to)| to.to_string())
                        .unwrap_or(key);
                    (new_key, v)
                })
                .collect();
            Value::Object(remapped)
        }
        other => other,
    }
}

pub fn account_spec_to_wire(spec: &AccountSpec) -> serde_json::Result<Value> {
    Ok(remap_keys(ACCOUNT_SPEC_KEYS, serde_json::to_value(spec)?))
}

/// Flat `{account, currency, quantity}` movements become
/// `movements_specs: [{account, money: {currency, quantity}}]`.
pub fn transaction_request_to_wire(request: &TransactionRequest) -> serde_json::Result<Value> {
    let movements_specs: Vec<Value> = request
        .movements
        .iter()
        .map(|m| {
            let mut movement = json!({
                "account": m.account,
                "money": {"currency": m.currency, "quantity": m.quantity},
            });
            if let Some(comment) = &m.comment {
                movement["comment"] = Value::from(comment.clone());
            }
            movement
        })
        .collect();
    Ok(json!({
        "description": request.description,
        "reference": request.reference,
        "date": request.date.format("%Y-%m-%d").to_string(),
        "movements_specs": movements_specs,
        "tags": serde_json::to_value(&request.tags)?,
    }))
}

fn periods_to_wire(periods: &[pacsweb_core::Period]) -> Vec<Value> {
    periods
        .iter()
        .map(|(start, end)| {
            json!([
                start.format("%Y-%m-%d").to_string(),
                end.format("%Y-%m-%d").to_string()
            ])
        })
        .collect()
}

/// `{accounts, periods}` for the balance evolution report
pub fn balance_evolution_body(query: &BalanceEvolutionQuery) -> Value {
    json!({
        "accounts": query.accounts,
        "periods": periods_to_wire(&query.periods()),
    })
}

/// `{accounts, periods, currency_opts?}` for the flow evolution report
pub fn flow_evolution_body(query: &FlowEvolutionQuery) -> serde_json::Result<Value> {
    let mut body = json!({
        "accounts": query.accounts,
        "periods": periods_to_wire(&query.periods()),
    });
    if let Some(opts) = &query.currency_opts {
        body["currency_opts"] = serde_json::to_value(opts)?;
    }
    Ok(body)
}

/// Envelope of report responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: Vec<T>,
}

/// Response of the token endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token_value: Option<String>,
}
