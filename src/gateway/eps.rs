use crate::domain::transaction::{amount_decimal_from_minor, amount_minor_from_decimal};
use crate::error::ServiceError;
use crate::gateway::{EpsConfig, EpsGateway, InitiateOutcome, InitiateRequest, VerifyOutcome};
use serde_json::{json, Value};

pub struct EpsHttpGateway {
    pub base_url: String,
    pub merchant_id: String,
    pub api_key: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
}

#[async_trait::async_trait]
impl EpsGateway for EpsHttpGateway {
    fn name(&self) -> &'static str {
        "eps"
    }

    async fn initiate(&self, request: &InitiateRequest) -> Result<InitiateOutcome, ServiceError> {
        let url = format!("{}/api/v1/payment/initialize/", self.base_url);
        let body = json!({
            "merchant_transaction_id": request.merchant_transaction_id,
            "order_id": request.order_id,
            "amount": amount_decimal_from_minor(request.amount_minor),
            "currency": request.currency,
            "customer_name": request.customer_name,
            "customer_email": request.customer_email,
            "customer_phone": request.customer_phone,
            "customer_address": request.customer_address,
            "customer_city": request.customer_city,
            "customer_postcode": request.customer_postcode,
            "customer_country": request.customer_country,
            "product_name": request.product_name,
            "product_category": request.product_category,
            "success_url": request.success_url,
            "fail_url": request.fail_url,
            "cancel_url": request.cancel_url,
        });

        let value = self.post(&url, body).await?;
        match match_initiate(&value) {
            Some(outcome) => Ok(outcome),
            None => Err(ServiceError::Gateway(failure_message(&value))),
        }
    }

    async fn verify(&self, merchant_transaction_id: &str) -> Result<VerifyOutcome, ServiceError> {
        let url = format!("{}/api/v1/payment/verify/{}/", self.base_url, merchant_transaction_id);
        let value = self.get(&url).await?;
        match match_verify(&value, merchant_transaction_id) {
            Some(outcome) => Ok(outcome),
            None => Err(ServiceError::Gateway(failure_message(&value))),
        }
    }

    async fn fetch_config(&self) -> Result<EpsConfig, ServiceError> {
        let url = format!("{}/api/v1/payment/config/", self.base_url);
        let value = self.get(&url).await?;
        match match_config(&value) {
            Some(config) => Ok(config),
            None => Err(ServiceError::Gateway(failure_message(&value))),
        }
    }
}

impl EpsHttpGateway {
    async fn post(&self, url: &str, body: Value) -> Result<Value, ServiceError> {
        let resp = self
            .client
            .post(url)
            .header("X-Merchant-Id", &self.merchant_id)
            .header("X-Api-Key", &self.api_key)
            .json(&body)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await;
        Self::read_body(resp).await
    }

    async fn get(&self, url: &str) -> Result<Value, ServiceError> {
        let resp = self
            .client
            .get(url)
            .header("X-Merchant-Id", &self.merchant_id)
            .header("X-Api-Key", &self.api_key)
            .timeout(std::time::Duration::from_millis(self.timeout_ms))
            .send()
            .await;
        Self::read_body(resp).await
    }

    async fn read_body(resp: Result<reqwest::Response, reqwest::Error>) -> Result<Value, ServiceError> {
        match resp {
            Ok(r) => {
                let status = r.status();
                match r.json::<Value>().await {
                    Ok(value) => Ok(value),
                    Err(_) => Err(ServiceError::Gateway(format!(
                        "gateway returned an unreadable response (HTTP {})",
                        status.as_u16()
                    ))),
                }
            }
            Err(e) if e.is_timeout() => Err(ServiceError::Transport("payment gateway timed out".to_string())),
            Err(e) => Err(ServiceError::Transport(e.to_string())),
        }
    }
}

// The gateway has shipped more than one envelope shape; each matcher probes
// one candidate structure and the first match wins.
fn payload_candidates(value: &Value) -> Vec<&Value> {
    let mut candidates = vec![value];
    if let Some(data) = value.get("data") {
        candidates.push(data);
    }
    candidates
}

fn is_success(value: &Value) -> bool {
    value.get("success").and_then(Value::as_bool).unwrap_or(false)
}

pub fn match_initiate(value: &Value) -> Option<InitiateOutcome> {
    if !is_success(value) {
        return None;
    }
    payload_candidates(value).into_iter().find_map(|v| {
        Some(InitiateOutcome {
            transaction_id: string_field(v, "transaction_id")?,
            merchant_transaction_id: string_field(v, "merchant_transaction_id")?,
            redirect_url: string_field(v, "redirect_url")?,
        })
    })
}

pub fn match_verify(value: &Value, requested_id: &str) -> Option<VerifyOutcome> {
    if !is_success(value) {
        return None;
    }
    payload_candidates(value).into_iter().find_map(|v| {
        let status = string_field(v, "status")?;
        Some(VerifyOutcome {
            status,
            merchant_transaction_id: string_field(v, "merchant_transaction_id")
                .unwrap_or_else(|| requested_id.to_string()),
            amount_minor: amount_field(v, "total_amount"),
            transaction_date: string_field(v, "transaction_date"),
            transaction_type: string_field(v, "transaction_type"),
            financial_entity: string_field(v, "financial_entity"),
            customer_info: v.get("customer_info").cloned(),
        })
    })
}

pub fn match_config(value: &Value) -> Option<EpsConfig> {
    if !is_success(value) {
        return None;
    }
    let candidates: Vec<&Value> = std::iter::once(value)
        .chain(value.get("config"))
        .chain(value.get("data"))
        .collect();
    candidates.into_iter().find_map(|v| {
        Some(EpsConfig {
            is_active: v.get("is_active")?.as_bool()?,
            is_sandbox: v.get("is_sandbox").and_then(Value::as_bool).unwrap_or(false),
        })
    })
}

/// Most specific failure text available: body message, then the body error
/// list or map, then a generic line.
pub fn failure_message(value: &Value) -> String {
    if let Some(message) = value.get("message").and_then(Value::as_str) {
        if !message.trim().is_empty() {
            return message.to_string();
        }
    }
    if let Some(errors) = value.get("errors") {
        match errors {
            Value::Array(items) => {
                let joined: Vec<String> = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s.clone()),
                        Value::Object(_) => item.get("message").and_then(Value::as_str).map(ToString::to_string),
                        _ => None,
                    })
                    .collect();
                if !joined.is_empty() {
                    return joined.join("; ");
                }
            }
            Value::Object(map) => {
                let joined: Vec<String> = map
                    .iter()
                    .filter_map(|(field, msg)| msg.as_str().map(|m| format!("{}: {}", field, m)))
                    .collect();
                if !joined.is_empty() {
                    return joined.join("; ");
                }
            }
            _ => {}
        }
    }
    "payment gateway request failed".to_string()
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(ToString::to_string)
}

// total_amount arrives as "500.00" or as a bare number depending on the
// endpoint revision.
fn amount_field(value: &Value, key: &str) -> Option<i64> {
    match value.get(key)? {
        Value::String(s) => amount_minor_from_decimal(s),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.checked_mul(100)
            } else {
                n.as_f64().map(|f| (f * 100.0).round() as i64)
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initiate_matches_flat_and_nested_payloads() {
        let flat = json!({
            "success": true,
            "transaction_id": "T1",
            "merchant_transaction_id": "M1",
            "redirect_url": "https://gw/pay/M1"
        });
        let nested = json!({
            "success": true,
            "data": {
                "transaction_id": "T1",
                "merchant_transaction_id": "M1",
                "redirect_url": "https://gw/pay/M1"
            }
        });
        assert_eq!(match_initiate(&flat).unwrap().redirect_url, "https://gw/pay/M1");
        assert_eq!(match_initiate(&nested).unwrap().transaction_id, "T1");
    }

    #[test]
    fn initiate_rejects_unsuccessful_body() {
        let body = json!({"success": false, "message": "merchant disabled"});
        assert!(match_initiate(&body).is_none());
    }

    #[test]
    fn failure_message_prefers_body_message() {
        let body = json!({"success": false, "message": "merchant disabled", "errors": ["x"]});
        assert_eq!(failure_message(&body), "merchant disabled");
    }

    #[test]
    fn failure_message_falls_back_to_error_list_then_map() {
        let list = json!({"success": false, "errors": ["bad amount", {"message": "bad phone"}]});
        assert_eq!(failure_message(&list), "bad amount; bad phone");

        let map = json!({"success": false, "errors": {"amount": "must be positive"}});
        assert_eq!(failure_message(&map), "amount: must be positive");

        let bare = json!({"success": false});
        assert_eq!(failure_message(&bare), "payment gateway request failed");
    }

    #[test]
    fn verify_amount_accepts_string_and_number() {
        let with_string = json!({"success": true, "status": "SUCCESS", "total_amount": "500.00"});
        assert_eq!(match_verify(&with_string, "M1").unwrap().amount_minor, Some(50_000));

        let with_number = json!({"success": true, "status": "SUCCESS", "total_amount": 500});
        assert_eq!(match_verify(&with_number, "M1").unwrap().amount_minor, Some(50_000));
    }
}
