//! Write-endpoint parameters gathered from every place a client may put them.
//!
//! Fields are read from the query string, then from a form-encoded body, then
//! from a JSON body. A later source replaces a key set by an earlier one.
//! Bracketed form keys such as `userdata[shipping_city]` build nested objects,
//! and an empty bracket pair (`tags[]`) appends under a numbered key.
//!
//! Unreadable sources are skipped, so a broken body surfaces as a missing
//! parameter during validation rather than as a framework rejection.

use std::convert::Infallible;

use axum::{
    Form, Json,
    extract::{FromRequest, Query, Request},
    http::header,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Merged request parameters, keyed by top-level name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(pub Map<String, Value>);

enum BodyKind {
    Json,
    Form,
}

impl<S> FromRequest<S> for RequestParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut params = Map::new();

        match Query::<Vec<(String, String)>>::try_from_uri(req.uri()) {
            Ok(Query(pairs)) => merge_pairs(&mut params, pairs),
            Err(e) => tracing::debug!(error = %e, "Skipping unreadable query string"),
        }

        match body_kind(&req) {
            Some(BodyKind::Json) => match Json::<Value>::from_request(req, state).await {
                Ok(Json(Value::Object(body))) => params.extend(body),
                Ok(Json(_)) => tracing::debug!("Skipping JSON body that is not an object"),
                Err(e) => tracing::debug!(error = %e, "Skipping unreadable JSON body"),
            },
            Some(BodyKind::Form) => {
                match Form::<Vec<(String, String)>>::from_request(req, state).await {
                    Ok(Form(pairs)) => merge_pairs(&mut params, pairs),
                    Err(e) => tracing::debug!(error = %e, "Skipping unreadable form body"),
                }
            }
            None => {}
        }

        Ok(Self(params))
    }
}

impl RequestParams {
    /// Deserialize the merged parameters into a parameter struct.
    ///
    /// Falls back to `T::default()` if the parameters do not fit `T`.
    #[must_use]
    pub fn parse<T: DeserializeOwned + Default>(self) -> T {
        serde_json::from_value(Value::Object(self.0)).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Request parameters do not fit, using defaults");
            T::default()
        })
    }
}

fn body_kind(req: &Request) -> Option<BodyKind> {
    let content_type = req.headers().get(header::CONTENT_TYPE)?.to_str().ok()?;
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence == "application/json" || essence.ends_with("+json") {
        Some(BodyKind::Json)
    } else if essence == "application/x-www-form-urlencoded" {
        Some(BodyKind::Form)
    } else {
        None
    }
}

fn merge_pairs(params: &mut Map<String, Value>, pairs: Vec<(String, String)>) {
    for (key, value) in pairs {
        let (base, path) = split_key(&key);
        insert_nested(params, base, &path, Value::String(value));
    }
}

/// Split `a[b][c]` into `("a", ["b", "c"])`.
///
/// Keys that are not well-formed bracket paths are kept whole.
fn split_key(key: &str) -> (&str, Vec<&str>) {
    let Some(open) = key.find('[') else {
        return (key, Vec::new());
    };
    let (base, mut rest) = key.split_at(open);
    if base.is_empty() {
        return (key, Vec::new());
    }

    let mut path = Vec::new();
    while let Some(inner) = rest.strip_prefix('[') {
        let Some((segment, tail)) = inner.split_once(']') else {
            return (key, Vec::new());
        };
        path.push(segment);
        rest = tail;
    }

    if rest.is_empty() {
        (base, path)
    } else {
        (key, Vec::new())
    }
}

fn insert_nested(target: &mut Map<String, Value>, key: &str, path: &[&str], value: Value) {
    let Some((next, rest)) = path.split_first() else {
        target.insert(key.to_string(), value);
        return;
    };

    let slot = target
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }

    if let Value::Object(child) = slot {
        if next.is_empty() {
            let index = child.len().to_string();
            insert_nested(child, &index, rest, value);
        } else {
            insert_nested(child, next, rest, value);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http;
    use serde_json::json;

    use super::*;

    async fn extract(request: Request) -> Value {
        let RequestParams(params) = RequestParams::from_request(request, &()).await.unwrap();
        Value::Object(params)
    }

    #[test]
    fn test_split_key() {
        assert_eq!(split_key("userid"), ("userid", vec![]));
        assert_eq!(
            split_key("userdata[shipping_city]"),
            ("userdata", vec!["shipping_city"])
        );
        assert_eq!(split_key("a[b][c]"), ("a", vec!["b", "c"]));
        assert_eq!(split_key("tags[]"), ("tags", vec![""]));
        assert_eq!(split_key("a[b"), ("a[b", vec![]));
        assert_eq!(split_key("a[b]c"), ("a[b]c", vec![]));
        assert_eq!(split_key("[b]"), ("[b]", vec![]));
    }

    #[test]
    fn test_merge_pairs_builds_nested_objects() {
        let mut params = Map::new();
        merge_pairs(
            &mut params,
            vec![
                ("userid".to_string(), "7".to_string()),
                ("userdata[shipping_city]".to_string(), "Pune".to_string()),
                ("userdata[shipping_country]".to_string(), "IN".to_string()),
                ("tags[]".to_string(), "home".to_string()),
                ("tags[]".to_string(), "work".to_string()),
            ],
        );

        assert_eq!(
            Value::Object(params),
            json!({
                "userid": "7",
                "userdata": { "shipping_city": "Pune", "shipping_country": "IN" },
                "tags": { "0": "home", "1": "work" }
            })
        );
    }

    #[tokio::test]
    async fn test_form_body_is_read() {
        let request = http::Request::post("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(
                "userid=7&type=shipping&userdata%5Bshipping_city%5D=Pune",
            ))
            .unwrap();

        assert_eq!(
            extract(request).await,
            json!({
                "userid": "7",
                "type": "shipping",
                "userdata": { "shipping_city": "Pune" }
            })
        );
    }

    #[tokio::test]
    async fn test_json_body_overrides_query() {
        let request = http::Request::post("/?userid=7&type=shipping&userdata=stale")
            .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
            .body(Body::from(r#"{"userdata":{"shipping_city":"Pune"}}"#))
            .unwrap();

        assert_eq!(
            extract(request).await,
            json!({
                "userid": "7",
                "type": "shipping",
                "userdata": { "shipping_city": "Pune" }
            })
        );
    }

    #[tokio::test]
    async fn test_unreadable_body_is_skipped() {
        let request = http::Request::post("/?type=shipping")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        assert_eq!(extract(request).await, json!({ "type": "shipping" }));

        let request = http::Request::post("/")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("userid=7"))
            .unwrap();
        assert_eq!(extract(request).await, json!({}));
    }
}
