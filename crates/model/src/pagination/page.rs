use crate::{
    error::PageError,
    records::{column::ColumnType, row::Row},
};
use serde::{Deserialize, Deserializer};

/// One unit of server response for a query.
///
/// A query result is the concatenation of the `data` of every page reached
/// by following `next_uri` until it is `null`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page {
    /// Server side query id, when the server reports one.
    #[serde(default)]
    pub id: Option<String>,

    /// Column layout. Always sent on the first page, optional afterwards.
    #[serde(default)]
    pub schema: Option<Schema>,

    #[serde(default)]
    pub data: Vec<Row>,

    /// Reference to the next page. The field must be present; `null` marks
    /// the final page.
    #[serde(deserialize_with = "required_nullable")]
    pub next_uri: Option<String>,

    /// Application level failure reported alongside a successful HTTP status.
    #[serde(default)]
    pub error: Option<ServerError>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Schema {
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub name: String,
    pub data_type: DataTypeTag,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataTypeTag {
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

// Field must be present; an explicit `null` is accepted.
fn required_nullable<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

impl Page {
    /// Decodes a raw response body.
    ///
    /// Some servers wrap continuation pages in a JSON string; such a payload is
    /// unwrapped once before decoding.
    pub fn decode(raw: &[u8]) -> Result<Page, PageError> {
        let value: serde_json::Value = serde_json::from_slice(raw)?;
        let page = match value {
            serde_json::Value::String(inner) => serde_json::from_str(&inner)?,
            other => serde_json::from_value(other)?,
        };
        Ok(page)
    }

    /// Fails with [`PageError::Server`] when the server embedded an error.
    pub fn check_error(&self) -> Result<(), PageError> {
        match &self.error {
            Some(err) => Err(PageError::Server {
                code: err.code,
                message: err.message.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_uri.is_none()
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    pub fn column_types(&self) -> Vec<ColumnType> {
        self.schema
            .as_ref()
            .map(|schema| {
                schema
                    .fields
                    .iter()
                    .map(|f| ColumnType::new(f.name.clone(), f.data_type.type_name.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn first_page() -> serde_json::Value {
        json!({
            "id": "q-1",
            "schema": {
                "fields": [
                    { "name": "id", "data_type": { "type": "Int64" } },
                    { "name": "name", "data_type": { "type": "Nullable", "inner": { "type": "String" } } }
                ]
            },
            "data": [["1", "alice"], ["2", null]],
            "next_uri": "/v1/query/q-1/page/1",
            "error": null,
            "stats": { "scan_progress": { "rows": 2 } }
        })
    }

    #[test]
    fn test_decode_first_page() {
        let raw = serde_json::to_vec(&first_page()).unwrap();
        let page = Page::decode(&raw).unwrap();

        assert_eq!(page.id.as_deref(), Some("q-1"));
        assert_eq!(page.row_count(), 2);
        assert_eq!(page.data[1], vec![json!("2"), json!(null)]);
        assert_eq!(page.next_uri.as_deref(), Some("/v1/query/q-1/page/1"));
        assert!(!page.is_terminal());
        assert!(page.check_error().is_ok());
        assert_eq!(
            page.column_types(),
            vec![
                ColumnType::new("id", "Int64"),
                ColumnType::new("name", "Nullable")
            ]
        );
    }

    #[test]
    fn test_null_next_uri_is_terminal() {
        let raw = br#"{"data": [], "next_uri": null}"#;
        let page = Page::decode(raw).unwrap();
        assert!(page.is_terminal());
        assert!(page.column_types().is_empty());
    }

    #[test]
    fn test_empty_page_with_continuation_is_not_terminal() {
        let raw = br#"{"data": [], "next_uri": "/v1/query/q/page/3"}"#;
        let page = Page::decode(raw).unwrap();
        assert_eq!(page.row_count(), 0);
        assert!(!page.is_terminal());
    }

    #[test]
    fn test_missing_next_uri_is_a_decode_error() {
        let raw = br#"{"data": [["1"]]}"#;
        assert!(matches!(Page::decode(raw), Err(PageError::Decode(_))));
    }

    #[test]
    fn test_malformed_payload_is_a_decode_error() {
        assert!(matches!(
            Page::decode(b"<html>bad gateway</html>"),
            Err(PageError::Decode(_))
        ));
        assert!(matches!(
            Page::decode(br#"{"data": "nope", "next_uri": null}"#),
            Err(PageError::Decode(_))
        ));
    }

    #[test]
    fn test_double_encoded_payload() {
        let inner = r#"{"data": [["7"]], "next_uri": null}"#;
        let raw = serde_json::to_vec(&serde_json::Value::String(inner.to_string())).unwrap();
        let page = Page::decode(&raw).unwrap();
        assert_eq!(page.data, vec![vec![json!("7")]]);
        assert!(page.is_terminal());
    }

    #[test]
    fn test_embedded_error() {
        let raw = br#"{
            "data": [],
            "next_uri": "/v1/query/q/page/2",
            "error": { "code": 1025, "message": "Unknown table 't'" }
        }"#;
        let page = Page::decode(raw).unwrap();
        match page.check_error() {
            Err(PageError::Server { code, message }) => {
                assert_eq!(code, 1025);
                assert_eq!(message, "Unknown table 't'");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[test]
    fn test_embedded_error_without_code() {
        let raw = br#"{"data": [], "next_uri": null, "error": {"message": "query killed"}}"#;
        let page = Page::decode(raw).unwrap();
        match page.check_error() {
            Err(PageError::Server { code, message }) => {
                assert_eq!(code, 0);
                assert_eq!(message, "query killed");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }
}
