//! Helpers for turning Rust type information into JSON Schema that can be
//! shipped alongside a chat request. The JSON is produced with [`schemars`]
//! and forwarded to providers that support structured responses
//! (`response_format = json_schema`).

use schemars::{JsonSchema, SchemaGenerator, r#gen::SchemaSettings};
use serde_json::{self, Value};

/// Generate a JSON Schema for the given `T` **inline**, i.e. without
/// `$ref` pointers to external definitions.
///
/// ```
/// use pollen_core::schema_util::derive_response_schema;
/// use schemars::JsonSchema;
///
/// #[derive(JsonSchema)]
/// struct Foo { bar: String }
///
/// let schema = derive_response_schema::<Foo>();
/// assert_eq!(schema["properties"]["bar"]["type"], "string");
/// ```
pub fn derive_response_schema<T>() -> Value
where
    T: JsonSchema + 'static,
{
    // Inline everything; several OpenAI-compatible hosts do not resolve `$ref`s.
    let mut settings = SchemaSettings::draft07();
    settings.inline_subschemas = true;

    let generator = SchemaGenerator::new(settings);
    let root = generator.into_root_schema_for::<T>();

    // A `RootSchema` is plain data; converting it to a `Value` cannot fail.
    serde_json::to_value(root).unwrap_or(Value::Null)
}
