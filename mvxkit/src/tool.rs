//! Tool trait, result envelope and dispatcher.
//!
//! Every operation exposed to callers is a [`Tool`]: a static name, a
//! description, an input schema generated from its argument type and an async
//! handler. Handlers never fail outward; they render their own errors into a
//! [`ToolResponse`] flagged with `isError`.
//!
//! # Wire format
//!
//! Descriptors serialize as `{"name", "description", "inputSchema"}` and
//! results as:
//! ```json
//! { "content": [{ "type": "text", "text": "..." }], "isError": true }
//! ```
//! `isError` is omitted when false.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ToolError;

/// A type alias for `Result<T, ToolError>`.
pub type ToolResult<T> = Result<T, ToolError>;

/// Public description of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name, kebab-case.
    pub name: String,
    /// What the tool does.
    pub description: String,
    /// JSON schema of the arguments object.
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a new tool definition.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// One content block of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
}

/// Uniform result envelope of every tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    /// Content blocks.
    pub content: Vec<ToolContent>,
    /// Whether the call failed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResponse {
    /// Successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Failed result carrying a readable message.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }

    /// Successful result holding pretty-printed JSON.
    #[must_use]
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(text) => Self::text(text),
            Err(e) => Self::error(format!("Failed to render result: {e}")),
        }
    }

    /// Concatenated text of all blocks.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|ToolContent::Text { text }| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<ToolError> for ToolResponse {
    fn from(err: ToolError) -> Self {
        Self::error(err.to_string())
    }
}

/// JSON schema of `T` without the `$schema` meta field.
#[must_use]
pub fn input_schema<T: JsonSchema>() -> Value {
    let root = schemars::schema_for!(T);
    let mut schema = serde_json::to_value(&root).unwrap_or_default();
    if let Value::Object(ref mut map) = schema {
        map.remove("$schema");
    }
    schema
}

/// A typed tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Static name of the tool.
    const NAME: &'static str;

    /// Arguments type for the tool.
    type Args: DeserializeOwned + JsonSchema + Send;

    /// Get the name of the tool.
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Get the description of the tool.
    fn description(&self) -> String;

    /// Get the JSON schema for the tool's arguments.
    fn parameters_schema(&self) -> Value {
        input_schema::<Self::Args>()
    }

    /// Run the tool. Domain failures are returned as error envelopes.
    async fn call(&self, args: Self::Args) -> ToolResponse;

    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters_schema())
    }

    /// Call the tool with JSON arguments.
    ///
    /// Accepts an object, a JSON-encoded string, or `null` for "no
    /// arguments".
    async fn call_json(&self, args: Value) -> ToolResult<ToolResponse> {
        let typed_args: Self::Args = match args {
            Value::String(s) => serde_json::from_str(&s).map_err(|e| ToolError::InvalidArguments(e.to_string()))?,
            Value::Null => serde_json::from_value(Value::Object(serde_json::Map::new()))
                .map_err(|e| ToolError::InvalidArguments(e.to_string()))?,
            other => serde_json::from_value(other).map_err(|e| ToolError::InvalidArguments(e.to_string()))?,
        };
        Ok(self.call(typed_args).await)
    }
}

/// A boxed dynamic tool that can be used in collections.
pub type BoxedTool = Box<dyn DynTool>;

/// Object-safe version of the Tool trait for dynamic dispatch.
#[async_trait]
pub trait DynTool: Send + Sync {
    /// Get the name of the tool.
    fn name(&self) -> &str;

    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Call the tool with JSON arguments.
    async fn call_json(&self, args: Value) -> ToolResult<ToolResponse>;
}

#[async_trait]
impl<T: Tool + 'static> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn definition(&self) -> ToolDefinition {
        Tool::definition(self)
    }

    async fn call_json(&self, args: Value) -> ToolResult<ToolResponse> {
        Tool::call_json(self, args).await
    }
}

/// Flat name to tool lookup.
#[derive(Default)]
pub struct ToolBox {
    tools: BTreeMap<String, BoxedTool>,
}

impl ToolBox {
    /// Create a new empty toolbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool to the toolbox, replacing any tool of the same name.
    pub fn add<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(Tool::name(&tool).to_owned(), Box::new(tool));
    }

    /// Add a boxed tool to the toolbox.
    pub fn add_boxed(&mut self, tool: BoxedTool) {
        self.tools.insert(tool.name().to_owned(), tool);
    }

    /// Get a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoxedTool> {
        self.tools.get(name)
    }

    /// All tool definitions, sorted by name.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Tool names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Check if the toolbox contains a tool with the given name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get the number of tools in the toolbox.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the toolbox is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Call a tool by name.
    ///
    /// Argument errors come back as error envelopes.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NotFound`] for an unknown name.
    pub async fn call(&self, name: &str, args: Value) -> ToolResult<ToolResponse> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::not_found(name))?;
        debug!(tool = name, "calling tool");
        match tool.call_json(args).await {
            Ok(response) => {
                if response.is_error {
                    debug!(tool = name, "tool reported an error");
                }
                Ok(response)
            }
            Err(e) => {
                warn!(tool = name, error = %e, "tool rejected arguments");
                Ok(ToolResponse::from(e))
            }
        }
    }
}

impl fmt::Debug for ToolBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolBox")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct EchoArgs {
        /// Text to echo.
        text: String,
        #[serde(default)]
        fail: bool,
    }

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        const NAME: &'static str = "echo";
        type Args = EchoArgs;

        fn description(&self) -> String {
            "Echo the input".to_owned()
        }

        async fn call(&self, args: EchoArgs) -> ToolResponse {
            if args.fail {
                ToolResponse::error(format!("Failed to echo: {}", args.text))
            } else {
                ToolResponse::text(args.text)
            }
        }
    }

    fn toolbox() -> ToolBox {
        let mut tools = ToolBox::new();
        tools.add(Echo);
        tools
    }

    mod envelope {
        use super::*;

        #[test]
        fn success_omits_is_error() {
            let value = serde_json::to_value(ToolResponse::text("hi")).unwrap();
            assert_eq!(value, json!({ "content": [{ "type": "text", "text": "hi" }] }));
        }

        #[test]
        fn error_sets_flag() {
            let value = serde_json::to_value(ToolResponse::error("boom")).unwrap();
            assert_eq!(value["isError"], true);
            assert_eq!(value["content"][0]["text"], "boom");
        }

        #[test]
        fn json_is_pretty() {
            let response = ToolResponse::json(&json!({ "a": 1 }));
            assert_eq!(response.text_content(), "{\n  \"a\": 1\n}");
        }
    }

    mod definition {
        use super::*;

        #[test]
        fn schema_comes_from_args() {
            let def = Tool::definition(&Echo);
            assert_eq!(def.name, "echo");
            assert_eq!(def.input_schema["type"], "object");
            assert!(def.input_schema["properties"].get("text").is_some());
            assert!(def.input_schema.get("$schema").is_none());
            let required = def.input_schema["required"].as_array().unwrap();
            assert_eq!(required, &vec![json!("text")]);
        }

        #[test]
        fn serializes_camel_case() {
            let value = serde_json::to_value(Tool::definition(&Echo)).unwrap();
            assert!(value.get("inputSchema").is_some());
        }
    }

    mod dispatch {
        use super::*;

        #[tokio::test]
        async fn routes_by_name() {
            let response = toolbox().call("echo", json!({ "text": "hello" })).await.unwrap();
            assert!(!response.is_error);
            assert_eq!(response.text_content(), "hello");
        }

        #[tokio::test]
        async fn accepts_string_arguments() {
            let response = toolbox().call("echo", json!(r#"{"text":"s"}"#)).await.unwrap();
            assert_eq!(response.text_content(), "s");
        }

        #[tokio::test]
        async fn unknown_tool_is_hard_error() {
            let err = toolbox().call("nope", json!({})).await.unwrap_err();
            assert!(matches!(err, ToolError::NotFound(_)));
            assert_eq!(err.to_string(), "Unknown tool: nope");
        }

        #[tokio::test]
        async fn bad_arguments_become_error_envelope() {
            let response = toolbox().call("echo", json!({ "txt": 1 })).await.unwrap();
            assert!(response.is_error);
            assert!(response.text_content().starts_with("Invalid arguments:"));
        }

        #[tokio::test]
        async fn domain_errors_stay_in_envelope() {
            let response = toolbox()
                .call("echo", json!({ "text": "x", "fail": true }))
                .await
                .unwrap();
            assert!(response.is_error);
            assert_eq!(response.text_content(), "Failed to echo: x");
        }

        #[test]
        fn names_are_sorted() {
            let mut tools = toolbox();
            struct Zed;
            #[async_trait]
            impl Tool for Zed {
                const NAME: &'static str = "a-first";
                type Args = EchoArgs;
                fn description(&self) -> String {
                    String::new()
                }
                async fn call(&self, args: EchoArgs) -> ToolResponse {
                    ToolResponse::text(args.text)
                }
            }
            tools.add(Zed);
            assert_eq!(tools.names(), vec!["a-first", "echo"]);
            assert_eq!(tools.len(), 2);
        }
    }
}
