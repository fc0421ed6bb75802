//! Tool signatures and the schema generator.
//!
//! A tool declares its shape with a [`ToolSignature`]: a name, a doc
//! string, and an ordered list of parameters, each with a [`TypeHint`] and
//! a flag saying whether it has a default. [`ToolSignature::to_definition`]
//! turns that into the [`ToolDefinition`] sent to the model:
//!
//! - the first non-blank doc line is the tool description;
//! - later doc lines of the form `name: description` describe parameters,
//!   and a parameter without such a line is described by its own name;
//! - each hint maps to a JSON type (`string`, `integer`, `number`,
//!   `boolean`, `array`, `object`), an optional hint unwraps to its inner
//!   type, and anything else maps to `string`;
//! - a parameter is required iff it has no default.
//!
//! ```rust
//! use llm_runner::tool::{ToolSignature, TypeHint};
//!
//! let signature = ToolSignature::new("get_weather")
//!     .doc("Look up the current weather.\ncity: The city to look up")
//!     .param("city", TypeHint::String)
//!     .param_with_default("units", TypeHint::optional(TypeHint::String));
//!
//! let def = signature.to_definition().unwrap();
//! assert_eq!(def.description, "Look up the current weather.");
//! assert_eq!(def.parameters.required(), vec!["city"]);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::{Map, Value, json};

use super::error::{SchemaError, ToolError};
use crate::provider::{JsonSchema, ToolDefinition};

/// The declared type of a tool parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeHint {
    /// Text.
    String,
    /// Whole numbers.
    Integer,
    /// Floating-point numbers.
    Float,
    /// `true` / `false`.
    Boolean,
    /// A sequence of values.
    List,
    /// A string-keyed mapping.
    Dict,
    /// The absent value.
    NoneType,
    /// One of several types.
    Union(Vec<TypeHint>),
    /// Any other named type. Maps to `"string"`.
    Named(String),
}

impl TypeHint {
    /// `inner` or absent.
    pub fn optional(inner: TypeHint) -> Self {
        Self::Union(vec![inner, Self::NoneType])
    }

    /// The JSON Schema type name for this hint.
    pub fn json_type(&self) -> &'static str {
        match self {
            Self::String | Self::NoneType | Self::Named(_) => "string",
            Self::Integer => "integer",
            Self::Float => "number",
            Self::Boolean => "boolean",
            Self::List => "array",
            Self::Dict => "object",
            Self::Union(members) => match members.as_slice() {
                [inner, Self::NoneType] | [Self::NoneType, inner] => inner.json_type(),
                _ => "string",
            },
        }
    }
}

/// Rust types with a natural [`TypeHint`].
///
/// Lets signatures be declared from the argument types a tool actually
/// uses: `ToolSignature::new("add").typed_param::<i64>("a")`.
pub trait HasTypeHint {
    /// The hint for `Self`.
    fn type_hint() -> TypeHint;
}

macro_rules! impl_type_hint {
    ($hint:expr => $($ty:ty),+ $(,)?) => {
        $(
            impl HasTypeHint for $ty {
                fn type_hint() -> TypeHint {
                    $hint
                }
            }
        )+
    };
}

impl_type_hint!(TypeHint::String => String, &str, char);
impl_type_hint!(TypeHint::Integer => i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_type_hint!(TypeHint::Float => f32, f64);
impl_type_hint!(TypeHint::Boolean => bool);
impl_type_hint!(TypeHint::Dict => Map<String, Value>);

impl<T> HasTypeHint for Vec<T> {
    fn type_hint() -> TypeHint {
        TypeHint::List
    }
}

impl<V, S> HasTypeHint for HashMap<String, V, S> {
    fn type_hint() -> TypeHint {
        TypeHint::Dict
    }
}

impl<V> HasTypeHint for BTreeMap<String, V> {
    fn type_hint() -> TypeHint {
        TypeHint::Dict
    }
}

impl<T: HasTypeHint> HasTypeHint for Option<T> {
    fn type_hint() -> TypeHint {
        TypeHint::optional(T::type_hint())
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Parameter name, as the model must spell it.
    pub name: String,
    /// Declared type. `None` is a registration error.
    pub hint: Option<TypeHint>,
    /// Whether the tool supplies a default when the argument is omitted.
    pub has_default: bool,
}

/// The declared shape of a tool, used to derive its [`ToolDefinition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSignature {
    name: String,
    doc: Option<String>,
    params: Vec<ParamSpec>,
}

impl ToolSignature {
    /// Starts a signature for a tool called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            params: Vec::new(),
        }
    }

    /// Sets the documentation string.
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Adds a required parameter.
    #[must_use]
    pub fn param(self, name: impl Into<String>, hint: TypeHint) -> Self {
        self.push(name, Some(hint), false)
    }

    /// Adds a parameter that has a default value.
    #[must_use]
    pub fn param_with_default(self, name: impl Into<String>, hint: TypeHint) -> Self {
        self.push(name, Some(hint), true)
    }

    /// Adds a required parameter typed after `T`.
    #[must_use]
    pub fn typed_param<T: HasTypeHint>(self, name: impl Into<String>) -> Self {
        self.param(name, T::type_hint())
    }

    /// Adds a parameter with no declared type.
    ///
    /// Registration of a signature containing one fails with
    /// [`SchemaError::UnresolvedType`].
    #[must_use]
    pub fn untyped_param(self, name: impl Into<String>) -> Self {
        self.push(name, None, false)
    }

    fn push(mut self, name: impl Into<String>, hint: Option<TypeHint>, has_default: bool) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            hint,
            has_default,
        });
        self
    }

    /// The tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared parameters, in declaration order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Checks a call's arguments against the declared parameters.
    ///
    /// An argument naming no declared parameter, or a missing parameter
    /// that has no default, fails the call the way a mismatched keyword
    /// call would. Argument types are not checked here.
    pub fn check_arguments(&self, args: &Map<String, Value>) -> Result<(), ToolError> {
        if let Some(unexpected) = args
            .keys()
            .find(|key| !self.params.iter().any(|p| &p.name == *key))
        {
            return Err(ToolError::new(format!(
                "{}() got an unexpected keyword argument '{unexpected}'",
                self.name
            )));
        }
        if let Some(missing) = self
            .params
            .iter()
            .find(|p| !p.has_default && !args.contains_key(&p.name))
        {
            return Err(ToolError::new(format!(
                "{}() missing required argument '{}'",
                self.name, missing.name
            )));
        }
        Ok(())
    }

    /// Derives the tool's schema descriptor.
    pub fn to_definition(&self) -> Result<ToolDefinition, SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }

        let (description, param_docs) = parse_docstring(self.doc.as_deref());
        let mut seen = HashSet::new();
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.params {
            if !seen.insert(param.name.as_str()) {
                return Err(SchemaError::DuplicateParameter {
                    tool: self.name.clone(),
                    param: param.name.clone(),
                });
            }
            let Some(hint) = &param.hint else {
                return Err(SchemaError::UnresolvedType {
                    tool: self.name.clone(),
                    param: param.name.clone(),
                });
            };
            let description = param_docs
                .get(param.name.as_str())
                .map_or(param.name.as_str(), String::as_str);
            properties.insert(
                param.name.clone(),
                json!({ "type": hint.json_type(), "description": description }),
            );
            if !param.has_default {
                required.push(Value::String(param.name.clone()));
            }
        }

        Ok(ToolDefinition {
            name: self.name.clone(),
            description,
            parameters: JsonSchema::new(json!({
                "type": "object",
                "properties": properties,
                "required": required,
            })),
        })
    }
}

/// Splits a doc string into the tool description and per-parameter
/// descriptions.
///
/// Blank lines are ignored and every line is trimmed. The first line is
/// the description; each later line containing `:` is split at the first
/// colon into a parameter name and its description.
pub fn parse_docstring(doc: Option<&str>) -> (String, HashMap<String, String>) {
    let mut lines = doc
        .unwrap_or_default()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());

    let Some(description) = lines.next() else {
        return (String::new(), HashMap::new());
    };

    let params = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, desc)| (name.trim().to_owned(), desc.trim().to_owned()))
        .collect();

    (description.to_owned(), params)
}
