//! Payload attribute trees
//!
//! Methods describe their request payload as an attribute tree. Attributes
//! carry metadata tags; the security validators look for the tags that mark
//! credential carriers (`security:username`, `security:token`, ...).

use serde::Serialize;
use std::collections::BTreeMap;

/// Tag marking the attribute holding a basic auth username
pub const USERNAME_TAG: &str = "security:username";
/// Tag marking the attribute holding a basic auth password
pub const PASSWORD_TAG: &str = "security:password";
/// Tag marking the attribute holding a JWT
pub const TOKEN_TAG: &str = "security:token";
/// Tag marking the attribute holding an OAuth2 access token
pub const ACCESS_TOKEN_TAG: &str = "security:accesstoken";
/// Prefix of the tag marking the attribute holding an API key, followed by the scheme name
pub const API_KEY_TAG_PREFIX: &str = "security:apikey:";

/// Tag marking the API key attribute of the named scheme
pub fn api_key_tag(scheme_name: &str) -> String {
    format!("{API_KEY_TAG_PREFIX}{scheme_name}")
}

/// Data type of an attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeType {
    #[default]
    Empty,
    Boolean,
    Int,
    Int32,
    Int64,
    UInt,
    Float32,
    Float64,
    String,
    Bytes,
    Any,
    Array {
        elem: Box<AttributeExpr>,
    },
    Map {
        key: Box<AttributeExpr>,
        elem: Box<AttributeExpr>,
    },
    Object {
        attributes: Vec<NamedAttribute>,
    },
    UserType {
        name: String,
        attribute: Box<AttributeExpr>,
    },
}

impl AttributeType {
    /// Parse a primitive type name
    pub fn primitive(name: &str) -> Option<Self> {
        let ty = match name {
            "empty" => AttributeType::Empty,
            "boolean" => AttributeType::Boolean,
            "int" => AttributeType::Int,
            "int32" => AttributeType::Int32,
            "int64" => AttributeType::Int64,
            "uint" => AttributeType::UInt,
            "float32" => AttributeType::Float32,
            "float64" => AttributeType::Float64,
            "string" => AttributeType::String,
            "bytes" => AttributeType::Bytes,
            "any" => AttributeType::Any,
            _ => return None,
        };
        Some(ty)
    }
}

/// An attribute: a type plus documentation and metadata tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttributeExpr {
    #[serde(flatten)]
    pub kind: AttributeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, Vec<String>>,
}

/// A field of an object attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedAttribute {
    pub name: String,
    #[serde(flatten)]
    pub attribute: AttributeExpr,
}

impl AttributeExpr {
    pub fn new(kind: AttributeType) -> Self {
        Self {
            kind,
            description: None,
            meta: BTreeMap::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(AttributeType::Empty)
    }

    pub fn string() -> Self {
        Self::new(AttributeType::String)
    }

    pub fn object(attributes: Vec<NamedAttribute>) -> Self {
        Self::new(AttributeType::Object { attributes })
    }

    pub fn user_type(name: impl Into<String>, attribute: AttributeExpr) -> Self {
        Self::new(AttributeType::UserType {
            name: name.into(),
            attribute: Box::new(attribute),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a metadata tag, optionally with values
    pub fn with_meta(mut self, key: impl Into<String>, values: &[&str]) -> Self {
        self.meta
            .entry(key.into())
            .or_default()
            .extend(values.iter().map(|v| v.to_string()));
        self
    }

    /// Fields of the attribute if it is an object, looking through user types
    pub fn as_object(&self) -> Option<&[NamedAttribute]> {
        match &self.kind {
            AttributeType::Object { attributes } => Some(attributes),
            AttributeType::UserType { attribute, .. } => attribute.as_object(),
            _ => None,
        }
    }

    /// First field carrying the given metadata tag
    pub fn tagged_field(&self, tag: &str) -> Option<&NamedAttribute> {
        self.as_object()?
            .iter()
            .find(|field| field.attribute.meta.contains_key(tag))
    }

    /// Whether the attribute is an object with a field carrying the given tag
    pub fn has_tagged_field(&self, tag: &str) -> bool {
        self.tagged_field(tag).is_some()
    }
}

impl NamedAttribute {
    pub fn new(name: impl Into<String>, attribute: AttributeExpr) -> Self {
        Self {
            name: name.into(),
            attribute,
        }
    }

    /// String field holding a basic auth username
    pub fn username(name: impl Into<String>) -> Self {
        Self::new(name, AttributeExpr::string().with_meta(USERNAME_TAG, &[]))
    }

    /// String field holding a basic auth password
    pub fn password(name: impl Into<String>) -> Self {
        Self::new(name, AttributeExpr::string().with_meta(PASSWORD_TAG, &[]))
    }

    /// String field holding the API key of the named scheme
    pub fn api_key(scheme_name: &str, name: impl Into<String>) -> Self {
        Self::new(
            name,
            AttributeExpr::string().with_meta(api_key_tag(scheme_name), &[]),
        )
    }

    /// String field holding a JWT
    pub fn token(name: impl Into<String>) -> Self {
        Self::new(name, AttributeExpr::string().with_meta(TOKEN_TAG, &[]))
    }

    /// String field holding an OAuth2 access token
    pub fn access_token(name: impl Into<String>) -> Self {
        Self::new(name, AttributeExpr::string().with_meta(ACCESS_TOKEN_TAG, &[]))
    }
}
