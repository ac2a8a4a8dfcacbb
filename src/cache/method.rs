//! Method Codec Module
//!
//! Maps HTTP verb names onto a closed set of method identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

// == Method ==
/// HTTP methods that can take part in caching.
///
/// The discriminants are stable: they appear in cache keys and in the
/// persisted method masks of the service registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Method {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
    Options = 4,
    Head = 5,
    Patch = 6,
}

impl Method {
    /// Every method, in identifier order.
    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Options,
        Method::Head,
        Method::Patch,
    ];

    // == Resolve ==
    /// Resolves a verb name or an already canonical identifier.
    ///
    /// Names are matched case-insensitively. Returns `None` for anything
    /// that is not one of the seven supported verbs.
    pub fn resolve(input: impl Into<MethodSpec>) -> Option<Method> {
        match input.into() {
            MethodSpec::Id(method) => Some(method),
            MethodSpec::Name(name) => Self::from_name(&name),
        }
    }

    /// Parses a verb name, ignoring case.
    pub fn from_name(name: &str) -> Option<Method> {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "PUT" => Some(Method::Put),
            "POST" => Some(Method::Post),
            "DELETE" => Some(Method::Delete),
            "PATCH" => Some(Method::Patch),
            "HEAD" => Some(Method::Head),
            "OPTIONS" => Some(Method::Options),
            _ => None,
        }
    }

    /// Numeric identifier used in keys and masks.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Upper-case verb name.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Head => "HEAD",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Method Spec ==
/// A method as supplied by a caller: either a verb name still to be
/// resolved, or a canonical [`Method`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSpec {
    Name(String),
    Id(Method),
}

impl From<Method> for MethodSpec {
    fn from(method: Method) -> Self {
        MethodSpec::Id(method)
    }
}

impl From<&str> for MethodSpec {
    fn from(name: &str) -> Self {
        MethodSpec::Name(name.to_string())
    }
}

impl From<String> for MethodSpec {
    fn from(name: String) -> Self {
        MethodSpec::Name(name)
    }
}

impl From<&MethodSpec> for MethodSpec {
    fn from(spec: &MethodSpec) -> Self {
        spec.clone()
    }
}

impl fmt::Display for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodSpec::Name(name) => f.write_str(name),
            MethodSpec::Id(method) => method.fmt(f),
        }
    }
}

// == Method Set ==
/// Bitmask of methods, one bit per [`Method`] identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodSet(u8);

impl MethodSet {
    /// A set with no methods.
    pub fn empty() -> Self {
        Self(0)
    }

    /// A set containing every method.
    pub fn all() -> Self {
        Method::ALL.iter().copied().collect()
    }

    pub fn insert(&mut self, method: Method) {
        self.0 |= 1 << method.id();
    }

    pub fn contains(&self, method: Method) -> bool {
        self.0 & (1 << method.id()) != 0
    }

    /// Logical OR of both sets.
    pub fn union(self, other: MethodSet) -> MethodSet {
        MethodSet(self.0 | other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Methods in the set, in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = Method> + '_ {
        Method::ALL.iter().copied().filter(|m| self.contains(*m))
    }
}

impl FromIterator<Method> for MethodSet {
    fn from_iter<I: IntoIterator<Item = Method>>(iter: I) -> Self {
        let mut set = MethodSet::empty();
        for method in iter {
            set.insert(method);
        }
        set
    }
}
