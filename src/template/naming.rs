//! Naming context and identifier case conversion.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CodegenError, CodegenResult};

static MODULE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*(::[a-z_][a-z0-9_]*)*$").unwrap());
static MODULE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").unwrap());

/// Names the generated code uses to reach the runtime and its sibling modules.
///
/// The module names double as the directory names under the destination root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingContext {
    /// Path of the downstream runtime crate.
    pub runtime_crate: String,
    pub models_module: String,
    pub logic_module: String,
    pub graphql_module: String,
    /// Tool name mentioned in the generated file headers.
    pub generator: String,
}

impl Default for NamingContext {
    fn default() -> Self {
        Self {
            runtime_crate: "graph_runtime".to_string(),
            models_module: "models".to_string(),
            logic_module: "logic".to_string(),
            graphql_module: "graphql".to_string(),
            generator: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

impl NamingContext {
    pub fn validate(&self) -> CodegenResult<()> {
        if !MODULE_PATH.is_match(&self.runtime_crate) {
            return Err(CodegenError::config(format!(
                "runtime crate path '{}' is not a valid module path",
                self.runtime_crate
            )));
        }
        for (label, module) in [
            ("models", &self.models_module),
            ("logic", &self.logic_module),
            ("graphql", &self.graphql_module),
        ] {
            if !MODULE_NAME.is_match(module) {
                return Err(CodegenError::config(format!(
                    "{label} module name '{module}' is not a valid module name"
                )));
            }
        }
        let mut modules = vec![&self.models_module, &self.logic_module, &self.graphql_module];
        modules.sort();
        modules.dedup();
        if modules.len() != 3 {
            return Err(CodegenError::config(
                "models, logic and graphql module names must differ",
            ));
        }
        Ok(())
    }
}

/// `FriendsWith`, `FRIENDS_WITH` and `friendsWith` all become `friends_with`.
pub fn snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// `created_at` becomes `createdAt`.
pub fn lower_camel_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let mut upper_next = false;
    for c in ident.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("FriendsWith"), "friends_with");
        assert_eq!(snake_case("FRIENDS_WITH"), "friends_with");
        assert_eq!(snake_case("friendOf"), "friend_of");
        assert_eq!(snake_case("HTTPRequest"), "http_request");
        assert_eq!(snake_case("User"), "user");
    }

    #[test]
    fn test_lower_camel_case() {
        assert_eq!(lower_camel_case("created_at"), "createdAt");
        assert_eq!(lower_camel_case("email"), "email");
    }

    #[test]
    fn test_validate_rejects_clashing_modules() {
        let naming = NamingContext {
            logic_module: "models".to_string(),
            ..NamingContext::default()
        };
        assert!(naming.validate().is_err());
        assert!(NamingContext::default().validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_nested_runtime_path() {
        let naming = NamingContext {
            runtime_crate: "crate::runtime".to_string(),
            ..NamingContext::default()
        };
        assert!(naming.validate().is_ok());
    }
}
