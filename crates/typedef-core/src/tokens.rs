//! Template path tokens
//!
//! Template names and scripts in a descriptor may point into the product
//! installation with `@@TOKEN@@` placeholders, e.g.
//! `@@WL_HOME@@/common/templates/wls/wls.jar`.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;

lazy_static! {
    static ref TOKEN_REGEX: Regex = Regex::new(r"@@([A-Z][A-Z0-9_]*)@@").unwrap();
}

pub const ORACLE_HOME: &str = "ORACLE_HOME";
pub const WL_HOME: &str = "WL_HOME";
pub const DOMAIN_HOME: &str = "DOMAIN_HOME";
pub const JAVA_HOME: &str = "JAVA_HOME";

/// Values for `@@TOKEN@@` placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenContext {
    values: HashMap<String, String>,
}

impl TokenContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for a product installation: sets `ORACLE_HOME` and the
    /// `WL_HOME` below it.
    pub fn for_oracle_home(oracle_home: &Path) -> Self {
        Self::new()
            .with(ORACLE_HOME, oracle_home.display().to_string())
            .with(WL_HOME, oracle_home.join("wlserver").display().to_string())
    }

    pub fn with(mut self, token: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(token, value);
        self
    }

    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.values.insert(token.into(), value.into());
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    /// Replace every token in `text`.
    ///
    /// Returns the name of the first token without a value on failure.
    pub fn replace(&self, text: &str) -> Result<String, String> {
        if let Some(missing) = tokens_in(text).into_iter().find(|t| !self.values.contains_key(*t)) {
            return Err(missing.to_string());
        }
        let replaced = TOKEN_REGEX.replace_all(text, |caps: &Captures<'_>| {
            self.values.get(&caps[1]).cloned().unwrap_or_default()
        });
        Ok(replaced.into_owned())
    }
}

/// Names of the tokens referenced by `text`, in order of appearance
pub fn tokens_in(text: &str) -> Vec<&str> {
    TOKEN_REGEX
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}
