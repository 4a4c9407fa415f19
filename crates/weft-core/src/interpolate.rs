//! `$$name$$` template interpolation.

use std::collections::HashMap;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::{Captures, Regex};

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$([^$]+)\$\$").expect("token pattern is valid"));

/// Variables available to `$$name$$` tokens.
///
/// Scalar variables are substituted in place. List variables only apply to a
/// value that consists of a single token, which then expands into every
/// element of the list. Tokens naming an unknown variable are left as is.
///
/// Later insertions overwrite earlier ones, so callers add defaults first:
///
/// ```rust
/// use weft_core::Variables;
///
/// let vars = Variables::new()
///     .with_value("queue", "default")
///     .with_value("queue", "etl");
///
/// assert_eq!(vars.interpolate("-Dqueue=$$queue$$ $$other$$"), "-Dqueue=etl $$other$$");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Variables {
    scalars: HashMap<String, String>,
    lists: HashMap<String, Vec<String>>,
}

impl Variables {
    /// Creates an empty variable set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scalar variable.
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.scalars.insert(name.into(), value.into());
        self
    }

    /// Adds every entry of `values` as a scalar variable.
    pub fn with_values(mut self, values: &IndexMap<String, String>) -> Self {
        self.scalars
            .extend(values.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Adds every entry of `lists` as a list variable.
    pub fn with_lists(mut self, lists: &IndexMap<String, Vec<String>>) -> Self {
        self.lists
            .extend(lists.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Substitutes scalar variables in a single string.
    pub fn interpolate(&self, template: &str) -> String {
        TOKEN
            .replace_all(template, |caps: &Captures<'_>| {
                match self.scalars.get(&caps[1]) {
                    Some(value) => value.clone(),
                    None => caps[0].to_owned(),
                }
            })
            .into_owned()
    }

    /// Interpolates a list of values, expanding single-token list references.
    pub fn interpolate_list(&self, values: &[String]) -> Vec<String> {
        let mut result = Vec::with_capacity(values.len());
        for value in values {
            match self.list_reference(value).and_then(|name| self.lists.get(name)) {
                Some(list) => result.extend(list.iter().cloned()),
                None => result.push(self.interpolate(value)),
            }
        }
        result
    }

    /// Interpolates every value of an argument map, keeping key order.
    pub fn interpolate_args(
        &self,
        args: &IndexMap<String, Vec<String>>,
    ) -> IndexMap<String, Vec<String>> {
        args.iter()
            .map(|(key, values)| (key.clone(), self.interpolate_list(values)))
            .collect()
    }

    /// Returns the list variable `value` expands into, if any.
    ///
    /// Only a value made of exactly one token naming a known list variable
    /// expands.
    pub fn list_reference<'v>(&self, value: &'v str) -> Option<&'v str> {
        let caps = TOKEN.captures(value)?;
        let whole = caps.get(0)?;
        if whole.start() != 0 || whole.end() != value.len() {
            return None;
        }
        let name = caps.get(1)?.as_str();
        self.lists.contains_key(name).then_some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> Variables {
        Variables::new().with_value("key", "value")
    }

    #[test]
    fn test_single_string_interpolation() {
        assert_eq!(vars().interpolate("hello $$key$$"), "hello value");
    }

    #[test]
    fn test_unknown_variable_is_left_literal() {
        assert_eq!(vars().interpolate("$$missing$$ $$key$$"), "$$missing$$ value");
        assert_eq!(vars().interpolate("no tokens"), "no tokens");
    }

    #[test]
    fn test_later_values_override() {
        let mut defaults = IndexMap::new();
        defaults.insert("key".to_owned(), "default".to_owned());
        defaults.insert("other".to_owned(), "kept".to_owned());

        let vars = Variables::new().with_values(&defaults).with_value("key", "named");
        assert_eq!(vars.interpolate("$$key$$/$$other$$"), "named/kept");
    }

    #[test]
    fn test_argument_interpolation() {
        let mut args = IndexMap::new();
        args.insert(
            "one".to_owned(),
            vec!["$$key$$".to_owned(), "three".to_owned()],
        );

        let result = vars().interpolate_args(&args);
        assert_eq!(result["one"], ["value", "three"]);
    }

    #[test]
    fn test_list_expansion() {
        let mut lists = IndexMap::new();
        lists.insert("files".to_owned(), vec!["a.txt".to_owned(), "b.txt".to_owned()]);
        let vars = vars().with_lists(&lists);

        let values = vec![
            "$$files$$".to_owned(),
            "x-$$files$$".to_owned(),
            "$$key$$".to_owned(),
        ];
        assert_eq!(
            vars.interpolate_list(&values),
            ["a.txt", "b.txt", "x-$$files$$", "value"]
        );
        assert_eq!(vars.list_reference("$$files$$"), Some("files"));
        assert_eq!(vars.list_reference("$$key$$"), None);
    }
}
