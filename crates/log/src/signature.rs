use crate::{CallLogError, CallLogResult};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Printed in the positional tuple of the `Input` line.
    Positional,
    /// Printed in the name/value map of the `Input` line.
    Named,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: Cow<'static, str>,
    pub kind: ParameterKind,
    /// Source text of the default value, if the parameter has one.
    pub default: Option<String>,
}

/// What the logger knows about a wrapped callable: its name, its parameters
/// in declaration order and their default values.
///
/// Built once when the callable is wrapped and checked by
/// [`Signature::validate`] before any call is logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    name: Cow<'static, str>,
    params: Vec<Parameter>,
    /// Defaults given for names that are not declared, kept so validation
    /// can report them.
    dangling_defaults: Vec<String>,
}

impl Signature {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Signature {
            name: name.into(),
            params: vec![],
            dangling_defaults: vec![],
        }
    }

    pub fn param(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.push(name.into(), ParameterKind::Positional)
    }

    pub fn named(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.push(name.into(), ParameterKind::Named)
    }

    pub fn params<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        names.into_iter().fold(self, |sig, name| sig.param(name))
    }

    /// Records `value`, printed with `Debug`, as the default of `param`.
    pub fn default_value(self, param: &str, value: impl Debug) -> Self {
        self.default_text(param, format!("{:?}", value))
    }

    /// Records the source text of the default of `param`.
    pub fn default_text(mut self, param: &str, text: impl Into<String>) -> Self {
        match self.params.iter_mut().find(|p| p.name == param) {
            Some(p) => p.default = Some(text.into()),
            None => self.dangling_defaults.push(param.to_string()),
        }
        self
    }

    fn push(mut self, name: Cow<'static, str>, kind: ParameterKind) -> Self {
        self.params.push(Parameter {
            name,
            kind,
            default: None,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.params
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_ref()).collect()
    }

    /// Defaults in declaration order.
    pub fn defaults(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter_map(|p| p.default.as_deref())
            .collect()
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn validate(&self) -> CallLogResult<()> {
        let fn_name = self.name.trim();
        if fn_name.is_empty() {
            return Err(CallLogError::EmptyName);
        }

        let mut seen = HashSet::new();
        for p in &self.params {
            if p.name.is_empty() || p.name.chars().any(|c| c.is_whitespace()) {
                return Err(CallLogError::InvalidParameter(
                    p.name.to_string(),
                    fn_name.to_string(),
                ));
            }
            if !seen.insert(p.name.as_ref()) {
                return Err(CallLogError::DuplicateParameter(
                    p.name.to_string(),
                    fn_name.to_string(),
                ));
            }
        }

        if let Some(param) = self.dangling_defaults.first() {
            return Err(CallLogError::UnknownParameter(
                param.clone(),
                fn_name.to_string(),
            ));
        }

        // defaults belong to the trailing parameters
        if let Some(first) = self.params.iter().position(|p| p.default.is_some()) {
            if let Some(p) = self.params[first..].iter().find(|p| p.default.is_none()) {
                return Err(CallLogError::NonTrailingDefault(
                    p.name.to_string(),
                    fn_name.to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_signature() {
        let sig = Signature::new("scale")
            .params(["data", "factor"])
            .named("clip")
            .default_value("clip", false);
        sig.validate().unwrap();
        assert_eq!("scale", sig.name());
        assert_eq!(vec!["data", "factor", "clip"], sig.param_names());
        assert_eq!(vec!["false"], sig.defaults());
        assert_eq!(ParameterKind::Named, sig.parameters()[2].kind);
        assert_eq!(3, sig.arity());
    }

    #[test]
    fn test_empty_name() {
        let err = Signature::new("  ").param("a").validate().unwrap_err();
        assert!(matches!(err, CallLogError::EmptyName));
    }

    #[test]
    fn test_invalid_parameter() {
        let err = Signature::new("f").param("a b").validate().unwrap_err();
        assert_eq!(
            "invalid parameter name \"a b\" in the signature of f",
            err.to_string()
        );
    }

    #[test]
    fn test_duplicate_parameter() {
        let err = Signature::new("f").params(["a", "a"]).validate().unwrap_err();
        assert!(matches!(err, CallLogError::DuplicateParameter(p, _) if p == "a"));
    }

    #[test]
    fn test_default_for_unknown_parameter() {
        let err = Signature::new("f")
            .param("a")
            .default_value("b", 1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, CallLogError::UnknownParameter(p, _) if p == "b"));
    }

    #[test]
    fn test_defaults_must_be_trailing() {
        let err = Signature::new("f")
            .params(["a", "b"])
            .default_value("a", 1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, CallLogError::NonTrailingDefault(p, _) if p == "b"));

        Signature::new("f")
            .params(["a", "b"])
            .default_value("b", 1)
            .validate()
            .unwrap();
    }
}
