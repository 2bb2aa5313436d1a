//! Documentation and parameter validation.
//!
//! [`validate_documentation`] cross-checks the parameter names retained from
//! a signature against the names documented in its doc comment, so generated
//! help can never drift from the code. [`validate_parameters`] checks the
//! structural invariants of a parameter list before it is compiled.
//!
//! # Examples
//!
//! ```
//! use docargs_core::*;
//!
//! assert!(validate_documentation(&["x", "y"], &["x", "y"]).is_ok());
//!
//! let err = validate_documentation(&["x", "y"], &["y", "x"]).unwrap_err();
//! assert!(matches!(err, ValidationError::OrderMismatch { .. }));
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::ParameterSpec;

/// Documentation and parameter validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A signature parameter has no entry in the doc comment.
    #[error("parameter '{0}' is missing from the documentation; please document it")]
    UndocumentedParameter(String),
    /// The doc comment documents a parameter the signature does not have.
    #[error("documented parameter '{0}' is not in the signature; please remove it")]
    UnknownDocumentedParameter(String),
    /// Signature and documentation list the parameters in different orders.
    #[error("parameter order differs between signature and documentation: {signature} != {documented}")]
    OrderMismatch {
        /// Name found in the signature at the first differing position.
        signature: String,
        /// Name found in the documentation at that position.
        documented: String,
    },
    /// A parameter name is empty.
    #[error("parameter name cannot be empty")]
    EmptyParameterName,
    /// Two parameters share a name.
    #[error("duplicate parameter: {0}")]
    DuplicateParameter(String),
    /// Two parameters share a long option string.
    #[error("duplicate flag: {0}")]
    DuplicateFlag(String),
    /// A long option string does not start with `--`.
    #[error("invalid flag format: {0}")]
    InvalidFlag(String),
    /// A parameter name collides with a built-in option.
    #[error("parameter name '{0}' is reserved")]
    ReservedParameter(String),
    /// A mandatory parameter carries a default value.
    #[error("mandatory parameter '{0}' cannot have a default value")]
    MandatoryWithDefault(String),
}

/// Cross-checks signature parameter names against documented names.
///
/// Checks run in order and the first failure is returned:
///
/// 1. every signature name is documented;
/// 2. every documented name is in the signature;
/// 3. both lists have the same order.
///
/// # Examples
///
/// ```
/// use docargs_core::{ValidationError, validate_documentation};
///
/// assert_eq!(
///     validate_documentation(&["x", "y"], &["x"]),
///     Err(ValidationError::UndocumentedParameter("y".into()))
/// );
/// assert_eq!(
///     validate_documentation(&["x"], &["x", "z"]),
///     Err(ValidationError::UnknownDocumentedParameter("z".into()))
/// );
/// ```
pub fn validate_documentation(
    signature: &[&str],
    documented: &[&str],
) -> Result<(), ValidationError> {
    if let Some(missing) = signature.iter().find(|name| !documented.contains(*name)) {
        return Err(ValidationError::UndocumentedParameter(missing.to_string()));
    }

    if let Some(extra) = documented.iter().find(|name| !signature.contains(*name)) {
        return Err(ValidationError::UnknownDocumentedParameter(extra.to_string()));
    }

    for (sig, doc) in signature.iter().zip(documented) {
        if sig != doc {
            return Err(ValidationError::OrderMismatch {
                signature: sig.to_string(),
                documented: doc.to_string(),
            });
        }
    }

    Ok(())
}

/// Validates a parameter list before compilation.
///
/// `reserved` lists names that collide with built-in options of the target
/// parser; `help` is always reserved.
///
/// # Examples
///
/// ```
/// use docargs_core::*;
///
/// let params = vec![
///     ParameterSpec::new("x", CanonicalType::Int),
///     ParameterSpec::new("x", CanonicalType::Str),
/// ];
/// let errors = validate_parameters(&params, &[]);
/// assert_eq!(errors, vec![ValidationError::DuplicateParameter("x".into())]);
/// ```
pub fn validate_parameters(params: &[ParameterSpec], reserved: &[&str]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen_names = HashSet::new();
    let mut seen_flags = HashSet::new();

    for param in params {
        let name = param.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyParameterName);
            return errors;
        }

        if name == crate::AbbreviationTable::HELP || reserved.contains(&name) {
            errors.push(ValidationError::ReservedParameter(name.to_string()));
            return errors;
        }

        if !seen_names.insert(name) {
            errors.push(ValidationError::DuplicateParameter(name.to_string()));
            return errors;
        }

        if !param.flag.starts_with("--") || param.flag.len() < 3 {
            errors.push(ValidationError::InvalidFlag(param.flag.clone()));
            return errors;
        }

        if !seen_flags.insert(param.flag.as_str()) {
            errors.push(ValidationError::DuplicateFlag(param.flag.clone()));
            return errors;
        }

        if param.mandatory && param.value.is_some() {
            errors.push(ValidationError::MandatoryWithDefault(name.to_string()));
            return errors;
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::CanonicalType;

    use super::*;

    #[test]
    fn test_validate_documentation_accepts_matching_lists() {
        assert_eq!(validate_documentation(&[], &[]), Ok(()));
        assert_eq!(validate_documentation(&["a", "b", "c"], &["a", "b", "c"]), Ok(()));
    }

    #[test]
    fn test_undocumented_parameter_is_checked_first() {
        // Both an undocumented and an unknown name: the undocumented one wins.
        assert_eq!(
            validate_documentation(&["x", "y"], &["x", "q"]),
            Err(ValidationError::UndocumentedParameter("y".to_string()))
        );
    }

    #[test]
    fn test_order_mismatch_reports_first_difference() {
        assert_eq!(
            validate_documentation(&["x", "y", "z"], &["x", "z", "y"]),
            Err(ValidationError::OrderMismatch {
                signature: "y".to_string(),
                documented: "z".to_string(),
            })
        );
    }

    #[test]
    fn test_validate_parameters_rejects_reserved_names() {
        let params = vec![ParameterSpec::new("help", CanonicalType::Str)];
        assert_eq!(
            validate_parameters(&params, &[]),
            vec![ValidationError::ReservedParameter("help".to_string())]
        );

        let params = vec![ParameterSpec::new("conf", CanonicalType::Str)];
        assert_eq!(
            validate_parameters(&params, &["conf"]),
            vec![ValidationError::ReservedParameter("conf".to_string())]
        );
    }

    #[test]
    fn test_validate_parameters_rejects_colliding_flags() {
        let params = vec![
            ParameterSpec::new("out_dir", CanonicalType::Path),
            ParameterSpec::new("out-dir", CanonicalType::Path),
        ];
        assert_eq!(
            validate_parameters(&params, &[]),
            vec![ValidationError::DuplicateFlag("--out-dir".to_string())]
        );
    }

    #[test]
    fn test_validate_parameters_rejects_mandatory_default() {
        let mut param = ParameterSpec::new("z", CanonicalType::Int);
        param.value = Some(json!(54));
        assert_eq!(
            validate_parameters(&[param], &[]),
            vec![ValidationError::MandatoryWithDefault("z".to_string())]
        );
    }

    #[test]
    fn test_validate_parameters_accepts_valid_list() {
        let params = vec![
            ParameterSpec::new("x", CanonicalType::Int),
            ParameterSpec::new("z", CanonicalType::Int).with_default(json!(54)),
        ];
        assert!(validate_parameters(&params, &[]).is_empty());
    }
}
