//! Signature normalization.
//!
//! Reduces each declared parameter to a [`ParameterSpec`]: one canonical
//! element type plus a cardinality, with the help text, choices and hints
//! taken from its documentation entry.

use docargs_core::{CanonicalType, Cardinality, ParameterDeclaration, ParameterSpec, TypeShape};
use serde_json::Value;

use crate::docstring::ParamDoc;
use crate::error::DescribeError;

/// Builds the canonical spec for one retained parameter.
pub(crate) fn resolve_parameter(
    decl: &ParameterDeclaration,
    doc: &ParamDoc,
) -> Result<ParameterSpec, DescribeError> {
    let annotation = decl
        .annotation
        .as_ref()
        .ok_or_else(|| unresolved(&decl.name, "missing type annotation".to_string()))?;

    let (value_type, inferred) = resolve_shape(&decl.name, annotation)?;
    let nargs = doc.nargs.map_or(inferred, Cardinality::Exactly);

    let mut spec = ParameterSpec::new(&decl.name, value_type)
        .with_description(&doc.doc)
        .with_cardinality(nargs);

    match &decl.default {
        Some(Value::Array(items)) if items.is_empty() => {
            return Err(DescribeError::EmptySequenceDefault {
                param: decl.name.clone(),
            });
        }
        Some(default) => spec = spec.with_default(default.clone()),
        None => {}
    }

    if let Some(choices) = &doc.choices {
        spec = spec.with_choices(choices.clone());
    }
    if let Some(gui_options) = &doc.gui_options {
        spec = spec.with_gui_options(gui_options.clone());
    }

    Ok(spec)
}

fn resolve_shape(param: &str, shape: &TypeShape) -> Result<(CanonicalType, Cardinality), DescribeError> {
    let shape = match shape {
        TypeShape::Optional(inner) => inner.as_ref(),
        other => other,
    };

    match shape {
        TypeShape::Named(_) => Ok((element_type(param, shape)?, Cardinality::Scalar)),
        TypeShape::Sequence(element) => Ok((element_type(param, element)?, Cardinality::Multiple)),
        TypeShape::Tuple(items) => match items.split_first() {
            Some((first, rest)) if rest.iter().all(|item| item == first) => {
                Ok((element_type(param, first)?, Cardinality::Multiple))
            }
            Some(_) => Err(unresolved(param, format!("heterogeneous tuple '{shape}'"))),
            None => Err(unresolved(param, "empty tuple type".to_string())),
        },
        TypeShape::Mapping(..) => Ok((CanonicalType::Dict, Cardinality::Scalar)),
        TypeShape::Optional(_) | TypeShape::Union(_) => {
            Err(unresolved(param, format!("ambiguous union '{shape}'")))
        }
    }
}

fn element_type(param: &str, shape: &TypeShape) -> Result<CanonicalType, DescribeError> {
    match shape {
        TypeShape::Named(_) if shape.is_none_type() => {
            Err(unresolved(param, "None is not a parameter type".to_string()))
        }
        TypeShape::Named(name) => Ok(CanonicalType::from_name(name)),
        other => Err(unresolved(param, format!("nested type '{other}'"))),
    }
}

fn unresolved(param: &str, reason: String) -> DescribeError {
    DescribeError::UnresolvedType {
        param: param.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(name: &str) -> ParamDoc {
        ParamDoc {
            name: name.to_string(),
            doc: "help".to_string(),
            ..Default::default()
        }
    }

    fn resolve(annotation: &str, default: Option<Value>) -> Result<ParameterSpec, DescribeError> {
        let decl = ParameterDeclaration {
            default,
            ..ParameterDeclaration::required("p", annotation.parse().unwrap())
        };
        resolve_parameter(&decl, &doc("p"))
    }

    #[test]
    fn test_optional_unwraps_to_inner_type() {
        let spec = resolve("int | None", Some(Value::Null)).unwrap();
        assert_eq!(spec.value_type, CanonicalType::Int);
        assert_eq!(spec.nargs, Cardinality::Scalar);
        assert!(!spec.mandatory);
        assert_eq!(spec.value, None);
    }

    #[test]
    fn test_sequences_become_multiple() {
        let spec = resolve("list[str]", Some(json!(["hey", "ho"]))).unwrap();
        assert_eq!(spec.value_type, CanonicalType::Str);
        assert_eq!(spec.nargs, Cardinality::Multiple);

        let spec = resolve("tuple[float, ...]", None).unwrap();
        assert_eq!(spec.value_type, CanonicalType::Float);
        assert_eq!(spec.nargs, Cardinality::Multiple);

        let spec = resolve("Optional[List[Path]]", Some(Value::Null)).unwrap();
        assert_eq!(spec.value_type, CanonicalType::Path);
        assert_eq!(spec.nargs, Cardinality::Multiple);
    }

    #[test]
    fn test_mapping_becomes_dict() {
        let spec = resolve("dict[str, int]", None).unwrap();
        assert_eq!(spec.value_type, CanonicalType::Dict);
        assert_eq!(spec.nargs, Cardinality::Scalar);
    }

    #[test]
    fn test_unresolvable_shapes() {
        for annotation in ["int | str", "None", "list[list[int]]", "tuple[int, str]"] {
            assert!(
                matches!(resolve(annotation, None), Err(DescribeError::UnresolvedType { .. })),
                "{annotation} should not resolve"
            );
        }
    }

    #[test]
    fn test_missing_annotation() {
        let decl = ParameterDeclaration {
            annotation: None,
            ..ParameterDeclaration::required("p", TypeShape::named("int"))
        };
        assert!(matches!(
            resolve_parameter(&decl, &doc("p")),
            Err(DescribeError::UnresolvedType { ref param, .. }) if param == "p"
        ));
    }

    #[test]
    fn test_doc_nargs_overrides_inferred_cardinality() {
        let decl = ParameterDeclaration::required("p", "list[int]".parse().unwrap());
        let param_doc = ParamDoc {
            nargs: Some(3),
            ..doc("p")
        };
        let spec = resolve_parameter(&decl, &param_doc).unwrap();
        assert_eq!(spec.nargs, Cardinality::Exactly(3));
    }

    #[test]
    fn test_empty_sequence_default_is_rejected() {
        assert_eq!(
            resolve("list[int]", Some(json!([]))),
            Err(DescribeError::EmptySequenceDefault {
                param: "p".to_string()
            })
        );
    }
}
