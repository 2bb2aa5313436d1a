use docargs_core::{
    CanonicalType, Cardinality, FunctionDeclaration, FunctionEntry, Manifest, MergeError,
    ParameterDeclaration, ParameterKind, TypeShape, ValidationError,
};
use docargs_extract::{DescribeError, build_manifest, describe_function};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SAMPLE_DOC: &str = "This is a test function

    Parameters
    ----------
    x : int
        First arg
    y : Path
        Second arg
    z : int
        Third arg
    w : list[str]
        Fourth arg.
        Multiline documentation
    k : str, choices=(\"choice1\", \"choice2\")
        Fifth arg
    ll : list[int]
        This is an empty list
    flg : bool
        Set to True to do something
    lb : list[bool]
        A list of boolean values

    Examples
    --------
    >>> sample()
    ";

fn ty(text: &str) -> TypeShape {
    text.parse().expect("annotation should parse")
}

fn sample_declaration() -> FunctionDeclaration {
    FunctionDeclaration::new("sample")
        .with_doc(SAMPLE_DOC)
        .with_param(ParameterDeclaration::required("x", ty("int")))
        .with_param(ParameterDeclaration::required("y", ty("Path")))
        .with_param(ParameterDeclaration::optional("z", ty("int"), json!(54)))
        .with_param(ParameterDeclaration::optional("w", ty("list[str]"), json!(["hey", "ho"])))
        .with_param(ParameterDeclaration::optional("k", ty("str"), json!("choice1")))
        .with_param(ParameterDeclaration::optional("ll", ty("list[int]"), json!(null)))
        .with_param(ParameterDeclaration::optional("flg", ty("bool"), json!(false)))
        .with_param(ParameterDeclaration::optional("lb", ty("list[bool]"), json!(true)))
        .with_param(ParameterDeclaration::optional("_internal", ty("int"), json!(0)))
        .with_param(ParameterDeclaration::variadic("kwargs", ParameterKind::VarKeyword))
}

// ---------------------------------------------------------------------------
// Descriptor extraction
// ---------------------------------------------------------------------------

#[test]
fn test_sample_function_descriptor() {
    let descriptor = describe_function(&sample_declaration()).unwrap();

    assert_eq!(descriptor.name, "This");
    assert_eq!(descriptor.callable, "sample");
    assert_eq!(descriptor.description, "");
    assert_eq!(
        descriptor.param_names(),
        vec!["x", "y", "z", "w", "k", "ll", "flg", "lb"]
    );

    let x = descriptor.find_param("x").unwrap();
    assert!(x.mandatory);
    assert_eq!(x.value_type, CanonicalType::Int);
    assert_eq!(x.flag, "--x");
    assert_eq!(x.description, "First arg");

    let w = descriptor.find_param("w").unwrap();
    assert_eq!(w.nargs, Cardinality::Multiple);
    assert_eq!(w.description, "Fourth arg. Multiline documentation");
    assert_eq!(w.value, Some(json!(["hey", "ho"])));

    let k = descriptor.find_param("k").unwrap();
    assert_eq!(k.choices, Some(vec![json!("choice1"), json!("choice2")]));

    let ll = descriptor.find_param("ll").unwrap();
    assert!(!ll.mandatory);
    assert_eq!(ll.value, None);

    let lb = descriptor.find_param("lb").unwrap();
    assert_eq!(lb.value_type, CanonicalType::Bool);
    assert_eq!(lb.nargs, Cardinality::Multiple);
}

#[test]
fn test_missing_documentation() {
    let decl = FunctionDeclaration::new("bare")
        .with_param(ParameterDeclaration::required("x", ty("int")));
    assert_eq!(
        describe_function(&decl),
        Err(DescribeError::MissingDocumentation {
            function: "bare".to_string()
        })
    );
}

#[test]
fn test_order_mismatch_is_reported() {
    let decl = FunctionDeclaration::new("swap")
        .with_doc("swap\nParameters\nb : int\n    B\na : int\n    A\n")
        .with_param(ParameterDeclaration::required("a", ty("int")))
        .with_param(ParameterDeclaration::required("b", ty("int")));

    assert_eq!(
        describe_function(&decl),
        Err(DescribeError::Validation(ValidationError::OrderMismatch {
            signature: "a".to_string(),
            documented: "b".to_string(),
        }))
    );
}

#[test]
fn test_documenting_excluded_parameter_is_an_error() {
    let decl = FunctionDeclaration::new("f")
        .with_doc("f\nParameters\n_secret : int\n    hidden\n")
        .with_param(ParameterDeclaration::optional("_secret", ty("int"), json!(1)));

    assert_eq!(
        describe_function(&decl),
        Err(DescribeError::Validation(
            ValidationError::UnknownDocumentedParameter("_secret".to_string())
        ))
    );
}

#[test]
fn test_empty_tuple_default_is_rejected() {
    let decl = FunctionDeclaration::new("f")
        .with_doc("f\nParameters\nitems : tuple[int, ...]\n    values\n")
        .with_param(ParameterDeclaration::optional("items", ty("tuple[int, ...]"), json!([])));

    assert_eq!(
        describe_function(&decl),
        Err(DescribeError::EmptySequenceDefault {
            param: "items".to_string()
        })
    );
}

#[test]
fn test_blank_first_line_falls_back_to_identifier() {
    let decl = FunctionDeclaration::new("fallback").with_doc("\n    Does things.\n");
    let descriptor = describe_function(&decl).unwrap();
    assert_eq!(descriptor.name, "fallback");
    assert_eq!(descriptor.description, "Does things.");
}

#[test]
fn test_declaration_file_shape_deserializes() {
    let decl: FunctionDeclaration = serde_json::from_value(json!({
        "name": "resize",
        "doc": "resize\nParameters\nscale : float\n    Factor\nout : Path\n    Target\n",
        "parameters": [
            {"name": "scale", "type": "float", "default": 0.5},
            {"name": "out", "type": "pathlib.Path | None", "default": null},
            {"name": "rest", "kind": "var_positional"}
        ]
    }))
    .unwrap();

    let descriptor = describe_function(&decl).unwrap();
    assert_eq!(descriptor.params[1].value_type, CanonicalType::Path);
    assert!(!descriptor.params[1].mandatory);
}

// ---------------------------------------------------------------------------
// Manifest building
// ---------------------------------------------------------------------------

#[test]
fn test_build_legacy_manifest() {
    let manifest = build_manifest(&[sample_declaration()], Manifest::new()).unwrap();
    assert_eq!(manifest.name.as_deref(), Some("This"));
    assert_eq!(manifest.version.as_deref(), Some("1"));
    assert_eq!(manifest.params.as_ref().map(Vec::len), Some(8));

    let serialized = serde_json::to_value(&manifest).unwrap();
    assert_eq!(serialized["params"][0]["tag"], "--x");
    assert_eq!(serialized["params"][0]["nargs"], json!(null));
    assert_eq!(serialized["params"][3]["nargs"], "+");
}

#[test]
fn test_build_multi_command_manifest_requires_entry() {
    let mut base = Manifest::new();
    base.functions = Some(vec![FunctionEntry::new("pkg.other")]);

    assert_eq!(
        build_manifest(&[sample_declaration()], base),
        Err(DescribeError::Merge(MergeError::FunctionNotFound(
            "sample".to_string()
        )))
    );
}
