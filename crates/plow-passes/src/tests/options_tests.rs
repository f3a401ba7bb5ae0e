use crate::options::LoweringOptions;
use crate::pass::NormalizationPass;
use crate::pipeline::Pipeline;

#[test]
fn test_empty_json_gives_defaults() {
    let options = LoweringOptions::from_json_str("{}").unwrap();
    assert_eq!(options, LoweringOptions::default());
    assert!(!options.parallel);
    assert!(options.is_pass_enabled("bridge-methods"));
}

#[test]
fn test_camel_case_keys() {
    let options = LoweringOptions::from_json_str(
        r#"{
            "parallel": true,
            "stopOnErrorDiagnostics": true,
            "verifyIdempotence": true,
            "disabledPasses": ["mangle-call-sites"]
        }"#,
    )
    .unwrap();
    assert!(options.parallel);
    assert!(options.stop_on_error_diagnostics);
    assert!(options.verify_idempotence);
    assert!(!options.is_pass_enabled("mangle-call-sites"));
    assert!(options.is_pass_enabled("bridge-methods"));
}

#[test]
fn test_malformed_json_is_an_error() {
    assert!(LoweringOptions::from_json_str(r#"{ "parallel": "yes" }"#).is_err());
}

#[test]
fn test_default_pipeline_order() {
    let pipeline = Pipeline::with_default_passes(LoweringOptions::default());
    assert_eq!(
        pipeline.pass_names(),
        vec![
            "bridge-methods",
            "abstract-method-stubs",
            "static-initialization",
            "instance-initialization",
            "normalize-null-literals",
            "mangle-call-sites",
        ]
    );
}

#[test]
fn test_disabled_passes_are_left_out() {
    let options = LoweringOptions {
        disabled_passes: vec!["bridge-methods".into(), "normalize-null-literals".into()],
        ..LoweringOptions::default()
    };
    let names = Pipeline::with_default_passes(options).pass_names();
    assert_eq!(names.len(), 4);
    assert!(!names.contains(&"bridge-methods"));
    assert!(!names.contains(&"normalize-null-literals"));
}

#[test]
fn test_pass_names_round_trip() {
    for pass in NormalizationPass::DEFAULT_ORDER {
        assert_eq!(NormalizationPass::from_name(pass.name()), Some(pass));
        assert_eq!(pass.create().name(), pass.name());
    }
    assert_eq!(NormalizationPass::from_name("inline-everything"), None);
}
