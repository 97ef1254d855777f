use rpcdispatch::{
    Codec, CodecError, Coercion, Dispatcher, Fault, MethodDescriptor, MethodTable, ParamFlags,
    ResponseEnvelope, RpcService,
};
use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};

/// Exposes a handful of methods and records every hook and handler firing,
/// so tests can assert on ordering and on paths that must never run.
struct TestService {
    methods: MethodTable,
    log: Arc<Mutex<Vec<String>>>,
    rewrite_to_fault: bool,
}

impl TestService {
    fn new() -> Self {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut methods = MethodTable::new();

        let add_log = log.clone();
        methods.insert(
            "add",
            MethodDescriptor::new(move |args: Vec<Value>| {
                let log = add_log.clone();
                async move {
                    log.lock().unwrap().push("handler:add".into());
                    Ok(json!(
                        args[0].as_i64().unwrap_or(0) + args[1].as_i64().unwrap_or(0)
                    ))
                }
            })
            .param("a", Coercion::Int)
            .param("b", Coercion::Int)
            .returns(Coercion::Int)
            .description("Adds two integers."),
        );

        let greet_log = log.clone();
        methods.insert(
            "greet",
            MethodDescriptor::new(move |args: Vec<Value>| {
                let log = greet_log.clone();
                async move {
                    log.lock().unwrap().push("handler:greet".into());
                    let name = args[0].as_str().unwrap_or("?");
                    let greeting = match args[1].as_str() {
                        Some(title) => format!("Hello, {title} {name}!"),
                        None => format!("Hello, {name}!"),
                    };
                    Ok(Value::String(greeting))
                }
            })
            .param("name", Coercion::String)
            .param("title", ParamFlags::optional(Coercion::String))
            .returns(Coercion::String),
        );

        methods.insert(
            "div",
            MethodDescriptor::new(|args: Vec<Value>| async move {
                let (a, b) = (args[0].as_f64().unwrap_or(0.0), args[1].as_f64().unwrap_or(0.0));
                if b == 0.0 {
                    return Err(Fault::new("Division by zero.", 1));
                }
                Ok(json!(a / b))
            })
            .param("a", Coercion::Float)
            .param("b", Coercion::Float)
            .returns(Coercion::Float),
        );

        methods.insert(
            "boom",
            MethodDescriptor::new(|_args: Vec<Value>| async move { panic!("boom went the handler") }),
        );

        Self {
            methods,
            log,
            rewrite_to_fault: false,
        }
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl RpcService for TestService {
    fn resolve(&self, method: &str) -> Option<&MethodDescriptor> {
        self.methods.resolve(method)
    }

    fn pre_process(&self, cx: &mut rpcdispatch::DispatchContext) {
        self.log.lock().unwrap().push("pre".into());
        cx.response_headers
            .insert("served-by".into(), json!("test-service"));
    }

    fn post_process(&self, outcome: &mut rpcdispatch::HandlerResult) {
        self.log.lock().unwrap().push("post".into());
        if self.rewrite_to_fault {
            *outcome = Err(Fault::new("Rewritten by post-hook.", 2));
        }
    }

    fn fault_callback(&self, fault: &Fault, is_internal: bool) {
        self.log
            .lock()
            .unwrap()
            .push(format!("fault:{}:{is_internal}", fault.code));
    }
}

async fn dispatch_json(service: &TestService, raw: &[u8]) -> Value {
    let bytes = Dispatcher::new().dispatch(service, raw).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test(flavor = "current_thread")]
async fn empty_request_faults() {
    let service = TestService::new();
    let response = dispatch_json(&service, b"").await;

    assert_eq!(response["fault"]["code"], json!(-10001));
    assert_eq!(
        response["fault"]["message"],
        json!("Cannot accept an empty request.")
    );
    assert_eq!(service.log(), vec!["fault:-10001:true"]);
}

#[tokio::test(flavor = "current_thread")]
async fn undecodable_request_faults() {
    let service = TestService::new();
    let response = dispatch_json(&service, b"this is not json").await;

    assert_eq!(response["fault"]["code"], json!(-10002));
    assert_eq!(response["fault"]["message"], json!("Unable to decode request."));
}

#[tokio::test(flavor = "current_thread")]
async fn empty_method_name_faults() {
    let service = TestService::new();
    let response = dispatch_json(&service, br#"{"method":"","parameters":{}}"#).await;

    assert_eq!(response["fault"]["code"], json!(-10002));
}

#[tokio::test(flavor = "current_thread")]
async fn unknown_method_faults_with_name_in_details() {
    let service = TestService::new();
    let response = dispatch_json(&service, br#"{"method":"ghost","parameters":{}}"#).await;

    assert_eq!(response["fault"]["code"], json!(-10003));
    assert_eq!(response["fault"]["details"]["method"], json!("ghost"));
    // Framework fault: no hook or handler ever ran.
    assert_eq!(service.log(), vec!["fault:-10003:true"]);
}

#[tokio::test(flavor = "current_thread")]
async fn missing_required_parameter_faults_before_invocation() {
    let service = TestService::new();
    let response = dispatch_json(&service, br#"{"method":"add","parameters":{"a":"2"}}"#).await;

    assert_eq!(response["fault"]["code"], json!(-10004));
    assert_eq!(
        response["fault"]["message"],
        json!("Missing required parameter(s) 'b'.")
    );
    assert_eq!(
        response["fault"]["details"]["missingParameters"],
        json!(["b"])
    );
    assert_eq!(service.log(), vec!["fault:-10004:true"]);
}

#[tokio::test(flavor = "current_thread")]
async fn every_missing_parameter_is_listed_in_declared_order() {
    let service = TestService::new();
    let response = dispatch_json(&service, br#"{"method":"add","parameters":{}}"#).await;

    assert_eq!(
        response["fault"]["details"]["missingParameters"],
        json!(["a", "b"])
    );
    assert_eq!(
        response["fault"]["message"],
        json!("Missing required parameter(s) 'a, b'.")
    );
}

#[tokio::test(flavor = "current_thread")]
async fn add_binds_and_casts_string_parameters() {
    let service = TestService::new();
    let response =
        dispatch_json(&service, br#"{"method":"add","parameters":{"a":"2","b":"3"}}"#).await;

    assert_eq!(response["result"], json!(5));
    assert_eq!(service.log(), vec!["pre", "handler:add", "post"]);
}

#[tokio::test(flavor = "current_thread")]
async fn absent_optional_parameter_binds_to_null() {
    let service = TestService::new();
    let response =
        dispatch_json(&service, br#"{"method":"greet","parameters":{"name":"Ada"}}"#).await;

    assert_eq!(response["result"], json!("Hello, Ada!"));
}

#[tokio::test(flavor = "current_thread")]
async fn supplied_optional_parameter_is_passed_through() {
    let service = TestService::new();
    let raw = br#"{"method":"greet","parameters":{"name":"Ada","title":"Dr."}}"#;
    let response = dispatch_json(&service, raw).await;

    assert_eq!(response["result"], json!("Hello, Dr. Ada!"));
}

#[tokio::test(flavor = "current_thread")]
async fn handler_fault_skips_cast_but_runs_post_hook() {
    let service = TestService::new();
    let response =
        dispatch_json(&service, br#"{"method":"div","parameters":{"a":1,"b":0}}"#).await;

    assert_eq!(response["fault"]["code"], json!(1));
    assert_eq!(response["fault"]["message"], json!("Division by zero."));
    assert_eq!(service.log(), vec!["pre", "post", "fault:1:false"]);
    // Hooks ran, so their header made it onto the fault envelope too.
    assert_eq!(response["headers"]["served-by"], json!("test-service"));
}

#[tokio::test(flavor = "current_thread")]
async fn post_hook_may_replace_a_success_with_a_fault() {
    let mut service = TestService::new();
    service.rewrite_to_fault = true;
    let response =
        dispatch_json(&service, br#"{"method":"add","parameters":{"a":1,"b":2}}"#).await;

    assert_eq!(response["fault"]["code"], json!(2));
    assert_eq!(response["fault"]["message"], json!("Rewritten by post-hook."));
}

#[tokio::test(flavor = "current_thread")]
async fn handler_panic_becomes_the_default_fault() {
    let service = TestService::new();
    let response = dispatch_json(&service, br#"{"method":"boom","parameters":{}}"#).await;

    assert_eq!(response["fault"]["code"], json!(-10000));
    assert_eq!(response["fault"]["message"], json!("Unknown error"));
    assert_eq!(response["fault"]["details"], json!("boom went the handler"));
    // The post hook is skipped when no outcome exists.
    assert_eq!(service.log(), vec!["pre", "fault:-10000:false"]);
}

#[tokio::test(flavor = "current_thread")]
async fn pre_hook_headers_appear_on_success_responses() {
    let service = TestService::new();
    let response =
        dispatch_json(&service, br#"{"method":"add","parameters":{"a":1,"b":2}}"#).await;

    assert_eq!(response["headers"]["served-by"], json!("test-service"));
}

#[tokio::test(flavor = "current_thread")]
async fn framework_faults_carry_no_hook_headers() {
    let service = TestService::new();
    let response = dispatch_json(&service, br#"{"method":"ghost","parameters":{}}"#).await;

    assert_eq!(response["headers"], json!({}));
}

#[tokio::test(flavor = "current_thread")]
async fn unknown_wire_format_is_a_configuration_error() {
    let service = TestService::new();
    let err = Dispatcher::with_format("xml")
        .dispatch(&service, br#"{"method":"add","parameters":{}}"#)
        .await
        .unwrap_err();

    assert!(matches!(err, CodecError::UnknownFormat(name) if name == "xml"));
    // No fault was emitted for a configuration error.
    assert_eq!(service.log(), Vec::<String>::new());
}

#[tokio::test(flavor = "current_thread")]
async fn raw_format_cannot_decode_an_envelope() {
    let service = TestService::new();
    let bytes = Dispatcher::with_format("raw")
        .dispatch(&service, b"anything at all")
        .await
        .unwrap();

    assert_eq!(bytes, b"Unable to decode request.");
    assert_eq!(service.log(), vec!["fault:-10002:true"]);
}

#[test]
fn raw_encode_passes_string_results_through() {
    let codec = Codec::new("raw");
    let envelope = ResponseEnvelope::result(Map::new(), json!("pre-rendered payload"));

    assert_eq!(codec.encode(&envelope).unwrap(), b"pre-rendered payload");
}

#[test]
fn raw_encode_renders_structured_results_as_json_text() {
    let codec = Codec::new("raw");
    let envelope = ResponseEnvelope::result(Map::new(), json!({ "n": 1 }));

    assert_eq!(codec.encode(&envelope).unwrap(), br#"{"n":1}"#);
}

#[test]
fn describe_lists_registered_methods() {
    let service = TestService::new();
    let listing = service.methods.describe();
    let names: Vec<&str> = listing.iter().map(|m| m.name.as_str()).collect();

    assert_eq!(names, vec!["add", "boom", "div", "greet"]);
    let add = &listing[0];
    assert_eq!(add.description.as_deref(), Some("Adds two integers."));
    assert_eq!(add.params.len(), 2);
    assert_eq!(add.params[0].name, "a");
    assert_eq!(add.returns.coercion, Some(Coercion::Int));
}
