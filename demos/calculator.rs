use rpcdispatch::{
    Coercion, DispatchContext, Dispatcher, Fault, MethodDescriptor, MethodTable, RpcService,
};
use serde_json::{json, Value};

struct Calculator {
    methods: MethodTable,
}

impl Calculator {
    fn new() -> Self {
        let mut methods = MethodTable::new();

        methods.insert(
            "add",
            MethodDescriptor::new(|args: Vec<Value>| async move {
                Ok(json!(
                    args[0].as_i64().unwrap_or(0) + args[1].as_i64().unwrap_or(0)
                ))
            })
            .param("a", Coercion::Int)
            .param("b", Coercion::Int)
            .returns(Coercion::Int)
            .description("Adds two integers."),
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
            .returns(Coercion::Float)
            .description("Divides a by b."),
        );

        Self { methods }
    }
}

impl RpcService for Calculator {
    fn resolve(&self, method: &str) -> Option<&MethodDescriptor> {
        self.methods.resolve(method)
    }

    fn pre_process(&self, cx: &mut DispatchContext) {
        cx.response_headers
            .insert("service".into(), json!("calculator"));
    }

    fn fault_callback(&self, fault: &Fault, is_internal: bool) {
        eprintln!("fault callback: {fault} (internal: {is_internal})");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let service = Calculator::new();
    let dispatcher = Dispatcher::new();

    let requests: [&[u8]; 5] = [
        br#"{"method":"add","parameters":{"a":"2","b":"3"}}"#,
        br#"{"method":"div","parameters":{"a":1,"b":4}}"#,
        br#"{"method":"div","parameters":{"a":1,"b":0}}"#,
        br#"{"method":"ghost","parameters":{}}"#,
        br#"{"method":"add","parameters":{"a":"2"}}"#,
    ];

    for raw in requests {
        let response = dispatcher.dispatch(&service, raw).await.unwrap();
        println!("{}", String::from_utf8_lossy(&response));
    }

    println!(
        "exported methods: {}",
        serde_json::to_string_pretty(&service.methods.describe()).unwrap()
    );
}
