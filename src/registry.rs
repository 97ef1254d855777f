//! Method metadata and the name→descriptor registry.
//!
//! The registry is built once at service construction; the dispatcher
//! queries it fresh on every request and keeps no cache of its own.

use crate::fault::Fault;
use crate::types::ParamFlags;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

/// What a handler produces: a result value, or a fault of its own making.
pub type HandlerResult = Result<Value, Fault>;

pub type HandlerFuture = BoxFuture<'static, HandlerResult>;

type CallTarget = Box<dyn Fn(Vec<Value>) -> HandlerFuture + Send + Sync>;

/// One declared parameter: its wire name and its flags. The position of a
/// spec in the descriptor fixes the position of its bound argument.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: String,
    pub flags: ParamFlags,
}

/// Metadata describing a callable method: the target to invoke, the ordered
/// parameter specs, and the return flags.
pub struct MethodDescriptor {
    target: CallTarget,
    pub params: Vec<ParamSpec>,
    pub returns: ParamFlags,
    pub description: Option<String>,
}

impl MethodDescriptor {
    pub fn new<F, Fut>(target: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self {
            target: Box::new(move |args| Box::pin(target(args))),
            params: Vec::new(),
            returns: ParamFlags::default(),
            description: None,
        }
    }

    /// Declares the next positional parameter.
    pub fn param(mut self, name: impl Into<String>, flags: impl Into<ParamFlags>) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            flags: flags.into(),
        });
        self
    }

    pub fn returns(mut self, flags: impl Into<ParamFlags>) -> Self {
        self.returns = flags.into();
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Invokes the target purely positionally with the bound arguments.
    pub(crate) fn call(&self, arguments: Vec<Value>) -> HandlerFuture {
        (self.target)(arguments)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Maps method names to [`MethodDescriptor`]s.
///
/// Descriptors can be registered with [`insert`](MethodTable::insert),
/// resolved with [`resolve`](MethodTable::resolve), and listed with
/// [`describe`](MethodTable::describe).
#[derive(Default)]
pub struct MethodTable {
    methods: BTreeMap<String, MethodDescriptor>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, descriptor: MethodDescriptor) {
        self.methods.insert(name.into(), descriptor);
    }

    pub fn resolve(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub fn describe(&self) -> Vec<MethodInfo> {
        self.methods
            .iter()
            .map(|(name, descriptor)| MethodInfo {
                name: name.clone(),
                description: descriptor.description.clone(),
                params: descriptor.params.clone(),
                returns: descriptor.returns,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub params: Vec<ParamSpec>,
    pub returns: ParamFlags,
}
