use std::{collections::HashMap, fmt};

use crate::{
    behavior::{Behavior, Container},
    core::{config::NodeConfig, state::NodeKind},
    error::{Error, Result},
};

/// Builds a behavior from a node configuration.
pub type Constructor = Box<dyn Fn(&NodeConfig) -> Result<Box<dyn Behavior>>>;

/// Maps node kinds to behavior constructors.
pub struct Factory {
    /// Registered constructors.
    constructors: HashMap<NodeKind, Constructor>,
}

impl Default for Factory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds = self.kinds();
        kinds.sort();
        f.debug_struct("Factory").field("kinds", &kinds).finish()
    }
}

impl Factory {
    /// A factory that knows the built-in `node` and `container` kinds.
    pub fn new() -> Self {
        let mut f = Self {
            constructors: HashMap::new(),
        };
        f.register_default::<Container>("node");
        f.register_default::<Container>("container");
        f
    }

    /// Register a constructor for a kind, replacing any existing one.
    pub fn register<F>(&mut self, kind: &str, constructor: F)
    where
        F: Fn(&NodeConfig) -> Result<Box<dyn Behavior>> + 'static,
    {
        self.constructors
            .insert(NodeKind::new(kind), Box::new(constructor));
    }

    /// Register a kind whose behavior is built with `Default`.
    pub fn register_default<B>(&mut self, kind: &str)
    where
        B: Behavior + Default,
    {
        self.register(kind, |_| Ok(Box::new(B::default())));
    }

    /// Is a constructor registered for this kind?
    pub fn knows(&self, kind: &NodeKind) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered kinds, unordered.
    pub fn kinds(&self) -> Vec<&str> {
        self.constructors.keys().map(NodeKind::as_str).collect()
    }

    /// Build the behavior for a kind.
    pub fn build(&self, kind: &NodeKind, config: &NodeConfig) -> Result<Box<dyn Behavior>> {
        let constructor = self
            .constructors
            .get(kind)
            .ok_or_else(|| Error::UnknownKind(kind.to_string()))?;
        constructor(config)
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;

    #[derive(Default)]
    struct Label {
        text: String,
    }

    impl Behavior for Label {}

    #[test]
    fn builtins() -> Result<()> {
        let f = Factory::new();
        assert!(f.knows(&NodeKind::new("node")));
        assert!(f.knows(&NodeKind::new("Container")));
        f.build(&NodeKind::new("node"), &NodeConfig::default())?;
        Ok(())
    }

    #[test]
    fn unknown_kind() {
        let f = Factory::new();
        let err = f
            .build(&NodeKind::new("widget"), &NodeConfig::default())
            .err();
        assert!(matches!(err, Some(Error::UnknownKind(k)) if k == "widget"));
    }

    #[test]
    fn constructor_sees_extra() -> Result<()> {
        let mut f = Factory::new();
        f.register("label", |config| {
            let text = config
                .extra("text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::Config("label needs text".into()))?;
            Ok(Box::new(Label { text: text.into() }))
        });
        let config = NodeConfig::from_value(serde_json::json!({"text": "hi"}))?;
        let b = f.build(&NodeKind::new("LABEL"), &config)?;
        let label = (b.as_ref() as &dyn Any).downcast_ref::<Label>();
        assert_eq!(label.map(|l| l.text.as_str()), Some("hi"));
        assert!(f.build(&NodeKind::new("label"), &NodeConfig::default()).is_err());
        Ok(())
    }
}
