//! Node configuration bags and registry settings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    core::{
        node::{Anchors, Flags},
        orphan::Retention,
    },
    error::Result,
    geom::{Anchor, Bounds},
};

/// Configuration for a new node, usually deserialized from a loosely typed
/// JSON object. Unknown keys are kept in `extra` for the kind's constructor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Unique name. Generated from the kind when absent.
    pub name: Option<String>,
    /// Node kind, used by [`Registry::create_from_value`](crate::Registry::create_from_value).
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Initial left offset, if `left` is absent.
    pub x: Option<f32>,
    /// Initial top offset, if `top` is absent.
    pub y: Option<f32>,
    /// Initial width, if `right` is absent.
    #[serde(alias = "w")]
    pub width: Option<f32>,
    /// Initial height, if `bottom` is absent.
    #[serde(alias = "h")]
    pub height: Option<f32>,
    /// Explicit left offset.
    pub left: Option<f32>,
    /// Explicit top offset.
    pub top: Option<f32>,
    /// Explicit right offset.
    pub right: Option<f32>,
    /// Explicit bottom offset.
    pub bottom: Option<f32>,
    /// Anchor for all edges, overridden per edge below.
    pub anchor: Option<Anchor>,
    /// Left edge anchor.
    pub anchor_left: Option<Anchor>,
    /// Top edge anchor.
    pub anchor_top: Option<Anchor>,
    /// Right edge anchor.
    pub anchor_right: Option<Anchor>,
    /// Bottom edge anchor.
    pub anchor_bottom: Option<Anchor>,
    /// Seeds the priority when `priority` is absent.
    pub z_order: Option<i32>,
    /// Stacking priority.
    pub priority: Option<i32>,
    /// Hit-testable.
    pub clickable: Option<bool>,
    /// Enabled.
    pub is_enabled: Option<bool>,
    /// Hidden.
    pub is_hidden: Option<bool>,
    /// Tab ordering key.
    pub tab_priority: Option<i32>,
    /// Participates in tab navigation.
    pub tab_enabled: Option<bool>,
    /// Orphan retention. The registry default applies when absent.
    pub retention: Option<Retention>,
    /// Keys not recognised by the core.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeConfig {
    /// A config with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Parse a config from a JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Set the initial position and size.
    pub fn with_xywh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self.width = Some(w);
        self.height = Some(h);
        self
    }

    /// Set the stacking priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the retention policy.
    pub fn with_retention(mut self, retention: Retention) -> Self {
        self.retention = Some(retention);
        self
    }

    /// Set the anchor on all four edges.
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Mark the node clickable.
    pub fn clickable(mut self) -> Self {
        self.clickable = Some(true);
        self
    }

    /// Initial edge offsets. Explicit edges win over `x`/`y`/`width`/`height`.
    pub fn offsets(&self) -> Bounds {
        let left = self.left.or(self.x).unwrap_or(0.0);
        let top = self.top.or(self.y).unwrap_or(0.0);
        let right = self
            .right
            .or_else(|| self.width.map(|w| left + w))
            .unwrap_or(left);
        let bottom = self
            .bottom
            .or_else(|| self.height.map(|h| top + h))
            .unwrap_or(top);
        Bounds::new(left, top, right, bottom)
    }

    /// Initial anchors.
    pub fn anchors(&self) -> Anchors {
        let base = self.anchor.unwrap_or_default();
        Anchors {
            left: self.anchor_left.unwrap_or(base),
            top: self.anchor_top.unwrap_or(base),
            right: self.anchor_right.unwrap_or(base),
            bottom: self.anchor_bottom.unwrap_or(base),
        }
    }

    /// Initial flags.
    pub fn flags(&self) -> Flags {
        let d = Flags::default();
        Flags {
            enabled: self.is_enabled.unwrap_or(d.enabled),
            hidden: self.is_hidden.unwrap_or(d.hidden),
            clickable: self.clickable.unwrap_or(d.clickable),
            tab_enabled: self.tab_enabled.unwrap_or(d.tab_enabled),
            tab_priority: self.tab_priority.unwrap_or(d.tab_priority),
            dirty: true,
        }
    }

    /// Initial priority.
    pub fn priority(&self) -> i32 {
        self.priority.or(self.z_order).unwrap_or(0)
    }

    /// An unrecognised key.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}

/// Registry-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Retention applied to nodes whose config does not name one.
    pub default_retention: Retention,
    /// Upper bound on drain passes when hooks keep queueing structural work.
    pub max_drain_passes: usize,
    /// Name of the stage node.
    pub stage_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_retention: Retention::AutoDestroy,
            max_drain_passes: 16,
            stage_name: "stage".into(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON text. Missing keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
