//! Scroll-spy configuration
//!
//! [`Options`] is the fully resolved configuration of one binding. It is
//! built by layering an [`OptionsPatch`] over the spy's instance defaults,
//! field by field; a patch never accumulates on top of a previous patch.
//!
//! Patches can be loaded from JSON or TOML documents:
//!
//! ```toml
//! allow_no_active_section = true
//! offset = 80
//! easing = "cubic-in-out"   # or "none" to disable the tween
//!
//! [active]
//! class = "current"
//! ```
//!
//! JSON documents additionally accept the camelCase key spellings
//! (`allowNoActiveSection`, `sectionSelector`) and `"easing": null`.

use std::fmt;
use std::rc::Rc;

use scrollspy_animation::Easing;
use scrollspy_dom::ElementId;
use serde::de::{IntoDeserializer, value::StrDeserializer};
use serde::{Deserialize, Deserializer};

use crate::error::Result;

/// Callback invoked with the newly published active index
pub type IndexChangedCallback = Rc<dyn Fn(Option<usize>)>;

/// Which elements receive the active class, and which class
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveOptions {
    /// Selector for marker elements; `None` uses the direct children
    pub selector: Option<String>,
    pub class: String,
}

impl Default for ActiveOptions {
    fn default() -> Self {
        Self {
            selector: None,
            class: "active".to_string(),
        }
    }
}

/// Which elements act as navigation links
#[derive(Debug, Clone, PartialEq)]
pub struct LinkOptions {
    pub selector: String,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            selector: "a".to_string(),
        }
    }
}

/// Resolved configuration of a container binding
#[derive(Clone)]
pub struct Options {
    /// Allow no section to be active when scrolled outside every section
    pub allow_no_active_section: bool,
    /// Distance from the top of the scroll surface at which a section
    /// becomes active
    pub offset: f32,
    /// Selector for sections; `None` uses the container's direct children
    pub section_selector: Option<String>,
    pub active: ActiveOptions,
    pub link: LinkOptions,
    /// Scroll animation duration in milliseconds
    pub time: u32,
    /// Number of jumps for the stepped scroll fallback
    pub steps: u32,
    /// Tween curve; `None` disables the tween
    pub easing: Option<Easing>,
    pub index_changed: Option<IndexChangedCallback>,
    /// A new scroll command on a surface cancels animations still running
    /// on it
    pub cancel_overlapping: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            allow_no_active_section: false,
            offset: 0.0,
            section_selector: None,
            active: ActiveOptions::default(),
            link: LinkOptions::default(),
            time: 500,
            steps: 30,
            easing: Some(Easing::CubicIn),
            index_changed: None,
            cancel_overlapping: false,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("allow_no_active_section", &self.allow_no_active_section)
            .field("offset", &self.offset)
            .field("section_selector", &self.section_selector)
            .field("active", &self.active)
            .field("link", &self.link)
            .field("time", &self.time)
            .field("steps", &self.steps)
            .field("easing", &self.easing)
            .field("index_changed", &self.index_changed.is_some())
            .field("cancel_overlapping", &self.cancel_overlapping)
            .finish()
    }
}

impl Options {
    /// Set the index-changed callback
    pub fn on_index_changed<F>(mut self, callback: F) -> Self
    where
        F: Fn(Option<usize>) + 'static,
    {
        self.index_changed = Some(Rc::new(callback));
        self
    }

    /// Layer a patch over these options
    pub fn merged(&self, patch: &OptionsPatch) -> Options {
        let mut options = self.clone();
        if let Some(v) = patch.allow_no_active_section {
            options.allow_no_active_section = v;
        }
        if let Some(v) = patch.offset {
            options.offset = v;
        }
        if let Some(v) = &patch.section_selector {
            options.section_selector = v.clone();
        }
        if let Some(active) = &patch.active {
            options.active = options.active.merged(active);
        }
        if let Some(link) = &patch.link {
            options.link = options.link.merged(link);
        }
        if let Some(v) = patch.time {
            options.time = v;
        }
        if let Some(v) = patch.steps {
            options.steps = v;
        }
        if let Some(v) = patch.easing {
            options.easing = v;
        }
        if let Some(callback) = &patch.index_changed {
            options.index_changed = Some(Rc::clone(callback));
        }
        if let Some(v) = patch.cancel_overlapping {
            options.cancel_overlapping = v;
        }
        options
    }
}

impl ActiveOptions {
    pub fn merged(&self, patch: &ActivePatch) -> ActiveOptions {
        ActiveOptions {
            selector: match &patch.selector {
                Some(selector) => selector.clone(),
                None => self.selector.clone(),
            },
            class: patch.class.clone().unwrap_or_else(|| self.class.clone()),
        }
    }
}

impl LinkOptions {
    pub fn merged(&self, patch: &LinkPatch) -> LinkOptions {
        LinkOptions {
            selector: patch
                .selector
                .clone()
                .unwrap_or_else(|| self.selector.clone()),
        }
    }
}

// ============================================================================
// Patches
// ============================================================================

/// Per-binding overrides for [`Options`]
///
/// Every field left as `None` keeps the instance default. Nullable options
/// use a nested `Option`: `Some(None)` clears the default.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsPatch {
    #[serde(default, alias = "allowNoActiveSection")]
    pub allow_no_active_section: Option<bool>,
    #[serde(default)]
    pub offset: Option<f32>,
    #[serde(default, alias = "sectionSelector", deserialize_with = "nullable")]
    pub section_selector: Option<Option<String>>,
    #[serde(default)]
    pub active: Option<ActivePatch>,
    #[serde(default)]
    pub link: Option<LinkPatch>,
    #[serde(default)]
    pub time: Option<u32>,
    #[serde(default)]
    pub steps: Option<u32>,
    #[serde(default, deserialize_with = "easing_setting")]
    pub easing: Option<Option<Easing>>,
    #[serde(skip)]
    pub index_changed: Option<IndexChangedCallback>,
    #[serde(default, alias = "cancelOverlapping")]
    pub cancel_overlapping: Option<bool>,
}

impl fmt::Debug for OptionsPatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionsPatch")
            .field("allow_no_active_section", &self.allow_no_active_section)
            .field("offset", &self.offset)
            .field("section_selector", &self.section_selector)
            .field("active", &self.active)
            .field("link", &self.link)
            .field("time", &self.time)
            .field("steps", &self.steps)
            .field("easing", &self.easing)
            .field("index_changed", &self.index_changed.is_some())
            .field("cancel_overlapping", &self.cancel_overlapping)
            .finish()
    }
}

impl OptionsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a patch from a JSON object
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a patch from a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn allow_no_active_section(mut self, allow: bool) -> Self {
        self.allow_no_active_section = Some(allow);
        self
    }

    pub fn offset(mut self, offset: f32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn section_selector(mut self, selector: impl Into<String>) -> Self {
        self.section_selector = Some(Some(selector.into()));
        self
    }

    pub fn time(mut self, time_ms: u32) -> Self {
        self.time = Some(time_ms);
        self
    }

    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Set the tween curve, or disable the tween with `None`
    pub fn easing(mut self, easing: Option<Easing>) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn cancel_overlapping(mut self, cancel: bool) -> Self {
        self.cancel_overlapping = Some(cancel);
        self
    }

    pub fn on_index_changed<F>(mut self, callback: F) -> Self
    where
        F: Fn(Option<usize>) + 'static,
    {
        self.index_changed = Some(Rc::new(callback));
        self
    }
}

/// Overrides for [`ActiveOptions`] on a marker binding
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivePatch {
    #[serde(default, deserialize_with = "nullable")]
    pub selector: Option<Option<String>>,
    #[serde(default)]
    pub class: Option<String>,
    /// Container whose index drives these markers; defaults to the most
    /// recently attached container
    #[serde(skip)]
    pub container: Option<ElementId>,
}

impl ActivePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(Some(selector.into()));
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn container(mut self, container: ElementId) -> Self {
        self.container = Some(container);
        self
    }
}

/// Overrides for [`LinkOptions`] on a link binding
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkPatch {
    #[serde(default)]
    pub selector: Option<String>,
    /// Container scrolled by these links; defaults to the most recently
    /// attached container
    #[serde(skip)]
    pub container: Option<ElementId>,
}

impl LinkPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn container(mut self, container: ElementId) -> Self {
        self.container = Some(container);
        self
    }
}

/// Distinguish an explicit `null` (`Some(None)`) from a missing key (`None`)
fn nullable<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Easing name, with `null` or `"none"` disabling the tween
fn easing_setting<'de, D>(deserializer: D) -> std::result::Result<Option<Option<Easing>>, D::Error>
where
    D: Deserializer<'de>,
{
    let name = Option::<String>::deserialize(deserializer)?;
    match name.as_deref() {
        None | Some("none") => Ok(Some(None)),
        Some(name) => {
            let de: StrDeserializer<'_, D::Error> = name.into_deserializer();
            Easing::deserialize(de).map(|easing| Some(Some(easing)))
        }
    }
}
