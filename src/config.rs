//! Structured access to a Cordova / Cocoon `config.xml` document.
//!
//! Every typed setter funnels through [`ConfigDocument::update_or_add_node`],
//! and every getter through [`ConfigDocument::find_node`], so the rules for
//! platform scoping and fallback live in one place.

use serde::{Deserialize, Serialize};

use crate::error::CocoonError;
use crate::platform::Platform;
use crate::url::is_git_url;
use crate::xml::{NodeId, XmlTree, format_xml};

/// Namespace every parsed document's root is guaranteed to declare as
/// `xmlns:cdv`.
pub const CORDOVA_NAMESPACE: &str = "http://cordova.apache.org/ns/1.0";

const CANVAS_PLUS_PLUGIN: &str = "com.ludei.canvasplus";
const WEBVIEW_PLUS_PLUGIN: &str = "com.ludei.webviewplus";

/// Platforms on which the "plus" environments exist.
const ENVIRONMENT_PLATFORMS: [Platform; 2] = [Platform::Ios, Platform::Android];

// ═══════════════════════════════════════════════════════════════════════════════
//  Filter / update values
// ═══════════════════════════════════════════════════════════════════════════════

/// Selects one logical element: a direct child of `<widget>` when `platform`
/// is `None`, otherwise a child of the matching `<platform name="..">`
/// wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFilter {
    /// Qualified tag name, or `*` for any element.
    pub tag: String,
    pub platform: Option<Platform>,
    /// Attributes that must be present with exactly these values.
    pub attributes: Vec<(String, String)>,
    /// Retry without `platform` when the scoped lookup finds nothing.
    pub fallback: bool,
}

impl NodeFilter {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), platform: None, attributes: Vec::new(), fallback: false }
    }

    pub fn platform(mut self, platform: Option<Platform>) -> Self {
        self.platform = platform;
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }
}

/// Changes applied by [`ConfigDocument::update_or_add_node`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeUpdate {
    /// New text content; `None` leaves the content alone.
    pub value: Option<String>,
    /// Attribute writes in order; a `None` value removes the attribute.
    pub attributes: Vec<(String, Option<String>)>,
}

impl NodeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), Some(value.into())));
        self
    }

    pub fn remove_attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push((name.into(), None));
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Typed values
// ═══════════════════════════════════════════════════════════════════════════════

/// Screen orientation lock, stored as the `Orientation` preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
    /// Both orientations allowed; stored as `"default"`.
    #[serde(rename = "default")]
    Both,
    /// No preference stored at all.
    #[serde(rename = "system-default")]
    SystemDefault,
}

impl Orientation {
    /// The preference value written for this orientation, `None` when the
    /// preference should be absent.
    pub fn preference_value(self) -> Option<&'static str> {
        match self {
            Orientation::Portrait => Some("portrait"),
            Orientation::Landscape => Some("landscape"),
            Orientation::Both => Some("default"),
            Orientation::SystemDefault => None,
        }
    }

    /// Inverse of [`preference_value`](Self::preference_value); unknown
    /// values map to `SystemDefault`.
    pub fn from_preference(value: &str) -> Self {
        match value {
            "portrait" => Orientation::Portrait,
            "landscape" => Orientation::Landscape,
            "default" => Orientation::Both,
            _ => Orientation::SystemDefault,
        }
    }
}

/// Rendering environment, selected by the presence of a vendor plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    WebView,
    CanvasPlus,
    WebViewPlus,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::WebView => "webview",
            Environment::CanvasPlus => "canvasplus",
            Environment::WebViewPlus => "webviewplus",
        }
    }

    /// Name of the plugin that enables this environment on `platform`.
    pub fn plugin_name(self, platform: Platform) -> Option<String> {
        match self {
            Environment::WebView => None,
            Environment::CanvasPlus => Some(format!("{CANVAS_PLUS_PLUGIN}.{platform}")),
            Environment::WebViewPlus => Some(format!("{WEBVIEW_PLUS_PLUGIN}.{platform}")),
        }
    }
}

/// Owned copy of a `<plugin>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    pub name: String,
    pub spec: Option<String>,
    /// `(name, decoded value)` for each `<variable>` child, in document order.
    pub variables: Vec<(String, String)>,
}

/// The `<author>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: Option<String>,
    pub href: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  ConfigDocument – top-level handle
// ═══════════════════════════════════════════════════════════════════════════════

/// An editable `config.xml`.
///
/// A document whose text failed to parse, or whose root is not `<widget>`,
/// is *errored*: it stays usable as a value but every getter returns an
/// empty/neutral result and every setter is a no-op.
#[derive(Debug)]
pub struct ConfigDocument {
    pub(crate) tree: XmlTree,
    pub(crate) root: Option<NodeId>,
    error: Option<CocoonError>,
}

impl ConfigDocument {
    /// Parse configuration text, migrating the legacy `cocoon:` dialect.
    pub fn parse(source: &str) -> Result<Self, CocoonError> {
        let tree = XmlTree::parse(source)?;
        let root = tree
            .document_element()
            .filter(|&r| tree.name(r) == Some("widget"))
            .ok_or(CocoonError::MissingWidget)?;

        let mut doc = Self { tree, root: Some(root), error: None };
        if doc.tree.attribute(root, "xmlns:cdv").is_none() {
            doc.tree.set_attribute(root, "xmlns:cdv", CORDOVA_NAMESPACE);
        }
        doc.migrate_legacy();
        Ok(doc)
    }

    /// Like [`parse`](Self::parse) but never fails; check
    /// [`is_errored`](Self::is_errored) afterwards.
    pub fn new(source: &str) -> Self {
        Self::parse(source).unwrap_or_else(|error| {
            log::warn!("config.xml could not be loaded: {error}");
            Self { tree: XmlTree::default(), root: None, error: Some(error) }
        })
    }

    /// Load a `config.xml` file from disk.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, CocoonError> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source)
    }

    /// Write the serialized document to disk.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), CocoonError> {
        std::fs::write(path, self.xml())?;
        Ok(())
    }

    pub fn is_errored(&self) -> bool {
        self.root.is_none()
    }

    /// Why the document is errored, if it is.
    pub fn error(&self) -> Option<&CocoonError> {
        self.error.as_ref()
    }

    /// Read-only access to the underlying tree.
    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    /// Pretty-printed XML.  Recomputed on every call; empty for an errored
    /// document.
    pub fn xml(&self) -> String {
        if self.is_errored() {
            return String::new();
        }
        let compact = self.tree.to_xml_string().replace(" xmlns=\"\"", "");
        format_xml(&compact)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Node filter engine
// ═══════════════════════════════════════════════════════════════════════════════

impl ConfigDocument {
    /// `true` if `node` sits in the scope `filter` names, has the requested
    /// tag and carries every requested attribute value.
    pub fn matches_filter(&self, node: NodeId, filter: &NodeFilter) -> bool {
        let (Some(root), Some(parent)) = (self.root, self.tree.parent(node)) else {
            return false;
        };

        let in_scope = match filter.platform {
            Some(platform) => {
                self.tree.name(parent) == Some("platform")
                    && self.tree.attribute(parent, "name") == Some(platform.as_str())
            }
            None => parent == root,
        };

        in_scope
            && (filter.tag == "*" || self.tree.name(node) == Some(filter.tag.as_str()))
            && filter
                .attributes
                .iter()
                .all(|(name, value)| self.tree.attribute(node, name) == Some(value.as_str()))
    }

    fn first_match(&self, filter: &NodeFilter) -> Option<NodeId> {
        self.tree
            .elements_by_name(&filter.tag)
            .into_iter()
            .find(|&id| self.matches_filter(id, filter))
    }

    /// First matching element in document order.  With `fallback`, a failed
    /// platform-scoped lookup is retried once without the platform.
    pub fn find_node(&self, filter: &NodeFilter) -> Option<NodeId> {
        self.root?;
        self.first_match(filter).or_else(|| {
            if filter.fallback && filter.platform.is_some() {
                self.first_match(&filter.clone().platform(None))
            } else {
                None
            }
        })
    }

    /// All matching elements in document order.  `fallback` is ignored.
    pub fn find_nodes(&self, filter: &NodeFilter) -> Vec<NodeId> {
        if self.root.is_none() {
            return Vec::new();
        }
        self.tree
            .elements_by_name(&filter.tag)
            .into_iter()
            .filter(|&id| self.matches_filter(id, filter))
            .collect()
    }

    /// The element new nodes for `platform` are created under: the root, or
    /// a `<platform name="..">` wrapper that is created on demand.
    pub fn parent_node_for_platform(&mut self, platform: Option<Platform>) -> Option<NodeId> {
        let root = self.root?;
        let Some(platform) = platform else {
            return Some(root);
        };

        let filter = NodeFilter::new("platform").attribute("name", platform.as_str());
        if let Some(wrapper) = self.find_node(&filter) {
            return Some(wrapper);
        }

        let wrapper = self.tree.create_element("platform");
        self.tree.set_attribute(wrapper, "name", platform.as_str());
        self.tree.append_indented(root, wrapper);
        Some(wrapper)
    }

    /// Find the element `filter` selects, creating it if needed, then apply
    /// `update`.
    ///
    /// A freshly created element receives the filter's attribute pairs, so it
    /// matches the same filter afterwards.  Returns `None` only for an
    /// errored document or a wildcard tag with no match.
    pub fn update_or_add_node(&mut self, filter: &NodeFilter, update: &NodeUpdate) -> Option<NodeId> {
        let node = match self.find_node(filter) {
            Some(node) => node,
            None => {
                if filter.tag == "*" {
                    return None;
                }
                let parent = self.parent_node_for_platform(filter.platform)?;
                let node = self.tree.create_element(&filter.tag);
                for (name, value) in &filter.attributes {
                    self.tree.set_attribute(node, name, value);
                }
                self.tree.append_indented(parent, node);
                node
            }
        };

        if let Some(value) = &update.value {
            self.tree.set_text(node, value);
        }
        for (name, value) in &update.attributes {
            match value {
                Some(value) => self.tree.set_attribute(node, name, value),
                None => {
                    self.tree.remove_attribute(node, name);
                }
            }
        }

        Some(node)
    }

    /// Detach the element `filter` selects.  A `<platform>` wrapper left with
    /// nothing but whitespace is removed too.  Returns `true` if a node was
    /// removed.
    pub fn remove_node(&mut self, filter: &NodeFilter) -> bool {
        let Some(node) = self.find_node(filter) else {
            return false;
        };
        let parent = self.tree.parent(node);
        self.tree.remove_indented(node);

        if let Some(parent) = parent {
            let is_empty_wrapper = self.tree.name(parent) == Some("platform")
                && self
                    .tree
                    .children(parent)
                    .iter()
                    .all(|&c| self.tree.is_text(c));
            if is_empty_wrapper {
                self.tree.remove_indented(parent);
            }
        }
        true
    }

    fn node_attribute(&self, filter: &NodeFilter, attribute: &str) -> Option<String> {
        self.find_node(filter)
            .and_then(|node| self.tree.attribute(node, attribute))
            .map(String::from)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Root attributes: bundle id, version, version code
// ═══════════════════════════════════════════════════════════════════════════════

impl ConfigDocument {
    fn root_attribute(&self, name: &str) -> Option<&str> {
        self.root.and_then(|root| self.tree.attribute(root, name))
    }

    /// Set a root attribute; `None` or an empty override removes it.
    fn set_root_attribute(&mut self, name: &str, value: Option<&str>) {
        let Some(root) = self.root else { return };
        match value {
            Some(value) => self.tree.set_attribute(root, name, value),
            None => {
                self.tree.remove_attribute(root, name);
            }
        }
    }

    /// Platform override `attribute`, else (with `fallback`) the root
    /// `default` attribute.
    fn scoped_root_attribute(&self, attribute: &str, default: &str, fallback: bool) -> String {
        self.root_attribute(attribute)
            .or_else(|| if fallback { self.root_attribute(default) } else { None })
            .unwrap_or_default()
            .to_string()
    }

    /// Bundle identifier; the platform override when `platform` is given.
    pub fn get_bundle_id(&self, platform: Option<Platform>, fallback: bool) -> String {
        match platform {
            Some(p) => self.scoped_root_attribute(p.bundle_id_attribute(), "id", fallback),
            None => self.root_attribute("id").unwrap_or_default().to_string(),
        }
    }

    pub fn set_bundle_id(&mut self, value: &str, platform: Option<Platform>) {
        match platform {
            Some(p) => self.set_root_attribute(p.bundle_id_attribute(), non_empty(value)),
            None => self.set_root_attribute("id", Some(value)),
        }
    }

    /// Semantic version; the `<platform>-version` override when `platform`
    /// is given.
    pub fn get_version(&self, platform: Option<Platform>, fallback: bool) -> String {
        match platform {
            Some(p) => self.scoped_root_attribute(&p.version_attribute(), "version", fallback),
            None => self.root_attribute("version").unwrap_or_default().to_string(),
        }
    }

    pub fn set_version(&mut self, value: &str, platform: Option<Platform>) {
        match platform {
            Some(p) => self.set_root_attribute(&p.version_attribute(), non_empty(value)),
            None => self.set_root_attribute("version", Some(value)),
        }
    }

    /// Build number for `platform`.
    ///
    /// Android version codes are integers and never fall back to the
    /// semantic `version`; every other platform does when `fallback` is set.
    pub fn get_version_code(&self, platform: Platform, fallback: bool) -> String {
        let fallback = fallback && platform != Platform::Android;
        self.scoped_root_attribute(platform.version_code_attribute(), "version", fallback)
    }

    pub fn set_version_code(&mut self, value: &str, platform: Platform) {
        self.set_root_attribute(platform.version_code_attribute(), non_empty(value));
    }
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Name, description, author
// ═══════════════════════════════════════════════════════════════════════════════

impl ConfigDocument {
    fn element_text(&self, tag: &str) -> String {
        self.find_node(&NodeFilter::new(tag))
            .map(|node| self.tree.text_content(node).trim().to_string())
            .unwrap_or_default()
    }

    pub fn get_name(&self) -> String {
        self.element_text("name")
    }

    pub fn set_name(&mut self, name: &str) {
        self.update_or_add_node(&NodeFilter::new("name"), &NodeUpdate::new().value(name));
    }

    pub fn get_description(&self) -> String {
        self.element_text("description")
    }

    pub fn set_description(&mut self, description: &str) {
        self.update_or_add_node(
            &NodeFilter::new("description"),
            &NodeUpdate::new().value(description),
        );
    }

    pub fn get_author(&self) -> Option<Author> {
        let node = self.find_node(&NodeFilter::new("author"))?;
        Some(Author {
            name: self.tree.text_content(node).trim().to_string(),
            email: self.tree.attribute(node, "email").map(String::from),
            href: self.tree.attribute(node, "href").map(String::from),
        })
    }

    pub fn set_author(&mut self, author: &Author) {
        let mut update = NodeUpdate::new().value(author.name.as_str());
        update = match &author.email {
            Some(email) => update.attribute("email", email.as_str()),
            None => update.remove_attribute("email"),
        };
        update = match &author.href {
            Some(href) => update.attribute("href", href.as_str()),
            None => update.remove_attribute("href"),
        };
        self.update_or_add_node(&NodeFilter::new("author"), &update);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Preferences, orientation, fullscreen, content, engines, platforms
// ═══════════════════════════════════════════════════════════════════════════════

fn preference_filter(name: &str, platform: Option<Platform>) -> NodeFilter {
    NodeFilter::new("preference").platform(platform).attribute("name", name)
}

impl ConfigDocument {
    /// Value of `<preference name="..">` in the given scope.
    pub fn get_preference(
        &self,
        name: &str,
        platform: Option<Platform>,
        fallback: bool,
    ) -> Option<String> {
        self.node_attribute(&preference_filter(name, platform).fallback(fallback), "value")
    }

    /// Store a preference.  `None` or an empty value removes the node.
    pub fn set_preference(&mut self, name: &str, value: Option<&str>, platform: Option<Platform>) {
        match value.filter(|v| !v.is_empty()) {
            Some(value) => {
                self.update_or_add_node(
                    &preference_filter(name, platform),
                    &NodeUpdate::new().attribute("name", name).attribute("value", value),
                );
            }
            None => {
                self.remove_preference(name, platform);
            }
        }
    }

    pub fn remove_preference(&mut self, name: &str, platform: Option<Platform>) -> bool {
        self.remove_node(&preference_filter(name, platform))
    }

    /// Orientation in effect for `platform` (falling back to the global
    /// preference).
    pub fn get_orientation(&self, platform: Option<Platform>) -> Orientation {
        self.get_preference("Orientation", platform, true)
            .map(|v| Orientation::from_preference(&v))
            .unwrap_or(Orientation::SystemDefault)
    }

    pub fn set_orientation(&mut self, orientation: Orientation, platform: Option<Platform>) {
        self.set_preference("Orientation", orientation.preference_value(), platform);
    }

    /// Anything but a literal `"false"` counts as fullscreen; absent means
    /// not fullscreen.
    pub fn get_fullscreen(&self, platform: Option<Platform>) -> bool {
        self.get_preference("Fullscreen", platform, true)
            .is_some_and(|v| v != "false")
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool, platform: Option<Platform>) {
        let value = if fullscreen { "true" } else { "false" };
        self.set_preference("Fullscreen", Some(value), platform);
    }

    /// `<content src="..">` for `platform`, falling back to the global one.
    pub fn get_content_url(&self, platform: Option<Platform>) -> String {
        let filter = NodeFilter::new("content").platform(platform).fallback(true);
        self.node_attribute(&filter, "src").unwrap_or_default()
    }

    /// Store the start page.  An empty URL removes the scoped node.
    pub fn set_content_url(&mut self, url: &str, platform: Option<Platform>) {
        let filter = NodeFilter::new("content").platform(platform);
        if url.is_empty() {
            self.remove_node(&filter);
        } else {
            self.update_or_add_node(&filter, &NodeUpdate::new().attribute("src", url));
        }
    }

    /// Build-tool version required for `platform` (`<engine>` at the root).
    pub fn get_engine_spec(&self, platform: Platform) -> Option<String> {
        let filter = NodeFilter::new("engine").attribute("name", platform.as_str());
        self.node_attribute(&filter, "spec")
    }

    /// Pin the engine for `platform`; `None` pins `*`.
    pub fn set_engine_spec(&mut self, platform: Platform, spec: Option<&str>) {
        let filter = NodeFilter::new("engine").attribute("name", platform.as_str());
        let update = NodeUpdate::new()
            .attribute("name", platform.as_str())
            .attribute("spec", spec.unwrap_or("*"));
        self.update_or_add_node(&filter, &update);
    }

    pub fn remove_engine(&mut self, platform: Platform) -> bool {
        self.remove_node(&NodeFilter::new("engine").attribute("name", platform.as_str()))
    }

    /// `(name, spec)` of every root-level `<engine>`.
    pub fn engines(&self) -> Vec<(String, String)> {
        self.find_nodes(&NodeFilter::new("engine"))
            .into_iter()
            .map(|node| {
                (
                    self.tree.attribute(node, "name").unwrap_or("").to_string(),
                    self.tree.attribute(node, "spec").unwrap_or("").to_string(),
                )
            })
            .collect()
    }

    /// A platform counts as enabled unless its wrapper carries
    /// `<preference name="enabled" value="false">`.
    pub fn is_platform_enabled(&self, platform: Platform) -> bool {
        if self.is_errored() {
            return false;
        }
        self.get_preference("enabled", Some(platform), false)
            .is_none_or(|v| v != "false")
    }

    pub fn set_platform_enabled(&mut self, platform: Platform, enabled: bool) {
        let value = if enabled { "true" } else { "false" };
        self.set_preference("enabled", Some(value), Some(platform));
    }

    /// Names of the `<platform>` wrappers under the root, in document order.
    pub fn platforms(&self) -> Vec<String> {
        self.find_nodes(&NodeFilter::new("platform"))
            .into_iter()
            .filter_map(|node| self.tree.attribute(node, "name").map(String::from))
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Plugins
// ═══════════════════════════════════════════════════════════════════════════════

fn plugin_filter(name: &str) -> NodeFilter {
    NodeFilter::new("plugin").attribute("name", name)
}

impl ConfigDocument {
    /// Add or update `<plugin name=".." spec="..">` at the root.
    ///
    /// A plugin named by a git URL is pinned to that URL regardless of
    /// `spec`.  Without a spec, `*` is used.
    pub fn add_plugin(&mut self, name: &str, spec: Option<&str>) -> Option<NodeId> {
        let spec = if is_git_url(name) { name } else { spec.unwrap_or("*") };
        self.update_or_add_node(
            &plugin_filter(name),
            &NodeUpdate::new().attribute("name", name).attribute("spec", spec),
        )
    }

    pub fn remove_plugin(&mut self, name: &str) -> bool {
        self.remove_node(&plugin_filter(name))
    }

    pub fn find_plugin(&self, name: &str) -> Option<Plugin> {
        self.find_node(&plugin_filter(name))
            .map(|node| self.plugin_at(node))
    }

    pub fn find_all_plugins(&self) -> Vec<Plugin> {
        self.find_nodes(&NodeFilter::new("plugin"))
            .into_iter()
            .map(|node| self.plugin_at(node))
            .collect()
    }

    fn plugin_at(&self, node: NodeId) -> Plugin {
        let variables = self
            .tree
            .element_children(node)
            .filter(|&c| self.tree.name(c) == Some("variable"))
            .map(|c| {
                (
                    self.tree.attribute(c, "name").unwrap_or("").to_string(),
                    decode_entities(self.tree.attribute(c, "value").unwrap_or("")),
                )
            })
            .collect();

        Plugin {
            name: self.tree.attribute(node, "name").unwrap_or("").to_string(),
            spec: self.tree.attribute(node, "spec").map(String::from),
            variables,
        }
    }

    fn plugin_variable_node(&self, plugin: NodeId, name: &str) -> Option<NodeId> {
        self.tree.element_children(plugin).find(|&c| {
            self.tree.name(c) == Some("variable") && self.tree.attribute(c, "name") == Some(name)
        })
    }

    /// Set `<variable name=".." value="..">` under the named plugin, adding
    /// the plugin (spec `*`) if it is missing.  The value is stored
    /// entity-encoded.
    pub fn add_plugin_variable(&mut self, plugin: &str, name: &str, value: &str) {
        let plugin_node = match self.find_node(&plugin_filter(plugin)) {
            Some(node) => node,
            None => match self.add_plugin(plugin, None) {
                Some(node) => node,
                None => return,
            },
        };

        let variable = match self.plugin_variable_node(plugin_node, name) {
            Some(node) => node,
            None => {
                let node = self.tree.create_element("variable");
                self.tree.set_attribute(node, "name", name);
                self.tree.append_indented(plugin_node, node);
                node
            }
        };
        self.tree.set_attribute(variable, "value", &encode_entities(value));
    }

    /// Decoded variable value.  `None` when the plugin is absent, an empty
    /// string when only the variable is.
    pub fn find_plugin_variable(&self, plugin: &str, name: &str) -> Option<String> {
        let plugin_node = self.find_node(&plugin_filter(plugin))?;
        Some(
            self.plugin_variable_node(plugin_node, name)
                .and_then(|node| self.tree.attribute(node, "value"))
                .map(decode_entities)
                .unwrap_or_default(),
        )
    }

    pub fn remove_plugin_variable(&mut self, plugin: &str, name: &str) -> bool {
        let Some(plugin_node) = self.find_node(&plugin_filter(plugin)) else {
            return false;
        };
        match self.plugin_variable_node(plugin_node, name) {
            Some(node) => {
                self.tree.remove_indented(node);
                true
            }
            None => false,
        }
    }
}

/// Escape the five XML special characters as entities.
pub fn encode_entities(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Inverse of [`encode_entities`].
pub fn decode_entities(value: &str) -> String {
    value
        .replace("&apos;", "'")
        .replace("&quot;", "\"")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Environment
// ═══════════════════════════════════════════════════════════════════════════════

impl ConfigDocument {
    fn platform_environment(&self, platform: Platform) -> Environment {
        [Environment::CanvasPlus, Environment::WebViewPlus]
            .into_iter()
            .find(|env| {
                env.plugin_name(platform)
                    .is_some_and(|plugin| self.find_node(&plugin_filter(&plugin)).is_some())
            })
            .unwrap_or(Environment::WebView)
    }

    /// Environment for `platform`.  Without a platform, iOS and Android are
    /// compared and any disagreement reads as `WebView`.
    pub fn get_environment(&self, platform: Option<Platform>) -> Environment {
        match platform {
            Some(p) => self.platform_environment(p),
            None => {
                let ios = self.platform_environment(Platform::Ios);
                let android = self.platform_environment(Platform::Android);
                if ios == android { ios } else { Environment::WebView }
            }
        }
    }

    /// Switch `platform` (or iOS and Android) to `environment`.
    ///
    /// `WebView` strips both vendor plugins; without a platform it does so
    /// for every platform.
    pub fn set_environment(&mut self, environment: Environment, platform: Option<Platform>) {
        let targets: Vec<Platform> = match (platform, environment) {
            (Some(p), _) => vec![p],
            (None, Environment::WebView) => Platform::ALL.to_vec(),
            (None, _) => ENVIRONMENT_PLATFORMS.to_vec(),
        };

        for target in targets {
            for other in [Environment::CanvasPlus, Environment::WebViewPlus] {
                if other == environment {
                    continue;
                }
                if let Some(plugin) = other.plugin_name(target) {
                    self.remove_plugin(&plugin);
                }
            }
            if let Some(plugin) = environment.plugin_name(target) {
                self.add_plugin(&plugin, None);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
