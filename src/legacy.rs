//! Rewrites the legacy `cocoon:`-prefixed dialect into plain Cordova markup.
//!
//! Runs once, right after parsing, so every accessor only ever sees
//! `<platform>`, `<plugin>` and `<variable>`.

use crate::config::ConfigDocument;
use crate::url::is_git_url;
use crate::xml::NodeId;

const LEGACY_PREFIX: &str = "cocoon:";

impl ConfigDocument {
    pub(crate) fn migrate_legacy(&mut self) {
        self.migrate_platforms();
        self.migrate_plugins();
        self.repair_git_plugin_specs();
        self.drop_unused_legacy_namespace();
    }

    fn attribute_string(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree.attribute(node, name).map(String::from)
    }

    /// `<cocoon:platform name version enabled>` becomes `<platform name>`,
    /// preceded by `<engine>` when a version was pinned.
    fn migrate_platforms(&mut self) {
        for old in self.tree.elements_by_name("cocoon:platform") {
            let name = self.attribute_string(old, "name").unwrap_or_default();
            let version = self.attribute_string(old, "version");
            let enabled = self.attribute_string(old, "enabled");

            let platform = self.tree.create_element("platform");
            self.tree.set_attribute(platform, "name", &name);
            self.tree.insert_before_indented(old, platform);

            if let Some(version) = &version {
                let engine = self.tree.create_element("engine");
                self.tree.set_attribute(engine, "name", &name);
                self.tree.set_attribute(engine, "spec", version);
                self.tree.insert_before_indented(platform, engine);
            }

            let children: Vec<NodeId> = self.tree.element_children(old).collect();
            for child in children {
                self.tree.append_indented(platform, child);
            }

            if let Some(enabled) = &enabled {
                let preference = self.tree.create_element("preference");
                self.tree.set_attribute(preference, "name", "enabled");
                self.tree.set_attribute(preference, "value", enabled);
                self.tree.append_indented(platform, preference);
            }

            self.tree.remove_indented(old);
            log::debug!("migrated legacy platform '{name}' (engine: {version:?})");
        }
    }

    /// `<cocoon:plugin name version>` becomes `<plugin name spec>`; its
    /// `param` / `cocoon:param` children become `<variable>`.
    fn migrate_plugins(&mut self) {
        for old in self.tree.elements_by_name("cocoon:plugin") {
            let name = self.attribute_string(old, "name").unwrap_or_default();
            let spec = if is_git_url(&name) {
                Some(name.clone())
            } else {
                self.attribute_string(old, "version")
            };

            let plugin = self.tree.create_element("plugin");
            self.tree.set_attribute(plugin, "name", &name);
            if let Some(spec) = &spec {
                self.tree.set_attribute(plugin, "spec", spec);
            }
            self.tree.insert_before_indented(old, plugin);

            let children: Vec<NodeId> = self.tree.element_children(old).collect();
            for child in children {
                match self.tree.name(child) {
                    Some("param") | Some("cocoon:param") => {
                        let variable = self.tree.create_element("variable");
                        for attribute in ["name", "value"] {
                            if let Some(value) = self.attribute_string(child, attribute) {
                                self.tree.set_attribute(variable, attribute, &value);
                            }
                        }
                        self.tree.append_indented(plugin, variable);
                    }
                    _ => self.tree.append_indented(plugin, child),
                }
            }

            self.tree.remove_indented(old);
            log::debug!("migrated legacy plugin '{name}' (spec: {spec:?})");
        }
    }

    /// Plugins named by a git URL must use that URL as their spec.
    fn repair_git_plugin_specs(&mut self) {
        for plugin in self.tree.elements_by_name("plugin") {
            let Some(name) = self.attribute_string(plugin, "name") else {
                continue;
            };
            if is_git_url(&name) && self.tree.attribute(plugin, "spec") != Some(name.as_str()) {
                self.tree.set_attribute(plugin, "spec", &name);
                log::debug!("pinned git plugin '{name}' to its url");
            }
        }
    }

    fn drop_unused_legacy_namespace(&mut self) {
        let Some(root) = self.root else { return };
        if self.tree.attribute(root, "xmlns:cocoon").is_none() {
            return;
        }
        let still_used = self.tree.elements().into_iter().any(|id| {
            self.tree.name(id).is_some_and(|n| n.starts_with(LEGACY_PREFIX))
                || self
                    .tree
                    .attributes(id)
                    .iter()
                    .any(|(k, _)| k.starts_with(LEGACY_PREFIX))
        });
        if !still_used {
            self.tree.remove_attribute(root, "xmlns:cocoon");
        }
    }
}
