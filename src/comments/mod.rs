//! utterances comment widget
//!
//! The widget is a script element placed inside an anchor node. Mounting
//! injects the script into the anchor found by id; the returned
//! [`MountedWidget`] removes it again when dropped or retargeted, so the
//! anchor never carries two widgets.

use crate::config::CommentsConfig;
use crate::helpers::html_escape;

/// utterances client script
pub const CLIENT_SCRIPT: &str = "https://utteranc.es/client.js";

/// A minimal element tree, enough to place and serialize the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Depth-first search for the element with the given id
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.attr("id") == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.attr("id") == Some(id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_by_id_mut(id))
    }

    /// Serialize to HTML, escaping attribute values
    pub fn to_html(&self) -> String {
        let mut html = format!("<{}", self.tag);
        for (name, value) in &self.attrs {
            if value.is_empty() {
                html.push_str(&format!(" {}", name));
            } else {
                html.push_str(&format!(r#" {}="{}""#, name, html_escape(value)));
            }
        }
        html.push('>');
        for child in &self.children {
            html.push_str(&child.to_html());
        }
        html.push_str(&format!("</{}>", self.tag));
        html
    }
}

impl CommentsConfig {
    /// The script element utterances expects
    pub fn script(&self) -> Element {
        Element::new("script")
            .with_attr("src", CLIENT_SCRIPT)
            .with_attr("async", "")
            .with_attr("repo", &self.repo)
            .with_attr("issue-term", &self.issue_term)
            .with_attr("label", &self.label)
            .with_attr("theme", &self.theme)
            .with_attr("crossorigin", "anonymous")
    }

    /// Inject the widget into the anchor with `anchor_id` under `root`
    ///
    /// Returns `None`, leaving `root` untouched, when the anchor is missing.
    pub fn mount<'a>(&self, root: &'a mut Element, anchor_id: &str) -> Option<MountedWidget<'a>> {
        let anchor = root.find_by_id_mut(anchor_id)?;
        anchor.children.push(self.script());
        tracing::debug!("Mounted comments on #{}", anchor_id);

        Some(MountedWidget {
            root,
            script: self.script(),
            anchor_id: Some(anchor_id.to_string()),
        })
    }
}

/// A widget attached to an anchor; detaches on drop
#[derive(Debug)]
pub struct MountedWidget<'a> {
    root: &'a mut Element,
    script: Element,
    anchor_id: Option<String>,
}

impl MountedWidget<'_> {
    /// The tree with the widget in place
    pub fn root(&self) -> &Element {
        &*self.root
    }

    /// The anchor currently holding the widget, if any
    pub fn anchor_id(&self) -> Option<&str> {
        self.anchor_id.as_deref()
    }

    /// Move the widget to another anchor, detaching from the current one first
    ///
    /// Returns false, leaving the widget detached, when the new anchor is missing.
    pub fn retarget(&mut self, anchor_id: &str) -> bool {
        self.detach();
        match self.root.find_by_id_mut(anchor_id) {
            Some(anchor) => {
                anchor.children.push(self.script.clone());
                self.anchor_id = Some(anchor_id.to_string());
                true
            }
            None => false,
        }
    }

    fn detach(&mut self) {
        let Some(id) = self.anchor_id.take() else {
            return;
        };
        if let Some(anchor) = self.root.find_by_id_mut(&id) {
            anchor.children.retain(|child| *child != self.script);
            tracing::debug!("Detached comments from #{}", id);
        }
    }
}

impl Drop for MountedWidget<'_> {
    fn drop(&mut self) {
        self.detach();
    }
}
