use std::sync::Arc;

use super::touch::{ResourceTarget, TouchAction, TouchRequest, TouchWiring};

/// Label of the clickable control rendered by a touch view
pub const TOUCH_BUTTON_LABEL: &str = "Touch Resource";

/// Declarative UI tree handed to the host for rendering
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Container { children: Vec<Node> },
    Text(String),
    Button { label: String, on_activate: TouchAction },
}

impl Node {
    pub fn container(children: Vec<Node>) -> Self {
        Node::Container { children }
    }

    /// All clickable controls in the tree, depth first
    pub fn buttons(&self) -> Vec<&TouchAction> {
        let mut found = Vec::new();
        self.collect_buttons(&mut found);
        found
    }

    fn collect_buttons<'a>(&'a self, found: &mut Vec<&'a TouchAction>) {
        match self {
            Node::Container { children } => {
                for child in children {
                    child.collect_buttons(found);
                }
            }
            Node::Button { on_activate, .. } => found.push(on_activate),
            Node::Text(_) => {}
        }
    }

    /// Concatenated text content, buttons contribute their labels
    pub fn text(&self) -> String {
        match self {
            Node::Container { children } => children.iter().map(Node::text).collect(),
            Node::Text(text) => text.clone(),
            Node::Button { label, .. } => label.clone(),
        }
    }
}

/// What the host passes when it renders a view for a resource's detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewContext {
    pub resource: Option<ResourceTarget>,
}

impl ViewContext {
    pub fn for_resource(namespace: &str, name: &str) -> Self {
        Self {
            resource: Some(ResourceTarget {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
        }
    }
}

/// Produces a node tree each time the host renders the view
pub type ViewFactory = Arc<dyn Fn(&ViewContext) -> Node + Send + Sync>;

/// Registration slot and display settings of one touch view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchViewConfig {
    pub slug: String,
    pub group: String,
    pub kind: String,
    pub title: String,
    pub icon: Option<String>,
}

/// Builds a view with a single button that touches `slug` when activated
pub fn make_touch_view(slug: &str, wiring: &TouchWiring) -> ViewFactory {
    let slug = slug.to_string();
    let wiring = wiring.clone();
    Arc::new(move |context: &ViewContext| {
        let request = TouchRequest::new(slug.clone()).with_target(context.resource.clone());
        Node::container(vec![Node::Button {
            label: TOUCH_BUTTON_LABEL.to_string(),
            on_activate: TouchAction::new(request, wiring.clone()),
        }])
    })
}

/// Non-interactive variant showing a static greeting
pub fn make_text_view(slug: &str) -> ViewFactory {
    let text = format!("Hello World {slug}");
    Arc::new(move |_: &ViewContext| Node::container(vec![Node::Text(text.clone())]))
}
