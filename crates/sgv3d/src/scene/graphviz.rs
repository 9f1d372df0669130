//! Graphviz export for debugging scene layouts

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::path::Path;

use slotmap::Key;

use crate::scene::graph::SceneGraph;
use crate::scene::node::{NodeId, NodeKind};

impl SceneGraph {
    /// DOT description of the tree under the root
    ///
    /// Nodes are emitted breadth-first with one edge per parent/child link.
    /// A graph with no root produces an empty digraph.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph G {\n");
        let mut queue: VecDeque<NodeId> = self.root().into_iter().collect();

        while let Some(id) = queue.pop_front() {
            let Some(node) = self.get(id) else { continue };
            let _ = writeln!(out, "    n{} [label=\"{}\"];", vertex(id), label(node.kind(), node.name()));
            for &child in node.children() {
                let _ = writeln!(out, "    n{} -> n{};", vertex(id), vertex(child));
                queue.push_back(child);
            }
        }

        out.push_str("}\n");
        out
    }

    /// Write [`to_dot`](Self::to_dot) output to `path`
    pub fn write_dot(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_dot())?;
        log::info!("Wrote scene graph to {}", path.display());
        Ok(())
    }
}

fn vertex(id: NodeId) -> u64 {
    id.data().as_ffi()
}

fn label(kind: &NodeKind, name: Option<&str>) -> String {
    let base = match kind {
        NodeKind::Geometry(geometry) => {
            let range = geometry.mesh.range();
            format!("{} {},{}", kind.label(), range.first, range.count)
        }
        _ => kind.label().to_string(),
    };
    match name {
        Some(name) => format!("{base}\\n{}", escape(name)),
        None => base,
    }
}

/// Backslash-escape the characters that end or alter a quoted DOT string
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4;

    #[test]
    fn test_dot_lists_nodes_breadth_first() {
        let mut graph = SceneGraph::new();
        let root = graph.add_group();
        let t = graph.add_transform(Mat4::identity());
        let a = graph.add_animation(|_t: f64| Mat4::identity());
        let g = graph.add_group();
        graph.add_children(root, &[t, g]).unwrap();
        graph.add_child(t, a).unwrap();
        graph.set_root(root).unwrap();

        let dot = graph.to_dot();
        assert!(dot.starts_with("digraph G {\n"));
        assert!(dot.ends_with("}\n"));
        assert_eq!(dot.matches("->").count(), 3);

        let trans = dot.find("Trans.").unwrap();
        let anim = dot.find("Anim.").unwrap();
        assert!(trans < anim);
        assert!(dot.find(&format!("n{} -> n{}", vertex(root), vertex(g))).unwrap() < anim);
    }

    #[test]
    fn test_dot_without_root_is_empty_graph() {
        let graph = SceneGraph::new();
        assert_eq!(graph.to_dot(), "digraph G {\n}\n");
    }

    #[test]
    fn test_dot_escapes_names() {
        let mut graph = SceneGraph::new();
        let root = graph.add_named("say \"hi\" C:\\", NodeKind::Group);
        graph.set_root(root).unwrap();

        let dot = graph.to_dot();
        assert!(dot.contains(r#"[label="Group\nsay \"hi\" C:\\"];"#));
    }
}
