use tracing::debug;

use crate::error::TreeError;

use super::types::{Node, NodeId, NodeKind, PathTree, Point};

const DELIMITER: char = '/';

impl PathTree {
    /// Build the node graph for every prefix of every input path.
    ///
    /// Paths sharing a prefix share the node for it. A segment that any path
    /// uses as a prefix is a directory, whatever order the paths come in.
    /// The first malformed path rejects the whole batch.
    pub fn build<I, S>(paths: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = PathTree::default();

        for (index, path) in paths.into_iter().enumerate() {
            let path = path.as_ref();
            let segments = split_path(index, path)?;
            tree.insert_segments(&segments);
        }

        debug!(
            nodes = tree.len(),
            roots = tree.roots.len(),
            "built path tree"
        );
        Ok(tree)
    }

    fn insert_segments(&mut self, segments: &[&str]) {
        let mut prefix = String::new();
        let mut parent: Option<NodeId> = None;
        let last = segments.len() - 1;

        for (depth, segment) in segments.iter().enumerate() {
            if depth > 0 {
                prefix.push(DELIMITER);
            }
            prefix.push_str(segment);

            let is_terminal = depth == last;
            let existing = self.index.get(&prefix).copied();
            let id = match existing {
                Some(id) => {
                    if !is_terminal {
                        self.promote_to_directory(id);
                    }
                    id
                }
                None => self.push_node(&prefix, segment, depth, is_terminal, parent),
            };

            if let Some(parent_id) = parent {
                let siblings = &mut self.node_mut(parent_id).children;
                if !siblings.contains(&id) {
                    siblings.push(id);
                }
            }
            parent = Some(id);
        }
    }

    fn push_node(
        &mut self,
        path: &str,
        name: &str,
        depth: usize,
        is_terminal: bool,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            path: path.to_string(),
            name: name.to_string(),
            kind: if is_terminal {
                NodeKind::Leaf
            } else {
                NodeKind::Directory
            },
            depth,
            order: 0,
            position: Point::default(),
            parent,
            children: Vec::new(),
        });
        self.index.insert(path.to_string(), id);
        if parent.is_none() {
            self.roots.push(id);
        }
        id
    }

    fn promote_to_directory(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        if node.kind == NodeKind::Leaf {
            debug!(path = %node.path, "leaf reused as a prefix; treating it as a directory");
            node.kind = NodeKind::Directory;
        }
    }
}

fn split_path(index: usize, path: &str) -> Result<Vec<&str>, TreeError> {
    if path.is_empty() {
        return Err(TreeError::EmptyPath { index });
    }
    let segments: Vec<&str> = path.split(DELIMITER).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(TreeError::EmptySegment {
            index,
            path: path.to_string(),
        });
    }
    Ok(segments)
}
