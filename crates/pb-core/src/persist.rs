//! Project persistence: the store contract, an in-memory store, and
//! normalization of projects loaded from JSON.
//!
//! Loading never rejects a structurally damaged project. Missing roots are
//! synthesized, orphans and cycle members are re-attached to the root,
//! children lists are rebuilt from `parentId`, and frames are raised to the
//! size floor. Nodes missing their `id`, `type` or frame fields are filled
//! in from the map key, the `container` type and zero geometry. Only
//! undecodable JSON is an error.

use crate::error::StoreError;
use crate::id::NodeId;
use crate::model::{Content, Frame, Node, NodeType, Project, Settings, Style};
use serde::Deserialize;
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap, HashSet};

pub type StoreResult<T> = Result<T, StoreError>;

/// CRUD over serialized projects, addressed by string id.
pub trait ProjectStore {
    /// Ids of every stored project, sorted.
    fn list(&self) -> StoreResult<Vec<String>>;
    /// The project's JSON text.
    fn get(&self, id: &str) -> StoreResult<String>;
    /// Store a new project. Fails if `id` is taken.
    fn create(&mut self, id: &str, json: &str) -> StoreResult<()>;
    /// Replace an existing project. Fails if `id` is unknown.
    fn update(&mut self, id: &str, json: &str) -> StoreResult<()>;
    fn delete(&mut self, id: &str) -> StoreResult<()>;

    /// Fetch and normalize a project.
    fn open(&self, id: &str) -> StoreResult<Project> {
        load_project(&self.get(id)?)
    }

    /// Create or update `id` with `project`.
    fn save(&mut self, id: &str, project: &Project) -> StoreResult<()> {
        let json = save_project(project)?;
        if self.list()?.iter().any(|existing| existing == id) {
            self.update(id, &json)
        } else {
            self.create(id, &json)
        }
    }
}

/// Keeps projects as named-field MessagePack blobs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn encode(json: &str) -> StoreResult<Vec<u8>> {
        let project = load_project(json)?;
        Ok(rmp_serde::to_vec_named(&project)?)
    }
}

impl ProjectStore for MemoryStore {
    fn list(&self) -> StoreResult<Vec<String>> {
        Ok(self.blobs.keys().cloned().collect())
    }

    fn get(&self, id: &str) -> StoreResult<String> {
        let blob = self
            .blobs
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let project: Project = rmp_serde::from_slice(blob)?;
        save_project(&project)
    }

    fn create(&mut self, id: &str, json: &str) -> StoreResult<()> {
        if self.blobs.contains_key(id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }
        let blob = Self::encode(json)?;
        self.blobs.insert(id.to_string(), blob);
        log::debug!("store: created {id}");
        Ok(())
    }

    fn update(&mut self, id: &str, json: &str) -> StoreResult<()> {
        if !self.blobs.contains_key(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let blob = Self::encode(json)?;
        self.blobs.insert(id.to_string(), blob);
        log::debug!("store: updated {id}");
        Ok(())
    }

    fn delete(&mut self, id: &str) -> StoreResult<()> {
        if self.blobs.remove(id).is_none() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        log::debug!("store: deleted {id}");
        Ok(())
    }
}

// ─── JSON load / save ────────────────────────────────────────────────────

/// Serialize a project to its JSON interchange form.
pub fn save_project(project: &Project) -> StoreResult<String> {
    Ok(serde_json::to_string(project)?)
}

/// A project as found on the wire, before repair.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProject {
    #[serde(default)]
    root_node_id: Option<NodeId>,
    #[serde(default)]
    nodes_by_id: HashMap<NodeId, RawNode>,
    #[serde(default)]
    settings: Settings,
}

/// A node as found on the wire. Only the map key is trusted for identity;
/// everything else may be missing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(default)]
    id: Option<NodeId>,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    node_type: Option<String>,
    #[serde(default)]
    parent_id: Option<NodeId>,
    #[serde(default)]
    children: SmallVec<[NodeId; 4]>,
    #[serde(default)]
    frame: Frame,
    #[serde(default)]
    style: Style,
    #[serde(default)]
    content: Content,
}

impl RawNode {
    /// Build the node stored under `key`. Returns `None` for the type when
    /// the tag is missing or unknown.
    fn into_node(self, key: NodeId) -> (Node, Option<NodeType>) {
        if let Some(id) = self.id
            && id != key
        {
            log::debug!("normalize: node stored under {key} claimed id {id}");
        }
        let node_type = self.node_type.as_deref().and_then(NodeType::parse);
        if node_type.is_none() {
            log::debug!(
                "normalize: {key} has unknown type {:?}, using container",
                self.node_type
            );
        }
        let node = Node {
            id: key,
            name: self.name,
            node_type: node_type.unwrap_or(NodeType::Container),
            parent_id: self.parent_id,
            children: self.children,
            frame: self.frame,
            style: self.style,
            content: self.content,
        };
        (node, node_type)
    }
}

/// Parse a JSON project and repair it until [`Project::validate`] holds.
pub fn load_project(json: &str) -> StoreResult<Project> {
    let raw: RawProject = serde_json::from_str(json)?;
    Ok(normalize(raw))
}

fn sorted_ids(nodes: &HashMap<NodeId, Node>) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = nodes.keys().copied().collect();
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    ids
}

fn normalize(raw: RawProject) -> Project {
    let settings = raw.settings;
    let mut untyped = HashSet::new();
    let mut nodes: HashMap<NodeId, Node> = raw
        .nodes_by_id
        .into_iter()
        .map(|(key, raw)| {
            let (node, node_type) = raw.into_node(key);
            if node_type.is_none() {
                untyped.insert(key);
            }
            (key, node)
        })
        .collect();

    let root_id = match raw.root_node_id {
        Some(id) if nodes.contains_key(&id) => id,
        _ if nodes.contains_key(&NodeId::root()) => NodeId::root(),
        dangling => {
            let id = dangling.unwrap_or_else(NodeId::root);
            log::debug!("normalize: synthesized root {id}");
            let mut page = Node::new(
                id,
                NodeType::Page,
                Frame::new(0.0, 0.0, settings.canvas_width, settings.canvas_height),
            );
            page.name = "Page".into();
            nodes.insert(id, page);
            id
        }
    };

    if untyped.contains(&root_id)
        && let Some(root) = nodes.get_mut(&root_id)
    {
        root.node_type = NodeType::Page;
    }

    let ids = sorted_ids(&nodes);

    // Point every non-root node at an existing parent other than itself.
    for &id in &ids {
        let Some(node) = nodes.get(&id) else { continue };
        let fixed = if id == root_id {
            None
        } else {
            match node.parent_id {
                Some(p) if p != id && nodes.contains_key(&p) => Some(p),
                _ => {
                    log::debug!("normalize: re-attached orphan {id} to root");
                    Some(root_id)
                }
            }
        };
        if let Some(node) = nodes.get_mut(&id) {
            node.parent_id = fixed;
        }
    }

    // Break cycles: any node whose parent chain never reaches the root
    // is detached to the root, which also frees the rest of its loop.
    for &id in &ids {
        let mut seen = HashSet::new();
        let mut current = id;
        let reaches_root = loop {
            if current == root_id {
                break true;
            }
            if !seen.insert(current) {
                break false;
            }
            match nodes.get(&current).and_then(|n| n.parent_id) {
                Some(p) => current = p,
                None => break false,
            }
        };
        if !reaches_root && let Some(node) = nodes.get_mut(&id) {
            log::debug!("normalize: broke parent cycle at {id}");
            node.parent_id = Some(root_id);
        }
    }

    // Rebuild children from parentId, keeping the stored order where it
    // agrees and appending the rest.
    let mut rebuilt: HashMap<NodeId, SmallVec<[NodeId; 4]>> = HashMap::new();
    for &id in &ids {
        let Some(node) = nodes.get(&id) else { continue };
        let list = rebuilt.entry(id).or_default();
        for &child in &node.children {
            if !list.contains(&child) && nodes.get(&child).and_then(|c| c.parent_id) == Some(id) {
                list.push(child);
            }
        }
    }
    for &id in &ids {
        if let Some(parent) = nodes.get(&id).and_then(|n| n.parent_id)
            && let Some(list) = rebuilt.get_mut(&parent)
            && !list.contains(&id)
        {
            list.push(id);
        }
    }
    for (id, children) in rebuilt {
        if let Some(node) = nodes.get_mut(&id) {
            if node.children != children {
                log::debug!("normalize: rebuilt children of {id}");
            }
            node.children = children;
        }
    }

    for node in nodes.values_mut() {
        node.frame = node.frame.clamped();
    }

    Project {
        root_node_id: root_id,
        nodes_by_id: nodes,
        settings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_becomes_fresh_project() {
        let p = load_project("{}").unwrap();
        assert_eq!(p.validate(), Ok(()));
        assert_eq!(p.len(), 1);
        assert_eq!(p.root().unwrap().node_type, NodeType::Page);
        assert_eq!(p.root().unwrap().frame.width, 1280.0);
    }

    #[test]
    fn store_crud() {
        let mut store = MemoryStore::new();
        let project = Project::new();
        store.save("home", &project).unwrap();
        assert_eq!(store.list().unwrap(), vec!["home".to_string()]);
        assert_eq!(store.open("home").unwrap(), project);

        assert!(matches!(
            store.create("home", "{}"),
            Err(StoreError::AlreadyExists(_))
        ));
        assert!(matches!(store.update("nope", "{}"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.create("bad", "not json"), Err(StoreError::Json(_))));

        store.delete("home").unwrap();
        assert!(matches!(store.get("home"), Err(StoreError::NotFound(_))));
    }
}
