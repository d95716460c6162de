use crate::player::PlayerId;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    WildCard,
    Named(String),
}

#[derive(Debug, Clone)]
struct PermissionNode {
    path: Vec<PathSegment>,
    value: bool,
}

impl PermissionNode {
    fn parse(name: &str, value: bool) -> PermissionNode {
        let path = name
            .split('.')
            .map(|s| match s {
                "*" => PathSegment::WildCard,
                s => PathSegment::Named(s.to_lowercase()),
            })
            .collect();
        PermissionNode { path, value }
    }

    fn matches(&self, str: &str) -> bool {
        let segments: Vec<&str> = str.split('.').collect();
        for (i, segment) in segments.iter().enumerate() {
            match self.path.get(i) {
                Some(PathSegment::WildCard) => return true,
                Some(PathSegment::Named(name)) => {
                    if !name.eq_ignore_ascii_case(segment) {
                        return false;
                    }
                }
                None => return false,
            }
        }
        self.path.len() == segments.len()
    }
}

/// Granted permission nodes for a single player. Nodes may end in a `*`
/// wildcard; the first matching node wins.
#[derive(Debug, Default, Clone)]
pub struct PlayerPermissions {
    nodes: Vec<PermissionNode>,
}

impl PlayerPermissions {
    pub fn get_node_val(&self, name: &str) -> Option<bool> {
        self.nodes
            .iter()
            .find(|node| node.matches(name))
            .map(|node| node.value)
    }

    /// Adds a node, replacing any node with the same path.
    pub fn insert(&mut self, name: &str, value: bool) {
        let node = PermissionNode::parse(name, value);
        match self.nodes.iter_mut().find(|n| n.path == node.path) {
            Some(existing) => existing.value = value,
            None => self.nodes.push(node),
        }
    }
}

/// In-process permission registry used by hosts that have no permission
/// system of their own.
#[derive(Debug, Default, Clone)]
pub struct PermissionRegistry {
    registered: FxHashSet<String>,
    players: FxHashMap<PlayerId, PlayerPermissions>,
    admins: FxHashSet<PlayerId>,
}

impl PermissionRegistry {
    pub fn register(&mut self, node: &str) {
        self.registered.insert(node.to_lowercase());
    }

    pub fn is_registered(&self, node: &str) -> bool {
        self.registered.contains(&node.to_lowercase())
    }

    pub fn grant(&mut self, player: PlayerId, node: &str) {
        self.players.entry(player).or_default().insert(node, true);
    }

    pub fn revoke(&mut self, player: PlayerId, node: &str) {
        self.players.entry(player).or_default().insert(node, false);
    }

    pub fn set_admin(&mut self, player: PlayerId, admin: bool) {
        if admin {
            self.admins.insert(player);
        } else {
            self.admins.remove(&player);
        }
    }

    pub fn has(&self, player: PlayerId, node: &str) -> bool {
        self.players
            .get(&player)
            .and_then(|perms| perms.get_node_val(node))
            .unwrap_or(false)
    }

    pub fn is_admin(&self, player: PlayerId) -> bool {
        self.admins.contains(&player)
    }
}
