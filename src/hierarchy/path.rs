use uuid::Uuid;

use crate::database::store::{HierarchyStore, StoreError};

/// Derived hierarchy placement for a record about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub hierarchy_path: String,
    pub admin_level: i32,
}

impl Placement {
    pub fn root() -> Self {
        Self {
            hierarchy_path: String::new(),
            admin_level: 0,
        }
    }
}

/// Derive `hierarchy_path` and `admin_level` from the intended parent.
///
/// This is the only producer of placement fields; the service write path
/// calls it immediately before every insert so no caller can persist a stale
/// path. A *missing* parent (dangling reference) falls back to a root
/// placement; a storage failure aborts the save.
pub async fn resolve_placement(
    store: &dyn HierarchyStore,
    parent_admin: Option<Uuid>,
) -> Result<Placement, StoreError> {
    let Some(parent_id) = parent_admin else {
        return Ok(Placement::root());
    };

    match store.user_by_id(parent_id).await? {
        Some(parent) => Ok(Placement {
            hierarchy_path: child_path(&parent.hierarchy_path, parent_id),
            admin_level: parent.admin_level + 1,
        }),
        None => Ok(Placement::root()),
    }
}

/// Path of a child whose parent has `parent_path` and id `parent_id`.
pub fn child_path(parent_path: &str, parent_id: Uuid) -> String {
    if parent_path.is_empty() {
        parent_id.to_string()
    } else {
        format!("{}/{}", parent_path, parent_id)
    }
}

/// Ancestor admin ids encoded in a path, root first. Malformed segments are
/// skipped rather than failing the whole parse.
pub fn ancestor_ids(path: &str) -> Vec<Uuid> {
    path.split('/')
        .filter_map(|segment| Uuid::parse_str(segment).ok())
        .collect()
}

/// Exact id-segment membership test, used by subtree listings.
pub fn path_contains(path: &str, admin_id: Uuid) -> bool {
    path.split('/').any(|segment| {
        Uuid::parse_str(segment).map(|id| id == admin_id).unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_of_root_is_bare_parent_id() {
        let parent = Uuid::new_v4();
        assert_eq!(child_path("", parent), parent.to_string());
    }

    #[test]
    fn child_path_appends_parent_id() {
        let grandparent = Uuid::new_v4();
        let parent = Uuid::new_v4();
        let base = grandparent.to_string();
        assert_eq!(
            child_path(&base, parent),
            format!("{}/{}", grandparent, parent)
        );
    }

    #[test]
    fn ancestor_ids_roundtrip() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let path = format!("{}/{}", a, b);
        assert_eq!(ancestor_ids(&path), vec![a, b]);
        assert!(ancestor_ids("").is_empty());
    }

    #[test]
    fn path_contains_matches_whole_segments_only() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let path = format!("{}/{}", a, b);
        assert!(path_contains(&path, a));
        assert!(path_contains(&path, b));
        assert!(!path_contains(&path, Uuid::new_v4()));
        assert!(!path_contains("", a));
    }

    mod placement {
        use super::*;
        use chrono::Utc;

        use crate::database::models::{Role, User};
        use crate::database::MemoryStore;

        fn admin(parent: Option<&User>) -> User {
            let now = Utc::now();
            let id = Uuid::new_v4();
            let (path, level) = match parent {
                Some(p) => (child_path(&p.hierarchy_path, p.id), p.admin_level + 1),
                None => (String::new(), 0),
            };
            User {
                id,
                role: Role::Admin,
                name: "admin".to_string(),
                email: format!("{}@college.test", id.simple()),
                department: None,
                password_hash: "x".to_string(),
                parent_admin: parent.map(|p| p.id),
                created_by: parent.map(|p| p.id),
                admin_level: level,
                hierarchy_path: path,
                created_at: now,
                updated_at: now,
            }
        }

        #[tokio::test]
        async fn no_parent_yields_root_placement() {
            let store = MemoryStore::new();
            let placement = resolve_placement(&store, None).await.unwrap();
            assert_eq!(placement, Placement::root());
        }

        #[tokio::test]
        async fn placement_follows_parent_chain() {
            let store = MemoryStore::new();
            let root = admin(None);
            let s1 = admin(Some(&root));
            store.insert_user(root.clone()).await.unwrap();
            store.insert_user(s1.clone()).await.unwrap();

            let placement = resolve_placement(&store, Some(root.id)).await.unwrap();
            assert_eq!(placement.admin_level, 1);
            assert_eq!(placement.hierarchy_path, root.id.to_string());

            let placement = resolve_placement(&store, Some(s1.id)).await.unwrap();
            assert_eq!(placement.admin_level, 2);
            assert_eq!(
                placement.hierarchy_path,
                format!("{}/{}", root.id, s1.id)
            );
        }

        #[tokio::test]
        async fn dangling_parent_falls_back_to_root() {
            let store = MemoryStore::new();
            let placement = resolve_placement(&store, Some(Uuid::new_v4())).await.unwrap();
            assert_eq!(placement, Placement::root());
        }
    }
}
