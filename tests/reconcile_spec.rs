use rallyman::gateway::{MemoryGateway, PlatformGateway, QueryFilter};
use rallyman::models::*;
use rallyman::provision::{self, ProvisionError};

async fn create_project(gateway: &MemoryGateway, name: &str) -> Entity {
    gateway
        .create_entity(&EntityDraft::new(name, EntityType::Project), false)
        .await
        .expect("Failed to create project")
}

async fn create_view(
    gateway: &MemoryGateway,
    name: &str,
    parent: &EntityId,
    scope: &[&EntityId],
) -> Entity {
    let mut draft = EntityDraft::new(name, EntityType::EntityView).with_parent(parent.clone());
    draft.scope_ids = scope.iter().map(|id| id.bare().to_string()).collect();
    gateway
        .create_entity(&draft, false)
        .await
        .expect("Failed to create view")
}

async fn annotate(gateway: &MemoryGateway, id: &EntityId, key: &str, value: AnnotationValue) {
    let mut entity = gateway.get_entity(id).await.expect("Failed to fetch entity");
    entity.annotations.insert(key.to_string(), value);
    gateway
        .update_entity(&entity)
        .await
        .expect("Failed to update entity");
}

mod resolver {
    use super::*;

    #[tokio::test]
    async fn resolving_twice_yields_the_same_entity() {
        let gateway = MemoryGateway::new();
        let root = create_project(&gateway, "Root").await;
        let before = gateway.created_entities();

        let draft = EntityDraft::new("Data", EntityType::Folder).with_parent(root.id.clone());
        let first = provision::find_or_create(&gateway, &draft)
            .await
            .expect("first resolve");
        let second = provision::find_or_create(&gateway, &draft)
            .await
            .expect("second resolve");

        assert_eq!(first.id, second.id);
        assert_eq!(gateway.created_entities() - before, 1);
    }

    #[tokio::test]
    async fn a_type_mismatch_is_fatal() {
        let gateway = MemoryGateway::new();
        let root = create_project(&gateway, "Root").await;
        gateway
            .create_entity(
                &EntityDraft::new("Data", EntityType::Folder).with_parent(root.id.clone()),
                false,
            )
            .await
            .expect("seed folder");

        let draft = EntityDraft::new("Data", EntityType::TableSchema).with_parent(root.id.clone());
        let result = provision::find_or_create(&gateway, &draft).await;

        assert!(matches!(result, Err(ProvisionError::TypeMismatch { .. })));
    }
}

mod scope {
    use super::*;

    #[tokio::test]
    async fn overlapping_merges_stay_duplicate_free() {
        let gateway = MemoryGateway::new();
        let root = create_project(&gateway, "Root").await;
        let a = create_project(&gateway, "A").await;
        let b = create_project(&gateway, "B").await;
        let view = create_view(&gateway, "View", &root.id, &[]).await;

        provision::merge_scope(&gateway, &view.id, &[a.id.clone(), b.id.clone()])
            .await
            .expect("first merge");
        provision::merge_scope(&gateway, &view.id, &[b.id.clone(), a.id.clone()])
            .await
            .expect("second merge");

        let stored = gateway.get_entity(&view.id).await.expect("fetch view");
        assert_eq!(stored.scope_ids.len(), 2);
    }

    #[tokio::test]
    async fn prefixed_and_bare_forms_of_one_id_count_once() {
        let gateway = MemoryGateway::new();
        let root = create_project(&gateway, "Root").await;
        let a = create_project(&gateway, "A").await;
        // Seed the scope with the bare form, then merge the prefixed form.
        let view = create_view(&gateway, "View", &root.id, &[&a.id]).await;

        provision::merge_scope(&gateway, &view.id, &[a.id.clone()])
            .await
            .expect("merge");

        let stored = gateway.get_entity(&view.id).await.expect("fetch view");
        assert_eq!(stored.scope_ids, vec![a.id.bare().to_string()]);
    }

    #[tokio::test]
    async fn membership_only_grows() {
        let gateway = MemoryGateway::new();
        let root = create_project(&gateway, "Root").await;
        let a = create_project(&gateway, "A").await;
        let b = create_project(&gateway, "B").await;
        let view = create_view(&gateway, "View", &root.id, &[]).await;

        provision::merge_scope(&gateway, &view.id, &[a.id.clone()])
            .await
            .expect("first merge");
        provision::merge_scope(&gateway, &view.id, &[b.id.clone()])
            .await
            .expect("second merge");

        let stored = gateway.get_entity(&view.id).await.expect("fetch view");
        assert!(stored.scope_ids.contains(&a.id.bare().to_string()));
        assert!(stored.scope_ids.contains(&b.id.bare().to_string()));
    }
}

mod locator {
    use super::*;

    /// Root -> (A, B); A -> (Leaf). The predicate target sits on Leaf.
    async fn build_tree(gateway: &MemoryGateway) -> (Entity, Entity) {
        let root = create_project(gateway, "Root").await;
        let a = create_project(gateway, "A").await;
        let b = create_project(gateway, "B").await;
        let leaf = create_project(gateway, "Leaf").await;
        annotate(gateway, &leaf.id, keys::RALLY, AnnotationValue::Int(9)).await;

        let view_a = create_view(gateway, "A children", &a.id, &[&leaf.id]).await;
        let view_root = create_view(gateway, "Root children", &root.id, &[&a.id, &b.id]).await;
        annotate(
            gateway,
            &a.id,
            keys::CHILDREN,
            AnnotationValue::from(view_a.id.as_str()),
        )
        .await;
        annotate(
            gateway,
            &root.id,
            keys::CHILDREN,
            AnnotationValue::from(view_root.id.as_str()),
        )
        .await;

        (root, leaf)
    }

    #[tokio::test]
    async fn finds_the_matching_leaf_depth_first() {
        let gateway = MemoryGateway::new();
        let (root, leaf) = build_tree(&gateway).await;

        let hit = provision::find_in_hierarchy(&gateway, &root.id, |node| {
            node.annotations.get(keys::RALLY) == Some(&AnnotationValue::Int(9))
        })
        .await
        .expect("traverse");

        assert_eq!(hit.expect("should find the leaf").id, leaf.id);
    }

    #[tokio::test]
    async fn stops_at_the_first_match() {
        let gateway = MemoryGateway::new();
        let (root, _leaf) = build_tree(&gateway).await;
        let before = gateway.entity_reads();

        // "A" is the first child in result order and matches by name; the
        // traversal must never fetch "B" or descend into the leaf view.
        let hit = provision::find_in_hierarchy(&gateway, &root.id, |node| node.name == "A")
            .await
            .expect("traverse");

        assert_eq!(hit.expect("should find A").name, "A");
        assert_eq!(gateway.entity_reads() - before, 2);
    }

    #[tokio::test]
    async fn returns_none_when_nothing_matches() {
        let gateway = MemoryGateway::new();
        let (root, _leaf) = build_tree(&gateway).await;

        let hit = provision::find_in_hierarchy(&gateway, &root.id, |node| {
            node.annotations.get(keys::RALLY) == Some(&AnnotationValue::Int(42))
        })
        .await
        .expect("traverse");

        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn two_identity_matches_in_a_view_are_fatal() {
        let gateway = MemoryGateway::new();
        let root = create_project(&gateway, "Root").await;
        let a = create_project(&gateway, "Rally 9").await;
        let b = create_project(&gateway, "Rally 9 again").await;
        annotate(&gateway, &a.id, keys::RALLY, AnnotationValue::Int(9)).await;
        annotate(&gateway, &b.id, keys::RALLY, AnnotationValue::Int(9)).await;
        let view = create_view(&gateway, "Rallies", &root.id, &[&a.id, &b.id]).await;

        let filter = QueryFilter::new().eq(keys::RALLY, 9u32);
        let result = provision::find_unique(&gateway, &view.id, &filter, "rally project").await;

        assert!(matches!(
            result,
            Err(ProvisionError::DuplicateEntity { count: 2, .. })
        ));
    }
}

mod folders {
    use super::*;

    fn spec() -> Vec<FolderEntry> {
        vec![
            FolderEntry::new(".", &["Timeline", "Data"]),
            FolderEntry::new("./Data", &["Auxiliary"]),
        ]
    }

    #[tokio::test]
    async fn materializes_the_nested_spec() {
        let gateway = MemoryGateway::new();
        let root = create_project(&gateway, "Sprint").await;

        let mapping = provision::materialize(&gateway, &root.id, &spec())
            .await
            .expect("materialize");

        assert_eq!(mapping["."], root.id);
        let aux = gateway
            .get_entity(&mapping["./Data/Auxiliary"])
            .await
            .expect("fetch Auxiliary");
        assert_eq!(aux.parent_id.as_ref(), Some(&mapping["./Data"]));
        assert!(mapping.contains_key("./Timeline"));
    }

    #[tokio::test]
    async fn a_second_run_creates_nothing_and_returns_the_same_mapping() {
        let gateway = MemoryGateway::new();
        let root = create_project(&gateway, "Sprint").await;

        let first = provision::materialize(&gateway, &root.id, &spec())
            .await
            .expect("first run");
        let created = gateway.created_entities();
        let second = provision::materialize(&gateway, &root.id, &spec())
            .await
            .expect("second run");

        assert_eq!(first, second);
        assert_eq!(gateway.created_entities(), created);
    }

    #[tokio::test]
    async fn an_entry_without_its_parent_is_rejected() {
        let gateway = MemoryGateway::new();
        let root = create_project(&gateway, "Sprint").await;
        let spec = vec![FolderEntry::new("./Data/Deep", &[])];

        let result = provision::materialize(&gateway, &root.id, &spec).await;

        assert!(matches!(
            result,
            Err(ProvisionError::UnrootedFolder { .. })
        ));
    }
}
