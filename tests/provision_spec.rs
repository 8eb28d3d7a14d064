use rallyman::config::{ProvisionConfig, ADMIN_PERMISSIONS, DEFAULT_PERMISSIONS};
use rallyman::gateway::{MemoryGateway, PlatformGateway};
use rallyman::models::*;
use rallyman::provision::{self, ProvisionError};

struct Harness {
    gateway: MemoryGateway,
    config: ProvisionConfig,
}

/// Stand up the admin project, the three aggregation views, the wiki
/// templates, and the administrators' team, the way a deployment would be
/// bootstrapped before any rally exists.
async fn setup() -> Harness {
    let gateway = MemoryGateway::new();

    let root = gateway
        .create_entity(
            &EntityDraft::new("Rally Working Group", EntityType::Project),
            false,
        )
        .await
        .expect("Failed to create root project");

    let view = |name: &str| EntityDraft::new(name, EntityType::EntityView).with_parent(root.id.clone());
    let rally_view = gateway
        .create_entity(&view("Rallies"), false)
        .await
        .expect("Failed to create rally view");
    let sprint_view = gateway
        .create_entity(&view("Sprints"), false)
        .await
        .expect("Failed to create sprint view");
    let files_view = gateway
        .create_entity(&view("All Files"), false)
        .await
        .expect("Failed to create files view");

    let rally_template = gateway
        .create_entity(
            &EntityDraft::new("Rally Wiki Template", EntityType::WikiPage)
                .with_parent(root.id.clone()),
            false,
        )
        .await
        .expect("Failed to create rally template");
    let sprint_template = gateway
        .create_entity(
            &EntityDraft::new("Sprint Wiki Template", EntityType::WikiPage)
                .with_parent(root.id.clone()),
            false,
        )
        .await
        .expect("Failed to create sprint template");
    gateway.stash_markdown(
        &rally_template.id,
        "Welcome to Rally RALLY_NUMBER! Join teamId=RALLY_TEAM_ID",
    );
    gateway.stash_markdown(
        &sprint_template.id,
        "Rally team RALLY_TEAM_ID, sprint team SPRINT_TEAM_ID",
    );

    let admins = gateway
        .create_team(&TeamDraft {
            name: "Rally Administrators".to_string(),
            can_public_join: false,
        })
        .await
        .expect("Failed to create admin team");

    let config = ProvisionConfig {
        consortium: Some("Example Consortium".to_string()),
        root_project_id: root.id,
        rally_view_id: rally_view.id,
        sprint_view_id: sprint_view.id,
        all_files_view_id: files_view.id,
        admin_team_id: admins.id,
        admin_team_permissions: ADMIN_PERMISSIONS.to_vec(),
        default_rally_members: vec!["101".to_string(), "102".to_string()],
        default_power_user_members: vec!["103".to_string()],
        default_data_members: Vec::new(),
        rally_wiki_template_id: rally_template.id,
        sprint_wiki_template_id: sprint_template.id,
        sprint_folders: vec![
            FolderEntry::new(".", &["Timeline", "Data"]),
            FolderEntry::new("./Data", &["Auxiliary"]),
        ],
        posts: vec![PostTemplate {
            title: "Daily Discussion".to_string(),
            message_markdown: "Use this post for a daily checkin.".to_string(),
        }],
    };

    Harness { gateway, config }
}

mod create_rally {
    use super::*;

    #[tokio::test]
    async fn provisions_the_full_constellation() {
        let h = setup().await;
        let teams_before = h.gateway.created_teams();

        let rally = provision::create_rally(&h.gateway, &h.config, 9, None)
            .await
            .expect("create rally");

        assert_eq!(rally.number, 9);
        assert_eq!(rally.project.name, "Rally 9");
        assert_eq!(
            rally.project.annotations.get(keys::RALLY),
            Some(&AnnotationValue::Int(9))
        );

        // One rally team and one power users team, members invited as managers.
        assert_eq!(h.gateway.created_teams() - teams_before, 2);
        let team = h
            .gateway
            .get_team_by_name("Rally 9")
            .await
            .expect("rally team exists");
        h.gateway
            .get_team_by_name("Rally 9 Power Users")
            .await
            .expect("power users team exists");
        assert!(h.gateway.is_member(&team.id, "101"));
        assert!(h.gateway.is_member(&team.id, "102"));

        // Admin and rally teams hold their configured grants on the project.
        assert_eq!(
            h.gateway.grants_for(rally.id(), &h.config.admin_team_id),
            Some(ADMIN_PERMISSIONS.to_vec())
        );
        assert_eq!(
            h.gateway.grants_for(rally.id(), &team.id),
            Some(DEFAULT_PERMISSIONS.to_vec())
        );

        // The wiki was instantiated with the placeholder tokens replaced.
        let wiki = h.gateway.get_wiki(rally.id()).await.expect("wiki set");
        assert!(wiki.markdown.contains("Rally 9!"));
        assert!(wiki.markdown.contains(&team.id));
        assert!(!wiki.markdown.contains("RALLY_NUMBER"));

        // Registered in the admin rally view exactly once.
        let view = h
            .gateway
            .get_entity(&h.config.rally_view_id)
            .await
            .expect("fetch view");
        assert_eq!(view.scope_ids, vec![rally.id().bare().to_string()]);
    }

    #[tokio::test]
    async fn a_second_run_returns_the_existing_rally_unchanged() {
        let h = setup().await;

        let first = provision::create_rally(&h.gateway, &h.config, 9, None)
            .await
            .expect("first run");
        let entities = h.gateway.created_entities();
        let teams = h.gateway.created_teams();

        let second = provision::create_rally(&h.gateway, &h.config, 9, None)
            .await
            .expect("second run");

        assert_eq!(first.id(), second.id());
        assert_eq!(h.gateway.created_entities(), entities);
        assert_eq!(h.gateway.created_teams(), teams);

        let view = h
            .gateway
            .get_entity(&h.config.rally_view_id)
            .await
            .expect("fetch view");
        assert_eq!(view.scope_ids.len(), 1);
    }

    #[tokio::test]
    async fn honors_a_custom_title() {
        let h = setup().await;

        let rally = provision::create_rally(&h.gateway, &h.config, 9, Some("Growth Rally".to_string()))
            .await
            .expect("create rally");

        assert_eq!(rally.project.name, "Growth Rally");
        assert_eq!(rally.number, 9);
    }

    #[tokio::test]
    async fn two_rallies_claiming_one_number_are_fatal() {
        let h = setup().await;

        let make = |name: &str| EntityDraft::new(name, EntityType::Project);
        let mut a = make("Rally 9");
        a.annotations
            .insert(keys::RALLY.to_string(), AnnotationValue::Int(9));
        let mut b = make("Rally 9 shadow");
        b.annotations
            .insert(keys::RALLY.to_string(), AnnotationValue::Int(9));
        let a = h.gateway.create_entity(&a, false).await.expect("seed a");
        let b = h.gateway.create_entity(&b, false).await.expect("seed b");
        provision::merge_scope(&h.gateway, &h.config.rally_view_id, &[a.id, b.id])
            .await
            .expect("register both");

        let result = provision::get_rally(&h.gateway, &h.config, 9).await;

        assert!(matches!(
            result,
            Err(ProvisionError::DuplicateEntity { count: 2, .. })
        ));
    }
}

mod create_sprint {
    use super::*;

    #[tokio::test]
    async fn requires_the_parent_rally() {
        let h = setup().await;

        let result = provision::create_sprint(&h.gateway, &h.config, 9, 'A', None).await;

        assert!(matches!(
            result,
            Err(ProvisionError::MissingParent { rally: 9 })
        ));
    }

    #[tokio::test]
    async fn provisions_under_an_existing_rally() {
        let h = setup().await;
        let rally = provision::create_rally(&h.gateway, &h.config, 9, None)
            .await
            .expect("create rally");
        let teams_before = h.gateway.created_teams();

        let sprint = provision::create_sprint(&h.gateway, &h.config, 9, 'A', None)
            .await
            .expect("create sprint");

        assert_eq!(sprint.label, "9A");
        assert_eq!(sprint.number, 9);
        assert_eq!(&sprint.rally_id, rally.id());
        assert_eq!(
            sprint.project.annotations.get(keys::SPRINT_NUMBER),
            Some(&AnnotationValue::from("9A"))
        );

        // Sprint, power users, and data users teams; the rally team is reused.
        assert_eq!(h.gateway.created_teams() - teams_before, 3);
        let sprint_team = h
            .gateway
            .get_team_by_name("Sprint 9A")
            .await
            .expect("sprint team exists");
        h.gateway
            .get_team_by_name("Sprint 9A Power Users")
            .await
            .expect("power users team exists");
        h.gateway
            .get_team_by_name("Sprint 9A Data Users")
            .await
            .expect("data users team exists");

        // The configured folder tree hangs off the sprint project.
        let data = h
            .gateway
            .find_child(Some(sprint.id()), "Data")
            .await
            .expect("Data folder exists");
        h.gateway
            .find_child(Some(&data), "Auxiliary")
            .await
            .expect("Auxiliary folder exists");
        h.gateway
            .find_child(Some(sprint.id()), "Timeline")
            .await
            .expect("Timeline folder exists");

        // One seeded post, tagged with the sprint team.
        let threads = h.gateway.threads();
        assert_eq!(threads.len(), 1);
        assert!(threads[0]
            .message_markdown
            .contains(&format!("@{}", sprint_team.name)));

        // Wiki tokens resolved against the rally and sprint teams.
        let rally_team_id = rally.team_id.clone().expect("rally team annotated");
        let wiki = h.gateway.get_wiki(sprint.id()).await.expect("wiki set");
        assert!(wiki.markdown.contains(&rally_team_id));
        assert!(wiki.markdown.contains(&sprint_team.id));

        // Registered in the sprint view, and both containers in the files view.
        let sprint_view = h
            .gateway
            .get_entity(&h.config.sprint_view_id)
            .await
            .expect("fetch sprint view");
        assert_eq!(sprint_view.scope_ids, vec![sprint.id().bare().to_string()]);

        let files_view = h
            .gateway
            .get_entity(&h.config.all_files_view_id)
            .await
            .expect("fetch files view");
        assert_eq!(files_view.scope_ids.len(), 2);
        assert!(files_view
            .scope_ids
            .contains(&rally.id().bare().to_string()));
        assert!(files_view
            .scope_ids
            .contains(&sprint.id().bare().to_string()));
    }

    #[tokio::test]
    async fn a_second_run_returns_the_existing_sprint_unchanged() {
        let h = setup().await;
        provision::create_rally(&h.gateway, &h.config, 9, None)
            .await
            .expect("create rally");

        let first = provision::create_sprint(&h.gateway, &h.config, 9, 'A', None)
            .await
            .expect("first run");
        let entities = h.gateway.created_entities();
        let teams = h.gateway.created_teams();
        let threads = h.gateway.thread_count();

        let second = provision::create_sprint(&h.gateway, &h.config, 9, 'A', None)
            .await
            .expect("second run");

        assert_eq!(first.id(), second.id());
        assert_eq!(h.gateway.created_entities(), entities);
        assert_eq!(h.gateway.created_teams(), teams);
        assert_eq!(h.gateway.thread_count(), threads);
    }

    #[tokio::test]
    async fn listing_filters_by_rally_number() {
        let h = setup().await;
        provision::create_rally(&h.gateway, &h.config, 9, None)
            .await
            .expect("create rally");
        provision::create_sprint(&h.gateway, &h.config, 9, 'A', None)
            .await
            .expect("create sprint");

        let all = provision::get_sprints(&h.gateway, &h.config, None)
            .await
            .expect("list all");
        assert_eq!(all.len(), 1);

        let matching = provision::get_sprints(&h.gateway, &h.config, Some(9))
            .await
            .expect("list rally 9");
        assert_eq!(matching.len(), 1);

        let other = provision::get_sprints(&h.gateway, &h.config, Some(8))
            .await
            .expect("list rally 8");
        assert!(other.is_empty());
    }
}
