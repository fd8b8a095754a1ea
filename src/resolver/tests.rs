//! Tests for the resolver module.

use super::*;
use crate::coordinate::Scope;
use crate::fetch::MemoryRepository;
use crate::test_utils::{DependencyFixture, PomBuilder, init_test_logging};

fn with_pom(
    repository: MemoryRepository,
    coordinate: &str,
    configure: impl FnOnce(PomBuilder) -> PomBuilder,
) -> MemoryRepository {
    let pom = configure(PomBuilder::new(coordinate)).build();
    repository.with_pom(coordinate, pom)
}

fn leaf(repository: MemoryRepository, coordinate: &str) -> MemoryRepository {
    with_pom(repository, coordinate, |p| p)
}

fn coordinates(texts: &[&str]) -> Vec<Coordinate> {
    texts.iter().map(|t| Coordinate::parse(t).unwrap()).collect()
}

fn listing(resolution: &Resolution) -> Vec<String> {
    resolution
        .dependencies
        .iter()
        .map(|d| format!("{}:{}:{}", d.artifact_id, d.version, d.scope))
        .collect()
}

async fn resolve(repository: MemoryRepository, roots: &[&str]) -> Result<Resolution> {
    init_test_logging(None);
    let resolver = Resolver::new(Arc::new(repository));
    resolver.resolve(&coordinates(roots), &ProfileConstraints::new(), &[]).await
}

/// app -> lib [1.0,2.0), published lib versions 1.0.0, 1.5.0, 2.0.0
fn range_repository() -> MemoryRepository {
    let repository = with_pom(MemoryRepository::new(), "org.example:app:1.0.0", |p| {
        p.dependency("org.example:lib:[1.0,2.0)")
    });
    let repository = leaf(repository, "org.example:lib:1.0.0");
    let repository = leaf(repository, "org.example:lib:1.5.0");
    leaf(repository, "org.example:lib:2.0.0")
}

#[tokio::test]
async fn test_range_resolves_to_highest_contained_version() {
    let resolution = resolve(range_repository(), &["org.example:app:1.0.0"]).await.unwrap();
    assert_eq!(listing(&resolution), ["app:1.0.0:compile", "lib:1.5.0:compile"]);
    assert_eq!(resolution.tree[0].children[0].requested.as_deref(), Some("[1.0,2.0)"));
}

#[tokio::test]
async fn test_nearest_wins() {
    // app -> x -> y -> z:2.0 loses against app -> z:1.0
    let repository = with_pom(MemoryRepository::new(), "g:app:1", |p| {
        p.dependency("g:x:1").dependency("g:z:1.0")
    });
    let repository = with_pom(repository, "g:x:1", |p| p.dependency("g:y:1"));
    let repository = with_pom(repository, "g:y:1", |p| p.dependency("g:z:2.0"));
    let repository = leaf(repository, "g:z:1.0");
    let repository = leaf(repository, "g:z:2.0");

    let resolution = resolve(repository, &["g:app:1"]).await.unwrap();
    assert_eq!(resolution.find("g", "z").unwrap().version, "1.0");

    let y = &resolution.tree[0].children[0].children[0];
    assert_eq!(
        y.children[0].status,
        NodeStatus::Conflict {
            selected: "1.0".to_string()
        }
    );
}

#[tokio::test]
async fn test_equal_depth_goes_to_first_declaration() {
    let repository = with_pom(MemoryRepository::new(), "g:app:1", |p| {
        p.dependency("g:a:1").dependency("g:b:1")
    });
    let repository = with_pom(repository, "g:a:1", |p| p.dependency("g:c:1.0"));
    let repository = with_pom(repository, "g:b:1", |p| p.dependency("g:c:2.0"));
    let repository = leaf(repository, "g:c:1.0");
    let repository = leaf(repository, "g:c:2.0");

    let resolution = resolve(repository, &["g:app:1"]).await.unwrap();
    assert_eq!(resolution.find("g", "c").unwrap().version, "1.0");
}

#[tokio::test]
async fn test_equal_depth_goes_to_first_root() {
    let repository = with_pom(MemoryRepository::new(), "g:first:1", |p| p.dependency("g:c:1.0"));
    let repository = with_pom(repository, "g:second:1", |p| p.dependency("g:c:2.0"));
    let repository = leaf(repository, "g:c:1.0");
    let repository = leaf(repository, "g:c:2.0");

    let resolution = resolve(repository, &["g:second:1", "g:first:1"]).await.unwrap();
    assert_eq!(resolution.find("g", "c").unwrap().version, "2.0");
}

#[tokio::test]
async fn test_resolution_is_deterministic() {
    let build = || {
        let repository = with_pom(MemoryRepository::new(), "g:app:1", |p| {
            p.dependency("g:a:1").dependency("g:b:1").dependency("g:c:1")
        });
        let repository =
            with_pom(repository, "g:a:1", |p| p.dependency("g:d:1").dependency("g:e:1"));
        let repository =
            with_pom(repository, "g:b:1", |p| p.dependency("g:e:2").dependency("g:f:1"));
        let repository = with_pom(repository, "g:c:1", |p| p.dependency("g:d:2"));
        let mut repository = repository;
        for leaf_coordinate in ["g:d:1", "g:d:2", "g:e:1", "g:e:2", "g:f:1"] {
            repository = leaf(repository, leaf_coordinate);
        }
        repository.with_delay(std::time::Duration::from_millis(1))
    };

    let first = resolve(build(), &["g:app:1"]).await.unwrap();
    let second = resolve(build(), &["g:app:1"]).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(
        listing(&first),
        [
            "app:1:compile",
            "a:1:compile",
            "b:1:compile",
            "c:1:compile",
            "d:1:compile",
            "e:1:compile",
            "f:1:compile",
        ]
    );
}

#[tokio::test]
async fn test_scope_propagation() {
    let repository = with_pom(MemoryRepository::new(), "g:app:1", |p| {
        p.dependency("g:lib:1")
            .dependency(DependencyFixture::new("g:junit:4").scope("test"))
    });
    let repository = with_pom(repository, "g:lib:1", |p| {
        p.dependency(DependencyFixture::new("g:driver:1").scope("runtime"))
            .dependency(DependencyFixture::new("g:servlet:3").scope("provided"))
            .dependency(DependencyFixture::new("g:mockito:2").scope("test"))
    });
    let repository = with_pom(repository, "g:driver:1", |p| p.dependency("g:pool:1"));
    let repository = with_pom(repository, "g:junit:4", |p| p.dependency("g:hamcrest:1"));
    let repository = leaf(repository, "g:pool:1");
    let repository = leaf(repository, "g:hamcrest:1");

    let resolution = resolve(repository, &["g:app:1"]).await.unwrap();
    assert_eq!(
        listing(&resolution),
        [
            "app:1:compile",
            "lib:1:compile",
            "junit:4:test",
            "driver:1:runtime",
            "pool:1:runtime",
        ]
    );
}

#[tokio::test]
async fn test_optional_only_at_first_level() {
    let build = || {
        let repository = with_pom(MemoryRepository::new(), "g:app:1", |p| {
            p.dependency("g:lib:1")
                .dependency(DependencyFixture::new("g:direct-optional:1").optional())
        });
        let repository = with_pom(repository, "g:lib:1", |p| {
            p.dependency(DependencyFixture::new("g:transitive-optional:1").optional())
        });
        let repository = leaf(repository, "g:direct-optional:1");
        leaf(repository, "g:transitive-optional:1")
    };

    let resolution = resolve(build(), &["g:app:1"]).await.unwrap();
    assert!(resolution.find("g", "direct-optional").is_some());
    assert!(resolution.find("g", "transitive-optional").is_none());

    let options = ResolveOptions {
        include_optional: true,
        ..ResolveOptions::default()
    };
    let resolver = Resolver::with_options(Arc::new(build()), options);
    let resolution = resolver
        .resolve(&coordinates(&["g:app:1"]), &ProfileConstraints::new(), &[])
        .await
        .unwrap();
    assert!(resolution.find("g", "transitive-optional").is_some());
}

#[tokio::test]
async fn test_exclusion_removes_subtree_entry() {
    let repository = with_pom(MemoryRepository::new(), "g:app:1", |p| {
        p.dependency(DependencyFixture::new("g:a:1").exclude("g", "x"))
    });
    let repository = with_pom(repository, "g:a:1", |p| p.dependency("g:m:1"));
    let repository = with_pom(repository, "g:m:1", |p| p.dependency("g:x:1"));
    let repository = leaf(repository, "g:x:1");

    let resolution = resolve(repository, &["g:app:1"]).await.unwrap();
    assert!(resolution.find("g", "m").is_some());
    assert!(resolution.find("g", "x").is_none());
}

#[tokio::test]
async fn test_exclusion_applies_per_path() {
    // x is excluded below a, but b -> c -> x does not carry the exclusion
    let repository = with_pom(MemoryRepository::new(), "g:app:1", |p| {
        p.dependency(DependencyFixture::new("g:a:1").exclude("g", "x"))
            .dependency("g:b:1")
    });
    let repository = with_pom(repository, "g:a:1", |p| p.dependency("g:x:1"));
    let repository = with_pom(repository, "g:b:1", |p| p.dependency("g:c:1"));
    let repository = with_pom(repository, "g:c:1", |p| p.dependency("g:x:2"));
    let repository = leaf(repository, "g:x:1");
    let repository = leaf(repository, "g:x:2");

    let resolution = resolve(repository, &["g:app:1"]).await.unwrap();
    assert_eq!(resolution.find("g", "x").unwrap().version, "2");
}

#[tokio::test]
async fn test_wildcard_exclusion() {
    let repository = with_pom(MemoryRepository::new(), "g:app:1", |p| {
        p.dependency(DependencyFixture::new("g:a:1").exclude("*", "*"))
    });
    let repository = with_pom(repository, "g:a:1", |p| p.dependency("other:thing:1"));
    let repository = leaf(repository, "other:thing:1");

    let resolution = resolve(repository, &["g:app:1"]).await.unwrap();
    assert_eq!(listing(&resolution), ["app:1:compile", "a:1:compile"]);
}

#[tokio::test]
async fn test_dependency_cycle_terminates() {
    let repository = with_pom(MemoryRepository::new(), "g:a:1", |p| p.dependency("g:b:1"));
    let repository = with_pom(repository, "g:b:1", |p| p.dependency("g:a:1"));

    let resolution = resolve(repository, &["g:a:1"]).await.unwrap();
    assert_eq!(listing(&resolution), ["a:1:compile", "b:1:compile"]);
    assert_eq!(resolution.tree[0].children[0].children[0].status, NodeStatus::Duplicate);
}

#[tokio::test]
async fn test_bom_supplies_missing_versions() {
    let repository = with_pom(MemoryRepository::new(), "g:platform:1", |p| {
        p.packaging("pom").managed("g:lib:3.2").managed("g:util:1.1")
    });
    let repository = with_pom(repository, "g:app:1", |p| p.dependency("g:util"));
    let repository = leaf(repository, "g:lib:3.2");
    let repository = leaf(repository, "g:util:1.1");

    let resolver = Resolver::new(Arc::new(repository));
    let resolution = resolver
        .resolve(
            &coordinates(&["g:app:1", "g:lib"]),
            &ProfileConstraints::new(),
            &coordinates(&["g:platform:1"]),
        )
        .await
        .unwrap();
    assert_eq!(
        listing(&resolution),
        ["app:1:compile", "lib:3.2:compile", "util:1.1:compile"]
    );
}

#[tokio::test]
async fn test_raw_root_ignores_bom() {
    let repository = with_pom(MemoryRepository::new(), "g:platform:1", |p| {
        p.packaging("pom").managed("g:lib:3.2")
    });
    let repository = leaf(repository, "g:lib:3.2");

    let resolver = Resolver::new(Arc::new(repository));
    let err = resolver
        .resolve(
            &coordinates(&["g:lib!"]),
            &ProfileConstraints::new(),
            &coordinates(&["g:platform:1"]),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MvnrError>(),
        Some(MvnrError::UnresolvedVersion { .. })
    ));
}

#[tokio::test]
async fn test_managed_mode_overrides_transitive_versions() {
    let build = || {
        let repository = with_pom(MemoryRepository::new(), "g:app:1", |p| {
            p.managed("g:util:2.0").dependency("g:lib:1")
        });
        let repository = with_pom(repository, "g:lib:1", |p| p.dependency("g:util:1.0"));
        let repository = leaf(repository, "g:util:1.0");
        leaf(repository, "g:util:2.0")
    };

    let plain = resolve(build(), &["g:app:1"]).await.unwrap();
    assert_eq!(plain.find("g", "util").unwrap().version, "1.0");

    let resolver = Resolver::new(Arc::new(build()));
    let managed = resolver
        .dependencies(&coordinates(&["g:app:1"]), true, &[], &ProfileConstraints::new())
        .await
        .unwrap();
    let util = managed.iter().find(|d| d.artifact_id == "util").unwrap();
    assert_eq!(util.version, "2.0");
    assert!(managed.iter().all(|d| d.artifact_id != "app"));
}

#[tokio::test]
async fn test_missing_transitive_descriptor_is_a_leaf() {
    let repository = with_pom(MemoryRepository::new(), "g:app:1", |p| p.dependency("g:ghost:1"));

    let resolution = resolve(repository, &["g:app:1"]).await.unwrap();
    assert_eq!(listing(&resolution), ["app:1:compile", "ghost:1:compile"]);
    assert!(resolution.warnings.iter().any(|w| w.contains("g:ghost:1")));
}

#[tokio::test]
async fn test_missing_root_descriptor() {
    let err = resolve(MemoryRepository::new(), &["g:nothing:1"]).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MvnrError>(),
        Some(MvnrError::DescriptorNotFound { .. })
    ));
}

#[tokio::test]
async fn test_cyclic_parent_is_reported() {
    let repository = with_pom(MemoryRepository::new(), "g:app:1", |p| p.parent("g:parent:1"));
    let repository = with_pom(repository, "g:parent:1", |p| p.parent("g:app:1"));

    let err = resolve(repository, &["g:app:1"]).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MvnrError>(),
        Some(MvnrError::CyclicInheritance { .. })
    ));
}

#[tokio::test]
async fn test_error_names_inclusion_chain() {
    let repository = with_pom(MemoryRepository::new(), "g:app:1", |p| p.dependency("g:lib:1"));
    let repository = with_pom(repository, "g:lib:1", |p| p.dependency("g:gone:[5.0,)"));
    let repository = repository.with_versions("g:gone", ["1.0"]);

    let err = resolve(repository, &["g:app:1"]).await.unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("g:app:1 -> g:lib:1"), "{message}");
    assert!(matches!(
        err.downcast_ref::<MvnrError>(),
        Some(MvnrError::UnresolvedVersion { .. })
    ));
}

#[tokio::test]
async fn test_shared_descriptor_fetched_once() {
    let repository = with_pom(MemoryRepository::new(), "g:app:1", |p| {
        p.dependency("g:a:1").dependency("g:b:1")
    });
    let repository = with_pom(repository, "g:a:1", |p| p.parent("g:parent:1"));
    let repository = with_pom(repository, "g:b:1", |p| p.parent("g:parent:1"));
    let repository = leaf(repository, "g:parent:1");
    let repository = Arc::new(repository);

    let resolver = Resolver::new(repository.clone());
    resolver
        .resolve(&coordinates(&["g:app:1"]), &ProfileConstraints::new(), &[])
        .await
        .unwrap();
    assert_eq!(repository.request_count("g:parent:1"), 1);
}

#[tokio::test]
async fn test_release_root() {
    let repository = leaf(MemoryRepository::new(), "g:lib:1.0");
    let repository = leaf(repository, "g:lib:1.1");
    let repository = repository.with_versions("g:lib", ["1.2-SNAPSHOT"]);

    let resolution = resolve(repository, &["g:lib:RELEASE"]).await.unwrap();
    assert_eq!(listing(&resolution), ["lib:1.1:compile"]);
}

#[tokio::test]
async fn test_cancellation_returns_no_partial_result() {
    let repository = leaf(MemoryRepository::new(), "g:slow:1")
        .with_delay(std::time::Duration::from_secs(30));
    let resolver = Resolver::new(Arc::new(repository));

    let err = resolver
        .resolve_until(
            &coordinates(&["g:slow:1"]),
            &ProfileConstraints::new(),
            &[],
            std::future::ready(()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<MvnrError>(), Some(MvnrError::Cancelled)));
}

#[tokio::test]
async fn test_root_scope_and_classifier_survive() {
    let repository = leaf(MemoryRepository::new(), "g:lib:1");
    let resolver = Resolver::new(Arc::new(repository));
    let root = Coordinate::parse("g:lib:1:natives-linux").unwrap().with_scope(Scope::Runtime);
    let resolution = resolver
        .resolve(&[root], &ProfileConstraints::new(), &[])
        .await
        .unwrap();
    let dependency = &resolution.dependencies[0];
    assert_eq!(dependency.classifier.as_deref(), Some("natives-linux"));
    assert_eq!(dependency.scope, Scope::Runtime);
    assert!(resolution.dependencies_of_roots().is_empty());
}
