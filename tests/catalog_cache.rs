mod common;

use api_power::catalog::{CatalogCache, CatalogKey};
use api_power::contract::MockCatalogApi;
use api_power::GenerateError;

#[tokio::test]
async fn concurrent_callers_share_one_fetch_per_endpoint() {
    let cache = CatalogCache::new(common::catalog_api_exactly(1));
    let key = CatalogKey::new(common::SERVER_URL, "token-a");

    let (a, b, menu, project) = tokio::join!(
        cache.export(&key),
        cache.category_interfaces(&key, 1),
        cache.category_menu(&key),
        cache.project(&key),
    );
    assert_eq!(a.expect("export").len(), 4);
    assert_eq!(b.expect("interfaces").len(), 2);
    assert_eq!(menu.expect("menu").len(), 4);
    assert_eq!(project.expect("project").id, 11);

    // Served from the cache; the mock would panic on a second call.
    cache.export(&key).await.expect("cached export");
}

#[tokio::test]
async fn derived_fields_are_filled_in() {
    let cache = CatalogCache::new(common::catalog_api(1));
    let key = CatalogKey::new(common::SERVER_URL, "token-a");

    let project = cache.project(&key).await.expect("project");
    assert_eq!(project.basepath, "/api");
    assert_eq!(project.url, "http://yapi.example.com/project/11/interface/api");

    let export = cache.export(&key).await.expect("export");
    let users = &export[0];
    assert_eq!(users.info.id, 1);
    assert_eq!(
        users.info.url,
        "http://yapi.example.com/project/11/interface/api/cat_1"
    );
    let detail = &users.interfaces[0];
    assert_eq!(detail.path, "/api/user/detail");
    assert_eq!(detail.url, "http://yapi.example.com/project/11/interface/api/102");
    assert_eq!(
        detail.category.as_ref().map(|c| c.name.as_str()),
        Some("Users")
    );
}

#[tokio::test]
async fn distinct_tokens_are_distinct_catalogs() {
    let mut api = MockCatalogApi::new();
    api.expect_fetch_project()
        .times(2)
        .returning(|_| Ok(common::project()));
    let cache = CatalogCache::new(api);

    let a = CatalogKey::new(common::SERVER_URL, "token-a");
    let b = CatalogKey::new(common::SERVER_URL, "token-b");
    cache.project(&a).await.expect("a");
    cache.project(&b).await.expect("b");
    cache.project(&a).await.expect("a again");
}

#[tokio::test]
async fn unknown_category_yields_no_interfaces() {
    let cache = CatalogCache::new(common::catalog_api(1));
    let key = CatalogKey::new(common::SERVER_URL, "token-a");
    let interfaces = cache.category_interfaces(&key, 42).await.expect("export");
    assert!(interfaces.is_empty());
}

#[tokio::test]
async fn upstream_errors_are_not_cached_as_success() {
    let mut api = MockCatalogApi::new();
    api.expect_fetch_project().times(2).returning(|key| {
        Err(GenerateError::Upstream {
            url: format!("{}/api/project/get", key.server_url),
            query: "token=***".to_string(),
            message: "invalid token".to_string(),
        })
    });
    let cache = CatalogCache::new(api);
    let key = CatalogKey::new(common::SERVER_URL, "bad");

    for _ in 0..2 {
        match cache.project(&key).await {
            Err(GenerateError::Upstream { message, .. }) => assert_eq!(message, "invalid token"),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}
