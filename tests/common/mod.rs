#![allow(dead_code)]

use api_power::catalog::{CategoryMenuEntry, Interface, Project, ProjectEnv, RawCategory};
use api_power::config::{
    CategoryConfig, GeneratorConfig, OneOrMany, ProjectConfig, ServerConfig, ServerType,
    SharedConfig,
};
use api_power::contract::MockCatalogApi;

pub const SERVER_URL: &str = "http://yapi.example.com";

pub fn project() -> Project {
    Project {
        id: 11,
        name: "Demo".to_string(),
        basepath: "/api/".to_string(),
        env: vec![ProjectEnv {
            name: "dev".to_string(),
            domain: "http://dev.example.com".to_string(),
        }],
        url: String::new(),
    }
}

pub fn menu() -> Vec<CategoryMenuEntry> {
    [(1, "Users"), (2, "Orders"), (3, "Admin"), (4, "Avatars")]
        .into_iter()
        .map(|(id, name)| CategoryMenuEntry {
            id,
            name: name.to_string(),
            desc: String::new(),
        })
        .collect()
}

pub fn interface(id: i64, catid: i64, method: &str, path: &str, title: &str) -> Interface {
    Interface {
        id,
        catid,
        project_id: 11,
        method: method.to_string(),
        path: path.to_string(),
        title: title.to_string(),
        up_time: 1_600_000_000,
        res_body_type: Some("json".to_string()),
        res_body: Some(r#"{"code":0,"data":{"id":1,"name":"x"}}"#.to_string()),
        ..Default::default()
    }
}

/// Users (1) is listed out of id order on purpose.
pub fn export() -> Vec<RawCategory> {
    let mut create_order = interface(201, 2, "POST", "/order/create", "Create order");
    create_order.req_body_type = Some("json".to_string());
    create_order.req_body_other = Some(r#"{"sku":"A-1","count":2}"#.to_string());
    vec![
        RawCategory {
            name: "Users".to_string(),
            desc: String::new(),
            list: vec![
                interface(102, 1, "GET", "/user/detail", "User detail"),
                interface(101, 1, "GET", "/user/list", "User list"),
            ],
        },
        RawCategory {
            name: "Orders".to_string(),
            desc: String::new(),
            list: vec![create_order],
        },
        RawCategory {
            name: "Admin".to_string(),
            desc: String::new(),
            list: vec![interface(301, 3, "GET", "/admin/reset", "Reset")],
        },
        RawCategory {
            name: "Avatars".to_string(),
            desc: String::new(),
            list: vec![interface(401, 4, "GET", "/user/avatar", "User avatar")],
        },
    ]
}

/// A catalog API that serves the fixture, each endpoint at most `times` times.
pub fn catalog_api(times: usize) -> MockCatalogApi {
    let mut api = MockCatalogApi::new();
    api.expect_fetch_project()
        .times(0..=times)
        .returning(|_| Ok(project()));
    api.expect_fetch_category_menu()
        .times(0..=times)
        .returning(|_, _| Ok(menu()));
    api.expect_fetch_export()
        .times(0..=times)
        .returning(|_| Ok(export()));
    api
}

/// Like [`catalog_api`], but every endpoint must be hit exactly `times` times.
pub fn catalog_api_exactly(times: usize) -> MockCatalogApi {
    let mut api = MockCatalogApi::new();
    api.expect_fetch_project()
        .times(times)
        .returning(|_| Ok(project()));
    api.expect_fetch_category_menu()
        .times(times)
        .returning(|_, _| Ok(menu()));
    api.expect_fetch_export()
        .times(times)
        .returning(|_| Ok(export()));
    api
}

pub fn category(ids: Vec<i64>) -> CategoryConfig {
    CategoryConfig {
        id: OneOrMany::Many(ids),
        shared: SharedConfig::default(),
    }
}

pub fn config(categories: Vec<CategoryConfig>) -> GeneratorConfig {
    GeneratorConfig {
        servers: vec![ServerConfig {
            server_url: SERVER_URL.to_string(),
            server_type: ServerType::Yapi,
            projects: vec![ProjectConfig {
                token: OneOrMany::One("token-a".to_string()),
                categories,
                shared: SharedConfig::default(),
            }],
            shared: SharedConfig::default(),
        }],
    }
}
