use std::sync::Arc;

use catalog_admin::auth::{FileSessionStore, SessionStore};
use catalog_admin::catalog::{find_category_by_id, ProductStatus, SortOrder};
use catalog_admin::config::{CatalogConfig, ClientOptions};
use catalog_admin::context::AppContext;
use catalog_admin::router::{resolve, Route};
use catalog_admin::table::TableChange;
use catalog_admin::validation::{validate_login, FormField, LoginCredentials, ProductForm};
use catalog_admin::CatalogAdmin;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn product_json(id: i64, name: &str, updated_at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "category_id": 3,
        "attributes": [
            { "code": "colors", "type": "tags", "value": ["black", "white"] },
            { "code": "weight", "type": "number", "value": 180 }
        ],
        "created_at": "2024-01-01T09:00:00Z",
        "updated_at": updated_at,
        "status": "active",
        "units": 12
    })
}

async fn mount_backend(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("email", "admin@example.com"))
        .and(query_param("password", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "email": "admin@example.com", "name": "Ada Admin" }
        ])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Electronics" },
            { "id": 3, "name": "Phones", "parentId": 1 },
            { "id": 4, "name": "Laptops", "parentId": 1 }
        ])))
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("category_id", "3"))
        .and(query_param("_limit", "5"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Total-Count", "7")
                .set_body_json(json!([
                    product_json(10, "Phone X", "2024-02-01T10:00:00Z"),
                    product_json(11, "Phone Y", "2024-02-02T10:00:00Z")
                ])),
        )
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_login_persists_session_across_contexts() {
    let mock_server = MockServer::start().await;
    mount_backend(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let config = CatalogConfig::new(&mock_server.uri(), dir.path().join("session.json")).unwrap();
    let admin = CatalogAdmin::from_config(&config).unwrap();

    let ctx = CatalogAdmin::context(&config).await.unwrap();
    assert_eq!(resolve("/", ctx.auth().is_authenticated().await), Route::Login);

    let credentials = LoginCredentials::new("admin@example.com", "secret");
    validate_login(&credentials).unwrap();
    let response = admin.auth().login(&credentials.email, &credentials.password).await.unwrap();
    ctx.auth().login(response.user, &response.token).await.unwrap();
    ctx.teardown().await;

    // A new run restores the session from disk
    let ctx = CatalogAdmin::context(&config).await.unwrap();
    assert!(ctx.auth().is_authenticated().await);
    assert_eq!(ctx.auth().token().await.as_deref(), Some("mocked-jwt-token-123"));
    assert_eq!(resolve("/login", true), Route::Dashboard);

    ctx.auth().logout().await.unwrap();
    let store = FileSessionStore::new(config.session_file.clone());
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_browse_category_products() {
    let mock_server = MockServer::start().await;
    mount_backend(&mock_server).await;

    let options = ClientOptions::default().with_default_page_size(5);
    let admin = CatalogAdmin::new_with_options(&mock_server.uri(), options).unwrap();

    let tree = admin.categories().fetch_tree().await.unwrap();
    assert_eq!(tree.roots.len(), 1);
    let phones = find_category_by_id(&tree.roots, 3).unwrap();
    assert!(phones.is_leaf());

    let ctx = AppContext::init(Arc::new(catalog_admin::auth::MemorySessionStore::new()))
        .await
        .unwrap();
    ctx.select_category(phones.to_category()).await;

    let list = admin.product_list();
    list.set_category(phones.id).await;
    list.refresh().await.unwrap();

    let table = list.table().await;
    assert_eq!(table.pagination.total, Some(7));
    assert_eq!(table.pagination.page_size, 5);

    let products = list.products().await;
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].attributes.len(), 2);
    assert_eq!(
        catalog_admin::catalog::format::attribute_summary(&products[0].attributes),
        "colors: black, white | weight: 180"
    );

    let needs_fetch = list
        .change_table(TableChange {
            current: Some(1),
            page_size: Some(5),
            sort_field: Some("name".into()),
            sort_order: Some("ascend".into()),
        })
        .await;
    assert!(needs_fetch);
    assert_eq!(list.table().await.sorter.order, Some(SortOrder::Ascend));
}

#[tokio::test]
async fn test_product_form_submission_creates_product() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/products"))
        .and(body_partial_json(json!({
            "name": "Phone Z",
            "category_id": 3,
            "status": "inactive",
            "units": 4.0,
            "attributes": [{ "code": "colors", "type": "tags", "value": ["red"] }]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(product_json(12, "Phone Z", "2024-03-01T10:00:00Z")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let admin = CatalogAdmin::new(&mock_server.uri()).unwrap();

    let mut form = ProductForm::create(Some(3)).unwrap();
    form.set_name("Phone Z");
    form.set_status("inactive");
    form.set_units(Some(-4.0));
    let index = form.add_attribute();
    form.set_attribute_code(index, "colors");
    form.set_attribute_type(index, "tags");
    form.set_attribute_value(index, json!(["red"]));

    // Blocked until units are fixed
    assert!(form.submit(|draft| draft).is_err());
    assert_eq!(form.visible_error(FormField::Units), Some("Units must be at least 0"));

    form.set_units(Some(4.0));
    let draft = form.submit(|draft| draft).unwrap();
    assert_eq!(draft.status, ProductStatus::Inactive);

    let created = admin.products().create(&draft).await.unwrap();
    assert_eq!(created.id, 12);
}

#[tokio::test]
async fn test_last_updated_in_category() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("category_id", "3"))
        .and(query_param("_sort", "updated_at"))
        .and(query_param("_order", "desc"))
        .and(query_param("_page", "1"))
        .and(query_param("_limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product_json(11, "Phone Y", "2024-02-02T10:00:00Z")])))
        .mount(&mock_server)
        .await;

    let admin = CatalogAdmin::new(&mock_server.uri()).unwrap();
    let newest = admin.products().last_updated(Some(3)).await.unwrap().unwrap();
    assert_eq!(newest.name, "Phone Y");
    assert_eq!(
        catalog_admin::catalog::format::timestamp(&newest.updated_at),
        "02 Feb 2024, 10:00"
    );
}
