//! HTTP-level tests: the full `/api` route table served from the in-memory
//! store, so no database or container is needed.
//!
//!   cargo test --test api_test

use std::str::FromStr;

use actix_web::{http::StatusCode, test, web, App};
use bigdecimal::BigDecimal;
use catalog_service::{handlers, AppState, InMemoryStore};
use serde_json::{json, Value};
use uuid::Uuid;

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(InMemoryStore::new())))
                .configure(handlers::configure::<InMemoryStore>),
        )
        .await
    };
}

macro_rules! post_json {
    ($app:expr, $uri:expr, $body:expr $(,)?) => {{
        let req = test::TestRequest::post().uri($uri).set_json($body).to_request();
        let resp = test::call_service($app, req).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }};
}

macro_rules! get_json {
    ($app:expr, $uri:expr $(,)?) => {{
        let req = test::TestRequest::get().uri($uri).to_request();
        let resp = test::call_service($app, req).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }};
}

macro_rules! put_json {
    ($app:expr, $uri:expr, $body:expr $(,)?) => {{
        let req = test::TestRequest::put().uri($uri).set_json($body).to_request();
        let resp = test::call_service($app, req).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }};
}

macro_rules! delete {
    ($app:expr, $uri:expr $(,)?) => {{
        let req = test::TestRequest::delete().uri($uri).to_request();
        test::call_service($app, req).await.status()
    }};
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("response has an id").to_string()
}

fn decimal(value: &Value) -> BigDecimal {
    BigDecimal::from_str(value.as_str().expect("decimal is a string")).expect("valid decimal")
}

#[actix_web::test]
async fn place_order_totals_items_and_takes_stock() {
    let app = app!();

    let (status, user) = post_json!(
        &app,
        "/api/users/register",
        json!({ "username": "alice", "email": "alice@example.com" }),
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, product) = post_json!(
        &app,
        "/api/products",
        json!({ "name": "Kettle", "price": "10.00", "stock_quantity": 5 }),
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["status"], "AVAILABLE");

    let (status, order) = post_json!(
        &app,
        "/api/orders",
        json!({
            "user_id": id_of(&user),
            "items": [
                { "product_id": id_of(&product), "quantity": 2, "price": "10.00" },
                { "quantity": 3, "price": "0.10" },
                { "product_id": id_of(&product), "quantity": 1 }
            ]
        }),
    );
    assert_eq!(status, StatusCode::CREATED, "body: {order}");
    assert_eq!(order["status"], "PENDING");
    assert_eq!(decimal(&order["total_price"]), BigDecimal::from_str("20.30").unwrap());
    assert_eq!(order["items"].as_array().map(Vec::len), Some(3));

    let (_, product) = get_json!(&app, &format!("/api/products/{}", id_of(&product)));
    assert_eq!(product["stock_quantity"], 2);

    let (status, listed) =
        get_json!(&app, &format!("/api/users/{}/orders", id_of(&user)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn order_lifecycle_status_and_delete() {
    let app = app!();
    let (_, user) = post_json!(
        &app,
        "/api/users/register",
        json!({ "username": "bob", "email": "bob@example.com" }),
    );
    let (_, order) = post_json!(&app, "/api/orders", json!({ "user_id": id_of(&user) }));
    let order_id = id_of(&order);

    let req = test::TestRequest::put()
        .uri(&format!("/api/orders/{order_id}/status?status=SHIPPED"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri(&format!("/api/orders/{order_id}/status?status=LOST"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/orders/{order_id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let (status, _) = get_json!(&app, &format!("/api/orders/{order_id}"));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/orders/{order_id}"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn order_for_unknown_buyer_or_product_is_not_found() {
    let app = app!();
    let (status, _) =
        post_json!(&app, "/api/orders", json!({ "user_id": Uuid::new_v4() }));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, user) = post_json!(
        &app,
        "/api/users/register",
        json!({ "username": "carol", "email": "carol@example.com" }),
    );
    let (status, _) = post_json!(
        &app,
        "/api/orders",
        json!({
            "user_id": id_of(&user),
            "items": [{ "product_id": Uuid::new_v4(), "quantity": 1, "price": "1.00" }]
        }),
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn malformed_price_is_bad_request() {
    let app = app!();
    let (status, _) = post_json!(
        &app,
        "/api/products",
        json!({ "name": "Kettle", "price": "ten", "stock_quantity": 1 }),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn duplicate_username_is_conflict() {
    let app = app!();
    let body = json!({ "username": "dave", "email": "dave@example.com" });
    let (status, _) = post_json!(&app, "/api/users/register", body.clone());
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post_json!(&app, "/api/users/register", body);
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_web::test]
async fn reviews_keep_product_rating_current() {
    let app = app!();
    let (_, user) = post_json!(
        &app,
        "/api/users/register",
        json!({ "username": "erin", "email": "erin@example.com" }),
    );
    let (_, product) = post_json!(
        &app,
        "/api/products",
        json!({ "name": "Grinder", "price": "89.00", "stock_quantity": 3 }),
    );
    let product_id = id_of(&product);
    let user_id = id_of(&user);

    let (status, first) = post_json!(
        &app,
        "/api/reviews",
        json!({ "product_id": product_id, "user_id": user_id, "rating": 4, "comment": "solid" }),
    );
    assert_eq!(status, StatusCode::CREATED);
    let (_, _second) = post_json!(
        &app,
        "/api/reviews",
        json!({ "product_id": product_id, "user_id": user_id, "rating": 2 }),
    );

    let (_, product) = get_json!(&app, &format!("/api/products/{product_id}"));
    assert_eq!(product["rating"], 3.0);
    assert_eq!(product["review_count"], 2);

    let req = test::TestRequest::put()
        .uri(&format!("/api/reviews/{}", id_of(&first)))
        .set_json(json!({ "rating": 5 }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["rating"], 5);
    assert_eq!(updated["comment"], "solid");

    let (_, average) =
        get_json!(&app, &format!("/api/reviews/product/{product_id}/average"));
    assert_eq!(average["average_rating"], 3.5);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/reviews/{}", id_of(&first)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let (_, product) = get_json!(&app, &format!("/api/products/{product_id}"));
    assert_eq!(product["rating"], 2.0);
    assert_eq!(product["review_count"], 1);

    let (_, by_user) = get_json!(&app, &format!("/api/reviews/user/{user_id}"));
    assert_eq!(by_user.as_array().map(Vec::len), Some(1));
}

#[actix_web::test]
async fn out_of_range_rating_is_bad_request() {
    let app = app!();
    let (_, user) = post_json!(
        &app,
        "/api/users/register",
        json!({ "username": "frank", "email": "frank@example.com" }),
    );
    let (_, product) = post_json!(
        &app,
        "/api/products",
        json!({ "name": "Scale", "price": "25.00", "stock_quantity": 1 }),
    );

    let (status, _) = post_json!(
        &app,
        "/api/reviews",
        json!({ "product_id": id_of(&product), "user_id": id_of(&user), "rating": 6 }),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn deleting_a_missing_review_is_no_content() {
    let app = app!();
    let req = test::TestRequest::delete()
        .uri(&format!("/api/reviews/{}", Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let (status, _) = get_json!(&app, &format!("/api/reviews/{}", Uuid::new_v4()));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn malformed_body_is_json_bad_request() {
    let app = app!();
    let (status, body) = post_json!(&app, "/api/orders", json!({ "user_id": 5 }));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "body: {body}");
}

#[actix_web::test]
async fn non_uuid_path_is_json_bad_request() {
    let app = app!();
    let (status, body) = get_json!(&app, "/api/orders/not-a-uuid");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "body: {body}");
}

#[actix_web::test]
async fn missing_query_parameter_is_json_bad_request() {
    let app = app!();
    let (status, body) = get_json!(&app, "/api/categories/search");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "body: {body}");
}

#[actix_web::test]
async fn product_update_restocks_and_reprices() {
    let app = app!();
    let (_, product) = post_json!(
        &app,
        "/api/products",
        json!({ "name": "Teapot", "price": "15.00", "stock_quantity": 0 }),
    );
    assert_eq!(product["status"], "OUT_OF_STOCK");
    let uri = format!("/api/products/{}", id_of(&product));

    let (status, updated) =
        put_json!(&app, &uri, json!({ "price": "12.50", "stock_quantity": 4 }));
    assert_eq!(status, StatusCode::OK, "body: {updated}");
    assert_eq!(updated["status"], "AVAILABLE");
    assert_eq!(updated["stock_quantity"], 4);
    assert_eq!(updated["name"], "Teapot");
    assert_eq!(decimal(&updated["price"]), BigDecimal::from_str("12.50").unwrap());

    let (status, _) = put_json!(&app, &uri, json!({ "status": "OUT_OF_STOCK" }));
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = put_json!(&app, &uri, json!({ "price": "cheap" }));
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = put_json!(
        &app,
        &format!("/api/products/{}", Uuid::new_v4()),
        json!({ "stock_quantity": 1 }),
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn in_stock_and_top_rated_listings() {
    let app = app!();
    let (_, user) = post_json!(
        &app,
        "/api/users/register",
        json!({ "username": "gina", "email": "gina@example.com" }),
    );
    let (_, stocked) = post_json!(
        &app,
        "/api/products",
        json!({ "name": "Mug", "price": "5.00", "stock_quantity": 2 }),
    );
    let (_, sold_out) = post_json!(
        &app,
        "/api/products",
        json!({ "name": "Jug", "price": "7.00", "stock_quantity": 0 }),
    );
    for (product, rating) in [(&stocked, 3), (&sold_out, 5)] {
        let (status, _) = post_json!(
            &app,
            "/api/reviews",
            json!({ "product_id": id_of(product), "user_id": id_of(&user), "rating": rating }),
        );
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, in_stock) = get_json!(&app, "/api/products/in-stock");
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<String> = in_stock.as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(ids, vec![id_of(&stocked)]);

    let (status, top) = get_json!(&app, "/api/products/top-rated");
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<String> = top.as_array().unwrap().iter().map(id_of).collect();
    assert_eq!(ids, vec![id_of(&sold_out), id_of(&stocked)]);
}

#[actix_web::test]
async fn category_tree_and_product_filing() {
    let app = app!();
    let (status, kitchen) = post_json!(
        &app,
        "/api/categories",
        json!({ "name": "Kitchen", "description": "Cooking gear" }),
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(kitchen["active"], true);
    let kitchen_id = id_of(&kitchen);

    let (status, kettles) = post_json!(
        &app,
        "/api/categories",
        json!({ "name": "Kettles", "parent_id": kitchen_id, "active": false }),
    );
    assert_eq!(status, StatusCode::CREATED);
    let kettles_id = id_of(&kettles);

    let (status, _) = post_json!(&app, "/api/categories", json!({ "name": "Kitchen" }));
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, roots) = get_json!(&app, "/api/categories/root");
    assert_eq!(roots.as_array().map(Vec::len), Some(1));
    let (_, active) = get_json!(&app, "/api/categories/active");
    assert_eq!(active.as_array().map(Vec::len), Some(1));
    let (_, children) = get_json!(&app, &format!("/api/categories/{kitchen_id}/subcategories"));
    assert_eq!(children[0]["id"], kettles_id.as_str());

    let (_, found) = get_json!(&app, "/api/categories/search?keyword=COOKING");
    assert_eq!(found.as_array().map(Vec::len), Some(1));
    let (status, by_name) = get_json!(&app, "/api/categories/name/Kettles");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(id_of(&by_name), kettles_id);
    let (_, taken) = get_json!(&app, "/api/categories/check-name/Kettles");
    assert_eq!(taken, Value::Bool(true));
    let (_, taken) = get_json!(&app, "/api/categories/check-name/Toasters");
    assert_eq!(taken, Value::Bool(false));

    let (status, _) = put_json!(
        &app,
        &format!("/api/categories/{kitchen_id}"),
        json!({ "name": "Kitchen", "parent_id": kettles_id }),
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, product) = post_json!(
        &app,
        "/api/products",
        json!({ "name": "Kettle", "price": "30.00", "stock_quantity": 1, "category_id": kettles_id }),
    );
    assert_eq!(product["category_id"], kettles_id.as_str());
    let (_, filed) = get_json!(&app, &format!("/api/products/category/{kettles_id}"));
    assert_eq!(filed.as_array().map(Vec::len), Some(1));

    assert_eq!(
        delete!(&app, &format!("/api/categories/{kettles_id}")),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        delete!(&app, &format!("/api/categories/{kettles_id}")),
        StatusCode::NO_CONTENT
    );
    let (_, product) = get_json!(&app, &format!("/api/products/{}", id_of(&product)));
    assert_eq!(product["category_id"], Value::Null);
    let (status, _) = get_json!(&app, &format!("/api/categories/{kettles_id}"));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn user_update_list_and_delete() {
    let app = app!();
    let (_, hank) = post_json!(
        &app,
        "/api/users/register",
        json!({ "username": "hank", "email": "hank@example.com" }),
    );
    let (_, ivy) = post_json!(
        &app,
        "/api/users/register",
        json!({ "username": "ivy", "email": "ivy@example.com" }),
    );
    let hank_uri = format!("/api/users/{}", id_of(&hank));

    let (status, updated) = put_json!(
        &app,
        &hank_uri,
        json!({ "username": "hank", "email": "hank@example.org", "full_name": "Hank Hill" }),
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["email"], "hank@example.org");
    assert_eq!(updated["full_name"], "Hank Hill");

    let (status, _) = put_json!(
        &app,
        &hank_uri,
        json!({ "username": "ivy", "email": "hank@example.org" }),
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, users) = get_json!(&app, "/api/users");
    assert_eq!(users.as_array().map(Vec::len), Some(2));

    let (_, _order) = post_json!(&app, "/api/orders", json!({ "user_id": id_of(&ivy) }));
    assert_eq!(
        delete!(&app, &format!("/api/users/{}", id_of(&ivy))),
        StatusCode::CONFLICT
    );

    assert_eq!(delete!(&app, &hank_uri), StatusCode::NO_CONTENT);
    assert_eq!(delete!(&app, &hank_uri), StatusCode::NO_CONTENT);
    let (status, _) = get_json!(&app, &hank_uri);
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn list_all_orders_and_reviews() {
    let app = app!();
    let (_, jay) = post_json!(
        &app,
        "/api/users/register",
        json!({ "username": "jay", "email": "jay@example.com" }),
    );
    let (_, kim) = post_json!(
        &app,
        "/api/users/register",
        json!({ "username": "kim", "email": "kim@example.com" }),
    );
    let (_, product) = post_json!(
        &app,
        "/api/products",
        json!({ "name": "Whisk", "price": "3.00", "stock_quantity": 10 }),
    );
    for user in [&jay, &kim] {
        post_json!(&app, "/api/orders", json!({ "user_id": id_of(user) }));
        post_json!(
            &app,
            "/api/reviews",
            json!({ "product_id": id_of(&product), "user_id": id_of(user), "rating": 4 }),
        );
    }

    let (status, orders) = get_json!(&app, "/api/orders");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().map(Vec::len), Some(2));
    let (status, reviews) = get_json!(&app, "/api/reviews");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviews.as_array().map(Vec::len), Some(2));
}
