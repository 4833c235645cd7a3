mod common;

use actix_web::{cookie::Cookie, http::StatusCode, test};
use chrono::Utc;
use polls_backend::middlewares::authenticate::AUTH_COOKIE;
use serde_json::{json, Value};

use common::{create_question, create_user, location, response_cookie, test_app, user_exists, PASSWORD};

#[actix_web::test]
async fn test_can_login_with_correct_username_password() {
    let store = common::store();
    create_user(&store, "tester", false).await;
    let app = test_app!(store, Utc::now());

    let req = test::TestRequest::post()
        .uri("/accounts/login/")
        .set_form(json!({"username": "tester", "password": PASSWORD}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/polls/");
    let session = response_cookie(&resp, AUTH_COOKIE).expect("no session cookie");
    assert!(!session.value().is_empty());
}

#[actix_web::test]
async fn test_can_not_login_with_incorrect_username_password() {
    let store = common::store();
    create_user(&store, "tester", false).await;
    let app = test_app!(store, Utc::now());

    for form in [
        json!({"username": "", "password": PASSWORD}),
        json!({"username": "tester", "password": ""}),
        json!({"username": "tester", "password": "wrong-password"}),
        json!({"username": "nobody", "password": PASSWORD}),
    ] {
        let req = test::TestRequest::post()
            .uri("/accounts/login/")
            .set_form(&form)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(response_cookie(&resp, AUTH_COOKIE).is_none());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "Error");
        assert!(body["errors"].is_object());
    }
}

#[actix_web::test]
async fn test_login_follows_local_next_only() {
    let store = common::store();
    create_user(&store, "tester", false).await;
    let app = test_app!(store, Utc::now());

    let req = test::TestRequest::post()
        .uri("/accounts/login/?next=/polls/abc/")
        .set_form(json!({"username": "tester", "password": PASSWORD}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/polls/abc/");

    for next in ["https://evil.example/", "//evil.example/", "/\\evil.example/"] {
        let req = test::TestRequest::post()
            .uri("/accounts/login/")
            .set_form(json!({"username": "tester", "password": PASSWORD, "next": next}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/polls/", "followed {}", next);
    }
}

#[actix_web::test]
async fn test_login_page_renders() {
    let store = common::store();
    let app = test_app!(store, Utc::now());
    let req = test::TestRequest::get()
        .uri("/accounts/login/?next=/polls/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["result"]["next"], "/polls/");
}

#[actix_web::test]
async fn test_can_signup_with_valid_username_password() {
    let store = common::store();
    let app = test_app!(store, Utc::now());

    let req = test::TestRequest::post()
        .uri("/signup/")
        .set_form(json!({"username": "Tester_Signup", "password1": "TS12345678", "password2": "TS12345678"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/polls/");
    assert!(response_cookie(&resp, AUTH_COOKIE).is_some());
    assert!(user_exists(&store, "Tester_Signup").await);
}

#[actix_web::test]
async fn test_can_not_signup_with_invalid_username_password() {
    let store = common::store();
    create_user(&store, "tester", false).await;
    let app = test_app!(store, Utc::now());

    let cases = [
        ("$", "TS12345678", "TS12345678", "username"),
        ("Tester_Signup", "1", "1", "password2"),
        ("Tester_Signup", "", "", "password1"),
        ("tester", "TS12345678", "TS12345678", "username"),
        ("Tester_Signup", "TS12345678", "TS123456789", "password2"),
    ];
    for (username, password1, password2, field) in cases {
        let req = test::TestRequest::post()
            .uri("/signup/")
            .set_form(json!({"username": username, "password1": password1, "password2": password2}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["errors"][field].is_array(), "expected {} error for {}", field, username);
    }
    assert!(!user_exists(&store, "$").await);
    assert!(!user_exists(&store, "Tester_Signup").await);
}

#[actix_web::test]
async fn test_logout() {
    let store = common::store();
    let user = create_user(&store, "tester", false).await;
    let app = test_app!(store, Utc::now());

    for req in [
        test::TestRequest::get().uri("/accounts/logout/"),
        test::TestRequest::post().uri("/accounts/logout/"),
    ] {
        let resp = test::call_service(&app, req.cookie(common::session_cookie(&user)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/accounts/login/");
        assert_eq!(response_cookie(&resp, AUTH_COOKIE).unwrap().value(), "");
    }
}

#[actix_web::test]
async fn test_invalid_session_is_anonymous() {
    let store = common::store();
    let now = Utc::now();
    let (question, choices) = create_question(&store, "Vote?", now, -1, None, &["a"]).await;
    let app = test_app!(store, now);

    let req = test::TestRequest::post()
        .uri(&format!("/polls/{}/vote/", question.id))
        .cookie(Cookie::new(AUTH_COOKIE, "forged.token.value"))
        .set_form(json!({"choice": choices[0].id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(location(&resp).starts_with("/accounts/login/"));
}
