//! Tests for the authentication extractors.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, test as actix_test, web};
use chrono::Utc;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockAccountCommand, MockAccountQuery, MockAssetStore, MockAuthenticator, MockDealCommand,
    MockDealQuery,
};
use crate::domain::{AccountId, Email, Role};
use crate::inbound::http::state::HttpStatePorts;

const TOKEN: &str = "Bearer good";

fn account(role: Role) -> Account {
    Account::new(
        AccountId::random(),
        "Ada".to_owned(),
        Email::new("ada@example.com").expect("valid email"),
        role,
        Utc::now(),
    )
}

fn state(authenticator: MockAuthenticator) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(HttpStatePorts {
        authenticator: Arc::new(authenticator),
        accounts: Arc::new(MockAccountCommand::new()),
        account_query: Arc::new(MockAccountQuery::new()),
        deals: Arc::new(MockDealCommand::new()),
        deal_query: Arc::new(MockDealQuery::new()),
        assets: Arc::new(MockAssetStore::new()),
    }))
}

fn accepting(account: Account) -> MockAuthenticator {
    let mut authenticator = MockAuthenticator::new();
    authenticator.expect_authenticate().returning(move |header| {
        if header == TOKEN {
            Ok(account.clone())
        } else {
            Err(Error::unauthorized("Not authorized, token failed"))
        }
    });
    authenticator
}

async fn call(authenticator: MockAuthenticator, path: &str, header: Option<&str>) -> StatusCode {
    let app = actix_test::init_service(
        App::new()
            .app_data(state(authenticator))
            .route(
                "/any",
                web::get().to(|_: AuthenticatedAccount| async { HttpResponse::Ok().finish() }),
            )
            .route(
                "/owner",
                web::get().to(|_: OwnerAccount| async { HttpResponse::Ok().finish() }),
            )
            .route(
                "/optional",
                web::get().to(|viewer: OptionalAccount| async move {
                    if viewer.into_inner().is_some() {
                        HttpResponse::Ok().finish()
                    } else {
                        HttpResponse::NoContent().finish()
                    }
                }),
            ),
    )
    .await;

    let mut request = actix_test::TestRequest::get().uri(path);
    if let Some(value) = header {
        request = request.insert_header((header::AUTHORIZATION, value));
    }
    actix_test::call_service(&app, request.to_request())
        .await
        .status()
}

#[rstest]
#[case("/any", Some(TOKEN), StatusCode::OK)]
#[case("/any", Some("Bearer forged"), StatusCode::UNAUTHORIZED)]
#[case("/any", None, StatusCode::UNAUTHORIZED)]
#[case("/owner", Some(TOKEN), StatusCode::FORBIDDEN)]
#[case("/optional", Some(TOKEN), StatusCode::OK)]
#[case("/optional", Some("Bearer forged"), StatusCode::NO_CONTENT)]
#[case("/optional", None, StatusCode::NO_CONTENT)]
#[actix_web::test]
async fn extractors_gate_plain_users(
    #[case] path: &str,
    #[case] header: Option<&str>,
    #[case] expected: StatusCode,
) {
    let status = call(accepting(account(Role::User)), path, header).await;
    assert_eq!(status, expected);
}

#[rstest]
#[actix_web::test]
async fn owners_pass_the_owner_gate() {
    let status = call(accepting(account(Role::Owner)), "/owner", Some(TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
}

#[rstest]
#[case(Error::service_unavailable("account store unavailable"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("account lookup failed"), StatusCode::INTERNAL_SERVER_ERROR)]
#[actix_web::test]
async fn optional_reads_surface_account_store_failures(
    #[case] failure: Error,
    #[case] expected: StatusCode,
) {
    let mut authenticator = MockAuthenticator::new();
    authenticator
        .expect_authenticate()
        .returning(move |_| Err(failure.clone()));

    let status = call(authenticator, "/optional", Some(TOKEN)).await;

    assert_eq!(status, expected);
}
