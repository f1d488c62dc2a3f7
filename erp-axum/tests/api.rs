use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use erp_axum::{config::AxumConfig, router};
use erp_sqlite::{Db, config::SqliteConfig};
use rstest::*;
use serde_json::{Value, json};

mod app;
use app::{Outbox, TestApp};

async fn server() -> anyhow::Result<(TestServer, Outbox)> {
    let db = Db::open(&SqliteConfig::default()).await?;
    let outbox = Outbox::default();
    let app = TestApp {
        db,
        outbox: outbox.clone(),
    };
    let (router, _) = router(app, AxumConfig::default());
    Ok((TestServer::new(router)?, outbox))
}

/// Register a user and return their bearer token (the user id).
async fn register(server: &TestServer, name: &str, email: &str) -> String {
    let response = server
        .post("/register")
        .json(&json!({ "name": name, "email": email, "password": "correct horse" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    data(&response)["id"].as_str().unwrap().to_owned()
}

fn data(response: &TestResponse) -> Value {
    let body: Value = response.json();
    assert_eq!(body["success"], json!(true), "{body}");
    body["data"].clone()
}

fn error(response: &TestResponse) -> String {
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false), "{body}");
    body["error"].as_str().unwrap().to_owned()
}

#[test_log::test(tokio::test)]
async fn health_and_docs() -> anyhow::Result<()> {
    let (server, _) = server().await?;

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "ok" }));

    let openapi: Value = server.get("/docs/api.json").await.json();
    assert!(openapi["paths"]["/register"].is_object());
    let paths = openapi["paths"].as_object().unwrap();
    assert!(paths.keys().any(|path| path.contains("/reports/ageing")));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn registration_and_login() -> anyhow::Result<()> {
    let (server, _) = server().await?;

    let admin = register(&server, "Asha", "asha@example.com").await;
    let staff = register(&server, "Bikash", "bikash@example.com").await;

    let me = data(&server.get("/me").authorization_bearer(&admin).await);
    assert_eq!(me["role"], json!("admin"));
    let me = data(&server.get("/me").authorization_bearer(&staff).await);
    assert_eq!(me["role"], json!("staff"));
    assert_eq!(me["menu"]["sales"], json!(true));
    assert_eq!(me["menu"]["purchase"], json!(false));

    // emails are normalized before the uniqueness check
    let duplicate = server
        .post("/register")
        .json(&json!({ "name": "Asha", "email": " ASHA@example.com", "password": "another one" }))
        .await;
    duplicate.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error(&duplicate), "email already registered");

    let weak = server
        .post("/register")
        .json(&json!({ "name": "Chandra", "email": "chandra@example.com", "password": "short" }))
        .await;
    weak.assert_status(StatusCode::BAD_REQUEST);

    let wrong = server
        .post("/login")
        .json(&json!({ "email": "asha@example.com", "password": "wrong horse" }))
        .await;
    wrong.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(error(&wrong), "invalid credentials");

    let login = server
        .post("/login")
        .json(&json!({ "email": "Asha@Example.com", "password": "correct horse" }))
        .await;
    login.assert_status_ok();
    let login = data(&login);
    assert_eq!(login["token"], json!(admin));
    assert_eq!(login["user"]["email"], json!("asha@example.com"));
    assert!(login["user"].get("password_hash").is_none());

    server
        .get("/me")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/me")
        .authorization_bearer("not-a-user")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn simultaneous_registrations_make_one_admin() -> anyhow::Result<()> {
    let (server, _) = server().await?;

    let (first, second) = tokio::join!(
        register(&server, "Asha", "asha@example.com"),
        register(&server, "Bikash", "bikash@example.com"),
    );

    let mut roles = Vec::new();
    for token in [first, second] {
        let me = data(&server.get("/me").authorization_bearer(&token).await);
        roles.push(me["role"].as_str().unwrap().to_owned());
    }
    roles.sort();
    assert_eq!(roles, ["admin", "staff"]);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn user_administration() -> anyhow::Result<()> {
    let (server, _) = server().await?;
    let admin = register(&server, "Asha", "asha@example.com").await;
    let staff = register(&server, "Bikash", "bikash@example.com").await;

    server
        .get("/admin/users/list")
        .authorization_bearer(&staff)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let users = data(
        &server
            .get("/admin/users/list")
            .authorization_bearer(&admin)
            .await,
    );
    assert_eq!(users.as_array().map(Vec::len), Some(2));

    // menu flags merge over the existing permissions
    let updated = data(
        &server
            .put(&format!("/admin/users/user-permissions/{staff}"))
            .authorization_bearer(&admin)
            .json(&json!({ "menu": { "purchase": true } }))
            .await,
    );
    assert_eq!(updated["role"], json!("staff"));
    assert_eq!(updated["menu"]["purchase"], json!(true));
    assert_eq!(updated["menu"]["sales"], json!(true));

    // a role change without flags resets the menu to the role defaults
    let updated = data(
        &server
            .put(&format!("/admin/users/user-permissions/{staff}"))
            .authorization_bearer(&admin)
            .json(&json!({ "role": "accountant" }))
            .await,
    );
    assert_eq!(updated["role"], json!("accountant"));
    assert_eq!(updated["menu"]["accounts"], json!(true));
    assert_eq!(updated["menu"]["users"], json!(false));

    let demote = server
        .put(&format!("/admin/users/user-permissions/{admin}"))
        .authorization_bearer(&admin)
        .json(&json!({ "role": "staff" }))
        .await;
    demote.assert_status(StatusCode::BAD_REQUEST);

    server
        .delete(&format!("/admin/users/{admin}"))
        .authorization_bearer(&admin)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // deactivated users can no longer authenticate
    server
        .put(&format!("/admin/users/user-permissions/{staff}"))
        .authorization_bearer(&admin)
        .json(&json!({ "active": false }))
        .await
        .assert_status_ok();
    server
        .get("/me")
        .authorization_bearer(&staff)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .delete(&format!("/admin/users/{staff}"))
        .authorization_bearer(&admin)
        .await
        .assert_status_ok();
    server
        .delete(&format!("/admin/users/{staff}"))
        .authorization_bearer(&admin)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn password_reset() -> anyhow::Result<()> {
    let (server, outbox) = server().await?;
    register(&server, "Asha", "asha@example.com").await;

    // unknown addresses get the same answer but no mail
    server
        .post("/forgot-password")
        .json(&json!({ "email": "nobody@example.com" }))
        .await
        .assert_status_ok();
    assert!(outbox.sent().is_empty());

    server
        .post("/forgot-password")
        .json(&json!({ "email": "asha@example.com" }))
        .await
        .assert_status_ok();
    let sent = outbox.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "asha@example.com");
    let token = sent[0]
        .body
        .lines()
        .find(|line| line.starts_with("reset-"))
        .unwrap()
        .to_owned();

    let reset = |token: String| {
        server
            .post("/reset-password")
            .json(&json!({ "token": token, "password": "battery staple" }))
    };
    reset(token.clone()).await.assert_status_ok();
    let reused = reset(token).await;
    reused.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error(&reused), "invalid or expired reset token");
    reset("reset-unknown".to_owned())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .post("/login")
        .json(&json!({ "email": "asha@example.com", "password": "battery staple" }))
        .await
        .assert_status_ok();
    server
        .post("/login")
        .json(&json!({ "email": "asha@example.com", "password": "correct horse" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

/// A company with a 2024 fiscal year, a customer and a taxable item.
struct Books {
    company: String,
    fiscal_year: String,
    customer: String,
    cash: String,
    item: String,
}

async fn books(server: &TestServer, token: &str) -> Books {
    let company = data(
        &server
            .post("/companies")
            .authorization_bearer(token)
            .json(&json!({ "name": "Himal Traders" }))
            .await,
    );
    assert_eq!(company["vat_rate_bps"], json!(1300));
    let company = company["id"].as_str().unwrap().to_owned();
    let base = format!("/companies/{company}");

    let fiscal_year = data(
        &server
            .post(&format!("{base}/fiscal-years"))
            .authorization_bearer(token)
            .json(&json!({ "name": "2024", "start_date": "2024-01-01", "end_date": "2024-12-31" }))
            .await,
    );
    assert_eq!(fiscal_year["prefixes"]["sales"], json!("SV-2024-"));
    assert_eq!(fiscal_year["is_current"], json!(true));

    let accounts = data(
        &server
            .get(&format!("{base}/accounts"))
            .authorization_bearer(token)
            .await,
    );
    let cash = accounts
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["system"] == json!("cash"))
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_owned();

    let customer = data(
        &server
            .post(&format!("{base}/accounts"))
            .authorization_bearer(token)
            .json(&json!({ "name": "Everest Stores", "group": "sundry_debtor" }))
            .await,
    );
    let item = data(
        &server
            .post(&format!("{base}/stock-items"))
            .authorization_bearer(token)
            .json(&json!({
                "name": "Rice 25kg",
                "unit": "bag",
                "opening_quantity": 10.0,
                "opening_rate": 40000
            }))
            .await,
    );

    Books {
        company,
        fiscal_year: fiscal_year["id"].as_str().unwrap().to_owned(),
        customer: customer["id"].as_str().unwrap().to_owned(),
        cash,
        item: item["id"].as_str().unwrap().to_owned(),
    }
}

#[test_log::test(tokio::test)]
async fn company_scoping() -> anyhow::Result<()> {
    let (server, _) = server().await?;
    let admin = register(&server, "Asha", "asha@example.com").await;
    let staff = register(&server, "Bikash", "bikash@example.com").await;
    let books = books(&server, &admin).await;
    let base = format!("/companies/{}", books.company);

    // staff may not create companies and cannot see this one yet
    server
        .post("/companies")
        .authorization_bearer(&staff)
        .json(&json!({ "name": "Other" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    let visible = data(&server.get("/companies").authorization_bearer(&staff).await);
    assert_eq!(visible, json!([]));
    server
        .get(&base)
        .authorization_bearer(&staff)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let members = data(
        &server
            .post(&format!("{base}/members"))
            .authorization_bearer(&admin)
            .json(&json!({ "user_id": staff }))
            .await,
    );
    assert_eq!(members.as_array().map(Vec::len), Some(2));

    server
        .get(&base)
        .authorization_bearer(&staff)
        .await
        .assert_status_ok();
    // staff have the sales menu but not the accounts menu
    server
        .post(&format!("{base}/accounts"))
        .authorization_bearer(&staff)
        .json(&json!({ "name": "Annapurna Mart", "group": "sundry_debtor" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let duplicate = server
        .post(&format!("{base}/fiscal-years"))
        .authorization_bearer(&admin)
        .json(&json!({ "name": "2024", "start_date": "2025-01-01", "end_date": "2025-12-31" }))
        .await;
    duplicate.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error(&duplicate), "fiscal year name already exists");

    server
        .post(&format!("{base}/fiscal-years"))
        .authorization_bearer(&admin)
        .json(&json!({ "name": "2024/25", "start_date": "2024-07-01", "end_date": "2025-06-30" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let system = data(
        &server
            .get(&format!("{base}/accounts/{}", books.cash))
            .authorization_bearer(&admin)
            .await,
    );
    assert_eq!(system["name"], json!("Cash"));
    server
        .delete(&format!("{base}/accounts/{}", books.cash))
        .authorization_bearer(&admin)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[rstest]
#[case::receivable("receivable", 126000)]
#[case::payable("payable", 0)]
#[test_log::test(tokio::test)]
async fn vouchers_and_reports(#[case] kind: &str, #[case] balance: i64) -> anyhow::Result<()> {
    let (server, _) = server().await?;
    let admin = register(&server, "Asha", "asha@example.com").await;
    let books = books(&server, &admin).await;
    let base = format!("/companies/{}", books.company);

    let sale = json!({
        "fiscal_year_id": books.fiscal_year,
        "voucher_type": "sales",
        "date": "2024-03-01",
        "party_account_id": books.customer,
        "lines": [{ "item_id": books.item, "quantity": 2.0, "rate": 50000 }]
    });
    for expected in ["SV-2024-0001", "SV-2024-0002"] {
        let voucher = data(
            &server
                .post(&format!("{base}/vouchers"))
                .authorization_bearer(&admin)
                .json(&sale)
                .await,
        );
        assert_eq!(voucher["number"], json!(expected));
        assert_eq!(
            voucher["totals"],
            json!({ "taxable": 100000, "non_vat": 0, "vat": 13000, "total": 113000 })
        );
    }

    let receipt = data(
        &server
            .post(&format!("{base}/vouchers"))
            .authorization_bearer(&admin)
            .json(&json!({
                "fiscal_year_id": books.fiscal_year,
                "voucher_type": "receipt",
                "date": "2024-03-10",
                "party_account_id": books.customer,
                "cash_account_id": books.cash,
                "amount": 100000
            }))
            .await,
    );
    assert_eq!(receipt["number"], json!("RV-2024-0001"));

    let outside = server
        .post(&format!("{base}/vouchers"))
        .authorization_bearer(&admin)
        .json(&json!({
            "fiscal_year_id": books.fiscal_year,
            "voucher_type": "sales",
            "date": "2025-01-01",
            "party_account_id": books.customer,
            "lines": [{ "item_id": books.item, "quantity": 1.0, "rate": 100 }]
        }))
        .await;
    outside.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error(&outside), "date is outside the fiscal year");

    let huge = server
        .post(&format!("{base}/vouchers"))
        .authorization_bearer(&admin)
        .json(&json!({
            "fiscal_year_id": books.fiscal_year,
            "voucher_type": "sales",
            "date": "2024-03-01",
            "party_account_id": books.customer,
            "lines": [{ "item_id": books.item, "quantity": 1e300, "rate": 50000 }]
        }))
        .await;
    huge.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error(&huge), "amount is out of range");

    let sales = data(
        &server
            .get(&format!("{base}/vouchers?voucher_type=sales"))
            .authorization_bearer(&admin)
            .await,
    );
    assert_eq!(sales.as_array().map(Vec::len), Some(2));
    let limited = data(
        &server
            .get(&format!("{base}/vouchers?limit=1"))
            .authorization_bearer(&admin)
            .await,
    );
    assert_eq!(limited.as_array().map(Vec::len), Some(1));

    let fy = &books.fiscal_year;
    let ageing = data(
        &server
            .get(&format!(
                "{base}/reports/ageing?fiscal_year_id={fy}&as_of=2024-03-31&kind={kind}"
            ))
            .authorization_bearer(&admin)
            .await,
    );
    assert_eq!(ageing["totals"]["balance"], json!(balance));
    if balance != 0 {
        let row = &ageing["rows"][0];
        assert_eq!(row["account_name"], json!("Everest Stores"));
        let nets: i64 = row["buckets"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["net"].as_i64().unwrap())
            .sum();
        assert_eq!(nets, balance);
        // both sales and the receipt are within 30 days of the report date
        assert_eq!(row["buckets"][0]["net"], json!(balance));
    }

    for as_of in ["2023-12-31", "2025-01-01"] {
        let outside = server
            .get(&format!(
                "{base}/reports/ageing?fiscal_year_id={fy}&as_of={as_of}&kind={kind}"
            ))
            .authorization_bearer(&admin)
            .await;
        outside.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error(&outside), "report date is outside the fiscal year");
    }

    let vat = data(
        &server
            .get(&format!("{base}/reports/vat?fiscal_year_id={fy}&to=2024-12-31"))
            .authorization_bearer(&admin)
            .await,
    );
    assert_eq!(vat["output_vat"], json!(26000));
    assert_eq!(vat["net_payable"], json!(26000));
    assert_eq!(vat["register"].as_array().map(Vec::len), Some(2));

    let trial = data(
        &server
            .get(&format!("{base}/reports/trial-balance?fiscal_year_id={fy}&as_of=2024-12-31"))
            .authorization_bearer(&admin)
            .await,
    );
    assert_eq!(trial["total_debit"], trial["total_credit"]);

    let stock = data(
        &server
            .get(&format!("{base}/reports/stock?fiscal_year_id={fy}&to=2024-12-31"))
            .authorization_bearer(&admin)
            .await,
    );
    let row = &stock["rows"][0];
    assert_eq!(row["opening"], json!(10.0));
    assert_eq!(row["outward"], json!(4.0));
    assert_eq!(row["closing"], json!(6.0));
    assert_eq!(row["closing_value"], json!(240000));

    let ledger = data(
        &server
            .get(&format!(
                "{base}/reports/ledger/{}?fiscal_year_id={fy}&to=2024-12-31",
                books.customer
            ))
            .authorization_bearer(&admin)
            .await,
    );
    assert_eq!(ledger["lines"].as_array().map(Vec::len), Some(3));
    assert_eq!(ledger["closing"], json!(126000));

    // referenced accounts cannot be deleted
    server
        .delete(&format!("{base}/accounts/{}", books.customer))
        .authorization_bearer(&admin)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}
