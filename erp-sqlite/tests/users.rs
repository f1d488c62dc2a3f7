mod common;

use erp_core::{
    models::{MenuSection, NewUser, Role, SignUp, UserAccessUpdate, UserId},
    ports::{UserFailure, UserRepository},
};
use time::Duration;

#[tokio::test]
async fn duplicate_email_is_rejected() -> anyhow::Result<()> {
    let db = common::open().await?;
    assert!(db.list_users().await?.is_empty());

    common::user(&db, "jane@example.com", Role::Admin).await?;
    let duplicate = db
        .create_user(
            UserId::new_v4(),
            NewUser {
                name: "Other Jane".into(),
                email: "jane@example.com".into(),
                password_hash: "hash".into(),
                role: Role::Staff,
                menu: Role::Staff.default_menu(),
            },
            common::now(),
        )
        .await?;

    assert!(matches!(duplicate, Err(UserFailure::EmailTaken)));
    assert_eq!(db.list_users().await?.len(), 1);
    Ok(())
}

fn sign_up(email: &str) -> SignUp {
    SignUp {
        name: email.split('@').next().unwrap_or(email).to_owned(),
        email: email.to_owned(),
        password_hash: "hash".into(),
    }
}

#[tokio::test]
async fn first_registration_becomes_admin() -> anyhow::Result<()> {
    let db = common::open().await?;

    let first = db
        .register_user(UserId::new_v4(), sign_up("asha@example.com"), common::now())
        .await?
        .map_err(|f| anyhow::anyhow!("{f}"))?;
    let second = db
        .register_user(UserId::new_v4(), sign_up("bikash@example.com"), common::now())
        .await?
        .map_err(|f| anyhow::anyhow!("{f}"))?;

    assert_eq!(first.role, Role::Admin);
    assert_eq!(first.menu, Role::Admin.default_menu());
    assert_eq!(second.role, Role::Staff);
    assert_eq!(second.menu, Role::Staff.default_menu());
    assert_eq!(db.get_user(second.id).await?, Some(second));

    let duplicate = db
        .register_user(UserId::new_v4(), sign_up("asha@example.com"), common::now())
        .await?;
    assert!(matches!(duplicate, Err(UserFailure::EmailTaken)));
    Ok(())
}

#[tokio::test]
async fn concurrent_registrations_yield_one_admin() -> anyhow::Result<()> {
    let db = common::open().await?;

    let (a, b, c) = tokio::join!(
        db.register_user(UserId::new_v4(), sign_up("a@example.com"), common::now()),
        db.register_user(UserId::new_v4(), sign_up("b@example.com"), common::now()),
        db.register_user(UserId::new_v4(), sign_up("c@example.com"), common::now()),
    );
    for registered in [a, b, c] {
        registered?.map_err(|f| anyhow::anyhow!("{f}"))?;
    }

    let admins = db
        .list_users()
        .await?
        .into_iter()
        .filter(|user| user.role == Role::Admin)
        .count();
    assert_eq!(admins, 1);
    Ok(())
}

#[tokio::test]
async fn credentials_and_access_updates() -> anyhow::Result<()> {
    let db = common::open().await?;
    let user_id = common::user(&db, "staff@example.com", Role::Staff).await?;

    let (user, hash) = db
        .get_credentials("staff@example.com")
        .await?
        .expect("user exists");
    assert_eq!(user.id, user_id);
    assert_eq!(hash, "hash");
    assert!(user.can(MenuSection::Sales));
    assert!(!user.can(MenuSection::Purchase));

    let access = UserAccessUpdate {
        role: Some(Role::Accountant),
        ..Default::default()
    }
    .apply(&user);
    let updated = db
        .update_user_access(user_id, access, common::now())
        .await?
        .map_err(|f| anyhow::anyhow!("{f}"))?;
    assert_eq!(updated.role, Role::Accountant);
    assert!(updated.can(MenuSection::Purchase));
    assert_eq!(db.get_user(user_id).await?, Some(updated));

    db.delete_user(user_id)
        .await?
        .map_err(|f| anyhow::anyhow!("{f}"))?;
    assert_eq!(db.get_user(user_id).await?, None);
    assert!(matches!(
        db.delete_user(user_id).await?,
        Err(UserFailure::DoesNotExist)
    ));
    Ok(())
}

#[tokio::test]
async fn reset_tokens_are_single_use() -> anyhow::Result<()> {
    let db = common::open().await?;
    let user_id = common::user(&db, "reset@example.com", Role::Staff).await?;
    let now = common::now();

    db.create_reset_token(user_id, "first".into(), now + Duration::hours(1), now)
        .await?;
    db.create_reset_token(user_id, "second".into(), now + Duration::hours(1), now)
        .await?;

    assert_eq!(
        db.reset_password("unknown".into(), "new-hash".into(), now)
            .await?,
        None
    );
    assert_eq!(
        db.reset_password("first".into(), "new-hash".into(), now)
            .await?,
        Some(user_id)
    );
    let (_, hash) = db
        .get_credentials("reset@example.com")
        .await?
        .expect("user exists");
    assert_eq!(hash, "new-hash");

    // both tokens were consumed by the successful reset
    assert_eq!(
        db.reset_password("first".into(), "again".into(), now).await?,
        None
    );
    assert_eq!(
        db.reset_password("second".into(), "again".into(), now)
            .await?,
        None
    );
    Ok(())
}

#[tokio::test]
async fn expired_reset_tokens_are_refused() -> anyhow::Result<()> {
    let db = common::open().await?;
    let user_id = common::user(&db, "late@example.com", Role::Staff).await?;
    let issued = common::now();

    db.create_reset_token(user_id, "token".into(), issued + Duration::hours(1), issued)
        .await?;
    assert_eq!(
        db.reset_password("token".into(), "new".into(), issued + Duration::hours(2))
            .await?,
        None
    );
    Ok(())
}
