//! Tests for the deal lifecycle services.

use chrono::{TimeZone, Utc};
use mockall::Sequence;
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockAssetStore, MockDealRepository};
use crate::domain::{AccountId, DealDraft, Email, ErrorCode, ImageUpload};

const OLD_IMAGE: &str = "/uploads/1735689600000.png";
const NEW_IMAGE: &str = "/uploads/1735776000000.png";

fn account(role: Role) -> Account {
    Account::new(
        AccountId::random(),
        "Olive".to_owned(),
        Email::new("olive@deals.test").expect("valid email"),
        role,
        Utc::now(),
    )
}

#[fixture]
fn owner() -> Account {
    account(Role::Owner)
}

#[fixture]
fn pizza_night() -> DealDraft {
    DealDraft {
        title: Some("Pizza Night".to_owned()),
        description: Some("Two for one".to_owned()),
        discount: Some("20".to_owned()),
        location: Some("Downtown".to_owned()),
        start_date: Some("2025-01-01".to_owned()),
        end_date: Some("2025-01-10".to_owned()),
    }
}

fn stored_deal(owner: AccountId, image: &str) -> Deal {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("valid date");
    let end = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).single().expect("valid date");
    Deal {
        id: DealId::random(),
        owner,
        title: "Pizza Night".to_owned(),
        description: "Two for one".to_owned(),
        discount: 20.0,
        location: "Downtown".to_owned(),
        image: AssetReference::from(image.to_owned()),
        start_date: start,
        end_date: end,
        created_at: start,
        updated_at: start,
    }
}

fn persisted(new_deal: &NewDeal) -> Deal {
    let now = Utc::now();
    Deal {
        id: DealId::random(),
        owner: new_deal.owner,
        title: new_deal.title.clone(),
        description: new_deal.description.clone(),
        discount: new_deal.discount,
        location: new_deal.location.clone(),
        image: new_deal.image.clone(),
        start_date: new_deal.start_date,
        end_date: new_deal.end_date,
        created_at: now,
        updated_at: now,
    }
}

fn png(len: usize) -> ImageUpload {
    ImageUpload::new("coupon.png", "image/png", vec![7_u8; len])
}

fn commands(
    deals: MockDealRepository,
    assets: MockAssetStore,
) -> DealCommandService<MockDealRepository, MockAssetStore> {
    DealCommandService::new(Arc::new(deals), Arc::new(assets))
}

fn expect_lookup(deals: &mut MockDealRepository, deal: Deal) {
    let id = deal.id;
    deals
        .expect_find_by_id()
        .with(eq(id))
        .returning(move |_| Ok(Some(deal.clone())));
}

#[rstest]
#[tokio::test]
async fn create_without_image_uses_placeholder(owner: Account, pizza_night: DealDraft) {
    let owner_id = owner.id();
    let mut deals = MockDealRepository::new();
    deals
        .expect_insert()
        .withf(move |new| new.owner == owner_id && new.image.is_placeholder())
        .returning(|new| Ok(persisted(new)));
    let mut assets = MockAssetStore::new();
    assets.expect_accept().never();

    let deal = commands(deals, assets)
        .create(CreateDealRequest {
            actor: owner,
            draft: pizza_night,
            image: None,
        })
        .await
        .expect("created");
    assert_eq!(deal.owner, owner_id);
    assert!(deal.image.is_placeholder());
}

#[rstest]
#[tokio::test]
async fn create_attaches_accepted_image(owner: Account, pizza_night: DealDraft) {
    let mut assets = MockAssetStore::new();
    assets
        .expect_accept()
        .times(1)
        .returning(|_| Ok(AssetReference::from(NEW_IMAGE.to_owned())));
    let mut deals = MockDealRepository::new();
    deals
        .expect_insert()
        .withf(|new| new.image.as_str() == NEW_IMAGE)
        .returning(|new| Ok(persisted(new)));

    let deal = commands(deals, assets)
        .create(CreateDealRequest {
            actor: owner,
            draft: pizza_night,
            image: Some(png(1024)),
        })
        .await
        .expect("created");
    assert_eq!(deal.image.as_str(), NEW_IMAGE);
}

#[rstest]
#[case(gif(), ErrorCode::UnsupportedMediaType)]
#[case(png(5 * 1024 * 1024 + 1), ErrorCode::PayloadTooLarge)]
#[tokio::test]
async fn create_rejects_bad_upload_before_writing(
    owner: Account,
    pizza_night: DealDraft,
    #[case] upload: ImageUpload,
    #[case] expected: ErrorCode,
) {
    let mut assets = MockAssetStore::new();
    assets.expect_accept().never();
    let mut deals = MockDealRepository::new();
    deals.expect_insert().never();

    let err = commands(deals, assets)
        .create(CreateDealRequest {
            actor: owner,
            draft: pizza_night,
            image: Some(upload),
        })
        .await
        .expect_err("rejected upload");
    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn create_validates_before_accepting_image(owner: Account, mut pizza_night: DealDraft) {
    pizza_night.end_date = Some("2024-12-31".to_owned());
    let mut assets = MockAssetStore::new();
    assets.expect_accept().never();
    let mut deals = MockDealRepository::new();
    deals.expect_insert().never();

    let err = commands(deals, assets)
        .create(CreateDealRequest {
            actor: owner,
            draft: pizza_night,
            image: Some(png(64)),
        })
        .await
        .expect_err("invalid range");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(err.message().contains("End date must be after start date"));
}

#[rstest]
#[tokio::test]
async fn create_discards_image_when_insert_fails(owner: Account, pizza_night: DealDraft) {
    let mut assets = MockAssetStore::new();
    assets
        .expect_accept()
        .returning(|_| Ok(AssetReference::from(NEW_IMAGE.to_owned())));
    assets
        .expect_discard()
        .withf(|reference| reference.as_str() == NEW_IMAGE)
        .times(1)
        .returning(|_| Ok(()));
    let mut deals = MockDealRepository::new();
    deals
        .expect_insert()
        .returning(|_| Err(DealRepositoryError::connection("refused")));

    let err = commands(deals, assets)
        .create(CreateDealRequest {
            actor: owner,
            draft: pizza_night,
            image: Some(png(64)),
        })
        .await
        .expect_err("insert failed");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[case(Role::User)]
#[case(Role::Admin)]
#[tokio::test]
async fn create_requires_owner_role(pizza_night: DealDraft, #[case] role: Role) {
    let err = commands(MockDealRepository::new(), MockAssetStore::new())
        .create(CreateDealRequest {
            actor: account(role),
            draft: pizza_night,
            image: None,
        })
        .await
        .expect_err("not an owner");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn update_of_unknown_deal_is_not_found(owner: Account) {
    let mut deals = MockDealRepository::new();
    deals.expect_find_by_id().returning(|_| Ok(None));
    deals.expect_update().never();

    let err = commands(deals, MockAssetStore::new())
        .update(UpdateDealRequest {
            actor: owner,
            deal_id: DealId::random(),
            draft: DealDraft::default(),
            image: None,
        })
        .await
        .expect_err("missing deal");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_by_another_owner_is_forbidden_and_touches_nothing(owner: Account) {
    let deal = stored_deal(AccountId::random(), OLD_IMAGE);
    let deal_id = deal.id;
    let mut deals = MockDealRepository::new();
    expect_lookup(&mut deals, deal);
    deals.expect_update().never();
    let mut assets = MockAssetStore::new();
    assets.expect_discard().never();
    assets.expect_accept().never();

    let err = commands(deals, assets)
        .update(UpdateDealRequest {
            actor: owner,
            deal_id,
            draft: DealDraft {
                title: Some("Hijacked".to_owned()),
                ..DealDraft::default()
            },
            image: Some(png(64)),
        })
        .await
        .expect_err("foreign deal");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

fn gif() -> ImageUpload {
    ImageUpload::new("anim.gif", "image/gif", vec![0; 16])
}

#[rstest]
#[case(gif())]
#[case(ImageUpload::truncated("coupon.png", "image/png", 6 * 1024 * 1024))]
#[tokio::test]
async fn update_settles_ownership_before_judging_the_image(
    owner: Account,
    #[case] upload: ImageUpload,
) {
    let deal = stored_deal(AccountId::random(), OLD_IMAGE);
    let deal_id = deal.id;
    let mut deals = MockDealRepository::new();
    expect_lookup(&mut deals, deal);
    deals.expect_update().never();
    let mut assets = MockAssetStore::new();
    assets.expect_discard().never();
    assets.expect_accept().never();

    let err = commands(deals, assets)
        .update(UpdateDealRequest {
            actor: owner,
            deal_id,
            draft: DealDraft::default(),
            image: Some(upload),
        })
        .await
        .expect_err("foreign deal");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn update_of_unknown_deal_with_bad_image_is_not_found(owner: Account) {
    let mut deals = MockDealRepository::new();
    deals.expect_find_by_id().returning(|_| Ok(None));
    let mut assets = MockAssetStore::new();
    assets.expect_accept().never();

    let err = commands(deals, assets)
        .update(UpdateDealRequest {
            actor: owner,
            deal_id: DealId::random(),
            draft: DealDraft::default(),
            image: Some(gif()),
        })
        .await
        .expect_err("missing deal");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_rejects_bad_image_on_own_deal_before_discarding(owner: Account) {
    let deal = stored_deal(owner.id(), OLD_IMAGE);
    let deal_id = deal.id;
    let mut deals = MockDealRepository::new();
    expect_lookup(&mut deals, deal);
    deals.expect_update().never();
    let mut assets = MockAssetStore::new();
    assets.expect_discard().never();
    assets.expect_accept().never();

    let err = commands(deals, assets)
        .update(UpdateDealRequest {
            actor: owner,
            deal_id,
            draft: DealDraft::default(),
            image: Some(gif()),
        })
        .await
        .expect_err("gif rejected");
    assert_eq!(err.code(), ErrorCode::UnsupportedMediaType);
}

#[rstest]
#[tokio::test]
async fn update_discards_old_image_before_accepting_new(owner: Account) {
    let deal = stored_deal(owner.id(), OLD_IMAGE);
    let deal_id = deal.id;
    let mut seq = Sequence::new();
    let mut deals = MockDealRepository::new();
    expect_lookup(&mut deals, deal.clone());
    let mut assets = MockAssetStore::new();
    assets
        .expect_discard()
        .withf(|reference| reference.as_str() == OLD_IMAGE)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    assets
        .expect_accept()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(AssetReference::from(NEW_IMAGE.to_owned())));
    deals
        .expect_update()
        .withf(move |id, changes| {
            *id == deal_id
                && changes.image.as_ref().map(AssetReference::as_str) == Some(NEW_IMAGE)
                && changes.title.as_deref() == Some("Pizza Week")
        })
        .times(1)
        .returning(move |_, changes| {
            let mut updated = deal.clone();
            changes.apply_to(&mut updated);
            Ok(Some(updated))
        });

    let updated = commands(deals, assets)
        .update(UpdateDealRequest {
            actor: owner,
            deal_id,
            draft: DealDraft {
                title: Some("Pizza Week".to_owned()),
                ..DealDraft::default()
            },
            image: Some(png(2 * 1024 * 1024)),
        })
        .await
        .expect("updated");
    assert_eq!(updated.image.as_str(), NEW_IMAGE);
    assert_eq!(updated.title, "Pizza Week");
}

#[rstest]
#[tokio::test]
async fn update_repairs_to_placeholder_when_new_image_cannot_be_stored(owner: Account) {
    let deal = stored_deal(owner.id(), OLD_IMAGE);
    let deal_id = deal.id;
    let mut deals = MockDealRepository::new();
    expect_lookup(&mut deals, deal.clone());
    deals
        .expect_update()
        .withf(|_, changes| {
            changes.image.as_ref().is_some_and(AssetReference::is_placeholder)
                && changes.title.is_none()
        })
        .times(1)
        .returning(move |_, changes| {
            let mut repaired = deal.clone();
            changes.apply_to(&mut repaired);
            Ok(Some(repaired))
        });
    let mut assets = MockAssetStore::new();
    assets.expect_discard().times(1).returning(|_| Ok(()));
    assets
        .expect_accept()
        .returning(|_| Err(AssetStoreError::io("disk full")));

    let err = commands(deals, assets)
        .update(UpdateDealRequest {
            actor: owner,
            deal_id,
            draft: DealDraft {
                title: Some("Pizza Week".to_owned()),
                ..DealDraft::default()
            },
            image: Some(png(64)),
        })
        .await
        .expect_err("accept failed");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn update_discards_new_image_when_write_fails(owner: Account) {
    let deal = stored_deal(owner.id(), AssetReference::placeholder().as_str());
    let deal_id = deal.id;
    let mut deals = MockDealRepository::new();
    expect_lookup(&mut deals, deal);
    deals
        .expect_update()
        .returning(|_, _| Err(DealRepositoryError::query("constraint")));
    let mut assets = MockAssetStore::new();
    assets
        .expect_accept()
        .returning(|_| Ok(AssetReference::from(NEW_IMAGE.to_owned())));
    assets
        .expect_discard()
        .withf(|reference| reference.as_str() == NEW_IMAGE)
        .times(1)
        .returning(|_| Ok(()));

    let err = commands(deals, assets)
        .update(UpdateDealRequest {
            actor: owner,
            deal_id,
            draft: DealDraft::default(),
            image: Some(png(64)),
        })
        .await
        .expect_err("write failed");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn update_rejects_range_that_inverts_stored_dates(owner: Account) {
    let deal = stored_deal(owner.id(), OLD_IMAGE);
    let deal_id = deal.id;
    let mut deals = MockDealRepository::new();
    expect_lookup(&mut deals, deal);
    deals.expect_update().never();
    let mut assets = MockAssetStore::new();
    assets.expect_discard().never();

    let err = commands(deals, assets)
        .update(UpdateDealRequest {
            actor: owner,
            deal_id,
            draft: DealDraft {
                start_date: Some("2025-01-10".to_owned()),
                ..DealDraft::default()
            },
            image: None,
        })
        .await
        .expect_err("equal dates");
    assert!(err.message().contains("End date must be after start date"));
}

#[rstest]
#[tokio::test]
async fn delete_discards_image_then_record(owner: Account) {
    let deal = stored_deal(owner.id(), OLD_IMAGE);
    let deal_id = deal.id;
    let mut seq = Sequence::new();
    let mut deals = MockDealRepository::new();
    expect_lookup(&mut deals, deal);
    let mut assets = MockAssetStore::new();
    assets
        .expect_discard()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    deals
        .expect_delete()
        .with(eq(deal_id))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(true));

    commands(deals, assets)
        .delete(DeleteDealRequest {
            actor: owner,
            deal_id,
        })
        .await
        .expect("deleted");
}

#[rstest]
#[tokio::test]
async fn delete_proceeds_when_image_cannot_be_removed(owner: Account) {
    let deal = stored_deal(owner.id(), OLD_IMAGE);
    let deal_id = deal.id;
    let mut deals = MockDealRepository::new();
    expect_lookup(&mut deals, deal);
    deals.expect_delete().times(1).returning(|_| Ok(true));
    let mut assets = MockAssetStore::new();
    assets
        .expect_discard()
        .returning(|_| Err(AssetStoreError::io("permission denied")));

    commands(deals, assets)
        .delete(DeleteDealRequest {
            actor: owner,
            deal_id,
        })
        .await
        .expect("deleted despite discard failure");
}

#[rstest]
#[tokio::test]
async fn delete_leaves_placeholder_alone(owner: Account) {
    let deal = stored_deal(owner.id(), AssetReference::placeholder().as_str());
    let deal_id = deal.id;
    let mut deals = MockDealRepository::new();
    expect_lookup(&mut deals, deal);
    deals.expect_delete().returning(|_| Ok(true));
    let mut assets = MockAssetStore::new();
    assets.expect_discard().never();

    commands(deals, assets)
        .delete(DeleteDealRequest {
            actor: owner,
            deal_id,
        })
        .await
        .expect("deleted");
}

#[rstest]
#[tokio::test]
async fn delete_by_another_owner_is_forbidden(owner: Account) {
    let deal = stored_deal(AccountId::random(), OLD_IMAGE);
    let deal_id = deal.id;
    let mut deals = MockDealRepository::new();
    expect_lookup(&mut deals, deal);
    deals.expect_delete().never();
    let mut assets = MockAssetStore::new();
    assets.expect_discard().never();

    let err = commands(deals, assets)
        .delete(DeleteDealRequest {
            actor: owner,
            deal_id,
        })
        .await
        .expect_err("foreign deal");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case(Some(Role::Owner), true)]
#[case(Some(Role::User), false)]
#[case(Some(Role::Admin), false)]
#[case(None, false)]
#[tokio::test]
async fn list_is_scoped_only_for_owners(#[case] role: Option<Role>, #[case] scoped: bool) {
    let viewer = role.map(account);
    let expected = match (&viewer, scoped) {
        (Some(viewer), true) => DealFilter::OwnedBy(viewer.id()),
        _ => DealFilter::All,
    };
    let mut deals = MockDealRepository::new();
    deals
        .expect_list()
        .with(eq(expected))
        .times(1)
        .returning(|_| Ok(Vec::new()));

    DealQueryService::new(Arc::new(deals))
        .list(viewer)
        .await
        .expect("listed");
}

#[rstest]
#[tokio::test]
async fn list_mine_is_scoped_regardless_of_role() {
    let viewer = account(Role::User);
    let mut deals = MockDealRepository::new();
    deals
        .expect_list()
        .with(eq(DealFilter::OwnedBy(viewer.id())))
        .returning(|_| Ok(Vec::new()));

    DealQueryService::new(Arc::new(deals))
        .list_mine(viewer)
        .await
        .expect("listed");
}

#[rstest]
#[tokio::test]
async fn get_unknown_deal_is_not_found() {
    let mut deals = MockDealRepository::new();
    deals.expect_find_by_id().returning(|_| Ok(None));

    let err = DealQueryService::new(Arc::new(deals))
        .get(DealId::random())
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}
