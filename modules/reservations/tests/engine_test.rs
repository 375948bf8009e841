use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use reservations::contract::model::{
    NewReservation, NewRoom, Principal, Reservation, ReservationPatch,
};
use reservations::domain::accounts::{digest_password, AccountService};
use reservations::domain::clock::FixedClock;
use reservations::domain::error::DomainError;
use reservations::domain::repo::UsersRepository;
use reservations::domain::rooms::RoomService;
use reservations::domain::service::ReservationService;
use reservations::infra::events::TracingEventPublisher;
use reservations::infra::notify::NullNotifier;
use reservations::infra::storage::migrations::Migrator;
use reservations::infra::storage::sea_orm_repo::{
    SeaOrmReservationsRepository, SeaOrmRoomsRepository, SeaOrmUsersRepository,
};

/// Create a fresh test database for each test. One pooled connection keeps
/// every query on the same in-memory database.
async fn create_test_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

struct TestApp {
    reservations: Arc<ReservationService>,
    rooms: Arc<RoomService>,
    accounts: Arc<AccountService>,
    users_repo: Arc<SeaOrmUsersRepository>,
    clock: Arc<FixedClock>,
}

/// "Now" for all tests: 2025-06-01 09:00 UTC.
fn base_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
}

/// Same-day clock time, for readable interval literals.
fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, hour, min, 0).unwrap()
}

async fn create_test_app() -> TestApp {
    let db = create_test_db().await;

    let reservations_repo = Arc::new(SeaOrmReservationsRepository::new(db.clone()));
    let rooms_repo = Arc::new(SeaOrmRoomsRepository::new(db.clone()));
    let users_repo = Arc::new(SeaOrmUsersRepository::new(db));
    let clock = Arc::new(FixedClock::new(base_now()));

    let reservations = Arc::new(ReservationService::new(
        reservations_repo,
        rooms_repo.clone(),
        users_repo.clone(),
        clock.clone(),
        Arc::new(NullNotifier),
        Arc::new(TracingEventPublisher),
    ));
    let rooms = Arc::new(RoomService::new(rooms_repo));
    let accounts = Arc::new(AccountService::new(users_repo.clone(), clock.clone()));

    TestApp {
        reservations,
        rooms,
        accounts,
        users_repo,
        clock,
    }
}

/// An elevated principal that exists only as a value; room administration
/// and listing never dereference the acting user.
fn synthetic_admin() -> Principal {
    Principal {
        user_id: Uuid::new_v4(),
        is_admin: true,
    }
}

impl TestApp {
    async fn seed_user(&self, username: &str, is_admin: bool) -> Principal {
        use reservations::domain::clock::Clock;

        let user = reservations::contract::model::UserAccount {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            is_admin,
            created_at: self.clock.now(),
        };
        self.users_repo
            .insert(user.clone(), digest_password("pw"))
            .await
            .expect("Failed to seed user");
        Principal {
            user_id: user.id,
            is_admin,
        }
    }

    async fn seed_room(&self, name: &str) -> Uuid {
        let room = self
            .rooms
            .create(
                NewRoom {
                    name: name.to_string(),
                    capacity: 10,
                    location: "Floor 2".to_string(),
                },
                &synthetic_admin(),
            )
            .await
            .expect("Failed to seed room");
        room.id
    }

    async fn all_reservations(&self) -> Vec<Reservation> {
        self.reservations
            .list_visible(&synthetic_admin())
            .await
            .expect("Failed to list reservations")
    }
}

fn candidate(
    room_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    user_id: Option<Uuid>,
) -> NewReservation {
    NewReservation {
        room_id,
        start,
        end,
        user_id,
    }
}

#[tokio::test]
async fn back_to_back_reservations_do_not_conflict() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Aquarium").await;
    let alice = app.seed_user("alice", false).await;
    let bob = app.seed_user("bob", false).await;

    let first = app
        .reservations
        .create(candidate(room, at(10, 0), at(11, 0), None), &alice)
        .await?;
    let second = app
        .reservations
        .create(candidate(room, at(11, 0), at(12, 0), None), &bob)
        .await?;

    // [10:00,11:00) and [11:00,12:00): the shared boundary is not occupied
    assert_eq!(first.end, second.start);
    assert_eq!(app.all_reservations().await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn overlapping_reservation_rejected_and_store_unchanged() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Boardroom").await;
    let alice = app.seed_user("alice", false).await;
    let bob = app.seed_user("bob", false).await;

    app.reservations
        .create(candidate(room, at(10, 0), at(11, 0), None), &alice)
        .await?;

    let result = app
        .reservations
        .create(candidate(room, at(10, 30), at(11, 30), None), &bob)
        .await;

    assert!(matches!(result, Err(DomainError::SlotTaken { .. })));
    let stored = app.all_reservations().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user_id, alice.user_id);
    Ok(())
}

#[tokio::test]
async fn identical_intervals_always_conflict() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Cavern").await;
    let alice = app.seed_user("alice", false).await;
    let bob = app.seed_user("bob", false).await;

    app.reservations
        .create(candidate(room, at(14, 0), at(15, 0), None), &alice)
        .await?;

    let result = app
        .reservations
        .create(candidate(room, at(14, 0), at(15, 0), None), &bob)
        .await;

    assert!(matches!(result, Err(DomainError::SlotTaken { .. })));
    Ok(())
}

#[tokio::test]
async fn same_slot_in_another_room_is_allowed() -> Result<()> {
    let app = create_test_app().await;
    let room_a = app.seed_room("North").await;
    let room_b = app.seed_room("South").await;
    let alice = app.seed_user("alice", false).await;

    // One user may hold simultaneous reservations in different rooms.
    app.reservations
        .create(candidate(room_a, at(10, 0), at(11, 0), None), &alice)
        .await?;
    app.reservations
        .create(candidate(room_b, at(10, 0), at(11, 0), None), &alice)
        .await?;

    assert_eq!(app.all_reservations().await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn reversed_or_empty_interval_rejected() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Dunes").await;
    let admin = app.seed_user("root", true).await;

    // Privilege does not bypass temporal rules.
    let reversed = app
        .reservations
        .create(candidate(room, at(14, 0), at(13, 0), None), &admin)
        .await;
    assert!(matches!(reversed, Err(DomainError::InvalidInterval)));

    let empty = app
        .reservations
        .create(candidate(room, at(14, 0), at(14, 0), None), &admin)
        .await;
    assert!(matches!(empty, Err(DomainError::InvalidInterval)));

    assert!(app.all_reservations().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn past_start_rejected_on_create() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Estuary").await;
    let alice = app.seed_user("alice", false).await;

    // Clock reads 09:00; an 08:00 start is already gone.
    let result = app
        .reservations
        .create(candidate(room, at(8, 0), at(10, 0), None), &alice)
        .await;

    assert!(matches!(result, Err(DomainError::PastStart)));
    assert!(app.all_reservations().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn spoofed_owner_is_overwritten_for_non_admin() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Forge").await;
    let alice = app.seed_user("alice", false).await;
    let bob = app.seed_user("bob", false).await;

    let reservation = app
        .reservations
        .create(
            candidate(room, at(10, 0), at(11, 0), Some(bob.user_id)),
            &alice,
        )
        .await?;

    // Overwritten silently, not rejected.
    assert_eq!(reservation.user_id, alice.user_id);
    Ok(())
}

#[tokio::test]
async fn admin_may_book_on_behalf_of_target() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Gallery").await;
    let admin = app.seed_user("root", true).await;
    let bob = app.seed_user("bob", false).await;

    let for_bob = app
        .reservations
        .create(
            candidate(room, at(10, 0), at(11, 0), Some(bob.user_id)),
            &admin,
        )
        .await?;
    assert_eq!(for_bob.user_id, bob.user_id);

    // No target supplied: administrators book for themselves.
    let for_self = app
        .reservations
        .create(candidate(room, at(11, 0), at(12, 0), None), &admin)
        .await?;
    assert_eq!(for_self.user_id, admin.user_id);
    Ok(())
}

#[tokio::test]
async fn admin_booking_for_unknown_user_is_not_found() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Harbor").await;
    let admin = app.seed_user("root", true).await;

    let ghost = Uuid::new_v4();
    let result = app
        .reservations
        .create(candidate(room, at(10, 0), at(11, 0), Some(ghost)), &admin)
        .await;

    assert!(matches!(result, Err(DomainError::UserNotFound { id }) if id == ghost));
    Ok(())
}

#[tokio::test]
async fn unknown_room_is_not_found() -> Result<()> {
    let app = create_test_app().await;
    let alice = app.seed_user("alice", false).await;

    let ghost = Uuid::new_v4();
    let result = app
        .reservations
        .create(candidate(ghost, at(10, 0), at(11, 0), None), &alice)
        .await;

    assert!(matches!(result, Err(DomainError::RoomNotFound { id }) if id == ghost));
    Ok(())
}

#[tokio::test]
async fn edit_does_not_conflict_with_itself() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Icehouse").await;
    let alice = app.seed_user("alice", false).await;

    let reservation = app
        .reservations
        .create(candidate(room, at(10, 0), at(11, 0), None), &alice)
        .await?;

    // Extending the end within the same slot must not self-conflict.
    let patch = ReservationPatch {
        end: Some(at(11, 30)),
        ..Default::default()
    };
    let updated = app
        .reservations
        .update(reservation.id, patch, &alice)
        .await?;

    assert_eq!(updated.id, reservation.id);
    assert_eq!(updated.start, at(10, 0));
    assert_eq!(updated.end, at(11, 30));
    Ok(())
}

#[tokio::test]
async fn edit_conflicting_with_another_reservation_rejected() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Junction").await;
    let alice = app.seed_user("alice", false).await;
    let bob = app.seed_user("bob", false).await;

    let first = app
        .reservations
        .create(candidate(room, at(10, 0), at(11, 0), None), &alice)
        .await?;
    app.reservations
        .create(candidate(room, at(11, 0), at(12, 0), None), &bob)
        .await?;

    let patch = ReservationPatch {
        end: Some(at(11, 30)),
        ..Default::default()
    };
    let result = app.reservations.update(first.id, patch, &alice).await;

    assert!(matches!(result, Err(DomainError::SlotTaken { .. })));

    // The rejected edit left the original interval in place.
    let stored = app.all_reservations().await;
    let kept = stored.iter().find(|r| r.id == first.id).unwrap();
    assert_eq!(kept.end, at(11, 0));
    Ok(())
}

#[tokio::test]
async fn edit_by_non_admin_cannot_reassign_owner() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Keep").await;
    let alice = app.seed_user("alice", false).await;
    let bob = app.seed_user("bob", false).await;

    let reservation = app
        .reservations
        .create(candidate(room, at(10, 0), at(11, 0), None), &alice)
        .await?;

    let patch = ReservationPatch {
        user_id: Some(bob.user_id),
        ..Default::default()
    };
    let updated = app
        .reservations
        .update(reservation.id, patch, &alice)
        .await?;

    assert_eq!(updated.user_id, alice.user_id);
    Ok(())
}

#[tokio::test]
async fn edit_by_stranger_is_forbidden() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Lagoon").await;
    let alice = app.seed_user("alice", false).await;
    let mallory = app.seed_user("mallory", false).await;

    let reservation = app
        .reservations
        .create(candidate(room, at(10, 0), at(11, 0), None), &alice)
        .await?;

    let patch = ReservationPatch {
        end: Some(at(11, 30)),
        ..Default::default()
    };
    let result = app.reservations.update(reservation.id, patch, &mallory).await;

    assert!(matches!(result, Err(DomainError::Forbidden)));
    Ok(())
}

#[tokio::test]
async fn edit_reapplies_past_rules_to_new_bounds() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Mill").await;
    let alice = app.seed_user("alice", false).await;

    let reservation = app
        .reservations
        .create(candidate(room, at(10, 0), at(11, 0), None), &alice)
        .await?;

    let patch = ReservationPatch {
        start: Some(at(8, 0)),
        ..Default::default()
    };
    let result = app.reservations.update(reservation.id, patch, &alice).await;

    assert!(matches!(result, Err(DomainError::PastStart)));
    Ok(())
}

#[tokio::test]
async fn cancel_by_owner_and_admin_allowed() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Nook").await;
    let alice = app.seed_user("alice", false).await;
    let admin = app.seed_user("root", true).await;

    let own = app
        .reservations
        .create(candidate(room, at(10, 0), at(11, 0), None), &alice)
        .await?;
    let other = app
        .reservations
        .create(candidate(room, at(11, 0), at(12, 0), None), &alice)
        .await?;

    app.reservations.cancel(own.id, &alice).await?;
    app.reservations.cancel(other.id, &admin).await?;

    assert!(app.all_reservations().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn cancel_by_stranger_forbidden_and_reservation_kept() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Orchard").await;
    let alice = app.seed_user("alice", false).await;
    let mallory = app.seed_user("mallory", false).await;

    let reservation = app
        .reservations
        .create(candidate(room, at(10, 0), at(11, 0), None), &alice)
        .await?;

    let result = app.reservations.cancel(reservation.id, &mallory).await;

    assert!(matches!(result, Err(DomainError::Forbidden)));
    assert_eq!(app.all_reservations().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn cancel_has_no_temporal_restriction() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Pier").await;
    let alice = app.seed_user("alice", false).await;

    let reservation = app
        .reservations
        .create(candidate(room, at(10, 0), at(11, 0), None), &alice)
        .await?;

    // The meeting is long over; cancellation still goes through.
    app.clock.set(at(18, 0));
    app.reservations.cancel(reservation.id, &alice).await?;

    assert!(app.all_reservations().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn concurrent_overlapping_submits_have_one_winner() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Quarry").await;
    let alice = app.seed_user("alice", false).await;
    let bob = app.seed_user("bob", false).await;

    let first = app
        .reservations
        .create(candidate(room, at(10, 0), at(11, 0), None), &alice);
    let second = app
        .reservations
        .create(candidate(room, at(10, 30), at(11, 30), None), &bob);

    let (r1, r2) = tokio::join!(first, second);

    let accepted = [r1.is_ok(), r2.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(accepted, 1, "exactly one of two racing submits may commit");

    let rejected = [r1, r2].into_iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        rejected.unwrap_err(),
        DomainError::SlotTaken { .. }
    ));
    assert_eq!(app.all_reservations().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn visibility_rules_for_listing() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Rotunda").await;
    let alice = app.seed_user("alice", false).await;
    let bob = app.seed_user("bob", false).await;
    let admin = app.seed_user("root", true).await;

    app.reservations
        .create(candidate(room, at(10, 0), at(11, 0), None), &alice)
        .await?;
    app.reservations
        .create(candidate(room, at(11, 0), at(12, 0), None), &bob)
        .await?;

    assert_eq!(app.reservations.list_visible(&alice).await?.len(), 1);
    assert_eq!(app.reservations.list_visible(&admin).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn upcoming_is_limited_and_ordered() -> Result<()> {
    let app = create_test_app().await;
    let room = app.seed_room("Spire").await;
    let alice = app.seed_user("alice", false).await;

    for hour in [15, 11, 13, 10, 14, 12] {
        app.reservations
            .create(candidate(room, at(hour, 0), at(hour, 30), None), &alice)
            .await?;
    }

    let upcoming = app.reservations.upcoming(&alice, 5).await?;
    assert_eq!(upcoming.len(), 5);
    let starts: Vec<_> = upcoming.iter().map(|r| r.start).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
    assert_eq!(upcoming[0].start, at(10, 0));
    Ok(())
}

#[tokio::test]
async fn local_client_exposes_the_same_rules() -> Result<()> {
    use reservations::contract::client::ReservationsApi;
    use reservations::contract::error::ReservationsError;
    use reservations::gateways::local::ReservationsLocalClient;

    let app = create_test_app().await;
    let room = app.seed_room("Terrace").await;
    let alice = app.seed_user("alice", false).await;
    let bob = app.seed_user("bob", false).await;

    let client: Arc<dyn ReservationsApi> = Arc::new(ReservationsLocalClient::new(
        app.reservations.clone(),
        app.rooms.clone(),
        app.accounts.clone(),
        5,
    ));

    let rooms = client.list_rooms().await?;
    assert_eq!(rooms.len(), 1);
    assert_eq!(client.get_room(room).await?.name, "Terrace");

    let created = client
        .create_reservation(candidate(room, at(10, 0), at(11, 0), None), alice)
        .await?;
    assert_eq!(created.user_id, alice.user_id);

    // Contract-level error for a losing submit
    let err = client
        .create_reservation(candidate(room, at(10, 30), at(11, 30), None), bob)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ReservationsError>(),
        Some(ReservationsError::SlotTaken)
    ));

    let mine = client.list_reservations(alice).await?;
    assert_eq!(mine.len(), 1);

    client.cancel_reservation(created.id, alice).await?;
    assert!(client.list_reservations(alice).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn login_issues_token_that_resolves_to_principal() -> Result<()> {
    let app = create_test_app().await;
    let alice = app.seed_user("alice", false).await;

    let (token, user) = app.accounts.login("alice", "pw").await?;
    assert_eq!(user.id, alice.user_id);

    let principal = app.accounts.principal_for_token(token).await?;
    assert_eq!(
        principal,
        Some(Principal {
            user_id: alice.user_id,
            is_admin: false
        })
    );

    let bad = app.accounts.login("alice", "wrong").await;
    assert!(matches!(bad, Err(DomainError::InvalidCredentials)));

    let unknown = app.accounts.principal_for_token(Uuid::new_v4()).await?;
    assert_eq!(unknown, None);
    Ok(())
}
