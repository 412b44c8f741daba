//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly. Names get a random suffix
//! because every test shares one database.

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use rollcall_core::domains::casts::actions::create_cast;
use rollcall_core::domains::casts::models::{Cast, CastInput};
use rollcall_core::domains::events::models::{Event, EventInput};
use rollcall_core::domains::profiles::models::{NewAccount, Profile, User};
use uuid::Uuid;

use super::TestHarness;

/// An account with its profile and a bearer token for it
pub struct TestAccount {
    pub user: User,
    pub profile: Profile,
    pub token: String,
}

impl TestAccount {
    pub fn username(&self) -> &str {
        &self.user.username
    }
}

pub fn unique(prefix: &str) -> String {
    format!("{}{}", prefix, &Uuid::new_v4().simple().to_string()[..10])
}

pub fn new_account(username: &str, birth_date: NaiveDate) -> NewAccount {
    NewAccount {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        first_name: "Test".to_string(),
        last_name: username.to_string(),
        alt: None,
        birth_date,
    }
}

pub fn adult_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 6, 15).unwrap()
}

pub fn cast_input(name: &str) -> CastInput {
    CastInput {
        name: name.to_string(),
        description: "Shadow cast for testing".to_string(),
        external_url: None,
        facebook_url: None,
        twitter_user: None,
        instagram_user: None,
    }
}

pub fn event_input(name: &str, date: NaiveDate) -> EventInput {
    EventInput {
        name: name.to_string(),
        description: String::new(),
        venue: "The Midnight Theater".to_string(),
        date,
        start_time: NaiveTime::from_hms_opt(23, 30, 0).unwrap(),
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

impl TestHarness {
    /// Create an adult account whose username starts with `prefix`
    pub async fn account(&self, prefix: &str) -> TestAccount {
        let username = unique(prefix);
        let (user, profile) =
            User::create_with_profile(&new_account(&username, adult_birth_date()), &self.db_pool)
                .await
                .expect("Failed to create test account");
        let token = self.token_for(&user, &profile);

        TestAccount {
            user,
            profile,
            token,
        }
    }

    pub fn token_for(&self, user: &User, profile: &Profile) -> String {
        self.jwt_service
            .create_token(user.id, profile.id, user.username.clone())
            .expect("Failed to create test token")
    }

    /// Register a cast with `founder` as its only member and manager
    pub async fn cast(&self, prefix: &str, founder: &TestAccount) -> Cast {
        create_cast(
            cast_input(&unique(prefix)),
            Some(founder.profile.id),
            &self.db_pool,
        )
        .await
        .expect("Failed to create test cast")
    }

    pub async fn event(&self, cast: &Cast, name: &str, date: NaiveDate) -> Event {
        Event::create(cast.id, &event_input(name, date), &self.db_pool)
            .await
            .expect("Failed to create test event")
    }
}
