use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::common::{Page, PageArgs, PaginationError};
use crate::domains::casts::models::Cast;
use crate::domains::profiles::models::profile::adult_born_by;
use crate::domains::profiles::models::{Profile, ProfileCard};

pub const SEARCH_PER_PAGE: i64 = 12;

/// `?name=...&page=...`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchArgs {
    #[serde(default)]
    pub name: String,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl SearchArgs {
    fn page_args(&self) -> PageArgs {
        PageArgs {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Casts whose names are trigram-similar to the query. A blank query
/// finds nothing.
pub async fn search_casts(args: &SearchArgs, pool: &PgPool) -> Result<Page<Cast>, SearchError> {
    let page = args.page_args().validate(SEARCH_PER_PAGE)?;
    let name = args.name.trim();
    if name.is_empty() {
        return Ok(Page::empty(&page));
    }

    let (casts, total) = Cast::search_by_name(name, &page, pool).await?;
    debug!(query = %name, total, "Cast search");
    Ok(Page::new(casts, total, &page))
}

/// Adults who opted into search, matching every term of the query.
pub async fn search_profiles(
    args: &SearchArgs,
    today: NaiveDate,
    pool: &PgPool,
) -> Result<Page<ProfileCard>, SearchError> {
    let page = args.page_args().validate(SEARCH_PER_PAGE)?;
    let terms: Vec<String> = args.name.split_whitespace().map(str::to_string).collect();
    if terms.is_empty() {
        return Ok(Page::empty(&page));
    }

    let (profiles, total) = Profile::search_by_name(&terms, adult_born_by(today), &page, pool).await?;
    debug!(terms = terms.len(), total, "Profile search");
    Ok(Page::new(profiles, total, &page).map(ProfileCard::from))
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
