//! Remote catalogue access.
//!
//! [`CatalogueService`] is the seam the updater talks to; [`anilist`] holds
//! the AniList GraphQL implementation and the token file loader.

pub mod anilist;
pub mod traits;

pub use traits::{
    CatalogueEntry, CatalogueService, ListStatus, MediaFormat, SavedEntry, SearchQuery,
    SeasonSlot, ServiceError,
};
