mod campaign;
mod history;
mod interaction;
mod pagination;
mod restaurant;
mod user;
mod video;

pub use campaign::{AdCampaign, CampaignResponse, CampaignStatus, CreateCampaignRequest};
pub use history::{HistoryEntry, WatchEntry, WatchEntryResponse, WatchRequest};
pub use interaction::{InteractionKind, InteractionRequest, InteractionResponse};
pub use pagination::{Page, PageParams};
pub use restaurant::{
    CreateDishRequest, CreateRestaurantRequest, DietaryTag, Dish, DishResponse, Restaurant,
    RestaurantResponse, SpiceLevel,
};
pub use user::{
    CurrentUser, PreferencesResponse, RegisterRequest, RegisterResponse,
    UpdatePreferencesRequest, User, UserResponse,
};
pub use video::{CreateVideoRequest, Video, VideoResponse, Visibility};
