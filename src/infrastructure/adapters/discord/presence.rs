use serenity::all::{ActivityData, OnlineStatus};

use crate::infrastructure::config::{Activity, Status};

pub fn online_status(status: Status) -> OnlineStatus {
    match status {
        Status::Online => OnlineStatus::Online,
        Status::Idle => OnlineStatus::Idle,
        Status::DoNotDisturb => OnlineStatus::DoNotDisturb,
        Status::Invisible => OnlineStatus::Invisible,
        Status::Offline => OnlineStatus::Offline,
    }
}

/// `None` for a stream whose URL Discord would reject
pub fn activity(activity: &Activity) -> Option<ActivityData> {
    match activity {
        Activity::Playing(name) => Some(ActivityData::playing(name)),
        Activity::Listening(name) => Some(ActivityData::listening(name)),
        Activity::Watching(name) => Some(ActivityData::watching(name)),
        Activity::Competing(name) => Some(ActivityData::competing(name)),
        Activity::Custom(name) => Some(ActivityData::custom(name)),
        Activity::Streaming { name, url } => match ActivityData::streaming(name, url) {
            Ok(activity) => Some(activity),
            Err(e) => {
                tracing::warn!(target: "discord", "Invalid stream URL `{}`: {}", url, e);
                None
            }
        },
    }
}
