use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};

use crate::storage::models::UrlRecord;
use migration::entities::short_url;

pub fn model_to_record(model: short_url::Model) -> UrlRecord {
    UrlRecord {
        short_id: model.short_url,
        original_url: model.original_url,
        owner_id: model.user_id,
        deleted: model.is_deleted,
    }
}

/// 新记录的 ActiveModel，id 由数据库分配，created_at 取当前时间
pub fn new_active_model(short_id: &str, original_url: &str, owner_id: &str) -> short_url::ActiveModel {
    short_url::ActiveModel {
        id: NotSet,
        short_url: Set(short_id.to_string()),
        original_url: Set(original_url.to_string()),
        user_id: Set(owner_id.to_string()),
        is_deleted: Set(false),
        created_at: Set(Utc::now()),
    }
}
