use crate::article::{DBArticle, ServerArticle};
use crate::profile::DBProfile;
use crate::schema::bookmarks;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Identifiable, Queryable, Debug, Serialize, Associations)]
#[belongs_to(DBArticle, foreign_key = "article_id")]
#[table_name = "bookmarks"]
pub struct DBBookmark {
    pub id: i32,
    pub user_id: String,
    pub article_id: i32,
    pub created_at: DateTime<Utc>,
}

/// What the client receives when they list their bookmarks.
#[derive(Serialize, Debug)]
pub struct ServerBookmark {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub article: ServerArticle,
}

impl ServerBookmark {
    pub fn new(bookmark: DBBookmark, article: DBArticle, author: DBProfile) -> Self {
        ServerBookmark {
            id: bookmark.id,
            created_at: bookmark.created_at,
            article: ServerArticle::new(article, author),
        }
    }
}

/// What the client sends when they save an article.
#[derive(Deserialize, Debug)]
pub struct ClientBookmark {
    pub article_id: i32,
}
