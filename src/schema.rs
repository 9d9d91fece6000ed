table! {
    use diesel::sql_types::*;
    use crate::article::{ArticleStatusMapping, ArticleTypeMapping};

    articles (id) {
        id -> Int4,
        headline -> Varchar,
        content -> Text,
        excerpt -> Text,
        category -> Varchar,
        slug -> Varchar,
        status -> ArticleStatusMapping,
        article_type -> ArticleTypeMapping,
        sources -> Jsonb,
        trust_score -> Nullable<Int4>,
        analysis_result -> Nullable<Jsonb>,
        author_id -> Varchar,
        created_at -> Timestamptz,
    }
}

table! {
    profiles (id) {
        id -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
    }
}

table! {
    user_roles (id) {
        id -> Int4,
        user_id -> Varchar,
        role -> Varchar,
    }
}

table! {
    bookmarks (id) {
        id -> Int4,
        user_id -> Varchar,
        article_id -> Int4,
        created_at -> Timestamptz,
    }
}

table! {
    categories (id) {
        id -> Int4,
        category -> Varchar,
    }
}

joinable!(articles -> profiles (author_id));
joinable!(bookmarks -> articles (article_id));

allow_tables_to_appear_in_same_query!(articles, profiles, user_roles, bookmarks, categories);
