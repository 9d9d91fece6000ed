use crate::article::{
    self, ArticleStatus, ArticleType, ClientArticle, ClientArticleUpdate, ClientStatusUpdate,
    DBArticle, ServerArticle, Source,
};
use crate::auth::{AdminUser, AuthedUser};
use crate::bookmark::{ClientBookmark, DBBookmark, ServerBookmark};
use crate::category::ServerCategory;
use crate::credibility::{self, ClientVerification, CredibilityReport, ServerVerification};
use crate::error::APIError;
use crate::paginated::Paginated;
use crate::profile::{ClientProfile, DBProfile, ServerProfile};
use crate::scrape::{self, ClientUrl, ServerPageTitle, UrlCheck};
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use futures::StreamExt;
use rocket::fs::NamedFile;
use rocket::http::Status;
use rocket::response::status;
use rocket::response::stream::TextStream;
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, uri, State};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[get("/<files..>", rank = 10000)]
pub async fn index(build_dir: &State<String>, files: PathBuf) -> Option<NamedFile> {
    let path = Path::new(&**build_dir).join(files);

    async fn open_index(build_path: &str) -> Option<NamedFile> {
        NamedFile::open(Path::new(build_path).join("index.html"))
            .await
            .ok()
    }

    if path.is_dir() {
        open_index(&**build_dir).await
    } else {
        match NamedFile::open(path).await.ok() {
            Some(file) => Some(file),
            None => open_index(&**build_dir).await,
        }
    }
}

#[get("/articles?<category>&<page>&<limit>", rank = 3)]
pub fn get_articles(
    db_connection: &State<Mutex<PgConnection>>,
    category: Option<&str>,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<Paginated<Vec<ServerArticle>>, APIError> {
    use crate::schema::{articles, profiles};

    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(10).clamp(1, 50);

    let db_connection = &*db_connection.lock().unwrap();

    let total: i64 = match category {
        Some(category) => articles::table
            .filter(articles::status.eq(ArticleStatus::Published))
            .filter(articles::category.eq(category))
            .count()
            .get_result(db_connection)?,
        None => articles::table
            .filter(articles::status.eq(ArticleStatus::Published))
            .count()
            .get_result(db_connection)?,
    };

    let mut query = articles::table
        .inner_join(profiles::table)
        .filter(articles::status.eq(ArticleStatus::Published))
        .into_boxed();
    if let Some(category) = category {
        query = query.filter(articles::category.eq(category));
    }

    let rows = query
        .order(articles::created_at.desc())
        .limit(limit)
        .offset((page - 1) * limit)
        .load::<(DBArticle, DBProfile)>(db_connection)?;

    let content = rows
        .into_iter()
        .map(|(article, author)| ServerArticle::new(article, author))
        .collect::<Vec<ServerArticle>>();

    Ok(Paginated::new(content, limit, page, total))
}

#[get("/articles/mine?<status>", rank = 1)]
pub fn get_my_articles(
    db_connection: &State<Mutex<PgConnection>>,
    user: Option<AuthedUser>,
    status: Option<&str>,
) -> Result<Json<Vec<ServerArticle>>, APIError> {
    use crate::schema::{articles, profiles};

    let user = user.ok_or_else(APIError::unauthorized)?;

    let status = match status {
        Some(status) => Some(ArticleStatus::parse(status).ok_or_else(|| {
            APIError::new(Status::BadRequest, format!("Unknown status {}.", status))
        })?),
        None => None,
    };

    let db_connection = &*db_connection.lock().unwrap();

    let mut query = articles::table
        .inner_join(profiles::table)
        .filter(articles::author_id.eq(&user.id))
        .into_boxed();
    if let Some(status) = status {
        query = query.filter(articles::status.eq(status));
    }

    let rows = query
        .order(articles::created_at.desc())
        .load::<(DBArticle, DBProfile)>(db_connection)?;

    Ok(Json(
        rows.into_iter()
            .map(|(article, author)| ServerArticle::new(article, author))
            .collect(),
    ))
}

#[get("/articles/<slug>", rank = 2)]
pub fn get_article_by_slug(
    db_connection: &State<Mutex<PgConnection>>,
    slug: &str,
    user: Option<AuthedUser>,
    admin: Option<AdminUser>,
) -> Result<Json<ServerArticle>, APIError> {
    use crate::schema::{articles, profiles};

    let (ret_article, author) = articles::table
        .filter(articles::slug.eq(slug))
        .inner_join(profiles::table)
        .first::<(DBArticle, DBProfile)>(&*db_connection.lock().unwrap())
        .map_err(|err| match err {
            DieselError::NotFound => {
                APIError::new(Status::NotFound, format!("No article with slug {}.", slug))
            }
            _ => APIError::from(err),
        })?;

    // Unpublished articles exist only for their owner and admins.
    if ret_article.status != ArticleStatus::Published {
        let is_owner = user
            .as_ref()
            .map(|user| user.id == ret_article.author_id)
            .unwrap_or(false);
        if !is_owner && admin.is_none() {
            return Err(APIError::new(
                Status::NotFound,
                format!("No article with slug {}.", slug),
            ));
        }
    }

    Ok(Json(ServerArticle::new(ret_article, author)))
}

#[post("/articles", data = "<article>")]
pub fn post_articles(
    db_connection: &State<Mutex<PgConnection>>,
    user: Option<AuthedUser>,
    article: Option<Json<ClientArticle<'_>>>,
) -> Result<status::Created<Json<ServerArticle>>, APIError> {
    use crate::schema::{articles, profiles};

    let user = user.ok_or_else(APIError::unauthorized)?;

    let article = match article {
        Some(article) => article,
        None => {
            return Err(APIError::new(
                Status::BadRequest,
                "Invalid article format.".into(),
            ))
        }
    };

    let initial_status = article
        .initial_status()
        .map_err(|msg| APIError::new(Status::BadRequest, msg.into()))?;

    let db_connection = &*db_connection.lock().unwrap();

    let author = profiles::table
        .filter(profiles::id.eq(&user.id))
        .first::<DBProfile>(db_connection)
        .map_err(|err| match err {
            DieselError::NotFound => APIError::new(
                Status::NotFound,
                "No profile found for the signed-in user.".into(),
            ),
            _ => APIError::from(err),
        })?;

    let mut slug = article::slugify(article.headline);
    if slug.is_empty() {
        slug = "article".into();
    }
    let taken: i64 = articles::table
        .filter(articles::slug.eq(&slug))
        .count()
        .get_result(db_connection)?;
    if taken > 0 {
        slug = article::with_collision_suffix(&slug);
    }

    let sources = serde_json::to_value(&article.sources).map_err(|_| APIError::default())?;

    let inserted_article = diesel::insert_into(articles::table)
        .values((
            articles::headline.eq(article.headline),
            articles::content.eq(article.content),
            articles::excerpt.eq(article.excerpt),
            articles::category.eq(article.category),
            articles::slug.eq(&slug),
            articles::status.eq(initial_status),
            articles::article_type.eq(article.article_type),
            articles::sources.eq(sources),
            articles::author_id.eq(&user.id),
            articles::created_at.eq(Utc::now()),
        ))
        .get_results::<DBArticle>(db_connection)?
        .swap_remove(0);

    let ret_article = ServerArticle::new(inserted_article, author);
    let location = uri!("/api", get_article_by_slug(slug = &slug)).to_string();

    Ok(status::Created::new(location).body(Json(ret_article)))
}

#[put("/articles/<id>", data = "<update>")]
pub fn update_article(
    db_connection: &State<Mutex<PgConnection>>,
    user: Option<AuthedUser>,
    id: i32,
    update: Option<Json<ClientArticleUpdate<'_>>>,
) -> Result<Json<ServerArticle>, APIError> {
    use crate::schema::{articles, profiles};

    let user = user.ok_or_else(APIError::unauthorized)?;

    let update = match update {
        Some(update) => update,
        None => {
            return Err(APIError::new(
                Status::BadRequest,
                "Invalid article format.".into(),
            ))
        }
    };

    let db_connection = &*db_connection.lock().unwrap();

    let (existing, author) = articles::table
        .filter(articles::id.eq(id))
        .inner_join(profiles::table)
        .first::<(DBArticle, DBProfile)>(db_connection)
        .map_err(|err| match err {
            DieselError::NotFound => {
                APIError::new(Status::NotFound, format!("No article with id {}.", id))
            }
            _ => APIError::from(err),
        })?;

    if existing.author_id != user.id {
        return Err(APIError::forbidden());
    }

    if existing.article_type == ArticleType::Factual
        && existing.status != ArticleStatus::Draft
        && update.sources.is_empty()
    {
        return Err(APIError::new(
            Status::BadRequest,
            "Factual articles require at least one source.".into(),
        ));
    }

    let sources = serde_json::to_value(&update.sources).map_err(|_| APIError::default())?;

    let updated = diesel::update(articles::table.filter(articles::id.eq(id)))
        .set((
            articles::headline.eq(update.headline),
            articles::content.eq(update.content),
            articles::excerpt.eq(update.excerpt),
            articles::category.eq(update.category),
            articles::sources.eq(sources),
        ))
        .get_results::<DBArticle>(db_connection)?
        .swap_remove(0);

    Ok(Json(ServerArticle::new(updated, author)))
}

#[put("/articles/<id>/status", data = "<update>")]
pub fn update_article_status(
    db_connection: &State<Mutex<PgConnection>>,
    user: Option<AuthedUser>,
    id: i32,
    update: Option<Json<ClientStatusUpdate>>,
) -> Result<Json<ServerArticle>, APIError> {
    use crate::schema::{articles, profiles};

    let user = user.ok_or_else(APIError::unauthorized)?;

    let update = match update {
        Some(update) => update,
        None => {
            return Err(APIError::new(
                Status::BadRequest,
                "Missing status.".into(),
            ))
        }
    };

    let db_connection = &*db_connection.lock().unwrap();

    let (existing, author) = articles::table
        .filter(articles::id.eq(id))
        .inner_join(profiles::table)
        .first::<(DBArticle, DBProfile)>(db_connection)
        .map_err(|err| match err {
            DieselError::NotFound => {
                APIError::new(Status::NotFound, format!("No article with id {}.", id))
            }
            _ => APIError::from(err),
        })?;

    if existing.author_id != user.id {
        return Err(APIError::forbidden());
    }

    if !ArticleStatus::owner_toggle_allowed(existing.status, update.status) {
        return Err(APIError::new(
            Status::BadRequest,
            "Articles can only be toggled between published and pending review.".into(),
        ));
    }

    let updated = diesel::update(articles::table.filter(articles::id.eq(id)))
        .set(articles::status.eq(update.status))
        .get_results::<DBArticle>(db_connection)?
        .swap_remove(0);

    Ok(Json(ServerArticle::new(updated, author)))
}

#[delete("/articles/<id>")]
pub fn delete_article(
    db_connection: &State<Mutex<PgConnection>>,
    user: Option<AuthedUser>,
    admin: Option<AdminUser>,
    id: i32,
) -> Result<status::NoContent, APIError> {
    use crate::schema::{articles, bookmarks};

    let user = user.ok_or_else(APIError::unauthorized)?;

    let db_connection = &*db_connection.lock().unwrap();

    let existing = articles::table
        .filter(articles::id.eq(id))
        .first::<DBArticle>(db_connection)
        .map_err(|err| match err {
            DieselError::NotFound => {
                APIError::new(Status::NotFound, format!("No article with id {}.", id))
            }
            _ => APIError::from(err),
        })?;

    if existing.author_id != user.id && admin.is_none() {
        return Err(APIError::forbidden());
    }

    // Saved copies go with the article.
    diesel::delete(bookmarks::table.filter(bookmarks::article_id.eq(id)))
        .execute(db_connection)?;
    diesel::delete(articles::table.filter(articles::id.eq(id))).execute(db_connection)?;

    Ok(status::NoContent)
}

#[get("/categories")]
pub fn get_categories(
    db_connection: &State<Mutex<PgConnection>>,
) -> Result<Json<Vec<ServerCategory>>, APIError> {
    use crate::schema::categories::dsl::categories;

    categories
        .load::<ServerCategory>(&*db_connection.lock().unwrap())
        .map_err(APIError::from)
        .map(Json)
}

#[get("/profile")]
pub fn get_profile(
    db_connection: &State<Mutex<PgConnection>>,
    user: Option<AuthedUser>,
) -> Result<Json<ServerProfile>, APIError> {
    use crate::schema::profiles::dsl::{id, profiles};

    let user = user.ok_or_else(APIError::unauthorized)?;

    profiles
        .filter(id.eq(&user.id))
        .first::<DBProfile>(&*db_connection.lock().unwrap())
        .map(|profile| Json(ServerProfile::new(profile)))
        .map_err(|err| match err {
            DieselError::NotFound => APIError::new(
                Status::NotFound,
                "No profile found for the signed-in user.".into(),
            ),
            _ => APIError::from(err),
        })
}

#[put("/profile", data = "<profile>")]
pub fn update_profile(
    db_connection: &State<Mutex<PgConnection>>,
    user: Option<AuthedUser>,
    profile: Option<Json<ClientProfile<'_>>>,
) -> Result<Json<ServerProfile>, APIError> {
    use crate::schema::profiles::dsl::{first_name, id, last_name, profiles};

    let user = user.ok_or_else(APIError::unauthorized)?;

    let profile = match profile {
        Some(profile) => profile,
        None => {
            return Err(APIError::new(
                Status::BadRequest,
                "Invalid profile format.".into(),
            ))
        }
    };

    let updated = diesel::insert_into(profiles)
        .values((
            id.eq(&user.id),
            first_name.eq(profile.first_name),
            last_name.eq(profile.last_name),
        ))
        .on_conflict(id)
        .do_update()
        .set((
            first_name.eq(profile.first_name),
            last_name.eq(profile.last_name),
        ))
        .get_result::<DBProfile>(&*db_connection.lock().unwrap())?;

    Ok(Json(ServerProfile::new(updated)))
}

#[get("/bookmarks")]
pub fn get_bookmarks(
    db_connection: &State<Mutex<PgConnection>>,
    user: Option<AuthedUser>,
) -> Result<Json<Vec<ServerBookmark>>, APIError> {
    use crate::schema::{articles, bookmarks, profiles};

    let user = user.ok_or_else(APIError::unauthorized)?;

    let rows = bookmarks::table
        .inner_join(articles::table.inner_join(profiles::table))
        .filter(bookmarks::user_id.eq(&user.id))
        .order(bookmarks::created_at.desc())
        .load::<(DBBookmark, (DBArticle, DBProfile))>(&*db_connection.lock().unwrap())?;

    Ok(Json(
        rows.into_iter()
            .map(|(bookmark, (article, author))| ServerBookmark::new(bookmark, article, author))
            .collect(),
    ))
}

#[post("/bookmarks", data = "<bookmark>")]
pub fn post_bookmarks(
    db_connection: &State<Mutex<PgConnection>>,
    user: Option<AuthedUser>,
    admin: Option<AdminUser>,
    bookmark: Option<Json<ClientBookmark>>,
) -> Result<status::Created<Json<DBBookmark>>, APIError> {
    use crate::schema::{articles, bookmarks};

    let user = user.ok_or_else(APIError::unauthorized)?;

    let bookmark = match bookmark {
        Some(bookmark) => bookmark,
        None => {
            return Err(APIError::new(
                Status::BadRequest,
                "Missing article_id.".into(),
            ))
        }
    };

    let db_connection = &*db_connection.lock().unwrap();

    let target = articles::table
        .filter(articles::id.eq(bookmark.article_id))
        .first::<DBArticle>(db_connection)
        .map_err(|err| match err {
            DieselError::NotFound => APIError::new(
                Status::NotFound,
                format!("No article with id {}.", bookmark.article_id),
            ),
            _ => APIError::from(err),
        })?;

    if target.status != ArticleStatus::Published
        && target.author_id != user.id
        && admin.is_none()
    {
        return Err(APIError::new(
            Status::NotFound,
            format!("No article with id {}.", bookmark.article_id),
        ));
    }

    let already: i64 = bookmarks::table
        .filter(bookmarks::user_id.eq(&user.id))
        .filter(bookmarks::article_id.eq(bookmark.article_id))
        .count()
        .get_result(db_connection)?;
    if already > 0 {
        return Err(APIError::new(
            Status::Conflict,
            "Article is already bookmarked.".into(),
        ));
    }

    let inserted = diesel::insert_into(bookmarks::table)
        .values((
            bookmarks::user_id.eq(&user.id),
            bookmarks::article_id.eq(bookmark.article_id),
            bookmarks::created_at.eq(Utc::now()),
        ))
        .get_results::<DBBookmark>(db_connection)?
        .swap_remove(0);

    let location = uri!("/api", get_bookmarks).to_string();

    Ok(status::Created::new(location).body(Json(inserted)))
}

#[delete("/bookmarks/<article_id>")]
pub fn delete_bookmark(
    db_connection: &State<Mutex<PgConnection>>,
    user: Option<AuthedUser>,
    article_id: i32,
) -> Result<status::NoContent, APIError> {
    use crate::schema::bookmarks;

    let user = user.ok_or_else(APIError::unauthorized)?;

    let removed = diesel::delete(
        bookmarks::table
            .filter(bookmarks::user_id.eq(&user.id))
            .filter(bookmarks::article_id.eq(article_id)),
    )
    .execute(&*db_connection.lock().unwrap())?;

    if removed == 0 {
        return Err(APIError::new(
            Status::NotFound,
            format!("No bookmark for article {}.", article_id),
        ));
    }

    Ok(status::NoContent)
}

#[post("/check-url", data = "<target>")]
pub async fn check_url(
    http_client: &State<reqwest::Client>,
    user: Option<AuthedUser>,
    target: Option<Json<ClientUrl<'_>>>,
) -> Result<Json<UrlCheck>, APIError> {
    user.ok_or_else(APIError::unauthorized)?;

    let target = match target {
        Some(target) => target,
        None => return Err(APIError::new(Status::BadRequest, "Missing url.".into())),
    };

    if !target.url.starts_with("http://") && !target.url.starts_with("https://") {
        return Err(APIError::new(
            Status::BadRequest,
            "Only http(s) URLs can be checked.".into(),
        ));
    }

    Ok(Json(scrape::check_url(http_client, target.url).await))
}

#[post("/page-title", data = "<target>")]
pub async fn page_title(
    http_client: &State<reqwest::Client>,
    user: Option<AuthedUser>,
    target: Option<Json<ClientUrl<'_>>>,
) -> Result<Json<ServerPageTitle>, APIError> {
    user.ok_or_else(APIError::unauthorized)?;

    let target = match target {
        Some(target) => target,
        None => return Err(APIError::new(Status::BadRequest, "Missing url.".into())),
    };

    if !target.url.starts_with("http://") && !target.url.starts_with("https://") {
        return Err(APIError::new(
            Status::BadRequest,
            "Only http(s) URLs can be scraped.".into(),
        ));
    }

    let title = scrape::page_title(http_client, target.url)
        .await
        .map_err(APIError::upstream)?;

    Ok(Json(ServerPageTitle { title }))
}

#[post("/articles/<id>/verify")]
pub async fn verify_article(
    db_connection: &State<Mutex<PgConnection>>,
    http_client: &State<reqwest::Client>,
    user: Option<AuthedUser>,
    admin: Option<AdminUser>,
    id: i32,
) -> Result<Json<ServerVerification>, APIError> {
    use crate::schema::{articles, profiles};

    let user = user.ok_or_else(APIError::unauthorized)?;

    // The connection guard cannot be held across the AI call.
    let (prompt, author) = {
        let db_connection = &*db_connection.lock().unwrap();

        let (existing, author) = articles::table
            .filter(articles::id.eq(id))
            .inner_join(profiles::table)
            .first::<(DBArticle, DBProfile)>(db_connection)
            .map_err(|err| match err {
                DieselError::NotFound => {
                    APIError::new(Status::NotFound, format!("No article with id {}.", id))
                }
                _ => APIError::from(err),
            })?;

        if existing.author_id != user.id && admin.is_none() {
            return Err(APIError::forbidden());
        }

        if existing.article_type != ArticleType::Factual {
            return Err(APIError::new(
                Status::BadRequest,
                "Only Factual articles undergo AI verification.".into(),
            ));
        }

        let sources: Vec<Source> =
            serde_json::from_value(existing.sources.clone()).unwrap_or_default();
        if sources.is_empty() {
            return Err(APIError::new(
                Status::BadRequest,
                "Factual articles require at least one source.".into(),
            ));
        }

        (
            credibility::build_verification_prompt(&existing.headline, &existing.content, &sources),
            author,
        )
    };

    let markdown = credibility::chat_completion(http_client, &prompt)
        .await
        .map_err(APIError::upstream)?;
    let report = CredibilityReport::from_markdown(markdown, credibility::chat_model());

    let new_status = if report.passes() {
        ArticleStatus::Published
    } else {
        ArticleStatus::RejectedAi
    };
    let analysis = serde_json::to_value(&report).map_err(|_| APIError::default())?;

    let updated = diesel::update(articles::table.filter(articles::id.eq(id)))
        .set((
            articles::status.eq(new_status),
            articles::trust_score.eq(report.trust_score),
            articles::analysis_result.eq(Some(analysis)),
        ))
        .get_results::<DBArticle>(&*db_connection.lock().unwrap())?
        .swap_remove(0);

    log::info!(
        "article {} verified with trust score {:?}, now {:?}",
        id,
        report.trust_score,
        new_status
    );

    Ok(Json(ServerVerification {
        article: ServerArticle::new(updated, author),
        report,
    }))
}

#[post("/verify/preview", data = "<request>")]
pub async fn verify_preview(
    http_client: &State<reqwest::Client>,
    user: Option<AuthedUser>,
    request: Option<Json<ClientVerification<'_>>>,
) -> Result<Json<CredibilityReport>, APIError> {
    user.ok_or_else(APIError::unauthorized)?;

    let request = match request {
        Some(request) => request,
        None => {
            return Err(APIError::new(
                Status::BadRequest,
                "Invalid verification format.".into(),
            ))
        }
    };

    let prompt = credibility::build_verification_prompt(
        request.headline,
        request.content,
        &request.sources,
    );
    let markdown = credibility::generate_with_retry(http_client, &prompt)
        .await
        .map_err(APIError::upstream)?;

    Ok(Json(CredibilityReport::from_markdown(
        markdown,
        credibility::genai_model(),
    )))
}

#[post("/verify/stream", data = "<request>")]
pub async fn verify_stream(
    http_client: &State<reqwest::Client>,
    user: Option<AuthedUser>,
    request: Option<Json<ClientVerification<'_>>>,
) -> Result<TextStream![String], APIError> {
    user.ok_or_else(APIError::unauthorized)?;

    let request = match request {
        Some(request) => request,
        None => {
            return Err(APIError::new(
                Status::BadRequest,
                "Invalid verification format.".into(),
            ))
        }
    };

    let prompt = credibility::build_verification_prompt(
        request.headline,
        request.content,
        &request.sources,
    );
    let resp = credibility::stream_chat_completion(http_client, &prompt)
        .await
        .map_err(APIError::upstream)?;

    Ok(TextStream! {
        let mut chunks = resp.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => yield String::from_utf8_lossy(&bytes).into_owned(),
                Err(err) => {
                    log::warn!("AI stream interrupted: {}", err);
                    break;
                }
            }
        }
    })
}

#[get("/admin/articles?<status>")]
pub fn admin_get_articles(
    db_connection: &State<Mutex<PgConnection>>,
    user: Option<AuthedUser>,
    admin: Option<AdminUser>,
    status: Option<&str>,
) -> Result<Json<Vec<ServerArticle>>, APIError> {
    use crate::schema::{articles, profiles};

    user.ok_or_else(APIError::unauthorized)?;
    admin.ok_or_else(APIError::forbidden)?;

    let status = match status {
        Some(status) => Some(ArticleStatus::parse(status).ok_or_else(|| {
            APIError::new(Status::BadRequest, format!("Unknown status {}.", status))
        })?),
        None => None,
    };

    let db_connection = &*db_connection.lock().unwrap();

    let mut query = articles::table.inner_join(profiles::table).into_boxed();
    if let Some(status) = status {
        query = query.filter(articles::status.eq(status));
    }

    let rows = query
        .order(articles::created_at.desc())
        .load::<(DBArticle, DBProfile)>(db_connection)?;

    Ok(Json(
        rows.into_iter()
            .map(|(article, author)| ServerArticle::new(article, author))
            .collect(),
    ))
}

#[put("/admin/articles/<id>/status", data = "<update>")]
pub fn admin_update_article_status(
    db_connection: &State<Mutex<PgConnection>>,
    user: Option<AuthedUser>,
    admin: Option<AdminUser>,
    id: i32,
    update: Option<Json<ClientStatusUpdate>>,
) -> Result<Json<ServerArticle>, APIError> {
    use crate::schema::{articles, profiles};

    user.ok_or_else(APIError::unauthorized)?;
    let admin = admin.ok_or_else(APIError::forbidden)?;

    let update = match update {
        Some(update) => update,
        None => {
            return Err(APIError::new(
                Status::BadRequest,
                "Missing status.".into(),
            ))
        }
    };

    if !ArticleStatus::admin_override_allowed(update.status) {
        return Err(APIError::new(
            Status::BadRequest,
            "Admins may only set Published or Rejected.".into(),
        ));
    }

    let db_connection = &*db_connection.lock().unwrap();

    let author = articles::table
        .filter(articles::id.eq(id))
        .inner_join(profiles::table)
        .first::<(DBArticle, DBProfile)>(db_connection)
        .map(|(_, author)| author)
        .map_err(|err| match err {
            DieselError::NotFound => {
                APIError::new(Status::NotFound, format!("No article with id {}.", id))
            }
            _ => APIError::from(err),
        })?;

    let updated = diesel::update(articles::table.filter(articles::id.eq(id)))
        .set(articles::status.eq(update.status))
        .get_results::<DBArticle>(db_connection)?
        .swap_remove(0);

    log::info!(
        "admin {} set article {} to {:?}",
        admin.id,
        id,
        update.status
    );

    Ok(Json(ServerArticle::new(updated, author)))
}

#[get("/<_..>", rank = 9999)]
pub fn fallback() -> APIError {
    APIError::new(Status::NotFound, "Invalid endpoint.".into())
}
