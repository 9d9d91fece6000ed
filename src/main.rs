#[macro_use]
extern crate diesel;

mod article;
mod auth;
mod bookmark;
mod category;
mod credibility;
mod endpoints;
mod error;
mod paginated;
mod profile;
mod schema;
mod scrape;

use diesel::prelude::*;
use rocket::{launch, routes};
use std::env;

#[launch]
fn rocket() -> _ {
    let db_connection = establish_connection();
    let db_connection = std::sync::Mutex::new(db_connection);

    let build_dir = env::var("BUILD_DIR").unwrap_or_else(|_| "build".into());

    rocket::build()
        .mount("/", routes![endpoints::index])
        .mount(
            "/api",
            routes![
                endpoints::get_articles,
                endpoints::get_my_articles,
                endpoints::get_article_by_slug,
                endpoints::post_articles,
                endpoints::update_article,
                endpoints::update_article_status,
                endpoints::delete_article,
                endpoints::get_categories,
                endpoints::get_profile,
                endpoints::update_profile,
                endpoints::get_bookmarks,
                endpoints::post_bookmarks,
                endpoints::delete_bookmark,
                endpoints::check_url,
                endpoints::page_title,
                endpoints::verify_article,
                endpoints::verify_preview,
                endpoints::verify_stream,
                endpoints::admin_get_articles,
                endpoints::admin_update_article_status,
                endpoints::fallback
            ],
        )
        .manage(db_connection)
        .manage(build_dir)
        .manage(reqwest::Client::new())
}

fn establish_connection() -> PgConnection {
    let _ = dotenvy::dotenv();

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgConnection::establish(&db_url).unwrap_or_else(|_| panic!("error connecting to {}", db_url))
}
