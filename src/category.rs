use crate::schema::categories;
use serde::Serialize;

#[derive(Identifiable, Queryable, Debug, Serialize)]
#[table_name = "categories"]
pub struct DBCategory {
    pub id: i32,
    pub category: String,
}

/// What the client receives when they request the category list.
pub type ServerCategory = DBCategory;
