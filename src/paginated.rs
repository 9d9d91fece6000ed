use rocket::response::Responder;
use rocket::serde::json::Json;
use rocket::Response;
use serde::Serialize;

#[derive(Serialize)]
struct PageInfo {
    page: i64,
    limit: i64,
}

#[derive(Serialize)]
struct PaginatedContent<T: Serialize> {
    next: Option<PageInfo>,
    previous: Option<PageInfo>,
    total: i64,
    content: T,
}

/// JSON envelope for list endpoints: the page content plus links to the
/// neighboring pages and the total row count.
pub struct Paginated<T> {
    content: T,
    limit: i64,
    page: i64,
    items: i64,
}

impl<T> Paginated<T> {
    pub fn new(content: T, limit: i64, page: i64, items: i64) -> Paginated<T> {
        Paginated {
            content,
            limit,
            page,
            items,
        }
    }
}

impl<'r, T: Serialize> Responder<'r, 'static> for Paginated<T> {
    fn respond_to(self, request: &'r rocket::Request<'_>) -> rocket::response::Result<'static> {
        let first_page = 1;
        let last_page = div_ceil(self.items, self.limit);

        let has_previous = self.page > first_page;
        let has_next = self.page < last_page;

        let previous = if has_previous {
            // Clamp out-of-range requests back to the real last page.
            let page = if self.page > last_page {
                last_page
            } else {
                self.page - 1
            };
            Some(PageInfo {
                page,
                limit: self.limit,
            })
        } else {
            None
        };

        let next = if has_next {
            Some(PageInfo {
                page: self.page + 1,
                limit: self.limit,
            })
        } else {
            None
        };

        let res = PaginatedContent {
            content: self.content,
            previous,
            next,
            total: self.items,
        };

        Response::build_from(Json(res).respond_to(request)?).ok()
    }
}

// i64::div_ceil needs a newer toolchain than we target.
#[inline]
const fn div_ceil(lhs: i64, rhs: i64) -> i64 {
    let d = lhs / rhs;
    let r = lhs % rhs;
    if (r > 0 && rhs > 0) || (r < 0 && rhs < 0) {
        d + 1
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::div_ceil;

    #[test]
    fn partial_pages_round_up() {
        assert_eq!(div_ceil(0, 10), 0);
        assert_eq!(div_ceil(10, 10), 1);
        assert_eq!(div_ceil(11, 10), 2);
        assert_eq!(div_ceil(25, 10), 3);
    }
}
