use askama_actix::Template;
use serde::Deserialize;
use std::ops::RangeInclusive;

const PAGINATOR_LOOK_AHEAD: i32 = 2;

/// [1] 2 3 ... 13
/// 1 2 [3] 4 5 ... 13
/// 1 2 3 4 [5] 6 7 ... 13
/// 1 ... 4 5 [6] 7 8 ... 13
/// 1 ... 7 8 [9] 10 11 12 13
/// 1 ... 9 10 [11] 12 13
/// 1 ... 11 12 [13]
#[derive(Debug)]
pub struct Paginator {
    pub base_url: String,
    pub this_page: i32,
    pub page_count: i32,
}

/// A rendered page number.
struct PageLink {
    number: i32,
    url: String,
    current: bool,
}

#[derive(Template)]
#[template(path = "util/paginator.html")]
struct PaginatorTemplate {
    first_pages: Vec<PageLink>,
    inner_pages: Vec<PageLink>,
    last_pages: Vec<PageLink>,
}

pub trait PaginatorToHtml {
    fn as_html(&self) -> String;
    fn has_pages(&self) -> bool;
    fn get_first_pages(&self) -> RangeInclusive<i32>;
    fn get_inner_pages(&self) -> Option<RangeInclusive<i32>>;
    fn get_last_pages(&self) -> Option<RangeInclusive<i32>>;
    fn page_url(&self, page: i32) -> String;
}

impl Paginator {
    /// The current page, held within the page range. A listing past the end
    /// stays empty, but its links are drawn as if on the last page.
    fn cursor(&self) -> i32 {
        self.this_page.clamp(1, self.page_count.max(1))
    }

    /// Pages within look-ahead distance of the cursor, clamped to the page range.
    fn window(&self) -> (i32, i32) {
        let cursor = self.cursor();
        (
            cursor.saturating_sub(PAGINATOR_LOOK_AHEAD).max(1),
            cursor
                .saturating_add(PAGINATOR_LOOK_AHEAD)
                .min(self.page_count),
        )
    }

    /// The cursor window touches the first page block.
    fn merges_first(&self) -> bool {
        self.window().0 <= 1 + PAGINATOR_LOOK_AHEAD
    }

    /// The cursor window touches the last page block.
    fn merges_last(&self) -> bool {
        self.window().1 >= self.page_count.saturating_sub(PAGINATOR_LOOK_AHEAD)
    }

    fn links(&self, pages: Option<RangeInclusive<i32>>) -> Vec<PageLink> {
        pages
            .into_iter()
            .flatten()
            .map(|number| PageLink {
                number,
                url: self.page_url(number),
                current: number == self.this_page,
            })
            .collect()
    }
}

impl PaginatorToHtml for Paginator {
    fn has_pages(&self) -> bool {
        self.page_count > 1
    }

    fn get_first_pages(&self) -> RangeInclusive<i32> {
        let (_, end) = self.window();
        match (self.merges_first(), self.merges_last()) {
            // i.e. 3 of 5, every page is shown in one run
            (true, true) => 1..=self.page_count,
            // i.e. on page 4 of 13, show 1-6 ... 13
            (true, false) => 1..=end,
            // the cursor is far from the start, only page 1 is shown
            (false, _) => 1..=1,
        }
    }

    fn get_inner_pages(&self) -> Option<RangeInclusive<i32>> {
        if self.merges_first() || self.merges_last() {
            None
        } else {
            // i.e. 1 ... 4 5 [6] 7 8 ... 13
            let (start, end) = self.window();
            Some(start..=end)
        }
    }

    fn get_last_pages(&self) -> Option<RangeInclusive<i32>> {
        let (start, _) = self.window();
        match (self.merges_first(), self.merges_last()) {
            (true, true) => None,
            // i.e. 1 ... 7 8 [9] 10 11 12 13
            (false, true) => Some(start..=self.page_count),
            (_, false) => Some(self.page_count..=self.page_count),
        }
    }

    fn page_url(&self, page: i32) -> String {
        format!("{}?page={}", self.base_url, page)
    }

    fn as_html(&self) -> String {
        if self.has_pages() {
            let mut buffer = String::new();
            let template = PaginatorTemplate {
                first_pages: self.links(Some(self.get_first_pages())),
                inner_pages: self.links(self.get_inner_pages()),
                last_pages: self.links(self.get_last_pages()),
            };
            if template.render_into(&mut buffer).is_err() {
                "[Paginator Util Error]".to_owned()
            } else {
                buffer
            }
        } else {
            "".to_owned()
        }
    }
}

/// The `?page=` querystring shared by every listing.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Returns the requested 1-based page. Anything unparsable or below 1 is the first page.
    pub fn page(&self) -> i32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::{PageQuery, Paginator, PaginatorToHtml};

    fn paginator(this_page: i32, page_count: i32) -> Paginator {
        Paginator {
            base_url: "/".to_owned(),
            this_page,
            page_count,
        }
    }

    #[test]
    fn windows() {
        let p = paginator(1, 13);
        assert_eq!(p.get_first_pages(), 1..=3);
        assert_eq!(p.get_inner_pages(), None);
        assert_eq!(p.get_last_pages(), Some(13..=13));

        let p = paginator(5, 13);
        assert_eq!(p.get_first_pages(), 1..=7);
        assert_eq!(p.get_last_pages(), Some(13..=13));

        let p = paginator(6, 13);
        assert_eq!(p.get_first_pages(), 1..=1);
        assert_eq!(p.get_inner_pages(), Some(4..=8));
        assert_eq!(p.get_last_pages(), Some(13..=13));

        let p = paginator(9, 13);
        assert_eq!(p.get_first_pages(), 1..=1);
        assert_eq!(p.get_inner_pages(), None);
        assert_eq!(p.get_last_pages(), Some(7..=13));

        let p = paginator(13, 13);
        assert_eq!(p.get_last_pages(), Some(11..=13));

        let p = paginator(2, 2);
        assert_eq!(p.get_first_pages(), 1..=2);
        assert_eq!(p.get_last_pages(), None);
    }

    #[test]
    fn pages_past_the_end() {
        let p = paginator(9, 2);
        assert_eq!(p.get_first_pages(), 1..=2);
        assert_eq!(p.get_inner_pages(), None);
        assert_eq!(p.get_last_pages(), None);

        let p = paginator(i32::MAX, 13);
        assert_eq!(p.get_first_pages(), 1..=1);
        assert_eq!(p.get_inner_pages(), None);
        assert_eq!(p.get_last_pages(), Some(11..=13));

        let html = paginator(i32::MAX, 2).as_html();
        assert!(html.contains("?page=1"));
        assert!(!html.contains("current"));
    }

    #[test]
    fn single_page_renders_nothing() {
        assert!(paginator(1, 1).as_html().is_empty());
        assert!(paginator(1, 0).as_html().is_empty());
    }

    #[test]
    fn renders_links() {
        let html = Paginator {
            base_url: "/group/cats/".to_owned(),
            this_page: 1,
            page_count: 2,
        }
        .as_html();
        assert!(html.contains("/group/cats/?page=2"));
    }

    #[test]
    fn page_query() {
        let page = |p: Option<&str>| {
            PageQuery {
                page: p.map(str::to_owned),
            }
            .page()
        };
        assert_eq!(page(None), 1);
        assert_eq!(page(Some("2")), 2);
        assert_eq!(page(Some("0")), 1);
        assert_eq!(page(Some("-3")), 1);
        assert_eq!(page(Some("last")), 1);
    }
}
