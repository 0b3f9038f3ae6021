use crate::models::{Diary, DiaryPage, ListQuery};

pub const DEFAULT_PAGE_SIZE: u32 = 12;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub title: String,
    pub author_nickname: String,
}

/// Identifies one fetch issued by a [`DiaryFeed`]. A new search makes
/// every earlier ticket stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedTicket {
    generation: u64,
    page: u32,
}

impl FeedTicket {
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// A query to send plus the ticket to hand back with its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub ticket: FeedTicket,
    pub query: ListQuery,
}

/// Accumulated public listing behind "load more".
///
/// Page 1 replaces whatever is shown; later pages are appended. Results
/// of a search that has since been replaced are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct DiaryFeed {
    diaries: Vec<Diary>,
    page: u32,
    pages: u32,
    page_size: u32,
    loading: bool,
    generation: u64,
    filter: SearchFilter,
}

impl Default for DiaryFeed {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl DiaryFeed {
    pub fn new(page_size: u32) -> Self {
        Self {
            diaries: Vec::new(),
            page: 1,
            pages: 1,
            page_size,
            loading: false,
            generation: 0,
            filter: SearchFilter::default(),
        }
    }

    pub fn diaries(&self) -> &[Diary] {
        &self.diaries
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn filter(&self) -> &SearchFilter {
        &self.filter
    }

    pub fn has_more(&self) -> bool {
        self.page < self.pages
    }

    /// True once at least one page is shown and nothing is left to fetch.
    pub fn is_exhausted(&self) -> bool {
        !self.diaries.is_empty() && !self.has_more()
    }

    /// Starts a fresh search from page 1.
    pub fn search(&mut self, filter: SearchFilter) -> FeedRequest {
        self.filter = filter;
        self.generation += 1;
        self.loading = true;
        self.request(1)
    }

    /// Request for the next page, or `None` while a fetch is in flight or
    /// the last page is already shown.
    pub fn load_more(&mut self) -> Option<FeedRequest> {
        if self.loading || !self.has_more() {
            return None;
        }
        self.loading = true;
        Some(self.request(self.page + 1))
    }

    /// Applies a response. Returns `false` and changes nothing when the
    /// ticket belongs to an earlier search.
    pub fn apply(&mut self, ticket: FeedTicket, response: DiaryPage) -> bool {
        if ticket.generation != self.generation {
            return false;
        }

        if ticket.page <= 1 {
            self.diaries = response.diaries;
        } else {
            self.diaries.extend(response.diaries);
        }
        self.page = response.page.max(1);
        self.pages = response.pages;
        self.loading = false;
        true
    }

    /// Leaves the list as it was; only the in-flight flag is reset.
    pub fn fail(&mut self, ticket: FeedTicket) {
        if ticket.generation == self.generation {
            self.loading = false;
        }
    }

    fn request(&self, page_number: u32) -> FeedRequest {
        FeedRequest {
            ticket: FeedTicket {
                generation: self.generation,
                page: page_number,
            },
            query: ListQuery {
                page_number,
                page_size: self.page_size,
                title: Some(self.filter.title.clone()),
                author_nickname: Some(self.filter.author_nickname.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DiaryStatus;
    use chrono::Utc;

    fn diary(id: &str) -> Diary {
        Diary {
            id: id.into(),
            title: id.into(),
            content: String::new(),
            images: vec![],
            video_url: None,
            author: None,
            author_id: None,
            created_at: Utc::now(),
            status: DiaryStatus::Approved,
            reject_reason: None,
        }
    }

    fn page(ids: &[&str], page: u32, pages: u32) -> DiaryPage {
        DiaryPage {
            diaries: ids.iter().map(|id| diary(id)).collect(),
            page,
            pages,
            total: None,
        }
    }

    fn ids(feed: &DiaryFeed) -> Vec<&str> {
        feed.diaries().iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn later_pages_append_and_first_page_replaces() {
        let mut feed = DiaryFeed::default();
        let first = feed.search(SearchFilter::default());
        assert_eq!(first.query.page_number, 1);
        assert_eq!(first.query.page_size, 12);
        assert!(feed.apply(first.ticket, page(&["a", "b"], 1, 2)));

        let next = feed.load_more().expect("second page available");
        assert_eq!(next.query.page_number, 2);
        feed.apply(next.ticket, page(&["c"], 2, 2));
        assert_eq!(ids(&feed), ["a", "b", "c"]);
        assert!(feed.is_exhausted());

        let kyoto = feed.search(SearchFilter {
            title: "Kyoto".into(),
            author_nickname: String::new(),
        });
        feed.apply(kyoto.ticket, page(&["k"], 1, 1));
        assert_eq!(ids(&feed), ["k"]);
    }

    #[test]
    fn load_more_is_gated() {
        let mut feed = DiaryFeed::default();
        let first = feed.search(SearchFilter::default());
        assert!(feed.load_more().is_none(), "first page still in flight");

        feed.apply(first.ticket, page(&["a"], 1, 1));
        assert!(feed.load_more().is_none(), "only one page");
    }

    #[test]
    fn search_carries_filters() {
        let mut feed = DiaryFeed::new(5);
        let request = feed.search(SearchFilter {
            title: "sea".into(),
            author_nickname: "Mo".into(),
        });
        assert_eq!(request.query.title.as_deref(), Some("sea"));
        assert_eq!(request.query.author_nickname.as_deref(), Some("Mo"));
        assert_eq!(request.query.page_size, 5);
    }

    #[test]
    fn failure_keeps_existing_rows() {
        let mut feed = DiaryFeed::default();
        let first = feed.search(SearchFilter::default());
        feed.apply(first.ticket, page(&["a"], 1, 3));

        let next = feed.load_more().expect("more pages");
        feed.fail(next.ticket);
        assert!(!feed.is_loading());
        assert_eq!(ids(&feed), ["a"]);
        assert_eq!(feed.load_more().map(|r| r.query.page_number), Some(2));
    }

    #[test]
    fn new_search_drops_pages_of_the_old_one() {
        let mut feed = DiaryFeed::default();
        let first = feed.search(SearchFilter::default());
        feed.apply(first.ticket, page(&["a", "b"], 1, 3));
        let stale = feed.load_more().expect("second page available");

        let lisbon = feed.search(SearchFilter {
            title: "Lisbon".into(),
            author_nickname: String::new(),
        });
        assert!(feed.apply(lisbon.ticket, page(&["l1"], 1, 2)));

        assert!(!feed.apply(stale.ticket, page(&["c"], 2, 3)));
        feed.fail(stale.ticket);
        assert_eq!(ids(&feed), ["l1"]);
        assert_eq!(feed.pages(), 2);

        let next = feed.load_more().expect("Lisbon has a second page");
        assert_eq!(next.query.title.as_deref(), Some("Lisbon"));
        assert_eq!(next.query.page_number, 2);
    }

    #[test]
    fn stale_failure_does_not_end_current_fetch() {
        let mut feed = DiaryFeed::default();
        let first = feed.search(SearchFilter::default());
        feed.apply(first.ticket, page(&["a"], 1, 2));
        let stale = feed.load_more().expect("second page available");

        feed.search(SearchFilter::default());
        feed.fail(stale.ticket);
        assert!(feed.is_loading());
    }
}
