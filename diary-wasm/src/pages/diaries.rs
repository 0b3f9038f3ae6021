use super::{input_value, view_error, view_loading};
use crate::api::{ApiClient, ApiError};
use crate::route::Route;
use diary_client::feed::{DiaryFeed, FeedRequest, FeedTicket, SearchFilter};
use diary_client::models::{Diary, DiaryPage};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

pub enum Msg {
    UpdateTitle(String),
    UpdateAuthor(String),
    Search,
    LoadMore,
    Loaded(FeedTicket, DiaryPage),
    Failed(FeedTicket, ApiError),
}

/// Public plaza: approved diaries, searchable by title and author.
pub struct DiaryList {
    feed: DiaryFeed,
    title_query: String,
    author_query: String,
    error: Option<String>,
    api: ApiClient,
}

impl DiaryList {
    fn fetch(&self, ctx: &Context<Self>, request: FeedRequest) {
        let api = self.api.clone();
        let link = ctx.link().clone();
        let FeedRequest { ticket, query } = request;

        spawn_local(async move {
            match api.list_diaries(&query).await {
                Ok(response) => link.send_message(Msg::Loaded(ticket, response)),
                Err(e) => link.send_message(Msg::Failed(ticket, e)),
            }
        });
    }

    fn view_card(&self, diary: &Diary) -> Html {
        let cover = diary
            .cover_image()
            .map(|src| self.api.media_url(src));

        html! {
            <div class="diary-card" key={diary.id.clone()}>
                <Link<Route> to={Route::Diary { id: diary.id.clone() }}>
                    if let Some(cover) = cover {
                        <img class="cover" src={cover} alt={diary.title.clone()} />
                    } else {
                        <div class="cover placeholder">{ "No image" }</div>
                    }
                    <h3 title={diary.title.clone()}>{ &diary.title }</h3>
                </Link<Route>>
                <small>
                    { format!("{} · {}", diary.author_nickname(), diary.created_date()) }
                </small>
            </div>
        }
    }
}

impl Component for DiaryList {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            feed: DiaryFeed::default(),
            title_query: String::new(),
            author_query: String::new(),
            error: None,
            api: ApiClient::user(),
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render {
            ctx.link().send_message(Msg::Search);
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::UpdateTitle(val) => self.title_query = val,
            Msg::UpdateAuthor(val) => self.author_query = val,

            Msg::Search => {
                self.error = None;
                let request = self.feed.search(SearchFilter {
                    title: self.title_query.clone(),
                    author_nickname: self.author_query.clone(),
                });
                self.fetch(ctx, request);
            }

            Msg::LoadMore => match self.feed.load_more() {
                Some(request) => self.fetch(ctx, request),
                None => return false,
            },

            Msg::Loaded(ticket, response) => {
                if !self.feed.apply(ticket, response) {
                    log::debug!("Dropped page {} of an earlier search", ticket.page());
                    return false;
                }
            }

            Msg::Failed(ticket, e) => {
                log::error!("Failed to load diaries: {}", e);
                self.feed.fail(ticket);
                self.error = Some(e.to_string());
            }
        }
        true
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let onsubmit = link.callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Search
        });

        html! {
            <div class="container diaries-page">
                <form class="search" {onsubmit}>
                    <input
                        type="search"
                        placeholder="Search by title"
                        value={self.title_query.clone()}
                        oninput={link.callback(|e| Msg::UpdateTitle(input_value(e)))}
                    />
                    <input
                        type="search"
                        placeholder="Search by author"
                        value={self.author_query.clone()}
                        oninput={link.callback(|e| Msg::UpdateAuthor(input_value(e)))}
                    />
                    <button type="submit" disabled={self.feed.is_loading()}>{ "Search" }</button>
                </form>

                { view_error(&self.error) }

                <div class="diary-grid">
                    { for self.feed.diaries().iter().map(|d| self.view_card(d)) }
                </div>

                { view_loading(self.feed.is_loading()) }

                if self.feed.diaries().is_empty() && !self.feed.is_loading() && self.error.is_none() {
                    <p class="empty">{ "No diaries found." }</p>
                }

                if self.feed.has_more() && !self.feed.is_loading() {
                    <button class="load-more" onclick={link.callback(|_| Msg::LoadMore)}>
                        { "Load more" }
                    </button>
                }

                if self.feed.is_exhausted() {
                    <p class="end">{ "That's all for now." }</p>
                }
            </div>
        }
    }
}
